use bitflags::bitflags;

use ludus_core::semver::Semver;
use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};
use ludus_game::GameFeatureFlags;

use crate::queue::{EventQueueReceiver, EventQueueSender};

/// `SURENA_ENGINE_API_VERSION` from `includes/surena/engine.h`.
pub const ENGINE_API_VERSION: u64 = 2;

bitflags! {
    /// Mirrors `engine.h`'s `engine_feature_flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EngineFeatureFlags: u32 {
        const OPTIONS = 1 << 0;
        const OPTIONS_BIN = 1 << 1;
    }
}

/// Identifies one engine implementation (name + version), analogous to
/// [`ludus_game::GameManifest`] but without the variant/impl-name
/// distinction the game side needs — `engine.h` identifies engines by
/// `engine_name` + `version` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineManifest {
    pub engine_name: String,
    pub version: Semver,
    pub features: EngineFeatureFlags,
}

impl EngineManifest {
    pub fn new(
        engine_name: impl Into<String>,
        version: Semver,
        features: EngineFeatureFlags,
    ) -> RuntimeResult<Self> {
        let engine_name = engine_name.into();
        validate_identifier(&engine_name)?;
        Ok(Self {
            engine_name,
            version,
            features,
        })
    }
}

fn validate_identifier(value: &str) -> RuntimeResult<()> {
    if value.is_empty() {
        return Err(RuntimeError::with_detail(
            ErrorCode::InvalidInput,
            "engine_name must not be empty",
        ));
    }
    let is_allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    let first = value.chars().next().unwrap();
    let last = value.chars().next_back().unwrap();
    if !value.chars().all(is_allowed) || first == '-' || first == '_' || last == '-' || last == '_' {
        return Err(RuntimeError::with_detail(
            ErrorCode::InvalidInput,
            "engine_name must match [A-Za-z0-9][A-Za-z0-9_-]*[A-Za-z0-9]",
        ));
    }
    Ok(())
}

/// A live engine: the host's half of the inbox/outbox pair plus the
/// worker's join handle. Dropping it is `destroy` — it sends `Exit` to
/// the worker and joins the thread, mirroring `engine.h`'s rule that
/// `create` must always eventually be matched with `destroy`.
pub struct EngineHandle {
    pub engine_id: u32,
    pub inbox: EventQueueSender,
    pub outbox: EventQueueReceiver,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        engine_id: u32,
        inbox: EventQueueSender,
        outbox: EventQueueReceiver,
        worker: std::thread::JoinHandle<()>,
    ) -> Self {
        Self {
            engine_id,
            inbox,
            outbox,
            worker: Some(worker),
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self
            .inbox
            .push(crate::event::EngineEvent::new(self.engine_id, crate::event::EngineEventPayload::Exit));
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Produces [`EngineHandle`]s and reports identity/compatibility. The
/// host-facing equivalent of a loaded `engine_methods` vtable pointer.
pub trait EngineFactory: Send + Sync {
    fn manifest(&self) -> &EngineManifest;

    /// FEATURE: `options`. Whether `opts` is acceptable, ahead of spawning.
    fn create_with_opts_str(&self, engine_id: u32, opts: &str) -> RuntimeResult<EngineHandle> {
        let _ = (engine_id, opts);
        Err(RuntimeError::with_detail(
            ErrorCode::FeatureUnsupported,
            "create_with_opts_str",
        ))
    }

    /// FEATURE: `options_bin`. Whether `opts` is acceptable, ahead of
    /// spawning, in the binary options form `options_bin` declares instead
    /// of `options`'s string form.
    fn create_with_opts_bin(&self, engine_id: u32, opts: &[u8]) -> RuntimeResult<EngineHandle> {
        let _ = (engine_id, opts);
        Err(RuntimeError::with_detail(
            ErrorCode::FeatureUnsupported,
            "create_with_opts_bin",
        ))
    }

    fn create_default(&self, engine_id: u32) -> RuntimeResult<EngineHandle>;

    /// Pure predicate over a game's feature flags (§4.E): e.g. a
    /// perfect-information searcher rejects any game advertising
    /// `random_moves`, `hidden_information`, or `simultaneous_moves`.
    fn is_game_compatible(&self, game_features: GameFeatureFlags) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_engine_name() {
        assert!(EngineManifest::new("Random", Semver::new(1, 0, 0), EngineFeatureFlags::empty()).is_ok());
    }

    #[test]
    fn rejects_name_with_space() {
        assert!(EngineManifest::new("Random Mover", Semver::new(1, 0, 0), EngineFeatureFlags::empty()).is_err());
    }
}
