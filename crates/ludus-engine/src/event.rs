use ludus_core::ErrorCode;
use ludus_game::{GameMethods, MoveCode, PlayerId};

/// One message on an engine's inbox or outbox, tagged by the variant its
/// payload carries. Mirrors `includes/surena/engine.h`'s `engine_event`
/// (a type tag plus a C union of per-type payload structs); the union
/// collapses naturally into this enum's per-variant fields.
///
/// Ownership rule (§3): constructing an event takes ownership of whatever
/// it carries (a cloned game, owned strings, owned bytes); pushing it into
/// a queue moves that ownership into the queue, and popping moves it back
/// out. In safe Rust this is just normal move semantics — there is no
/// separate "reset the handle to NULL after push" step to encode.
pub struct EngineEvent {
    pub engine_id: u32,
    pub payload: EngineEventPayload,
}

impl EngineEvent {
    pub fn new(engine_id: u32, payload: EngineEventPayload) -> Self {
        Self { engine_id, payload }
    }

    /// The sentinel a queue pop returns on timeout (Q2/Q3), or the
    /// equivalent of `eevent_create(..., EE_TYPE_NULL)`.
    pub fn null(engine_id: u32) -> Self {
        Self::new(engine_id, EngineEventPayload::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, EngineEventPayload::Null)
    }
}

/// The discriminated payload of an [`EngineEvent`]. Variant names and
/// grouping follow `engine.h`'s `EE_TYPE` enum exactly; `EE_TYPE_NULL` is
/// `Null` and carries nothing.
pub enum EngineEventPayload {
    Null,
    Exit,
    /// Outbound only: a log line, also used to surface non-fatal errors.
    Log { code: ErrorCode, text: String },
    /// In/out keepalive: echo the same `id` back as soon as possible, even
    /// mid-search (§4.E Heartbeat).
    Heartbeat(u64),

    /// Inbound: clone `game` into the worker's private slot and reset
    /// search state.
    GameLoad(Box<dyn GameMethods>),
    /// Inbound: destroy the private game and go idle.
    GameUnload,
    /// Inbound: `import_state` on the private game (`None` = initial
    /// position) and reset search state.
    GameState(Option<String>),
    /// Inbound: `make_move` on the private game.
    GameMove { player: PlayerId, mov: MoveCode },
    /// Inbound: `import_sync_data` on the private game.
    GameSync(Vec<u8>),

    /// Outbound, once at worker startup: engine name and author.
    EngineId { name: String, author: String },
    /// Declared at startup (outbound) or set by the host (inbound); echoed
    /// back outbound on change.
    EngineOption(EngineOption),
    /// Inbound: begin search. `timeout_ms == 0` means search until
    /// `EngineStop`.
    EngineStart { timeout_ms: u32 },
    /// Inbound: stop the current search; the worker must still emit a
    /// final `EngineSearchInfo` then `EngineBestMove`.
    EngineStop,
    /// Outbound, periodic during search.
    EngineSearchInfo(SearchInfo),
    /// Outbound, terminal: the search's chosen move.
    EngineBestMove { player: PlayerId, mov: MoveCode },
}

/// One declared or updated engine option. Mirrors `engine.h`'s
/// `ee_engine_option` (name + type tag + value union + constraints
/// union), folded into one Rust enum instead of a tag plus two unions.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOption {
    Check { name: String, value: bool },
    Spin { name: String, value: i64, min: i64, max: i64 },
    SpinD { name: String, value: f64, min: f64, max: f64 },
    Combo { name: String, value: String, variants: Vec<String> },
    Button { name: String },
    Str { name: String, value: String },
}

impl EngineOption {
    pub fn name(&self) -> &str {
        match self {
            EngineOption::Check { name, .. }
            | EngineOption::Spin { name, .. }
            | EngineOption::SpinD { name, .. }
            | EngineOption::Combo { name, .. }
            | EngineOption::Button { name, .. }
            | EngineOption::Str { name, .. } => name,
        }
    }
}

/// A progress report during search. Mirrors `engine.h`'s
/// `ee_engine_searchinfo` (a presence bitmap plus one field per bit); each
/// field becomes an `Option` here instead of flag bit + raw field, since
/// that is the idiomatic way to express "maybe present" in Rust.
///
/// `score` uses a float evaluation from the scoring player's perspective
/// (not UCI centipawns); `hashfull` is a `[0, 1]` fraction (not UCI
/// permill), per the header's comments on those two fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    pub time_ms: Option<u32>,
    pub depth: Option<u32>,
    pub score: Option<(PlayerId, f32)>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub hashfull: Option<f32>,
    /// Principal variation: parallel `(player, move)` pairs, as the
    /// original's parallel `pv_p`/`pv_m` arrays of the same length.
    pub pv: Option<Vec<(PlayerId, MoveCode)>>,
    pub string: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_event_is_recognized_regardless_of_engine_id() {
        assert!(EngineEvent::null(7).is_null());
    }

    #[test]
    fn option_name_reads_through_every_variant() {
        assert_eq!(
            EngineOption::Spin { name: "depth".into(), value: 4, min: 1, max: 40 }.name(),
            "depth"
        );
        assert_eq!(EngineOption::Button { name: "clear hash".into() }.name(), "clear hash");
    }
}
