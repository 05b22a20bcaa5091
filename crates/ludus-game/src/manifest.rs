use ludus_core::semver::Semver;
use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};

use crate::features::GameFeatureFlags;

/// `SURENA_GAME_API_VERSION` from `includes/surena/game.h`: the contract
/// version this crate implements, for a host to check before trusting any
/// [`crate::methods::GameFactory`] it loads.
pub const GAME_API_VERSION: u64 = 21;

/// Identifies one game implementation: the concatenation of `game_name`,
/// `variant_name`, `impl_name` and `version` must be unique across every
/// implementation a host could ever load side by side (§9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameManifest {
    pub game_name: String,
    pub variant_name: String,
    pub impl_name: String,
    pub version: Semver,
    pub features: GameFeatureFlags,
}

impl GameManifest {
    pub fn new(
        game_name: impl Into<String>,
        variant_name: impl Into<String>,
        impl_name: impl Into<String>,
        version: Semver,
        features: GameFeatureFlags,
    ) -> RuntimeResult<Self> {
        let manifest = Self {
            game_name: game_name.into(),
            variant_name: variant_name.into(),
            impl_name: impl_name.into(),
            version,
            features,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> RuntimeResult<()> {
        for (field, value) in [
            ("game_name", &self.game_name),
            ("variant_name", &self.variant_name),
            ("impl_name", &self.impl_name),
        ] {
            validate_identifier(field, value)?;
        }
        Ok(())
    }
}

/// Enforces §9's naming rule: at least one character, drawn from
/// `[A-Za-z0-9_-]`, with `_`/`-` disallowed at the start or end.
fn validate_identifier(field: &'static str, value: &str) -> RuntimeResult<()> {
    if value.is_empty() {
        return Err(RuntimeError::with_detail(
            ErrorCode::InvalidInput,
            format!("{field} must not be empty"),
        ));
    }
    let is_allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if !value.chars().all(is_allowed) {
        return Err(RuntimeError::with_detail(
            ErrorCode::InvalidInput,
            format!("{field} contains a character outside [A-Za-z0-9_-]"),
        ));
    }
    let first = value.chars().next().unwrap();
    let last = value.chars().next_back().unwrap();
    if first == '-' || first == '_' || last == '-' || last == '_' {
        return Err(RuntimeError::with_detail(
            ErrorCode::InvalidInput,
            format!("{field} may not start or end with '-' or '_'"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> GameFeatureFlags {
        GameFeatureFlags::SCORES
    }

    #[test]
    fn accepts_a_plain_identifier_set() {
        assert!(GameManifest::new("tictactoe", "standard", "reference", Semver::new(1, 0, 0), flags()).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let err = GameManifest::new("", "standard", "reference", Semver::new(1, 0, 0), flags())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn rejects_leading_hyphen() {
        assert!(GameManifest::new("tictactoe", "-standard", "reference", Semver::new(1, 0, 0), flags())
            .is_err());
    }

    #[test]
    fn rejects_trailing_underscore() {
        assert!(GameManifest::new("tictactoe", "standard", "reference_", Semver::new(1, 0, 0), flags())
            .is_err());
    }

    #[test]
    fn rejects_disallowed_character() {
        assert!(GameManifest::new("tic tac toe", "standard", "reference", Semver::new(1, 0, 0), flags())
            .is_err());
    }

    #[test]
    fn allows_internal_hyphen_and_underscore() {
        assert!(GameManifest::new("tic-tac_toe", "standard", "reference", Semver::new(1, 0, 0), flags())
            .is_ok());
    }
}
