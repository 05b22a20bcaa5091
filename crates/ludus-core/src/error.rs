use std::fmt;

/// First value a game- or engine-specific error code may use.
///
/// General codes occupy `0..ERROR_CODE_CUSTOM_OFFSET`; see
/// `includes/surena/game.h`'s `ERR_ENUM_DEFAULT_OFFSET` for the analogous
/// C convention ("not an error, start game method specific error enums at
/// this offset").
pub const ERROR_CODE_CUSTOM_OFFSET: u32 = 1000;

/// The general-purpose error taxonomy shared by every game and engine
/// implementation (§3/§7). Implementation-specific codes live in
/// [`ErrorCode::Custom`] and must be `>= ERROR_CODE_CUSTOM_OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Ok,
    OutOfMemory,
    InvalidInput,
    InvalidPlayer,
    InvalidMove,
    InvalidOptions,
    InvalidState,
    StateUnrecoverable,
    StateCorrupted,
    FeatureUnsupported,
    MissingHiddenState,
    UnstablePosition,
    Retry,
    CustomAny,
    /// A game/engine-specific code. Always `>= ERROR_CODE_CUSTOM_OFFSET`.
    Custom(u32),
}

impl ErrorCode {
    /// Encode as the raw wire/ABI value a host would dispatch on by range.
    pub fn to_raw(self) -> u32 {
        match self {
            ErrorCode::Ok => 0,
            ErrorCode::OutOfMemory => 1,
            ErrorCode::InvalidInput => 2,
            ErrorCode::InvalidPlayer => 3,
            ErrorCode::InvalidMove => 4,
            ErrorCode::InvalidOptions => 5,
            ErrorCode::InvalidState => 6,
            ErrorCode::StateUnrecoverable => 7,
            ErrorCode::StateCorrupted => 8,
            ErrorCode::FeatureUnsupported => 9,
            ErrorCode::MissingHiddenState => 10,
            ErrorCode::UnstablePosition => 11,
            ErrorCode::Retry => 12,
            ErrorCode::CustomAny => 13,
            ErrorCode::Custom(raw) => raw,
        }
    }

    /// Decode a raw value back to the general taxonomy, or `Custom` if it
    /// falls at/after the reserved offset. Values between the last general
    /// code and the offset that don't match a known general code also fall
    /// back to `Custom` rather than panicking (never crash on bad input,
    /// per §7/§9).
    pub fn from_raw(raw: u32) -> ErrorCode {
        match raw {
            0 => ErrorCode::Ok,
            1 => ErrorCode::OutOfMemory,
            2 => ErrorCode::InvalidInput,
            3 => ErrorCode::InvalidPlayer,
            4 => ErrorCode::InvalidMove,
            5 => ErrorCode::InvalidOptions,
            6 => ErrorCode::InvalidState,
            7 => ErrorCode::StateUnrecoverable,
            8 => ErrorCode::StateCorrupted,
            9 => ErrorCode::FeatureUnsupported,
            10 => ErrorCode::MissingHiddenState,
            11 => ErrorCode::UnstablePosition,
            12 => ErrorCode::Retry,
            13 => ErrorCode::CustomAny,
            other => ErrorCode::Custom(other),
        }
    }

    /// Returns `None` for custom codes (§3: "returns NULL if the err is not
    /// a general error").
    pub fn general_message(self) -> Option<&'static str> {
        Some(match self {
            ErrorCode::Ok => "ok",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::InvalidInput => "invalid input",
            ErrorCode::InvalidPlayer => "invalid player",
            ErrorCode::InvalidMove => "invalid move",
            ErrorCode::InvalidOptions => "invalid options",
            ErrorCode::InvalidState => "invalid state",
            ErrorCode::StateUnrecoverable => "state unrecoverable",
            ErrorCode::StateCorrupted => "state corrupted",
            ErrorCode::FeatureUnsupported => "feature unsupported",
            ErrorCode::MissingHiddenState => "missing hidden state",
            ErrorCode::UnstablePosition => "unstable position",
            ErrorCode::Retry => "retry",
            ErrorCode::CustomAny => "custom error, see last-error string",
            ErrorCode::Custom(_) => return None,
        })
    }

    /// Non-fatal codes after which the instance remains usable (§7
    /// Recovery).
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidInput
                | ErrorCode::InvalidMove
                | ErrorCode::InvalidOptions
                | ErrorCode::InvalidPlayer
                | ErrorCode::MissingHiddenState
                | ErrorCode::Retry
        )
    }

    /// The host should destroy and not reuse the instance (§7 Recovery).
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorCode::StateCorrupted | ErrorCode::StateUnrecoverable | ErrorCode::OutOfMemory
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.general_message() {
            Some(msg) => f.write_str(msg),
            None => write!(f, "custom error code {}", self.to_raw()),
        }
    }
}

/// A fallible-method error carrying both the dispatchable [`ErrorCode`] and
/// an optional human-readable detail string.
///
/// Stands in for §7's `get_last_error`/`rerrorf` pair: instead of a
/// separately-queried last-error slot, the detail travels with the error
/// value itself, which is the idiomatic Rust shape (`Result<T, E>` over a
/// side channel). Implementations that want to additionally expose
/// `get_last_error()` (the `error_strings` feature) can cache
/// `.detail.clone()` from the most recently returned error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
pub struct RuntimeError {
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl RuntimeError {
    pub fn new(code: ErrorCode) -> Self {
        Self { code, detail: None }
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    /// Equivalent of `rerrorf(&pbuf, ec, fmt, ...)`: build an error whose
    /// detail is a formatted message. Pass a null `fmt` in the original API
    /// to release the buffer; here that's simply not constructing an error.
    pub fn formatted(code: ErrorCode, args: fmt::Arguments<'_>) -> Self {
        Self::with_detail(code, fmt::format(args))
    }
}

/// Shorthand used throughout the contract crates.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_for_general_codes() {
        for code in [
            ErrorCode::Ok,
            ErrorCode::OutOfMemory,
            ErrorCode::InvalidInput,
            ErrorCode::InvalidPlayer,
            ErrorCode::InvalidMove,
            ErrorCode::InvalidOptions,
            ErrorCode::InvalidState,
            ErrorCode::StateUnrecoverable,
            ErrorCode::StateCorrupted,
            ErrorCode::FeatureUnsupported,
            ErrorCode::MissingHiddenState,
            ErrorCode::UnstablePosition,
            ErrorCode::Retry,
            ErrorCode::CustomAny,
        ] {
            assert_eq!(ErrorCode::from_raw(code.to_raw()), code);
        }
    }

    #[test]
    fn custom_codes_must_be_past_the_offset() {
        let custom = ErrorCode::from_raw(ERROR_CODE_CUSTOM_OFFSET + 5);
        assert_eq!(custom, ErrorCode::Custom(ERROR_CODE_CUSTOM_OFFSET + 5));
        assert!(custom.general_message().is_none());
    }

    #[test]
    fn unknown_small_values_fall_back_to_custom_without_panicking() {
        let weird = ErrorCode::from_raw(999);
        assert_eq!(weird, ErrorCode::Custom(999));
    }

    #[test]
    fn display_includes_detail_when_present() {
        let err = RuntimeError::with_detail(ErrorCode::InvalidMove, "a0 is occupied");
        assert_eq!(err.to_string(), "invalid move: a0 is occupied");
    }

    #[test]
    fn display_without_detail_is_just_the_general_message() {
        let err = RuntimeError::new(ErrorCode::InvalidMove);
        assert_eq!(err.to_string(), "invalid move");
    }

    #[test]
    fn recoverable_vs_fatal_partition() {
        assert!(ErrorCode::InvalidMove.is_recoverable());
        assert!(!ErrorCode::InvalidMove.is_fatal());
        assert!(ErrorCode::StateCorrupted.is_fatal());
        assert!(!ErrorCode::StateCorrupted.is_recoverable());
    }
}
