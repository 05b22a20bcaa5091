//! Shared primitives for the Ludus game/engine contract crates:
//! [`semver`] (plugin/API version negotiation), [`error`] (the common
//! error taxonomy), [`timestamp`] (wall-clock values games and engines
//! exchange), and [`layout`] (the declarative serialization engine that
//! gives every wire-facing type in `ludus-game` and `ludus-engine` a
//! uniform size/serialize/deserialize/copy/destroy story).

pub mod error;
pub mod layout;
pub mod semver;
pub mod timestamp;

pub use error::{ErrorCode, RuntimeError, RuntimeResult, ERROR_CODE_CUSTOM_OFFSET};
pub use layout::{
    ArrayLen, CustomCodec, Field, FieldKind, Layout, LayoutError, LayoutValue, Op, Record, Value,
};
pub use semver::Semver;
pub use timestamp::{Timestamp, MAX_FRACTION_NS};
