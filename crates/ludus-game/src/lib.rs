//! The game plugin contract: what it means to *be* a two-or-more-player
//! game a host can construct, drive, clone, compare, and serialize without
//! knowing its concrete rules.

pub mod features;
pub mod ids;
pub mod init;
pub mod manifest;
pub mod methods;
pub mod sizer;
pub mod sync;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testkit;

pub use features::GameFeatureFlags;
pub use ids::{MoveCode, MoveProbability, PlayerId, ScoreEntry, MOVE_NONE, PLAYER_NONE, PLAYER_RAND, SEED_NONE};
pub use init::GameInit;
pub use manifest::{GameManifest, GAME_API_VERSION};
pub use methods::{GameFactory, GameMethods};
pub use sizer::GameSizer;
pub use sync::SyncSegment;
