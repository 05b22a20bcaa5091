use std::any::Any;

use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};

use crate::features::GameFeatureFlags;
use crate::ids::{MoveCode, MoveProbability, PlayerId, ScoreEntry, MOVE_NONE};
use crate::manifest::GameManifest;
use crate::sizer::GameSizer;
use crate::sync::SyncSegment;

fn unsupported(method: &'static str) -> RuntimeError {
    RuntimeError::with_detail(ErrorCode::FeatureUnsupported, method)
}

/// The game plugin contract. One implementation corresponds to one
/// `game_methods_s` vtable in `includes/surena/game.h`; methods here that
/// the header marks `FEATURE: ...` come with a default implementation that
/// rejects with [`ErrorCode::FeatureUnsupported`], so an implementation
/// only has to override what [`GameManifest::features`] actually declares.
///
/// A host obtains a live instance through [`GameFactory::create`] rather
/// than calling `create` on an already-allocated `game`; the original's
/// "every create must be matched with destroy, even on failure" rule falls
/// out of ordinary `Drop` — a `Result<Box<dyn GameMethods>, _>` either owns
/// a value that will be dropped, or never existed.
pub trait GameMethods: Send + Sync + Any {
    fn as_any(&self) -> &dyn Any;

    /// This instance's fixed identity and feature flags.
    fn manifest(&self) -> &GameManifest;

    /// Buffer-sizing hints, valid once the instance exists.
    fn sizer(&self) -> GameSizer;

    /// A deep, independent clone of this instance.
    fn clone_box(&self) -> Box<dyn GameMethods>;

    /// Deep-copies `other`'s state into `self`. `other` must be the same
    /// concrete implementation constructed with the same options;
    /// implementations should reject otherwise rather than risk a
    /// mismatched state (the original leaves this undefined behaviour —
    /// here it is simply an error).
    fn copy_from(&mut self, other: &dyn GameMethods) -> RuntimeResult<()>;

    /// Whether `self` and `other` are behaviourally identical states
    /// (e.g. move counters matter, interchangeable backing buffers don't).
    fn compare(&self, other: &dyn GameMethods) -> RuntimeResult<bool>;

    /// FEATURE: `options`. The options string this instance was created
    /// with, re-exported in canonical form.
    fn export_options(&self) -> RuntimeResult<String> {
        Err(unsupported("export_options"))
    }

    /// The state string for this position, loadable again via
    /// [`GameInit::Standard`](crate::init::GameInit::Standard).
    fn export_state(&self) -> RuntimeResult<String>;

    /// Loads a state string, or the initial position if `state` is `None`.
    /// Must never crash on malformed input; on failure the instance is
    /// left empty rather than partially mutated.
    fn import_state(&mut self, state: Option<&str>) -> RuntimeResult<()>;

    /// FEATURE: `serializable`. A byte-accurate snapshot of options and
    /// state, round-trippable via `GameInit::Serialized`.
    fn serialize(&self) -> RuntimeResult<Vec<u8>> {
        Err(unsupported("serialize"))
    }

    /// The players to move from this position. Writes [`PLAYER_RAND`] if
    /// the next branch is decided by chance; empty if the game is over.
    ///
    /// [`PLAYER_RAND`]: crate::ids::PLAYER_RAND
    fn players_to_move(&self) -> RuntimeResult<Vec<PlayerId>>;

    /// The legal moves for `player`. Empty if the game is over or `player`
    /// is not to move.
    fn get_concrete_moves(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>>;

    /// FEATURE: `random_moves`. The probability of each move
    /// `get_concrete_moves` would report for `player`, in the same order.
    fn get_concrete_move_probabilities(
        &self,
        player: PlayerId,
    ) -> RuntimeResult<Vec<MoveProbability>> {
        Err(unsupported("get_concrete_move_probabilities"))
    }

    /// FEATURE: `move_ordering`. Like `get_concrete_moves`, ordered from
    /// perceived strongest to weakest.
    fn get_concrete_moves_ordered(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
        Err(unsupported("get_concrete_moves_ordered"))
    }

    /// FEATURE: `random_moves | hidden_information | simultaneous_moves`.
    /// The action moves (information-set-level moves) available to
    /// `player`.
    fn get_actions(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
        Err(unsupported("get_actions"))
    }

    /// Whether `mov` would be legal for `player` right now. Equivalent to,
    /// but ideally cheaper than, checking membership in
    /// `get_concrete_moves`.
    fn is_legal_move(&self, player: PlayerId, mov: MoveCode) -> RuntimeResult<bool>;

    /// FEATURE: `random_moves | hidden_information | simultaneous_moves`.
    /// The action a legal concrete move reduces to (or `mov` itself if it
    /// is already an action).
    fn move_to_action(&self, mov: MoveCode) -> RuntimeResult<MoveCode> {
        Err(unsupported("move_to_action"))
    }

    /// FEATURE: `random_moves | hidden_information | simultaneous_moves`.
    /// Convenience wrapper: is `mov` itself an action.
    fn is_action(&self, mov: MoveCode) -> RuntimeResult<bool> {
        Err(unsupported("is_action"))
    }

    /// Applies `mov` as `player`'s move. Implementations may assume `mov`
    /// is legal for `player`; callers should check `is_legal_move` first
    /// when the move did not come from `get_concrete_moves` already.
    fn make_move(&mut self, player: PlayerId, mov: MoveCode) -> RuntimeResult<()>;

    /// The winning player(s), if the game has ended with any.
    fn get_results(&self) -> RuntimeResult<Vec<PlayerId>>;

    /// FEATURE: `legacy`. Only callable on a finished game with all
    /// required hidden information available (otherwise
    /// [`ErrorCode::MissingHiddenState`]); the exported string excludes
    /// options, which must be saved alongside it separately for reuse.
    fn export_legacy(&self) -> RuntimeResult<String> {
        Err(unsupported("export_legacy"))
    }

    /// FEATURE: `scores`. Each player's score accumulated during this game
    /// only (not cross-game), valid for the instance's entire lifetime.
    fn get_scores(&self) -> RuntimeResult<Vec<ScoreEntry>> {
        Err(unsupported("get_scores"))
    }

    /// FEATURE: `id`. A conflict-resistant state id, equal for equal board
    /// states regardless of path taken to reach them.
    fn id(&self) -> RuntimeResult<u64> {
        Err(unsupported("id"))
    }

    /// FEATURE: `eval`. A comparative evaluation of the position for
    /// `player`; higher is better. Worthless while multiple players are
    /// simultaneously to move (an inherently unstable position).
    fn eval(&self, player: PlayerId) -> RuntimeResult<f32> {
        Err(unsupported("eval"))
    }

    /// FEATURE: `random_moves | hidden_information | simultaneous_moves`.
    /// Seeds the game and collapses all hidden/random information from
    /// here on into concrete, pre-determined outcomes.
    fn discretize(&mut self, seed: u64) -> RuntimeResult<()> {
        let _ = seed;
        Err(unsupported("discretize"))
    }

    /// FEATURE: `playout`. Plays uniformly-random legal moves for every
    /// player, as determined by `seed`, until the game ends.
    fn playout(&mut self, seed: u64) -> RuntimeResult<()> {
        let _ = seed;
        Err(unsupported("playout"))
    }

    /// FEATURE: `random_moves | hidden_information | simultaneous_moves`.
    /// Redacts all hidden/private information not belonging to one of
    /// `players`. If [`PLAYER_RAND`](crate::ids::PLAYER_RAND) is absent
    /// from `players`, any seed is redacted too.
    fn redact_keep_state(&mut self, players: &[PlayerId]) -> RuntimeResult<()> {
        let _ = players;
        Err(unsupported("redact_keep_state"))
    }

    /// FEATURE: `hidden_information | simultaneous_moves`. State segments
    /// to deliver to the players they target, so each can resolve what it
    /// alone is owed.
    fn export_sync_data(&self) -> RuntimeResult<Vec<SyncSegment>> {
        Err(unsupported("export_sync_data"))
    }

    /// FEATURE: `hidden_information | simultaneous_moves`. Applies a sync
    /// segment's payload as received from a more-knowing peer instance.
    fn import_sync_data(&mut self, data: &[u8]) -> RuntimeResult<()> {
        let _ = data;
        Err(unsupported("import_sync_data"))
    }

    /// Parses a move string for `player` (or a universal string if
    /// `player` is [`PLAYER_NONE`](crate::ids::PLAYER_NONE)) into a move
    /// code. Returns [`MOVE_NONE`] rather than erroring on unparseable
    /// input — this one method never crashes or propagates an error, by
    /// design of the original contract.
    fn get_move_code(&self, player: PlayerId, text: &str) -> MoveCode {
        let _ = (player, text);
        MOVE_NONE
    }

    /// The state-specific move string for `mov` as seen by `player` (or a
    /// universal string if `player` is `PLAYER_NONE`).
    fn get_move_str(&self, player: PlayerId, mov: MoveCode) -> RuntimeResult<String>;

    /// FEATURE: `print`. A human-readable debug rendering of the state.
    fn print(&self) -> RuntimeResult<String> {
        Err(unsupported("print"))
    }

    /// FEATURE: `error_strings`. The detail string for the most recently
    /// returned error, if the implementation chooses to cache one.
    fn get_last_error(&self) -> Option<String> {
        None
    }
}

/// Produces [`GameMethods`] instances and reports the fixed identity they
/// will all share. One factory per `{game_name, variant_name, impl_name,
/// version}` combination — the host-facing equivalent of a loaded
/// `game_methods` vtable pointer.
pub trait GameFactory: Send + Sync {
    fn manifest(&self) -> &GameManifest;

    fn create(&self, init: crate::init::GameInit) -> RuntimeResult<Box<dyn GameMethods>>;

    /// Convenience for the common case (§9 `GAME_INIT_SOURCE_TYPE_DEFAULT`).
    fn create_default(&self) -> RuntimeResult<Box<dyn GameMethods>> {
        self.create(crate::init::GameInit::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludus_core::ErrorCode;

    struct Stub;

    impl GameMethods for Stub {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn manifest(&self) -> &GameManifest {
            unimplemented!()
        }
        fn sizer(&self) -> GameSizer {
            GameSizer::default()
        }
        fn clone_box(&self) -> Box<dyn GameMethods> {
            Box::new(Stub)
        }
        fn copy_from(&mut self, _other: &dyn GameMethods) -> RuntimeResult<()> {
            Ok(())
        }
        fn compare(&self, _other: &dyn GameMethods) -> RuntimeResult<bool> {
            Ok(true)
        }
        fn export_state(&self) -> RuntimeResult<String> {
            Ok(String::new())
        }
        fn import_state(&mut self, _state: Option<&str>) -> RuntimeResult<()> {
            Ok(())
        }
        fn players_to_move(&self) -> RuntimeResult<Vec<PlayerId>> {
            Ok(vec![])
        }
        fn get_concrete_moves(&self, _player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
            Ok(vec![])
        }
        fn is_legal_move(&self, _player: PlayerId, _mov: MoveCode) -> RuntimeResult<bool> {
            Ok(false)
        }
        fn make_move(&mut self, _player: PlayerId, _mov: MoveCode) -> RuntimeResult<()> {
            Ok(())
        }
        fn get_results(&self) -> RuntimeResult<Vec<PlayerId>> {
            Ok(vec![])
        }
        fn get_move_str(&self, _player: PlayerId, _mov: MoveCode) -> RuntimeResult<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn ungated_features_default_to_feature_unsupported() {
        let stub = Stub;
        assert_eq!(
            stub.export_options().unwrap_err().code,
            ErrorCode::FeatureUnsupported
        );
        assert_eq!(
            stub.get_scores().unwrap_err().code,
            ErrorCode::FeatureUnsupported
        );
        assert_eq!(stub.eval(1).unwrap_err().code, ErrorCode::FeatureUnsupported);
    }

    #[test]
    fn get_move_code_never_errors_on_garbage_input() {
        let stub = Stub;
        assert_eq!(stub.get_move_code(1, "not a move"), MOVE_NONE);
    }

    #[test]
    fn get_last_error_defaults_to_none() {
        assert!(Stub.get_last_error().is_none());
    }
}
