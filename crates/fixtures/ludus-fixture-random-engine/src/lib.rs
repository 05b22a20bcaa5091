//! A search engine that picks uniformly among the legal moves for whichever
//! player is to move, answering a timed search immediately rather than
//! actually deepening with more time — the engine-side analogue of
//! `ludus-fixture-tictactoe`: the smallest complete [`EngineWorker`].
//!
//! Grounded in the protocol shape `ludus-engine`'s [`spawn`] already
//! supplies; this crate only has to fill in the five game-specific methods
//! and the search itself, mirroring how a random-move searcher is the
//! thinnest possible body around that same loop.

use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};
use ludus_engine::{spawn, EngineFactory, EngineFeatureFlags, EngineHandle, EngineManifest, EngineWorker};
use ludus_game::{GameFeatureFlags, GameMethods, MoveCode, PlayerId};
use rand::seq::SliceRandom;

/// Picks a uniformly random legal move for the first to-move player and
/// reports it as the search result as soon as asked, regardless of how much
/// thinking time was granted — there is nothing to deepen into.
#[derive(Default)]
pub struct RandomMover {
    game: Option<Box<dyn GameMethods>>,
}

impl RandomMover {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngineWorker for RandomMover {
    fn identity(&self) -> (String, String) {
        ("RandomMover".to_string(), "ludus".to_string())
    }

    fn load_game(&mut self, game: Box<dyn GameMethods>) {
        self.game = Some(game);
    }

    fn unload_game(&mut self) {
        self.game = None;
    }

    fn apply_state(&mut self, state: Option<String>) {
        if let Some(game) = &mut self.game {
            let _ = game.import_state(state.as_deref());
        }
    }

    fn apply_move(&mut self, player: PlayerId, mov: MoveCode) {
        if let Some(game) = &mut self.game {
            let _ = game.make_move(player, mov);
        }
    }

    fn apply_sync(&mut self, data: Vec<u8>) {
        if let Some(game) = &mut self.game {
            let _ = game.import_sync_data(&data);
        }
    }

    fn set_option(&mut self, _option: ludus_engine::EngineOption) {}

    fn search_tick(&mut self) -> Option<ludus_engine::SearchInfo> {
        None
    }

    fn finalize_search(&mut self) -> RuntimeResult<(PlayerId, MoveCode)> {
        let game = self
            .game
            .as_ref()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "no game loaded"))?;
        let to_move = game.players_to_move()?;
        let &player = to_move
            .first()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "game has already ended"))?;
        let moves = game.get_concrete_moves(player)?;
        let mut rng = rand::rng();
        let &mov = moves
            .choose(&mut rng)
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "to-move player has no legal moves"))?;
        Ok((player, mov))
    }
}

fn manifest() -> &'static EngineManifest {
    use std::sync::OnceLock;
    static MANIFEST: OnceLock<EngineManifest> = OnceLock::new();
    MANIFEST.get_or_init(|| {
        EngineManifest::new(
            "RandomMover",
            ludus_core::semver::Semver::new(1, 0, 0),
            EngineFeatureFlags::empty(),
        )
        .expect("the manifest's identifier is valid by construction")
    })
}

/// Produces [`RandomMover`] workers, compatible with any game regardless of
/// its feature flags (a uniform chooser never needs to reason about hidden
/// information, randomness, or simultaneity beyond what `get_concrete_moves`
/// already reports for the player it is asked about).
#[derive(Debug, Default)]
pub struct RandomMoverFactory;

impl EngineFactory for RandomMoverFactory {
    fn manifest(&self) -> &EngineManifest {
        manifest()
    }

    fn create_default(&self, engine_id: u32) -> RuntimeResult<EngineHandle> {
        Ok(spawn(engine_id, RandomMover::new()))
    }

    fn is_game_compatible(&self, _game_features: GameFeatureFlags) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludus_engine::{EngineEvent, EngineEventPayload};
    use ludus_fixture_tictactoe::TicTacToeFactory;
    use ludus_game::GameFactory;
    use std::time::Duration;

    #[test]
    fn property_15_bestmove_after_a_timed_search_is_a_legal_opening() {
        let factory = RandomMoverFactory::default();
        let handle = factory.create_default(1).unwrap();
        let _id = handle.outbox.pop(Duration::from_millis(200));

        let game = TicTacToeFactory.create_default().unwrap();
        handle
            .inbox
            .push(EngineEvent::new(1, EngineEventPayload::GameLoad(game)))
            .unwrap();
        handle
            .inbox
            .push(EngineEvent::new(1, EngineEventPayload::EngineStart { timeout_ms: 50 }))
            .unwrap();

        let bestmove = loop {
            let e = handle.outbox.pop(Duration::from_millis(200));
            if matches!(e.payload, EngineEventPayload::EngineBestMove { .. }) {
                break e;
            }
        };
        match bestmove.payload {
            EngineEventPayload::EngineBestMove { player, mov } => {
                assert_eq!(player, 1);
                let opening = TicTacToeFactory.create_default().unwrap();
                assert!(opening.is_legal_move(player, mov).unwrap());
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn scenario_bestmove_lands_inside_a_generous_deadline() {
        use std::time::Instant;

        let factory = RandomMoverFactory::default();
        let handle = factory.create_default(2).unwrap();
        let _id = handle.outbox.pop(Duration::from_millis(200));

        let game = TicTacToeFactory.create_default().unwrap();
        handle
            .inbox
            .push(EngineEvent::new(2, EngineEventPayload::GameLoad(game)))
            .unwrap();

        let start = Instant::now();
        handle
            .inbox
            .push(EngineEvent::new(2, EngineEventPayload::EngineStart { timeout_ms: 50 }))
            .unwrap();

        let bestmove = loop {
            let e = handle.outbox.pop(Duration::from_millis(200));
            if matches!(e.payload, EngineEventPayload::EngineBestMove { .. }) {
                break e;
            }
        };
        assert!(start.elapsed() < Duration::from_millis(200));
        assert!(matches!(bestmove.payload, EngineEventPayload::EngineBestMove { .. }));
    }

    #[test]
    fn is_game_compatible_accepts_every_feature_combination() {
        let factory = RandomMoverFactory::default();
        assert!(factory.is_game_compatible(GameFeatureFlags::empty()));
        assert!(factory.is_game_compatible(GameFeatureFlags::HIDDEN_INFORMATION | GameFeatureFlags::SIMULTANEOUS_MOVES));
    }
}
