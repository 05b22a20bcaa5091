//! Simultaneous-move rock-paper-scissors: the reference implementation for
//! the hidden-information/simultaneous-moves half of the game contract,
//! where a naive single-threaded `make_move` loop doesn't apply — both
//! players submit before either result is known.

use std::any::Any;

use ludus_core::semver::Semver;
use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};
use ludus_game::{
    GameFactory, GameFeatureFlags, GameInit, GameManifest, GameMethods, GameSizer, MoveCode,
    PlayerId, SyncSegment, MOVE_NONE,
};
use rand::Rng;

const NONE: u8 = 0;
const ANY: u8 = 1;
const ROCK: u8 = 2;
const PAPER: u8 = 3;
const SCISSOR: u8 = 4;

fn symbol_char(code: u8) -> char {
    match code {
        NONE => '-',
        ANY => '*',
        ROCK => 'R',
        PAPER => 'P',
        SCISSOR => 'S',
        _ => '?',
    }
}

fn parse_symbol(ch: char) -> Option<u8> {
    match ch {
        '-' => Some(NONE),
        '*' => Some(ANY),
        'R' => Some(ROCK),
        'P' => Some(PAPER),
        'S' => Some(SCISSOR),
        _ => None,
    }
}

fn beats(a: u8, b: u8) -> bool {
    matches!((a, b), (ROCK, SCISSOR) | (PAPER, ROCK) | (SCISSOR, PAPER))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RockPaperScissors {
    acc: [u8; 2],
    done: bool,
    result: PlayerId,
}

impl RockPaperScissors {
    fn new() -> Self {
        Self {
            acc: [NONE, NONE],
            done: false,
            result: 0,
        }
    }

    fn recompute_outcome(&mut self) {
        self.done = self.acc.iter().all(|&a| a != NONE && a != ANY);
        if !self.done {
            self.result = 0;
            return;
        }
        self.result = if self.acc[0] == self.acc[1] {
            0
        } else if beats(self.acc[0], self.acc[1]) {
            1
        } else {
            2
        };
    }
}

impl Default for RockPaperScissors {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMethods for RockPaperScissors {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn manifest(&self) -> &GameManifest {
        manifest()
    }

    fn sizer(&self) -> GameSizer {
        GameSizer {
            options_str: 0,
            serialization_size: 0,
            state_str: 3,
            player_count: 2,
            max_players_to_move: 2,
            max_moves: 3,
            max_actions: 1,
            max_results: 1,
            legacy_str: 0,
            move_str: 1,
            print_str: 3,
        }
    }

    fn clone_box(&self) -> Box<dyn GameMethods> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, other: &dyn GameMethods) -> RuntimeResult<()> {
        let other = other
            .as_any()
            .downcast_ref::<RockPaperScissors>()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "copy_from: not a RockPaperScissors"))?;
        self.clone_from(other);
        Ok(())
    }

    fn compare(&self, other: &dyn GameMethods) -> RuntimeResult<bool> {
        let other = other
            .as_any()
            .downcast_ref::<RockPaperScissors>()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "compare: not a RockPaperScissors"))?;
        Ok(self == other)
    }

    fn export_state(&self) -> RuntimeResult<String> {
        Ok(format!(
            "{}-{}",
            symbol_char(self.acc[0]),
            symbol_char(self.acc[1])
        ))
    }

    fn import_state(&mut self, state: Option<&str>) -> RuntimeResult<()> {
        let Some(state) = state else {
            *self = RockPaperScissors::new();
            return Ok(());
        };
        let invalid = || RuntimeError::with_detail(ErrorCode::InvalidInput, "malformed rps state string");
        let mut chars = state.chars();
        let first = chars.next().ok_or_else(invalid)?;
        if chars.next() != Some('-') {
            return Err(invalid());
        }
        let second = chars.next().ok_or_else(invalid)?;
        if chars.next().is_some() {
            return Err(invalid());
        }
        let mut fresh = RockPaperScissors::new();
        fresh.acc[0] = parse_symbol(first).ok_or_else(invalid)?;
        fresh.acc[1] = parse_symbol(second).ok_or_else(invalid)?;
        fresh.recompute_outcome();
        *self = fresh;
        Ok(())
    }

    fn players_to_move(&self) -> RuntimeResult<Vec<PlayerId>> {
        if self.done {
            return Ok(vec![]);
        }
        Ok((0..2u8)
            .filter(|&i| self.acc[i as usize] == NONE)
            .map(|i| i + 1)
            .collect())
    }

    fn get_concrete_moves(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
        if !self.players_to_move()?.contains(&player) {
            return Ok(vec![]);
        }
        Ok(vec![ROCK as MoveCode, PAPER as MoveCode, SCISSOR as MoveCode])
    }

    fn get_actions(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
        if !self.players_to_move()?.contains(&player) {
            return Ok(vec![]);
        }
        Ok(vec![ANY as MoveCode])
    }

    fn is_legal_move(&self, player: PlayerId, mov: MoveCode) -> RuntimeResult<bool> {
        if !(1..=2).contains(&player) || !self.players_to_move()?.contains(&player) {
            return Ok(false);
        }
        Ok(mov == ROCK as MoveCode || mov == PAPER as MoveCode || mov == SCISSOR as MoveCode)
    }

    fn move_to_action(&self, mov: MoveCode) -> RuntimeResult<MoveCode> {
        match mov as u8 {
            ANY | ROCK | PAPER | SCISSOR => Ok(ANY as MoveCode),
            _ => Err(RuntimeError::with_detail(ErrorCode::InvalidMove, "not a rock/paper/scissor move")),
        }
    }

    fn is_action(&self, mov: MoveCode) -> RuntimeResult<bool> {
        Ok(mov == ANY as MoveCode)
    }

    fn make_move(&mut self, player: PlayerId, mov: MoveCode) -> RuntimeResult<()> {
        if !self.is_legal_move(player, mov)? {
            return Err(RuntimeError::with_detail(ErrorCode::InvalidMove, "move not legal for player"));
        }
        self.acc[(player - 1) as usize] = mov as u8;
        self.recompute_outcome();
        Ok(())
    }

    fn get_results(&self) -> RuntimeResult<Vec<PlayerId>> {
        Ok(if self.done && self.result != 0 {
            vec![self.result]
        } else {
            vec![]
        })
    }

    fn discretize(&mut self, seed: u64) -> RuntimeResult<()> {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        for slot in &mut self.acc {
            if *slot == ANY {
                *slot = rng.random_range(ROCK..=SCISSOR);
            }
        }
        self.recompute_outcome();
        Ok(())
    }

    fn redact_keep_state(&mut self, players: &[PlayerId]) -> RuntimeResult<()> {
        if self.done {
            return Ok(());
        }
        for i in 0..2u8 {
            let owner = i + 1;
            if !players.contains(&owner) && self.acc[i as usize] != NONE {
                self.acc[i as usize] = ANY;
            }
        }
        Ok(())
    }

    fn export_sync_data(&self) -> RuntimeResult<Vec<SyncSegment>> {
        if !self.done {
            return Ok(vec![]);
        }
        Ok(vec![SyncSegment::new(vec![1, 2], vec![self.acc[0], self.acc[1]])])
    }

    fn import_sync_data(&mut self, data: &[u8]) -> RuntimeResult<()> {
        if data.len() != 2 {
            return Err(RuntimeError::with_detail(ErrorCode::InvalidInput, "sync payload must be 2 bytes"));
        }
        self.acc = [data[0], data[1]];
        self.recompute_outcome();
        Ok(())
    }

    fn get_move_code(&self, _player: PlayerId, text: &str) -> MoveCode {
        let mut chars = text.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return MOVE_NONE;
        };
        match parse_symbol(ch) {
            Some(code) if code != NONE => code as MoveCode,
            _ => MOVE_NONE,
        }
    }

    fn get_move_str(&self, _player: PlayerId, mov: MoveCode) -> RuntimeResult<String> {
        Ok(match mov as u8 {
            code @ (ANY | ROCK | PAPER | SCISSOR) => symbol_char(code).to_string(),
            _ => "-".to_string(),
        })
    }

    fn print(&self) -> RuntimeResult<String> {
        let middle = if self.done {
            match self.result {
                0 => '=',
                1 => '>',
                _ => '<',
            }
        } else {
            '-'
        };
        Ok(format!("{}{}{}\n", symbol_char(self.acc[0]), middle, symbol_char(self.acc[1])))
    }
}

fn manifest() -> &'static GameManifest {
    use std::sync::OnceLock;
    static MANIFEST: OnceLock<GameManifest> = OnceLock::new();
    MANIFEST.get_or_init(|| {
        GameManifest::new(
            "RockPaperScissors",
            "Standard",
            "ludus_reference",
            Semver::new(1, 0, 1),
            GameFeatureFlags::SIMULTANEOUS_MOVES | GameFeatureFlags::PRINT,
        )
        .expect("the manifest's identifiers are all valid by construction")
    })
}

#[derive(Debug, Default)]
pub struct RockPaperScissorsFactory;

impl GameFactory for RockPaperScissorsFactory {
    fn manifest(&self) -> &GameManifest {
        manifest()
    }

    fn create(&self, init: GameInit) -> RuntimeResult<Box<dyn GameMethods>> {
        let mut game = RockPaperScissors::new();
        match init {
            GameInit::Default => {},
            GameInit::Standard { state, .. } => game.import_state(state.as_deref())?,
            GameInit::Serialized(_) => {
                return Err(RuntimeError::with_detail(
                    ErrorCode::FeatureUnsupported,
                    "rockpaperscissors is not serializable",
                ))
            },
        }
        Ok(Box::new(game))
    }
}
