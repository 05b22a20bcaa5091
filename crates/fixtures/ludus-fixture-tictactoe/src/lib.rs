//! Reference tic-tac-toe: the smallest complete [`GameMethods`] around,
//! serving the same role `tictactoe.cpp` serves in its own corpus — a
//! worked example the event-driven engine fixture can load and search.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use ludus_core::semver::Semver;
use ludus_core::{ErrorCode, RuntimeError, RuntimeResult};
use ludus_game::{
    GameFactory, GameFeatureFlags, GameInit, GameManifest, GameMethods, GameSizer, MoveCode,
    PlayerId, MOVE_NONE,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;

const PLAYER_X: PlayerId = 1;
const PLAYER_O: PlayerId = 2;

fn cell_char(player: PlayerId) -> char {
    match player {
        PLAYER_X => 'X',
        PLAYER_O => 'O',
        _ => '.',
    }
}

fn other_player(player: PlayerId) -> PlayerId {
    if player == PLAYER_X {
        PLAYER_O
    } else {
        PLAYER_X
    }
}

/// Board positions are `y * 3 + x`, `y` counted from the bottom row as in
/// the move notation below; `board[i] == 0` means empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    board: [PlayerId; 9],
    current_player: PlayerId,
    result: PlayerId,
}

impl TicTacToe {
    fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: PLAYER_X,
            result: 0,
        }
    }

    fn cell(&self, x: usize, y: usize) -> PlayerId {
        self.board[y * 3 + x]
    }

    fn set_cell(&mut self, x: usize, y: usize, player: PlayerId) {
        self.board[y * 3 + x] = player;
    }

    fn decode_move(mov: MoveCode) -> Option<(usize, usize)> {
        if mov == MOVE_NONE {
            return None;
        }
        let x = (mov & 0b11) as usize;
        let y = ((mov >> 2) & 0b11) as usize;
        (x < 3 && y < 3).then_some((x, y))
    }

    fn encode_move(x: usize, y: usize) -> MoveCode {
        ((y as u64) << 2) | x as u64
    }

    fn has_won(&self, player: PlayerId) -> bool {
        let lines: [[(usize, usize); 3]; 8] = [
            [(0, 0), (1, 0), (2, 0)],
            [(0, 1), (1, 1), (2, 1)],
            [(0, 2), (1, 2), (2, 2)],
            [(0, 0), (0, 1), (0, 2)],
            [(1, 0), (1, 1), (1, 2)],
            [(2, 0), (2, 1), (2, 2)],
            [(0, 0), (1, 1), (2, 2)],
            [(0, 2), (1, 1), (2, 0)],
        ];
        lines
            .iter()
            .any(|line| line.iter().all(|&(x, y)| self.cell(x, y) == player))
    }

    fn is_full(&self) -> bool {
        self.board.iter().all(|&cell| cell != 0)
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GameMethods for TicTacToe {
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
            state_str: 16,
            player_count: 2,
            max_players_to_move: 1,
            max_moves: 9,
            max_actions: 0,
            max_results: 1,
            legacy_str: 0,
            move_str: 3,
            print_str: 13,
        }
    }

    fn clone_box(&self) -> Box<dyn GameMethods> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, other: &dyn GameMethods) -> RuntimeResult<()> {
        let other = other
            .as_any()
            .downcast_ref::<TicTacToe>()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "copy_from: not a TicTacToe"))?;
        self.clone_from(other);
        Ok(())
    }

    fn compare(&self, other: &dyn GameMethods) -> RuntimeResult<bool> {
        let other = other
            .as_any()
            .downcast_ref::<TicTacToe>()
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidState, "compare: not a TicTacToe"))?;
        Ok(self == other)
    }

    fn export_state(&self) -> RuntimeResult<String> {
        let mut out = String::with_capacity(16);
        for y in (0..3).rev() {
            let mut empty_run = 0;
            for x in 0..3 {
                let cell = self.cell(x, y);
                if cell == 0 {
                    empty_run += 1;
                } else {
                    if empty_run > 0 {
                        out.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    out.push(cell_char(cell));
                }
            }
            if empty_run > 0 {
                out.push_str(&empty_run.to_string());
            }
            if y > 0 {
                out.push('/');
            }
        }
        out.push(' ');
        out.push(match self.current_player {
            0 => '-',
            p => cell_char(p),
        });
        out.push(' ');
        out.push(match self.result {
            0 => '-',
            p => cell_char(p),
        });
        Ok(out)
    }

    fn import_state(&mut self, state: Option<&str>) -> RuntimeResult<()> {
        let Some(state) = state else {
            *self = TicTacToe::new();
            return Ok(());
        };
        let invalid = || RuntimeError::with_detail(ErrorCode::InvalidInput, "malformed tictactoe state string");

        let mut fresh = TicTacToe::new();
        fresh.board = [0; 9];
        let mut segments = state.splitn(3, ' ');
        let board_segment = segments.next().ok_or_else(invalid)?;
        let current_segment = segments.next().ok_or_else(invalid)?;
        let result_segment = segments.next().ok_or_else(invalid)?;

        let mut y: i32 = 2;
        let mut x: usize = 0;
        for row in board_segment.split('/') {
            if y < 0 {
                return Err(invalid());
            }
            for ch in row.chars() {
                match ch {
                    'X' | 'O' => {
                        if x > 2 {
                            return Err(invalid());
                        }
                        fresh.set_cell(x, y as usize, if ch == 'X' { PLAYER_X } else { PLAYER_O });
                        x += 1;
                    },
                    '1'..='3' => {
                        let run = ch.to_digit(10).unwrap() as usize;
                        if x + run > 3 {
                            return Err(invalid());
                        }
                        x += run;
                    },
                    _ => return Err(invalid()),
                }
            }
            y -= 1;
            x = 0;
        }
        if y != -1 {
            return Err(invalid());
        }

        fresh.current_player = match current_segment {
            "-" => 0,
            "X" => PLAYER_X,
            "O" => PLAYER_O,
            _ => return Err(invalid()),
        };
        fresh.result = match result_segment {
            "-" => 0,
            "X" => PLAYER_X,
            "O" => PLAYER_O,
            _ => return Err(invalid()),
        };

        *self = fresh;
        Ok(())
    }

    fn players_to_move(&self) -> RuntimeResult<Vec<PlayerId>> {
        Ok(if self.current_player == 0 {
            vec![]
        } else {
            vec![self.current_player]
        })
    }

    fn get_concrete_moves(&self, player: PlayerId) -> RuntimeResult<Vec<MoveCode>> {
        if self.current_player == 0 || player != self.current_player {
            return Ok(vec![]);
        }
        let mut moves = Vec::with_capacity(9);
        for y in 0..3 {
            for x in 0..3 {
                if self.cell(x, y) == 0 {
                    moves.push(Self::encode_move(x, y));
                }
            }
        }
        Ok(moves)
    }

    fn is_legal_move(&self, player: PlayerId, mov: MoveCode) -> RuntimeResult<bool> {
        if self.current_player == 0 || player != self.current_player {
            return Ok(false);
        }
        let Some((x, y)) = Self::decode_move(mov) else {
            return Ok(false);
        };
        Ok(self.cell(x, y) == 0)
    }

    fn make_move(&mut self, player: PlayerId, mov: MoveCode) -> RuntimeResult<()> {
        let (x, y) = Self::decode_move(mov)
            .ok_or_else(|| RuntimeError::with_detail(ErrorCode::InvalidMove, "not a board cell"))?;
        if self.cell(x, y) != 0 {
            return Err(RuntimeError::with_detail(ErrorCode::InvalidMove, "cell already occupied"));
        }
        self.set_cell(x, y, player);

        if self.has_won(player) {
            self.result = player;
            self.current_player = 0;
        } else if self.is_full() {
            self.current_player = 0;
        } else {
            self.current_player = other_player(player);
        }
        Ok(())
    }

    fn get_results(&self) -> RuntimeResult<Vec<PlayerId>> {
        Ok(if self.result == 0 { vec![] } else { vec![self.result] })
    }

    fn id(&self) -> RuntimeResult<u64> {
        let mut hasher = DefaultHasher::new();
        self.board.hash(&mut hasher);
        self.current_player.hash(&mut hasher);
        self.result.hash(&mut hasher);
        Ok(hasher.finish())
    }

    fn playout(&mut self, seed: u64) -> RuntimeResult<()> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        loop {
            let to_move = self.players_to_move()?;
            let Some(&player) = to_move.first() else {
                break;
            };
            let moves = self.get_concrete_moves(player)?;
            let &mov = moves
                .choose(&mut rng)
                .expect("a to-move player always has at least one legal move");
            self.make_move(player, mov)?;
        }
        Ok(())
    }

    fn get_move_code(&self, _player: PlayerId, text: &str) -> MoveCode {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return MOVE_NONE;
        }
        let x = bytes[0].wrapping_sub(b'a');
        let y = bytes[1].wrapping_sub(b'0');
        if x > 2 || y > 2 {
            return MOVE_NONE;
        }
        Self::encode_move(x as usize, y as usize)
    }

    fn get_move_str(&self, _player: PlayerId, mov: MoveCode) -> RuntimeResult<String> {
        let Some((x, y)) = Self::decode_move(mov) else {
            return Ok("-".to_string());
        };
        Ok(format!("{}{}", (b'a' + x as u8) as char, (b'0' + y as u8) as char))
    }

    fn print(&self) -> RuntimeResult<String> {
        let mut out = String::with_capacity(13);
        for y in (0..3).rev() {
            for x in 0..3 {
                out.push(cell_char(self.cell(x, y)));
            }
            out.push('\n');
        }
        Ok(out)
    }
}

fn manifest() -> &'static GameManifest {
    use std::sync::OnceLock;
    static MANIFEST: OnceLock<GameManifest> = OnceLock::new();
    MANIFEST.get_or_init(|| {
        GameManifest::new(
            "TicTacToe",
            "Standard",
            "ludus_reference",
            Semver::new(0, 2, 0),
            GameFeatureFlags::ID | GameFeatureFlags::PLAYOUT | GameFeatureFlags::PRINT,
        )
        .expect("the manifest's identifiers are all valid by construction")
    })
}

/// Produces [`TicTacToe`] instances. Stateless: every instance this factory
/// creates shares the one manifest above.
#[derive(Debug, Default)]
pub struct TicTacToeFactory;

impl GameFactory for TicTacToeFactory {
    fn manifest(&self) -> &GameManifest {
        manifest()
    }

    fn create(&self, init: GameInit) -> RuntimeResult<Box<dyn GameMethods>> {
        let mut game = TicTacToe::new();
        match init {
            GameInit::Default => {},
            GameInit::Standard { state, .. } => game.import_state(state.as_deref())?,
            GameInit::Serialized(_) => {
                return Err(RuntimeError::with_detail(
                    ErrorCode::FeatureUnsupported,
                    "tictactoe is not serializable",
                ))
            },
        }
        Ok(Box::new(game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludus_game::testkit;

    fn moves(notation: &[(PlayerId, &str)]) -> Vec<(PlayerId, MoveCode)> {
        let g = TicTacToe::new();
        notation
            .iter()
            .map(|&(player, text)| (player, g.get_move_code(player, text)))
            .collect()
    }

    #[test]
    fn default_state_is_the_empty_board_with_x_to_move() {
        let g = TicTacToe::new();
        assert_eq!(g.export_state().unwrap(), "3/3/3 X -");
    }

    #[test]
    fn scenario_applying_a0_updates_the_bottom_left_cell() {
        let factory = TicTacToeFactory;
        let mut game = factory.create_default().unwrap();
        let mov = game.get_move_code(PLAYER_X, "a0");
        game.make_move(PLAYER_X, mov).unwrap();
        assert_eq!(game.export_state().unwrap(), "3/3/X2 O -");

        let mut reimported = factory.create_default().unwrap();
        reimported
            .import_state(Some(&game.export_state().unwrap()))
            .unwrap();
        assert!(game.compare(reimported.as_ref()).unwrap());
    }

    #[test]
    fn scenario_center_then_two_corners_wins_for_x() {
        let factory = TicTacToeFactory;
        let mut game = factory.create_default().unwrap();
        for (player, text) in [
            (PLAYER_X, "b1"),
            (PLAYER_O, "a0"),
            (PLAYER_X, "a2"),
            (PLAYER_O, "c0"),
            (PLAYER_X, "c2"),
        ] {
            let mov = game.get_move_code(player, text);
            game.make_move(player, mov).unwrap();
        }
        assert_eq!(game.get_results().unwrap(), vec![PLAYER_X]);
        assert!(game.players_to_move().unwrap().is_empty());
        assert!(game.get_concrete_moves(PLAYER_O).unwrap().is_empty());
    }

    #[test]
    fn full_board_with_no_line_is_a_draw() {
        let factory = TicTacToeFactory;
        let mut game = factory.create_default().unwrap();
        for (player, text) in [
            (PLAYER_X, "a0"),
            (PLAYER_O, "b0"),
            (PLAYER_X, "c0"),
            (PLAYER_O, "b1"),
            (PLAYER_X, "a1"),
            (PLAYER_O, "c1"),
            (PLAYER_X, "b2"),
            (PLAYER_O, "a2"),
            (PLAYER_X, "c2"),
        ] {
            let mov = game.get_move_code(player, text);
            game.make_move(player, mov).unwrap();
        }
        assert!(game.get_results().unwrap().is_empty());
        assert!(game.players_to_move().unwrap().is_empty());
    }

    #[test]
    fn contract_create_then_drop() {
        testkit::contract_create_then_drop_is_safe(TicTacToeFactory.create_default().unwrap());
    }

    #[test]
    fn contract_identical_play_converges_for_both_players() {
        let mut a = TicTacToeFactory.create_default().unwrap();
        let mut b = TicTacToeFactory.create_default().unwrap();
        let sequence = moves(&[(PLAYER_X, "a0"), (PLAYER_O, "b0"), (PLAYER_X, "c2")]);
        testkit::contract_identical_play_converges(a.as_mut(), b.as_mut(), &sequence);
    }

    #[test]
    fn contract_concrete_moves_stay_legal_throughout_a_game() {
        let mut game = TicTacToeFactory.create_default().unwrap();
        testkit::contract_concrete_moves_are_legal(game.as_ref(), PLAYER_X);
        let mov = game.get_move_code(PLAYER_X, "b1");
        game.make_move(PLAYER_X, mov).unwrap();
        testkit::contract_concrete_moves_are_legal(game.as_ref(), PLAYER_O);
    }

    #[test]
    fn contract_move_strings_round_trip_for_every_opening_cell() {
        let game = TicTacToeFactory.create_default().unwrap();
        for mov in game.get_concrete_moves(PLAYER_X).unwrap() {
            testkit::contract_move_string_round_trips(game.as_ref(), PLAYER_X, mov);
        }
    }

    #[test]
    fn dash_parses_to_move_none() {
        let game = TicTacToeFactory.create_default().unwrap();
        assert_eq!(game.get_move_code(PLAYER_X, "-"), MOVE_NONE);
        assert_eq!(game.get_move_str(PLAYER_X, MOVE_NONE).unwrap(), "-");
    }

    #[test]
    fn garbage_move_text_never_panics() {
        let game = TicTacToeFactory.create_default().unwrap();
        assert_eq!(game.get_move_code(PLAYER_X, "nonsense move text"), MOVE_NONE);
        assert_eq!(game.get_move_code(PLAYER_X, ""), MOVE_NONE);
    }

    #[test]
    fn playout_always_terminates_with_a_result_or_a_draw() {
        for seed in 0..20u64 {
            let mut game = TicTacToeFactory.create_default().unwrap();
            game.playout(seed).unwrap();
            assert!(game.players_to_move().unwrap().is_empty());
        }
    }

    #[test]
    fn id_is_stable_for_equal_states_reached_by_different_paths() {
        let mut via_corners = TicTacToeFactory.create_default().unwrap();
        for (player, text) in [(PLAYER_X, "a0"), (PLAYER_O, "b0"), (PLAYER_X, "c0")] {
            let mov = via_corners.get_move_code(player, text);
            via_corners.make_move(player, mov).unwrap();
        }
        let mut via_reverse = TicTacToeFactory.create_default().unwrap();
        for (player, text) in [(PLAYER_X, "c0"), (PLAYER_O, "b0"), (PLAYER_X, "a0")] {
            let mov = via_reverse.get_move_code(player, text);
            via_reverse.make_move(player, mov).unwrap();
        }
        assert_eq!(via_corners.id().unwrap(), via_reverse.id().unwrap());
    }

    #[test]
    fn print_renders_three_rows_top_to_bottom() {
        let factory = TicTacToeFactory;
        let mut game = factory.create_default().unwrap();
        let mov = game.get_move_code(PLAYER_X, "a0");
        game.make_move(PLAYER_X, mov).unwrap();
        assert_eq!(game.print().unwrap(), "...\n...\nX..\n");
    }
}
