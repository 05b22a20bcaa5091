use std::fmt;

/// A player seat. Valid game-assigned seats are `1..=player_count`;
/// [`PLAYER_NONE`] and [`PLAYER_RAND`] are reserved sentinels, matching
/// `includes/surena/game.h`'s `player_id` (`PLAYER_NONE`/`PLAYER_RAND`).
pub type PlayerId = u8;

/// No player / not applicable.
pub const PLAYER_NONE: PlayerId = 0x00;

/// The move is decided by chance rather than any seated player.
pub const PLAYER_RAND: PlayerId = 0xFF;

/// A concrete move, an action (a set of moves), or `MOVE_NONE`. The game
/// method alone knows how to interpret a given code; see
/// `GameMethods::move_to_action` for the concrete/action relationship.
pub type MoveCode = u64;

/// No move / invalid move, returned e.g. by a failed `get_move_code` parse.
pub const MOVE_NONE: MoveCode = u64::MAX;

/// `SEED_NONE`: wherever an rng seed parameter is used, this value means
/// "do not use randomness".
pub const SEED_NONE: u64 = 0;

/// The probability `[0, 1]` of one entry in `get_concrete_move_probabilities`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveProbability {
    pub mov: MoveCode,
    pub probability: f32,
}

/// One player's accumulated score, from `get_scores`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEntry {
    pub player: PlayerId,
    pub score: i32,
}

impl fmt::Display for MoveProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.3}", self.mov, self.probability)
    }
}
