/// Upper bounds a host can use to size its own buffers before calling into
/// a created game, reported once after `create` succeeds (`options_str` is
/// valid even earlier, before creation, per the original's comment).
///
/// Mirrors `includes/surena/game.h`'s `buf_sizer`. Byte-size fields stay
/// `usize` here (no zero-terminator to budget for — Rust strings are never
/// NUL-terminated); count fields keep the original's explicit widths since
/// they round-trip over [`ludus_core::layout`] on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSizer {
    pub options_str: usize,
    pub serialization_size: usize,
    pub state_str: usize,
    pub player_count: u8,
    pub max_players_to_move: u8,
    pub max_moves: u32,
    pub max_actions: u32,
    pub max_results: u8,
    pub legacy_str: usize,
    pub move_str: usize,
    pub print_str: usize,
}
