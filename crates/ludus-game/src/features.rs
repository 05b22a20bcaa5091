use bitflags::bitflags;

bitflags! {
    /// Which optional parts of [`crate::methods::GameMethods`] an
    /// implementation actually supports. Fixed for a given game/variant/impl
    /// (§9: "these will never change depending on options"); methods gated
    /// on an unset flag default to [`ludus_core::ErrorCode::FeatureUnsupported`].
    ///
    /// Mirrors `includes/surena/game.h`'s `game_feature_flags` bitfield
    /// struct 1:1, modulo the unused `//TODO` and commented-out `time` bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GameFeatureFlags: u32 {
        const ERROR_STRINGS      = 1 << 0;
        const OPTIONS            = 1 << 1;
        const SERIALIZABLE       = 1 << 2;
        const LEGACY             = 1 << 3;
        const RANDOM_MOVES       = 1 << 4;
        const HIDDEN_INFORMATION = 1 << 5;
        const SIMULTANEOUS_MOVES = 1 << 6;
        const MOVE_ORDERING      = 1 << 7;
        const SCORES             = 1 << 8;
        const ID                 = 1 << 9;
        const EVAL               = 1 << 10;
        const PLAYOUT            = 1 << 11;
        const PRINT              = 1 << 12;
    }
}

impl GameFeatureFlags {
    /// Union of `random_moves`, `hidden_information` and
    /// `simultaneous_moves` — the three flags that, per §9, jointly gate
    /// `get_actions`, `move_to_action`, `is_action`, `discretize`,
    /// `redact_keep_state`, and (with the first two only) the sync-data
    /// trio.
    pub fn gates_actions(self) -> bool {
        self.intersects(Self::RANDOM_MOVES | Self::HIDDEN_INFORMATION | Self::SIMULTANEOUS_MOVES)
    }

    /// Union of `hidden_information` and `simultaneous_moves` — gates the
    /// `export_sync_data`/`release_sync_data`/`import_sync_data` trio.
    pub fn gates_sync_data(self) -> bool {
        self.intersects(Self::HIDDEN_INFORMATION | Self::SIMULTANEOUS_MOVES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_actions_true_for_any_one_of_the_three() {
        assert!(GameFeatureFlags::RANDOM_MOVES.gates_actions());
        assert!(GameFeatureFlags::HIDDEN_INFORMATION.gates_actions());
        assert!(GameFeatureFlags::SIMULTANEOUS_MOVES.gates_actions());
        assert!(!GameFeatureFlags::SCORES.gates_actions());
    }

    #[test]
    fn gates_sync_data_excludes_random_moves_alone() {
        assert!(!GameFeatureFlags::RANDOM_MOVES.gates_sync_data());
        assert!(GameFeatureFlags::HIDDEN_INFORMATION.gates_sync_data());
        assert!(GameFeatureFlags::SIMULTANEOUS_MOVES.gates_sync_data());
    }
}
