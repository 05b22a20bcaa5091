use crate::ids::PlayerId;

/// One block of state a game wants delivered to a specific subset of
/// players, so each of them can resolve information the others must not
/// see (hidden information) or must see atomically (simultaneous moves).
///
/// Mirrors `includes/surena/game.h`'s `sync_data` (a `[data_start,
/// data_end)` byte range paired with a `[player_start, player_end)` player
/// range). The two owned `Vec`s here replace the four raw pointers;
/// `export_sync_data`/`import_sync_data` returning/taking a `Vec` of these
/// replaces the original's separate `release_sync_data` call, since
/// dropping the `Vec` is the release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSegment {
    pub players: Vec<PlayerId>,
    pub data: Vec<u8>,
}

impl SyncSegment {
    pub fn new(players: Vec<PlayerId>, data: Vec<u8>) -> Self {
        Self { players, data }
    }

    pub fn targets(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }
}
