/// How a game instance should be constructed, given to
/// [`crate::methods::GameFactory::create`].
///
/// Mirrors `includes/surena/game.h`'s `game_init`/`GAME_INIT_SOURCE_TYPE`
/// tagged union. The C source's `standard.opts`/`legacy`/`state` each being
/// independently nullable collapses here into `Option<String>` per field
/// rather than a fourth variant, since Rust already has a "maybe absent"
/// type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameInit {
    /// Default options, no legacy data, initial state.
    Default,
    /// Build from explicit options/legacy/initial-state strings. Any of
    /// the three may be omitted to fall back to its default.
    Standard {
        opts: Option<String>,
        legacy: Option<String>,
        state: Option<String>,
    },
    /// Rebuild from a previously-produced `serialize` buffer. Untrusted:
    /// implementations must validate it thoroughly rather than trust its
    /// shape (§9 Design Notes: "the data given... is UNTRUSTED").
    Serialized(Vec<u8>),
}

impl GameInit {
    pub fn standard(opts: impl Into<Option<String>>) -> Self {
        GameInit::Standard {
            opts: opts.into(),
            legacy: None,
            state: None,
        }
    }
}

impl Default for GameInit {
    fn default() -> Self {
        GameInit::Default
    }
}
