//! The engine plugin contract: an asynchronous search actor that a host
//! drives entirely through two event queues, built on the game contract
//! in [`ludus_game`].

pub mod event;
pub mod methods;
pub mod queue;
pub mod worker;

pub use event::{EngineEvent, EngineEventPayload, EngineOption, SearchInfo};
pub use methods::{EngineFactory, EngineFeatureFlags, EngineHandle, EngineManifest, ENGINE_API_VERSION};
pub use queue::{channel, EventQueueReceiver, EventQueueSender};
pub use worker::{spawn, EngineWorker, POLL_INTERVAL};
