use std::thread;
use std::time::{Duration, Instant};

use ludus_core::RuntimeResult;
use ludus_game::{GameMethods, MoveCode, PlayerId};

use crate::event::{EngineEvent, EngineEventPayload, EngineOption, SearchInfo};
use crate::methods::EngineHandle;
use crate::queue::{channel, EventQueueReceiver, EventQueueSender};

/// How long the worker loop blocks on its inbox between ticks while idle
/// or mid-search. Bounds both how promptly a heartbeat is answered (§4.E
/// Heartbeat: "must not starve heartbeats for longer than a documented
/// maximum") and how close a timed search lands to its requested deadline
/// (§8 property 15's "+slack").
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The engine-specific half of the worker loop: everything that differs
/// between e.g. a random mover and a minimax searcher. [`spawn`] supplies
/// the protocol plumbing (event dispatch, timing, heartbeats) around
/// whatever this trait implements.
///
/// Grounded in `original_source/src/engines/randomengine.cpp`'s
/// `_engine_loop`: that function's big `switch` over inbox event types is
/// exactly the split this trait captures, with the protocol-generic arms
/// (`EXIT`, `HEARTBEAT`, `NULL`) hoisted into [`spawn`] and the
/// game/search-specific arms left as trait methods.
pub trait EngineWorker: Send + 'static {
    /// Name and author emitted once as `EngineId` at startup.
    fn identity(&self) -> (String, String);

    /// Options declared outbound at startup.
    fn declared_options(&self) -> Vec<EngineOption> {
        Vec::new()
    }

    fn load_game(&mut self, game: Box<dyn GameMethods>);
    fn unload_game(&mut self);
    fn apply_state(&mut self, state: Option<String>);
    fn apply_move(&mut self, player: PlayerId, mov: MoveCode);
    fn apply_sync(&mut self, data: Vec<u8>);
    fn set_option(&mut self, option: EngineOption);

    /// Called roughly every [`POLL_INTERVAL`] while searching. Returning
    /// `Some` emits it as an `EngineSearchInfo` progress event.
    fn search_tick(&mut self) -> Option<SearchInfo>;

    /// Called once search must end (timeout elapsed or `EngineStop`
    /// received). Returns the chosen player/move.
    fn finalize_search(&mut self) -> RuntimeResult<(PlayerId, MoveCode)>;
}

/// Spawns `worker` on a dedicated OS thread and returns the host's handle
/// to it — the idiomatic-Rust form of `create_default`: instead of an
/// out-parameter inbox pointer, the host gets ownership of both queue
/// halves and the join handle bundled in [`EngineHandle`].
pub fn spawn<W: EngineWorker>(engine_id: u32, worker: W) -> EngineHandle {
    let (host_to_worker_tx, host_to_worker_rx) = channel();
    let (worker_to_host_tx, worker_to_host_rx) = channel();

    let join = thread::Builder::new()
        .name(format!("ludus-engine-{engine_id}"))
        .spawn(move || run(engine_id, worker, worker_to_host_tx, host_to_worker_rx))
        .expect("spawning the engine worker thread must succeed");

    EngineHandle::new(engine_id, host_to_worker_tx, worker_to_host_rx, join)
}

fn run<W: EngineWorker>(
    engine_id: u32,
    mut worker: W,
    outbox: EventQueueSender,
    inbox: EventQueueReceiver,
) {
    let (name, author) = worker.identity();
    let _ = outbox.push(EngineEvent::new(
        engine_id,
        EngineEventPayload::EngineId { name, author },
    ));
    for option in worker.declared_options() {
        let _ = outbox.push(EngineEvent::new(engine_id, EngineEventPayload::EngineOption(option)));
    }

    let mut searching = false;
    let mut deadline: Option<Instant> = None;

    loop {
        let event = inbox.pop(POLL_INTERVAL);
        match event.payload {
            EngineEventPayload::Null => {
                if searching {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        finish_search(&mut worker, &outbox, engine_id);
                        searching = false;
                        deadline = None;
                    } else if let Some(info) = worker.search_tick() {
                        tracing::debug!(engine_id, "emitting search info");
                        let _ = outbox.push(EngineEvent::new(
                            engine_id,
                            EngineEventPayload::EngineSearchInfo(info),
                        ));
                    }
                }
            },
            EngineEventPayload::Exit => break,
            EngineEventPayload::Log { .. } => {
                tracing::debug!("engine {engine_id} received an inbound log event; ignoring");
            },
            EngineEventPayload::Heartbeat(id) => {
                tracing::debug!(engine_id, heartbeat_id = id, "answering heartbeat");
                let _ = outbox.push(EngineEvent::new(engine_id, EngineEventPayload::Heartbeat(id)));
            },
            EngineEventPayload::GameLoad(game) => {
                worker.load_game(game);
                searching = false;
                deadline = None;
            },
            EngineEventPayload::GameUnload => {
                worker.unload_game();
                searching = false;
                deadline = None;
            },
            EngineEventPayload::GameState(state) => {
                worker.apply_state(state);
                searching = false;
                deadline = None;
            },
            EngineEventPayload::GameMove { player, mov } => worker.apply_move(player, mov),
            EngineEventPayload::GameSync(data) => worker.apply_sync(data),
            EngineEventPayload::EngineOption(option) => worker.set_option(option),
            EngineEventPayload::EngineStart { timeout_ms } => {
                searching = true;
                deadline = (timeout_ms > 0).then(|| Instant::now() + Duration::from_millis(timeout_ms as u64));
            },
            EngineEventPayload::EngineStop => {
                if searching {
                    finish_search(&mut worker, &outbox, engine_id);
                    searching = false;
                    deadline = None;
                }
            },
            // Outbound-only types received inbound are protocol errors at
            // the host; ignore rather than crash (§7: never crash on bad
            // input).
            EngineEventPayload::EngineId { .. } => {
                tracing::error!(engine_id, payload = "EngineId", "received an outbound-only event type inbound; ignoring");
            },
            EngineEventPayload::EngineSearchInfo(_) => {
                tracing::error!(engine_id, payload = "EngineSearchInfo", "received an outbound-only event type inbound; ignoring");
            },
            EngineEventPayload::EngineBestMove { .. } => {
                tracing::error!(engine_id, payload = "EngineBestMove", "received an outbound-only event type inbound; ignoring");
            },
        }
    }

    let _ = outbox.push(EngineEvent::new(engine_id, EngineEventPayload::Exit));
}

fn finish_search<W: EngineWorker>(worker: &mut W, outbox: &EventQueueSender, engine_id: u32) {
    if let Some(info) = worker.search_tick() {
        tracing::debug!(engine_id, "emitting final search info before bestmove");
        let _ = outbox.push(EngineEvent::new(engine_id, EngineEventPayload::EngineSearchInfo(info)));
    }
    match worker.finalize_search() {
        Ok((player, mov)) => {
            let _ = outbox.push(EngineEvent::new(
                engine_id,
                EngineEventPayload::EngineBestMove { player, mov },
            ));
        },
        Err(err) => {
            tracing::error!(engine_id, error = %err, "search failed to finalize");
            let _ = outbox.push(EngineEvent::new(
                engine_id,
                EngineEventPayload::Log {
                    code: err.code,
                    text: err.detail.unwrap_or_else(|| err.code.to_string()),
                },
            ));
        },
    }
}
