// Host loop: the single task that owns the controller
//
// HTTP handlers and the ticker never touch game state directly. They push HostEvents
// into an unbounded channel; this loop applies them one at a time and publishes a fresh
// Snapshot after each. All mutation therefore happens on one task, in event order.

use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::controller::{GameController, Snapshot};
use crate::event_log::EventLogger;
use crate::score_sink::ScoreSink;
use crate::ticker::{TickScheduler, TokioTicker};
use crate::types::{HostEvent, InputEvent};

/// Handle shared with the HTTP layer
#[derive(Clone)]
pub struct GameHost {
    events: UnboundedSender<HostEvent>,
    snapshots: watch::Receiver<Snapshot>,
}

impl GameHost {
    /// Builds the controller from `config` and spawns the host loop on the current runtime
    pub fn spawn(
        config: &Config,
        sink: Option<Arc<dyn ScoreSink>>,
        logger: EventLogger,
    ) -> (GameHost, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let ticker = TokioTicker::new(&events_tx);

        let mut controller = GameController::from_config(config, ticker);
        if let Some(sink) = sink {
            controller = controller.with_score_sink(sink);
        }
        info!(
            "Session {} (seed {})",
            controller.session_id(),
            controller.seed()
        );

        let (snap_tx, snap_rx) = watch::channel(controller.snapshot());
        let handle = tokio::spawn(run_loop(controller, events_rx, snap_tx, logger));

        (
            GameHost {
                events: events_tx,
                snapshots: snap_rx,
            },
            handle,
        )
    }

    pub fn send(&self, event: HostEvent) -> Result<(), String> {
        self.events
            .send(event)
            .map_err(|_| "Game loop has stopped".to_string())
    }

    pub fn input(&self, input: InputEvent) -> Result<(), String> {
        self.send(HostEvent::Input { input })
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever a new snapshot is published
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Applies events until every `GameHost` handle is dropped. The ticker only holds a
/// weak sender, so it never keeps the loop alive on its own.
pub async fn run_loop<S: TickScheduler>(
    mut controller: GameController<S>,
    mut events: UnboundedReceiver<HostEvent>,
    snapshots: watch::Sender<Snapshot>,
    logger: EventLogger,
) {
    let mut seq: u64 = 0;

    while let Some(event) = events.recv().await {
        let outcome = controller.handle_event(event);
        let cues = controller.drain_cues();

        for cue in &cues {
            info!("Cue: {:?}", cue);
        }

        // Stale or ignored ticks change nothing; keep them out of the log and the feed
        if matches!(event, HostEvent::Tick { .. }) && outcome.is_none() && cues.is_empty() {
            continue;
        }

        let mut snapshot = controller.snapshot();
        logger.log_event(seq, controller.seed(), event, &snapshot);
        seq += 1;

        snapshot.cues = cues;
        if snapshots.send(snapshot).is_err() {
            warn!("No snapshot readers left");
        }
    }

    info!("Host loop finished");
}
