// Periodic tick scheduling
//
// At most one schedule is live at a time. Each schedule carries a generation number that
// is stamped on every tick it emits; the controller drops ticks from any generation other
// than the current one, so a tick already queued when its schedule was cancelled can
// never move the worm.

use log::debug;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::types::HostEvent;

/// Owner of the single outstanding periodic tick
pub trait TickScheduler {
    /// Starts emitting `HostEvent::Tick { generation }` every `period`, first tick one
    /// period from now. Callers cancel any previous schedule first.
    fn start(&mut self, period: Duration, generation: u64);

    /// Stops the live schedule, if any
    fn cancel(&mut self);

    fn is_active(&self) -> bool;
}

/// Tokio-backed scheduler that pushes ticks into the host event channel.
/// Holds the channel weakly: once every other sender is dropped the schedule stops.
pub struct TokioTicker {
    events: WeakUnboundedSender<HostEvent>,
    handle: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new(events: &UnboundedSender<HostEvent>) -> Self {
        TokioTicker {
            events: events.downgrade(),
            handle: None,
        }
    }
}

impl TickScheduler for TokioTicker {
    fn start(&mut self, period: Duration, generation: u64) {
        self.cancel();

        let events = self.events.clone();
        debug!("Starting tick schedule {} every {:?}", generation, period);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let sent = match events.upgrade() {
                    Some(sender) => sender.send(HostEvent::Tick { generation }).is_ok(),
                    None => false,
                };
                if !sent {
                    debug!("Host channel closed, stopping schedule {}", generation);
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Cancelling tick schedule");
            handle.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler that never fires on its own. Ticks are fed in by the caller, as the replay
/// engine does. Counts starts and cancels so schedule handling can be checked.
#[derive(Debug, Default)]
pub struct ManualTicker {
    active: Option<(Duration, u64)>,
    pub starts: u32,
    pub cancels: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation of the live schedule
    pub fn generation(&self) -> Option<u64> {
        self.active.map(|(_, g)| g)
    }

    pub fn period(&self) -> Option<Duration> {
        self.active.map(|(p, _)| p)
    }

    /// The tick the live schedule would emit next
    pub fn next_tick(&self) -> Option<HostEvent> {
        self.generation()
            .map(|generation| HostEvent::Tick { generation })
    }
}

impl TickScheduler for ManualTicker {
    fn start(&mut self, period: Duration, generation: u64) {
        self.active = Some((period, generation));
        self.starts += 1;
    }

    fn cancel(&mut self) {
        if self.active.take().is_some() {
            self.cancels += 1;
        }
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
