use super::*;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};

struct PollHandle {
    id: u64,
    task: JoinHandle<()>,
}

/// Owner of the live-task refresh timer. At most one timer runs at a time;
/// every start cancels the previous one first.
pub(in crate::tui) struct Poller {
    interval: RefreshInterval,
    active: Option<PollHandle>,
    next_id: u64,
}

impl Poller {
    pub(in crate::tui) fn new(interval: RefreshInterval) -> Self {
        Self {
            interval,
            active: None,
            next_id: 0,
        }
    }

    pub(in crate::tui) fn interval(&self) -> RefreshInterval {
        self.interval
    }

    pub(in crate::tui) fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a tick carrying `id` came from the timer that is live now.
    pub(in crate::tui) fn accepts(&self, id: u64) -> bool {
        self.active.as_ref().is_some_and(|handle| handle.id == id)
    }

    pub(in crate::tui) fn start(&mut self, events: &UnboundedSender<AppEvent>) {
        self.cancel();
        self.next_id += 1;
        let id = self.next_id;
        let period = self.interval.as_duration();
        let first = Instant::now() + period;
        let events = events.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(AppEvent::PollTick { handle: id }).is_err() {
                    break;
                }
            }
        });
        debug!(
            handle = id,
            interval_ms = self.interval.as_millis(),
            "Task poller started"
        );
        self.active = Some(PollHandle { id, task });
    }

    /// Stops the live timer, if any. Returns whether one was running.
    pub(in crate::tui) fn cancel(&mut self) -> bool {
        let Some(handle) = self.active.take() else {
            return false;
        };
        handle.task.abort();
        debug!(handle = handle.id, "Task poller cancelled");
        true
    }

    /// Records the new cadence; a running timer is replaced, a stopped one
    /// stays stopped.
    pub(in crate::tui) fn set_interval(
        &mut self,
        interval: RefreshInterval,
        events: &UnboundedSender<AppEvent>,
    ) {
        self.interval = interval;
        if self.is_running() {
            self.start(events);
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}
