use std::time::Duration;

use kanal::AsyncSender;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::events::SessionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A scheduled `TimerFired` delivery that can still be aborted
#[derive(Debug)]
pub struct PendingTimer {
    id: TimerId,
    handle: AbortHandle,
}

impl PendingTimer {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn abort(self) {
        self.handle.abort();
    }
}

/// Spawns timers that post back into the session inbox
pub struct Timers {
    next_id: u64,
    inbox: AsyncSender<SessionEvent>,
}

impl Timers {
    pub fn new(inbox: AsyncSender<SessionEvent>) -> Self {
        Self { next_id: 0, inbox }
    }

    pub fn schedule(&mut self, delay: Duration) -> PendingTimer {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = Instant::now() + delay;
        let inbox = self.inbox.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if inbox.send(SessionEvent::TimerFired(id)).await.is_err() {
                tracing::debug!("Session gone, dropping timer {id:?}");
            }
        })
        .abort_handle();

        PendingTimer { id, handle }
    }
}

/// At most one pending timer, with the payload it fires with.
/// Arming cancels whatever was pending before.
#[derive(Debug)]
pub struct TimerSlot<T> {
    pending: Option<(PendingTimer, T)>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> TimerSlot<T> {
    pub fn arm(&mut self, timer: PendingTimer, payload: T) {
        self.cancel();
        self.pending = Some((timer, payload));
    }

    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((timer, _)) => {
                timer.abort();
                true
            }
            None => false,
        }
    }

    /// Payload of the pending timer if `id` is the one that just fired.
    /// Stale ids from aborted timers are ignored.
    pub fn fire(&mut self, id: TimerId) -> Option<T> {
        if self.pending.as_ref().is_some_and(|(t, _)| t.id() == id) {
            return self.pending.take().map(|(_, payload)| payload);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn armed_slot_fires_once() {
        let (tx, rx) = kanal::unbounded_async();
        let mut timers = Timers::new(tx);
        let mut slot = TimerSlot::default();

        slot.arm(timers.schedule(Duration::from_millis(100)), "payload");

        let Ok(SessionEvent::TimerFired(id)) = rx.recv().await else {
            panic!("Wrong event");
        };
        assert_eq!(slot.fire(id), Some("payload"));
        assert_eq!(slot.fire(id), None);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_previous_timer() {
        let (tx, rx) = kanal::unbounded_async();
        let mut timers = Timers::new(tx);
        let mut slot = TimerSlot::default();

        let first = timers.schedule(Duration::from_millis(100));
        let first_id = first.id();
        slot.arm(first, 1);
        slot.arm(timers.schedule(Duration::from_millis(300)), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().unwrap().is_none());
        assert_eq!(slot.fire(first_id), None);

        let Ok(SessionEvent::TimerFired(id)) = rx.recv().await else {
            panic!("Wrong event");
        };
        assert_eq!(slot.fire(id), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_slot_stays_silent() {
        let (tx, rx) = kanal::unbounded_async();
        let mut timers = Timers::new(tx);
        let mut slot = TimerSlot::default();

        slot.arm(timers.schedule(Duration::from_millis(50)), ());
        assert!(slot.cancel());
        assert!(!slot.cancel());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().unwrap().is_none());
    }
}
