//! One-shot deferred jobs keyed by due time.
//!
//! Jobs fire on the first poll at or after their due time, however many
//! frames that took.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Deferred {
    ShowHint,
    ConfettiBurst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct TimerId(u64);

#[derive(Clone, Debug)]
struct Pending {
    id: TimerId,
    due_ms: u64,
    job: Deferred,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Timers {
    next_id: u64,
    pending: Vec<Pending>,
}

impl Timers {
    pub(crate) fn schedule(&mut self, due_ms: u64, job: Deferred) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, due_ms, job });
        id
    }

    /// Returns false if the timer already fired or was cancelled.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Remove and return every job due by `now_ms`, earliest first.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Vec<Deferred> {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due_ms <= now_ms {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|p| (p.due_ms, p.id));
        due.into_iter().map(|p| p.job).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_due_time() {
        let mut timers = Timers::default();
        timers.schedule(400, Deferred::ConfettiBurst);
        assert!(timers.take_due(399).is_empty());
        assert_eq!(timers.take_due(400), vec![Deferred::ConfettiBurst]);
        assert!(timers.take_due(10_000).is_empty());
    }

    #[test]
    fn one_long_frame_releases_everything_in_order() {
        let mut timers = Timers::default();
        timers.schedule(3000, Deferred::ShowHint);
        timers.schedule(400, Deferred::ConfettiBurst);
        assert_eq!(
            timers.take_due(5000),
            vec![Deferred::ConfettiBurst, Deferred::ShowHint]
        );
        assert_eq!(timers.len(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = Timers::default();
        let id = timers.schedule(3000, Deferred::ShowHint);
        assert!(timers.is_pending(id));
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.take_due(3000).is_empty());
    }
}
