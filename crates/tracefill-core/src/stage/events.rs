use std::sync::mpsc;

use tracefill_engine::coords::Vec2;

use super::info::StageState;
use super::results::LevelResults;

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// The machine entered `state` at `stage_index`.
    StageEntered { stage_index: usize, state: StageState },
    /// Trace cursor or brush moved, in level units.
    CursorMoved { pos: Vec2 },
    StrokeProgress { drawn: f64, target: f64 },
    ContinuationGranted { stage_index: usize, extra_length: f64 },
    /// A stroke was released and scored.
    StrokeFinished {
        stage_index: usize,
        end_point: Vec2,
        error: f32,
        within_tolerance: bool,
    },
    /// A coverage measurement completed.
    FillProgress { stage_index: usize, coverage: f32 },
    /// Enough of the region was visited to allow moving on.
    EarlyContinueAvailable { stage_index: usize },
    /// A fill stage was completed and scored.
    FillFinished { stage_index: usize, coverage: f32 },
    StageUndone { from: usize, to: usize },
    LevelFinished { results: LevelResults },
}

/// How long a subscription lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionScope {
    /// Dropped when the current stage is left.
    Stage,
    /// Lives until unsubscribed.
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    scope: SubscriptionScope,
    callback: Box<dyn FnMut(&StageEvent)>,
}

/// Explicit observer list.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        scope: SubscriptionScope,
        callback: impl FnMut(&StageEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            scope,
            callback: Box::new(callback),
        });
        id
    }

    /// Forwards events into a channel. Events sent after the receiver is
    /// dropped are discarded.
    pub fn subscribe_channel(
        &mut self,
        scope: SubscriptionScope,
    ) -> (SubscriptionId, mpsc::Receiver<StageEvent>) {
        let (sender, receiver) = mpsc::channel();
        let id = self.subscribe(scope, move |ev| {
            let _ = sender.send(ev.clone());
        });
        (id, receiver)
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &StageEvent) {
        for s in &mut self.subscribers {
            (s.callback)(event);
        }
    }

    /// Drops every stage-scoped subscription.
    pub fn end_stage(&mut self) {
        self.subscribers.retain(|s| s.scope != SubscriptionScope::Stage);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ev() -> StageEvent {
        StageEvent::CursorMoved { pos: Vec2::zero() }
    }

    #[test]
    fn stage_scope_ends_with_stage() {
        let mut obs = Observers::new();
        let hits = Rc::new(RefCell::new((0, 0)));

        let h = hits.clone();
        obs.subscribe(SubscriptionScope::Stage, move |_| h.borrow_mut().0 += 1);
        let h = hits.clone();
        obs.subscribe(SubscriptionScope::Level, move |_| h.borrow_mut().1 += 1);

        obs.emit(&ev());
        obs.end_stage();
        obs.emit(&ev());

        assert_eq!(*hits.borrow(), (1, 2));
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut obs = Observers::new();
        let (id, rx) = obs.subscribe_channel(SubscriptionScope::Level);

        obs.emit(&ev());
        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.emit(&ev());

        assert_eq!(rx.try_iter().count(), 1);
    }
}
