//! Virtual-time timer queue.
//!
//! The page drives every timer from one place: each animation frame calls
//! [`Scheduler::advance_to`] (through its owner) with `performance.now()`, and
//! tests call it with whatever clock they like. Tasks fire in deadline order,
//! ties broken by insertion order, and while a task runs the scheduler clock
//! reads that task's deadline so repeating tasks keep an exact period.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// What a keyed task belongs to; used for cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub robot: String,
    pub kind: TaskKind,
}

impl TaskKey {
    pub fn new(robot: &str, kind: TaskKind) -> Self {
        Self {
            robot: robot.to_string(),
            kind,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    RevertDisplay,
    SpeakPulse,
    Blink,
    Glow,
    Ambient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Entry<T> {
    due: f64,
    id: TaskId,
    key: Option<TaskKey>,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // BinaryHeap is a max-heap; invert so the earliest (due, id) pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<T> Scheduler<T> {
    pub fn new(now: f64) -> Self {
        Self {
            now,
            next_id: 0,
            queue: BinaryHeap::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue `task` to run `delay_ms` after the current scheduler time.
    pub fn schedule(&mut self, delay_ms: f64, key: Option<TaskKey>, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            due: self.now + delay_ms.max(0.0),
            id,
            key,
            task,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| e.id != id);
        before != self.queue.len()
    }

    /// Drop every pending task carrying `key`; returns how many were removed.
    pub fn cancel_key(&mut self, key: &TaskKey) -> usize {
        let before = self.queue.len();
        self.queue.retain(|e| e.key.as_ref() != Some(key));
        before - self.queue.len()
    }

    pub fn has_pending(&self, key: &TaskKey) -> bool {
        self.queue.iter().any(|e| e.key.as_ref() == Some(key))
    }

    /// Earliest pending deadline, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.due)
    }

    /// Pop the next task due at or before `now`, moving the clock to its deadline.
    /// Once nothing more is due the clock settles on `now`.
    pub fn pop_due(&mut self, now: f64) -> Option<T> {
        match self.queue.peek() {
            Some(e) if e.due <= now => {
                let entry = self.queue.pop()?;
                self.now = self.now.max(entry.due);
                Some(entry.task)
            }
            _ => {
                self.now = self.now.max(now);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, now: f64) -> Vec<(f64, &'static str)> {
        let mut out = Vec::new();
        while let Some(t) = s.pop_due(now) {
            out.push((s.now(), t));
        }
        out
    }

    #[test]
    fn test_fires_in_deadline_then_insertion_order() {
        let mut s = Scheduler::new(0.0);
        s.schedule(300.0, None, "c");
        s.schedule(100.0, None, "a");
        s.schedule(100.0, None, "b");
        assert_eq!(drain(&mut s, 250.0), vec![(100.0, "a"), (100.0, "b")]);
        assert_eq!(s.now(), 250.0);
        assert_eq!(drain(&mut s, 1000.0), vec![(300.0, "c")]);
    }

    #[test]
    fn test_schedule_relative_to_task_deadline() {
        let mut s = Scheduler::new(0.0);
        s.schedule(200.0, None, "tick");
        assert_eq!(s.pop_due(450.0), Some("tick"));
        s.schedule(200.0, None, "tick2");
        assert_eq!(s.next_due(), Some(400.0));
        assert_eq!(s.pop_due(450.0), Some("tick2"));
        assert_eq!(s.pop_due(450.0), None);
    }

    #[test]
    fn test_cancel_by_key_and_id() {
        let mut s = Scheduler::new(0.0);
        let k = TaskKey::new("classic", TaskKind::RevertDisplay);
        s.schedule(10.0, Some(k.clone()), "r1");
        s.schedule(20.0, Some(k.clone()), "r2");
        let other = s.schedule(30.0, None, "x");
        assert!(s.has_pending(&k));
        assert_eq!(s.cancel_key(&k), 2);
        assert!(!s.has_pending(&k));
        assert!(s.cancel(other));
        assert!(!s.cancel(other));
        assert!(s.is_empty());
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut s: Scheduler<()> = Scheduler::new(500.0);
        assert_eq!(s.pop_due(100.0), None);
        assert_eq!(s.now(), 500.0);
    }
}
