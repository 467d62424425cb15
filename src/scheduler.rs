//! Cooperative scheduler for the consumer's two periodic tasks
//!
//! Time is passed in as an offset from the scheduler's start, so tests can
//! step it with synthetic durations instead of sleeping.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Read new lines from the transport and ingest them
    IngestPoll,
    /// Take a snapshot and hand it to the renderer
    SnapshotRender,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::IngestPoll => "ingest-poll",
            TaskKind::SnapshotRender => "snapshot-render",
        }
    }
}

#[derive(Debug, Clone)]
struct PeriodicTask {
    kind: TaskKind,
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<PeriodicTask>,
}

impl Scheduler {
    /// Both tasks are due immediately at offset zero; ingest runs first when
    /// deadlines coincide.
    pub fn new(poll_interval: Duration, render_interval: Duration) -> Self {
        Self {
            tasks: vec![
                PeriodicTask {
                    kind: TaskKind::IngestPoll,
                    interval: poll_interval,
                    next_due: Duration::ZERO,
                },
                PeriodicTask {
                    kind: TaskKind::SnapshotRender,
                    interval: render_interval,
                    next_due: Duration::ZERO,
                },
            ],
        }
    }

    /// Earliest deadline across all tasks
    pub fn next_deadline(&self) -> Duration {
        self.tasks
            .iter()
            .map(|task| task.next_due)
            .min()
            .unwrap_or(Duration::ZERO)
    }

    /// Tasks due at `now`, in registration order. Each returned task runs once
    /// even if several of its periods were missed; its next deadline is the
    /// first multiple of its interval after `now`.
    pub fn step(&mut self, now: Duration) -> Vec<TaskKind> {
        let mut due = Vec::new();

        for task in &mut self.tasks {
            if task.next_due > now {
                continue;
            }
            due.push(task.kind);

            if task.interval.is_zero() {
                task.next_due = now;
                continue;
            }
            while task.next_due <= now {
                task.next_due += task.interval;
            }
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_both_tasks_due_at_start() {
        let mut scheduler = Scheduler::new(secs(2), secs(2));
        assert_eq!(scheduler.next_deadline(), Duration::ZERO);
        assert_eq!(
            scheduler.step(Duration::ZERO),
            vec![TaskKind::IngestPoll, TaskKind::SnapshotRender]
        );
        assert_eq!(scheduler.next_deadline(), secs(2));
        assert!(scheduler.step(secs(1)).is_empty());
    }

    #[test]
    fn test_independent_intervals() {
        let mut scheduler = Scheduler::new(secs(2), secs(3));
        scheduler.step(Duration::ZERO);

        assert_eq!(scheduler.step(secs(2)), vec![TaskKind::IngestPoll]);
        assert_eq!(scheduler.next_deadline(), secs(3));
        assert_eq!(scheduler.step(secs(3)), vec![TaskKind::SnapshotRender]);
        assert_eq!(
            scheduler.step(secs(6)),
            vec![TaskKind::IngestPoll, TaskKind::SnapshotRender]
        );
    }

    #[test]
    fn test_missed_periods_coalesce() {
        let mut scheduler = Scheduler::new(secs(2), secs(10));
        scheduler.step(Duration::ZERO);

        // a slow iteration overran several poll periods
        assert_eq!(scheduler.step(secs(7)), vec![TaskKind::IngestPoll]);
        assert_eq!(scheduler.next_deadline(), secs(8));
    }

    #[test]
    fn test_task_names() {
        assert_eq!(TaskKind::IngestPoll.as_str(), "ingest-poll");
    }
}
