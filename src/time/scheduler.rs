//! Deadline-ordered queue of deferred callbacks

use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::core::types::ProcessId;

pub type ProcessCallback = Box<dyn FnOnce(Duration)>;

/// A deferred callback with a game-time deadline
///
/// A process whose start time is [`Duration::ZERO`] runs as soon as it is
/// added and is never queued.
pub struct Process {
    label: String,
    start_time: Duration,
    end_time: Duration,
    callback: ProcessCallback,
}

impl Process {
    pub fn new(
        label: impl Into<String>,
        start_time: Duration,
        end_time: Duration,
        callback: impl FnOnce(Duration) + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            start_time,
            end_time: end_time.max(start_time),
            callback: Box::new(callback),
        }
    }

    /// Process starting at `start_time` and finishing `length` later
    pub fn starting_at(
        label: impl Into<String>,
        start_time: Duration,
        length: Duration,
        callback: impl FnOnce(Duration) + 'static,
    ) -> Self {
        Self::new(label, start_time, start_time + length, callback)
    }

    /// Process that runs as soon as it is added
    pub fn immediate(label: impl Into<String>, callback: impl FnOnce(Duration) + 'static) -> Self {
        Self::new(label, Duration::ZERO, Duration::ZERO, callback)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_time(&self) -> Duration {
        self.start_time
    }

    pub fn end_time(&self) -> Duration {
        self.end_time
    }

    pub fn is_immediate(&self) -> bool {
        self.start_time.is_zero()
    }

    fn run(self, now: Duration) {
        (self.callback)(now);
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("label", &self.label)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .finish()
    }
}

/// What happened to a process handed to the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    /// Ran synchronously inside `add_process`
    Ran,
    Pending(ProcessId),
}

/// Fires pending processes in deadline order
///
/// Equal deadlines fire in the order the processes were added.
#[derive(Debug, Default)]
pub struct ProcessScheduler {
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Process>,
    deadlines: AHashMap<ProcessId, Duration>,
    waiting: bool,
}

impl ProcessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&mut self, process: Process, now: Duration) -> Scheduled {
        if process.is_immediate() {
            debug!("Running process '{}' immediately", process.label());
            process.run(now);
            return Scheduled::Ran;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let id = ProcessId(seq);
        let deadline = process.end_time();
        debug!("Scheduled process '{}' ({:?}) for {:?}", process.label(), id, deadline);

        self.pending.insert((deadline, seq), process);
        self.deadlines.insert(id, deadline);
        if self.pending.len() == 1 {
            self.waiting = true;
        }
        Scheduled::Pending(id)
    }

    /// Cancel a pending process. Returns false if it is unknown or already fired.
    pub fn remove_process(&mut self, id: ProcessId) -> bool {
        let Some(deadline) = self.deadlines.remove(&id) else {
            return false;
        };
        let removed = self.pending.remove(&(deadline, id.0)).is_some();
        if removed {
            debug!("Cancelled process {:?}", id);
        }
        removed
    }

    /// Fire every pending process whose deadline is at or before `now`
    ///
    /// Returns the fired ids in firing order. Once the queue drains the
    /// scheduler stops waiting until the next process is added.
    pub fn poll(&mut self, now: Duration) -> Vec<ProcessId> {
        let mut fired = Vec::new();
        if !self.waiting {
            return fired;
        }

        loop {
            let Some(&(deadline, seq)) = self.pending.keys().next() else {
                self.waiting = false;
                break;
            };
            if now < deadline {
                break;
            }
            let Some(process) = self.pending.remove(&(deadline, seq)) else {
                continue;
            };
            let id = ProcessId(seq);
            self.deadlines.remove(&id);
            debug!("Firing process '{}' ({:?}) at {:?}", process.label(), id, now);
            process.run(now);
            fired.push(id);
        }
        fired
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending process without running it
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
        self.waiting = false;
    }
}
