use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TreeScanError;
use crate::hierarchy::{Hierarchy, NodeId};
use crate::results::{BatchId, EntryId, ScanEntry, ScanReport, ScanSnapshot, ScanStats, ScanStatus};
use crate::traits::{Verdict, VerdictSource};

/// Message attached to every file that resolves to `Error`.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Potential code quality issue detected. Consider reviewing this file for best practices.";

// ---------------------------------------------------------------------------
// ScanTimings
// ---------------------------------------------------------------------------

/// Delays that drive the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimings {
    /// Time between two reveals.
    pub reveal_interval: Duration,

    /// Time from a file's reveal to `Scanning`.
    pub scan_delay: Duration,

    /// Time from `Scanning` to the verdict.
    pub verdict_delay: Duration,
}

impl Default for ScanTimings {
    fn default() -> Self {
        Self {
            reveal_interval: Duration::from_millis(800),
            scan_delay: Duration::from_millis(300),
            verdict_delay: Duration::from_millis(1200),
        }
    }
}

impl ScanTimings {
    /// A zero reveal interval would reveal the whole batch in one instant
    /// and spin the driver; the other delays may be zero.
    pub fn validate(&self) -> Result<(), TreeScanError> {
        if self.reveal_interval.is_zero() {
            return Err(TreeScanError::InvalidTiming("reveal interval must be non-zero"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A transition request delivered to a [`ScanSession`] by its driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent {
    /// Reveal the next node of the flattened order.
    Reveal,

    /// Move a file from `Pending` to `Scanning`.
    BeginScan(EntryId),

    /// Give a scanning file its verdict.
    Resolve(EntryId),
}

/// A follow-up event the session wants delivered after `after` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub after: Duration,
    pub event: ScanEvent,
}

impl Scheduled {
    fn new(after: Duration, event: ScanEvent) -> Self {
        Self { after, event }
    }
}

// ---------------------------------------------------------------------------
// ScanSession
// ---------------------------------------------------------------------------

/// The state owner of one batch.
///
/// A session never schedules anything itself: every call to
/// [`apply`](Self::apply) returns the follow-ups it wants, and the driver
/// (a [`Timeline`] or a [`Scanner`](crate::Scanner)) decides how time
/// passes. All mutation of entries and counters goes through `apply`.
pub struct ScanSession {
    batch: BatchId,
    hierarchy: Hierarchy,
    order: Vec<NodeId>,
    cursor: usize,
    started: bool,
    entries: Vec<ScanEntry>,
    stats: ScanStats,
    timings: ScanTimings,
    verdicts: Arc<dyn VerdictSource>,
    error_message: String,
}

impl ScanSession {
    /// Wrap a built hierarchy. The reveal order is fixed here: the
    /// depth-first flattening of `hierarchy`.
    pub fn new(
        batch: BatchId,
        hierarchy: Hierarchy,
        timings: ScanTimings,
        verdicts: Arc<dyn VerdictSource>,
    ) -> Self {
        let order: Vec<NodeId> = hierarchy.flatten().map(|n| n.id).collect();
        let stats = ScanStats {
            total: hierarchy.file_count(),
            scanned: 0,
            errors: 0,
        };

        Self {
            batch,
            hierarchy,
            entries: Vec::with_capacity(order.len()),
            order,
            cursor: 0,
            started: false,
            stats,
            timings,
            verdicts,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Replace the message attached to `Error` verdicts.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub(crate) fn set_batch(&mut self, batch: BatchId) {
        self.batch = batch;
    }

    /// Kick the batch off: the first reveal happens one interval from now.
    ///
    /// Only the first call schedules anything; later calls return an empty
    /// list so the reveal chain can never be doubled.
    pub fn start(&mut self) -> Vec<Scheduled> {
        if self.started {
            tracing::warn!(batch = self.batch.0, "scan batch already started");
            return Vec::new();
        }
        self.started = true;

        tracing::info!(
            batch = self.batch.0,
            nodes = self.order.len(),
            files = self.stats.total,
            "scan batch started"
        );
        if self.order.is_empty() {
            return Vec::new();
        }
        vec![Scheduled::new(self.timings.reveal_interval, ScanEvent::Reveal)]
    }

    /// Apply one event and return the follow-ups to schedule.
    ///
    /// Events that don't fit the entry's current status are ignored, so a
    /// status can never be skipped or reversed.
    pub fn apply(&mut self, event: ScanEvent) -> Vec<Scheduled> {
        match event {
            ScanEvent::Reveal => self.reveal(),
            ScanEvent::BeginScan(id) => self.begin_scan(id),
            ScanEvent::Resolve(id) => self.resolve(id),
        }
    }

    fn reveal(&mut self) -> Vec<Scheduled> {
        let Some(&node_id) = self.order.get(self.cursor) else {
            tracing::warn!(batch = self.batch.0, "reveal after the last node ignored");
            return Vec::new();
        };

        let node = self.hierarchy.get(node_id);
        let id = EntryId(self.entries.len());
        let status = if node.is_folder() {
            ScanStatus::Structural
        } else {
            ScanStatus::Pending
        };

        tracing::debug!(batch = self.batch.0, entry = id.0, path = %node.path, "revealed");
        self.entries.push(ScanEntry {
            id,
            node: node_id,
            name: node.name.clone(),
            path: node.path.clone(),
            depth: node.depth,
            kind: node.kind,
            content: Arc::clone(&node.content),
            status,
        });
        self.cursor += 1;

        let mut next = Vec::with_capacity(2);
        if !node.is_folder() {
            next.push(Scheduled::new(self.timings.scan_delay, ScanEvent::BeginScan(id)));
        }
        if self.is_revealing() {
            next.push(Scheduled::new(self.timings.reveal_interval, ScanEvent::Reveal));
        } else {
            tracing::debug!(batch = self.batch.0, "reveal loop finished");
        }
        next
    }

    fn begin_scan(&mut self, id: EntryId) -> Vec<Scheduled> {
        let Some(entry) = self.entries.get_mut(id.0) else {
            tracing::warn!(batch = self.batch.0, entry = id.0, "begin-scan for unknown entry");
            return Vec::new();
        };
        if entry.status != ScanStatus::Pending {
            tracing::warn!(
                batch = self.batch.0,
                entry = id.0,
                status = entry.status.label(),
                "begin-scan ignored"
            );
            return Vec::new();
        }

        entry.status = ScanStatus::Scanning;
        tracing::debug!(batch = self.batch.0, entry = id.0, "scanning");
        vec![Scheduled::new(self.timings.verdict_delay, ScanEvent::Resolve(id))]
    }

    fn resolve(&mut self, id: EntryId) -> Vec<Scheduled> {
        let Some(entry) = self.entries.get_mut(id.0) else {
            tracing::warn!(batch = self.batch.0, entry = id.0, "resolve for unknown entry");
            return Vec::new();
        };
        if entry.status != ScanStatus::Scanning {
            tracing::warn!(
                batch = self.batch.0,
                entry = id.0,
                status = entry.status.label(),
                "resolve ignored"
            );
            return Vec::new();
        }

        let verdict = self.verdicts.judge(entry);
        entry.status = match verdict {
            Verdict::Suspect => ScanStatus::Suspect,
            Verdict::Error => ScanStatus::Error {
                message: self.error_message.clone(),
            },
        };
        self.stats.scanned += 1;
        if verdict == Verdict::Error {
            self.stats.errors += 1;
        }
        tracing::debug!(batch = self.batch.0, entry = id.0, ?verdict, "resolved");

        if self.is_finished() {
            tracing::info!(
                batch = self.batch.0,
                scanned = self.stats.scanned,
                errors = self.stats.errors,
                "scan batch finished"
            );
        }
        Vec::new()
    }

    // ── Observation ───────────────────────────────────────────────────────

    /// The batch this session belongs to.
    pub fn batch(&self) -> BatchId {
        self.batch
    }

    /// The tree the batch was built from.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Revealed entries in reveal order.
    pub fn entries(&self) -> &[ScanEntry] {
        &self.entries
    }

    /// Current counters. `total` is fixed at construction.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Nodes remain to be revealed.
    pub fn is_revealing(&self) -> bool {
        self.cursor < self.order.len()
    }

    /// Every node revealed and every file resolved.
    pub fn is_finished(&self) -> bool {
        !self.is_revealing() && self.stats.is_complete()
    }

    /// An owned copy of everything an observer may see.
    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            batch: self.batch,
            entries: self.entries.clone(),
            stats: self.stats,
            revealing: self.is_revealing(),
        }
    }

    /// Consume the session into its final report, with the records the
    /// hierarchy skipped.
    pub fn into_report(self, elapsed: Duration) -> ScanReport {
        ScanReport {
            batch: self.batch,
            entries: self.entries,
            stats: self.stats,
            skipped: self.hierarchy.skipped().to_vec(),
            elapsed,
        }
    }

    /// Drive the session to the end on a fresh virtual [`Timeline`].
    pub fn run_to_completion(mut self) -> ScanReport {
        let mut timeline = Timeline::new();
        timeline.schedule(self.start());
        let elapsed = timeline.run_to_completion(&mut self);
        self.into_report(elapsed)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// A virtual-clock scheduler for a [`ScanSession`].
///
/// Events fire in due-time order; events due at the same instant fire in
/// the order they were scheduled. Nothing ever sleeps.
#[derive(Debug, Default)]
pub struct Timeline {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Reverse<Pending>>,
}

#[derive(Debug)]
struct Pending {
    due: Duration,
    seq: u64,
    event: ScanEvent,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl Timeline {
    /// An empty timeline at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of events waiting to fire.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue follow-ups relative to the current virtual time.
    pub fn schedule(&mut self, items: impl IntoIterator<Item = Scheduled>) {
        for item in items {
            self.seq += 1;
            self.queue.push(Reverse(Pending {
                due: self.now + item.after,
                seq: self.seq,
                event: item.event,
            }));
        }
    }

    /// Fire the next event, moving the clock to its due time.
    /// Returns `None` once nothing is left.
    pub fn step(&mut self, session: &mut ScanSession) -> Option<ScanEvent> {
        let Reverse(next) = self.queue.pop()?;
        self.now = next.due;
        let follow_ups = session.apply(next.event);
        self.schedule(follow_ups);
        Some(next.event)
    }

    /// Fire everything due within `by`, then move the clock forward by
    /// exactly `by`. Returns the number of events fired.
    pub fn advance(&mut self, by: Duration, session: &mut ScanSession) -> usize {
        let until = self.now + by;
        let mut fired = 0;
        while self
            .queue
            .peek()
            .is_some_and(|Reverse(next)| next.due <= until)
        {
            self.step(session);
            fired += 1;
        }
        self.now = until;
        fired
    }

    /// Fire events until the queue is empty. Returns the final virtual time.
    pub fn run_to_completion(&mut self, session: &mut ScanSession) -> Duration {
        while self.step(session).is_some() {}
        self.now
    }
}
