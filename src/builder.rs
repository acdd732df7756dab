use std::sync::Arc;
use std::time::Duration;

use crate::config::ScanConfig;
use crate::engine::{ScanSession, ScanTimings, DEFAULT_ERROR_MESSAGE};
use crate::entry::UploadedRecord;
use crate::error::TreeScanError;
use crate::hierarchy::Hierarchy;
use crate::results::{BatchId, ScanReport};
use crate::traits::{RecordSource, VerdictSource};
use crate::verdict::{RandomVerdict, DEFAULT_ERROR_PROBABILITY};

// ---------------------------------------------------------------------------
// ScanBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring a simulated scan.
///
/// Created via [`treescan::scan()`](crate::scan). Configure with chained
/// builder methods, then call [`prepare()`](ScanBuilder::prepare) to get a
/// [`ScanSession`] for a driver, or [`simulate()`](ScanBuilder::simulate) to
/// run the whole batch on a virtual clock.
///
/// # Example
///
/// ```rust,ignore
/// let session = treescan::scan()
///     .source(DirectorySource::new("./my-project"))
///     .error_probability(0.3)
///     .seed(7)
///     .prepare()?;
/// scanner.start(session);
/// ```
pub struct ScanBuilder {
    source:            Option<Box<dyn RecordSource>>,
    verdicts:          Option<Arc<dyn VerdictSource>>,
    timings:           ScanTimings,
    error_probability: f64,
    seed:              Option<u64>,
    error_message:     String,
}

impl Default for ScanBuilder {
    fn default() -> Self {
        Self {
            source:            None,
            verdicts:          None,
            timings:           ScanTimings::default(),
            error_probability: DEFAULT_ERROR_PROBABILITY,
            seed:              None,
            error_message:     DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ScanBuilder {
    // ── Source ────────────────────────────────────────────────────────────

    /// Set where the batch's records come from.
    pub fn source(mut self, s: impl RecordSource + 'static) -> Self {
        self.source = Some(Box::new(s));
        self
    }

    /// Shorthand for an in-memory batch.
    pub fn records(self, records: Vec<UploadedRecord>) -> Self {
        self.source(records)
    }

    // ── Verdicts ──────────────────────────────────────────────────────────

    /// Use a custom verdict source instead of the random default.
    ///
    /// When set, `error_probability` and `seed` are not used.
    pub fn with_verdicts(mut self, v: impl VerdictSource + 'static) -> Self {
        self.verdicts = Some(Arc::new(v));
        self
    }

    /// Probability that a file resolves to `Error`. Defaults to 0.3.
    pub fn error_probability(mut self, p: f64) -> Self {
        self.error_probability = p;
        self
    }

    /// Make the random verdicts reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Message attached to files that resolve to `Error`.
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    // ── Timings ───────────────────────────────────────────────────────────

    /// Time between two reveals. Defaults to 800ms; must be non-zero.
    pub fn reveal_interval(mut self, d: Duration) -> Self {
        self.timings.reveal_interval = d;
        self
    }

    /// Time from a file's reveal to `Scanning`. Defaults to 300ms.
    pub fn scan_delay(mut self, d: Duration) -> Self {
        self.timings.scan_delay = d;
        self
    }

    /// Time from `Scanning` to the verdict. Defaults to 1200ms.
    pub fn verdict_delay(mut self, d: Duration) -> Self {
        self.timings.verdict_delay = d;
        self
    }

    /// Take timings, probability, message and seed from a loaded config.
    pub fn config(mut self, config: &ScanConfig) -> Self {
        self.timings = config.timings();
        self.error_probability = config.error_probability;
        self.error_message = config.error_message.clone();
        self.seed = config.seed;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Read the records, build the hierarchy, and return a session that
    /// has not started yet.
    ///
    /// # Errors
    ///
    /// Returns `Err` when no source was provided, the source fails, a path
    /// is malformed, or a timing or probability is out of range. Nothing
    /// is built for a rejected batch.
    pub fn prepare(self) -> Result<ScanSession, TreeScanError> {
        let source = self.source.ok_or_else(|| {
            TreeScanError::InvalidSource("no source provided".into())
        })?;
        self.timings.validate()?;

        let verdicts: Arc<dyn VerdictSource> = match self.verdicts {
            Some(v) => v,
            None => match self.seed {
                Some(seed) => Arc::new(RandomVerdict::seeded(self.error_probability, seed)?),
                None => Arc::new(RandomVerdict::new(self.error_probability)?),
            },
        };

        let records = source.records()?;
        let hierarchy = Hierarchy::build(&records)?;

        Ok(ScanSession::new(BatchId::default(), hierarchy, self.timings, verdicts)
            .with_error_message(self.error_message))
    }

    /// Prepare the session and run it to completion on a virtual clock.
    pub fn simulate(self) -> Result<ScanReport, TreeScanError> {
        Ok(self.prepare()?.run_to_completion())
    }
}
