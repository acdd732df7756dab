use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TreeScanError;
use crate::results::ScanEntry;
use crate::traits::{Verdict, VerdictSource};

/// Reference probability that a scanned file resolves to `Error`.
pub const DEFAULT_ERROR_PROBABILITY: f64 = 0.3;

/// Draws `Error` with a fixed probability, `Suspect` otherwise.
///
/// Unseeded instances use the thread-local generator; seeded ones replay
/// the same sequence of verdicts for the same sequence of calls.
pub struct RandomVerdict {
    error_probability: f64,
    rng: Option<Mutex<StdRng>>,
}

impl RandomVerdict {
    /// # Errors
    ///
    /// [`TreeScanError::InvalidProbability`] unless `0.0 <= p <= 1.0`.
    pub fn new(error_probability: f64) -> Result<Self, TreeScanError> {
        validate_probability(error_probability)?;
        Ok(Self {
            error_probability,
            rng: None,
        })
    }

    /// Like [`new`](Self::new), but deterministic for a given seed.
    pub fn seeded(error_probability: f64, seed: u64) -> Result<Self, TreeScanError> {
        validate_probability(error_probability)?;
        Ok(Self {
            error_probability,
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        })
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }
}

impl Default for RandomVerdict {
    fn default() -> Self {
        Self {
            error_probability: DEFAULT_ERROR_PROBABILITY,
            rng: None,
        }
    }
}

impl VerdictSource for RandomVerdict {
    fn judge(&self, _entry: &ScanEntry) -> Verdict {
        let hit = match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                rng.random_bool(self.error_probability)
            }
            None => rand::rng().random_bool(self.error_probability),
        };
        if hit {
            Verdict::Error
        } else {
            Verdict::Suspect
        }
    }
}

/// Always returns the same verdict.
pub struct FixedVerdict(pub Verdict);

impl VerdictSource for FixedVerdict {
    fn judge(&self, _entry: &ScanEntry) -> Verdict {
        self.0
    }
}

pub(crate) fn validate_probability(p: f64) -> Result<(), TreeScanError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(TreeScanError::InvalidProbability(p))
    }
}
