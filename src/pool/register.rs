//! Lock-free best-score register shared by the workers of one entangled run.
//!
//! Scores are `f64`, but the register stores them as `i64` so that the
//! compare-and-update can be a single atomic CAS. A score is multiplied by the
//! run's scale factor and truncated toward zero, so two scores closer than
//! `1 / scale` can land on the same stored value.

use std::sync::atomic::{AtomicI64, Ordering};

/// Default score scale factor (precision floor of 1e-6).
pub const DEFAULT_SCALE: f64 = 1_000_000.0;

/// A score after scaling, as held by the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScaledScore(i64);

impl ScaledScore {
    /// Sentinel meaning "no solution yet".
    pub const NONE: ScaledScore = ScaledScore(i64::MAX);

    /// Largest value a real score can scale to.
    pub const MAX_FINITE: ScaledScore = ScaledScore(i64::MAX - 1);

    /// Scale a score. Returns `None` for NaN.
    ///
    /// Only `+inf` maps to the sentinel. Finite scores that overflow saturate
    /// to [`ScaledScore::MAX_FINITE`], and `-inf` to `i64::MIN`.
    pub fn from_score(score: f64, scale: f64) -> Option<Self> {
        if score.is_nan() {
            return None;
        }
        if score == f64::INFINITY {
            return Some(Self::NONE);
        }
        // The product can still overflow to +inf, which the cast saturates
        let scaled = ((score * scale).trunc() as i64).min(Self::MAX_FINITE.0);
        Some(ScaledScore(scaled))
    }

    /// Raw stored integer.
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Whether this is the "no solution yet" sentinel.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Convert back to a score. The sentinel becomes `+inf`.
    pub fn to_score(self, scale: f64) -> f64 {
        if self.is_none() {
            f64::INFINITY
        } else {
            self.0 as f64 / scale
        }
    }
}

/// Best score seen so far by any worker of a run.
///
/// Only ever decreases. All access is atomic; nothing here blocks.
#[derive(Debug)]
pub struct SharedScoreRegister {
    best: AtomicI64,
    scale: f64,
}

impl SharedScoreRegister {
    /// Create an empty register using the given scale factor.
    pub fn new(scale: f64) -> Self {
        Self {
            best: AtomicI64::new(ScaledScore::NONE.raw()),
            scale,
        }
    }

    /// Current best as stored.
    pub fn read(&self) -> ScaledScore {
        ScaledScore(self.best.load(Ordering::SeqCst))
    }

    /// Current best converted back to a score (`+inf` if nothing was published).
    pub fn best(&self) -> f64 {
        self.read().to_score(self.scale)
    }

    /// Store `candidate` if it scales below the current best.
    ///
    /// Returns true if the register was lowered by this call. NaN is ignored.
    pub fn maybe_publish(&self, candidate: f64) -> bool {
        let Some(scaled) = ScaledScore::from_score(candidate, self.scale) else {
            return false;
        };
        let new = scaled.raw();
        let mut current = self.best.load(Ordering::SeqCst);
        loop {
            if new >= current {
                return false;
            }
            match self.best.compare_exchange_weak(
                current,
                new,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    tracing::trace!(score = candidate, scaled = new, "shared best improved");
                    return true;
                }
                Err(c) => current = c,
            }
        }
    }
}

impl Default for SharedScoreRegister {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}
