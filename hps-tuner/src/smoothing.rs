//! Frame-to-frame stabilization of pitch estimates.

/// Default weight of the newest estimate in the moving average.
pub const DEFAULT_SMOOTHING_WEIGHT: f64 = 0.1;

/// Default relative jump above which the smoother snaps instead of blending.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 0.1;

/// Exponential moving average over successive pitch estimates.
///
/// Small wobbles around the current value are averaged out. A jump larger
/// than `snap_threshold` relative to the mean of the old and new values is
/// taken as a real note change (or a note onset after silence) and is
/// followed immediately.
///
/// Each independently tracked signal needs its own smoother.
///
/// # Example
/// ```
/// use hps_tuner::smoothing::PitchSmoother;
/// let mut smoother = PitchSmoother::default();
/// assert_eq!(smoother.update(220.0), 220.0);
/// ```
#[derive(Debug, Clone)]
pub struct PitchSmoother {
    weight: f64,
    snap_threshold: f64,
    previous: f64,
}

impl Default for PitchSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WEIGHT, DEFAULT_SNAP_THRESHOLD)
    }
}

impl PitchSmoother {
    /// Creates a smoother with no history.
    ///
    /// `weight` is the share of each new estimate in the average, clamped to
    /// `[0, 1]`.
    pub fn new(weight: f64, snap_threshold: f64) -> Self {
        Self {
            weight: weight.clamp(0.0, 1.0),
            snap_threshold,
            previous: 0.0,
        }
    }

    /// Starts the average at `previous` instead of zero.
    #[must_use]
    pub fn with_previous(mut self, previous: f64) -> Self {
        self.previous = previous;
        self
    }

    /// The value returned by the last update, or 0 before the first one.
    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Feeds a raw estimate and returns the smoothed value.
    pub fn update(&mut self, raw: f64) -> f64 {
        let mean = (raw + self.previous) / 2.0;
        let snap = mean == 0.0 || (raw - self.previous).abs() / mean.abs() > self.snap_threshold;

        self.previous = if snap {
            raw
        } else {
            (1.0 - self.weight) * self.previous + self.weight * raw
        };
        self.previous
    }

    /// Runs `estimate` and smooths its result.
    pub fn smooth<F>(&mut self, estimate: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let raw = estimate();
        self.update(raw)
    }

    /// Forgets the history.
    pub fn reset(&mut self) {
        self.previous = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_estimate_snaps() {
        let mut smoother = PitchSmoother::default();
        assert_eq!(smoother.update(220.0), 220.0);
        assert_eq!(smoother.previous(), 220.0);
    }

    #[test]
    fn small_change_is_blended() {
        let mut smoother = PitchSmoother::default().with_previous(220.0);
        let smoothed = smoother.update(221.0);
        assert!((smoothed - 220.1).abs() < 1e-9, "got {smoothed}");
        assert_eq!(smoother.previous(), smoothed);
    }

    #[test]
    fn large_change_snaps() {
        let mut smoother = PitchSmoother::default().with_previous(220.0);
        assert_eq!(smoother.update(440.0), 440.0);
    }

    #[test]
    fn converges_on_steady_input() {
        let mut smoother = PitchSmoother::default().with_previous(220.0);
        let mut value = 0.0;
        for _ in 0..200 {
            value = smoother.smooth(|| 222.0);
        }
        assert!((value - 222.0).abs() < 1e-6);
    }

    #[test]
    fn zero_stays_zero() {
        let mut smoother = PitchSmoother::default();
        assert_eq!(smoother.update(0.0), 0.0);
        assert!(smoother.update(0.0).is_finite());
    }

    #[test]
    fn weight_controls_responsiveness() {
        let mut smoother = PitchSmoother::new(0.5, 0.1).with_previous(100.0);
        assert!((smoother.update(104.0) - 102.0).abs() < 1e-9);

        let mut frozen = PitchSmoother::new(0.0, 0.1).with_previous(100.0);
        assert_eq!(frozen.update(104.0), 100.0);
    }

    #[test]
    fn reset_forgets_history() {
        let mut smoother = PitchSmoother::default().with_previous(220.0);
        smoother.reset();
        assert_eq!(smoother.previous(), 0.0);
        assert_eq!(smoother.update(221.0), 221.0);
    }
}
