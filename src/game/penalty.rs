// DDR-style miss penalty scaling. Short combos get a lenient multiplier that
// ramps up to 1.0 at the beginner threshold, longer ones ramp toward the cap.
// Once a player has settled into a consistent average the combo length is
// snapped so one lucky or unlucky stretch can't swing the penalty around.

/// Misses before the lenient ramp gives way to the full ramp.
const BEGINNER_COMBO_THRESHOLD: u32 = 8;
const BEGINNER_LOW: f64 = 0.2;
const BEGINNER_HIGH: f64 = 1.0;
const MAX_MULTIPLIER: f64 = 1.8;
const CONSISTENT_PENALTY_MULTIPLIER: u32 = 3;

/// Combo length used once the running average says the player keeps missing.
const CONSISTENTLY_POOR_COMBO: u32 = BEGINNER_COMBO_THRESHOLD / CONSISTENT_PENALTY_MULTIPLIER + 1;
/// Combo length used once the running average says the player keeps comboing.
const CONSISTENTLY_STRONG_COMBO: u32 = BEGINNER_COMBO_THRESHOLD * CONSISTENT_PENALTY_MULTIPLIER + 1;

/// Adaptive penalty multiplier with a session-long memory.
///
/// Every estimate is recorded and the average over *all* of them feeds the
/// next call. Only the sum and count are kept: the average is the same as
/// averaging the full sequence, without the sequence growing for the whole
/// session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenaltyEstimator {
    sum: f64,
    samples: u64,
}

impl PenaltyEstimator {
    pub const fn new() -> Self {
        Self {
            sum: 0.0,
            samples: 0,
        }
    }

    /// Returns the penalty multiplier for a combo of `combo_length` notes and
    /// records it.
    pub fn estimate(&mut self, combo_length: u32) -> f64 {
        let mut x = combo_length.max(1);

        let average = self.average();
        if average > 0.0 && average < 0.5 {
            x = CONSISTENTLY_POOR_COMBO;
        } else if average >= 1.0 {
            x = CONSISTENTLY_STRONG_COMBO;
        }

        let ret = if x <= BEGINNER_COMBO_THRESHOLD {
            BEGINNER_LOW
                + (BEGINNER_HIGH - BEGINNER_LOW) * (f64::from(x) / f64::from(BEGINNER_COMBO_THRESHOLD))
        } else {
            let scaled = f64::from(x - BEGINNER_COMBO_THRESHOLD) / (MAX_MULTIPLIER - BEGINNER_HIGH);
            BEGINNER_HIGH + (MAX_MULTIPLIER - BEGINNER_HIGH) * scaled.min(1.0)
        };

        self.sum += ret;
        self.samples += 1;
        ret
    }

    /// Mean of every recorded multiplier, 0 before the first estimate.
    pub fn average(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / self.samples as f64
        }
    }

    pub const fn samples(&self) -> u64 {
        self.samples
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9
    }

    #[test]
    fn first_miss_at_zero_combo_is_lenient() {
        let mut p = PenaltyEstimator::new();
        assert!(close(p.estimate(0), 0.3));
        assert_eq!(p.samples(), 1);
        assert!(close(p.average(), 0.3));
    }

    #[test]
    fn beginner_ramp_reaches_one_at_threshold() {
        let mut p = PenaltyEstimator::new();
        // A fresh estimator per call keeps the average out of the picture.
        assert!(close(p.estimate(8), 1.0));
        let mut p = PenaltyEstimator::new();
        assert!(close(p.estimate(4), 0.6));
    }

    #[test]
    fn long_combos_cap_at_max_multiplier() {
        for combo in [9, 12, 30, 500] {
            let mut p = PenaltyEstimator::new();
            assert!(close(p.estimate(combo), MAX_MULTIPLIER), "combo {combo}");
        }
    }

    #[test]
    fn ramps_never_invert() {
        let fresh = |x: u32| PenaltyEstimator::new().estimate(x);
        for x in 1..8 {
            assert!(fresh(x) <= fresh(x + 1), "beginner ramp inverted at {x}");
        }
        for x in 9..30 {
            assert!(fresh(x) <= fresh(x + 1), "upper ramp inverted at {x}");
        }
    }

    #[test]
    fn consistently_poor_average_snaps_to_short_combo() {
        let mut p = PenaltyEstimator::new();
        p.estimate(1); // 0.3, average now below 0.5
        let snapped = p.estimate(30);
        assert!(close(snapped, 0.2 + 0.8 * 3.0 / 8.0));
    }

    #[test]
    fn consistently_strong_average_snaps_to_long_combo() {
        let mut p = PenaltyEstimator::new();
        p.estimate(20); // 1.8, average now above 1
        assert!(close(p.estimate(1), MAX_MULTIPLIER));
    }

    #[test]
    fn average_covers_every_recorded_value() {
        let mut p = PenaltyEstimator::new();
        let values: Vec<f64> = [8, 8, 0, 8].into_iter().map(|c| p.estimate(c)).collect();
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert!(close(p.average(), expected));
        p.reset();
        assert_eq!(p.samples(), 0);
        assert!(close(p.average(), 0.0));
    }
}
