//! Movement-pattern classification from byte-delta magnitudes
//!
//! Buckets the average absolute successive-sample delta into four
//! proportions using tiered rules. Proportions are quantized to whole
//! percent and the remainder always lands in the static bucket, so the
//! four values sum to exactly 100; arithmetic is never trusted to land
//! there on its own.

/// Movement proportions before the orchestrator attaches its note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProportions {
    pub linear: f64,
    pub circular: f64,
    pub static_: f64,
    pub hyperactive: f64,
}

impl MotionProportions {
    pub fn sum(&self) -> f64 {
        self.linear + self.circular + self.static_ + self.hyperactive
    }
}

/// Tiered movement-pattern classifier
pub struct MotionClassifier {
    /// Average delta above this is the hyperactive tier
    high_tier: f64,
    /// Average delta above this (but below high) is the mid tier
    mid_tier: f64,
}

impl MotionClassifier {
    pub fn new(high_tier: f64, mid_tier: f64) -> Self {
        Self {
            high_tier,
            mid_tier,
        }
    }

    /// Classify an average delta magnitude into four proportions
    pub fn classify(&self, avg_change: f64) -> MotionProportions {
        let mut linear = 0.0;
        let mut circular = 0.0;
        let mut hyperactive = 0.0;

        if avg_change > self.high_tier {
            hyperactive = (avg_change / 2.0).min(40.0);
            linear = (60.0 - hyperactive).min(50.0);
            circular = 30.0_f64.min(100.0 - hyperactive - linear);
        } else if avg_change > self.mid_tier {
            linear = (avg_change * 3.0).min(60.0);
            circular = (avg_change * 2.0).min(30.0);
            hyperactive = (avg_change - 15.0).max(0.0);
        } else {
            linear = (avg_change * 2.0).max(0.0);
        }

        Self::normalize(linear, circular, hyperactive)
    }

    /// Clamp non-negative, quantize to whole percent, and assign the
    /// remainder to static
    ///
    /// Oversized inputs are scaled back before quantizing; rounding can
    /// still push the active sum one point over 100, in which case the
    /// excess is taken back from the largest component. The sum is
    /// exactly 100 for any input.
    fn normalize(linear: f64, circular: f64, hyperactive: f64) -> MotionProportions {
        let mut linear = linear.max(0.0);
        let mut circular = circular.max(0.0);
        let mut hyperactive = hyperactive.max(0.0);

        let active = linear + circular + hyperactive;
        if active > 100.0 {
            let scale = 100.0 / active;
            linear *= scale;
            circular *= scale;
            hyperactive *= scale;
        }

        let mut linear = linear.round();
        let mut circular = circular.round();
        let mut hyperactive = hyperactive.round();

        let excess = (linear + circular + hyperactive) - 100.0;
        if excess > 0.0 {
            if linear >= circular && linear >= hyperactive {
                linear -= excess;
            } else if circular >= hyperactive {
                circular -= excess;
            } else {
                hyperactive -= excess;
            }
        }

        let static_ = 100.0 - linear - circular - hyperactive;

        MotionProportions {
            linear,
            circular,
            static_,
            hyperactive,
        }
    }
}
