/// Length of the fog entrance.
pub const FOG_FADE_IN_MS: f64 = 500.0;

/// Ease-out quadratic over normalised progress, clamped to `[0, 1]`.
pub fn ease_out_quad(t: f32) -> f32 {
    let clamped = t.clamp(0.0, 1.0);
    clamped * (2.0 - clamped)
}

/// Time-bounded ease-out ramp from 0 to 1, measured on the host clock in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeEnvelope {
    start_ms: f64,
    duration_ms: f64,
}

impl FadeEnvelope {
    /// Returns `None` for empty durations; callers treat that as "fully visible".
    pub fn new(duration_ms: f64, start_ms: f64) -> Option<Self> {
        if duration_ms.is_nan() || duration_ms <= 0.0 {
            None
        } else {
            Some(Self {
                start_ms,
                duration_ms,
            })
        }
    }

    /// The fog's entrance, starting at `start_ms`.
    pub fn fog_fade_in(start_ms: f64) -> Option<Self> {
        Self::new(FOG_FADE_IN_MS, start_ms)
    }

    /// Current level and whether the ramp has completed.
    pub fn level(&self, now_ms: f64) -> (f32, bool) {
        let elapsed = (now_ms - self.start_ms).max(0.0);
        let progress = (elapsed / self.duration_ms) as f32;
        (ease_out_quad(progress), progress >= 1.0)
    }
}
