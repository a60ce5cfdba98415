use crate::color::ColorScheme;

/// Animates the shared color scheme toward a target over a fixed transition
/// window. `render` is a pure function of the time passed in, so callers may
/// invoke it as often as they like; the only discontinuity is the change of
/// target at `push`, which re-anchors the blend at the currently rendered
/// value to keep the output continuous.
pub struct LerpAnimator {
    origin: ColorScheme,
    target: ColorScheme,
    pushed_at: f64,
    duration: f64,
}

impl LerpAnimator {
    pub fn new(initial: ColorScheme, duration: f64) -> Self {
        LerpAnimator {
            origin: initial,
            target: initial,
            pushed_at: f64::NEG_INFINITY,
            duration,
        }
    }

    /// Replace the interpolation target, anchoring at whatever is currently
    /// rendered.
    pub fn push(&mut self, scheme: ColorScheme, now: f64) {
        self.origin = self.render(now);
        self.target = scheme;
        self.pushed_at = now;
    }

    pub fn render(&self, now: f64) -> ColorScheme {
        if self.duration <= 0.0 {
            return self.target;
        }
        let t = ((now - self.pushed_at) / self.duration).clamp(0.0, 1.0);
        ColorScheme::lerp(&self.origin, &self.target, t as f32)
    }

    pub fn target(&self) -> &ColorScheme {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use crate::color::Color;

    use super::*;

    fn scheme(r: f32) -> ColorScheme {
        ColorScheme::new(
            Color::new(r, 0.0, 0.0),
            Color::new(0.0, r, 0.0),
            Color::new(0.0, 0.0, r),
        )
    }

    fn distance(a: &ColorScheme, b: &ColorScheme) -> f32 {
        a.as_array()
            .iter()
            .zip(b.as_array().iter())
            .map(|(x, y)| (x.r - y.r).abs() + (x.g - y.g).abs() + (x.b - y.b).abs())
            .sum()
    }

    #[test]
    fn test_render_converges_monotonically() {
        let mut animator = LerpAnimator::new(scheme(0.0), 4.0);
        animator.push(scheme(1.0), 10.0);

        let mut last = f32::MAX;
        for tick in 0..=40 {
            let now = 10.0 + tick as f64 * 0.1;
            let d = distance(&animator.render(now), animator.target());
            assert!(d <= last, "distance increased at t={}", now);
            last = d;
        }
    }

    #[test]
    fn test_render_reaches_target_exactly_at_duration() {
        let mut animator = LerpAnimator::new(scheme(0.3), 4.0);
        let target = scheme(0.9);
        animator.push(target, 5.0);

        assert_ne!(animator.render(8.9), target);
        assert_eq!(animator.render(9.0), target);
        assert_eq!(animator.render(50.0), target);
    }

    #[test]
    fn test_push_is_continuous() {
        let mut animator = LerpAnimator::new(scheme(0.0), 4.0);
        animator.push(scheme(1.0), 0.0);

        // Interrupt mid-transition; the rendered value must not jump.
        let before = animator.render(2.0);
        animator.push(scheme(0.2), 2.0);
        let after = animator.render(2.0);
        assert_eq!(before, after);
    }

    #[test]
    fn test_initial_value_renders_immediately() {
        let animator = LerpAnimator::new(scheme(0.7), 4.0);
        assert_eq!(animator.render(0.0), scheme(0.7));
    }
}
