/// animation/mod.rs - 切换动画的核心
/// 职责：时间→进度的缓动曲线（含精确反函数）以及基于时钟的进度动画
/// 关键概念：注意区分两个量，x 是已用时间占比，y 是已扫过的长度占比（进度），
///           y = f(x) 很少是线性的

use std::time::Duration;

use keyframe::functions::{EaseOutCubic, EaseOutQuad};
use keyframe::EasingFunction;

use crate::config::{AnimationConfig, AnimationCurve};

mod clock;
pub use clock::Clock;

/// Time-driven animation of a single value along a [`Curve`].
///
/// Unlike a plain tween, the animation can be seeked: [`Animation::seek`] pretends some time
/// has already been played so that the remaining motion looks exactly like a fresh animation
/// that reached the given value on its own.
#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    is_off: bool,
    duration: Duration,
    start_time: Duration,
    /// Time considered already played at `start_time`.
    played: Duration,
    clock: Clock,
    curve: Curve,
}

/// 时间→进度映射曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    /// 平方律减速：y = 1 - (1-x)^2
    EaseOutQuad,
    /// 三次减速：y = 1 - (1-x)^3
    EaseOutCubic,
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, config: &AnimationConfig) -> Self {
        let mut rv = Self::ease(
            clock,
            from,
            to,
            u64::from(config.duration_ms),
            Curve::from(config.curve),
        );
        if config.off {
            rv.is_off = true;
            rv.duration = Duration::ZERO;
        }
        rv
    }

    pub fn ease(clock: Clock, from: f64, to: f64, duration_ms: u64, curve: Curve) -> Self {
        Self {
            from,
            to,
            is_off: false,
            duration: Duration::from_millis(duration_ms),
            start_time: clock.now(),
            played: Duration::ZERO,
            clock,
            curve,
        }
    }

    /// Restarts the animation using the previous config.
    pub fn restarted(&self, from: f64, to: f64) -> Self {
        let mut rv = Self::ease(
            self.clock.clone(),
            from,
            to,
            self.duration.as_millis() as u64,
            self.curve,
        );
        rv.is_off = self.is_off;
        rv
    }

    /// Seeks the animation so that it currently shows `value`.
    ///
    /// The played time is derived from the exact inverse of the curve, so seeking to a large
    /// value does not introduce a visible jump in speed.
    pub fn seek(&mut self, value: f64) {
        // Duration::mul_f64 遇到 NaN 会 panic
        if !value.is_finite() {
            return;
        }

        let range = self.to - self.from;
        let fraction = if range.abs() <= f64::EPSILON {
            1.
        } else {
            ((value - self.from) / range).clamp(0., 1.)
        };

        let played = self.curve.inverse(fraction);
        self.played = self.duration.mul_f64(played);
        self.start_time = self.clock.now();
    }

    pub fn is_done(&self) -> bool {
        if self.is_off || self.clock.should_complete_instantly() {
            return true;
        }

        self.clock.now() + self.played >= self.start_time + self.duration
    }

    pub fn value_at(&self, at: Duration) -> f64 {
        if self.is_off || self.clock.should_complete_instantly() {
            return self.to;
        }

        // 时钟倒退到开始之前时保持在起点
        let at = at.max(self.start_time);
        let passed = at - self.start_time + self.played;
        if self.duration <= passed {
            return self.to;
        }

        let x = (passed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0., 1.);
        self.curve.y(x) * (self.to - self.from) + self.from
    }

    pub fn value(&self) -> f64 {
        self.value_at(self.clock.now())
    }

    /// Time at which the animation reaches `to`.
    pub fn end_time(&self) -> Duration {
        (self.start_time + self.duration).saturating_sub(self.played)
    }
}

impl Curve {
    /// 已用时间占比 x ∈ [0, 1] → 进度 y ∈ [0, 1]
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuad => EaseOutQuad.y(x),
            Curve::EaseOutCubic => EaseOutCubic.y(x),
        }
    }

    /// 进度 y → 已用时间占比 x，闭式解而非迭代搜索
    pub fn inverse(self, y: f64) -> f64 {
        let y = y.clamp(0., 1.);
        match self {
            Curve::Linear => y,
            Curve::EaseOutQuad => 1. - (1. - y).sqrt(),
            Curve::EaseOutCubic => 1. - (1. - y).cbrt(),
        }
    }
}

impl From<AnimationCurve> for Curve {
    fn from(value: AnimationCurve) -> Self {
        match value {
            AnimationCurve::Linear => Curve::Linear,
            AnimationCurve::EaseOutQuad => Curve::EaseOutQuad,
            AnimationCurve::EaseOutCubic => Curve::EaseOutCubic,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    use super::*;

    const CURVES: [Curve; 3] = [Curve::Linear, Curve::EaseOutQuad, Curve::EaseOutCubic];

    fn any_curve() -> impl Strategy<Value = Curve> {
        prop::sample::select(CURVES.to_vec())
    }

    #[test]
    fn curve_endpoints() {
        for curve in CURVES {
            assert_abs_diff_eq!(curve.y(0.), 0., epsilon = 1e-12);
            assert_abs_diff_eq!(curve.y(1.), 1., epsilon = 1e-12);
            assert_abs_diff_eq!(curve.inverse(0.), 0., epsilon = 1e-12);
            assert_abs_diff_eq!(curve.inverse(1.), 1., epsilon = 1e-12);
        }
    }

    #[test]
    fn square_law_values() {
        assert_abs_diff_eq!(Curve::EaseOutQuad.y(0.5), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(Curve::EaseOutQuad.inverse(0.75), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(Curve::EaseOutCubic.inverse(0.875), 0.5, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn curve_is_monotonic(curve in any_curve(), a in 0f64..=1., b in 0f64..=1.) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(curve.y(lo) <= curve.y(hi) + 1e-12);
        }

        #[test]
        fn inverse_round_trips(curve in any_curve(), y in 0f64..=1.) {
            let x = curve.inverse(y);
            prop_assert!((0. ..=1.).contains(&x));
            prop_assert!((curve.y(x) - y).abs() < 1e-9);
        }
    }

    #[test]
    fn ease_follows_clock() {
        let mut clock = Clock::with_time(Duration::from_secs(1));
        let anim = Animation::ease(clock.clone(), 0., 1., 500, Curve::EaseOutQuad);
        assert_eq!(anim.value(), 0.);
        assert!(!anim.is_done());

        clock.advance_unadjusted(Duration::from_millis(250));
        assert_abs_diff_eq!(anim.value(), 0.75, epsilon = 1e-9);

        clock.advance_unadjusted(Duration::from_millis(250));
        assert_eq!(anim.value(), 1.);
        assert!(anim.is_done());
    }

    #[test]
    fn seek_resumes_with_same_speed() {
        let mut clock = Clock::with_time(Duration::from_secs(1));
        let mut anim = Animation::ease(clock.clone(), 0., 1., 500, Curve::EaseOutQuad);
        anim.seek(0.75);
        assert_abs_diff_eq!(anim.value(), 0.75, epsilon = 1e-9);
        assert_eq!(anim.end_time(), Duration::from_millis(1250));

        // 与从零开始播放到同一时刻的动画完全一致
        let fresh = Animation::ease(clock.clone(), 0., 1., 500, Curve::EaseOutQuad);
        clock.advance_unadjusted(Duration::from_millis(100));
        let expected = fresh.value_at(clock.now() + Duration::from_millis(250));
        assert_abs_diff_eq!(anim.value(), expected, epsilon = 1e-9);

        clock.advance_unadjusted(Duration::from_millis(150));
        assert!(anim.is_done());
        assert_eq!(anim.value(), 1.);
    }

    #[test]
    fn seek_on_reversed_range() {
        let clock = Clock::with_time(Duration::from_secs(1));
        let mut anim = Animation::ease(clock, 1., 0., 500, Curve::Linear);
        anim.seek(0.25);
        assert_abs_diff_eq!(anim.value(), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn seek_ignores_non_finite() {
        let mut clock = Clock::with_time(Duration::from_secs(1));
        let mut anim = Animation::ease(clock.clone(), 0., 1., 500, Curve::Linear);
        anim.seek(0.5);

        anim.seek(f64::NAN);
        anim.seek(f64::INFINITY);
        assert_abs_diff_eq!(anim.value(), 0.5, epsilon = 1e-9);
        assert_eq!(anim.end_time(), Duration::from_millis(1250));

        clock.advance_unadjusted(Duration::from_millis(250));
        assert!(anim.is_done());
    }

    #[test]
    fn off_completes_instantly() {
        let clock = Clock::with_time(Duration::from_secs(1));
        let config = AnimationConfig {
            off: true,
            ..Default::default()
        };
        let anim = Animation::new(clock, 0., 1., &config);
        assert!(anim.is_done());
        assert_eq!(anim.value(), 1.);

        let restarted = anim.restarted(1., 0.);
        assert!(restarted.is_done());
        assert_eq!(restarted.value(), 0.);
    }

    #[test]
    fn clock_can_complete_instantly() {
        let mut clock = Clock::with_time(Duration::from_secs(1));
        let anim = Animation::ease(clock.clone(), 0., 1., 500, Curve::EaseOutQuad);
        clock.set_complete_instantly(true);
        assert!(anim.is_done());
        assert_eq!(anim.value(), 1.);
    }
}
