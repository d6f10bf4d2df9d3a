/// animation/clock.rs - 切换动画使用的时钟
/// 职责：可共享、惰性读取、可调速率的时间源
/// 关键概念：驱动方（帧回调或演示程序）负责推进时间，切换器每帧只读取一次，
///           因此两个槽位总是基于同一个时间采样计算

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::get_monotonic_time;

/// Shareable lazy clock that can change rate.
///
/// The clock fetches the time once and then retains it until it is set again. All clones
/// observe the same time, so the two slots of a switcher are always computed from a single
/// sample.
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<AdjustableClock>>,
}

#[derive(Debug, Default)]
struct LazyClock {
    time: Option<Duration>,
}

/// Clock that can adjust its rate.
#[derive(Debug)]
struct AdjustableClock {
    inner: LazyClock,
    current_time: Duration,
    last_seen_time: Duration,
    rate: f64,
    complete_instantly: bool,
}

impl Clock {
    /// Creates a new clock with the given time.
    pub fn with_time(time: Duration) -> Self {
        let clock = AdjustableClock::new(LazyClock::with_time(time));
        Self {
            inner: Rc::new(RefCell::new(clock)),
        }
    }

    /// Returns the current time.
    pub fn now(&self) -> Duration {
        self.inner.borrow_mut().now()
    }

    /// Returns the underlying time not adjusted for rate change.
    pub fn now_unadjusted(&self) -> Duration {
        self.inner.borrow_mut().inner.now()
    }

    /// Sets the unadjusted clock time.
    pub fn set_unadjusted(&mut self, time: Duration) {
        self.inner.borrow_mut().inner.set(time);
    }

    /// Moves the unadjusted clock time forward by `delta`.
    ///
    /// 演示程序和测试用它按固定帧间隔推进时间。
    pub fn advance_unadjusted(&mut self, delta: Duration) {
        let now = self.now_unadjusted();
        self.set_unadjusted(now.saturating_add(delta));
    }

    /// Gets the clock rate.
    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    /// Sets the clock rate.
    pub fn set_rate(&mut self, rate: f64) {
        self.inner.borrow_mut().set_rate(rate);
    }

    /// Returns whether animations should complete instantly.
    pub fn should_complete_instantly(&self) -> bool {
        self.inner.borrow().complete_instantly
    }

    /// Sets whether animations should complete instantly.
    pub fn set_complete_instantly(&mut self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

impl LazyClock {
    fn with_time(time: Duration) -> Self {
        Self { time: Some(time) }
    }

    fn set(&mut self, time: Duration) {
        self.time = Some(time);
    }

    fn now(&mut self) -> Duration {
        *self.time.get_or_insert_with(get_monotonic_time)
    }
}

impl AdjustableClock {
    fn new(mut inner: LazyClock) -> Self {
        let time = inner.now();
        Self {
            inner,
            current_time: time,
            last_seen_time: time,
            rate: 1.,
            complete_instantly: false,
        }
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(0., 1000.);
    }

    fn now(&mut self) -> Duration {
        let time = self.inner.now();

        if self.last_seen_time == time {
            return self.current_time;
        }

        // 原始时间的变化量按速率缩放后累加到调整后的时间上，时间倒退时同样按比例回退
        if self.last_seen_time < time {
            let delta = (time - self.last_seen_time).mul_f64(self.rate);
            self.current_time = self.current_time.saturating_add(delta);
        } else {
            let delta = (self.last_seen_time - time).mul_f64(self.rate);
            self.current_time = self.current_time.saturating_sub(delta);
        }

        self.last_seen_time = time;
        self.current_time
    }
}

impl Default for AdjustableClock {
    fn default() -> Self {
        Self::new(LazyClock::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_clock() {
        let mut clock = Clock::with_time(Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);

        clock.set_unadjusted(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(16));

        clock.advance_unadjusted(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(32));
    }

    #[test]
    fn clones_share_time() {
        let mut clock = Clock::with_time(Duration::from_secs(1));
        let other = clock.clone();
        assert_eq!(clock, other);

        clock.advance_unadjusted(Duration::from_millis(250));
        assert_eq!(other.now(), Duration::from_millis(1250));
        assert_ne!(clock, Clock::with_time(Duration::from_secs(1)));
    }

    #[test]
    fn slow_motion() {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_rate(0.25);

        clock.set_unadjusted(Duration::from_millis(400));
        assert_eq!(clock.now_unadjusted(), Duration::from_millis(400));
        assert_eq!(clock.now(), Duration::from_millis(100));

        // 时间倒退也按速率折算
        clock.set_unadjusted(Duration::from_millis(200));
        assert_eq!(clock.now(), Duration::from_millis(50));

        clock.set_rate(4.);
        clock.set_unadjusted(Duration::from_millis(300));
        assert_eq!(clock.now(), Duration::from_millis(450));
    }

    #[test]
    fn rate_is_clamped() {
        let mut clock = Clock::with_time(Duration::ZERO);
        clock.set_rate(-1.);
        assert_eq!(clock.rate(), 0.);
        clock.set_rate(5000.);
        assert_eq!(clock.rate(), 1000.);
    }

    #[test]
    fn default_reads_monotonic_time_once() {
        let clock = Clock::default();
        let first = clock.now_unadjusted();
        assert_eq!(clock.now_unadjusted(), first);
        assert_eq!(clock.now(), first);
        assert_eq!(clock.rate(), 1.);
        assert!(!clock.should_complete_instantly());
    }
}
