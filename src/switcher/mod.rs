/// switcher/mod.rs - 两槽位图像切换器
/// 职责：持有“当前图像”和“即将到来的图像”两个槽位，驱动切换、回弹和手势滚动的状态机
/// 关键概念：
///   - 切换总是从当前图像（时间上的现在）到即将到来的图像（时间上的下一个）；
///     而即将到来的图像在位置上可能是下一张也可能是上一张，由 `coming_as_next` 记录
///   - 切换过程中存在时间→位置的映射 y = f(x)：x 是已用时间占比，y 是进度；
///     几何和不透明度对 y 线性，运动手感完全由缓动曲线决定
///   - 所有更新请求都只修改两个 ImageSlot，渲染方每帧读取它们的快照

use crate::animation::{Animation, Clock};
use crate::config::Config;
use crate::utils::{Point, Rect, Size};

mod gesture;
pub mod rule;
pub mod slot;


pub use rule::{Channels, Direction, TransitionFlags};
pub use slot::{ImageSlot, PixelBuffer};

/// What finished when a phase sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEnd {
    /// The coming image was promoted to the current slot.
    Committed,
    /// A switch-and-fallback bounced back; the current image is unchanged.
    FellBack,
}

/// Coarse state of the switcher, mostly for logging and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// Both slots are displaced by a gesture-driven scroll.
    Scrolling,
    Switching,
    FallingBack,
}

#[derive(Debug)]
enum Phase {
    /// Both slots animate together; completion commits the coming image.
    Switch {
        anim: Animation,
        /// Progress at which the switch is cut short (and still committed).
        until: Option<f64>,
    },
    /// First half of a bounce: towards the neighbor, up to the turn point.
    Forth { anim: Animation, turn_point: f64 },
    /// Second half of a bounce: roles swapped, back to rest.
    Back { anim: Animation },
}

#[derive(Debug)]
pub struct Switcher<'a, B: ?Sized> {
    current: ImageSlot<'a, B>,
    coming: ImageSlot<'a, B>,
    /// Mainly for painting order, to keep the animation consistent.
    coming_as_next: bool,
    phase: Option<Phase>,
    /// Manual zoom of the current slot.
    scale: f64,
    host: Size,
    /// Buffer requested through [`Switcher::show`] before the host had a size.
    pending: Option<&'a B>,
    /// 最近一次手势滚动的进度；宿主尺寸变化时据此重新摆放两个槽位
    scrolled: Option<f64>,
    clock: Clock,
    config: Config,
}

impl<'a, B: PixelBuffer + ?Sized> Switcher<'a, B> {
    pub fn new(clock: Clock, config: Config) -> Self {
        let mut rv = Self {
            current: ImageSlot::new(),
            coming: ImageSlot::new(),
            coming_as_next: true,
            phase: None,
            scale: 1.,
            host: Size::default(),
            pending: None,
            scrolled: None,
            clock,
            config,
        };
        rv.apply_clock_config();
        rv
    }

    pub fn update_config(&mut self, config: Config) {
        self.config = config;
        self.apply_clock_config();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 时钟由所有动画共享：减速和“立即完成”在这里统一设置
    fn apply_clock_config(&mut self) {
        let animation = &self.config.animation;
        let rate = if animation.slowdown == 0. {
            0.
        } else {
            1. / animation.slowdown
        };
        self.clock.set_rate(rate);
        self.clock.set_complete_instantly(animation.off);
    }

    /// Sets the container size. No animation is started; running phases pick up the new size
    /// on their next frame.
    pub fn resize(&mut self, width: i32, height: i32) {
        let host = Size::new(width.max(0), height.max(0));
        if self.host == host {
            return;
        }

        debug!("host resized to {}×{}", host.w, host.h);
        let was_fitted = !self.is_zoomed();
        self.host = host;

        if host.is_empty() {
            return;
        }

        if let Some(buffer) = self.pending.take() {
            self.show(Some(buffer));
            return;
        }

        // 适配比例总是跟随宿主尺寸，无论是否在动画中
        self.current.update_fit_scale(host.w, host.h);
        self.coming.update_fit_scale(host.w, host.h);

        if self.is_busy() {
            // 运行中的阶段下一帧会按新尺寸重新计算
            return;
        }

        if let Some(progress) = self.scrolled {
            // 滚动中：两个槽位按同一进度重新摆放
            self.current.reset_and_fit(self.current.buffer(), host.w, host.h);
            self.coming.reset_and_fit(self.coming.buffer(), host.w, host.h);
            self.scale = self.current.fit_scale();
            self.update_pair(progress, false);
            return;
        }

        if was_fitted {
            self.current.reset_and_fit(self.current.buffer(), host.w, host.h);
            self.scale = self.current.fit_scale();
        }
    }

    /// Shows `buffer` as the current image without any animation.
    ///
    /// If the host has no size yet, the buffer is shown as soon as it gets one.
    pub fn show(&mut self, buffer: Option<&'a B>) -> bool {
        if self.is_busy() {
            debug!("ignoring show request while busy");
            return false;
        }

        if self.host.is_empty() {
            self.pending = buffer;
            return true;
        }

        self.pending = None;
        self.scrolled = None;
        self.current.reset_and_fit(buffer, self.host.w, self.host.h);
        self.coming.clear();
        self.scale = self.current.fit_scale();
        true
    }

    /// Starts switching from `current` to `coming`, resuming at `start` progress.
    ///
    /// Returns `false` without changing anything if a transition is already running.
    pub fn switch_to(
        &mut self,
        current: Option<&'a B>,
        coming: Option<&'a B>,
        as_next: bool,
        start: f64,
    ) -> bool {
        self.start_switch(current, coming, as_next, start, None)
    }

    /// Like [`Switcher::switch_to`], but the switch is cut short and committed once the progress
    /// reaches `end`.
    pub fn switch_until(
        &mut self,
        current: Option<&'a B>,
        coming: Option<&'a B>,
        as_next: bool,
        start: f64,
        end: f64,
    ) -> bool {
        self.start_switch(current, coming, as_next, start, Some(end))
    }

    fn start_switch(
        &mut self,
        current: Option<&'a B>,
        coming: Option<&'a B>,
        as_next: bool,
        start: f64,
        until: Option<f64>,
    ) -> bool {
        if self.is_busy() {
            debug!("ignoring switch request while busy");
            return false;
        }
        // NaN 会穿过 clamp，必须先拒绝
        if !start.is_finite() || until.is_some_and(|until| !until.is_finite()) {
            debug!(start, ?until, "ignoring switch request with invalid progress");
            return false;
        }

        let start = start.clamp(0., 1.);
        debug!(as_next, start, ?until, "starting switch");

        self.prepare(current, coming, as_next);

        // 从 start 处起步：按曲线反函数折算已播放时间，剩余运动与从头播放一致
        let mut anim = Animation::new(self.clock.clone(), 0., 1., &self.config.animation);
        anim.seek(start);
        self.update_pair(anim.value(), false);
        self.phase = Some(Phase::Switch { anim, until });
        true
    }

    /// Starts moving towards `coming`, then bounces back at `turn_point` progress.
    ///
    /// Signals that there are no more images in that direction: the current image stays.
    pub fn switch_and_fall_back(
        &mut self,
        current: Option<&'a B>,
        coming: Option<&'a B>,
        as_next: bool,
        turn_point: f64,
    ) -> bool {
        if self.is_busy() {
            debug!("ignoring switch-and-fallback request while busy");
            return false;
        }
        if !turn_point.is_finite() {
            debug!(turn_point, "ignoring switch-and-fallback request with invalid turn point");
            return false;
        }

        let turn_point = turn_point.clamp(0., 1.);
        debug!(as_next, turn_point, "starting switch and fallback");

        self.prepare(current, coming, as_next);

        // 第一阶段从 0 开始朝邻居方向移动，到折返点为止
        let anim = Animation::new(self.clock.clone(), 0., 1., &self.config.animation);
        self.update_pair(anim.value(), false);
        self.phase = Some(Phase::Forth { anim, turn_point });
        true
    }

    /// Displaces both slots according to a gesture-driven `progress`.
    ///
    /// No clock is involved: the caller drives the progress directly, once per input event.
    pub fn scroll(
        &mut self,
        current: Option<&'a B>,
        coming: Option<&'a B>,
        as_next: bool,
        progress: f64,
    ) -> bool {
        if self.is_busy() || !progress.is_finite() {
            return false;
        }

        let progress = progress.clamp(0., 1.);
        self.prepare(current, coming, as_next);
        self.update_pair(progress, false);
        self.scrolled = Some(progress);
        true
    }

    /// Applies the running phase for the current clock time.
    ///
    /// Returns what finished if the phase sequence completed during this call.
    pub fn advance_animations(&mut self) -> Option<PhaseEnd> {
        let _span = tracy_client::span!("Switcher::advance_animations");

        let phase = self.phase.take()?;
        match phase {
            Phase::Switch { anim, until } => {
                let progress = anim.value();
                trace!(progress, "switch frame");
                self.update_pair(progress, false);

                // 截断的切换在进度越过 until 时同样提交
                let cut = until.is_some_and(|until| progress >= until);
                if anim.is_done() || cut {
                    self.commit();
                    return Some(PhaseEnd::Committed);
                }
                self.phase = Some(Phase::Switch { anim, until });
            }
            Phase::Forth { anim, turn_point } => {
                let progress = anim.value();
                trace!(progress, "fallback forth frame");

                if progress >= turn_point || anim.is_done() {
                    // 折返：角色互换，从互补位置继续，画面上没有跳变
                    let mut back = anim.restarted(0., 1.);
                    back.seek(1. - turn_point);
                    debug!(turn_point, "fallback turning back");
                    self.update_pair(back.value(), true);
                    self.phase = Some(Phase::Back { anim: back });
                } else {
                    self.update_pair(progress, false);
                    self.phase = Some(Phase::Forth { anim, turn_point });
                }
            }
            Phase::Back { anim } => {
                let progress = anim.value();
                trace!(progress, "fallback back frame");
                self.update_pair(progress, true);

                if anim.is_done() {
                    self.settle_after_fallback();
                    return Some(PhaseEnd::FellBack);
                }
                self.phase = Some(Phase::Back { anim });
            }
        }

        None
    }

    /// Jumps the running phase sequence to its end state.
    pub fn finish(&mut self) -> Option<PhaseEnd> {
        let phase = self.phase.take()?;
        match phase {
            Phase::Switch { .. } => {
                self.commit();
                Some(PhaseEnd::Committed)
            }
            Phase::Forth { .. } | Phase::Back { .. } => {
                self.settle_after_fallback();
                Some(PhaseEnd::FellBack)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_some()
    }

    pub fn state(&self) -> State {
        match self.phase {
            Some(Phase::Switch { .. }) => State::Switching,
            Some(Phase::Forth { .. } | Phase::Back { .. }) => State::FallingBack,
            None if self.coming.is_valid() => State::Scrolling,
            None => State::Idle,
        }
    }

    pub fn current(&self) -> &ImageSlot<'a, B> {
        &self.current
    }

    pub fn coming(&self) -> &ImageSlot<'a, B> {
        &self.coming
    }

    pub fn coming_as_next(&self) -> bool {
        self.coming_as_next
    }

    pub fn current_rect(&self) -> Rect {
        self.current.rect()
    }

    pub fn host_size(&self) -> Size {
        self.host
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_zoomed(&self) -> bool {
        self.scale != self.current.fit_scale()
    }

    /// 两个槽位都从适配状态开始，旧的缩放和滚动状态一并丢弃
    fn prepare(&mut self, current: Option<&'a B>, coming: Option<&'a B>, as_next: bool) {
        let host = self.host;
        self.pending = None;
        self.scrolled = None;
        self.current.reset_and_fit(current, host.w, host.h);
        self.coming.reset_and_fit(coming, host.w, host.h);
        self.coming_as_next = as_next;
        self.scale = self.current.fit_scale();
    }

    /// Updates both slots from the same progress so they never desync.
    fn update_pair(&mut self, progress: f64, swapped: bool) {
        let host = self.host;
        let as_next = self.coming_as_next;

        if swapped {
            let enter = Channels::for_role(true, !as_next);
            let leave = Channels::for_role(false, !as_next);
            update_slot(&mut self.current, enter, progress, host, &self.config);
            update_slot(&mut self.coming, leave, progress, host, &self.config);
        } else {
            let enter = Channels::for_role(true, as_next);
            let leave = Channels::for_role(false, as_next);
            update_slot(&mut self.coming, enter, progress, host, &self.config);
            update_slot(&mut self.current, leave, progress, host, &self.config);
        }
    }

    /// 提交：即将到来的图像成为当前图像
    fn commit(&mut self) {
        debug!("switch committed");
        let host = self.host;
        self.current.reset_and_fit(self.coming.buffer(), host.w, host.h);
        self.coming.clear();
        self.scale = self.current.fit_scale();
    }

    /// 回弹结束：当前图像不变，只重新适配
    fn settle_after_fallback(&mut self) {
        debug!("fallback finished");
        let host = self.host;
        self.current.reset_and_fit(self.current.buffer(), host.w, host.h);
        self.coming.clear();
        self.scale = self.current.fit_scale();
    }
}

/// Applies `channels` to `slot` at `progress`.
pub fn update_slot<B: PixelBuffer + ?Sized>(
    slot: &mut ImageSlot<'_, B>,
    channels: Channels,
    progress: f64,
    host: Size,
    config: &Config,
) {
    if !slot.is_valid() || host.w == 0 || host.h == 0 {
        return;
    }

    // 宿主可能在动画中途改变尺寸
    slot.update_fit_scale(host.w, host.h);

    let is_enter = channels.is_enter();

    // 进入时淡入，离开时淡出；没有 ALPHA 通道时保持完全不透明
    if channels.has_alpha() {
        let (from, to) = if is_enter {
            (config.alpha_start, 1.)
        } else {
            (1., config.alpha_start)
        };
        slot.apply_alpha(lerp(from, to, progress));
    } else {
        slot.apply_alpha(1.);
    }

    // 平移只改变位置，不重新居中
    if let Some(direction) = channels.translate {
        let loc = translated_loc(slot.rect(), direction, is_enter, progress, host);
        slot.apply_offset(loc.x, loc.y);
    }

    // 缩放相对于适配比例，改变尺寸后重新居中
    if channels.has_scale() {
        let fit = slot.fit_scale();
        let (from, to) = if is_enter {
            (config.scale_start * fit, fit)
        } else {
            (fit, config.scale_start * fit)
        };
        slot.apply_scale(lerp(from, to, progress));
        slot.centralize(host.w, host.h);
    }
}

fn lerp(from: f64, to: f64, progress: f64) -> f64 {
    (to - from) * progress + from
}

/// Top-left of a slot traveling in `direction`; the other axis is held.
///
/// Up and Down are symmetric to Left and Right but no default rule uses them yet.
fn translated_loc(
    rect: Rect,
    direction: Direction,
    is_enter: bool,
    progress: f64,
    host: Size,
) -> Point {
    match direction {
        Direction::Left => Point::new(
            travel(rect.size.w, host.w, progress, is_enter, false),
            rect.top(),
        ),
        Direction::Right => Point::new(
            travel(rect.size.w, host.w, progress, is_enter, true),
            rect.top(),
        ),
        Direction::Up => Point::new(
            rect.left(),
            travel(rect.size.h, host.h, progress, is_enter, false),
        ),
        Direction::Down => Point::new(
            rect.left(),
            travel(rect.size.h, host.h, progress, is_enter, true),
        ),
    }
}

/// Position along one axis. `forward` means moving towards larger coordinates.
///
/// Entering ends centered, leaving starts centered; the off-screen end is just past the host
/// edge (`-len` or `host_len`).
fn travel(len: i32, host_len: i32, progress: f64, is_enter: bool, forward: bool) -> i32 {
    // 从居中到完全移出需要走过的距离：半个自身加半个宿主
    let total = f64::from((len + host_len) / 2);
    let centered = (host_len - len) / 2;

    match (forward, is_enter) {
        (true, true) => (total * progress) as i32 - len,
        (true, false) => centered + (total * progress) as i32,
        (false, true) => centered + (total * (1. - progress)) as i32,
        (false, false) => (total * (1. - progress)) as i32 - len,
    }
}
