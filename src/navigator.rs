/// navigator.rs - 在图像列表中前后浏览
/// 职责：记录当前位置，把“下一张/上一张”、拖动、松手这些已经识别好的输入翻译成切换器调用
/// 说明：图像列表由调用方持有，这里只借用

use crate::switcher::{PixelBuffer, Switcher};

#[derive(Debug)]
pub struct Navigator<'a, B> {
    items: &'a [B],
    pos: usize,
    /// Horizontal drag distance of the ongoing scroll, negative towards the next image.
    scrolled_x: i32,
}

impl<'a, B: PixelBuffer> Navigator<'a, B> {
    pub fn new(items: &'a [B], pos: usize) -> Self {
        Self {
            items,
            pos: pos.min(items.len().saturating_sub(1)),
            scrolled_x: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item(&self, pos: Option<usize>) -> Option<&'a B> {
        pos.and_then(|pos| self.items.get(pos))
    }

    fn offset_pos(&self, offset: isize) -> Option<usize> {
        self.pos
            .checked_add_signed(offset)
            .filter(|pos| *pos < self.items.len())
    }

    /// Fraction of the host width covered by a drag of `scrolled_x`.
    fn scrolled_fraction(&self, switcher: &Switcher<'a, B>, scrolled_x: i32) -> f64 {
        let width = switcher.host_size().w;
        if width <= 0 {
            return 0.;
        }

        (f64::from(scrolled_x.unsigned_abs()) / f64::from(width)).min(1.)
    }

    /// Switches `offset` images away, with 0 showing the current one.
    ///
    /// A running switch is finished first. Returns `false` if there is no image there.
    pub fn switch_by(&mut self, switcher: &mut Switcher<'a, B>, offset: isize) -> bool {
        let Some(pos) = self.offset_pos(offset) else {
            return false;
        };

        // 连续按键时不排队，直接跳到上一次切换的终点
        if switcher.is_busy() {
            switcher.finish();
        }

        let coming = self.item(Some(pos));
        // 拖动中松手时从已滚动的进度继续
        let fraction = self.scrolled_fraction(switcher, self.scrolled_x);
        match offset {
            0 => switcher.switch_to(None, coming, true, fraction),
            1.. => switcher.switch_to(self.item(Some(self.pos)), coming, true, fraction),
            _ => switcher.switch_to(self.item(Some(self.pos)), coming, false, fraction),
        };

        debug!("switched to {} / {}", pos + 1, self.items.len());
        self.scrolled_x = 0;
        self.pos = pos;
        true
    }

    /// Tracks a horizontal drag; negative `dx` reveals the next image.
    pub fn scroll_by(&mut self, switcher: &mut Switcher<'a, B>, dx: i32) {
        let fraction = self.scrolled_fraction(switcher, dx);
        let current = self.item(Some(self.pos));
        if dx < 0 {
            let next = self.item(self.offset_pos(1));
            switcher.scroll(current, next, true, fraction);
        } else if dx > 0 {
            let prev = self.item(self.offset_pos(-1));
            switcher.scroll(current, prev, false, fraction);
        }
        self.scrolled_x = dx;
    }

    /// Ends a drag: completes the switch if it went far enough, otherwise slides back.
    pub fn release(&mut self, switcher: &mut Switcher<'a, B>) {
        // 拖过半个宿主宽度才算切换
        if self.scrolled_fraction(switcher, self.scrolled_x) < 0.5 {
            self.fall_back(switcher);
        } else {
            let offset = if self.scrolled_x > 0 { -1 } else { 1 };
            self.switch_or_fall_back(switcher, offset);
        }
    }

    pub fn switch_or_fall_back(&mut self, switcher: &mut Switcher<'a, B>, offset: isize) {
        if !self.switch_by(switcher, offset) {
            self.fall_back(switcher);
        }
    }

    /// For key presses there is no drag to undo, so play a forth-and-back bounce to tell that
    /// there are no more images.
    pub fn switch_or_bounce(&mut self, switcher: &mut Switcher<'a, B>, offset: isize) {
        if self.switch_by(switcher, offset) {
            return;
        }

        // 没有邻居时 coming 为空，回弹只移动当前图像
        let turn_point = switcher.config().bounce_turn_point;
        let current = self.item(Some(self.pos));
        if offset > 0 {
            let next = self.item(self.offset_pos(1));
            switcher.switch_and_fall_back(current, next, true, turn_point);
        } else if offset < 0 {
            let prev = self.item(self.offset_pos(-1));
            switcher.switch_and_fall_back(current, prev, false, turn_point);
        }
        self.scrolled_x = 0;
    }

    /// Undoes a partial drag by playing the reverse switch from where the drag stopped.
    fn fall_back(&mut self, switcher: &mut Switcher<'a, B>) {
        let start = 1. - self.scrolled_fraction(switcher, self.scrolled_x);
        let Some(current) = self.item(Some(self.pos)) else {
            self.scrolled_x = 0;
            return;
        };
        let current = Some(current);

        // 把“拖回原位”看成从邻居切换回当前图像的后半段
        if self.scrolled_x > 0 {
            let prev = self.item(self.offset_pos(-1));
            switcher.switch_to(prev, current, true, start);
        } else if self.scrolled_x < 0 {
            let next = self.item(self.offset_pos(1));
            switcher.switch_to(next, current, false, start);
        }
        self.scrolled_x = 0;
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;
    use std::time::Duration;

    use super::*;
    use crate::animation::Clock;
    use crate::config::Config;
    use crate::switcher::{PhaseEnd, State};
    use crate::utils::Size;

    #[derive(Debug)]
    struct Dummy(i32, i32);

    impl PixelBuffer for Dummy {
        fn size(&self) -> Size {
            Size::new(self.0, self.1)
        }
    }

    const ITEMS: [Dummy; 3] = [Dummy(2000, 1000), Dummy(1000, 2000), Dummy(800, 600)];

    fn make<'a>(items: &'a [Dummy], pos: usize) -> (Navigator<'a, Dummy>, Switcher<'a, Dummy>) {
        let nav = Navigator::new(items, pos);
        let mut sw = Switcher::new(Clock::with_time(Duration::from_secs(1)), Config::default());
        sw.resize(1000, 1000);
        sw.show(items.get(nav.position()));
        (nav, sw)
    }

    fn shows(sw: &Switcher<'_, Dummy>, item: &Dummy) -> bool {
        sw.current().buffer().is_some_and(|b| ptr::eq(b, item))
    }

    #[test]
    fn switch_by_moves_within_bounds() {
        let items = ITEMS;
        let (mut nav, mut sw) = make(&items, 0);

        assert!(nav.switch_by(&mut sw, 1));
        assert_eq!(nav.position(), 1);
        assert_eq!(sw.state(), State::Switching);
        assert!(sw.coming_as_next());

        // 上一次切换尚未结束时先跳到终点
        assert!(nav.switch_by(&mut sw, 1));
        assert_eq!(nav.position(), 2);
        assert_eq!(sw.finish(), Some(PhaseEnd::Committed));
        assert!(shows(&sw, &items[2]));

        assert!(!nav.switch_by(&mut sw, 1));
        assert!(!nav.switch_by(&mut sw, -5));
        assert_eq!(nav.position(), 2);

        assert!(nav.switch_by(&mut sw, -2));
        assert!(!sw.coming_as_next());
        sw.finish();
        assert!(shows(&sw, &items[0]));
    }

    #[test]
    fn long_drag_switches() {
        let items = ITEMS;
        let (mut nav, mut sw) = make(&items, 0);

        nav.scroll_by(&mut sw, -600);
        assert_eq!(sw.state(), State::Scrolling);
        assert_eq!(sw.current_rect().left(), -600);

        nav.release(&mut sw);
        assert_eq!(nav.position(), 1);
        // 从拖动停下的位置继续
        assert!((-601..=-599).contains(&sw.current_rect().left()));
        assert_eq!(sw.finish(), Some(PhaseEnd::Committed));
        assert!(shows(&sw, &items[1]));
    }

    #[test]
    fn short_drag_falls_back() {
        let items = ITEMS;
        let (mut nav, mut sw) = make(&items, 1);

        nav.scroll_by(&mut sw, -200);
        nav.release(&mut sw);
        assert_eq!(nav.position(), 1);
        assert_eq!(sw.state(), State::Switching);

        assert_eq!(sw.finish(), Some(PhaseEnd::Committed));
        assert!(shows(&sw, &items[1]));
        assert!(!sw.coming().is_valid());
    }

    #[test]
    fn drag_past_the_first_image_falls_back() {
        let items = ITEMS;
        let (mut nav, mut sw) = make(&items, 0);

        nav.scroll_by(&mut sw, 700);
        assert!(!sw.coming().is_valid());
        nav.release(&mut sw);
        assert_eq!(nav.position(), 0);

        sw.finish();
        assert!(shows(&sw, &items[0]));
    }

    #[test]
    fn key_press_at_the_end_bounces() {
        let items = ITEMS;
        let (mut nav, mut sw) = make(&items, 2);

        nav.switch_or_bounce(&mut sw, 1);
        assert_eq!(sw.state(), State::FallingBack);
        assert_eq!(nav.position(), 2);
        assert_eq!(sw.finish(), Some(PhaseEnd::FellBack));
        assert!(shows(&sw, &items[2]));

        nav.switch_or_bounce(&mut sw, -1);
        assert_eq!(nav.position(), 1);
        assert_eq!(sw.state(), State::Switching);
    }

    #[test]
    fn empty_list() {
        let items: [Dummy; 0] = [];
        let (mut nav, mut sw) = make(&items, 3);

        assert!(nav.is_empty());
        assert!(!nav.switch_by(&mut sw, 0));
        nav.scroll_by(&mut sw, -100);
        nav.release(&mut sw);
        assert!(!sw.is_busy());
    }
}
