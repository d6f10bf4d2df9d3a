/// switcher/rule.rs - 过渡规则
/// 职责：按角色（进入/离开 × 作为下一张/上一张）选择一个槽位使用的变换通道
/// 约束：两个槽位在同一时刻绝不会同时使用平移通道，否则整个画面会被平移两次

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TransitionFlags: u32 {
        /// 角色标记：正在进入画面
        const ENTER = 0x1;
        const SCALE = 0x10;
        const ALPHA = 0x20;
    }
}

/// Direction of travel for the translate channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// The channel set of one slot: flags plus at most one translate direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Channels {
    pub flags: TransitionFlags,
    pub translate: Option<Direction>,
}

impl Channels {
    pub const fn new(flags: TransitionFlags, translate: Option<Direction>) -> Self {
        Self { flags, translate }
    }

    /// Picks the channels for a slot that is entering or leaving, with the coming image being
    /// the next (`as_next`) or the previous one in location.
    pub fn for_role(is_enter: bool, as_next: bool) -> Self {
        match (is_enter, as_next) {
            // 下一张：在原地放大并淡入
            (true, true) => Self::new(
                TransitionFlags::ENTER | TransitionFlags::SCALE | TransitionFlags::ALPHA,
                None,
            ),
            // 上一张：从左侧滑入
            (true, false) => Self::new(TransitionFlags::ENTER, Some(Direction::Right)),
            // 被下一张替换：向左滑出
            (false, true) => Self::new(TransitionFlags::empty(), Some(Direction::Left)),
            // 被上一张替换：在原地缩小并淡出
            (false, false) => {
                Self::new(TransitionFlags::SCALE | TransitionFlags::ALPHA, None)
            }
        }
    }

    pub fn is_enter(&self) -> bool {
        self.flags.contains(TransitionFlags::ENTER)
    }

    pub fn has_alpha(&self) -> bool {
        self.flags.contains(TransitionFlags::ALPHA)
    }

    pub fn has_scale(&self) -> bool {
        self.flags.contains(TransitionFlags::SCALE)
    }
}
