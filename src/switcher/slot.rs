/// switcher/slot.rs - 单幅图像的显示状态
/// 职责：记录借用的像素缓冲区、绘制矩形、不透明度和适配缩放
/// 关键概念：涉及三个矩形
///   - 原始矩形：像素缓冲区的尺寸
///   - 宿主矩形：容器的尺寸
///   - 适配矩形：由前两者算出，对应 `fit_scale`
/// 槽位只借用像素缓冲区，从不复制或修改它

use crate::utils::{center_in, fit_scale, Point, Rect, Size};

/// Anything the switcher can show. Only the native size matters to the geometry.
pub trait PixelBuffer {
    fn size(&self) -> Size;
}

#[derive(Debug)]
pub struct ImageSlot<'a, B: ?Sized> {
    buffer: Option<&'a B>,
    /// Where the whole buffer is drawn into.
    rect: Rect,
    /// Instantaneous paint opacity, settles to 0xFF when idle.
    alpha: u8,
    fit_scale: f64,
}

impl<'a, B: PixelBuffer + ?Sized> ImageSlot<'a, B> {
    pub fn new() -> Self {
        Self {
            buffer: None,
            rect: Rect::default(),
            alpha: 0xFF,
            fit_scale: 1.,
        }
    }

    /// Accepts [0, 1].
    pub fn apply_alpha(&mut self, alpha: f64) {
        if !self.is_valid() {
            return;
        }

        let alpha = alpha.clamp(0., 1.);
        self.alpha = (alpha * 255.) as u8;
    }

    /// Accepts [0, 0xFF].
    pub fn apply_paint_alpha(&mut self, alpha: i32) {
        if !self.is_valid() {
            return;
        }

        self.alpha = alpha.clamp(0, 0xFF) as u8;
    }

    pub fn apply_offset(&mut self, x: i32, y: i32) {
        if !self.is_valid() {
            return;
        }

        self.rect.loc = Point::new(x, y);
    }

    /// The pivot is the top-left corner.
    pub fn apply_scale(&mut self, scale: f64) {
        let Some(buffer) = self.buffer else {
            return;
        };
        if scale <= 0. {
            return;
        }

        self.rect.size = buffer.size().scaled(scale);
    }

    pub fn centralize(&mut self, host_width: i32, host_height: i32) {
        if !self.is_valid() {
            return;
        }

        let loc = center_in(self.rect.size, Size::new(host_width, host_height));
        self.apply_offset(loc.x, loc.y);
    }

    /// Resets every attribute to its default value.
    pub fn clear(&mut self) {
        self.buffer = None;
        self.rect = Rect::default();
        self.alpha = 0xFF;
        self.fit_scale = 1.;
    }

    /// 恢复原始尺寸并移到原点
    fn reset(&mut self, buffer: &'a B) {
        self.buffer = Some(buffer);
        self.rect = Rect::new(Point::default(), buffer.size());
        self.alpha = 0xFF;
        self.fit_scale = 1.;
    }

    /// Shows `buffer` scaled down to fit the host and centered in it.
    ///
    /// A missing or empty buffer, or an empty host, leaves the slot cleared.
    pub fn reset_and_fit(&mut self, buffer: Option<&'a B>, host_width: i32, host_height: i32) {
        let host = Size::new(host_width, host_height);
        // 空缓冲区或空宿主都无法计算适配比例，直接视为无效槽位
        let Some(buffer) = buffer.filter(|b| !b.size().is_empty() && !host.is_empty()) else {
            self.clear();
            return;
        };

        self.reset(buffer);
        self.fit_scale = fit_scale(buffer.size(), host);
        self.apply_scale(self.fit_scale);
        self.centralize(host_width, host_height);
    }

    /// Only recomputes the fit scale, the rect is left untouched.
    pub fn update_fit_scale(&mut self, host_width: i32, host_height: i32) {
        let Some(buffer) = self.buffer else {
            return;
        };

        self.fit_scale = fit_scale(buffer.size(), Size::new(host_width, host_height));
    }

    pub fn is_valid(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&'a B> {
        self.buffer
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn fit_scale(&self) -> f64 {
        self.fit_scale
    }

    pub fn paint_alpha(&self) -> u8 {
        self.alpha
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.alpha) / 255.
    }
}

impl<B: PixelBuffer + ?Sized> Default for ImageSlot<'_, B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy(i32, i32);

    impl PixelBuffer for Dummy {
        fn size(&self) -> Size {
            Size::new(self.0, self.1)
        }
    }

    #[test]
    fn fits_wide_image() {
        let buffer = Dummy(2000, 1000);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 1000);

        assert_eq!(slot.fit_scale(), 0.5);
        assert_eq!(slot.rect(), Rect::from_loc_and_size((0, 250), (1000, 500)));
        assert_eq!(slot.paint_alpha(), 0xFF);
    }

    #[test]
    fn never_upscales() {
        let buffer = Dummy(300, 200);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 800);

        assert_eq!(slot.fit_scale(), 1.);
        assert_eq!(slot.rect(), Rect::from_loc_and_size((350, 300), (300, 200)));
    }

    #[test]
    fn missing_buffer_clears() {
        let buffer = Dummy(300, 200);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 800);
        slot.apply_alpha(0.5);

        slot.reset_and_fit(None, 1000, 800);
        assert!(!slot.is_valid());
        assert_eq!(slot.rect(), Rect::default());
        assert_eq!(slot.paint_alpha(), 0xFF);
        assert_eq!(slot.fit_scale(), 1.);
    }

    #[test]
    fn empty_host_or_buffer_clears() {
        let buffer = Dummy(2000, 1000);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 1000);
        assert!(slot.is_valid());

        slot.reset_and_fit(Some(&buffer), 0, 1000);
        assert!(!slot.is_valid());
        assert_eq!(slot.rect(), Rect::default());
        assert_eq!(slot.fit_scale(), 1.);

        slot.reset_and_fit(Some(&buffer), 1000, -5);
        assert!(!slot.is_valid());

        let empty = Dummy(0, 0);
        slot.reset_and_fit(Some(&empty), 1000, 1000);
        assert!(!slot.is_valid());
        assert_eq!(slot.fit_scale(), 1.);

        let flat = Dummy(300, 0);
        slot.reset_and_fit(Some(&flat), 1000, 1000);
        assert!(!slot.is_valid());
    }

    #[test]
    fn alpha_is_clamped() {
        let buffer = Dummy(10, 10);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 100, 100);
        slot.apply_alpha(1.7);
        assert_eq!(slot.paint_alpha(), 255);
        slot.apply_alpha(-0.2);
        assert_eq!(slot.paint_alpha(), 0);
        slot.apply_alpha(0.4);
        assert_eq!(slot.paint_alpha(), 102);

        slot.apply_paint_alpha(300);
        assert_eq!(slot.paint_alpha(), 255);
        slot.apply_paint_alpha(-5);
        assert_eq!(slot.paint_alpha(), 0);
        slot.apply_paint_alpha(128);
        assert_eq!(slot.opacity(), 128. / 255.);
    }

    #[test]
    fn scale_keeps_top_left() {
        let buffer = Dummy(400, 300);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 1000);
        slot.apply_offset(10, 20);

        slot.apply_scale(0.5);
        assert_eq!(slot.rect(), Rect::from_loc_and_size((10, 20), (200, 150)));

        // 非正比例被忽略
        slot.apply_scale(0.);
        slot.apply_scale(-1.);
        assert_eq!(slot.rect().size, Size::new(200, 150));

        slot.centralize(1000, 1000);
        assert_eq!(slot.rect().loc, Point::new(400, 425));
    }

    #[test]
    fn update_fit_scale_leaves_rect() {
        let buffer = Dummy(2000, 1000);
        let mut slot = ImageSlot::new();
        slot.reset_and_fit(Some(&buffer), 1000, 1000);
        let rect = slot.rect();

        slot.update_fit_scale(500, 1000);
        assert_eq!(slot.fit_scale(), 0.25);
        assert_eq!(slot.rect(), rect);
    }

    #[test]
    fn invalid_slot_ignores_geometry() {
        let mut slot = ImageSlot::<Dummy>::new();
        slot.apply_alpha(0.5);
        slot.apply_offset(5, 5);
        slot.apply_scale(2.);
        slot.centralize(100, 100);
        slot.update_fit_scale(100, 100);
        assert_eq!(slot.rect(), Rect::default());
        assert_eq!(slot.paint_alpha(), 0xFF);
        assert_eq!(slot.fit_scale(), 1.);
    }
}
