/// switcher/gesture.rs - 手势变换
/// 职责：时间轴之外对当前图像的直接操作，包括以锚点为中心的缩放、自由平移、复位
/// 说明：手势识别由外部完成，这里只接收已经换算好的缩放倍数和位移

use super::{PixelBuffer, Switcher};
use crate::utils::Point;

impl<'a, B: PixelBuffer + ?Sized> Switcher<'a, B> {
    /// Sets the absolute zoom of the current image, keeping it centered in the host.
    pub fn set_zoom(&mut self, scale: f64) {
        if !self.accepts_gesture() {
            return;
        }

        self.apply_zoom(scale);
        self.current.centralize(self.host.w, self.host.h);
    }

    /// Multiplies the zoom by `factor` around the host center.
    pub fn zoom_by(&mut self, factor: f64) {
        // 以中心为焦点时直接重新居中，避免反复换算锚点带来的累积误差
        self.set_zoom(factor * self.scale);
    }

    /// Multiplies the zoom by `factor` keeping `anchor` stable on the screen.
    pub fn zoom_by_at(&mut self, factor: f64, anchor: Point) {
        if !self.accepts_gesture() {
            return;
        }

        let rect = self.current.rect();
        if rect.is_empty() {
            return;
        }

        // 锚点相对于 (left, top) 的位置，以及它在矩形中的比例位置
        let anchor_x = anchor.x.saturating_sub(rect.left());
        let anchor_y = anchor.y.saturating_sub(rect.top());
        let fraction_x = f64::from(anchor_x) / f64::from(rect.size.w);
        let fraction_y = f64::from(anchor_y) / f64::from(rect.size.h);

        self.apply_zoom(factor * self.scale);

        let rect = self.current.rect();
        let offset_x = fraction_x * f64::from(rect.size.w) - f64::from(anchor_x);
        let offset_y = fraction_y * f64::from(rect.size.h) - f64::from(anchor_y);
        self.current.apply_offset(
            rect.left().saturating_sub(offset_x as i32),
            rect.top().saturating_sub(offset_y as i32),
        );
    }

    /// Moves the current image, without any clamping.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if !self.accepts_gesture() {
            return;
        }

        let rect = self.current.rect();
        self.current
            .apply_offset(rect.left().saturating_add(dx), rect.top().saturating_add(dy));
    }

    /// Fits the current image to the host again and drops any zoom.
    pub fn reset_image(&mut self) {
        if !self.accepts_gesture() {
            return;
        }

        let host = self.host;
        self.current.reset_and_fit(self.current.buffer(), host.w, host.h);
        self.scale = self.current.fit_scale();
    }

    /// 动画运行中不接受手势；没有图像时也无从变换
    fn accepts_gesture(&self) -> bool {
        if self.is_busy() {
            debug!("ignoring gesture while switching");
            return false;
        }

        self.current.is_valid()
    }

    /// Clamps, snaps and applies `scale` to the current slot, pivoting at its top-left.
    fn apply_zoom(&mut self, scale: f64) {
        if !scale.is_finite() {
            return;
        }
        let Some(buffer) = self.current.buffer() else {
            return;
        };
        let native = buffer.size();
        if native.is_empty() || self.host.is_empty() {
            return;
        }

        let zoom = &self.config.zoom;
        let fit = self.current.fit_scale();

        // 图像本身需要更小的比例才能完整放下时，允许缩到那个比例
        let host_fit = f64::min(
            f64::from(self.host.w) / f64::from(native.w),
            f64::from(self.host.h) / f64::from(native.h),
        );
        let min_scale = f64::min(zoom.min_scale, host_fit);
        // 上限不能低于下限，否则 clamp 的区间会反转
        let max_scale = f64::max(zoom.max_factor * fit, min_scale);

        let mut scale = if scale > max_scale {
            max_scale
        } else if scale < min_scale {
            min_scale
        } else {
            scale
        };

        if (scale - fit).abs() <= zoom.snap_band * fit {
            scale = fit;
        }

        trace!(scale, fit, "applying zoom");
        self.current.apply_scale(scale);
        self.scale = scale;
    }
}
