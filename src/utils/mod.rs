/// utils/mod.rs - 切换器各处共用的工具函数和数据结构
/// 职责：
///   - 整数几何类型（点、尺寸、矩形）及居中、适配缩放计算
///   - 单调时钟读取（供动画时钟使用）
///   - 版本字符串
///   - PNG 输出（演示程序保存渲染帧）

use std::io::Write; // IO写操作trait
use std::time::Duration; // 时间间隔类型

use git_version::git_version; // Git版本信息获取
use rustix::time::{clock_gettime, ClockId}; // 系统时间获取
use serde::Serialize;

/// 整数坐标点（屏幕坐标，原点在左上角）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// 整数尺寸
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

/// 轴对齐矩形：左上角位置 + 尺寸
///
/// 图像总是整幅绘制进这个矩形，缩放的轴心是左上角。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub loc: Point,
    pub size: Size,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// 任一维度非正即视为空
    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// 按比例缩放，结果截断为整数（与绘制时的像素对齐方式一致）
    pub fn scaled(self, scale: f64) -> Self {
        Self {
            w: (scale * f64::from(self.w)) as i32,
            h: (scale * f64::from(self.h)) as i32,
        }
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Self {
        Self { w, h }
    }
}

impl Rect {
    pub const fn new(loc: Point, size: Size) -> Self {
        Self { loc, size }
    }

    pub fn from_loc_and_size(loc: impl Into<Point>, size: impl Into<Size>) -> Self {
        Self {
            loc: loc.into(),
            size: size.into(),
        }
    }

    pub fn left(&self) -> i32 {
        self.loc.x
    }

    pub fn top(&self) -> i32 {
        self.loc.y
    }

    pub fn right(&self) -> i32 {
        self.loc.x.saturating_add(self.size.w)
    }

    pub fn bottom(&self) -> i32 {
        self.loc.y.saturating_add(self.size.h)
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// 检查点是否落在矩形内（右、下边界不含）
    pub fn contains(&self, point: Point) -> bool {
        self.left() <= point.x
            && point.x < self.right()
            && self.top() <= point.y
            && point.y < self.bottom()
    }
}

/// 计算让 `size` 在 `container` 中居中的左上角位置
///
/// 结果可能为负（内容比容器大时）。
pub fn center_in(size: Size, container: Size) -> Point {
    Point {
        x: (container.w - size.w) / 2,
        y: (container.h - size.h) / 2,
    }
}

/// 计算最佳适配缩放：容器完整容纳缩放后的图像，且不放大超过原始尺寸
///
/// 任一尺寸非正时返回 0。
pub fn fit_scale(original: Size, container: Size) -> f64 {
    if original.is_empty() || container.is_empty() {
        return 0.;
    }

    if container.w < original.w || container.h < original.h {
        return f64::min(
            f64::from(container.w) / f64::from(original.w),
            f64::from(container.h) / f64::from(original.h),
        );
    }
    1.
}

/// 获取当前版本信息字符串
pub fn version() -> String {
    // 优先使用构建时注入的版本字符串
    if let Some(v) = option_env!("IMAGE_SWITCHER_BUILD_VERSION_STRING") {
        return String::from(v);
    }

    let commit = option_env!("IMAGE_SWITCHER_BUILD_COMMIT")
        .unwrap_or(git_version!(fallback = "unknown commit"));

    format!("{} ({commit})", env!("CARGO_PKG_VERSION"))
}

/// 获取单调递增时钟时间（不受系统时间调整影响）
pub fn get_monotonic_time() -> Duration {
    let ts = clock_gettime(ClockId::Monotonic);
    Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

/// 将RGBA8像素数据写入PNG格式
pub fn write_png_rgba8(
    w: impl Write, // 写入目标（文件/内存等）
    width: u32,
    height: u32,
    pixels: &[u8], // RGBA像素数据
) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgba); // 32位RGBA
    encoder.set_depth(png::BitDepth::Eight); // 每通道8位

    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)
}
