/// render.rs - 绘制快照与软件绘制器
/// 职责：渲染方每帧从切换器取出按“从后到前”排好序的图层并绘制
/// 说明：平台相关的绘制不在本 crate 范围内；这里附带一个简单的软件绘制器，
///       演示程序用它把帧写成 PNG

use arrayvec::ArrayVec;

use crate::switcher::{PixelBuffer, Switcher};
use crate::utils::{Rect, Size};

/// Owned RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// One slot ready to be painted: draw the whole `buffer` into `rect` with `alpha`.
#[derive(Debug)]
pub struct RenderLayer<'a, B: ?Sized> {
    pub buffer: &'a B,
    pub rect: Rect,
    pub alpha: u8,
}

impl<B: ?Sized> Clone for RenderLayer<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for RenderLayer<'_, B> {}

impl ImageBuffer {
    /// Creates a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rv = Self::new(width, height);
        rv.fill(color);
        rv
    }

    /// Two-color checkerboard with square cells of `cell` pixels.
    pub fn checkerboard(width: u32, height: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let cell = cell.max(1);
        let mut rv = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
                rv.set_pixel(x, y, color);
            }
        }
        rv
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        let mut rv = [0; 4];
        rv.copy_from_slice(&self.pixels[i..i + 4]);
        rv
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let i = self.index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&color);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl PixelBuffer for ImageBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }
}

impl<'a, B: PixelBuffer + ?Sized> Switcher<'a, B> {
    /// Returns the valid slots in back-to-front order.
    ///
    /// When the coming image is the next one it slides in from behind, so it is painted first.
    pub fn render_layers(&self) -> ArrayVec<RenderLayer<'a, B>, 2> {
        let (back, front) = if self.coming_as_next() {
            (self.coming(), self.current())
        } else {
            (self.current(), self.coming())
        };

        let mut rv = ArrayVec::new();
        for slot in [back, front] {
            let Some(buffer) = slot.buffer() else {
                continue;
            };
            if slot.rect().is_empty() {
                continue;
            }

            rv.push(RenderLayer {
                buffer,
                rect: slot.rect(),
                alpha: slot.paint_alpha(),
            });
        }
        rv
    }
}

/// Paints `layers` over `canvas` in order, scaling with nearest-neighbor sampling.
pub fn paint(canvas: &mut ImageBuffer, layers: &[RenderLayer<'_, ImageBuffer>]) {
    let _span = tracy_client::span!("render::paint");

    for layer in layers {
        paint_layer(canvas, layer);
    }
}

fn paint_layer(canvas: &mut ImageBuffer, layer: &RenderLayer<'_, ImageBuffer>) {
    let rect = layer.rect;
    let src = layer.buffer;
    if rect.is_empty() || src.width == 0 || src.height == 0 || layer.alpha == 0 {
        return;
    }

    // 裁剪到画布范围
    let x0 = rect.left().max(0);
    let y0 = rect.top().max(0);
    let x1 = rect.right().min(canvas.width as i32);
    let y1 = rect.bottom().min(canvas.height as i32);

    for y in y0..y1 {
        let dy = i64::from(y) - i64::from(rect.top());
        let sy = dy * i64::from(src.height) / i64::from(rect.size.h);
        for x in x0..x1 {
            let dx = i64::from(x) - i64::from(rect.left());
            let sx = dx * i64::from(src.width) / i64::from(rect.size.w);
            let color = src.pixel(sx as u32, sy as u32);
            let under = canvas.pixel(x as u32, y as u32);
            canvas.set_pixel(x as u32, y as u32, blend(color, under, layer.alpha));
        }
    }
}

/// Source-over with an extra layer opacity.
fn blend(src: [u8; 4], dst: [u8; 4], alpha: u8) -> [u8; 4] {
    let a = u32::from(src[3]) * u32::from(alpha) / 255;
    let inv = 255 - a;

    let mut rv = [0; 4];
    for i in 0..3 {
        rv[i] = ((u32::from(src[i]) * a + u32::from(dst[i]) * inv) / 255) as u8;
    }
    rv[3] = (a + u32::from(dst[3]) * inv / 255) as u8;
    rv
}
