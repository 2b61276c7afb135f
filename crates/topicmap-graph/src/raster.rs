//! Software rasterizer surface used for PNG export and pixel-level checks.

use crate::geometry::{Rect, Vec2};
use crate::render::{FontSpec, Surface, TextAlign};
use crate::style::Color;
use anyhow::{Context, Result};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

pub const FONT_PATH_ENV: &str = "TOPICMAP_FONT_PATH";

/// RGBA backing store scaled by the device pixel ratio.
///
/// Text is only drawn when a font has been supplied; without one the frame
/// still rasterizes every bubble.
pub struct RasterSurface {
    image: RgbaImage,
    scale: f32,
    font: Option<fontdue::Font>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RasterSurface {
    pub fn new(font: Option<fontdue::Font>) -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            scale: 1.0,
            font,
        }
    }

    /// Use the font named by `TOPICMAP_FONT_PATH`, or no font when unset or unreadable.
    pub fn from_env() -> Self {
        let font = std::env::var(FONT_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .and_then(|path| match load_font(&path) {
                Ok(font) => Some(font),
                Err(e) => {
                    tracing::warn!("Ignoring {}: {:#}", FONT_PATH_ENV, e);
                    None
                }
            });
        Self::new(font)
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn save_png(&self, path: &Path) -> Result<PathBuf> {
        let path = ensure_png_extension(path.to_path_buf());
        self.image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn to_physical(&self, v: Vec2) -> Vec2 {
        v.scaled(self.scale)
    }

    fn draw_text_line(&mut self, x: f32, center_y: f32, text: &str, size: f32, color: Color) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        let mut settings = LayoutSettings::default();
        if let Some(metrics) = font.horizontal_line_metrics(size) {
            let baseline = center_y + (metrics.ascent + metrics.descent) * 0.5;
            settings.y = baseline - metrics.ascent;
        } else {
            settings.y = center_y - size * 0.5;
        }
        settings.x = x;
        layout.reset(&settings);
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let mut glyphs = Vec::new();
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (metrics, bitmap) = font.rasterize_indexed(glyph.key.glyph_index, glyph.key.px);
            glyphs.push((glyph.x, glyph.y, metrics.width, metrics.height, bitmap));
        }
        for (gx, gy, width, height, bitmap) in glyphs {
            blend_glyph(&mut self.image, gx, gy, width, height, &bitmap, color);
        }
    }

    fn measure_text_width(&self, text: &str, size: f32) -> f32 {
        let Some(font) = self.font.as_ref() else {
            return 0.0;
        };
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        for glyph in layout.glyphs() {
            min_x = min_x.min(glyph.x);
            max_x = max_x.max(glyph.x + glyph.width as f32);
        }
        if min_x.is_finite() && max_x.is_finite() {
            (max_x - min_x).max(0.0)
        } else {
            0.0
        }
    }
}

impl Surface for RasterSurface {
    fn begin_frame(&mut self, logical_size: Vec2, pixels_per_point: f32) {
        self.scale = pixels_per_point;
        let width = (logical_size.x * pixels_per_point).round().max(0.0) as u32;
        let height = (logical_size.y * pixels_per_point).round().max(0.0) as u32;
        self.image = RgbaImage::new(width, height);
    }

    fn clear(&mut self, color: Color) {
        let (r, g, b, a) = color.to_tuple();
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([r, g, b, a]);
        }
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color, stroke_width: f32) {
        let c = self.to_physical(center);
        let r = radius * self.scale;
        draw_circle_filled(&mut self.image, c.x, c.y, r, fill);
        draw_circle_stroke(&mut self.image, c.x, c.y, r, stroke_width * self.scale, stroke);
    }

    fn rect(&mut self, rect: Rect, fill: Color) {
        let min = self.to_physical(rect.min);
        let max = self.to_physical(rect.max);
        for y in min.y.floor() as i32..max.y.ceil() as i32 {
            for x in min.x.floor() as i32..max.x.ceil() as i32 {
                blend_pixel(&mut self.image, x, y, fill, 255);
            }
        }
    }

    fn text(&mut self, pos: Vec2, text: &str, font: FontSpec, color: Color, align: TextAlign) {
        if self.font.is_none() || text.is_empty() {
            return;
        }
        let size = font.size * self.scale;
        let p = self.to_physical(pos);
        let x = match align {
            TextAlign::Center => p.x - self.measure_text_width(text, size) * 0.5,
            TextAlign::LeftCenter => p.x,
        };
        self.draw_text_line(x, p.y, text, size, color);
    }
}

fn load_font(path: &Path) -> Result<fontdue::Font> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))
}

fn ensure_png_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("png")
    }
}

fn draw_circle_filled(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let r = radius.max(1.0);
    let r_sq = r * r;
    let min_x = (cx - r).floor() as i32;
    let max_x = (cx + r).ceil() as i32;
    let min_y = (cy - r).floor() as i32;
    let max_y = (cy + r).ceil() as i32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r_sq {
                blend_pixel(image, x, y, color, 255);
            }
        }
    }
}

fn draw_circle_stroke(
    image: &mut RgbaImage,
    cx: f32,
    cy: f32,
    radius: f32,
    thickness: f32,
    color: Color,
) {
    let r = radius.max(1.0);
    let t = thickness.max(1.0);
    let outer = r;
    let inner = (r - t).max(0.0);
    let outer_sq = outer * outer;
    let inner_sq = inner * inner;
    let min_x = (cx - outer).floor() as i32;
    let max_x = (cx + outer).ceil() as i32;
    let min_y = (cy - outer).floor() as i32;
    let max_y = (cy + outer).ceil() as i32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= outer_sq && dist_sq >= inner_sq {
                blend_pixel(image, x, y, color, 255);
            }
        }
    }
}

fn blend_glyph(
    image: &mut RgbaImage,
    x: f32,
    y: f32,
    width: usize,
    height: usize,
    bitmap: &[u8],
    color: Color,
) {
    let start_x = x.floor() as i32;
    let start_y = y.floor() as i32;
    for row in 0..height {
        for col in 0..width {
            let alpha = bitmap[row * width + col];
            if alpha == 0 {
                continue;
            }
            blend_pixel(image, start_x + col as i32, start_y + row as i32, color, alpha);
        }
    }
}

fn blend_pixel(image: &mut RgbaImage, x: i32, y: i32, color: Color, alpha: u8) {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    let [r, g, b, a] = pixel.0;
    let alpha_f = alpha as f32 / 255.0;
    let src_a = (color.a as f32 / 255.0) * alpha_f;
    let inv = 1.0 - src_a;
    let out_r = (color.r as f32 * src_a + r as f32 * inv).round() as u8;
    let out_g = (color.g as f32 * src_a + g as f32 * inv).round() as u8;
    let out_b = (color.b as f32 * src_a + b as f32 * inv).round() as u8;
    let out_a = ((color.a as f32 * src_a + a as f32 * inv).round() as u8).max(a);
    pixel.0 = [out_r, out_g, out_b, out_a];
}
