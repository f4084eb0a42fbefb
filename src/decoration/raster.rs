//! Off-screen raster images and the primitives theme engines draw with.

use custom_debug_derive::Debug as CustomDebug;

use byteorder::{LittleEndian, WriteBytesExt};
use image::{Rgba, RgbaImage};

use crate::core::{Color, Geometry, Size};

/// One of the four corners of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

fn to_rgba(color: Color) -> Rgba<u8> {
    let (r, g, b, a) = color.rgba();
    Rgba([r, g, b, a])
}

fn from_rgba(px: &Rgba<u8>) -> Color {
    let [r, g, b, a] = px.0;
    Color::from_hex(u32::from_be_bytes([a, r, g, b]))
}

/// An off-screen pixel buffer with straight (non-premultiplied) alpha.
///
/// A `RasterImage` can never be degenerate: construction fails
/// for sizes with a zero or negative dimension, without allocating.
///
/// All drawing operations clip to the image bounds.
#[derive(CustomDebug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    size: Size,
    #[debug(skip)]
    buf: RgbaImage,
}

impl RasterImage {
    /// Allocates an image filled with `fill`.
    ///
    /// Returns None if `size` is degenerate.
    pub fn new(size: Size, fill: Color) -> Option<Self> {
        if size.is_degenerate() {
            return None;
        }

        Some(Self {
            size,
            buf: RgbaImage::from_pixel(size.width as u32, size.height as u32, to_rgba(fill)),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    /// The full extent of the image as a Geometry at the origin.
    pub fn bounds(&self) -> Geometry {
        Geometry::from_size(self.size)
    }

    /// The underlying RGBA buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.buf
    }

    /// Every pixel, row by row.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.buf.pixels().map(from_rgba)
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.size.width && y < self.size.height
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(from_rgba(self.buf.get_pixel(x as u32, y as u32)))
    }

    /// Overwrites a single pixel, ignoring its previous contents.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            self.buf.put_pixel(x as u32, y as u32, to_rgba(color));
        }
    }

    /// Composites `color` over a single pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let px = self.buf.get_pixel_mut(x as u32, y as u32);
        *px = to_rgba(color.over(from_rgba(px)));
    }

    /// Clips `geom` to the image, returning the covered pixel ranges.
    fn clip(&self, geom: Geometry) -> Option<(i32, i32, i32, i32)> {
        let clipped = self.bounds().intersect(&geom)?;
        Some((
            clipped.x,
            clipped.y,
            clipped.x + clipped.width,
            clipped.y + clipped.height,
        ))
    }

    /// Fills a rectangle, compositing if `color` is translucent.
    pub fn fill_rect(&mut self, geom: Geometry, color: Color) {
        let Some((x1, y1, x2, y2)) = self.clip(geom) else {
            return;
        };
        for y in y1..y2 {
            for x in x1..x2 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Draws a rectangle outline of the given thickness.
    pub fn stroke_rect(&mut self, geom: Geometry, thickness: i32, color: Color) {
        let t = thickness.max(1);
        let (x, y, w, h) = (geom.x, geom.y, geom.width, geom.height);
        self.fill_rect(Geometry::new(x, y, t, w), color);
        self.fill_rect(Geometry::new(x, y + h - t, t, w), color);
        self.fill_rect(Geometry::new(x, y + t, h - 2 * t, t), color);
        self.fill_rect(Geometry::new(x + w - t, y + t, h - 2 * t, t), color);
    }

    /// Fills a rectangle with a vertical gradient from `top` to `bottom`.
    pub fn fill_vertical_gradient(&mut self, geom: Geometry, top: Color, bottom: Color) {
        let Some((x1, y1, x2, y2)) = self.clip(geom) else {
            return;
        };
        let span = (geom.height - 1).max(1) as u32;
        for y in y1..y2 {
            let color = top.mix(bottom, (y - geom.y) as u32, span);
            for x in x1..x2 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Fills a circle centered within `geom`, sized to its shorter side.
    pub fn fill_circle(&mut self, geom: Geometry, color: Color) {
        let d = geom.width.min(geom.height);
        if d <= 0 {
            return;
        }
        let Some((x1, y1, x2, y2)) = self.clip(geom) else {
            return;
        };
        // doubled coordinates so odd diameters stay centered
        let cx2 = 2 * geom.x + geom.width;
        let cy2 = 2 * geom.y + geom.height;
        let r2 = d * d;
        for y in y1..y2 {
            for x in x1..x2 {
                let dx = 2 * x + 1 - cx2;
                let dy = 2 * y + 1 - cy2;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Draws a line of the given thickness between two points.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), thickness: i32, color: Color) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let t = thickness.max(1);
        let off = (t - 1) / 2;

        loop {
            for ty in 0..t {
                for tx in 0..t {
                    self.set_pixel(x - off + tx, y - off + ty, color);
                }
            }
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Clears every pixel outside a quarter circle of `radius` in
    /// the given corner to fully transparent.
    pub fn clear_corner(&mut self, corner: Corner, radius: i32) {
        let r = radius.min(self.size.width).min(self.size.height);
        if r <= 0 {
            return;
        }
        let (w, h) = (self.size.width, self.size.height);
        for j in 0..r {
            for i in 0..r {
                // distance from the arc center, measured at pixel centers
                let dx = 2 * (r - i) - 1;
                let dy = 2 * (r - j) - 1;
                if dx * dx + dy * dy > 4 * r * r {
                    let (x, y) = match corner {
                        Corner::TopLeft => (i, j),
                        Corner::TopRight => (w - 1 - i, j),
                        Corner::BottomLeft => (i, h - 1 - j),
                        Corner::BottomRight => (w - 1 - i, h - 1 - j),
                    };
                    self.set_pixel(x, y, Color::TRANSPARENT);
                }
            }
        }
    }

    /// Horizontal runs of non-transparent pixels in row `y`, as (x, width).
    fn opaque_runs(&self, y: i32) -> Vec<(i32, i32)> {
        let mut runs = Vec::new();
        let mut start = None;
        for x in 0..self.size.width {
            let opaque = self.buf.get_pixel(x as u32, y as u32).0[3] != 0;
            match (opaque, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, x - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.size.width - s));
        }
        runs
    }

    /// The region covered by pixels that are not fully transparent,
    /// as a list of non-overlapping rectangles.
    ///
    /// Consecutive rows with the same runs are merged, so an image
    /// with only its corners cleared yields a handful of rectangles.
    pub fn opaque_region(&self) -> Vec<Geometry> {
        let mut region: Vec<Geometry> = Vec::new();
        let mut prev: Option<Vec<(i32, i32)>> = None;
        let mut first = 0;

        for y in 0..self.size.height {
            let runs = self.opaque_runs(y);
            if prev.as_ref() == Some(&runs) {
                for rect in &mut region[first..] {
                    rect.height += 1;
                }
                continue;
            }
            first = region.len();
            region.extend(runs.iter().map(|&(x, w)| Geometry::new(x, y, 1, w)));
            prev = Some(runs);
        }
        region
    }

    /// Serializes the pixels as little-endian `0xAARRGGBB` words,
    /// the byte order of a ZPixmap on little-endian servers.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.rows_to_le_bytes(0, self.size.height)
    }

    /// Serializes a horizontal strip of rows, for servers whose
    /// maximum request size is smaller than the whole image.
    pub fn rows_to_le_bytes(&self, first: i32, count: i32) -> Vec<u8> {
        let start = first.clamp(0, self.size.height);
        let end = first.saturating_add(count).clamp(start, self.size.height);
        let mut data = Vec::with_capacity(((end - start) * self.size.width) as usize * 4);
        for y in start..end {
            for x in 0..self.size.width {
                let px = from_rgba(self.buf.get_pixel(x as u32, y as u32));
                // writing into a Vec cannot fail
                let _ = data.write_u32::<LittleEndian>(px.as_u32());
            }
        }
        data
    }
}
