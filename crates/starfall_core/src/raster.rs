//! CPU raster surface.
//!
//! An RGBA8 buffer with DDA line stroking and source-over blending. Used by
//! the headless driver to produce snapshots, and by tests that need to
//! check pixels rather than commands.
//!
//! All writes go through a bounds-checked plot; a stroke that extends past
//! the buffer (including one issued right after a shrinking resize) only
//! touches the pixels that exist.

use std::io::Write;
use std::path::Path;

use crate::color::Color;
use crate::error::{StarfallError, StarfallResult};
use crate::geometry::{Point, Rect};
use crate::surface::Surface;

/// Pixel buffer surface.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    /// Pixels covered by the stroke in progress, so overlapping steps of a
    /// thick or short line blend only once.
    scratch: Vec<(i64, i64)>,
}

impl RasterSurface {
    /// Creates a transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
            scratch: Vec::with_capacity(256),
        }
    }

    /// Reads a pixel, or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Number of pixels with non-zero alpha.
    #[must_use]
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0).count()
    }

    /// Encodes the buffer as binary PPM (P6), composited over black.
    #[must_use]
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        out.extend_from_slice(header.as_bytes());
        for &[r, g, b, a] in &self.pixels {
            let over = |c: u8| ((u16::from(c) * u16::from(a)) / 255) as u8;
            out.extend_from_slice(&[over(r), over(g), over(b)]);
        }
        out
    }

    /// Writes a PPM snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StarfallError::Io`] if the file cannot be written.
    pub fn write_ppm(&self, path: impl AsRef<Path>) -> StarfallResult<()> {
        let path = path.as_ref();
        let mut file = std::fs::File::create(path).map_err(|e| StarfallError::io(path, &e))?;
        file.write_all(&self.to_ppm())
            .map_err(|e| StarfallError::io(path, &e))?;
        tracing::info!(
            "Wrote {}x{} snapshot to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[allow(clippy::cast_possible_truncation)]
    fn plot(&mut self, x: i64, y: i64, src: [u8; 4]) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = self.index(x as u32, y as u32);
        let dst = self.pixels[i];
        self.pixels[i] = blend(dst, src);
    }
}

/// Source-over blend of 8-bit RGBA.
#[allow(clippy::cast_possible_truncation)]
fn blend(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    let da = u32::from(dst[3]);
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        return [0; 4];
    }
    let channel = |s: u8, d: u8| {
        let num = u32::from(s) * sa + u32::from(d) * da * (255 - sa) / 255;
        (num / out_a).min(255) as u8
    };
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        out_a.min(255) as u8,
    ]
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resizing discards the contents, as a canvas does.
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, [0; 4]);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clear(&mut self, region: Rect) {
        let Some(r) = region.intersection(&self.bounds()) else {
            return;
        };
        let x0 = r.x.floor().max(0.0) as u32;
        let y0 = r.y.floor().max(0.0) as u32;
        let x1 = (r.right().ceil() as u32).min(self.width);
        let y1 = (r.bottom().ceil() as u32).min(self.height);
        for y in y0..y1 {
            let row = self.index(0, y);
            self.pixels[row + x0 as usize..row + x1 as usize].fill([0; 4]);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        let extent = Rect::spanning(from, to).expand(width * 0.5);
        if !extent.intersects(&self.bounds()) {
            return;
        }

        let src = color.to_rgba8();
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        let thickness = width.round().max(1.0) as i64;
        let lo = -(thickness - 1) / 2;
        let hi = lo + thickness;

        let mut covered = std::mem::take(&mut self.scratch);
        covered.clear();
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let cx = (from.x + dx * t).round() as i64;
            let cy = (from.y + dy * t).round() as i64;
            for oy in lo..hi {
                for ox in lo..hi {
                    covered.push((cx + ox, cy + oy));
                }
            }
        }
        covered.sort_unstable();
        covered.dedup();
        for &(x, y) in &covered {
            self.plot(x, y, src);
        }
        self.scratch = covered;
    }
}
