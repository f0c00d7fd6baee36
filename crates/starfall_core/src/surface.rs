//! Drawing surfaces.
//!
//! The engine only needs three primitives: resize, clear a region, and
//! stroke a line segment. Surfaces must tolerate strokes that fall partly
//! or entirely outside their current bounds; particles spend much of their
//! life above the top edge, and a resize can shrink the bounds between two
//! frames.

use crate::color::Color;
use crate::geometry::{Point, Rect};

/// A drawing target sized in whole pixels.
pub trait Surface {
    /// Current pixel dimensions `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Sets the pixel dimensions.
    fn resize(&mut self, width: u32, height: u32);

    /// Clears `region` (clipped to the surface) to transparent.
    fn clear(&mut self, region: Rect);

    /// Strokes a segment. Out-of-bounds portions are discarded.
    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32);

    /// The surface as a rectangle anchored at the origin.
    #[allow(clippy::cast_precision_loss)]
    fn bounds(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0.0, 0.0, w as f32, h as f32)
    }
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Surface resized.
    Resize {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// Region cleared.
    Clear {
        /// Cleared region after clipping.
        region: Rect,
    },
    /// Line stroked.
    Stroke {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke colour.
        color: Color,
        /// Stroke width.
        width: f32,
    },
}

/// Surface that records commands instead of rasterizing them.
///
/// Strokes whose extent misses the surface entirely are counted but not
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    culled: u64,
}

impl RecordingSurface {
    /// Creates a surface with the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::with_capacity(256),
            culled: 0,
        }
    }

    /// All commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Recorded strokes as `(from, to, color, width)`.
    pub fn strokes(&self) -> impl Iterator<Item = (Point, Point, Color, f32)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCommand::Stroke {
                from,
                to,
                color,
                width,
            } => Some((from, to, color, width)),
            _ => None,
        })
    }

    /// Strokes discarded for lying fully outside the surface.
    #[must_use]
    pub const fn culled(&self) -> u64 {
        self.culled
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn clear(&mut self, region: Rect) {
        if let Some(region) = region.intersection(&self.bounds()) {
            self.commands.push(DrawCommand::Clear { region });
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        let extent = Rect::spanning(from, to).expand(width * 0.5);
        if extent.intersects(&self.bounds()) {
            self.commands.push(DrawCommand::Stroke {
                from,
                to,
                color,
                width,
            });
        } else {
            self.culled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_visible_strokes() {
        let mut surface = RecordingSurface::new(100, 100);
        surface.stroke_line(Point::new(10.0, 10.0), Point::new(6.0, 0.0), Color::WHITE, 2.0);
        assert_eq!(surface.strokes().count(), 1);
        assert_eq!(surface.culled(), 0);
    }

    #[test]
    fn test_culls_strokes_above_top_edge() {
        let mut surface = RecordingSurface::new(100, 100);
        surface.stroke_line(Point::new(10.0, -40.0), Point::new(6.0, -50.0), Color::WHITE, 2.0);
        assert_eq!(surface.strokes().count(), 0);
        assert_eq!(surface.culled(), 1);
    }

    #[test]
    fn test_shrinking_culls_previously_visible_region() {
        let mut surface = RecordingSurface::new(200, 200);
        surface.resize(50, 50);
        surface.stroke_line(Point::new(150.0, 150.0), Point::new(140.0, 120.0), Color::GOLD, 3.0);
        assert_eq!(surface.culled(), 1);
        assert_eq!(surface.size(), (50, 50));
    }

    #[test]
    fn test_clear_is_clipped() {
        let mut surface = RecordingSurface::new(100, 50);
        surface.clear(Rect::new(-10.0, -10.0, 500.0, 500.0));
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Clear {
                region: Rect::new(0.0, 0.0, 100.0, 50.0)
            }]
        );
    }
}
