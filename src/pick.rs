//! Pointer -> candle resolution.

use crate::celebrate::Celebration;
use crate::flames::FlameStore;
use crate::scene::{Camera, Raycast};

/// Pointer position in client (surface) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Pointer {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Pointer {
    /// Center of a terminal cell.
    pub(crate) fn from_cell(column: u16, row: u16) -> Self {
        Self {
            x: column as f32 + 0.5,
            y: row as f32 + 0.5,
        }
    }
}

/// The rendering surface's on-screen bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Surface {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Surface {
    pub(crate) fn terminal(cols: u16, rows: u16) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: cols as f32,
            height: rows as f32,
        }
    }

    pub(crate) fn to_ndc(&self, p: Pointer) -> Option<(f32, f32)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let x = ((p.x - self.left) / self.width) * 2.0 - 1.0;
        let y = -((p.y - self.top) / self.height) * 2.0 + 1.0;
        Some((x, y))
    }

    /// Inverse of `to_ndc`.
    #[cfg(test)]
    pub(crate) fn from_ndc(&self, x: f32, y: f32) -> Pointer {
        Pointer {
            x: self.left + (x + 1.0) * 0.5 * self.width,
            y: self.top + (1.0 - y) * 0.5 * self.height,
        }
    }
}

/// The lit candle under the pointer, nearest first. Once the celebration has
/// started every pointer is ignored.
pub(crate) fn resolve<R: Raycast>(
    pointer: Pointer,
    surface: &Surface,
    camera: &Camera,
    scene: &R,
    flames: &FlameStore,
    celebration: &Celebration,
) -> Option<usize> {
    if celebration.is_triggered() {
        return None;
    }
    let (nx, ny) = surface.to_ndc(pointer)?;
    let candidates = flames.lit_indices();
    if candidates.is_empty() {
        return None;
    }
    let ray = camera.ray(nx, ny);
    scene.intersect(&ray, &candidates).map(|hit| hit.index)
}
