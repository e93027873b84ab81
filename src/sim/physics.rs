//! Axis-separated AABB physics against the tile grid
//!
//! Movement resolves one axis at a time: integrate velocity, probe the
//! leading corners, then revert (X) or snap to the tile edge (Y). Probes are
//! pixel-space point lookups, not sweeps: a body moving more than a tile per
//! tick can tunnel through thin geometry. Known limitation; in-game speeds
//! stay well under it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::TileGrid;
use crate::consts::*;
use crate::{tile_coord, tile_origin};

/// A moving axis-aligned box, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Width and height in pixels
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Strict AABB overlap test; touching edges do not count
#[inline]
pub fn overlaps(a: &Body, b: &Body) -> bool {
    a.pos.x < b.right() && a.right() > b.pos.x && a.pos.y < b.bottom() && a.bottom() > b.pos.y
}

/// Integrate X and revert on contact. Probes all four corners, with the
/// bottom pair lifted 2px so the row the body rests on is not sampled.
pub fn step_horizontal(body: &mut Body, grid: &TileGrid) {
    body.pos.x += body.vel.x;
    let lower = body.bottom() - 2.0;
    if grid.solid_at(body.pos.x, body.pos.y)
        || grid.solid_at(body.right(), body.pos.y)
        || grid.solid_at(body.pos.x, lower)
        || grid.solid_at(body.right(), lower)
    {
        body.pos.x -= body.vel.x;
        body.vel.x = 0.0;
    }
}

/// Integrate Y and snap to the tile edge on contact. Falling probes the two
/// foot corners, rising probes the two head corners, both inset 4px so wall
/// tiles beside the body do not register.
pub fn step_vertical(body: &mut Body, grid: &TileGrid) {
    body.pos.y += body.vel.y;
    let left = body.pos.x + 4.0;
    let right = body.right() - 4.0;
    if body.vel.y > 0.0 {
        if grid.solid_at(left, body.bottom()) || grid.solid_at(right, body.bottom()) {
            body.pos.y = tile_origin(tile_coord(body.pos.y)) + (TILE_SIZE - body.size.y);
            body.vel.y = 0.0;
        }
    } else if body.vel.y < 0.0
        && (grid.solid_at(left, body.pos.y) || grid.solid_at(right, body.pos.y))
    {
        body.pos.y = tile_origin(tile_coord(body.pos.y) + 1);
        body.vel.y = 0.0;
    }
}

/// True when a solid tile sits just under the body's feet
pub fn on_ground(body: &Body, grid: &TileGrid) -> bool {
    let probe_y = body.bottom() + 2.0;
    grid.solid_at(body.pos.x + 4.0, probe_y) || grid.solid_at(body.right() - 4.0, probe_y)
}
