//! Playfield module - lattice bounds of the stage
//!
//! The stage is an open-topped box of unit cells:
//! - x ranges 0..width (left to right)
//! - z ranges 0..depth (front to back)
//! - y ranges 0.. upwards; the floor is the plane below y = 0
//!
//! `height` does not stop a falling piece. It bounds the spawn area and the
//! layer scan of the clear pass.

use serde::Serialize;

use crate::types::{
    ContactTarget, Vec3i, CELL_SCALE, PLAYFIELD_DEPTH, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Playfield {
    width: i32,
    depth: i32,
    height: i32,
    scale: i32,
}

impl Playfield {
    /// Create a playfield, clamping every dimension to at least one cell
    pub fn new(width: i32, depth: i32, height: i32, scale: i32) -> Self {
        Self {
            width: width.max(1),
            depth: depth.max(1),
            height: height.max(1),
            scale: scale.max(1),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// World units per cell
    pub fn scale(&self) -> i32 {
        self.scale
    }

    /// Number of cells in one full horizontal layer
    pub fn footprint(&self) -> usize {
        (self.width as usize).saturating_mul(self.depth as usize)
    }

    /// Check if a cell lies inside the walls and above the floor
    pub fn contains(&self, cell: Vec3i) -> bool {
        self.boundary_contact(cell).is_none()
    }

    /// The first boundary a cell violates, if any
    ///
    /// The floor is reported before walls so a piece that slid into a corner
    /// while falling still registers its landing.
    pub fn boundary_contact(&self, cell: Vec3i) -> Option<ContactTarget> {
        if cell.y < 0 {
            Some(ContactTarget::Floor)
        } else if cell.x < 0 {
            Some(ContactTarget::WallLeft)
        } else if cell.x >= self.width {
            Some(ContactTarget::WallRight)
        } else if cell.z < 0 {
            Some(ContactTarget::WallFront)
        } else if cell.z >= self.depth {
            Some(ContactTarget::WallBack)
        } else {
            None
        }
    }

    /// How far a cell pokes through the given wall or floor (0 when inside)
    pub fn overshoot(&self, cell: Vec3i, target: ContactTarget) -> i32 {
        match target {
            ContactTarget::WallLeft => (-cell.x).max(0),
            ContactTarget::WallRight => (cell.x - self.width + 1).max(0),
            ContactTarget::WallFront => (-cell.z).max(0),
            ContactTarget::WallBack => (cell.z - self.depth + 1).max(0),
            ContactTarget::Floor => (-cell.y).max(0),
            ContactTarget::SettledBlock => 0,
        }
    }

    /// Convert a lattice coordinate to world units
    pub fn to_world(&self, cell: Vec3i) -> Vec3i {
        cell.scaled(self.scale)
    }

    /// Every lattice coordinate of layer `y`
    pub fn layer_cells(&self, y: i32) -> impl Iterator<Item = Vec3i> + '_ {
        (0..self.depth).flat_map(move |z| (0..self.width).map(move |x| Vec3i::new(x, y, z)))
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(PLAYFIELD_WIDTH, PLAYFIELD_DEPTH, PLAYFIELD_HEIGHT, CELL_SCALE)
    }
}
