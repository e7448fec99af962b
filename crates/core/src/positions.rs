//! Block position packed into a single 64-bit integer
//!
//! # Layout
//! ```text
//! bits 38..63  X (26 bits, signed)
//! bits 12..37  Z (26 bits, signed)
//! bits  0..11  Y (12 bits, signed)
//! ```
//!
//! Packing masks each axis to its width; unpacking sign-extends with an
//! arithmetic shift-left/shift-right pair using the same widths.

use serde::{Deserialize, Serialize};

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: i64 = (1 << XZ_BITS) - 1;
const Y_MASK: i64 = (1 << Y_BITS) - 1;

/// Block coordinates (whole blocks, not pixels or sub-block offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const MIN_XZ: i32 = -(1 << (XZ_BITS - 1));
    pub const MAX_XZ: i32 = (1 << (XZ_BITS - 1)) - 1;
    pub const MIN_Y: i32 = -(1 << (Y_BITS - 1));
    pub const MAX_Y: i32 = (1 << (Y_BITS - 1)) - 1;

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Whether every axis fits its bit field without wrapping
    pub fn in_range(&self) -> bool {
        (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.x)
            && (Self::MIN_XZ..=Self::MAX_XZ).contains(&self.z)
            && (Self::MIN_Y..=Self::MAX_Y).contains(&self.y)
    }

    /// Pack into the wire representation. Out-of-range axes wrap to their width.
    pub const fn pack(self) -> i64 {
        ((self.x as i64 & XZ_MASK) << (XZ_BITS + Y_BITS))
            | ((self.z as i64 & XZ_MASK) << Y_BITS)
            | (self.y as i64 & Y_MASK)
    }

    /// Unpack from the wire representation
    pub const fn unpack(val: i64) -> Self {
        let x = val >> (XZ_BITS + Y_BITS);
        let z = (val << XZ_BITS) >> (XZ_BITS + Y_BITS);
        let y = (val << (64 - Y_BITS)) >> (64 - Y_BITS);
        Self {
            x: x as i32,
            y: y as i32,
            z: z as i32,
        }
    }
}
