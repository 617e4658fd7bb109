// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Type conversion utilities
//!
//! The engine uses three numeric encodings:
//!
//! -   26.6 fixed point ([`F26Dot6`]): 1/64 pixel, for most pixel-space metrics
//! -   16.16 fixed point ([`F16Dot16`]): scales, linear advances and matrices
//! -   raw font design units, for face-level metrics
//!
//! Conversions to and from `f64` divide or multiply by exactly 64 or 65536.
//! Both are powers of two, so conversion *to* `f64` is exact for any value
//! representable in 53 bits.

use crate::error::UsageError;
use crate::ffi::{FT_BBox, FT_Fixed, FT_Matrix, FT_Pos, FT_Vector};
use easy_cast::{Cast, Conv, ConvFloat};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Convert `usize` → `u32`
///
/// This is a "safer" wrapper around `as` ensuring (on debug builds) that the
/// input value may be represented correctly by `u32`.
#[inline]
pub fn to_u32(x: usize) -> u32 {
    x.cast()
}

/// Convert `u32` → `usize`
///
/// This is a "safer" wrapper around `as` ensuring that the operation is
/// zero-extension.
#[inline]
pub fn to_usize(x: u32) -> usize {
    x.cast()
}

/// Convert a native position to `i64`
#[inline]
pub(crate) fn pos(x: FT_Pos) -> i64 {
    i64::from(x)
}

/// Convert an `i64` to a native position, failing if out of range
#[inline]
pub(crate) fn to_pos(x: i64) -> Result<FT_Pos, UsageError> {
    Ok(FT_Pos::try_conv(x)?)
}

/// A 26.6 fixed-point value (units of 1/64)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct F26Dot6(pub i64);

impl F26Dot6 {
    /// Scale factor: `1.0` is represented as `64`
    pub const ONE: i64 = 64;

    /// Construct from a whole number
    ///
    /// Saturates at the bounds of `i64`.
    #[inline]
    pub fn from_int(x: i64) -> Self {
        F26Dot6(x.saturating_mul(Self::ONE))
    }

    /// Construct from `f64`, rounding to the nearest 1/64
    pub fn from_f64(x: f64) -> Result<Self, UsageError> {
        Ok(F26Dot6(i64::try_conv_nearest(x * 64.0)?))
    }

    /// Convert to `f64`
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 64.0
    }

    /// Integer part, rounding toward negative infinity
    #[inline]
    pub fn floor(self) -> i64 {
        self.0.div_euclid(Self::ONE)
    }

    /// Integer part, rounding toward positive infinity
    #[inline]
    pub fn ceil(self) -> i64 {
        let floor = self.floor();
        if self.0.rem_euclid(Self::ONE) == 0 {
            floor
        } else {
            floor + 1
        }
    }

    pub(crate) fn to_raw(self) -> Result<FT_Pos, UsageError> {
        to_pos(self.0)
    }
}

/// A 16.16 fixed-point value (units of 1/65536)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct F16Dot16(pub i64);

impl F16Dot16 {
    /// Scale factor: `1.0` is represented as `0x10000`
    pub const ONE: i64 = 0x10000;

    /// Construct from `f64`, rounding to the nearest 1/65536
    pub fn from_f64(x: f64) -> Result<Self, UsageError> {
        Ok(F16Dot16(i64::try_conv_nearest(x * 65536.0)?))
    }

    /// Convert to `f64`
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    #[inline]
    pub(crate) fn from_raw(x: FT_Fixed) -> Self {
        F16Dot16(i64::from(x))
    }

    pub(crate) fn to_raw(self) -> Result<FT_Fixed, UsageError> {
        Ok(FT_Fixed::try_conv(self.0)?)
    }
}

/// A 2D vector
///
/// Units depend on the source: 26.6 pixels, 16.16 or font units. Each
/// accessor returning a `Vector` documents which.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector {
    pub x: i64,
    pub y: i64,
}

impl Vector {
    /// Construct
    #[inline]
    pub fn new(x: i64, y: i64) -> Self {
        Vector { x, y }
    }

    /// True if both components are zero
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub(crate) fn from_raw(v: FT_Vector) -> Self {
        Vector::new(pos(v.x), pos(v.y))
    }

    pub(crate) fn to_raw(self) -> Result<FT_Vector, UsageError> {
        Ok(FT_Vector {
            x: to_pos(self.x)?,
            y: to_pos(self.y)?,
        })
    }
}

impl From<(i64, i64)> for Vector {
    fn from((x, y): (i64, i64)) -> Self {
        Vector::new(x, y)
    }
}

/// A 2x2 transformation matrix
///
/// Coefficients are stored as `f64` and passed to the engine as 16.16.
/// A point `(x, y)` maps to `(xx*x + xy*y, yx*x + yy*y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

impl Matrix {
    /// The identity transform
    pub const IDENTITY: Matrix = Matrix {
        xx: 1.0,
        xy: 0.0,
        yx: 0.0,
        yy: 1.0,
    };

    /// Construct from rows `[[xx, xy], [yx, yy]]`
    pub fn new(rows: [[f64; 2]; 2]) -> Self {
        Matrix {
            xx: rows[0][0],
            xy: rows[0][1],
            yx: rows[1][0],
            yy: rows[1][1],
        }
    }

    /// Counter-clockwise rotation by `angle` radians
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Matrix::new([[cos, -sin], [sin, cos]])
    }

    /// Scale by `sx` horizontally and `sy` vertically
    pub fn scale(sx: f64, sy: f64) -> Self {
        Matrix::new([[sx, 0.0], [0.0, sy]])
    }

    pub(crate) fn from_raw(m: FT_Matrix) -> Self {
        Matrix {
            xx: F16Dot16::from_raw(m.xx).to_f64(),
            xy: F16Dot16::from_raw(m.xy).to_f64(),
            yx: F16Dot16::from_raw(m.yx).to_f64(),
            yy: F16Dot16::from_raw(m.yy).to_f64(),
        }
    }

    pub(crate) fn to_raw(&self) -> Result<FT_Matrix, UsageError> {
        let fixed = |x: f64| F16Dot16::from_f64(x).and_then(F16Dot16::to_raw);
        Ok(FT_Matrix {
            xx: fixed(self.xx)?,
            xy: fixed(self.xy)?,
            yx: fixed(self.yx)?,
            yy: fixed(self.yy)?,
        })
    }
}

/// An axis-aligned box
///
/// Maximum coordinates are exclusive: `width = x_max - x_min`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl BBox {
    /// Width (`x_max - x_min`)
    #[inline]
    pub fn width(&self) -> i64 {
        self.x_max - self.x_min
    }

    /// Height (`y_max - y_min`)
    #[inline]
    pub fn height(&self) -> i64 {
        self.y_max - self.y_min
    }

    pub(crate) fn from_raw(b: FT_BBox) -> Self {
        BBox {
            x_min: pos(b.xMin),
            y_min: pos(b.yMin),
            x_max: pos(b.xMax),
            y_max: pos(b.yMax),
        }
    }
}

/// Convert a native unsigned value to `u32`, failing if out of range
#[inline]
pub(crate) fn try_u32<T>(x: T) -> Result<u32, UsageError>
where
    u32: Conv<T>,
{
    Ok(u32::try_conv(x)?)
}
