// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Face size objects

use crate::conv::{pos, F16Dot16, F26Dot6};
use crate::error::{LifetimeError, Result};
use crate::face::FaceEntry;
use crate::ffi::FT_Size_Metrics;
use crate::handle::Borrowed;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scaled metrics of a face at its active size
///
/// A snapshot: later size changes do not affect it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeMetrics {
    /// Horizontal pixels per EM
    pub x_ppem: u16,
    /// Vertical pixels per EM
    pub y_ppem: u16,
    /// Scale from horizontal font units to 26.6 pixels
    pub x_scale: F16Dot16,
    /// Scale from vertical font units to 26.6 pixels
    pub y_scale: F16Dot16,
    pub ascender: F26Dot6,
    pub descender: F26Dot6,
    /// Baseline-to-baseline distance
    pub height: F26Dot6,
    pub max_advance: F26Dot6,
}

impl SizeMetrics {
    fn from_raw(m: &FT_Size_Metrics) -> Self {
        SizeMetrics {
            x_ppem: m.x_ppem,
            y_ppem: m.y_ppem,
            x_scale: F16Dot16::from_raw(m.x_scale),
            y_scale: F16Dot16::from_raw(m.y_scale),
            ascender: F26Dot6(pos(m.ascender)),
            descender: F26Dot6(pos(m.descender)),
            height: F26Dot6(pos(m.height)),
            max_advance: F26Dot6(pos(m.max_advance)),
        }
    }
}

/// View of the active size of a [`Face`](crate::Face)
///
/// Reflects later calls to
/// [`Face::set_char_size`](crate::Face::set_char_size) and
/// [`Face::set_pixel_sizes`](crate::Face::set_pixel_sizes).
#[derive(Clone, Debug)]
pub struct Size {
    face: Borrowed<FaceEntry>,
}

impl Size {
    pub(crate) fn new(face: Borrowed<FaceEntry>) -> Self {
        Size { face }
    }

    /// Snapshot the current metrics
    pub fn metrics(&self) -> Result<SizeMetrics> {
        let metrics = self.face.with(|entry| {
            // Safety: the face is live while its entry exists; its size
            // object is owned by the face.
            unsafe {
                let size = (*entry.face).size;
                (!size.is_null()).then(|| SizeMetrics::from_raw(&(*size).metrics))
            }
        })?;
        Ok(metrics.ok_or(LifetimeError::Stale)?)
    }
}
