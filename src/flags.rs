// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Flags and modes

use crate::ffi::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Glyph loading flags
    ///
    /// Passed to [`Face::load_glyph`](crate::Face::load_glyph) and
    /// [`Face::load_char`](crate::Face::load_char).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct LoadFlags: i32 {
        /// Load in font units without scaling; implies `NO_HINTING`
        const NO_SCALE = FT_LOAD_NO_SCALE;
        const NO_HINTING = FT_LOAD_NO_HINTING;
        /// Render to a bitmap immediately after loading
        const RENDER = FT_LOAD_RENDER;
        /// Ignore embedded bitmap strikes
        const NO_BITMAP = FT_LOAD_NO_BITMAP;
        const VERTICAL_LAYOUT = FT_LOAD_VERTICAL_LAYOUT;
        const FORCE_AUTOHINT = FT_LOAD_FORCE_AUTOHINT;
        const CROP_BITMAP = FT_LOAD_CROP_BITMAP;
        const PEDANTIC = FT_LOAD_PEDANTIC;
        const IGNORE_GLOBAL_ADVANCE_WIDTH = FT_LOAD_IGNORE_GLOBAL_ADVANCE_WIDTH;
        /// Do not load composite glyphs recursively; exposes subglyphs
        const NO_RECURSE = FT_LOAD_NO_RECURSE;
        /// Ignore the face transform set by [`Face::set_transform`](crate::Face::set_transform)
        const IGNORE_TRANSFORM = FT_LOAD_IGNORE_TRANSFORM;
        /// With `RENDER`, produce a 1-bit bitmap
        const MONOCHROME = FT_LOAD_MONOCHROME;
        /// Keep linear advances in font units
        const LINEAR_DESIGN = FT_LOAD_LINEAR_DESIGN;
        const NO_AUTOHINT = FT_LOAD_NO_AUTOHINT;
        const COLOR = FT_LOAD_COLOR;
    }
}

impl LoadFlags {
    /// The default: scaled, hinted, bitmaps preferred
    pub const DEFAULT: LoadFlags = LoadFlags::empty();
}

bitflags::bitflags! {
    /// Properties of a face
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct FaceFlags: u32 {
        const SCALABLE = FT_FACE_FLAG_SCALABLE as u32;
        const FIXED_SIZES = FT_FACE_FLAG_FIXED_SIZES as u32;
        const FIXED_WIDTH = FT_FACE_FLAG_FIXED_WIDTH as u32;
        const SFNT = FT_FACE_FLAG_SFNT as u32;
        const HORIZONTAL = FT_FACE_FLAG_HORIZONTAL as u32;
        const VERTICAL = FT_FACE_FLAG_VERTICAL as u32;
        const KERNING = FT_FACE_FLAG_KERNING as u32;
        const FAST_GLYPHS = FT_FACE_FLAG_FAST_GLYPHS as u32;
        const MULTIPLE_MASTERS = FT_FACE_FLAG_MULTIPLE_MASTERS as u32;
        const GLYPH_NAMES = FT_FACE_FLAG_GLYPH_NAMES as u32;
        const EXTERNAL_STREAM = FT_FACE_FLAG_EXTERNAL_STREAM as u32;
        const HINTER = FT_FACE_FLAG_HINTER as u32;
        const CID_KEYED = FT_FACE_FLAG_CID_KEYED as u32;
        const TRICKY = FT_FACE_FLAG_TRICKY as u32;
        const COLOR = FT_FACE_FLAG_COLOR as u32;
    }
}

bitflags::bitflags! {
    /// Style of a face
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct StyleFlags: u32 {
        const ITALIC = FT_STYLE_FLAG_ITALIC as u32;
        const BOLD = FT_STYLE_FLAG_BOLD as u32;
    }
}

/// Define a C-like enum over a native constant type
///
/// Unlisted native values map to `Other(raw)`.
macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $raw:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[non_exhaustive]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// A value not known to this crate
            Other($raw),
        }

        impl $name {
            /// The native value
            pub fn to_raw(self) -> $raw {
                match self {
                    $( $name::$variant => $value as $raw, )*
                    $name::Other(raw) => raw,
                }
            }

            /// Construct from a native value
            #[allow(unreachable_patterns)]
            pub fn from_raw(raw: $raw) -> Self {
                match raw {
                    $( x if x == $value as $raw => $name::$variant, )*
                    raw => $name::Other(raw),
                }
            }
        }
    };
}

native_enum! {
    /// Character encoding of a [`CharMap`](crate::CharMap)
    pub enum Encoding: u32 {
        None = FT_ENCODING_NONE,
        MsSymbol = FT_ENCODING_MS_SYMBOL,
        Unicode = FT_ENCODING_UNICODE,
        Sjis = FT_ENCODING_SJIS,
        Gb2312 = FT_ENCODING_GB2312,
        Big5 = FT_ENCODING_BIG5,
        Wansung = FT_ENCODING_WANSUNG,
        Johab = FT_ENCODING_JOHAB,
        AdobeStandard = FT_ENCODING_ADOBE_STANDARD,
        AdobeExpert = FT_ENCODING_ADOBE_EXPERT,
        AdobeCustom = FT_ENCODING_ADOBE_CUSTOM,
        AdobeLatin1 = FT_ENCODING_ADOBE_LATIN_1,
        OldLatin2 = FT_ENCODING_OLD_LATIN_2,
        AppleRoman = FT_ENCODING_APPLE_ROMAN,
    }
}

native_enum! {
    /// Anti-aliasing mode used when rendering
    pub enum RenderMode: u32 {
        /// 8-bit anti-aliased
        Normal = FT_RENDER_MODE_NORMAL,
        /// Anti-aliased with light hinting
        Light = FT_RENDER_MODE_LIGHT,
        /// 1-bit monochrome
        Mono = FT_RENDER_MODE_MONO,
        /// Horizontal LCD subpixels
        Lcd = FT_RENDER_MODE_LCD,
        /// Vertical LCD subpixels
        LcdV = FT_RENDER_MODE_LCD_V,
        /// Signed distance field
        Sdf = FT_RENDER_MODE_SDF,
    }
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Normal
    }
}

native_enum! {
    /// Units of kerning vectors
    pub enum KerningMode: u32 {
        /// Scaled and grid-fitted (26.6)
        Default = FT_KERNING_DEFAULT,
        /// Scaled, not grid-fitted (26.6)
        Unfitted = FT_KERNING_UNFITTED,
        /// Font units
        Unscaled = FT_KERNING_UNSCALED,
    }
}

impl Default for KerningMode {
    fn default() -> Self {
        KerningMode::Default
    }
}

native_enum! {
    /// Units of a glyph control box
    ///
    /// `Unscaled` and `Subpixels` share a native value, so
    /// `from_raw(to_raw(Subpixels))` yields `Unscaled`.
    pub enum BBoxMode: u32 {
        /// Font units (glyph loaded with `NO_SCALE`)
        Unscaled = FT_GLYPH_BBOX_UNSCALED,
        /// 26.6 pixels
        Subpixels = FT_GLYPH_BBOX_SUBPIXELS,
        /// 26.6 pixels, grid-fitted
        Gridfit = FT_GLYPH_BBOX_GRIDFIT,
        /// Integer pixels, truncated
        Truncate = FT_GLYPH_BBOX_TRUNCATE,
        /// Integer pixels, grid-fitted
        Pixels = FT_GLYPH_BBOX_PIXELS,
    }
}

impl Default for BBoxMode {
    fn default() -> Self {
        BBoxMode::Pixels
    }
}

native_enum! {
    /// Format of a glyph image
    pub enum GlyphFormat: u32 {
        /// No image loaded
        None = FT_GLYPH_FORMAT_NONE,
        Composite = FT_GLYPH_FORMAT_COMPOSITE,
        Bitmap = FT_GLYPH_FORMAT_BITMAP,
        Outline = FT_GLYPH_FORMAT_OUTLINE,
        Plotter = FT_GLYPH_FORMAT_PLOTTER,
        Svg = FT_GLYPH_FORMAT_SVG,
    }
}

native_enum! {
    /// Pixel format of a [`Bitmap`](crate::Bitmap)
    pub enum PixelMode: u32 {
        None = FT_PIXEL_MODE_NONE,
        /// 1 bit per pixel, MSB first
        Mono = FT_PIXEL_MODE_MONO,
        /// 8 bits per pixel
        Gray = FT_PIXEL_MODE_GRAY,
        Gray2 = FT_PIXEL_MODE_GRAY2,
        Gray4 = FT_PIXEL_MODE_GRAY4,
        /// 8-bit RGB triples, width is three times the pixel width
        Lcd = FT_PIXEL_MODE_LCD,
        /// 8-bit RGB triples, rows is three times the pixel height
        LcdV = FT_PIXEL_MODE_LCD_V,
        /// 32-bit premultiplied BGRA
        Bgra = FT_PIXEL_MODE_BGRA,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enum_raw() {
        assert_eq!(Encoding::from_raw(FT_ENCODING_UNICODE), Encoding::Unicode);
        assert_eq!(Encoding::Unicode.to_raw(), 0x756e_6963); // 'unic'
        assert_eq!(Encoding::from_raw(7), Encoding::Other(7));
        assert_eq!(Encoding::Other(7).to_raw(), 7);

        assert_eq!(RenderMode::default().to_raw(), 0);
        assert_eq!(RenderMode::Mono.to_raw(), 2);
        assert_eq!(BBoxMode::default().to_raw(), 3);
        assert_eq!(BBoxMode::from_raw(0), BBoxMode::Unscaled);
        assert_eq!(GlyphFormat::from_raw(FT_GLYPH_FORMAT_BITMAP), GlyphFormat::Bitmap);
        assert_eq!(PixelMode::from_raw(2), PixelMode::Gray);
    }

    #[test]
    fn flag_bits() {
        assert_eq!(LoadFlags::DEFAULT.bits(), 0);
        assert_eq!((LoadFlags::RENDER | LoadFlags::MONOCHROME).bits(), 4 | 1 << 12);
        assert_eq!(FaceFlags::KERNING.bits(), 1 << 6);
        assert_eq!(StyleFlags::BOLD.bits(), 2);
    }
}
