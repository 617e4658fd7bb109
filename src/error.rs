// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Error types
//!
//! Failures are split by cause:
//!
//! -   [`EngineError`]: a native call returned a non-zero status
//! -   [`UsageError`]: the caller passed something the binding cannot use
//! -   [`LifetimeError`]: a handle or view outlived the object it refers to
//!
//! All three convert into [`Error`] so that `?` works uniformly.

use crate::ffi::FT_Error;
use std::borrow::Cow;
use thiserror::Error;

/// Result type with [`Error`] as the default error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error produced by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Lifetime(#[from] LifetimeError),
}

impl Error {
    /// Native status code, if this is an [`EngineError`]
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Engine(err) => Some(err.code()),
            _ => None,
        }
    }
}

impl From<easy_cast::Error> for Error {
    fn from(err: easy_cast::Error) -> Self {
        Error::Usage(err.into())
    }
}

/// A native call failed
///
/// Displays as the engine's own description of `code`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    code: i32,
    message: Cow<'static, str>,
}

impl EngineError {
    /// Construct from a native status code
    pub fn new(code: i32) -> Self {
        let message = match describe(code) {
            Some(msg) => Cow::Borrowed(msg),
            None => Cow::Owned(format!("Unknown error {code}")),
        };
        EngineError { code, message }
    }

    /// The native status code
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid input or an operation which does not apply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A glyph was accessed as a kind it is not
    #[error("glyph is not in {expected} format")]
    WrongKind { expected: &'static str },
    /// The glyph slot holds no glyph image
    #[error("glyph slot is empty")]
    SlotEmpty,
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    /// A string argument contains a NUL byte
    #[error("string contains an interior NUL byte")]
    InteriorNul,
    /// A path could not be passed to the engine
    #[error("path is not representable as a C string")]
    InvalidPath,
    /// A numeric value does not fit the engine's representation
    #[error("numeric value out of range")]
    Conversion,
    /// A [`CharMap`](crate::CharMap) was passed to a face it does not belong to
    #[error("charmap belongs to a different face")]
    ForeignCharMap,
}

impl From<easy_cast::Error> for UsageError {
    fn from(_: easy_cast::Error) -> Self {
        UsageError::Conversion
    }
}

impl From<std::ffi::NulError> for UsageError {
    fn from(_: std::ffi::NulError) -> Self {
        UsageError::InteriorNul
    }
}

impl From<std::ffi::NulError> for Error {
    fn from(err: std::ffi::NulError) -> Self {
        Error::Usage(err.into())
    }
}

/// A handle or view was used after its object went away
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeError {
    /// The owning handle was already released
    #[error("object has already been released")]
    Released,
    /// The face or glyph this view borrows from has been released
    #[error("owner of this view has been released")]
    OwnerReleased,
    /// The owner's contents changed since this view was taken
    #[error("view is stale: its owner was reloaded or converted")]
    Stale,
    /// The engine was shut down with [`ShutdownPolicy::Immediate`](crate::ShutdownPolicy::Immediate)
    #[error("engine has been shut down")]
    EngineShutDown,
}

/// Convert a native status into a `Result`
#[inline]
pub(crate) fn check(code: FT_Error) -> Result<(), EngineError> {
    if code == 0 {
        Ok(())
    } else {
        Err(EngineError::new(code))
    }
}

/// Look up the description of a native status code
pub fn describe(code: i32) -> Option<&'static str> {
    MESSAGES
        .binary_search_by_key(&code, |&(c, _)| c)
        .ok()
        .map(|i| MESSAGES[i].1)
}

// Sorted by code.
static MESSAGES: &[(i32, &str)] = &[
    (0x00, "no error"),
    (0x01, "cannot open resource"),
    (0x02, "unknown file format"),
    (0x03, "broken file"),
    (0x04, "invalid FreeType version"),
    (0x05, "module version is too low"),
    (0x06, "invalid argument"),
    (0x07, "unimplemented feature"),
    (0x08, "broken table"),
    (0x09, "broken offset within table"),
    (0x0A, "array allocation size too large"),
    (0x0B, "missing module"),
    (0x0C, "missing property"),
    (0x10, "invalid glyph index"),
    (0x11, "invalid character code"),
    (0x12, "unsupported glyph image format"),
    (0x13, "cannot render this glyph format"),
    (0x14, "invalid outline"),
    (0x15, "invalid composite glyph"),
    (0x16, "too many hints"),
    (0x17, "invalid pixel size"),
    (0x18, "invalid SVG document"),
    (0x20, "invalid object handle"),
    (0x21, "invalid library handle"),
    (0x22, "invalid module handle"),
    (0x23, "invalid face handle"),
    (0x24, "invalid size handle"),
    (0x25, "invalid glyph slot handle"),
    (0x26, "invalid charmap handle"),
    (0x27, "invalid cache manager handle"),
    (0x28, "invalid stream handle"),
    (0x30, "too many modules"),
    (0x31, "too many extensions"),
    (0x40, "out of memory"),
    (0x41, "unlisted object"),
    (0x51, "cannot open stream"),
    (0x52, "invalid stream seek"),
    (0x53, "invalid stream skip"),
    (0x54, "invalid stream read"),
    (0x55, "invalid stream operation"),
    (0x56, "invalid frame operation"),
    (0x57, "nested frame access"),
    (0x58, "invalid frame read"),
    (0x60, "raster uninitialized"),
    (0x61, "raster corrupted"),
    (0x62, "raster overflow"),
    (0x63, "negative height while rastering"),
    (0x70, "too many registered caches"),
    (0x80, "invalid opcode"),
    (0x81, "too few arguments"),
    (0x82, "stack overflow"),
    (0x83, "code overflow"),
    (0x84, "bad argument"),
    (0x85, "division by zero"),
    (0x86, "invalid reference"),
    (0x87, "found debug opcode"),
    (0x88, "found ENDF opcode in execution stream"),
    (0x89, "nested DEFS"),
    (0x8A, "invalid code range"),
    (0x8B, "execution context too long"),
    (0x8C, "too many function definitions"),
    (0x8D, "too many instruction definitions"),
    (0x8E, "SFNT font table missing"),
    (0x8F, "horizontal header (hhea) table missing"),
    (0x90, "locations (loca) table missing"),
    (0x91, "name table missing"),
    (0x92, "character map (cmap) table missing"),
    (0x93, "horizontal metrics (hmtx) table missing"),
    (0x94, "PostScript (post) table missing"),
    (0x95, "invalid horizontal metrics"),
    (0x96, "invalid character map (cmap) format"),
    (0x97, "invalid ppem value"),
    (0x98, "invalid vertical metrics"),
    (0x99, "could not find context"),
    (0x9A, "invalid PostScript (post) table format"),
    (0x9B, "invalid PostScript (post) table"),
    (0x9C, "found FDEF or IDEF opcode in glyf bytecode"),
    (0x9D, "missing bitmap in strike"),
    (0x9E, "SVG hooks have not been set"),
    (0xA0, "opcode syntax error"),
    (0xA1, "argument stack underflow"),
    (0xA2, "ignore"),
    (0xA3, "no Unicode glyph name found"),
    (0xA4, "glyph too big for hinting"),
    (0xB0, "`STARTFONT' field missing"),
    (0xB1, "`FONT' field missing"),
    (0xB2, "`SIZE' field missing"),
    (0xB3, "`FONTBOUNDINGBOX' field missing"),
    (0xB4, "`CHARS' field missing"),
    (0xB5, "`STARTCHAR' field missing"),
    (0xB6, "`ENCODING' field missing"),
    (0xB7, "`BBX' field missing"),
    (0xB8, "`BBX' too big"),
    (0xB9, "Font header corrupted or missing fields"),
    (0xBA, "Font glyphs corrupted or missing fields"),
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(MESSAGES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn known_codes() {
        assert_eq!(describe(0), Some("no error"));
        assert_eq!(describe(0x01), Some("cannot open resource"));
        assert_eq!(describe(0x06), Some("invalid argument"));
        assert_eq!(describe(0x10), Some("invalid glyph index"));

        let err = EngineError::new(0x02);
        assert_eq!(err.code(), 2);
        assert_eq!(err.to_string(), "unknown file format");
    }

    #[test]
    fn unknown_code() {
        assert_eq!(describe(0x0D), None);
        let err = EngineError::new(0x1234);
        assert_eq!(err.message(), "Unknown error 4660");
        assert_eq!(err.to_string(), "Unknown error 4660");
    }

    #[test]
    fn check_status() {
        assert!(check(0).is_ok());
        let err = check(0x17).unwrap_err();
        assert_eq!(err.code(), 0x17);
        assert_eq!(err.message(), "invalid pixel size");
    }

    #[test]
    fn unified() {
        let err: Error = EngineError::new(0x40).into();
        assert_eq!(err.code(), Some(0x40));
        assert_eq!(err.to_string(), "out of memory");

        let err: Error = LifetimeError::Stale.into();
        assert_eq!(err.code(), None);
        assert!(matches!(err, Error::Lifetime(LifetimeError::Stale)));
    }
}
