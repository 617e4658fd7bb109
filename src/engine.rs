// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The engine handle
//!
//! An [`Engine`] wraps one native library instance. Construct one near
//! application start-up and pass it to [`Face`](crate::Face) constructors.
//! One engine per thread is recommended; `Engine` is neither `Send` nor
//! `Sync`.

use crate::error::{check, LifetimeError, Result};
use crate::face::{FaceEntry, FaceKey};
use crate::ffi::{self, FT_Int, FT_Library};
use crate::glyph::{GlyphEntry, GlyphKey};
use crate::handle::{release_all, Arena};
use std::cell::Cell;
use std::fmt;
use std::ptr;
use std::rc::Rc;

/// What [`Engine::shutdown`] does with objects still alive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShutdownPolicy {
    /// Release the native library once the last [`Face`](crate::Face) and
    /// [`Glyph`](crate::Glyph) created through this engine is dropped
    #[default]
    Deferred,
    /// Release every live face and glyph, then the native library
    ///
    /// Handles which outlive the shutdown report
    /// [`LifetimeError::EngineShutDown`].
    Immediate,
}

/// Engine configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub shutdown: ShutdownPolicy,
}

impl Config {
    /// Construct configuration
    pub fn new(shutdown: ShutdownPolicy) -> Self {
        Config { shutdown }
    }
}

pub(crate) struct EngineInner {
    library: Cell<FT_Library>,
    config: Config,
    pub(crate) faces: Arena<FaceKey, FaceEntry>,
    pub(crate) glyphs: Arena<GlyphKey, GlyphEntry>,
}

impl EngineInner {
    pub(crate) fn is_shut_down(&self) -> bool {
        self.library.get().is_null()
    }

    /// The native library, unless shut down
    pub(crate) fn library(&self) -> Result<FT_Library, LifetimeError> {
        let library = self.library.get();
        if library.is_null() {
            Err(LifetimeError::EngineShutDown)
        } else {
            Ok(library)
        }
    }

    /// Release everything: glyphs, faces, then the library
    fn close(&self) -> Result<()> {
        let library = self.library.replace(ptr::null_mut());
        if library.is_null() {
            return Ok(());
        }
        // Glyphs are allocated from the library's memory, faces are children
        // of the library: both must go first.
        let glyphs = release_all(&self.glyphs);
        let faces = release_all(&self.faces);
        // Safety: `library` came from FT_Init_FreeType and is released once,
        // since the cell now holds null.
        let done = check(unsafe { ffi::FT_Done_FreeType(library) });
        log::debug!("engine released");
        glyphs?;
        faces?;
        done?;
        Ok(())
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("engine release failed: {err}");
        }
    }
}

/// Handle to the native engine
///
/// Cloning is cheap and yields another handle to the same instance.
#[derive(Clone)]
pub struct Engine(Rc<EngineInner>);

impl Engine {
    /// Initialize the native engine with default configuration
    ///
    /// Failure here is the one unrecoverable error: no other operation is
    /// possible without an engine.
    pub fn init() -> Result<Engine> {
        Engine::with_config(Config::default())
    }

    /// Initialize the native engine
    pub fn with_config(config: Config) -> Result<Engine> {
        let mut library: FT_Library = ptr::null_mut();
        // Safety: FT_Init_FreeType writes a valid handle on success.
        check(unsafe { ffi::FT_Init_FreeType(&mut library) }).inspect_err(|err| {
            log::error!("engine initialization failed: {err}");
        })?;

        let engine = Engine(Rc::new(EngineInner {
            library: Cell::new(library),
            config,
            faces: Arena::default(),
            glyphs: Arena::default(),
        }));
        log::debug!("engine initialized: FreeType {}", engine.version()?);
        Ok(engine)
    }

    pub(crate) fn inner(&self) -> &EngineInner {
        &self.0
    }

    pub(crate) fn library(&self) -> Result<FT_Library, LifetimeError> {
        self.0.library()
    }

    /// Access configuration
    pub fn config(&self) -> &Config {
        &self.0.config
    }

    /// Version of the native engine: `(major, minor, patch)`
    pub fn version_triple(&self) -> Result<(i32, i32, i32)> {
        let library = self.library()?;
        let (mut major, mut minor, mut patch): (FT_Int, FT_Int, FT_Int) = (0, 0, 0);
        // Safety: library is live; the out-pointers are valid.
        unsafe { ffi::FT_Library_Version(library, &mut major, &mut minor, &mut patch) };
        Ok((major, minor, patch))
    }

    /// Version of the native engine, formatted `"major.minor.patch"`
    pub fn version(&self) -> Result<String> {
        let (major, minor, patch) = self.version_triple()?;
        Ok(format!("{major}.{minor}.{patch}"))
    }

    /// True once the native library has been released
    pub fn is_shut_down(&self) -> bool {
        self.0.is_shut_down()
    }

    /// Number of live faces owned through this engine
    pub fn num_faces(&self) -> usize {
        self.0.faces.len()
    }

    /// Number of live glyphs owned through this engine
    pub fn num_glyphs(&self) -> usize {
        self.0.glyphs.len()
    }

    /// Shut the engine down
    ///
    /// Under [`ShutdownPolicy::Deferred`] this only gives up this handle;
    /// the native library is released once nothing refers to it any more.
    /// Under [`ShutdownPolicy::Immediate`] every face and glyph is released
    /// now, followed by the library.
    pub fn shutdown(self) -> Result<()> {
        match self.0.config.shutdown {
            ShutdownPolicy::Deferred => {
                log::debug!(
                    "engine shutdown deferred: {} faces, {} glyphs alive",
                    self.num_faces(),
                    self.num_glyphs()
                );
                Ok(())
            }
            ShutdownPolicy::Immediate => self.0.close(),
        }
    }
}

impl PartialEq for Engine {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.0.config)
            .field("shut_down", &self.is_shut_down())
            .field("faces", &self.num_faces())
            .field("glyphs", &self.num_glyphs())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        let engine = Engine::init().unwrap();
        let (major, minor, _) = engine.version_triple().unwrap();
        assert_eq!(major, 2);
        assert!(minor >= 0);

        let version = engine.version().unwrap();
        assert_eq!(version.split('.').count(), 3);
        assert!(version.starts_with("2."));
    }

    #[test]
    fn immediate_shutdown() {
        let engine = Engine::with_config(Config::new(ShutdownPolicy::Immediate)).unwrap();
        let other = engine.clone();
        assert!(!other.is_shut_down());
        engine.shutdown().unwrap();
        assert!(other.is_shut_down());
        assert!(matches!(
            other.version(),
            Err(crate::Error::Lifetime(LifetimeError::EngineShutDown))
        ));
        // A second shutdown is a no-op
        other.shutdown().unwrap();
    }

    #[test]
    fn deferred_shutdown() {
        let engine = Engine::init().unwrap();
        let other = engine.clone();
        engine.shutdown().unwrap();
        assert!(!other.is_shut_down());
        assert!(other.version().is_ok());
    }
}
