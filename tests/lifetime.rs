// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Handle and view lifetimes

use ft2::*;
use std::path::PathBuf;

fn open(engine: &Engine) -> Face {
    let _ = env_logger::builder().is_test(true).try_init();
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/DejaVuSans.ttf");
    let mut face = Face::open(engine, path).unwrap();
    face.set_pixel_sizes(0, 16).unwrap();
    face
}

const OWNER_RELEASED: Error = Error::Lifetime(LifetimeError::OwnerReleased);
const SHUT_DOWN: Error = Error::Lifetime(LifetimeError::EngineShutDown);

#[test]
fn views_after_close() {
    let engine = Engine::init().unwrap();
    let mut face = open(&engine);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let slot = face.glyph().unwrap().unwrap();
    let size = face.size().unwrap().unwrap();
    let charmap = face.charmap().unwrap().unwrap();
    let chars = face.chars().unwrap();
    let outline = slot.outline().unwrap();

    face.close().unwrap();
    assert_eq!(engine.num_faces(), 0);
    assert_eq!(slot.metrics().unwrap_err(), OWNER_RELEASED);
    assert_eq!(slot.bitmap().unwrap_err(), OWNER_RELEASED);
    assert_eq!(size.metrics().unwrap_err(), OWNER_RELEASED);
    assert_eq!(charmap.encoding().unwrap_err(), OWNER_RELEASED);
    assert_eq!(outline.points().unwrap_err(), OWNER_RELEASED);

    // The iterator reports the error once, then ends
    let items: Vec<_> = chars.collect();
    assert_eq!(items, vec![Err(OWNER_RELEASED)]);
}

#[test]
fn glyph_outlives_face() {
    let engine = Engine::init().unwrap();
    let mut face = open(&engine);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let mut glyph = face.glyph().unwrap().unwrap().glyph().unwrap();
    let cbox = glyph.cbox(BBoxMode::Pixels).unwrap();
    face.close().unwrap();
    assert_eq!(engine.num_faces(), 0);

    assert_eq!(glyph.cbox(BBoxMode::Pixels).unwrap(), cbox);
    glyph.to_bitmap(RenderMode::Normal, None, true).unwrap();
    let bitmap = glyph.as_bitmap().unwrap().bitmap().unwrap();
    assert!(bitmap.rows().unwrap() > 0);

    glyph.release().unwrap();
    assert_eq!(engine.num_glyphs(), 0);
    assert_eq!(bitmap.rows().unwrap_err(), OWNER_RELEASED);
}

#[test]
fn stale_after_reload() {
    let engine = Engine::init().unwrap();
    let mut face = open(&engine);
    face.load_char('A' as u32, LoadFlags::RENDER).unwrap();
    let slot = face.glyph().unwrap().unwrap();
    let bitmap = slot.bitmap().unwrap();
    let metrics = slot.metrics().unwrap();
    let rows = bitmap.rows().unwrap();
    assert!(rows > 0);

    face.load_char('.' as u32, LoadFlags::RENDER).unwrap();
    let stale = Error::Lifetime(LifetimeError::Stale);
    assert_eq!(bitmap.rows().unwrap_err(), stale);
    assert_eq!(bitmap.buffer().unwrap_err(), stale);

    // Snapshots and the slot itself are unaffected
    assert!(metrics.height > 0);
    let fresh = slot.bitmap().unwrap();
    assert!(fresh.rows().unwrap() < rows);
}

#[test]
fn stale_after_render() {
    let engine = Engine::init().unwrap();
    let mut face = open(&engine);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let mut slot = face.glyph().unwrap().unwrap();
    let outline = slot.outline().unwrap();
    assert!(outline.n_points().unwrap() > 0);

    slot.render(RenderMode::Normal).unwrap();
    assert_eq!(outline.n_points().unwrap_err(), Error::Lifetime(LifetimeError::Stale));
    assert!(matches!(
        slot.outline(),
        Err(Error::Usage(UsageError::WrongKind { .. }))
    ));
}

#[test]
fn immediate_shutdown() {
    let engine = Engine::with_config(Config::new(ShutdownPolicy::Immediate)).unwrap();
    let mut face = open(&engine);
    face.load_char('A' as u32, LoadFlags::DEFAULT).unwrap();
    let slot = face.glyph().unwrap().unwrap();
    let glyph = slot.glyph().unwrap();

    engine.clone().shutdown().unwrap();
    assert!(engine.is_shut_down());
    assert_eq!(engine.num_faces(), 0);
    assert_eq!(engine.num_glyphs(), 0);

    assert!(!face.is_alive());
    assert!(!glyph.is_alive());
    assert_eq!(face.num_glyphs().unwrap_err(), SHUT_DOWN);
    assert_eq!(slot.metrics().unwrap_err(), SHUT_DOWN);
    assert_eq!(glyph.format().unwrap_err(), SHUT_DOWN);
    assert_eq!(
        Face::from_memory(&engine, vec![0u8; 16]).unwrap_err(),
        SHUT_DOWN
    );

    // Releasing after shutdown reports the shutdown rather than freeing twice
    assert_eq!(glyph.release().unwrap_err(), SHUT_DOWN);
    assert_eq!(face.close().unwrap_err(), SHUT_DOWN);
}

#[test]
fn deferred_shutdown() {
    let engine = Engine::init().unwrap();
    let face = open(&engine);
    engine.clone().shutdown().unwrap();
    assert!(!engine.is_shut_down());

    // The face keeps the engine alive
    drop(engine);
    assert_eq!(face.family_name().unwrap().as_deref(), Some("DejaVu Sans"));
    assert_eq!(face.engine().num_faces(), 1);
}
