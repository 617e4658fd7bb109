// Test serialization using json
#![cfg(feature = "serde")]

use ft2::{BBox, Config, F16Dot16, F26Dot6, LoadFlags, RenderMode, ShutdownPolicy, Vector};
use serde::{de::Deserialize, ser::Serialize};
use std::cmp::PartialEq;
use std::fmt::Debug;

fn test<X: Debug + PartialEq + Serialize + for<'a> Deserialize<'a>>(x: X, t: &str) {
    match serde_json::to_string(&x) {
        Ok(text) => assert_eq!(text, t),
        Err(err) => panic!("Ser of '{x:?}' failed: {err}"),
    }

    match serde_json::from_str::<X>(t) {
        Ok(v) => assert_eq!(v, x),
        Err(err) => panic!("Deser of '{t}' failed: {err}"),
    }
}

#[test]
fn fixed() {
    test(F26Dot6(96), "96");
    test(F16Dot16(-0x8000), "-32768");
}

#[test]
fn geometry() {
    test(Vector::new(1, -2), "{\"x\":1,\"y\":-2}");
    test(
        BBox {
            x_min: 0,
            y_min: -3,
            x_max: 10,
            y_max: 12,
        },
        "{\"x_min\":0,\"y_min\":-3,\"x_max\":10,\"y_max\":12}",
    );
}

#[test]
fn modes() {
    test(RenderMode::Mono, "\"Mono\"");
    test(RenderMode::Other(9), "{\"Other\":9}");
    test(LoadFlags::NO_SCALE, "\"NO_SCALE\"");
}

#[test]
fn config() {
    test(
        Config::new(ShutdownPolicy::Immediate),
        "{\"shutdown\":\"Immediate\"}",
    );
}
