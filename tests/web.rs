//! Browser smoke tests: `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use softbody_engine::WasmWorld;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn facade_creates_and_steps() {
    softbody_engine::init();
    let mut world = WasmWorld::new();
    let a = world.create_particle(0.0, 0.0, 1.0, 5.0, 0xffffff);
    let b = world.create_particle(8.0, 0.0, 1.0, 5.0, 0xffffff);
    assert!(a != 0 && b != 0);
    assert_eq!(world.create_particle(0.0, 0.0, 1.0, -1.0, 0), 0);
    assert_eq!(world.create_point(f32::NAN, 0.0), 0);

    world.update();
    assert_eq!(world.collision_count(), 1);
    let positions = world.positions();
    assert_eq!(positions.len(), 4);
    assert!(positions[2] - positions[0] > 8.0);
}

#[wasm_bindgen_test]
fn facade_reports_perf_stats() {
    let mut world = WasmWorld::new();
    world.enable_perf_metrics(true);
    world.create_particle(0.0, 0.0, 1.0, 5.0, 0);
    world.update();
    let stats = world.get_perf_stats();
    assert_eq!(stats.body_count(), 1);
    assert!(stats.step_ms() >= 0.0);
}

#[wasm_bindgen_test]
fn facade_accepts_config_json() {
    let world = WasmWorld::from_config_json(r#"{"iterations": 3}"#);
    assert!(world.is_ok());
    assert!(WasmWorld::from_config_json(r#"{"iterations": 0}"#).is_err());
}
