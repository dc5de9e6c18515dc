//! Softbody Engine - 2D soft-body creature physics in WASM
//!
//! Sequential-impulse solver over particles, springs, wheels and motors,
//! stepped at a fixed 60 Hz.
//!
//! Architecture:
//! - core/        - math, constants, errors, logging, slot-access macros
//! - domain/      - entities, handles, stores, configuration
//! - spatial/     - broad-phase hash grid
//! - systems/     - constraints and collisions
//! - simulation/  - the world and its tick; JS facade

// Utils with safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod domain;
pub mod spatial;
pub mod systems;
pub mod simulation;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine: panic hook and console logging
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    core::logging::init_console_logger(log::LevelFilter::Info);
    web_sys::console::log_1(&"Softbody WASM engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use crate::core::error::SolverError;
pub use crate::core::math::Vec2;
pub use domain::{
    AngularId, AngularSpringId, BodyId, CollisionKey, ContactMaterial, FixedSpringId, GearId,
    LinkId, MotorId, MotorParams, ObjectId, SegmentId, SolverConfig, SpringId, SpringParams,
    WheelId,
};
pub use simulation::{PerfStats, WasmWorld, World};
pub use systems::collision::Collision;
