use wasm_bindgen::prelude::*;

/// Timings and counters of the last `update` (zeros while perf is disabled).
#[wasm_bindgen]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) broad_phase_ms: f64,
    pub(super) narrow_phase_ms: f64,
    pub(super) solve_ms: f64,
    pub(super) integrate_ms: f64,
    pub(super) candidate_pairs: u32,
    pub(super) active_collisions: u32,
    pub(super) collisions_created: u32,
    pub(super) collisions_destroyed: u32,
    pub(super) occupied_cells: u32,
    pub(super) constraint_count: u32,
    pub(super) body_count: u32,
    pub(super) iterations: u32,
    pub(super) residual: f32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn broad_phase_ms(&self) -> f64 { self.broad_phase_ms }
    #[wasm_bindgen(getter)]
    pub fn narrow_phase_ms(&self) -> f64 { self.narrow_phase_ms }
    #[wasm_bindgen(getter)]
    pub fn solve_ms(&self) -> f64 { self.solve_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn candidate_pairs(&self) -> u32 { self.candidate_pairs }
    #[wasm_bindgen(getter)]
    pub fn active_collisions(&self) -> u32 { self.active_collisions }
    #[wasm_bindgen(getter)]
    pub fn collisions_created(&self) -> u32 { self.collisions_created }
    #[wasm_bindgen(getter)]
    pub fn collisions_destroyed(&self) -> u32 { self.collisions_destroyed }
    #[wasm_bindgen(getter)]
    pub fn occupied_cells(&self) -> u32 { self.occupied_cells }
    #[wasm_bindgen(getter)]
    pub fn constraint_count(&self) -> u32 { self.constraint_count }
    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.body_count }
    #[wasm_bindgen(getter)]
    pub fn iterations(&self) -> u32 { self.iterations }
    /// Largest `|impulse_error|` of the final Gauss-Seidel pass
    #[wasm_bindgen(getter)]
    pub fn residual(&self) -> f32 { self.residual }
}
