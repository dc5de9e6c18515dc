use wasm_bindgen::prelude::*;

use crate::core::math::Vec2;
use crate::domain::{
    AngularId, AngularSpringId, BodyId, FixedSpringId, GearId, LinkId, MotorId, ObjectId,
    SolverConfig, SpringId,
};

use super::perf_stats::PerfStats;
use super::World;

/// JavaScript handle on a [`World`]. Objects are addressed by raw `u32` ids;
/// creation returns 0 on failure, deletion and setters return `false`.
#[wasm_bindgen(js_name = World)]
pub struct WasmWorld {
    core: World,
}

impl Default for WasmWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn body(raw: u32) -> BodyId {
    BodyId::from_object_id(ObjectId(raw))
}

fn angular(raw: u32) -> AngularId {
    AngularId::from_object_id(ObjectId(raw))
}

fn raw_or_zero<T: Into<ObjectId>, E>(result: Result<T, E>) -> u32 {
    result.map_or(0, |id| id.into().raw())
}

#[wasm_bindgen(js_class = World)]
impl WasmWorld {
    /// Create an empty world with default solver settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { core: World::new() }
    }

    /// Create a world from a JSON `SolverConfig` (missing fields take defaults)
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Result<WasmWorld, JsValue> {
        let config = SolverConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let core = World::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { core })
    }

    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> String {
        self.core.config().to_json()
    }

    #[wasm_bindgen(js_name = setConfigJson)]
    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config = SolverConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.core.set_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    #[wasm_bindgen(getter)]
    pub fn residual(&self) -> f32 { self.core.residual() }

    #[wasm_bindgen(getter)]
    pub fn collision_count(&self) -> u32 { self.core.collision_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.core.bodies().len() as u32 }

    /// Advance one fixed timestep
    pub fn update(&mut self) {
        self.core.update();
    }

    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.perf_stats()
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(Vec2::new(x, y));
    }

    // === CREATION ===

    pub fn create_point(&mut self, x: f32, y: f32) -> u32 {
        raw_or_zero(self.core.create_point(Vec2::new(x, y)))
    }

    pub fn create_linear_state(&mut self, x: f32, y: f32, mass: f32) -> u32 {
        raw_or_zero(self.core.create_linear_state(Vec2::new(x, y), mass))
    }

    pub fn create_particle(&mut self, x: f32, y: f32, mass: f32, radius: f32, color: u32) -> u32 {
        raw_or_zero(self.core.create_particle(Vec2::new(x, y), mass, radius, color))
    }

    pub fn create_angular_state(&mut self, angle: f32, inertia: f32) -> u32 {
        self.core.create_angular_state(angle, inertia).object_id().raw()
    }

    pub fn create_wheel(&mut self, center: u32, radius: f32) -> u32 {
        raw_or_zero(self.core.create_wheel(body(center), radius))
    }

    /// Angular state driving a wheel (0 when `wheel` is unknown)
    pub fn wheel_angular_state(&self, wheel: u32) -> u32 {
        self.core
            .wheels()
            .iter()
            .find(|w| w.id.raw() == wheel)
            .map_or(0, |w| w.angular.object_id().raw())
    }

    pub fn create_line_segment(&mut self, a: u32, b: u32, radius: f32) -> u32 {
        raw_or_zero(self.core.create_line_segment(body(a), body(b), radius))
    }

    /// Spring at the current separation
    pub fn create_linear_spring(&mut self, a: u32, b: u32) -> u32 {
        raw_or_zero(self.core.create_linear_spring(body(a), body(b), None))
    }

    pub fn create_linear_spring_with_length(&mut self, a: u32, b: u32, rest_length: f32) -> u32 {
        raw_or_zero(self.core.create_linear_spring(body(a), body(b), Some(rest_length)))
    }

    pub fn create_fixed_spring(&mut self, a: u32, b: u32) -> u32 {
        raw_or_zero(self.core.create_fixed_spring(body(a), body(b)))
    }

    /// Angular spring between two linear or fixed springs
    pub fn create_angular_spring(&mut self, link_a: u32, link_b: u32) -> u32 {
        let (Some(a), Some(b)) = (self.link(link_a), self.link(link_b)) else {
            return 0;
        };
        raw_or_zero(self.core.create_angular_spring(a, b))
    }

    pub fn create_motor_constraint(&mut self, a: u32, b: u32, rest_velocity: f32) -> u32 {
        raw_or_zero(self.core.create_motor_constraint(angular(a), angular(b), rest_velocity))
    }

    pub fn create_gear_constraint(&mut self, a: u32, b: u32, gear_ratio: f32) -> u32 {
        raw_or_zero(self.core.create_gear_constraint(angular(a), angular(b), gear_ratio))
    }

    // === DELETION / CONTROL ===

    /// Delete any object by id, cascading to everything that uses it
    pub fn delete(&mut self, id: u32) -> bool {
        self.core.delete_object(ObjectId(id))
    }

    pub fn set_body_position(&mut self, id: u32, x: f32, y: f32) -> bool {
        self.core.set_body_position(body(id), Vec2::new(x, y))
    }

    pub fn set_body_velocity(&mut self, id: u32, vx: f32, vy: f32) -> bool {
        self.core.set_body_velocity(body(id), Vec2::new(vx, vy))
    }

    pub fn set_spring_rest_length(&mut self, id: u32, rest_length: f32) -> bool {
        self.core
            .set_spring_rest_length(SpringId::from_object_id(ObjectId(id)), rest_length)
    }

    pub fn set_angular_spring_rest_angle(&mut self, id: u32, rest_angle: f32) -> bool {
        let spring = AngularSpringId::from_object_id(ObjectId(id));
        self.core.set_angular_spring_rest_angle(spring, rest_angle)
    }

    pub fn set_motor_velocity(&mut self, id: u32, rest_velocity: f32) -> bool {
        self.core.set_motor_velocity(MotorId::from_object_id(ObjectId(id)), rest_velocity)
    }

    pub fn set_gear_ratio(&mut self, id: u32, gear_ratio: f32) -> bool {
        self.core.set_gear_ratio(GearId::from_object_id(ObjectId(id)), gear_ratio)
    }

    // === READ-BACK ===

    /// Flat `[x0, y0, x1, y1, ..]` of every particle
    pub fn positions(&self) -> Vec<f32> {
        self.core.particle_positions()
    }

    /// Particle colors in the same order as `positions`
    pub fn colors(&self) -> Vec<u32> {
        self.core.particles().filter_map(|p| p.color()).collect()
    }

    /// Flat `[ax, ay, bx, by, ..]` of every line segment
    pub fn segment_endpoints(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.core.line_segments().len() * 4);
        for segment in self.core.line_segments() {
            if let (Some(a), Some(b)) = (self.core.body(segment.a), self.core.body(segment.b)) {
                let (a, b) = (a.position(), b.position());
                out.extend_from_slice(&[a.x, a.y, b.x, b.y]);
            }
        }
        out
    }

    pub fn body_position(&self, id: u32) -> Vec<f32> {
        self.core
            .body(body(id))
            .map_or_else(Vec::new, |b| vec![b.position().x, b.position().y])
    }

    /// Angle of an angular state (NaN when unknown)
    pub fn angle(&self, id: u32) -> f32 {
        self.core.angular_state(angular(id)).map_or(f32::NAN, |s| s.angle)
    }
}

impl WasmWorld {
    pub fn core(&self) -> &World {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut World {
        &mut self.core
    }

    fn link(&self, raw: u32) -> Option<LinkId> {
        let spring = SpringId::from_object_id(ObjectId(raw));
        if self.core.linear_spring(spring).is_some() {
            return Some(LinkId::Linear(spring));
        }
        let fixed = FixedSpringId::from_object_id(ObjectId(raw));
        self.core.fixed_spring(fixed).map(|_| LinkId::Fixed(fixed))
    }
}
