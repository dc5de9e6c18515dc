//! World - soft-body solver orchestration
//!
//! The world owns every entity, constraint and collision, and advances them
//! one fixed `DT` per `update`:
//! - step/      - tick phases: reset, collide, solve, integrate
//! - commands/  - creation and cascade deletion
//! - init/      - construction and settings
//! - perf/      - timing and counters
//!
//! `facade` wraps the world for JavaScript.

use crate::core::error::Result;
use crate::core::math::Vec2;
use crate::domain::{
    AngularId, AngularSpringId, AngularState, Body, BodyId, CollisionKey, Entities, FixedSpringId,
    GearId, LineSegment, LinkId, MotorId, ObjectId, SegmentId, SolverConfig, SpringId, SpringParams,
    Store, Wheel, WheelId,
};
use crate::spatial::hash_grid::SpatialHashGrid;
use crate::systems::collision::{Collision, CollisionHandler};
use crate::systems::constraints::{
    AngularSpring, FixedSpring, GearConstraint, LinearSpring, MotorConstraint,
};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/step.rs"]
mod step;
#[path = "step/solve.rs"]
mod solve;
#[path = "step/integrate.rs"]
mod integrate;
#[path = "commands/commands.rs"]
mod commands;
#[path = "commands/delete.rs"]
mod delete;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
pub mod facade;

pub use facade::WasmWorld;
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

/// The simulation world
#[derive(Debug)]
pub struct World {
    config: SolverConfig,
    entities: Entities,
    linear_springs: Store<LinearSpring>,
    fixed_springs: Store<FixedSpring>,
    angular_springs: Store<AngularSpring>,
    motors: Store<MotorConstraint>,
    gears: Store<GearConstraint>,
    collisions: CollisionHandler,
    grid: SpatialHashGrid,

    // State
    next_id: u32,
    frame: u64,
    residual: f32,

    perf_stats: PerfStats,
}

impl Default for World {
    fn default() -> Self {
        init::create_world(SolverConfig::default())
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a validated config.
    pub fn with_config(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(init::create_world(config))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Swap the config live. Existing constraints keep their coefficients;
    /// new contacts and constraints pick up the new defaults.
    pub fn set_config(&mut self, config: SolverConfig) -> Result<()> {
        settings::set_config(self, config)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Largest `|impulse_error|` of the last tick's final pass.
    pub fn residual(&self) -> f32 {
        self.residual
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last step perf snapshot (zeros when perf disabled)
    pub fn perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        settings::set_gravity(self, gravity);
    }

    /// Advance the simulation by one fixed timestep.
    pub fn update(&mut self) {
        step::step(self);
    }

    /// Remove everything. Ids keep counting up.
    pub fn clear(&mut self) {
        commands::clear(self)
    }

    // === CREATION ===

    /// Static point: never moves, infinite mass.
    pub fn create_point(&mut self, position: Vec2) -> Result<BodyId> {
        commands::create_point(self, position)
    }

    pub fn create_linear_state(&mut self, position: Vec2, mass: f32) -> Result<BodyId> {
        commands::create_linear_state(self, position, mass)
    }

    /// Collidable circle; `mass <= 0` makes it static.
    pub fn create_particle(
        &mut self,
        position: Vec2,
        mass: f32,
        radius: f32,
        color: u32,
    ) -> Result<BodyId> {
        commands::create_particle(self, position, mass, radius, color)
    }

    pub fn create_angular_state(&mut self, angle: f32, inertia: f32) -> AngularId {
        commands::create_angular_state(self, angle, inertia)
    }

    /// Wheel around `center` with inertia `½·m·r²` from the center's mass.
    pub fn create_wheel(&mut self, center: BodyId, radius: f32) -> Result<WheelId> {
        commands::create_wheel(self, center, radius, None)
    }

    pub fn create_wheel_with_inertia(
        &mut self,
        center: BodyId,
        radius: f32,
        inertia: f32,
    ) -> Result<WheelId> {
        commands::create_wheel(self, center, radius, Some(inertia))
    }

    pub fn create_line_segment(&mut self, a: BodyId, b: BodyId, radius: f32) -> Result<SegmentId> {
        commands::create_line_segment(self, a, b, radius)
    }

    /// Spring with the default coefficients; `rest_length: None` keeps the
    /// current separation.
    pub fn create_linear_spring(
        &mut self,
        a: BodyId,
        b: BodyId,
        rest_length: Option<f32>,
    ) -> Result<SpringId> {
        let params = self.config.spring;
        commands::create_linear_spring(self, a, b, rest_length, params)
    }

    pub fn create_linear_spring_with(
        &mut self,
        a: BodyId,
        b: BodyId,
        rest_length: Option<f32>,
        params: SpringParams,
    ) -> Result<SpringId> {
        commands::create_linear_spring(self, a, b, rest_length, params)
    }

    /// Rigid attachment holding the current offset from `a` to `b`.
    pub fn create_fixed_spring(&mut self, a: BodyId, b: BodyId) -> Result<FixedSpringId> {
        let params = self.config.spring;
        commands::create_fixed_spring(self, a, b, None, params)
    }

    pub fn create_fixed_spring_with(
        &mut self,
        a: BodyId,
        b: BodyId,
        rest_offset: Option<Vec2>,
        params: SpringParams,
    ) -> Result<FixedSpringId> {
        commands::create_fixed_spring(self, a, b, rest_offset, params)
    }

    /// Angular spring holding the current angle between two links.
    pub fn create_angular_spring(
        &mut self,
        link_a: LinkId,
        link_b: LinkId,
    ) -> Result<AngularSpringId> {
        let params = self.config.spring;
        commands::create_angular_spring(self, link_a, link_b, None, params)
    }

    pub fn create_angular_spring_with(
        &mut self,
        link_a: LinkId,
        link_b: LinkId,
        rest_angle: Option<f32>,
        params: SpringParams,
    ) -> Result<AngularSpringId> {
        commands::create_angular_spring(self, link_a, link_b, rest_angle, params)
    }

    pub fn create_motor_constraint(
        &mut self,
        a: AngularId,
        b: AngularId,
        rest_velocity: f32,
    ) -> Result<MotorId> {
        commands::create_motor_constraint(self, a, b, rest_velocity)
    }

    pub fn create_gear_constraint(
        &mut self,
        a: AngularId,
        b: AngularId,
        gear_ratio: f32,
    ) -> Result<GearId> {
        commands::create_gear_constraint(self, a, b, gear_ratio)
    }

    // === DELETION ===
    // Unknown handles are a no-op returning false.

    /// Also removes every segment, spring, wheel and collision using the body.
    pub fn delete_body(&mut self, id: BodyId) -> bool {
        delete::delete_body(self, id)
    }

    /// Also removes motors, gears and wheels driven by the state.
    pub fn delete_angular_state(&mut self, id: AngularId) -> bool {
        delete::delete_angular_state(self, id)
    }

    /// Removes the wheel and its angular state; the center body stays.
    pub fn delete_wheel(&mut self, id: WheelId) -> bool {
        delete::delete_wheel(self, id)
    }

    pub fn delete_line_segment(&mut self, id: SegmentId) -> bool {
        delete::delete_line_segment(self, id)
    }

    pub fn delete_linear_spring(&mut self, id: SpringId) -> bool {
        delete::delete_link(self, LinkId::Linear(id))
    }

    pub fn delete_fixed_spring(&mut self, id: FixedSpringId) -> bool {
        delete::delete_link(self, LinkId::Fixed(id))
    }

    pub fn delete_angular_spring(&mut self, id: AngularSpringId) -> bool {
        delete::delete_angular_spring(self, id)
    }

    pub fn delete_motor_constraint(&mut self, id: MotorId) -> bool {
        delete::delete_motor_constraint(self, id)
    }

    pub fn delete_gear_constraint(&mut self, id: GearId) -> bool {
        delete::delete_gear_constraint(self, id)
    }

    /// Delete whatever object `id` names.
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        delete::delete_object(self, id)
    }

    // === HOST CONTROLS ===

    /// Teleport a body between ticks. Velocity is kept.
    pub fn set_body_position(&mut self, id: BodyId, position: Vec2) -> bool {
        settings::set_body_position(self, id, position)
    }

    pub fn set_body_velocity(&mut self, id: BodyId, velocity: Vec2) -> bool {
        settings::set_body_velocity(self, id, velocity)
    }

    pub fn set_angular_velocity(&mut self, id: AngularId, angular_velocity: f32) -> bool {
        settings::set_angular_velocity(self, id, angular_velocity)
    }

    pub fn set_spring_rest_length(&mut self, id: SpringId, rest_length: f32) -> bool {
        settings::set_spring_rest_length(self, id, rest_length)
    }

    pub fn set_angular_spring_rest_angle(&mut self, id: AngularSpringId, rest_angle: f32) -> bool {
        settings::set_angular_spring_rest_angle(self, id, rest_angle)
    }

    pub fn set_motor_velocity(&mut self, id: MotorId, rest_velocity: f32) -> bool {
        settings::set_motor_velocity(self, id, rest_velocity)
    }

    /// Change a gear ratio around the current angles (no jump).
    pub fn set_gear_ratio(&mut self, id: GearId, gear_ratio: f32) -> bool {
        settings::set_gear_ratio(self, id, gear_ratio)
    }

    // === ACCESSORS ===

    pub fn bodies(&self) -> &[Body] {
        self.entities.bodies.as_slice()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.entities.bodies.get(id.object_id())
    }

    pub fn particles(&self) -> impl Iterator<Item = &Body> + '_ {
        self.entities.bodies.iter().filter(|b| b.shape.is_some())
    }

    pub fn angular_states(&self) -> &[AngularState] {
        self.entities.angular.as_slice()
    }

    pub fn angular_state(&self, id: AngularId) -> Option<&AngularState> {
        self.entities.angular.get(id.object_id())
    }

    pub fn wheels(&self) -> &[Wheel] {
        self.entities.wheels.as_slice()
    }

    pub fn wheel(&self, id: WheelId) -> Option<&Wheel> {
        self.entities.wheels.get(id.object_id())
    }

    pub fn line_segments(&self) -> &[LineSegment] {
        self.entities.segments.as_slice()
    }

    pub fn line_segment(&self, id: SegmentId) -> Option<&LineSegment> {
        self.entities.segments.get(id.object_id())
    }

    pub fn linear_springs(&self) -> &[LinearSpring] {
        self.linear_springs.as_slice()
    }

    pub fn linear_spring(&self, id: SpringId) -> Option<&LinearSpring> {
        self.linear_springs.get(id.object_id())
    }

    pub fn fixed_springs(&self) -> &[FixedSpring] {
        self.fixed_springs.as_slice()
    }

    pub fn fixed_spring(&self, id: FixedSpringId) -> Option<&FixedSpring> {
        self.fixed_springs.get(id.object_id())
    }

    pub fn angular_springs(&self) -> &[AngularSpring] {
        self.angular_springs.as_slice()
    }

    pub fn angular_spring(&self, id: AngularSpringId) -> Option<&AngularSpring> {
        self.angular_springs.get(id.object_id())
    }

    pub fn motors(&self) -> &[MotorConstraint] {
        self.motors.as_slice()
    }

    pub fn motor(&self, id: MotorId) -> Option<&MotorConstraint> {
        self.motors.get(id.object_id())
    }

    pub fn gears(&self) -> &[GearConstraint] {
        self.gears.as_slice()
    }

    pub fn gear(&self, id: GearId) -> Option<&GearConstraint> {
        self.gears.get(id.object_id())
    }

    /// Active collisions in solve order.
    pub fn collisions(&self) -> impl Iterator<Item = &Collision> + '_ {
        self.collisions.iter()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    pub fn collision_between(
        &self,
        a: impl Into<ObjectId>,
        b: impl Into<ObjectId>,
    ) -> Option<&Collision> {
        self.collisions.get(CollisionKey::new(a.into(), b.into()))
    }

    /// Flat `[x0, y0, x1, y1, ..]` of every particle, for renderers.
    pub fn particle_positions(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.entities.bodies.len() * 2);
        for body in self.particles() {
            let p = body.position();
            out.push(p.x);
            out.push(p.y);
        }
        out
    }

    fn next_object_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    fn constraint_count(&self) -> usize {
        self.linear_springs.len()
            + self.fixed_springs.len()
            + self.angular_springs.len()
            + self.motors.len()
            + self.gears.len()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
