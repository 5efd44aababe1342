//=========================================================================
// Physics World
//=========================================================================
//
// 2D rigid-body world backed by rapier2d.
//
// The engine steps the world exactly once per frame with a fixed timestep
// and fixed solver iteration counts, independent of the measured frame
// time, before any entity reads physics state in that frame.
//
// Architecture:
// ```text
//   Entity::init ──create_body()──→ RigidBodySet + ColliderSet
//                                        │
//   Engine ──────step()──────────→ PhysicsPipeline
//                                        │ ChannelEventCollector
//                                        ↓ (crossbeam)
//                                  ContactListener::begin/end_contact
// ```
//
// Contact events are buffered by rapier during the step and delivered to
// the installed listener right after it, on the frame thread.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::num::NonZeroUsize;

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, info, trace, warn};
use rapier2d::prelude::*;

//=== Internal Dependencies ===============================================

use crate::config::PhysicsConfig;

//=== StepConfig ==========================================================

/// Fixed step parameters, applied identically every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    /// Step duration in seconds.
    pub timestep: f32,

    /// Constraint solver iterations.
    pub velocity_iterations: usize,

    /// Position stabilization iterations.
    pub position_iterations: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            velocity_iterations: 6,
            position_iterations: 2,
        }
    }
}

impl From<&PhysicsConfig> for StepConfig {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            timestep: config.timestep,
            velocity_iterations: config.velocity_iterations,
            position_iterations: config.position_iterations,
        }
    }
}

//=== Body Description ====================================================

/// Opaque handle to a body owned by the [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Moved by forces, gravity and contacts.
    Dynamic,
    /// Never moves (ground, walls).
    Static,
    /// Moved only by its velocity, unaffected by contacts.
    Kinematic,
}

/// Collision shape attached to a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid { half_width: f32, half_height: f32 },
    Ball { radius: f32 },
}

/// Parameters for [`PhysicsWorld::create_body`].
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: [f32; 2],
    pub rotation: f32,
    pub linear_velocity: [f32; 2],
    pub shape: Shape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Sensors report contacts but generate no contact forces.
    pub sensor: bool,
}

impl BodyDesc {
    fn with_kind(kind: BodyKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: [x, y],
            rotation: 0.0,
            linear_velocity: [0.0, 0.0],
            shape: Shape::Cuboid {
                half_width: 0.5,
                half_height: 0.5,
            },
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            sensor: false,
        }
    }

    pub fn dynamic(x: f32, y: f32) -> Self {
        Self::with_kind(BodyKind::Dynamic, x, y)
    }

    pub fn fixed(x: f32, y: f32) -> Self {
        Self::with_kind(BodyKind::Static, x, y)
    }

    pub fn kinematic(x: f32, y: f32) -> Self {
        Self::with_kind(BodyKind::Kinematic, x, y)
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.linear_velocity = [vx, vy];
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

//=== Contacts ============================================================

/// A pair of bodies that started or stopped touching.
///
/// A side is `None` when its body was removed before the event was
/// delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub body_a: Option<BodyHandle>,
    pub body_b: Option<BodyHandle>,
    pub sensor: bool,
}

impl Contact {
    /// Returns `true` if `body` is either side of the contact.
    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == Some(body) || self.body_b == Some(body)
    }
}

/// Receives contact notifications after every physics step.
pub trait ContactListener {
    fn begin_contact(&mut self, contact: &Contact);
    fn end_contact(&mut self, contact: &Contact);
}

/// Default listener: traces every contact.
#[derive(Debug, Default)]
pub struct LoggingContactListener;

impl ContactListener for LoggingContactListener {
    fn begin_contact(&mut self, contact: &Contact) {
        trace!(target: "physics", "Begin contact {:?} <-> {:?}", contact.body_a, contact.body_b);
    }

    fn end_contact(&mut self, contact: &Contact) {
        trace!(target: "physics", "End contact {:?} <-> {:?}", contact.body_a, contact.body_b);
    }
}

//=== PhysicsWorld ========================================================

/// Owns every rigid body and collider created by entities.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    event_collector: ChannelEventCollector,
    collision_events: Receiver<CollisionEvent>,
    contact_force_events: Receiver<ContactForceEvent>,
    contact_listener: Option<Box<dyn ContactListener>>,
    steps: u64,
}

impl PhysicsWorld {
    //--- Construction -----------------------------------------------------

    /// Creates an empty world with the given gravity (m/s²).
    pub fn new(gravity: [f32; 2]) -> Self {
        let (collision_tx, collision_events) = unbounded();
        let (force_tx, contact_force_events) = unbounded();

        info!(target: "physics", "Physics world created, gravity = {:?}", gravity);

        Self {
            gravity: vector![gravity[0], gravity[1]],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            event_collector: ChannelEventCollector::new(collision_tx, force_tx),
            collision_events,
            contact_force_events,
            contact_listener: None,
            steps: 0,
        }
    }

    //--- Simulation -------------------------------------------------------

    /// Advances the world by one fixed step and delivers contact events.
    pub fn step(&mut self, config: &StepConfig) {
        self.integration_parameters.dt = config.timestep;
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        self.integration_parameters.num_internal_stabilization_iterations =
            config.position_iterations;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.event_collector,
        );
        self.steps += 1;

        self.dispatch_contacts();
    }

    fn dispatch_contacts(&mut self) {
        while let Ok(event) = self.collision_events.try_recv() {
            let contact = Contact {
                body_a: self.body_of_collider(event.collider1()),
                body_b: self.body_of_collider(event.collider2()),
                sensor: event.sensor(),
            };

            match self.contact_listener.as_mut() {
                Some(listener) if event.started() => listener.begin_contact(&contact),
                Some(listener) => listener.end_contact(&contact),
                None => {}
            }
        }

        // Force events are never requested; drain so the channel stays empty.
        while self.contact_force_events.try_recv().is_ok() {}
    }

    fn body_of_collider(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        self.colliders
            .get(collider)
            .and_then(|c| c.parent())
            .map(BodyHandle)
    }

    /// Number of steps taken since creation.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn gravity(&self) -> [f32; 2] {
        [self.gravity.x, self.gravity.y]
    }

    pub fn set_gravity(&mut self, gravity: [f32; 2]) {
        self.gravity = vector![gravity[0], gravity[1]];
    }

    //--- Contact Listener -------------------------------------------------

    /// Installs the contact listener, replacing any previous one.
    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        if self.contact_listener.replace(listener).is_some() {
            debug!(target: "physics", "Contact listener replaced");
        }
    }

    /// Removes and returns the installed listener.
    pub fn take_contact_listener(&mut self) -> Option<Box<dyn ContactListener>> {
        self.contact_listener.take()
    }

    pub fn has_contact_listener(&self) -> bool {
        self.contact_listener.is_some()
    }

    //--- Bodies -----------------------------------------------------------

    /// Creates a body with one collider and returns its handle.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let body_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        };

        let body = RigidBodyBuilder::new(body_type)
            .translation(vector![desc.position[0], desc.position[1]])
            .rotation(desc.rotation)
            .linvel(vector![desc.linear_velocity[0], desc.linear_velocity[1]])
            .build();
        let handle = self.bodies.insert(body);

        let collider = match desc.shape {
            Shape::Cuboid { half_width, half_height } => ColliderBuilder::cuboid(half_width, half_height),
            Shape::Ball { radius } => ColliderBuilder::ball(radius),
        }
        .density(desc.density)
        .friction(desc.friction)
        .restitution(desc.restitution)
        .sensor(desc.sensor)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        trace!(target: "physics", "Created {:?} body {:?}", desc.kind, handle);
        BodyHandle(handle)
    }

    /// Removes a body and its colliders. Returns `false` if it was unknown.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self
            .bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some();

        if !removed {
            warn!(target: "physics", "Attempted to remove unknown body {:?}", handle);
        }
        removed
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn body_position(&self, handle: BodyHandle) -> Option<[f32; 2]> {
        self.bodies.get(handle.0).map(|b| {
            let t = b.translation();
            [t.x, t.y]
        })
    }

    pub fn body_rotation(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(handle.0).map(|b| b.rotation().angle())
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<[f32; 2]> {
        self.bodies.get(handle.0).map(|b| {
            let v = b.linvel();
            [v.x, v.y]
        })
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: [f32; 2]) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_translation(vector![position[0], position[1]], true);
        }
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: [f32; 2]) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.set_linvel(vector![velocity[0], velocity[1]], true);
        }
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: [f32; 2]) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.apply_impulse(vector![impulse[0], impulse[1]], true);
        }
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("gravity", &self.gravity())
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .field("steps", &self.steps)
            .field("contact_listener", &self.contact_listener.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
