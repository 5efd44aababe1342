//=========================================================================
// Keystone Engine
//
// Root context: owns every subsystem and drives the frame loop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine<P>  ──run()──>  [frame loop]
//         │                          │
//         ├─ with_title()            ├─ physics step (fixed)
//         ├─ with_window_size()      ├─ pump → collect → route input
//         ├─ with_timestep()         ├─ level init / update / refresh / draw
//         ├─ with_iterations()       ├─ present
//         ├─ with_gravity()          └─ apply level commands
//         └─ with_channel_capacity()
// ```
//
// Teardown (`shutdown()` or Drop, whichever comes first):
//   input → platform → levels → assets → contact listener → physics
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Instant;

use crossbeam_channel::{bounded, Sender};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::config::EngineConfig;
use crate::core::assets::AssetManager;
use crate::core::device::DeviceRegistry;
use crate::core::input::{EntityInputBinding, InputRouter};
use crate::core::level::{Entity, EntityId, FrameContext, Level, LevelCommand, LevelCommandQueue, LevelRegistry};
use crate::core::physics::{ContactListener, LoggingContactListener, PhysicsWorld, StepConfig};
use crate::core::platform_bridge::{EventCollector, PlatformBackend, PlatformError, PlatformEvent, TickControl};
use crate::core::render::DrawList;
use crate::error::EngineError;
use crate::platform::{HeadlessPlatform, WinitPlatform};

/// Level created (and activated) by every engine at build time.
pub const DEFAULT_LEVEL: &str = "defaultLevel";

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// Starts from [`EngineConfig::default()`] (or a loaded config) and lets
/// individual fields be overridden fluently.
///
/// # Default Values
///
/// - **Window**: "Keystone Engine", 800x600
/// - **Physics**: gravity (0, -10), step 1/60 s, 6 velocity / 2 position iterations
/// - **Channel capacity**: 256 events
///
/// # Examples
///
/// ```no_run
/// use keystone_engine::EngineBuilder;
///
/// let mut engine = EngineBuilder::new()
///     .with_title("Demo")
///     .with_window_size(1280, 720)
///     .build()?;
///
/// engine.run()?;
/// # Ok::<(), keystone_engine::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration (e.g. loaded from TOML).
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    /// Sets the fixed physics step, independent of frame delta.
    ///
    /// # Panics
    ///
    /// Panics if `timestep <= 0.0`.
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        assert!(timestep > 0.0, "Timestep must be positive, got {}", timestep);
        self.config.physics.timestep = timestep;
        self
    }

    /// # Panics
    ///
    /// Panics if `velocity` is zero.
    pub fn with_iterations(mut self, velocity: usize, position: usize) -> Self {
        assert!(velocity > 0, "Velocity iterations must be positive");
        self.config.physics.velocity_iterations = velocity;
        self.config.physics.position_iterations = position;
        self
    }

    pub fn with_gravity(mut self, gravity: [f32; 2]) -> Self {
        self.config.physics.gravity = gravity;
        self
    }

    /// Sets the platform → core channel capacity.
    ///
    /// Events that do not fit are dropped by the backend with a warning.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.config.input.channel_capacity = capacity;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the engine with a winit window and gilrs controllers.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for invalid settings, [`EngineError::Platform`]
    /// if the window cannot be created. Either way no frame ever runs.
    pub fn build(self) -> Result<Engine<WinitPlatform>, EngineError> {
        self.build_with(|sender, config| WinitPlatform::new(sender, &config.window))
    }

    /// Builds a windowless engine that replays `script`, one batch per frame.
    pub fn build_headless(self, script: Vec<Vec<PlatformEvent>>) -> Result<Engine<HeadlessPlatform>, EngineError> {
        self.build_with(|sender, config| {
            let size = (config.window.width, config.window.height);
            Ok(HeadlessPlatform::new(sender, size).with_script(script))
        })
    }

    /// Builds the engine around any backend produced by `factory`.
    pub fn build_with<P, F>(self, factory: F) -> Result<Engine<P>, EngineError>
    where
        P: PlatformBackend,
        F: FnOnce(Sender<PlatformEvent>, &EngineConfig) -> Result<P, PlatformError>,
    {
        let config = self.config;
        config.validate()?;

        info!(
            target: "engine",
            "Building engine '{}' ({}x{}, step {:.4}s, channel {})",
            config.window.title,
            config.window.width,
            config.window.height,
            config.physics.timestep,
            config.input.channel_capacity
        );

        let (tx, rx) = bounded(config.input.channel_capacity);
        let platform = factory(tx, &config)?;

        let mut physics = PhysicsWorld::new(config.physics.gravity);
        physics.set_contact_listener(Box::new(LoggingContactListener));

        let mut levels = LevelRegistry::new();
        levels.create_level(DEFAULT_LEVEL)?;
        if levels.active().is_none() {
            levels.activate(DEFAULT_LEVEL)?;
        }

        info!(target: "engine", "Engine initialized");

        Ok(Engine {
            step: StepConfig::from(&config.physics),
            platform: Some(platform),
            collector: EventCollector::new(rx, config.input.max_events_per_frame),
            router: InputRouter::new(config.input.axis_dead_zone),
            devices: DeviceRegistry::new(),
            bindings: EntityInputBinding::new(),
            levels,
            assets: AssetManager::new(),
            physics,
            commands: LevelCommandQueue::new(),
            frame: DrawList::new(),
            config,
            delta_time: 0.0,
            frame_count: 0,
            last_frame: None,
            shut_down: false,
        })
    }
}

//=== Engine ==============================================================

/// Keystone runtime: the one object that owns every subsystem.
///
/// Create via [`EngineBuilder`]. Everything runs on the calling thread.
///
/// # Frame Order
///
/// ```text
/// physics step → pump/collect events → route input → continuous poll
///   → active level (init if needed, update, refresh, draw)
///   → present → apply level commands
/// ```
pub struct Engine<P: PlatformBackend = WinitPlatform> {
    config: EngineConfig,
    step: StepConfig,

    platform: Option<P>,
    collector: EventCollector,
    router: InputRouter,
    devices: DeviceRegistry,
    bindings: EntityInputBinding,

    levels: LevelRegistry,
    assets: AssetManager,
    physics: PhysicsWorld,
    commands: LevelCommandQueue,
    frame: DrawList,

    delta_time: f32,
    frame_count: u64,
    last_frame: Option<Instant>,
    shut_down: bool,
}

impl<P: PlatformBackend> Engine<P> {
    //--- Execution --------------------------------------------------------

    /// Runs frames until the platform requests quit.
    ///
    /// The frame in which `Quit` arrives still completes. Teardown is left
    /// to [`Engine::shutdown`] or Drop.
    ///
    /// # Errors
    ///
    /// [`EngineError::ShutDown`] if the engine was already shut down.
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.enter_loop()?;

        while self.tick() == TickControl::Continue {}

        info!(target: "engine", "Frame loop exited after {} frames", self.frame_count);
        Ok(())
    }

    /// Runs at most `frames` frames; stops early on quit.
    ///
    /// Returns the number of frames executed.
    pub fn run_frames(&mut self, frames: u64) -> Result<u64, EngineError> {
        self.enter_loop()?;

        let mut executed = 0;
        while executed < frames {
            executed += 1;
            if self.tick() == TickControl::Exit {
                break;
            }
        }
        Ok(executed)
    }

    fn enter_loop(&mut self) -> Result<(), EngineError> {
        if self.shut_down {
            return Err(EngineError::ShutDown);
        }
        if let Some(level) = self.levels.active_mut() {
            level.init(&mut self.physics);
        }
        Ok(())
    }

    /// One frame. Returns `Exit` once quit was requested.
    fn tick(&mut self) -> TickControl {
        let now = Instant::now();
        self.delta_time = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        //--- 1. Physics (fixed step, before any gameplay reads) ------------
        self.physics.step(&self.step);

        //--- 2. Input ------------------------------------------------------
        if let Some(platform) = self.platform.as_mut() {
            platform.pump_events();
        }
        let mut control = self.collector.collect_frame();
        let events = self.collector.take_events();
        control = control.and(self.router.process_frame(
            &events,
            &mut self.devices,
            &mut self.bindings,
            self.levels.active_mut(),
        ));

        //--- 3. Active level -----------------------------------------------
        self.frame.reset();
        if let Some(level) = self.levels.active_mut() {
            level.init(&mut self.physics);

            let mut ctx = FrameContext {
                delta_time: self.delta_time,
                frame: self.frame_count,
                physics: &mut self.physics,
                assets: &self.assets,
                commands: &mut self.commands,
            };
            level.update(&mut ctx);

            for removed in level.refresh(&mut self.physics) {
                self.bindings.unregister_pawn(removed);
            }

            level.draw(&mut self.frame);
        }

        //--- 4. Present ----------------------------------------------------
        if let Some(platform) = self.platform.as_mut() {
            platform.present(&self.frame);
        }

        //--- 5. Deferred level commands ------------------------------------
        self.apply_level_commands();

        self.frame_count += 1;
        control
    }

    fn apply_level_commands(&mut self) {
        for command in self.commands.take() {
            let outcome = match &command {
                LevelCommand::Activate(name) => self.activate_level(name),
                LevelCommand::Delete(name) => self.delete_level(name),
            };
            if let Err(e) = outcome {
                warn!(target: "engine", "Level command {:?} failed: {}", command, e);
            }
        }
    }

    //--- Levels & Entities ------------------------------------------------

    pub fn create_level(&mut self, name: &str) -> Result<(), EngineError> {
        self.levels.create_level(name)?;
        Ok(())
    }

    /// Switches the active level; it is initialized on its first frame.
    pub fn activate_level(&mut self, name: &str) -> Result<(), EngineError> {
        self.levels.activate(name)?;
        Ok(())
    }

    /// Clears and removes a level, dropping its pawns' device bindings.
    pub fn delete_level(&mut self, name: &str) -> Result<(), EngineError> {
        let cleared = self.levels.delete_level(name, &mut self.physics)?;
        for id in cleared {
            self.bindings.unregister_pawn(id);
        }
        Ok(())
    }

    pub fn spawn(&mut self, level: &str, entity: Box<dyn Entity>) -> Result<EntityId, EngineError> {
        Ok(self.levels.spawn(level, entity, &mut self.physics)?)
    }

    /// Spawns an entity and registers it for input.
    ///
    /// The pawn claims the lowest idle controller, or else the next one
    /// that connects; the earliest registered pawn also receives the
    /// keyboard.
    pub fn spawn_pawn(&mut self, level: &str, mut pawn: Box<dyn Entity>) -> Result<EntityId, EngineError> {
        if pawn.as_pawn_mut().is_none() {
            warn!(target: "engine", "'{}' registered for input but is not a pawn", pawn.label());
        }
        let id = self.levels.spawn(level, pawn, &mut self.physics)?;
        self.bindings.register_pawn(id);
        self.bindings.claim_idle_device(id, &self.devices);
        Ok(id)
    }

    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.physics.set_contact_listener(listener);
    }

    //--- Teardown ---------------------------------------------------------

    /// Releases every subsystem in dependency order. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!(target: "engine", "Shutting down after {} frames", self.frame_count);

        self.router.release();
        self.devices.clear();
        self.bindings.clear();
        debug!(target: "engine", "Input released");

        drop(self.platform.take());
        debug!(target: "engine", "Platform released");

        let cleared = self.levels.clear_all(&mut self.physics);
        debug!(target: "engine", "Levels released ({} entities)", cleared.len());

        self.assets.clear();
        drop(self.physics.take_contact_listener());

        info!(target: "engine", "Engine shutdown complete");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    //--- Accessors --------------------------------------------------------

    pub fn window_width(&self) -> u32 {
        self.window_size().0
    }

    pub fn window_height(&self) -> u32 {
        self.window_size().1
    }

    fn window_size(&self) -> (u32, u32) {
        match &self.platform {
            Some(platform) => platform.window_size(),
            None => (self.config.window.width, self.config.window.height),
        }
    }

    /// Seconds between the last two frames (0 on the first frame).
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    pub fn bindings(&self) -> &EntityInputBinding {
        &self.bindings
    }

    pub fn levels(&self) -> &LevelRegistry {
        &self.levels
    }

    pub fn level_mut(&mut self, name: &str) -> Option<&mut Level> {
        self.levels.level_mut(name)
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    pub fn input(&self) -> &InputRouter {
        &self.router
    }

    /// Input router, for action-map configuration.
    pub fn input_mut(&mut self) -> &mut InputRouter {
        &mut self.router
    }

    /// `None` after shutdown.
    pub fn platform(&self) -> Option<&P> {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> Option<&mut P> {
        self.platform.as_mut()
    }
}

impl<P: PlatformBackend> Drop for Engine<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::device::PlatformHandle;
    use crate::core::input::event::{ControllerButton, InputEvent, KeyCode};
    use crate::core::input::ControllerState;
    use crate::core::level::Pawn;
    use crate::core::physics::{BodyDesc, BodyHandle, Contact};
    use crate::core::render::Renderer;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn headless(script: Vec<Vec<PlatformEvent>>) -> Engine<HeadlessPlatform> {
        EngineBuilder::new().build_headless(script).unwrap()
    }

    //--- Test Entities ----------------------------------------------------

    /// Falling box that records the height it sees in each update.
    struct Faller {
        body: Option<BodyHandle>,
        start_y: f32,
        seen: Rc<RefCell<Vec<f32>>>,
        log: Log,
    }

    impl Faller {
        fn boxed(start_y: f32, seen: &Rc<RefCell<Vec<f32>>>, log: &Log) -> Box<Self> {
            Box::new(Self {
                body: None,
                start_y,
                seen: seen.clone(),
                log: log.clone(),
            })
        }
    }

    impl Entity for Faller {
        fn init(&mut self, physics: &mut PhysicsWorld) {
            self.body = Some(physics.create_body(&BodyDesc::dynamic(0.0, self.start_y)));
        }

        fn update(&mut self, ctx: &mut FrameContext<'_>) {
            if let Some(y) = self.body.and_then(|b| ctx.physics.body_position(b)).map(|p| p[1]) {
                self.seen.borrow_mut().push(y);
            }
        }

        fn draw(&self, renderer: &mut dyn Renderer) {
            renderer.fill_rect([0.0, 0.0], [1.0, 1.0], [255, 255, 255, 255]);
        }

        fn clear(&mut self, physics: &mut PhysicsWorld) {
            if let Some(body) = self.body.take() {
                let alive = physics.contains(body);
                self.log.borrow_mut().push(format!("level:{}", alive));
                physics.remove_body(body);
            }
        }
    }

    /// Pawn logging every hook it receives.
    struct Player {
        name: &'static str,
        log: Log,
    }

    impl Player {
        fn boxed(name: &'static str, log: &Log) -> Box<Self> {
            Box::new(Self { name, log: log.clone() })
        }
    }

    impl Entity for Player {
        fn update(&mut self, _ctx: &mut FrameContext<'_>) {}

        fn as_pawn_mut(&mut self) -> Option<&mut dyn Pawn> {
            Some(self)
        }
    }

    impl Pawn for Player {
        fn on_key_down(&mut self, key: KeyCode) {
            self.log.borrow_mut().push(format!("{}:key:{:?}", self.name, key));
        }

        fn on_button_down(&mut self, button: ControllerButton, controller: &ControllerState) {
            self.log
                .borrow_mut()
                .push(format!("{}:button:{:?}@{}", self.name, button, controller.index()));
        }
    }

    /// Issues one level command on its first update.
    struct Switcher {
        command: Option<LevelCommand>,
    }

    impl Entity for Switcher {
        fn update(&mut self, ctx: &mut FrameContext<'_>) {
            if let Some(command) = self.command.take() {
                ctx.commands.push(command);
            }
        }
    }

    /// Counts updates.
    struct Ticker {
        updates: Rc<RefCell<u32>>,
    }

    impl Entity for Ticker {
        fn update(&mut self, _ctx: &mut FrameContext<'_>) {
            *self.updates.borrow_mut() += 1;
        }
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.config().window.title, "Keystone Engine");
        assert_eq!(builder.config().physics.velocity_iterations, 6);
        assert_eq!(builder.config().physics.position_iterations, 2);
        assert_eq!(builder.config().input.channel_capacity, 256);
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let builder = EngineBuilder::new()
            .with_title("Demo")
            .with_window_size(1024, 768)
            .with_timestep(1.0 / 120.0)
            .with_iterations(8, 3)
            .with_gravity([0.0, -9.81])
            .with_channel_capacity(64);

        let config = builder.config();
        assert_eq!(config.window.title, "Demo");
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert_relative_eq!(config.physics.timestep, 1.0 / 120.0);
        assert_eq!(config.physics.velocity_iterations, 8);
        assert_eq!(config.physics.position_iterations, 3);
        assert_eq!(config.physics.gravity, [0.0, -9.81]);
        assert_eq!(config.input.channel_capacity, 64);
    }

    #[test]
    #[should_panic(expected = "Timestep must be positive")]
    fn builder_with_timestep_panics_on_zero() {
        EngineBuilder::new().with_timestep(0.0);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Window size must be positive")]
    fn builder_with_window_size_panics_on_zero() {
        EngineBuilder::new().with_window_size(0, 600);
    }

    #[test]
    fn invalid_config_is_rejected_before_platform_creation() {
        let mut config = EngineConfig::default();
        config.physics.velocity_iterations = 0;

        let mut factory_called = false;
        let result = EngineBuilder::from_config(config).build_with(|sender, config| {
            factory_called = true;
            Ok(HeadlessPlatform::new(sender, (config.window.width, config.window.height)))
        });

        assert!(matches!(result, Err(EngineError::Config(_))));
        assert!(!factory_called);
    }

    #[test]
    fn platform_failure_is_fatal() {
        let result = EngineBuilder::new().build_with(|_, _| -> Result<HeadlessPlatform, PlatformError> {
            Err(PlatformError::WindowCreation("no display".into()))
        });

        match result {
            Err(EngineError::Platform(PlatformError::WindowCreation(reason))) => assert_eq!(reason, "no display"),
            Err(other) => panic!("Expected platform error, got {}", other),
            Ok(_) => panic!("Expected platform error, got an engine"),
        }
    }

    //=====================================================================
    // Init Tests
    //=====================================================================

    #[test]
    fn build_creates_and_activates_default_level() {
        let engine = headless(vec![]);

        assert!(engine.levels().contains(DEFAULT_LEVEL));
        assert_eq!(engine.levels().active_name(), Some(DEFAULT_LEVEL));
        assert!(engine.physics().has_contact_listener());
        assert!(engine.assets().is_empty());
        assert_eq!((engine.window_width(), engine.window_height()), (800, 600));
    }

    //=====================================================================
    // Frame Loop Tests
    //=====================================================================

    #[test]
    fn physics_steps_before_gameplay_reads() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = new_log();
        let mut engine = headless(vec![]);
        engine.spawn(DEFAULT_LEVEL, Faller::boxed(10.0, &seen, &log)).unwrap();

        engine.run_frames(1).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0] < 10.0, "Body already fell once when update ran, saw {}", seen[0]);
        assert_relative_eq!(seen[0], 10.0, epsilon = 0.01);
    }

    #[test]
    fn quit_completes_the_frame() {
        let updates = Rc::new(RefCell::new(0));
        let mut engine = headless(vec![vec![PlatformEvent::Quit]]);
        engine
            .spawn(DEFAULT_LEVEL, Box::new(Ticker { updates: updates.clone() }))
            .unwrap();

        engine.run().unwrap();

        assert_eq!(engine.frame_count(), 1);
        assert_eq!(*updates.borrow(), 1, "Frame carrying Quit still updated");
        assert_eq!(engine.platform().map(HeadlessPlatform::presented_frames), Some(1));
    }

    #[test]
    fn run_stops_when_script_is_exhausted() {
        let mut engine = headless(vec![vec![], vec![]]);

        engine.run().unwrap();

        assert_eq!(engine.frame_count(), 3, "Two scripted frames plus the quit frame");
    }

    #[test]
    fn run_frames_is_bounded() {
        let mut engine = EngineBuilder::new()
            .build_with(|sender, _| Ok(HeadlessPlatform::new(sender, (64, 64)).run_forever()))
            .unwrap();

        assert_eq!(engine.run_frames(5).unwrap(), 5);
        assert_eq!(engine.frame_count(), 5);
        assert_eq!(engine.physics().step_count(), 5);
    }

    #[test]
    fn active_level_is_drawn_and_presented() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = new_log();
        let mut engine = headless(vec![vec![]]);
        engine.spawn(DEFAULT_LEVEL, Faller::boxed(0.0, &seen, &log)).unwrap();

        engine.run_frames(1).unwrap();

        let frame = engine.platform().and_then(HeadlessPlatform::last_frame).unwrap();
        assert_eq!(frame.len(), 1);
    }

    //=====================================================================
    // Input Tests
    //=====================================================================

    #[test]
    fn controllers_bind_to_pawns_in_registration_order() {
        let log = new_log();
        let pad = |n| PlatformHandle(n);
        let mut engine = headless(vec![
            vec![
                PlatformEvent::DeviceConnected { handle: pad(7) },
                PlatformEvent::DeviceConnected { handle: pad(9) },
            ],
            vec![
                InputEvent::ControllerButtonDown { handle: pad(9), button: ControllerButton::South }.into(),
                InputEvent::KeyDown { key: KeyCode::Space }.into(),
            ],
        ]);
        let first = engine.spawn_pawn(DEFAULT_LEVEL, Player::boxed("p1", &log)).unwrap();
        let second = engine.spawn_pawn(DEFAULT_LEVEL, Player::boxed("p2", &log)).unwrap();

        engine.run_frames(2).unwrap();

        assert_eq!(engine.bindings().pawn_for_handle(pad(7)), Some(first));
        assert_eq!(engine.bindings().pawn_for_handle(pad(9)), Some(second));
        assert_eq!(*log.borrow(), vec!["p2:button:South@#1".to_string(), "p1:key:Space".to_string()]);
    }

    #[test]
    fn respawned_pawn_claims_idle_controller() {
        let log = new_log();
        let pad = PlatformHandle(7);
        let mut engine = headless(vec![
            vec![PlatformEvent::DeviceConnected { handle: pad }],
            vec![InputEvent::ControllerButtonDown { handle: pad, button: ControllerButton::South }.into()],
        ]);
        engine.create_level("L1").unwrap();
        engine.activate_level("L1").unwrap();
        let first = engine.spawn_pawn("L1", Player::boxed("p1", &log)).unwrap();
        engine.run_frames(1).unwrap();
        assert_eq!(engine.bindings().pawn_for_handle(pad), Some(first));

        engine.delete_level("L1").unwrap();
        assert_eq!(engine.bindings().pawn_for_handle(pad), None);

        engine.activate_level(DEFAULT_LEVEL).unwrap();
        let second = engine.spawn_pawn(DEFAULT_LEVEL, Player::boxed("p2", &log)).unwrap();
        assert_eq!(engine.bindings().pawn_for_handle(pad), Some(second));

        engine.run_frames(1).unwrap();
        assert_eq!(*log.borrow(), vec!["p2:button:South@#0".to_string()]);
    }

    #[test]
    fn deleting_a_level_unbinds_its_pawns() {
        let log = new_log();
        let mut engine = headless(vec![]);
        engine.create_level("L1").unwrap();
        let pawn = engine.spawn_pawn("L1", Player::boxed("p1", &log)).unwrap();
        assert!(engine.bindings().contains(pawn));

        engine.delete_level("L1").unwrap();

        assert!(!engine.bindings().contains(pawn));
        assert!(!engine.levels().contains("L1"));
    }

    //=====================================================================
    // Level Command Tests
    //=====================================================================

    #[test]
    fn level_commands_apply_at_end_of_frame() {
        let updates = Rc::new(RefCell::new(0));
        let mut engine = headless(vec![vec![], vec![]]);
        engine.create_level("L2").unwrap();
        engine
            .spawn("L2", Box::new(Ticker { updates: updates.clone() }))
            .unwrap();
        engine
            .spawn(
                DEFAULT_LEVEL,
                Box::new(Switcher {
                    command: Some(LevelCommand::Activate("L2".into())),
                }),
            )
            .unwrap();

        engine.run_frames(1).unwrap();
        assert_eq!(engine.levels().active_name(), Some("L2"));
        assert_eq!(*updates.borrow(), 0, "Switch takes effect next frame");

        engine.run_frames(1).unwrap();
        assert_eq!(*updates.borrow(), 1);
        assert!(engine.levels().active().unwrap().is_initialized());
    }

    #[test]
    fn failed_level_command_does_not_stop_the_loop() {
        let mut engine = headless(vec![vec![], vec![]]);
        engine
            .spawn(
                DEFAULT_LEVEL,
                Box::new(Switcher {
                    command: Some(LevelCommand::Activate("L9".into())),
                }),
            )
            .unwrap();

        assert_eq!(engine.run_frames(2).unwrap(), 2);
        assert_eq!(engine.levels().active_name(), Some(DEFAULT_LEVEL));
    }

    #[test]
    fn level_errors_surface_through_engine() {
        let mut engine = headless(vec![]);

        assert!(matches!(engine.activate_level("L9"), Err(EngineError::Level(_))));
        assert!(matches!(engine.create_level(DEFAULT_LEVEL), Err(EngineError::Level(_))));
        assert_eq!(engine.levels().len(), 1);
    }

    //=====================================================================
    // Teardown Tests
    //=====================================================================

    /// Backend whose drop is observable.
    struct DropProbe {
        log: Log,
    }

    impl PlatformBackend for DropProbe {
        fn pump_events(&mut self) {}

        fn present(&mut self, _frame: &DrawList) {}

        fn window_size(&self) -> (u32, u32) {
            (1, 1)
        }
    }

    impl Drop for DropProbe {
        fn drop(&mut self) {
            self.log.borrow_mut().push("platform".into());
        }
    }

    struct ListenerProbe {
        log: Log,
    }

    impl ContactListener for ListenerProbe {
        fn begin_contact(&mut self, _contact: &Contact) {}

        fn end_contact(&mut self, _contact: &Contact) {}
    }

    impl Drop for ListenerProbe {
        fn drop(&mut self) {
            self.log.borrow_mut().push("listener".into());
        }
    }

    #[test]
    fn teardown_releases_in_dependency_order() {
        let log = new_log();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let probe_log = log.clone();
        let mut engine = EngineBuilder::new()
            .build_with(move |_, _| Ok(DropProbe { log: probe_log }))
            .unwrap();
        engine.set_contact_listener(Box::new(ListenerProbe { log: log.clone() }));
        engine.spawn(DEFAULT_LEVEL, Faller::boxed(1.0, &seen, &log)).unwrap();
        engine.run_frames(1).unwrap();

        engine.shutdown();

        assert_eq!(*log.borrow(), vec!["platform", "level:true", "listener"]);
        assert!(engine.levels().is_empty());
        assert_eq!(engine.physics().body_count(), 0);
    }

    #[test]
    fn shutdown_is_idempotent_and_runs_on_drop() {
        let log = new_log();
        let probe_log = log.clone();
        let mut engine = EngineBuilder::new()
            .build_with(move |_, _| Ok(DropProbe { log: probe_log }))
            .unwrap();

        engine.shutdown();
        engine.shutdown();
        drop(engine);

        assert_eq!(*log.borrow(), vec!["platform"]);
    }

    #[test]
    fn run_after_shutdown_is_rejected() {
        let mut engine = headless(vec![]);
        engine.shutdown();

        assert!(matches!(engine.run(), Err(EngineError::ShutDown)));
        assert!(matches!(engine.run_frames(1), Err(EngineError::ShutDown)));
        assert!(engine.platform().is_none());
    }
}
