//=========================================================================
// Keystone Demo
//
// Small playable scene exercising the whole runtime: a player pawn on a
// static floor, crates dropping from the sky, keyboard and controller
// bindings through the action map.
//
// Usage:
//   keystone [CONFIG] [--headless]
//
// `--headless` replays a short scripted session without opening a window.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

//=== Internal Dependencies ===============================================

use keystone_engine::core::input::event::InputEvent;
use keystone_engine::core::platform_bridge::PlatformEvent;
use keystone_engine::prelude::*;

const ARENA: &str = "arena";

//=== Player ==============================================================

/// Keyboard or controller driven box.
struct Player {
    body: Option<BodyHandle>,
    spawn: [f32; 2],
    position: [f32; 2],
    direction: f32,
    jump_requested: bool,
}

impl Player {
    const SPEED: f32 = 6.0;
    const JUMP_IMPULSE: f32 = 5.0;

    fn new(x: f32, y: f32) -> Self {
        Self {
            body: None,
            spawn: [x, y],
            position: [x, y],
            direction: 0.0,
            jump_requested: false,
        }
    }
}

impl Entity for Player {
    fn init(&mut self, physics: &mut PhysicsWorld) {
        let desc = BodyDesc::dynamic(self.spawn[0], self.spawn[1]).with_shape(Shape::Cuboid {
            half_width: 0.5,
            half_height: 0.5,
        });
        self.body = Some(physics.create_body(&desc));
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let Some(body) = self.body else { return };
        let Some([_, vy]) = ctx.physics.linear_velocity(body) else { return };
        if let Some(position) = ctx.physics.body_position(body) {
            self.position = position;
        }

        ctx.physics.set_linear_velocity(body, [self.direction * Self::SPEED, vy]);
        if std::mem::take(&mut self.jump_requested) {
            ctx.physics.apply_impulse(body, [0.0, Self::JUMP_IMPULSE]);
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.fill_rect(self.position, [1.0, 1.0], [80, 160, 255, 255]);
    }

    fn clear(&mut self, physics: &mut PhysicsWorld) {
        if let Some(body) = self.body.take() {
            physics.remove_body(body);
        }
    }

    fn as_pawn_mut(&mut self) -> Option<&mut dyn Pawn> {
        Some(self)
    }

    fn label(&self) -> &str {
        "player"
    }
}

impl Pawn for Player {
    fn on_action(&mut self, action: &str, pressed: bool) {
        if action == "jump" && pressed {
            self.jump_requested = true;
        }
    }

    fn check_key_state(&mut self, keyboard: &KeyboardState) {
        let left = keyboard.is_action_down("left") as i8 as f32;
        let right = keyboard.is_action_down("right") as i8 as f32;
        self.direction = right - left;
    }

    fn on_axis_motion(&mut self, controller: &ControllerState) {
        let (x, _) = controller.left_stick();
        if x != 0.0 {
            self.direction = x;
        } else if controller.is_action_down("left") || controller.is_action_down("right") {
            let left = controller.is_action_down("left") as i8 as f32;
            let right = controller.is_action_down("right") as i8 as f32;
            self.direction = right - left;
        } else {
            self.direction = 0.0;
        }
    }
}

//=== Floor ===============================================================

struct Floor {
    body: Option<BodyHandle>,
}

impl Entity for Floor {
    fn init(&mut self, physics: &mut PhysicsWorld) {
        let desc = BodyDesc::fixed(0.0, -1.0).with_shape(Shape::Cuboid {
            half_width: 20.0,
            half_height: 0.5,
        });
        self.body = Some(physics.create_body(&desc));
    }

    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.fill_rect([0.0, -1.0], [40.0, 1.0], [90, 90, 90, 255]);
    }

    fn clear(&mut self, physics: &mut PhysicsWorld) {
        if let Some(body) = self.body.take() {
            physics.remove_body(body);
        }
    }
}

//=== Crate ===============================================================

/// Falls from the sky and disappears once it drops below the floor.
struct FallingCrate {
    body: Option<BodyHandle>,
    position: [f32; 2],
    alive: bool,
}

impl FallingCrate {
    fn new(x: f32) -> Self {
        Self {
            body: None,
            position: [x, 12.0],
            alive: true,
        }
    }
}

impl Entity for FallingCrate {
    fn init(&mut self, physics: &mut PhysicsWorld) {
        let desc = BodyDesc::dynamic(self.position[0], self.position[1])
            .with_shape(Shape::Ball { radius: 0.4 })
            .with_restitution(0.4);
        self.body = Some(physics.create_body(&desc));
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        match self.body.and_then(|b| ctx.physics.body_position(b)) {
            Some(position) if position[1] >= -10.0 => self.position = position,
            _ => self.alive = false,
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.fill_circle(self.position, 0.4, [200, 120, 40, 255]);
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn clear(&mut self, physics: &mut PhysicsWorld) {
        if let Some(body) = self.body.take() {
            physics.remove_body(body);
        }
    }
}

//=== Setup ===============================================================

fn populate<P: keystone_engine::core::platform_bridge::PlatformBackend>(
    engine: &mut Engine<P>,
) -> Result<(), EngineError> {
    let actions = engine.input_mut().actions_mut();
    actions.bind_key(KeyCode::KeyA, "left");
    actions.bind_key(KeyCode::ArrowLeft, "left");
    actions.bind_key(KeyCode::KeyD, "right");
    actions.bind_key(KeyCode::ArrowRight, "right");
    actions.bind_key(KeyCode::Space, "jump");
    actions.bind_button(ControllerButton::DPadLeft, "left");
    actions.bind_button(ControllerButton::DPadRight, "right");
    actions.bind_button(ControllerButton::South, "jump");

    engine.assets_mut().register_texture("player", "assets/player.png");

    engine.create_level(ARENA)?;
    engine.spawn(ARENA, Box::new(Floor { body: None }))?;
    engine.spawn_pawn(ARENA, Box::new(Player::new(-2.0, 1.0)))?;
    engine.spawn_pawn(ARENA, Box::new(Player::new(2.0, 1.0)))?;
    for x in [-6.0, -3.0, 0.0, 3.0, 6.0] {
        engine.spawn(ARENA, Box::new(FallingCrate::new(x)))?;
    }
    engine.activate_level(ARENA)?;
    engine.delete_level(DEFAULT_LEVEL)?;
    Ok(())
}

/// Two seconds of scripted input: walk right, jump, stop.
fn demo_script() -> Vec<Vec<PlatformEvent>> {
    let mut script = vec![Vec::new(); 120];
    script[10].push(InputEvent::KeyDown { key: KeyCode::KeyD }.into());
    script[40].push(InputEvent::KeyDown { key: KeyCode::Space }.into());
    script[41].push(InputEvent::KeyUp { key: KeyCode::Space }.into());
    script[80].push(InputEvent::KeyUp { key: KeyCode::KeyD }.into());
    script
}

fn run(config: EngineConfig, headless: bool) -> Result<(), EngineError> {
    let builder = EngineBuilder::from_config(config);

    if headless {
        let mut engine = builder.build_headless(demo_script())?;
        populate(&mut engine)?;
        engine.run()?;
        info!("Headless session finished after {} frames", engine.frame_count());
    } else {
        let mut engine = builder.build()?;
        populate(&mut engine)?;
        engine.run()?;
    }
    Ok(())
}

//=== Entry Point =========================================================

#[derive(Parser)]
#[command(name = "keystone")]
#[command(about = "Keystone engine demo scene")]
struct Cli {
    /// TOML engine configuration; defaults are used when omitted
    config: Option<PathBuf>,

    /// Replay a scripted session without opening a window
    #[arg(long)]
    headless: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    match run(config, cli.headless) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Engine error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
