//=========================================================================
// Platform Subsystem
//
// Bridges winit (window + keyboard) and gilrs (controllers) with the
// engine core through a bounded crossbeam channel.
//
// Architecture:
// ```text
//  Engine::run() (main thread, once per frame)
//  ┌──────────────────────────────────────────────┐
//  │  pump_events()                               │
//  │   ├─ winit pump_app_events(timeout = 0)      │
//  │   │   └─ InputProcessor → InputBuffer        │
//  │   ├─ GamepadSource::poll()                   │
//  │   │   ├─ input          → InputBuffer        │
//  │   │   └─ connect/remove → flush, then send   │
//  │   └─ flush InputBuffer ──────────────┐       │
//  │                                      ↓       │
//  │  EventCollector ◄── crossbeam channel        │
//  │  present() → pre_present_notify + redraw     │
//  └──────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Pumped, not run**: the engine owns the frame loop, so winit is
//   driven with `pump_app_events` and a zero timeout
// - **Never block on send**: the channel is bounded and drained on the
//   same thread; a full channel drops the event with a warning
// - **Window failures are fatal**: reported as `PlatformError` from
//   `WinitPlatform::new`, before the frame loop starts
//
//=========================================================================

//=== Submodules ==========================================================

mod gamepad;
mod headless;
mod input_buffer;
mod input_processor;

pub use headless::HeadlessPlatform;

//=== External Crates =====================================================

use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::config::WindowConfig;
use crate::core::platform_bridge::{PlatformBackend, PlatformError, PlatformEvent};
use crate::core::render::DrawList;
use gamepad::GamepadSource;
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

/// Startup pumps allowed for the window to appear.
const WINDOW_STARTUP_PUMPS: usize = 8;

//=== WinitPlatform =======================================================

/// Desktop backend: one winit window plus gilrs controllers.
///
/// # Thread Safety
///
/// Not Send/Sync; winit requires the main thread on macOS/iOS.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    state: PlatformState,
}

impl WinitPlatform {
    //--- Construction -----------------------------------------------------

    /// Creates the event loop and the window.
    ///
    /// # Errors
    ///
    /// [`PlatformError::EventLoopCreation`] if winit cannot reach the OS,
    /// [`PlatformError::WindowCreation`] if the window never appears.
    pub fn new(sender: Sender<PlatformEvent>, window: &WindowConfig) -> Result<Self, PlatformError> {
        debug!(target: "platform", "Creating winit event loop");
        let event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoopCreation(e.to_string()))?;

        let attributes = WindowAttributes::default()
            .with_title(window.title.clone())
            .with_inner_size(LogicalSize::new(window.width, window.height));

        let mut platform = Self {
            event_loop,
            state: PlatformState::new(sender, attributes, (window.width, window.height), GamepadSource::new()),
        };
        platform.wait_for_window()?;

        info!(target: "platform", "Platform subsystem initialized");
        Ok(platform)
    }

    /// Pumps startup events until `resumed` has created the window.
    fn wait_for_window(&mut self) -> Result<(), PlatformError> {
        for _ in 0..WINDOW_STARTUP_PUMPS {
            self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);

            if let Some(reason) = self.state.creation_error.take() {
                return Err(PlatformError::WindowCreation(reason));
            }
            if self.state.window.is_some() {
                return Ok(());
            }
        }
        Err(PlatformError::WindowCreation("window was not created during startup".into()))
    }
}

impl PlatformBackend for WinitPlatform {
    fn pump_events(&mut self) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state);

        self.state.poll_gamepads();
        self.state.flush_input_buffer();

        if let PumpStatus::Exit(code) = status {
            debug!(target: "platform", "Event loop exited with code {}", code);
            self.state.send_quit();
        }
    }

    fn present(&mut self, frame: &DrawList) {
        if let Some(window) = &self.state.window {
            trace!(target: "platform", "Presenting {} draw commands", frame.len());
            window.pre_present_notify();
            window.request_redraw();
        }
    }

    fn window_size(&self) -> (u32, u32) {
        self.state.size
    }
}

//=== PlatformState =======================================================

/// winit application handler; everything the callbacks touch.
struct PlatformState {
    /// None until `resumed()` runs.
    window: Option<Window>,
    attributes: WindowAttributes,
    creation_error: Option<String>,
    size: (u32, u32),

    buffer: InputBuffer,
    event_sender: Sender<PlatformEvent>,
    input_processor: InputProcessor,
    gamepads: GamepadSource,
    quit_sent: bool,
}

impl PlatformState {
    fn new(
        event_sender: Sender<PlatformEvent>,
        attributes: WindowAttributes,
        size: (u32, u32),
        gamepads: GamepadSource,
    ) -> Self {
        Self {
            window: None,
            attributes,
            creation_error: None,
            size,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
            gamepads,
            quit_sent: false,
        }
    }

    //--- Sending ----------------------------------------------------------

    fn send(&self, event: PlatformEvent) -> bool {
        match self.event_sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(target: "platform::input", "Event channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(target: "platform::input", "Event channel disconnected");
                false
            }
        }
    }

    /// Sends buffered input: edges in order, then coalesced axes.
    fn flush_input_buffer(&mut self) {
        if let Some((discrete, continuous)) = self.buffer.drain() {
            trace!(
                target: "platform::input",
                "Flushing {} discrete + {} continuous events",
                discrete.len(),
                continuous.len()
            );

            for event in discrete.into_iter().chain(continuous) {
                self.send(PlatformEvent::Input(event));
            }
        }
    }

    fn send_quit(&mut self) {
        if self.quit_sent {
            return;
        }
        self.flush_input_buffer();
        self.quit_sent = self.send(PlatformEvent::Quit);
    }

    fn poll_gamepads(&mut self) {
        for event in self.gamepads.poll() {
            match event {
                PlatformEvent::Input(input) => self.buffer.push(input),
                device_event => {
                    self.flush_input_buffer();
                    self.send(device_event);
                }
            }
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for PlatformState {
    /// Creates the window on first resume; later resumes are ignored.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (resume)");
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.size = (size.width, size.height);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.creation_error = Some(e.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.send_quit();
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(key_event) {
                    self.buffer.push_discrete(event);
                } else {
                    trace!(target: "platform::input", "Repeat or unmapped key ignored");
                }
            }

            WindowEvent::Resized(size) => {
                trace!(target: "platform", "Resized to {}x{}", size.width, size.height);
                self.size = (size.width, size.height);
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
