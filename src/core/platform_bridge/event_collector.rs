//=========================================================================
// Event Collector
//=========================================================================
//
// Platform event collector with bounded draining and disconnect detection.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → events (arrival order)
//
// Bounded draining prevents a flooding backend from starving the frame.
// Events beyond the bound stay in the channel for the next frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::PlatformEvent;

//=== TickControl =========================================================

/// Frame loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

impl TickControl {
    /// `Exit` wins over `Continue`.
    pub fn and(self, other: TickControl) -> TickControl {
        if self == TickControl::Exit || other == TickControl::Exit {
            TickControl::Exit
        } else {
            TickControl::Continue
        }
    }
}

//=== EventCollector ======================================================

/// Drains platform events once per frame, preserving arrival order.
pub struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    events: Vec<PlatformEvent>,
    max_events_per_frame: usize,
}

impl EventCollector {
    pub fn new(receiver: Receiver<PlatformEvent>, max_events_per_frame: usize) -> Self {
        assert!(max_events_per_frame > 0, "Per-frame event bound must be positive");
        Self {
            receiver,
            events: Vec::with_capacity(16),
            max_events_per_frame,
        }
    }

    /// Collects pending platform events (bounded to prevent starvation).
    ///
    /// Returns [`TickControl::Exit`] if the backend dropped its sender.
    /// Events drained before the disconnect are still available.
    pub fn collect_frame(&mut self) -> TickControl {
        self.events.clear();

        while self.events.len() < self.max_events_per_frame {
            match self.receiver.try_recv() {
                Ok(event) => {
                    trace!(target: "platform", "Collected {:?}", event);
                    self.events.push(event);
                }
                Err(TryRecvError::Disconnected) => {
                    warn!(target: "platform", "Platform channel disconnected");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if self.events.len() >= self.max_events_per_frame {
            warn!(
                target: "platform",
                "Event queue backlog: drained {} events this frame, {} still pending",
                self.events.len(),
                self.receiver.len()
            );
        }

        TickControl::Continue
    }

    /// Returns events collected for this frame.
    pub fn events(&self) -> &[PlatformEvent] {
        &self.events
    }

    /// Takes ownership of collected events, leaving an empty vec.
    pub fn take_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.events)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
