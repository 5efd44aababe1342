//=========================================================================
// Headless Platform
//=========================================================================
//
// Windowless backend that replays a scripted sequence of event batches.
//
// Each `pump_events()` sends the next batch; once the script runs out it
// sends `Quit` (unless told not to), so a scripted run always terminates.
// Presented frames are counted and the last one is kept for inspection.
//
// Used by the engine's tests and by the `--headless` demo mode.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::platform_bridge::{PlatformBackend, PlatformEvent};
use crate::core::render::DrawList;

//=== HeadlessPlatform ====================================================

pub struct HeadlessPlatform {
    sender: Sender<PlatformEvent>,
    script: VecDeque<Vec<PlatformEvent>>,
    quit_when_exhausted: bool,
    quit_sent: bool,
    size: (u32, u32),
    pumped: u64,
    presented: u64,
    last_frame: Option<DrawList>,
}

impl HeadlessPlatform {
    //--- Construction -----------------------------------------------------

    pub fn new(sender: Sender<PlatformEvent>, size: (u32, u32)) -> Self {
        debug!(target: "platform", "Headless platform created ({}x{})", size.0, size.1);
        Self {
            sender,
            script: VecDeque::new(),
            quit_when_exhausted: true,
            quit_sent: false,
            size,
            pumped: 0,
            presented: 0,
            last_frame: None,
        }
    }

    /// One batch per frame, in order.
    pub fn with_script(mut self, batches: impl IntoIterator<Item = Vec<PlatformEvent>>) -> Self {
        self.script.extend(batches);
        self
    }

    /// Keep running with empty frames after the script ends.
    pub fn run_forever(mut self) -> Self {
        self.quit_when_exhausted = false;
        self
    }

    //--- Scripting --------------------------------------------------------

    pub fn push_frame(&mut self, batch: Vec<PlatformEvent>) {
        self.script.push_back(batch);
    }

    pub fn remaining_frames(&self) -> usize {
        self.script.len()
    }

    //--- Inspection -------------------------------------------------------

    pub fn pumped_frames(&self) -> u64 {
        self.pumped
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&DrawList> {
        self.last_frame.as_ref()
    }

    //--- Internal Helpers -------------------------------------------------

    fn send(&self, event: PlatformEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(target: "platform", "Event channel full, dropping {:?}", event);
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(target: "platform", "Event channel disconnected");
            }
        }
    }
}

impl PlatformBackend for HeadlessPlatform {
    fn pump_events(&mut self) {
        self.pumped += 1;

        match self.script.pop_front() {
            Some(batch) => {
                for event in batch {
                    self.send(event);
                }
            }
            None if self.quit_when_exhausted && !self.quit_sent => {
                debug!(target: "platform", "Script exhausted, requesting quit");
                self.quit_sent = true;
                self.send(PlatformEvent::Quit);
            }
            None => {}
        }
    }

    fn present(&mut self, frame: &DrawList) {
        self.presented += 1;
        match self.last_frame.as_mut() {
            Some(last) => last.clone_from(frame),
            None => self.last_frame = Some(frame.clone()),
        }
    }

    fn window_size(&self) -> (u32, u32) {
        self.size
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{InputEvent, KeyCode};
    use crossbeam_channel::bounded;

    fn key(key: KeyCode) -> PlatformEvent {
        InputEvent::KeyDown { key }.into()
    }

    #[test]
    fn replays_one_batch_per_pump() {
        let (tx, rx) = bounded(16);
        let mut platform = HeadlessPlatform::new(tx, (320, 240))
            .with_script(vec![vec![key(KeyCode::KeyA), key(KeyCode::KeyB)], vec![key(KeyCode::KeyC)]]);

        platform.pump_events();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![key(KeyCode::KeyA), key(KeyCode::KeyB)]);

        platform.pump_events();
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![key(KeyCode::KeyC)]);
        assert_eq!(platform.remaining_frames(), 0);
    }

    #[test]
    fn quits_once_when_script_exhausted() {
        let (tx, rx) = bounded(16);
        let mut platform = HeadlessPlatform::new(tx, (320, 240));

        platform.pump_events();
        platform.pump_events();

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![PlatformEvent::Quit]);
        assert_eq!(platform.pumped_frames(), 2);
    }

    #[test]
    fn run_forever_never_quits() {
        let (tx, rx) = bounded(16);
        let mut platform = HeadlessPlatform::new(tx, (320, 240)).run_forever();

        platform.pump_events();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (tx, rx) = bounded(1);
        let mut platform = HeadlessPlatform::new(tx, (320, 240))
            .with_script(vec![vec![key(KeyCode::KeyA), key(KeyCode::KeyB)]]);

        platform.pump_events();

        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn present_keeps_last_frame() {
        let (tx, _rx) = bounded(1);
        let mut platform = HeadlessPlatform::new(tx, (320, 240));
        let mut frame = DrawList::new();
        frame.set_clear_color([1, 2, 3, 255]);

        platform.present(&frame);
        platform.present(&frame);

        assert_eq!(platform.presented_frames(), 2);
        assert_eq!(platform.last_frame().map(DrawList::clear_color), Some([1, 2, 3, 255]));
        assert_eq!(platform.window_size(), (320, 240));
    }
}
