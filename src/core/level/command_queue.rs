//=========================================================================
// Level Command Queue
//=========================================================================
//
// Queue for level registry commands issued by gameplay code.
//
// Entities push commands here during `update()`. The engine applies them
// at the end of the frame, after present, so the level being updated is
// never swapped or deleted underneath itself.
//
//=========================================================================

//=== LevelCommand ========================================================

/// Level registry operation requested from gameplay code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelCommand {
    /// Makes the named level the active one.
    Activate(String),

    /// Clears and removes the named level.
    Delete(String),
}

//=== LevelCommandQueue ===================================================

/// FIFO of level commands, drained once per frame.
#[derive(Debug, Default)]
pub struct LevelCommandQueue {
    queue: Vec<LevelCommand>,
}

impl LevelCommandQueue {
    /// Creates a new empty command queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a command to be applied at the end of the frame.
    pub fn push(&mut self, command: LevelCommand) {
        self.queue.push(command);
    }

    /// Shorthand for `push(LevelCommand::Activate(name))`.
    pub fn activate(&mut self, name: impl Into<String>) {
        self.push(LevelCommand::Activate(name.into()));
    }

    /// Shorthand for `push(LevelCommand::Delete(name))`.
    pub fn delete(&mut self, name: impl Into<String>) {
        self.push(LevelCommand::Delete(name.into()));
    }

    /// Returns an iterator over the queued commands.
    pub fn iter(&self) -> impl Iterator<Item = &LevelCommand> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear()
    }

    /// Takes all commands from the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<LevelCommand> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
