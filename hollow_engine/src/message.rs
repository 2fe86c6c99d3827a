use serde::Serialize;

/// Slot index of a top-level scene entity. Stable for the lifetime of the
/// scene; a removed entity leaves a vacant slot behind so later sends to it
/// are detectable rather than dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Reserved message kinds. Content defines its own kinds above
/// [`kind::FIRST_CONTENT`]; the core only interprets the ones below.
pub mod kind {
    /// An animation finished; runs the receiver's pending state, if any.
    pub const ANIMATION_DONE: u32 = 0x0001;
    /// Terminal scene-leave signal; the parameter is the result code handed
    /// to the module's scene table.
    pub const LEAVE_SCENE: u32 = 0x0002;
    /// Lowest kind value available to game content.
    pub const FIRST_CONTENT: u32 = 0x1000;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MessageParam {
    #[default]
    None,
    Int(u32),
    Point(i16, i16),
}

impl MessageParam {
    pub fn as_int(&self) -> u32 {
        match self {
            MessageParam::Int(value) => *value,
            _ => 0,
        }
    }

    pub fn as_point(&self) -> Option<(i16, i16)> {
        match self {
            MessageParam::Point(x, y) => Some((*x, *y)),
            _ => None,
        }
    }
}

/// A transient, synchronous event. Created for one dispatch call and dropped
/// when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub kind: u32,
    pub param: MessageParam,
    pub sender: Option<EntityId>,
}

impl Message {
    pub fn new(kind: u32) -> Self {
        Message {
            kind,
            param: MessageParam::None,
            sender: None,
        }
    }

    pub fn with_param(kind: u32, param: MessageParam) -> Self {
        Message {
            kind,
            param,
            sender: None,
        }
    }

    pub fn from(mut self, sender: EntityId) -> Self {
        self.sender = Some(sender);
        self
    }
}

/// Identifier of an entity's acting state. State zero is the idle default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StateId(pub u16);

/// Built-in state ids understood by the stock behaviors. Content may define
/// further ids; entering an unknown id only records it.
pub mod state {
    use super::StateId;

    pub const IDLE: StateId = StateId(0);
    pub const RUNNING: StateId = StateId(1);
}

/// Per-entity dispatch state: the current acting state, the single pending
/// continuation slot, and the mute flag that models a cleared handler.
///
/// Exactly one acting state is current at any time. Scheduling a next state
/// overwrites any previously scheduled one (last write wins). A muted
/// machine drops every message, including the completion signal that would
/// run the continuation; the dispatcher re-reads this state on every send,
/// so a handler swapped mid-callback takes effect immediately.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: StateId,
    next: Option<StateId>,
    muted: bool,
}

impl StateMachine {
    pub fn current(&self) -> StateId {
        self.current
    }

    pub fn enter(&mut self, state: StateId) {
        self.current = state;
    }

    pub fn schedule_next(&mut self, state: StateId) {
        self.next = Some(state);
    }

    pub fn take_next(&mut self) -> Option<StateId> {
        self.next.take()
    }

    pub fn pending(&self) -> Option<StateId> {
        self.next
    }

    pub fn mute(&mut self) {
        self.muted = true;
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::{state, EntityId, Message, MessageParam, StateId, StateMachine};

    #[test]
    fn scheduling_overwrites_pending_state() {
        let mut machine = StateMachine::default();
        machine.schedule_next(state::RUNNING);
        machine.schedule_next(StateId(9));
        assert_eq!(machine.take_next(), Some(StateId(9)));
        assert_eq!(machine.take_next(), None);
    }

    #[test]
    fn take_next_clears_the_slot() {
        let mut machine = StateMachine::default();
        machine.schedule_next(state::RUNNING);
        assert_eq!(machine.pending(), Some(state::RUNNING));
        machine.take_next();
        assert_eq!(machine.pending(), None);
    }

    #[test]
    fn sender_attaches_through_the_builder() {
        let message = Message::new(0x1000).from(EntityId(3));
        assert_eq!(message.sender, Some(EntityId(3)));
        assert_eq!(Message::new(0x1000).sender, None);
    }

    #[test]
    fn param_accessors_default_safely() {
        let message = Message::with_param(0x1000, MessageParam::Point(3, 4));
        assert_eq!(message.param.as_point(), Some((3, 4)));
        assert_eq!(message.param.as_int(), 0);
        assert_eq!(Message::new(0x1000).param, MessageParam::None);
    }
}
