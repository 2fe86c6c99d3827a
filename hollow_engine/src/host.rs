use std::{cell::RefCell, rc::Rc};

use serde::Serialize;

use hollow_formats::rlst::Rect;

use crate::message::EntityId;
use crate::vars::VariableStore;

/// Executes opcodes and compiled scripts on behalf of entities. The core
/// treats both as opaque; only the variable store is shared with it.
pub trait ScriptHost {
    fn run_opcode(&mut self, vars: &mut VariableStore, opcode: u16);
    fn run_script(&mut self, vars: &mut VariableStore, opcodes: &[u16], invoker: Option<EntityId>);
}

/// Rendering/audio collaborator. Calls are fire-and-forget; the dispatch
/// core never consumes their results.
pub trait Stage {
    fn draw_frame(&mut self, image: u16, src: Rect, dst: Rect);
    fn play_movie(&mut self, file: &str, at: (i16, i16), looping: bool, blocking: bool);
    fn play_sound(&mut self, cue: u32);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageEvent {
    DrawFrame { image: u16, src: Rect, dst: Rect },
    PlayMovie {
        file: String,
        at: (i16, i16),
        looping: bool,
        blocking: bool,
    },
    PlaySound { cue: u32 },
}

/// Stage implementation that records every call, for tests and for the host
/// binary's event reports.
#[derive(Clone, Default)]
pub struct RecordingStage {
    events: Rc<RefCell<Vec<StageEvent>>>,
}

impl RecordingStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StageEvent> {
        self.events.borrow().clone()
    }
}

impl Stage for RecordingStage {
    fn draw_frame(&mut self, image: u16, src: Rect, dst: Rect) {
        self.events
            .borrow_mut()
            .push(StageEvent::DrawFrame { image, src, dst });
    }

    fn play_movie(&mut self, file: &str, at: (i16, i16), looping: bool, blocking: bool) {
        self.events.borrow_mut().push(StageEvent::PlayMovie {
            file: file.to_string(),
            at,
            looping,
            blocking,
        });
    }

    fn play_sound(&mut self, cue: u32) {
        self.events.borrow_mut().push(StageEvent::PlaySound { cue });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Opcode { opcode: u16 },
    Script {
        opcodes: Vec<u16>,
        invoker: Option<EntityId>,
    },
}

/// Script host that records invocations without interpreting them.
#[derive(Clone, Default)]
pub struct RecordingScriptHost {
    events: Rc<RefCell<Vec<ScriptEvent>>>,
}

impl RecordingScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScriptEvent> {
        self.events.borrow().clone()
    }
}

impl ScriptHost for RecordingScriptHost {
    fn run_opcode(&mut self, _vars: &mut VariableStore, opcode: u16) {
        self.events.borrow_mut().push(ScriptEvent::Opcode { opcode });
    }

    fn run_script(
        &mut self,
        _vars: &mut VariableStore,
        opcodes: &[u16],
        invoker: Option<EntityId>,
    ) {
        self.events.borrow_mut().push(ScriptEvent::Script {
            opcodes: opcodes.to_vec(),
            invoker,
        });
    }
}
