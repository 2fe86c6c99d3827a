use log::warn;

use hollow_formats::rlst::{
    HotspotPayload, HotspotRecord, Rect, SubImageRecord, NO_IMAGE, NO_VARIABLE,
};

use crate::message::{kind, state, EntityId, Message, StateId, StateMachine};
use crate::scene::{Context, Scene};
use crate::vars::VariableStore;

/// Region participates in shortcut ("zip") navigation.
pub const FLAG_SHORTCUT: u16 = 0x0001;
/// Region reacts to the mouse.
pub const FLAG_HOTSPOT: u16 = 0x0002;
/// Region contributes a drawn overlay.
pub const FLAG_OVERLAY: u16 = 0x0004;

fn compute_enabled(flags: u16, shortcut_mode: bool) -> bool {
    let shortcut = flags & FLAG_SHORTCUT != 0;
    let target = flags & FLAG_HOTSPOT != 0 || flags & FLAG_OVERLAY != 0;
    if shortcut_mode {
        shortcut || target
    } else {
        !shortcut && target
    }
}

/// The variable-indexed selection rule shared by sub-entity routing and
/// sub-image selection.
///
/// A sentinel control variable forwards unconditionally to a sole entry and
/// flags multiple entries as a configuration error. Otherwise a sole entry is
/// gated on the variable being nonzero, and multiple entries are indexed by
/// the variable's value with an out-of-range warning.
fn select_index(control_var: u16, len: usize, vars: &VariableStore, what: &str) -> Option<usize> {
    if control_var == NO_VARIABLE {
        if len == 1 {
            return Some(0);
        }
        if len != 0 {
            warn!("{what}: {len} entries but no control variable");
        }
        return None;
    }
    let value = vars.get(u32::from(control_var)) as usize;
    if len == 1 {
        return (value != 0).then_some(0);
    }
    if len == 0 {
        return None;
    }
    if value < len {
        return Some(value);
    }
    warn!("{what}: variable {control_var} value {value} exceeds {len} entries");
    None
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptPart {
    pub opcodes: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPart {
    pub script: ScriptPart,
    pub file: String,
    pub at: (i16, i16),
    pub looping: bool,
    pub play_blocking: bool,
    pub play_on_scene_change: bool,
    started: bool,
}

#[derive(Debug)]
pub struct SwitchPart {
    pub control_var: u16,
    pub children: Vec<Entity>,
}

impl SwitchPart {
    fn route<F>(&mut self, ctx: &mut Context, scene: &mut Scene, hook: &str, mut f: F)
    where
        F: FnMut(&mut Entity, &mut Context, &mut Scene),
    {
        if let Some(index) = select_index(self.control_var, self.children.len(), ctx.vars, hook) {
            f(&mut self.children[index], ctx, scene);
        }
    }
}

#[derive(Debug)]
pub struct PicturePart {
    pub switch: SwitchPart,
    pub image_var: u16,
    pub images: Vec<SubImageRecord>,
}

impl PicturePart {
    fn draw(&mut self, ctx: &mut Context, scene: &mut Scene, dst: Rect) {
        self.switch
            .route(ctx, scene, "draw", |entity, ctx, scene| entity.draw(ctx, scene));

        if let Some(index) = select_index(self.image_var, self.images.len(), ctx.vars, "sub-image")
        {
            let sub = self.images[index];
            let image = if sub.image == NO_IMAGE {
                // Fall through to whatever background the scene shows.
                scene.view().active_image(ctx.vars)
            } else {
                sub.image
            };
            ctx.stage.draw_frame(image, sub.rect, dst);
        }
    }
}

#[derive(Debug)]
pub struct DragPart {
    pub picture: PicturePart,
    pub down_opcode: u16,
    pub drag_opcode: u16,
    pub up_opcode: u16,
    pressed: bool,
}

#[derive(Debug)]
pub struct CyclePart {
    pub picture: PicturePart,
    pub frame_count: u16,
    pub first_frame: u16,
    pub frame_rect: Rect,
    current_frame: u16,
    running: bool,
}

/// Closed set of entity behaviors, one per record kind.
#[derive(Debug)]
pub enum Behavior {
    Forward,
    Script(ScriptPart),
    Video(VideoPart),
    Switch(SwitchPart),
    Picture(PicturePart),
    Slider(DragPart),
    Drag(DragPart),
    Cycle(CyclePart),
    Boundary { enter_opcode: u16, leave_opcode: u16 },
}

impl Behavior {
    fn from_payload(payload: HotspotPayload, shortcut_mode: bool) -> Behavior {
        match payload {
            HotspotPayload::Forward => Behavior::Forward,
            HotspotPayload::Script(script) => Behavior::Script(ScriptPart {
                opcodes: script.opcodes,
            }),
            HotspotPayload::Video(video) => Behavior::Video(VideoPart {
                script: ScriptPart {
                    opcodes: video.script.opcodes,
                },
                file: video.file,
                at: (video.left as i16, video.top as i16),
                looping: video.looping,
                play_blocking: video.play_blocking,
                play_on_scene_change: video.play_on_scene_change,
                started: false,
            }),
            HotspotPayload::Switch(switch) => {
                Behavior::Switch(build_switch(switch, shortcut_mode))
            }
            HotspotPayload::Picture(picture) => {
                Behavior::Picture(build_picture(picture, shortcut_mode))
            }
            HotspotPayload::Slider(drag) => Behavior::Slider(build_drag(drag, shortcut_mode)),
            HotspotPayload::Drag(drag) => Behavior::Drag(build_drag(drag, shortcut_mode)),
            HotspotPayload::Cycle(cycle) => Behavior::Cycle(CyclePart {
                picture: build_picture(cycle.picture, shortcut_mode),
                frame_count: cycle.frame_count,
                first_frame: cycle.first_frame,
                frame_rect: cycle.frame_rect,
                current_frame: cycle.first_frame,
                running: false,
            }),
            HotspotPayload::Boundary {
                enter_opcode,
                leave_opcode,
            } => Behavior::Boundary {
                enter_opcode,
                leave_opcode,
            },
        }
    }
}

fn build_switch(record: hollow_formats::rlst::SwitchRecord, shortcut_mode: bool) -> SwitchPart {
    SwitchPart {
        control_var: record.control_var,
        children: record
            .children
            .into_iter()
            .map(|child| Entity::from_record(child, shortcut_mode))
            .collect(),
    }
}

fn build_picture(record: hollow_formats::rlst::PictureRecord, shortcut_mode: bool) -> PicturePart {
    PicturePart {
        switch: build_switch(record.switch, shortcut_mode),
        image_var: record.image_var,
        images: record.images,
    }
}

fn build_drag(record: hollow_formats::rlst::DragRecord, shortcut_mode: bool) -> DragPart {
    DragPart {
        picture: build_picture(record.picture, shortcut_mode),
        down_opcode: record.down_opcode,
        drag_opcode: record.drag_opcode,
        up_opcode: record.up_opcode,
        pressed: false,
    }
}

/// A runtime participant in dispatch and per-tick update. Owns its
/// sub-entities exclusively; destroying an entity destroys them with it.
#[derive(Debug)]
pub struct Entity {
    id: Option<EntityId>,
    pub flags: u16,
    pub rect: Rect,
    pub dest: u16,
    enabled: bool,
    pub behavior: Behavior,
    state: StateMachine,
}

impl Entity {
    pub fn from_record(record: HotspotRecord, shortcut_mode: bool) -> Entity {
        Entity {
            id: None,
            flags: record.region.flags,
            rect: record.region.rect,
            dest: record.region.dest,
            enabled: compute_enabled(record.region.flags, shortcut_mode),
            behavior: Behavior::from_payload(record.payload, shortcut_mode),
            state: StateMachine::default(),
        }
    }

    /// Programmatic constructor for dynamically spawned entities.
    pub fn new(rect: Rect, dest: u16, behavior: Behavior) -> Entity {
        Entity {
            id: None,
            flags: FLAG_HOTSPOT,
            rect,
            dest,
            enabled: true,
            behavior,
            state: StateMachine::default(),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn current_state(&self) -> StateId {
        self.state.current()
    }

    pub fn pending_state(&self) -> Option<StateId> {
        self.state.pending()
    }

    /// Schedule the state entered on the next animation-done message.
    /// At most one is pending; the last write wins.
    pub fn schedule_next_state(&mut self, next: StateId) {
        self.state.schedule_next(next);
    }

    /// Stop reacting to messages entirely (cleared-handler analogue).
    pub fn mute(&mut self) {
        self.state.mute();
    }

    pub fn unmute(&mut self) {
        self.state.unmute();
    }

    /// Re-arm a video so the next tick starts playback again.
    pub fn reset_playback(&mut self) {
        if let Behavior::Video(video) = &mut self.behavior {
            video.started = false;
        }
    }

    pub fn cycle_running(&self) -> Option<bool> {
        match &self.behavior {
            Behavior::Cycle(cycle) => Some(cycle.running),
            _ => None,
        }
    }

    pub fn cycle_frame(&self) -> Option<u16> {
        match &self.behavior {
            Behavior::Cycle(cycle) => Some(cycle.current_frame),
            _ => None,
        }
    }

    fn routing_switch(&mut self) -> Option<&mut SwitchPart> {
        match &mut self.behavior {
            Behavior::Switch(switch) => Some(switch),
            Behavior::Picture(picture) => Some(&mut picture.switch),
            Behavior::Slider(drag) | Behavior::Drag(drag) => Some(&mut drag.picture.switch),
            Behavior::Cycle(cycle) => Some(&mut cycle.picture.switch),
            _ => None,
        }
    }

    pub fn draw(&mut self, ctx: &mut Context, scene: &mut Scene) {
        let dst = self.rect;
        match &mut self.behavior {
            Behavior::Switch(switch) => {
                switch.route(ctx, scene, "draw", |entity, ctx, scene| {
                    entity.draw(ctx, scene)
                });
            }
            Behavior::Picture(picture) => picture.draw(ctx, scene, dst),
            Behavior::Slider(drag) | Behavior::Drag(drag) => {
                drag.picture.draw(ctx, scene, dst)
            }
            Behavior::Cycle(cycle) => cycle.picture.draw(ctx, scene, dst),
            _ => {}
        }
    }

    /// Per-frame update. Videos start playback exactly once until reset;
    /// cycles draw and advance one frame, then deliver the animation-done
    /// message to themselves when the run completes.
    pub fn tick(&mut self, ctx: &mut Context, scene: &mut Scene) {
        let mut finished = false;
        match &mut self.behavior {
            Behavior::Video(video) => {
                if !video.started {
                    ctx.stage.play_movie(
                        &video.file,
                        video.at,
                        video.looping,
                        video.play_blocking,
                    );
                    video.started = true;
                }
            }
            Behavior::Cycle(cycle) => {
                if cycle.running {
                    // Full-frame blit: the frame rect serves as both source
                    // and destination.
                    ctx.stage
                        .draw_frame(cycle.current_frame, cycle.frame_rect, cycle.frame_rect);
                    // Frame ids may sit near the top of the u16 range.
                    cycle.current_frame = cycle.current_frame.wrapping_add(1);
                    if cycle.current_frame.wrapping_sub(cycle.first_frame) >= cycle.frame_count {
                        cycle.running = false;
                        finished = true;
                    }
                }
            }
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "tick", |entity, ctx, scene| {
                        entity.tick(ctx, scene)
                    });
                }
            }
        }
        if finished {
            let mut message = Message::new(kind::ANIMATION_DONE);
            if let Some(id) = self.id {
                message = message.from(id);
            }
            self.handle_message(ctx, scene, &message);
        }
    }

    pub fn on_mouse_down(&mut self, ctx: &mut Context, scene: &mut Scene) {
        match &mut self.behavior {
            Behavior::Slider(drag) | Behavior::Drag(drag) => {
                drag.pressed = true;
                ctx.scripts.run_opcode(ctx.vars, drag.down_opcode);
            }
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "mouse-down", |entity, ctx, scene| {
                        entity.on_mouse_down(ctx, scene)
                    });
                }
            }
        }
    }

    pub fn on_mouse_up(&mut self, ctx: &mut Context, scene: &mut Scene) {
        let id = self.id;
        let rect = self.rect;
        let dest = self.dest;
        match &mut self.behavior {
            Behavior::Forward => {
                if dest != 0 {
                    scene.request_destination(dest);
                } else {
                    warn!(
                        "movement region with null destination at ({}, {}), ({}, {})",
                        rect.left, rect.top, rect.right, rect.bottom
                    );
                }
            }
            Behavior::Script(script) => {
                ctx.scripts.run_script(ctx.vars, &script.opcodes, id);
            }
            Behavior::Video(video) => {
                ctx.scripts.run_script(ctx.vars, &video.script.opcodes, id);
            }
            Behavior::Slider(drag) | Behavior::Drag(drag) => {
                // Pressed state clears before the up opcode runs.
                drag.pressed = false;
                ctx.scripts.run_opcode(ctx.vars, drag.up_opcode);
            }
            Behavior::Cycle(cycle) => {
                // Re-triggering mid-cycle restarts from the first frame.
                cycle.current_frame = cycle.first_frame;
                cycle.running = true;
            }
            // Boundaries ignore clicks; this overrides the destination default.
            Behavior::Boundary { .. } => {}
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "mouse-up", |entity, ctx, scene| {
                        entity.on_mouse_up(ctx, scene)
                    });
                }
            }
        }
    }

    pub fn on_mouse_move(&mut self, ctx: &mut Context, scene: &mut Scene) {
        match &mut self.behavior {
            Behavior::Slider(drag) | Behavior::Drag(drag) => {
                if drag.pressed {
                    ctx.scripts.run_opcode(ctx.vars, drag.drag_opcode);
                }
            }
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "mouse-move", |entity, ctx, scene| {
                        entity.on_mouse_move(ctx, scene)
                    });
                }
            }
        }
    }

    pub fn on_mouse_enter(&mut self, ctx: &mut Context, scene: &mut Scene) {
        match &mut self.behavior {
            Behavior::Boundary { enter_opcode, .. } => {
                let opcode = *enter_opcode;
                ctx.scripts.run_opcode(ctx.vars, opcode);
            }
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "mouse-enter", |entity, ctx, scene| {
                        entity.on_mouse_enter(ctx, scene)
                    });
                }
            }
        }
    }

    pub fn on_mouse_leave(&mut self, ctx: &mut Context, scene: &mut Scene) {
        match &mut self.behavior {
            Behavior::Boundary { leave_opcode, .. } => {
                let opcode = *leave_opcode;
                ctx.scripts.run_opcode(ctx.vars, opcode);
            }
            _ => {
                if let Some(switch) = self.routing_switch() {
                    switch.route(ctx, scene, "mouse-leave", |entity, ctx, scene| {
                        entity.on_mouse_leave(ctx, scene)
                    });
                }
            }
        }
    }

    /// Synchronous message entry point. The state machine is consulted fresh
    /// on every call, so muting or swapping state from inside a handler takes
    /// effect for the very next dispatch.
    pub fn handle_message(
        &mut self,
        _ctx: &mut Context,
        scene: &mut Scene,
        message: &Message,
    ) -> u32 {
        if self.state.is_muted() {
            return 0;
        }
        match message.kind {
            kind::ANIMATION_DONE => {
                if let Some(next) = self.state.take_next() {
                    self.enter_state(next);
                }
                0
            }
            kind::LEAVE_SCENE => {
                scene.post_leave(message.param.as_int());
                1
            }
            _ => 0,
        }
    }

    fn enter_state(&mut self, next: StateId) {
        self.state.enter(next);
        if let Behavior::Cycle(cycle) = &mut self.behavior {
            match next {
                state::RUNNING => {
                    cycle.current_frame = cycle.first_frame;
                    cycle.running = true;
                }
                state::IDLE => cycle.running = false,
                _ => {}
            }
        }
    }
}
