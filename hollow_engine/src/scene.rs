use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use hollow_formats::rlst::HotspotRecord;

use crate::entity::Entity;
use crate::host::{ScriptHost, Stage};
use crate::message::{EntityId, Message};
use crate::vars::VariableStore;

/// Everything a hook may touch besides the scene itself: the shared variable
/// store and the external collaborators. One context is built per frame (or
/// per test) and threaded through every call; there is no ambient global
/// state.
pub struct Context<'a> {
    pub vars: &'a mut VariableStore,
    pub scripts: &'a mut dyn ScriptHost,
    pub stage: &'a mut dyn Stage,
}

impl<'a> Context<'a> {
    pub fn new(
        vars: &'a mut VariableStore,
        scripts: &'a mut dyn ScriptHost,
        stage: &'a mut dyn Stage,
    ) -> Self {
        Context {
            vars,
            scripts,
            stage,
        }
    }
}

/// A background image gated by a variable: if the variable's value indexes
/// into `values`, that entry becomes the candidate image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalImage {
    pub var: u32,
    pub values: Vec<u16>,
}

/// Static per-scene view description: the unconditional background plus an
/// ordered list of variable-gated alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneView {
    pub main_image: u16,
    pub conditional_images: Vec<ConditionalImage>,
}

impl SceneView {
    /// Currently active background image. Every conditional entry is scanned
    /// in order and each satisfied one overwrites the selection, so the last
    /// satisfying entry wins. Without conditional entries the main image is
    /// used; with entries but no match, image 0.
    pub fn active_image(&self, vars: &VariableStore) -> u16 {
        if self.conditional_images.is_empty() {
            return self.main_image;
        }
        let mut image = 0;
        for conditional in &self.conditional_images {
            let value = vars.get(conditional.var) as usize;
            if value < conditional.values.len() {
                image = conditional.values[value];
            }
        }
        image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScenePhase {
    Loading,
    Active,
    Leaving,
    Disposed,
}

/// One ownership unit of entities with its own lifecycle.
///
/// Entities live in insertion-order slots; a slot goes vacant when its entity
/// is removed (or temporarily while the entity is being dispatched into), so
/// the scene never holds a dangling reference. Messages are only dispatched
/// while the scene is Active.
pub struct Scene {
    index: u16,
    phase: ScenePhase,
    slots: Vec<Option<Entity>>,
    retired: BTreeSet<usize>,
    view: SceneView,
    hovered: Option<EntityId>,
    leave_result: Option<u32>,
    pending_destination: Option<u16>,
}

impl Scene {
    pub fn new(index: u16, view: SceneView) -> Self {
        Scene {
            index,
            phase: ScenePhase::Loading,
            slots: Vec::new(),
            retired: BTreeSet::new(),
            view,
            hovered: None,
            leave_result: None,
            pending_destination: None,
        }
    }

    /// Build a scene from decoded hotspot records, in record order.
    pub fn from_records(
        index: u16,
        view: SceneView,
        records: Vec<HotspotRecord>,
        shortcut_mode: bool,
    ) -> Self {
        let mut scene = Scene::new(index, view);
        for record in records {
            scene.spawn(Entity::from_record(record, shortcut_mode));
        }
        scene
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn view(&self) -> &SceneView {
        &self.view
    }

    pub fn entity_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index())
            .and_then(|slot| slot.as_mut())
    }

    /// Add an entity (also used for dynamic mid-scene spawns). Slot ids are
    /// never reused within a scene.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len());
        entity.set_id(id);
        self.slots.push(Some(entity));
        id
    }

    /// Remove an entity mid-scene, vacating its slot. Its sub-entities are
    /// destroyed with it. An entity currently checked out for dispatch has
    /// its slot retired instead, so the checkout is dropped rather than
    /// restored when the dispatch call returns.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index())?;
        let entity = slot.take();
        if entity.is_none() {
            self.retired.insert(id.index());
        }
        entity
    }

    /// Advance one frame. The first tick moves Loading to Active; from then
    /// on every entity is updated in insertion order. A leave posted mid-tick
    /// lets the current frame finish; disposal is the module's job.
    pub fn tick(&mut self, ctx: &mut Context) {
        if self.phase == ScenePhase::Loading {
            debug!("scene {} active", self.index);
            self.phase = ScenePhase::Active;
        }
        if self.phase != ScenePhase::Active && self.phase != ScenePhase::Leaving {
            return;
        }
        let mut index = 0;
        while index < self.slots.len() {
            if let Some(mut entity) = self.slots[index].take() {
                entity.tick(ctx, self);
                self.restore(index, entity);
            }
            index += 1;
        }
    }

    /// Draw all enabled entities in insertion order.
    pub fn draw(&mut self, ctx: &mut Context) {
        if self.phase != ScenePhase::Active {
            return;
        }
        let mut index = 0;
        while index < self.slots.len() {
            if let Some(mut entity) = self.slots[index].take() {
                if entity.enabled() {
                    entity.draw(ctx, self);
                }
                self.restore(index, entity);
            }
            index += 1;
        }
    }

    /// Synchronous dispatch to one entity. Re-entrant: the target is moved
    /// out of its slot for the duration of the call, so its handler may
    /// itself send messages through the scene. Returns 0 when unhandled or
    /// undeliverable.
    pub fn send(&mut self, ctx: &mut Context, target: EntityId, message: Message) -> u32 {
        if self.phase != ScenePhase::Active {
            debug!(
                "scene {}: dropping message {:#06x} while {:?}",
                self.index, message.kind, self.phase
            );
            return 0;
        }
        let Some(slot) = self.slots.get_mut(target.index()) else {
            warn!(
                "scene {}: message {:#06x} to unknown entity {}",
                self.index,
                message.kind,
                target.index()
            );
            return 0;
        };
        let Some(mut entity) = slot.take() else {
            warn!(
                "scene {}: message {:#06x} to vacant entity slot {}",
                self.index,
                message.kind,
                target.index()
            );
            return 0;
        };
        let result = entity.handle_message(ctx, self, &message);
        self.restore(target.index(), entity);
        result
    }

    /// Record the terminal leave signal. Only an Active scene can start
    /// leaving; repeats during Leaving are ignored.
    pub fn post_leave(&mut self, result: u32) {
        if self.phase != ScenePhase::Active {
            debug!(
                "scene {}: ignoring leave({result}) while {:?}",
                self.index, self.phase
            );
            return;
        }
        debug!("scene {} leaving with result {result}", self.index);
        self.leave_result = Some(result);
        self.phase = ScenePhase::Leaving;
    }

    /// Result code carried by the leave signal (0 if none was posted).
    pub fn result(&self) -> u32 {
        self.leave_result.unwrap_or(0)
    }

    pub(crate) fn request_destination(&mut self, dest: u16) {
        self.pending_destination = Some(dest);
    }

    pub fn take_destination(&mut self) -> Option<u16> {
        self.pending_destination.take()
    }

    /// Destroy all owned entities in reverse insertion order.
    pub fn dispose(&mut self) {
        if self.phase == ScenePhase::Disposed {
            return;
        }
        debug!("scene {} disposed", self.index);
        while let Some(slot) = self.slots.pop() {
            drop(slot);
        }
        self.retired.clear();
        self.hovered = None;
        self.phase = ScenePhase::Disposed;
    }

    /// First enabled entity whose region contains the point, in insertion
    /// order.
    pub fn hit_test(&self, x: i16, y: i16) -> Option<EntityId> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            let entity = slot.as_ref()?;
            (entity.enabled() && entity.rect.contains(x, y)).then_some(EntityId(index))
        })
    }

    pub fn handle_mouse_down(&mut self, ctx: &mut Context, x: i16, y: i16) {
        if self.phase != ScenePhase::Active {
            return;
        }
        if let Some(id) = self.hit_test(x, y) {
            self.with_entity(id, ctx, |entity, ctx, scene| entity.on_mouse_down(ctx, scene));
        }
    }

    pub fn handle_mouse_up(&mut self, ctx: &mut Context, x: i16, y: i16) {
        if self.phase != ScenePhase::Active {
            return;
        }
        if let Some(id) = self.hit_test(x, y) {
            self.with_entity(id, ctx, |entity, ctx, scene| entity.on_mouse_up(ctx, scene));
        }
    }

    /// Track the hovered entity: a hover change emits leave then enter before
    /// the move hook runs on the new target.
    pub fn handle_mouse_move(&mut self, ctx: &mut Context, x: i16, y: i16) {
        if self.phase != ScenePhase::Active {
            return;
        }
        let hit = self.hit_test(x, y);
        if hit != self.hovered {
            if let Some(old) = self.hovered {
                self.with_entity(old, ctx, |entity, ctx, scene| {
                    entity.on_mouse_leave(ctx, scene)
                });
            }
            if let Some(new) = hit {
                self.with_entity(new, ctx, |entity, ctx, scene| {
                    entity.on_mouse_enter(ctx, scene)
                });
            }
            self.hovered = hit;
        }
        if let Some(id) = hit {
            self.with_entity(id, ctx, |entity, ctx, scene| entity.on_mouse_move(ctx, scene));
        }
    }

    fn with_entity<F>(&mut self, id: EntityId, ctx: &mut Context, f: F)
    where
        F: FnOnce(&mut Entity, &mut Context, &mut Scene),
    {
        if let Some(mut entity) = self.slots.get_mut(id.index()).and_then(|slot| slot.take()) {
            f(&mut entity, ctx, self);
            self.restore(id.index(), entity);
        }
    }

    fn restore(&mut self, index: usize, entity: Entity) {
        if self.retired.remove(&index) {
            return;
        }
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(entity);
            }
        }
    }
}
