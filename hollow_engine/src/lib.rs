//! Scripted-entity runtime: record-built entities, synchronous message
//! dispatch, and the scene/module lifecycle that drives them.
//!
//! The engine is single-threaded and cooperative. One tick per frame walks
//! the active scene's entities in insertion order; message sends are plain
//! re-entrant function calls, never queued. Script execution and
//! rendering/audio are external collaborators behind the [`host`] traits.

pub mod entity;
pub mod host;
pub mod message;
pub mod module;
pub mod scene;
pub mod vars;

pub use entity::{Behavior, Entity};
pub use host::{ScriptHost, Stage};
pub use message::{EntityId, Message, MessageParam, StateId};
pub use module::{Module, ModuleError, SceneTable, Transit};
pub use scene::{Context, Scene, ScenePhase, SceneView};
pub use vars::VariableStore;
