use log::debug;
use thiserror::Error;

use crate::scene::{Context, Scene, ScenePhase};

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module has no scene with index {0}")]
    UnknownScene(u16),
    #[error("failed to construct scene {index}")]
    SceneBuild {
        index: u16,
        #[source]
        source: anyhow::Error,
    },
}

/// Where to go once a scene finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    /// Construct this scene next.
    Scene(u16),
    /// The module itself is done; hand the result to whoever owns it.
    Leave(u32),
}

/// Content-specific scene wiring: how to construct a scene and which scene
/// (or module exit) follows a given scene/result pair. The table is the only
/// place that knows concrete scene content.
pub trait SceneTable {
    /// Build the scene with the given index. `entry` tells the scene which
    /// way it is being entered (-1 for restored/default).
    fn build(&mut self, scene: u16, entry: i32) -> Result<Scene, ModuleError>;

    /// Select the follow-up for a scene that left with `result`.
    fn next(&mut self, scene: u16, result: u32) -> Transit;
}

/// Owns the active scene and drives transitions. A scene that posted its
/// leave signal finishes its current frame, is disposed, and the table picks
/// the successor; an unknown scene index is fatal (corrupt save state or a
/// content bug).
pub struct Module<T: SceneTable> {
    table: T,
    scene: Scene,
    current: u16,
    outcome: Option<u32>,
}

impl<T: SceneTable> Module<T> {
    pub fn new(mut table: T, first_scene: u16, entry: i32) -> Result<Self, ModuleError> {
        let scene = table.build(first_scene, entry)?;
        Ok(Module {
            table,
            scene,
            current: first_scene,
            outcome: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn current_scene(&self) -> u16 {
        self.current
    }

    /// Result code of a finished module, once every scene has run its course.
    pub fn finished(&self) -> Option<u32> {
        self.outcome
    }

    /// Drive one frame: tick the active scene, then apply at most one
    /// transition (a requested destination or a completed leave).
    pub fn update(&mut self, ctx: &mut Context) -> Result<(), ModuleError> {
        if self.outcome.is_some() {
            return Ok(());
        }

        self.scene.tick(ctx);

        if let Some(dest) = self.scene.take_destination() {
            debug!("scene {} jumps to {dest}", self.current);
            self.scene.dispose();
            self.scene = self.table.build(dest, -1)?;
            self.current = dest;
            return Ok(());
        }

        if self.scene.phase() == ScenePhase::Leaving {
            let result = self.scene.result();
            self.scene.dispose();
            match self.table.next(self.current, result) {
                Transit::Scene(next) => {
                    debug!(
                        "scene {} left with {result}, entering scene {next}",
                        self.current
                    );
                    self.scene = self.table.build(next, result as i32)?;
                    self.current = next;
                }
                Transit::Leave(code) => {
                    debug!("module finished with result {code}");
                    self.outcome = Some(code);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{RecordingScriptHost, RecordingStage};
    use crate::scene::SceneView;
    use crate::vars::VariableStore;

    /// Two scenes: scene 0 leads to scene 1, scene 1 with result 1 exits the
    /// module, any other result returns to scene 0.
    struct TwoSceneTable;

    impl SceneTable for TwoSceneTable {
        fn build(&mut self, scene: u16, _entry: i32) -> Result<Scene, ModuleError> {
            match scene {
                0 | 1 => Ok(Scene::new(scene, SceneView::default())),
                other => Err(ModuleError::UnknownScene(other)),
            }
        }

        fn next(&mut self, scene: u16, result: u32) -> Transit {
            match (scene, result) {
                (0, _) => Transit::Scene(1),
                (1, 1) => Transit::Leave(7),
                (1, _) => Transit::Scene(0),
                _ => Transit::Leave(0),
            }
        }
    }

    #[test]
    fn unknown_scene_index_is_fatal() {
        let error = Module::new(TwoSceneTable, 9, -1).err().expect("must fail");
        assert!(matches!(error, ModuleError::UnknownScene(9)));
    }

    #[test]
    fn leave_chain_walks_the_table() {
        let mut vars = VariableStore::new();
        let mut scripts = RecordingScriptHost::new();
        let mut stage = RecordingStage::new();
        let mut ctx = Context::new(&mut vars, &mut scripts, &mut stage);

        let mut module = Module::new(TwoSceneTable, 0, 0).expect("module");
        assert_eq!(module.current_scene(), 0);

        module.update(&mut ctx).expect("tick");
        module.scene_mut().post_leave(0);
        module.update(&mut ctx).expect("transition");
        assert_eq!(module.current_scene(), 1);
        assert_eq!(module.scene().phase(), ScenePhase::Loading);

        module.update(&mut ctx).expect("tick");
        module.scene_mut().post_leave(1);
        module.update(&mut ctx).expect("transition");
        assert_eq!(module.finished(), Some(7));

        // Further updates are inert once the module finished.
        module.update(&mut ctx).expect("noop");
        assert_eq!(module.finished(), Some(7));
    }

    #[test]
    fn destination_requests_jump_scenes_directly() {
        let mut vars = VariableStore::new();
        let mut scripts = RecordingScriptHost::new();
        let mut stage = RecordingStage::new();
        let mut ctx = Context::new(&mut vars, &mut scripts, &mut stage);

        let mut module = Module::new(TwoSceneTable, 0, 0).expect("module");
        module.update(&mut ctx).expect("tick");
        module.scene_mut().request_destination(1);
        module.update(&mut ctx).expect("jump");
        assert_eq!(module.current_scene(), 1);
    }
}
