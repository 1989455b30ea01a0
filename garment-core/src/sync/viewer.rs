//! The 3D mockup: owns the scene, swaps models, and runs the per-frame texture refresh.

use super::{BindingError, BoundModel, LiveSyncProjector, TextureBinding};
use crate::engine::scene::{ModelId, ModelSource, SceneEngine, TextureId};

/// What the model status indicator shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelStatus {
    /// No model requested yet.
    Idle,
    Ready { name: String, meshes: usize },
    /// The last load failed. Whatever was shown before stays shown. Not retried.
    Failed { name: String, reason: String },
}
impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "no model"),
            Self::Ready { name, meshes: 0 } => write!(f, "{name} loaded, nothing to texture"),
            Self::Ready { name, meshes } => write!(f, "{name} loaded, {meshes} meshes mapped"),
            Self::Failed { name, reason } => write!(f, "{name} failed to load: {reason}"),
        }
    }
}

struct Current {
    model: ModelId,
    texture: Option<TextureId>,
}

pub struct MockupViewer<S> {
    scene: S,
    binding: TextureBinding,
    current: Option<Current>,
    status: ModelStatus,
}
impl<S: SceneEngine> MockupViewer<S> {
    #[must_use]
    pub fn new(scene: S, binding: TextureBinding) -> Self {
        Self {
            scene,
            binding,
            current: None,
            status: ModelStatus::Idle,
        }
    }
    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }
    #[must_use]
    pub fn status(&self) -> &ModelStatus {
        &self.status
    }
    #[must_use]
    pub fn model(&self) -> Option<ModelId> {
        self.current.as_ref().map(|current| current.model)
    }
    /// Load a model and replace the current one with it, textured with the front surface.
    ///
    /// The old model's resources are released before the new one is attached. If the new model
    /// can't be loaded the old one stays. If it loads but can't be attached, the old one is
    /// already gone and no model is shown. Either way the status reports the failure.
    pub fn load_model(&mut self, source: &ModelSource, projector: &LiveSyncProjector) -> &ModelStatus {
        let name = source.name().into_owned();
        let model = match self.scene.load(source) {
            Ok(model) => model,
            Err(e) => {
                log::error!("loading model {name}: {e}");
                self.status = ModelStatus::Failed {
                    name,
                    reason: e.to_string(),
                };
                return &self.status;
            }
        };
        if let Some(old) = self.current.take() {
            self.scene.dispose(old.model);
        }
        if let Err(e) = self.scene.attach(model) {
            log::error!("attaching model {name}: {e}");
            self.scene.dispose(model);
            self.status = ModelStatus::Failed {
                name,
                reason: e.to_string(),
            };
            return &self.status;
        }
        let BoundModel { meshes, texture } = projector.bind_model(&mut self.scene, model);
        self.current = Some(Current { model, texture });
        self.status = ModelStatus::Ready { name, meshes };
        &self.status
    }
    /// One animation frame. Uploads the front raster if it changed since the last frame, then renders.
    /// Returns whether a texture upload happened.
    pub fn frame(&mut self) -> Result<bool, BindingError> {
        let mut uploaded = false;
        // Poll even without a texture, so a stale flag doesn't trigger an upload into the next model.
        if let Some(raster) = self.binding.poll()? {
            if let Some(texture) = self.current.as_ref().and_then(|current| current.texture) {
                match self.scene.write_texture(texture, &raster) {
                    Ok(()) => uploaded = true,
                    Err(e) => log::warn!("texture upload failed: {e}"),
                }
            }
        }
        self.scene.render();
        Ok(uploaded)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{
        canvas::HeadlessCanvas,
        scene::{FaultyScene, HeadlessScene, ResourceCounts},
        EditingEngine, Mount,
    };

    fn shirt(meshes: usize) -> ModelSource {
        let nodes: Vec<String> = (0..meshes).map(|_| r#"{"mesh":0}"#.to_owned()).collect();
        ModelSource::Memory {
            name: "shirt.glb".into(),
            bytes: crate::engine::gltf::to_glb(&format!(
                r#"{{"asset":{{"version":"2.0"}},"nodes":[{}],"meshes":[{{"primitives":[{{}}]}}]}}"#,
                nodes.join(",")
            ))
            .into(),
        }
    }
    fn front() -> HeadlessCanvas {
        let mut canvas = HeadlessCanvas::bind(&Mount {
            id: "frontCanvas".into(),
            container_width: 500.0,
            padding: [0.0; 2],
        })
        .unwrap();
        canvas.set_dimensions([500, 700], [500, 700]);
        canvas
    }

    #[test]
    fn swaps_do_not_leak() {
        let mut projector = LiveSyncProjector::new([10, 14]);
        projector.refresh_preview(&front());
        let mut viewer = MockupViewer::new(HeadlessScene::new(), projector.binding());
        for _ in 0..10 {
            let status = viewer.load_model(&shirt(3), &projector).clone();
            assert!(matches!(status, ModelStatus::Ready { meshes: 3, .. }));
        }
        assert_eq!(
            viewer.scene().resources(),
            ResourceCounts {
                models: 1,
                geometries: 3,
                materials: 3,
                textures: 1
            }
        );
        assert_eq!(viewer.scene().attached().len(), 1);
    }
    #[test]
    fn failed_load_keeps_old_model() {
        let projector = LiveSyncProjector::new([10, 14]);
        let mut viewer = MockupViewer::new(HeadlessScene::new(), projector.binding());
        viewer.load_model(&shirt(2), &projector);
        let old = viewer.model();

        let status = viewer
            .load_model(&ModelSource::Path("/missing/tshirt.glb".into()), &projector)
            .clone();
        assert!(matches!(status, ModelStatus::Failed { .. }));
        assert_eq!(viewer.model(), old);
        assert_eq!(viewer.scene().resources().models, 1);
    }
    #[test]
    fn failed_attach_leaves_nothing_behind() {
        let projector = LiveSyncProjector::new([10, 14]);
        let mut viewer = MockupViewer::new(FaultyScene::default(), projector.binding());
        viewer.load_model(&shirt(2), &projector);
        assert!(viewer.model().is_some());

        viewer.scene.refuse_attach = true;
        let status = viewer.load_model(&shirt(3), &projector).clone();
        assert!(matches!(status, ModelStatus::Failed { .. }));
        assert_eq!(viewer.model(), None);
        assert_eq!(viewer.scene().resources(), ResourceCounts::default());
    }
    #[test]
    fn frame_uploads_only_when_dirty() {
        let mut projector = LiveSyncProjector::new([10, 14]);
        let canvas = front();
        projector.refresh_preview(&canvas);
        let mut viewer = MockupViewer::new(HeadlessScene::new(), projector.binding());
        viewer.load_model(&shirt(1), &projector);

        assert_eq!(viewer.frame(), Ok(false));
        projector.mark_texture_dirty();
        projector.refresh_preview(&canvas);
        assert_eq!(viewer.frame(), Ok(true));
        assert_eq!(viewer.frame(), Ok(false));
        assert_eq!(viewer.scene().frames(), 3);
    }
    #[test]
    fn zero_meshes_is_reported() {
        let projector = LiveSyncProjector::default();
        let mut viewer = MockupViewer::new(HeadlessScene::new(), projector.binding());
        let status = viewer.load_model(&shirt(0), &projector);
        assert_eq!(status.to_string(), "shirt.glb loaded, nothing to texture");
    }
}
