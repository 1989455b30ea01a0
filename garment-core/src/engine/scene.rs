//! The 3D engine contract, and a headless implementation that keeps books on GPU-side resources.

use hashbrown::HashMap;

pub enum Model {}
pub enum Mesh {}
pub enum Texture {}
pub type ModelId = crate::StudioID<Model>;
pub type MeshId = crate::StudioID<Mesh>;
pub type TextureId = crate::StudioID<Texture>;

/// Where a 3D asset comes from.
#[derive(Clone, Debug)]
pub enum ModelSource {
    Path(std::path::PathBuf),
    /// A file the user handed over directly (drag-and-drop, file picker).
    Memory {
        name: String,
        bytes: std::sync::Arc<[u8]>,
    },
}
impl ModelSource {
    #[must_use]
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Path(path) => path.to_string_lossy(),
            Self::Memory { name, .. } => name.as_str().into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("reading {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Gltf(#[from] super::gltf::GltfError),
    #[error("no model {0}")]
    UnknownModel(ModelId),
    #[error("no mesh {0}")]
    UnknownMesh(MeshId),
    #[error("no texture {0}")]
    UnknownTexture(TextureId),
}

/// Live resource counts, to check that nothing outlives its model.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub models: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

/// What this crate needs from a 3D engine.
pub trait SceneEngine {
    /// Load and parse an asset. The model is not visible until [`Self::attach`]ed.
    fn load(&mut self, source: &ModelSource) -> Result<ModelId, SceneError>;
    /// Every mesh node in the model, in traversal order.
    fn meshes(&self, model: ModelId) -> Result<smallvec::SmallVec<[MeshId; 4]>, SceneError>;
    /// Allocate a texture initialized from a raster.
    fn create_texture(&mut self, raster: &image::RgbaImage) -> TextureId;
    /// Upload new contents into an existing texture.
    fn write_texture(
        &mut self,
        texture: TextureId,
        raster: &image::RgbaImage,
    ) -> Result<(), SceneError>;
    /// Replace the mesh's material with a clone of it using `texture` as its color map.
    /// The texture becomes owned by the mesh's model.
    fn map_texture(&mut self, mesh: MeshId, texture: TextureId) -> Result<(), SceneError>;
    /// Release a texture no mesh took ownership of.
    fn drop_texture(&mut self, texture: TextureId);
    fn attach(&mut self, model: ModelId) -> Result<(), SceneError>;
    /// Detach and release every geometry, material and texture belonging to the model.
    fn dispose(&mut self, model: ModelId);
    /// Draw one frame.
    fn render(&mut self);
    fn resources(&self) -> ResourceCounts;
}

struct LoadedModel {
    name: String,
    meshes: smallvec::SmallVec<[MeshId; 4]>,
    attached: bool,
}
struct MeshState {
    model: ModelId,
    map: Option<TextureId>,
}
struct TextureState {
    size: [u32; 2],
    uploads: u64,
    owner: Option<ModelId>,
}

/// A [`SceneEngine`] that draws nothing, but tracks everything a real one would allocate.
#[derive(Default)]
pub struct HeadlessScene {
    models: HashMap<ModelId, LoadedModel>,
    meshes: HashMap<MeshId, MeshState>,
    textures: HashMap<TextureId, TextureState>,
    frames: u64,
}
impl HeadlessScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
    /// How many times a texture has been written, including creation.
    #[must_use]
    pub fn uploads(&self, texture: TextureId) -> Option<u64> {
        self.textures.get(&texture).map(|t| t.uploads)
    }
    #[must_use]
    pub fn texture_size(&self, texture: TextureId) -> Option<[u32; 2]> {
        self.textures.get(&texture).map(|t| t.size)
    }
    /// The texture currently mapped onto a mesh, if any.
    #[must_use]
    pub fn mesh_map(&self, mesh: MeshId) -> Option<TextureId> {
        self.meshes.get(&mesh)?.map
    }
    #[must_use]
    pub fn attached(&self) -> Vec<&str> {
        self.models
            .values()
            .filter(|model| model.attached)
            .map(|model| model.name.as_str())
            .collect()
    }
}
impl SceneEngine for HeadlessScene {
    fn load(&mut self, source: &ModelSource) -> Result<ModelId, SceneError> {
        let nodes = match source {
            ModelSource::Path(path) => {
                let bytes = std::fs::read(path).map_err(|source| SceneError::Io {
                    path: path.clone(),
                    source,
                })?;
                super::gltf::mesh_nodes(&bytes)?
            }
            ModelSource::Memory { bytes, .. } => super::gltf::mesh_nodes(bytes)?,
        };
        let id = ModelId::fresh();
        let meshes = nodes
            .iter()
            .map(|node| {
                let mesh = MeshId::fresh();
                log::trace!("{id}: mesh node {:?} as {mesh}", node.name);
                self.meshes.insert(
                    mesh,
                    MeshState {
                        model: id,
                        map: None,
                    },
                );
                mesh
            })
            .collect();
        self.models.insert(
            id,
            LoadedModel {
                name: source.name().into_owned(),
                meshes,
                attached: false,
            },
        );
        Ok(id)
    }
    fn meshes(&self, model: ModelId) -> Result<smallvec::SmallVec<[MeshId; 4]>, SceneError> {
        self.models
            .get(&model)
            .map(|model| model.meshes.clone())
            .ok_or(SceneError::UnknownModel(model))
    }
    fn create_texture(&mut self, raster: &image::RgbaImage) -> TextureId {
        let id = TextureId::fresh();
        self.textures.insert(
            id,
            TextureState {
                size: [raster.width(), raster.height()],
                uploads: 1,
                owner: None,
            },
        );
        id
    }
    fn write_texture(
        &mut self,
        texture: TextureId,
        raster: &image::RgbaImage,
    ) -> Result<(), SceneError> {
        let state = self
            .textures
            .get_mut(&texture)
            .ok_or(SceneError::UnknownTexture(texture))?;
        state.size = [raster.width(), raster.height()];
        state.uploads += 1;
        Ok(())
    }
    fn map_texture(&mut self, mesh: MeshId, texture: TextureId) -> Result<(), SceneError> {
        let mesh_state = self
            .meshes
            .get_mut(&mesh)
            .ok_or(SceneError::UnknownMesh(mesh))?;
        let texture_state = self
            .textures
            .get_mut(&texture)
            .ok_or(SceneError::UnknownTexture(texture))?;
        texture_state.owner = Some(mesh_state.model);
        mesh_state.map = Some(texture);
        Ok(())
    }
    fn drop_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_none() {
            log::warn!("dropping unknown {texture}");
        }
    }
    fn attach(&mut self, model: ModelId) -> Result<(), SceneError> {
        self.models
            .get_mut(&model)
            .ok_or(SceneError::UnknownModel(model))?
            .attached = true;
        Ok(())
    }
    fn dispose(&mut self, model: ModelId) {
        let Some(removed) = self.models.remove(&model) else {
            return;
        };
        for mesh in &removed.meshes {
            self.meshes.remove(mesh);
        }
        self.textures.retain(|_, texture| texture.owner != Some(model));
        log::debug!("disposed {model} ({})", removed.name);
    }
    fn render(&mut self) {
        self.frames += 1;
    }
    fn resources(&self) -> ResourceCounts {
        ResourceCounts {
            models: self.models.len(),
            // One geometry and one material per mesh node.
            geometries: self.meshes.len(),
            materials: self.meshes.len(),
            textures: self.textures.len(),
        }
    }
}

/// A [`HeadlessScene`] that can be told to refuse attaching models or mapping textures.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct FaultyScene {
    pub inner: HeadlessScene,
    pub refuse_attach: bool,
    pub refuse_map: bool,
}
#[cfg(test)]
impl SceneEngine for FaultyScene {
    fn load(&mut self, source: &ModelSource) -> Result<ModelId, SceneError> {
        self.inner.load(source)
    }
    fn meshes(&self, model: ModelId) -> Result<smallvec::SmallVec<[MeshId; 4]>, SceneError> {
        self.inner.meshes(model)
    }
    fn create_texture(&mut self, raster: &image::RgbaImage) -> TextureId {
        self.inner.create_texture(raster)
    }
    fn write_texture(
        &mut self,
        texture: TextureId,
        raster: &image::RgbaImage,
    ) -> Result<(), SceneError> {
        self.inner.write_texture(texture, raster)
    }
    fn map_texture(&mut self, mesh: MeshId, texture: TextureId) -> Result<(), SceneError> {
        if self.refuse_map {
            return Err(SceneError::UnknownMesh(mesh));
        }
        self.inner.map_texture(mesh, texture)
    }
    fn drop_texture(&mut self, texture: TextureId) {
        self.inner.drop_texture(texture);
    }
    fn attach(&mut self, model: ModelId) -> Result<(), SceneError> {
        if self.refuse_attach {
            return Err(SceneError::UnknownModel(model));
        }
        self.inner.attach(model)
    }
    fn dispose(&mut self, model: ModelId) {
        self.inner.dispose(model);
    }
    fn render(&mut self) {
        self.inner.render();
    }
    fn resources(&self) -> ResourceCounts {
        self.inner.resources()
    }
}
