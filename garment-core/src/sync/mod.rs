//! # Live sync
//!
//! Projects the front surface onto everything that shows it outside the editor: the flat preview
//! (also used by the order summary and cart) and the texture on the 3D mockup.
//!
//! The 2D side never drives the 3D side. The projector only sets a dirty bit next to its latest raster;
//! the 3D render loop holds a [`TextureBinding`] and polls it once per frame, uploading when dirty.
//! The binding is weak, so a 3D viewer that outlives its projector sees [`BindingError::ProjectorGone`]
//! instead of keeping the raster alive.

pub mod viewer;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};

use crate::engine::{
    scene::{ModelId, SceneEngine, TextureId},
    EditingEngine,
};

/// Resolution the front surface is rasterized at for previews and textures.
pub const PREVIEW_SIZE: [u32; 2] = [500, 700];

struct Shared {
    dirty: AtomicBool,
    raster: parking_lot::RwLock<Option<Arc<image::RgbaImage>>>,
}

/// The most recent successful rasterization of the front surface.
#[derive(Clone)]
pub struct Preview {
    pub raster: Arc<image::RgbaImage>,
    /// PNG data URL, for the preview widget, order summary and cart lines.
    pub data_url: Arc<str>,
    /// Counts successful refreshes, starting at 1.
    pub generation: u64,
}

/// Outcome of binding a model to the front surface's raster.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundModel {
    /// Meshes now textured with the front surface. Zero is a valid outcome.
    pub meshes: usize,
    /// The texture carrying the raster, if any mesh was bound.
    pub texture: Option<TextureId>,
}

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("projector no longer exists")]
    ProjectorGone,
}

pub struct LiveSyncProjector {
    shared: Arc<Shared>,
    size: [u32; 2],
    preview: Option<Preview>,
    generation: u64,
}
impl Default for LiveSyncProjector {
    fn default() -> Self {
        Self::new(PREVIEW_SIZE)
    }
}
impl LiveSyncProjector {
    #[must_use]
    pub fn new(size: [u32; 2]) -> Self {
        Self {
            shared: Arc::new(Shared {
                dirty: AtomicBool::new(false),
                raster: parking_lot::RwLock::new(None),
            }),
            size,
            preview: None,
            generation: 0,
        }
    }
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        self.size
    }
    /// Hand out a handle for the 3D render loop to poll.
    #[must_use]
    pub fn binding(&self) -> TextureBinding {
        TextureBinding {
            shared: Arc::downgrade(&self.shared),
        }
    }
    #[must_use]
    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }
    /// Flag the 3D texture as stale. Uploading is left to the render loop.
    pub fn mark_texture_dirty(&self) {
        self.shared.dirty.store(true, Ordering::Release);
    }
    #[must_use]
    pub fn is_texture_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }
    /// Rasterize the front surface into the preview.
    ///
    /// Never fails outright: on error the previous preview stays in place and `false` is returned.
    pub fn refresh_preview<E: EditingEngine>(&mut self, front: &E) -> bool {
        let raster = match front.rasterize(self.size) {
            Ok(raster) => Arc::new(raster),
            Err(e) => {
                log::warn!("preview not refreshed: {e}");
                return false;
            }
        };
        let data_url = match crate::data_url::encode_png(&raster) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("preview not encoded: {e}");
                return false;
            }
        };
        self.generation += 1;
        *self.shared.raster.write() = Some(raster.clone());
        self.preview = Some(Preview {
            raster,
            data_url: data_url.into(),
            generation: self.generation,
        });
        true
    }
    /// Texture every mesh of `model` with the front surface's raster.
    ///
    /// Each mesh gets its own clone of its material, mapped to one shared texture. Meshes that refuse
    /// are logged and skipped.
    pub fn bind_model<S: SceneEngine>(&self, scene: &mut S, model: ModelId) -> BoundModel {
        let meshes = match scene.meshes(model) {
            Ok(meshes) => meshes,
            Err(e) => {
                log::warn!("can't bind {model}: {e}");
                return BoundModel {
                    meshes: 0,
                    texture: None,
                };
            }
        };
        if meshes.is_empty() {
            log::info!("{model} loaded, nothing to texture");
            return BoundModel {
                meshes: 0,
                texture: None,
            };
        }
        let texture = {
            let raster = self.shared.raster.read();
            match raster.as_deref() {
                Some(raster) => scene.create_texture(raster),
                None => {
                    let [w, h] = self.size;
                    scene.create_texture(&image::RgbaImage::from_pixel(
                        w.max(1),
                        h.max(1),
                        image::Rgba(crate::color::Color::WHITE.0),
                    ))
                }
            }
        };
        let bound = meshes
            .iter()
            .filter(|&&mesh| match scene.map_texture(mesh, texture) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{mesh} not textured: {e}");
                    false
                }
            })
            .count();
        log::info!("{model}: {bound} of {} meshes textured", meshes.len());
        if bound == 0 {
            scene.drop_texture(texture);
            return BoundModel {
                meshes: 0,
                texture: None,
            };
        }
        BoundModel {
            meshes: bound,
            texture: Some(texture),
        }
    }
}

/// The 3D side's view of a [`LiveSyncProjector`].
#[derive(Clone)]
pub struct TextureBinding {
    shared: Weak<Shared>,
}
impl TextureBinding {
    /// Once per frame: if the texture went stale since the last poll, take the raster to upload.
    ///
    /// A dirty flag with no raster behind it yet stays set, so the first raster is never missed.
    pub fn poll(&self) -> Result<Option<Arc<image::RgbaImage>>, BindingError> {
        let shared = self.shared.upgrade().ok_or(BindingError::ProjectorGone)?;
        if !shared.dirty.load(Ordering::Acquire) {
            return Ok(None);
        }
        let raster = shared.raster.read().clone();
        if raster.is_some() {
            shared.dirty.store(false, Ordering::Release);
        }
        Ok(raster)
    }
}
