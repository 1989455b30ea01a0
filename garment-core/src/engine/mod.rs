//! # Engines
//!
//! The 2D editing engine and the 3D scene engine are external collaborators. This module describes the
//! contracts the rest of the crate consumes from them ([`EditingEngine`], [`scene::SceneEngine`]), along
//! with small headless implementations used by tests and the headless studio binary.

pub mod canvas;
pub mod element;
pub mod gltf;
mod raster;
pub mod scene;

pub use element::{Element, ElementId, ElementPatch, Shape};

use crate::{color::Color, surface::Snapshot};

/// A drawing target an engine instance binds to.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mount {
    /// Name of the target, e.g. `frontCanvas`.
    pub id: String,
    /// Width of the containing box, in CSS pixels.
    pub container_width: f32,
    /// Horizontal padding of the container, left and right.
    #[serde(default)]
    pub padding: [f32; 2],
}

/// Kinds of change an engine reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    /// The active selection changed. Not structural: nothing is recorded in history.
    Selection,
}
impl ChangeKind {
    /// Whether this change alters the serialized state of the surface.
    #[must_use]
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Selection)
    }
}
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub kind: ChangeKind,
    /// The element concerned, `None` for surface-wide changes like the background.
    pub element: Option<ElementId>,
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("no element {0}")]
    UnknownElement(ElementId),
    #[error("element {0} is locked")]
    Locked(ElementId),
    #[error("malformed snapshot: {0}")]
    BadSnapshot(#[from] serde_json::Error),
    #[error("drawing target `{0}` can't be bound")]
    Unmountable(String),
}

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error("surface has no size yet")]
    Unsized,
    #[error("requested raster size {0:?} is empty")]
    EmptyTarget([u32; 2]),
    #[error("image element {0} could not be decoded: {1}")]
    BadImage(ElementId, String),
}

/// What this crate needs from a 2D editing engine.
///
/// Mutations are recorded as [`SurfaceEvent`]s which the owner drains after each call. This keeps
/// notification outside of the engine's own `&mut self` borrow, so nothing that reacts to a change can
/// mutate the surface that fired it.
pub trait EditingEngine {
    /// Construct an engine bound to a drawing target.
    fn bind(mount: &Mount) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// Insert an element on top of the stack. The engine assigns its ID.
    fn add(&mut self, element: Element) -> ElementId;
    fn modify(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), EngineError>;
    fn remove(&mut self, id: ElementId) -> Result<(), EngineError>;
    /// Copy an element, offset slightly, on top of the stack.
    fn duplicate(&mut self, id: ElementId) -> Result<ElementId, EngineError>;
    /// Elements in stacking order, bottom first.
    fn elements(&self) -> &[Element];

    fn selection(&self) -> Option<ElementId>;
    fn select(&mut self, id: Option<ElementId>) -> Result<(), EngineError>;

    fn background(&self) -> Color;
    fn set_background(&mut self, color: Color);

    fn zoom(&self) -> f32;
    fn set_zoom(&mut self, zoom: f32);
    /// On-screen size in CSS pixels, `[0, 0]` until first laid out.
    fn dimensions(&self) -> [u32; 2];
    fn set_dimensions(&mut self, css: [u32; 2], backing: [u32; 2]);

    /// Serialize the full state.
    fn serialize(&self) -> Result<Snapshot, EngineError>;
    /// Replace the full state. Does *not* report change events.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EngineError>;

    /// Render the surface into a raster of the given pixel size.
    fn rasterize(&self, size: [u32; 2]) -> Result<image::RgbaImage, RasterError>;

    /// Take all change events recorded since the last call, oldest first.
    fn drain_events(&mut self) -> smallvec::SmallVec<[SurfaceEvent; 2]>;
}
