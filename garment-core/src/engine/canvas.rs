//! An in-memory [`EditingEngine`] with JSON snapshots.
//!
//! Stands in for the browser editing engine wherever there is no browser: tests and the headless studio.

use super::{
    ChangeKind, EditingEngine, Element, ElementId, ElementPatch, EngineError, Mount, RasterError,
    SurfaceEvent,
};
use crate::{color::Color, surface::Snapshot};

/// Offset applied to duplicates, so the copy is visible next to its original.
const DUPLICATE_OFFSET: f32 = 10.0;
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct CanvasState {
    version: u32,
    background: Color,
    objects: Vec<Element>,
}

pub struct HeadlessCanvas {
    mount: String,
    state: CanvasState,
    selection: Option<ElementId>,
    zoom: f32,
    css: [u32; 2],
    backing: [u32; 2],
    events: smallvec::SmallVec<[SurfaceEvent; 2]>,
}
impl HeadlessCanvas {
    /// Name of the drawing target this canvas is bound to.
    #[must_use]
    pub fn mount(&self) -> &str {
        &self.mount
    }
    /// Backing store size in device pixels.
    #[must_use]
    pub fn backing(&self) -> [u32; 2] {
        self.backing
    }
    fn position(&self, id: ElementId) -> Result<usize, EngineError> {
        self.state
            .objects
            .iter()
            .position(|element| element.id == id)
            .ok_or(EngineError::UnknownElement(id))
    }
    fn record(&mut self, kind: ChangeKind, element: Option<ElementId>) {
        self.events.push(SurfaceEvent { kind, element });
    }
}

impl EditingEngine for HeadlessCanvas {
    fn bind(mount: &Mount) -> Result<Self, EngineError> {
        if mount.id.trim().is_empty() {
            return Err(EngineError::Unmountable(mount.id.clone()));
        }
        Ok(Self {
            mount: mount.id.clone(),
            state: CanvasState {
                version: SNAPSHOT_VERSION,
                background: Color::WHITE,
                objects: Vec::new(),
            },
            selection: None,
            zoom: 1.0,
            css: [0, 0],
            backing: [0, 0],
            events: smallvec::SmallVec::new(),
        })
    }
    fn add(&mut self, mut element: Element) -> ElementId {
        element.id = ElementId::fresh();
        let id = element.id;
        self.state.objects.push(element);
        self.record(ChangeKind::Added, Some(id));
        id
    }
    fn modify(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), EngineError> {
        let idx = self.position(id)?;
        let element = &mut self.state.objects[idx];
        if !element.selectable {
            return Err(EngineError::Locked(id));
        }
        if patch.is_empty() {
            return Ok(());
        }
        let before = element.clone();
        element.apply(patch);
        if *element != before {
            self.record(ChangeKind::Modified, Some(id));
        }
        Ok(())
    }
    fn remove(&mut self, id: ElementId) -> Result<(), EngineError> {
        let idx = self.position(id)?;
        if !self.state.objects[idx].selectable {
            return Err(EngineError::Locked(id));
        }
        self.state.objects.remove(idx);
        self.record(ChangeKind::Removed, Some(id));
        if self.selection == Some(id) {
            self.selection = None;
            self.record(ChangeKind::Selection, None);
        }
        Ok(())
    }
    fn duplicate(&mut self, id: ElementId) -> Result<ElementId, EngineError> {
        let idx = self.position(id)?;
        let original = &self.state.objects[idx];
        if !original.selectable {
            return Err(EngineError::Locked(id));
        }
        let mut copy = original.clone();
        copy.apply(&ElementPatch::moved_to(
            copy.left.get() + DUPLICATE_OFFSET,
            copy.top.get() + DUPLICATE_OFFSET,
        ));
        let new = self.add(copy);
        self.select(Some(new))?;
        Ok(new)
    }
    fn elements(&self) -> &[Element] {
        &self.state.objects
    }
    fn selection(&self) -> Option<ElementId> {
        self.selection
    }
    fn select(&mut self, id: Option<ElementId>) -> Result<(), EngineError> {
        if let Some(id) = id {
            let idx = self.position(id)?;
            if !self.state.objects[idx].selectable {
                return Err(EngineError::Locked(id));
            }
        }
        if self.selection != id {
            self.selection = id;
            self.record(ChangeKind::Selection, id);
        }
        Ok(())
    }
    fn background(&self) -> Color {
        self.state.background
    }
    fn set_background(&mut self, color: Color) {
        if self.state.background != color {
            self.state.background = color;
            self.record(ChangeKind::Modified, None);
        }
    }
    fn zoom(&self) -> f32 {
        self.zoom
    }
    fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }
    fn dimensions(&self) -> [u32; 2] {
        self.css
    }
    fn set_dimensions(&mut self, css: [u32; 2], backing: [u32; 2]) {
        self.css = css;
        self.backing = backing;
    }
    fn serialize(&self) -> Result<Snapshot, EngineError> {
        Ok(Snapshot::new(serde_json::to_string(&self.state)?))
    }
    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EngineError> {
        let state: CanvasState = serde_json::from_str(snapshot.as_str())?;
        if state.version != SNAPSHOT_VERSION {
            return Err(EngineError::BadSnapshot(<serde_json::Error as serde::de::Error>::custom(
                format!("unsupported snapshot version {}", state.version),
            )));
        }
        self.state = state;
        if let Some(selected) = self.selection {
            if self.position(selected).is_err() {
                self.selection = None;
            }
        }
        Ok(())
    }
    fn rasterize(&self, size: [u32; 2]) -> Result<image::RgbaImage, RasterError> {
        if self.css.contains(&0) {
            return Err(RasterError::Unsized);
        }
        super::raster::render(
            self.state.background,
            &self.state.objects,
            crate::surface::SURFACE_SIZE,
            size,
        )
    }
    fn drain_events(&mut self) -> smallvec::SmallVec<[SurfaceEvent; 2]> {
        std::mem::take(&mut self.events)
    }
}
