//! # Surfaces
//!
//! The front and back editing surfaces, which one is active, and the relay that keeps everything
//! depending on a surface up to date after it changes.

use garment_core::{
    color::Color,
    engine::{EditingEngine, Element, EngineError, Mount, Shape},
    history::HistoryTracker,
    surface::Side,
    sync::LiveSyncProjector,
};

use crate::{layout, panels::Panels};

/// The printable area, drawn on every surface as a faint outline.
#[must_use]
pub fn print_guide() -> Element {
    Element::new(
        Shape::Rect,
        [60.0, 80.0],
        [380.0, 480.0],
        Color::TRANSPARENT,
    )
    .with_stroke(Color::rgba(0, 0, 0, 15))
    .locked()
}

/// What gets told about a surface change, in the order it's told.
///
/// Everything here only ever sees the surface by shared reference, so nothing reacting to a change
/// can change the surface again.
pub struct Dependents<'a> {
    pub history: &'a mut HistoryTracker,
    pub panels: &'a mut Panels,
    pub projector: &'a mut LiveSyncProjector,
}

/// What [`SurfaceManager::pump`] found.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Pumped {
    pub events: usize,
    pub structural: bool,
}

pub struct SurfaceManager<E> {
    surfaces: [Option<E>; 2],
    mounts: [Option<Mount>; 2],
    active: Side,
    zoom: f32,
    device_pixel_ratio: f32,
}
impl<E: EditingEngine> SurfaceManager<E> {
    /// A manager with no surfaces yet. Sides with `None` mount will never get one.
    #[must_use]
    pub fn new(mounts: [Option<Mount>; 2], device_pixel_ratio: f32) -> Self {
        Self {
            surfaces: [None, None],
            mounts,
            active: Side::Front,
            zoom: 1.0,
            device_pixel_ratio,
        }
    }
    /// Bind an engine to the side's mount and seed it with the print guide. The seeded state becomes
    /// the side's history floor.
    ///
    /// A missing or unbindable mount is logged and skipped, leaving the side without a surface.
    pub fn create_surface(&mut self, side: Side, history: &mut HistoryTracker) -> Option<&mut E> {
        let Some(mount) = self.mounts[side.index()].as_ref() else {
            log::warn!("no drawing target for the {side} surface, skipping it");
            return None;
        };
        let mut engine = match E::bind(mount) {
            Ok(engine) => engine,
            Err(e) => {
                log::warn!("{side} surface skipped: {e}");
                return None;
            }
        };
        engine.add(print_guide());
        // Seeding happens before anyone is listening.
        let _ = engine.drain_events();
        let fit = layout::fit(mount, self.device_pixel_ratio);
        engine.set_dimensions(fit.css, fit.backing);
        engine.set_zoom(self.zoom);
        match engine.serialize() {
            Ok(initial) => history.seed(side, initial),
            Err(e) => log::error!("{side} surface has no history floor: {e}"),
        }
        log::debug!("{side} surface bound to `{}`", mount.id);
        self.surfaces[side.index()] = Some(engine);
        self.surfaces[side.index()].as_mut()
    }
    #[must_use]
    pub fn get(&self, side: Side) -> Option<&E> {
        self.surfaces[side.index()].as_ref()
    }
    pub fn get_mut(&mut self, side: Side) -> Option<&mut E> {
        self.surfaces[side.index()].as_mut()
    }
    #[must_use]
    pub fn active(&self) -> Side {
        self.active
    }
    #[must_use]
    pub fn active_surface(&self) -> Option<&E> {
        self.get(self.active)
    }
    pub fn active_surface_mut(&mut self) -> Option<&mut E> {
        self.get_mut(self.active)
    }
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }
    /// Switch which surface is edited, and refit both.
    pub fn set_active(&mut self, side: Side) {
        if self.active != side {
            log::debug!("active surface: {side}");
        }
        self.active = side;
        self.refit();
    }
    /// Apply a zoom level to both surfaces.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        for surface in self.surfaces.iter_mut().flatten() {
            surface.set_zoom(zoom);
        }
    }
    pub fn set_container_width(&mut self, side: Side, width: f32) {
        if let Some(mount) = self.mounts[side.index()].as_mut() {
            mount.container_width = width;
        }
    }
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
    }
    /// Size both surfaces to their containers, keeping the current zoom.
    pub fn refit(&mut self) {
        for side in Side::ALL {
            let (Some(surface), Some(mount)) = (
                self.surfaces[side.index()].as_mut(),
                self.mounts[side.index()].as_ref(),
            ) else {
                continue;
            };
            let fit = layout::fit(mount, self.device_pixel_ratio);
            surface.set_dimensions(fit.css, fit.backing);
            surface.set_zoom(self.zoom);
        }
    }
    /// Relay a side's pending change events.
    ///
    /// For structural changes, in order: the new state is pushed to history, the panels are rebuilt,
    /// the texture is marked dirty, and for the front, the preview is re-rendered. Selection-only
    /// changes just rebuild the panels.
    pub fn pump(&mut self, side: Side, dependents: Dependents<'_>) -> Pumped {
        let Some(surface) = self.surfaces[side.index()].as_mut() else {
            return Pumped::default();
        };
        let events = surface.drain_events();
        let surface = &*surface;
        let structural = events.iter().any(|event| event.kind.is_structural());
        if structural {
            match surface.serialize() {
                Ok(snapshot) => dependents.history.push(side, snapshot),
                Err(e) => log::error!("{side} change not recorded: {e}"),
            }
            Self::resync_with(side, surface, dependents);
        } else if !events.is_empty() {
            dependents.panels.refresh(side, surface);
        }
        Pumped {
            events: events.len(),
            structural,
        }
    }
    /// Bring the dependents up to date with a side, without touching history. Used after the side's
    /// state was replaced wholesale, as by undo.
    pub fn resync(&self, side: Side, dependents: Dependents<'_>) {
        if let Some(surface) = self.get(side) {
            Self::resync_with(side, surface, dependents);
        }
    }
    fn resync_with(side: Side, surface: &E, dependents: Dependents<'_>) {
        dependents.panels.refresh(side, surface);
        dependents.projector.mark_texture_dirty();
        if side == Side::Front {
            dependents.projector.refresh_preview(surface);
        }
    }
    /// Whether a side holds anything besides the locked aids.
    #[must_use]
    pub fn has_user_elements(&self, side: Side) -> bool {
        self.get(side)
            .is_some_and(|surface| surface.elements().iter().any(|element| element.selectable))
    }
    /// Replace a side's state wholesale, silently. Callers resync afterwards.
    pub fn restore(
        &mut self,
        side: Side,
        snapshot: &garment_core::surface::Snapshot,
    ) -> Result<(), EngineError> {
        match self.get_mut(side) {
            Some(surface) => surface.restore(snapshot),
            None => Err(EngineError::Unmountable(side.to_string())),
        }
    }
}
