//! # The studio
//!
//! [`App`] holds every piece of the customizer and routes each user operation through them. Each
//! operation catches its own failures and turns them into a [`Notice`](crate::notify::Notice), so
//! nothing short of boot can take the session down.

use garment_core::{
    color::Color,
    data_url,
    engine::{
        scene::{ModelSource, SceneEngine},
        EditingEngine, Element, ElementId, ElementPatch, EngineError, Shape,
    },
    history::HistoryTracker,
    pricing::{self, PriceSettings, Quote, Size},
    storage::{
        self,
        records::{
            CartLine, SavedDesign, SavedSticker, CART_KEY, COLORS_KEY, DESIGN_KEY, SETTINGS_KEY,
            STICKERS_KEY,
        },
        KeyValueStore, StorageError,
    },
    surface::{Side, Snapshot},
    sync::{viewer::MockupViewer, viewer::ModelStatus, LiveSyncProjector},
    util::Finite,
};

use crate::{
    actions::Action,
    global::config::Settings,
    layout::ResizeDebouncer,
    notify::{Notices, Shell, PARTIAL_LOAD_BANNER},
    order::{Cart, Receipt},
    panels::Panels,
    surfaces::{Dependents, SurfaceManager},
};

pub const NO_ACTIVE_CANVAS: &str = "No active canvas";
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 3.0;
const ZOOM_STEP: f32 = 0.1;
/// Images and stickers are scaled down to fit this box when placed.
const IMAGE_BOX: f32 = 200.0;
/// Center of the print guide, where new elements land.
const PLACE_AT: [f32; 2] = [250.0, 320.0];

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no surface could be created")]
    NoSurfaces,
    #[error("the {0} surface doesn't exist")]
    MissingSurface(Side),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("design file: {0}")]
    Io(#[from] std::io::Error),
    #[error("design file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session-wide choices that aren't part of either surface.
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub size: Size,
    pub quantity: u32,
    /// Garment color, kept with saved designs.
    pub base_color: Color,
    pub price: PriceSettings,
    pub colors: Vec<Color>,
    pub stickers: Vec<SavedSticker>,
}
impl Default for AppState {
    fn default() -> Self {
        Self {
            size: Size::default(),
            quantity: 1,
            base_color: Color::WHITE,
            price: PriceSettings::default(),
            colors: Vec::new(),
            stickers: Vec::new(),
        }
    }
}

fn persist<T: serde::Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    notices: &mut Notices,
    key: &str,
    value: &T,
) -> bool {
    match storage::save(store, key, value) {
        Ok(()) => true,
        Err(e) => {
            notices.error(format!("Couldn't save: {e}"));
            false
        }
    }
}

pub struct App<E, S> {
    pub state: AppState,
    surfaces: SurfaceManager<E>,
    history: HistoryTracker,
    panels: Panels,
    projector: LiveSyncProjector,
    viewer: MockupViewer<S>,
    store: Box<dyn KeyValueStore>,
    cart: Cart,
    notices: Notices,
    shell: Shell,
    resize: ResizeDebouncer,
}
impl<E: EditingEngine, S: SceneEngine> App<E, S> {
    #[must_use]
    pub fn new(settings: &Settings, scene: S, store: Box<dyn KeyValueStore>) -> Self {
        let mounts = settings
            .mounts
            .clone()
            .map(|mount| (!mount.id.trim().is_empty()).then_some(mount));
        let projector = LiveSyncProjector::new(settings.preview_size);
        let viewer = MockupViewer::new(scene, projector.binding());
        Self {
            state: AppState::default(),
            surfaces: SurfaceManager::new(mounts, settings.device_pixel_ratio),
            history: HistoryTracker::with_capacity(settings.history_capacity),
            panels: Panels::default(),
            projector,
            viewer,
            store,
            cart: Cart::default(),
            notices: Notices::new(settings.notice_duration()),
            shell: Shell::new(),
            resize: ResizeDebouncer::new(settings.resize_quiet()),
        }
    }
    /// Bring up the surfaces and the saved state, then reveal the shell.
    ///
    /// Whatever happens, the shell ends up revealed. If boot failed, a banner says so.
    pub fn boot(&mut self) {
        if let Err(e) = self.try_boot() {
            log::error!("boot failed: {e}");
            self.shell.show_banner(PARTIAL_LOAD_BANNER);
        }
        self.shell.reveal();
    }
    fn try_boot(&mut self) -> Result<(), AppError> {
        for side in Side::ALL {
            self.surfaces.create_surface(side, &mut self.history);
        }
        let store = self.store.as_ref();
        self.state.colors = storage::load_or(store, COLORS_KEY, Vec::new());
        self.state.stickers = storage::load_or(store, STICKERS_KEY, Vec::new());
        self.state.price = storage::load_or(store, SETTINGS_KEY, PriceSettings::default());
        self.cart = Cart::from_lines(storage::load_or(store, CART_KEY, Vec::new()));

        let first = Side::ALL
            .into_iter()
            .find(|&side| self.surfaces.get(side).is_some())
            .ok_or(AppError::NoSurfaces)?;
        self.surfaces.set_active(first);
        // The active side goes last, its panels are the ones on screen.
        for side in Side::ALL.into_iter().filter(|&side| side != first) {
            self.resync(side);
        }
        self.resync(first);
        Ok(())
    }

    // Accessors.

    #[must_use]
    pub fn surfaces(&self) -> &SurfaceManager<E> {
        &self.surfaces
    }
    #[must_use]
    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }
    #[must_use]
    pub fn panels(&self) -> &Panels {
        &self.panels
    }
    #[must_use]
    pub fn projector(&self) -> &LiveSyncProjector {
        &self.projector
    }
    #[must_use]
    pub fn viewer(&self) -> &MockupViewer<S> {
        &self.viewer
    }
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }
    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.notices
    }
    #[must_use]
    pub fn shell(&self) -> &Shell {
        &self.shell
    }
    #[must_use]
    pub fn active(&self) -> Side {
        self.surfaces.active()
    }
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.surfaces.zoom()
    }

    // Change relay.

    fn pump(&mut self, side: Side) {
        self.surfaces.pump(
            side,
            Dependents {
                history: &mut self.history,
                panels: &mut self.panels,
                projector: &mut self.projector,
            },
        );
    }
    fn resync(&mut self, side: Side) {
        self.surfaces.resync(
            side,
            Dependents {
                history: &mut self.history,
                panels: &mut self.panels,
                projector: &mut self.projector,
            },
        );
    }
    /// Run an edit against the active surface, then relay whatever it changed.
    fn edit<R>(&mut self, f: impl FnOnce(&mut E) -> Result<R, EngineError>) -> Option<R> {
        let side = self.surfaces.active();
        let Some(surface) = self.surfaces.active_surface_mut() else {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return None;
        };
        let result = f(surface);
        self.pump(side);
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.notices.warn(e.to_string());
                None
            }
        }
    }
    /// Add an element to the active surface and select it.
    fn place(&mut self, element: Element) -> Option<ElementId> {
        self.edit(|surface| {
            let id = surface.add(element);
            surface.select(Some(id))?;
            Ok(id)
        })
    }

    // Element operations.

    pub fn add_rect(&mut self) -> Option<ElementId> {
        self.place(Element::new(
            Shape::Rect,
            [PLACE_AT[0] - 60.0, PLACE_AT[1] - 60.0],
            [120.0, 120.0],
            Color::rgb(0x25, 0x63, 0xeb),
        ))
    }
    pub fn add_circle(&mut self) -> Option<ElementId> {
        self.place(Element::new(
            Shape::Circle,
            [PLACE_AT[0] - 50.0, PLACE_AT[1] - 50.0],
            [100.0, 100.0],
            Color::rgb(0xef, 0x44, 0x44),
        ))
    }
    pub fn add_triangle(&mut self) -> Option<ElementId> {
        self.place(Element::new(
            Shape::Triangle,
            [PLACE_AT[0] - 55.0, PLACE_AT[1] - 50.0],
            [110.0, 100.0],
            Color::rgb(0x10, 0xb9, 0x81),
        ))
    }
    pub fn add_text(&mut self, text: &str) -> Option<ElementId> {
        let text = if text.trim().is_empty() { "Your text" } else { text };
        let font_size = 32.0;
        #[allow(clippy::cast_precision_loss)]
        let width = (text.chars().count() as f32 * font_size * 0.6).clamp(40.0, 380.0);
        self.place(Element::new(
            Shape::Text {
                text: text.to_owned(),
                font_size: Finite::saturating(font_size),
            },
            [PLACE_AT[0] - width / 2.0, PLACE_AT[1] - font_size / 2.0],
            [width, font_size * 1.2],
            Color::BLACK,
        ))
    }
    /// Place an image given as a data URL, scaled down to fit the print area.
    pub fn add_image(&mut self, src: &str) -> Option<ElementId> {
        let raster = match data_url::decode(src) {
            Ok(raster) => raster,
            Err(e) => {
                self.notices.error(format!("Couldn't read image: {e}"));
                return None;
            }
        };
        #[allow(clippy::cast_precision_loss)]
        let [w, h] = [raster.width() as f32, raster.height() as f32];
        let scale = (IMAGE_BOX / w.max(h)).min(1.0);
        let [w, h] = [w * scale, h * scale];
        self.place(Element::new(
            Shape::Image { src: src.to_owned() },
            [PLACE_AT[0] - w / 2.0, PLACE_AT[1] - h / 2.0],
            [w, h],
            Color::TRANSPARENT,
        ))
    }
    pub fn add_sticker(&mut self, index: usize) -> Option<ElementId> {
        let Some(sticker) = self.state.stickers.get(index) else {
            self.notices.warn("No such sticker");
            return None;
        };
        let payload = sticker.payload.clone();
        self.add_image(&payload)
    }
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        self.edit(|surface| surface.select(id)).is_some()
    }
    fn selected(&mut self) -> Option<ElementId> {
        let selected = self.surfaces.active_surface()?.selection();
        if selected.is_none() {
            self.notices.info("Nothing selected");
        }
        selected
    }
    pub fn modify_selected(&mut self, patch: &ElementPatch) -> bool {
        if self.surfaces.active_surface().is_none() {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return false;
        }
        let Some(id) = self.selected() else {
            return false;
        };
        self.edit(|surface| surface.modify(id, patch)).is_some()
    }
    pub fn delete_selected(&mut self) -> bool {
        if self.surfaces.active_surface().is_none() {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return false;
        }
        let Some(id) = self.selected() else {
            return false;
        };
        self.edit(|surface| surface.remove(id)).is_some()
    }
    pub fn duplicate_selected(&mut self) -> Option<ElementId> {
        if self.surfaces.active_surface().is_none() {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return None;
        }
        let id = self.selected()?;
        self.edit(|surface| surface.duplicate(id))
    }
    pub fn set_background(&mut self, color: Color) -> bool {
        self.edit(|surface| {
            surface.set_background(color);
            Ok(())
        })
        .is_some()
    }

    // History.

    pub fn undo(&mut self) -> bool {
        let side = self.surfaces.active();
        if self.surfaces.active_surface().is_none() {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return false;
        }
        let Some(snapshot) = self.history.undo(side) else {
            self.notices.warn("Nothing to undo");
            return false;
        };
        if let Err(e) = self.surfaces.restore(side, &snapshot) {
            self.notices.error(format!("Undo failed: {e}"));
            // Keep the history's top in line with what is displayed.
            let _ = self.history.redo(side);
            return false;
        }
        self.resync(side);
        true
    }
    pub fn redo(&mut self) -> bool {
        let side = self.surfaces.active();
        if self.surfaces.active_surface().is_none() {
            self.notices.warn(NO_ACTIVE_CANVAS);
            return false;
        }
        let Some(snapshot) = self.history.redo(side) else {
            self.notices.warn("Nothing to redo");
            return false;
        };
        if let Err(e) = self.surfaces.restore(side, &snapshot) {
            self.notices.error(format!("Redo failed: {e}"));
            let _ = self.history.undo(side);
            return false;
        }
        self.resync(side);
        true
    }

    // View.

    pub fn set_active(&mut self, side: Side) {
        self.surfaces.set_active(side);
        if self.surfaces.get(side).is_some() {
            self.resync(side);
        }
    }
    pub fn toggle_side(&mut self) {
        self.set_active(self.surfaces.active().other());
    }
    /// Set the zoom of both surfaces, clamped to a sane range.
    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            return;
        }
        self.surfaces.set_zoom(zoom.clamp(MIN_ZOOM, MAX_ZOOM));
    }
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.surfaces.zoom() + ZOOM_STEP);
    }
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.surfaces.zoom() - ZOOM_STEP);
    }
    /// The window was resized. Container widths are optional, `None` leaves a side as it was.
    /// Surfaces are refit once the resizing settles, see [`Self::tick`].
    pub fn resized(&mut self, widths: [Option<f32>; 2], now: std::time::Instant) {
        for (side, width) in Side::ALL.into_iter().zip(widths) {
            if let Some(width) = width {
                self.surfaces.set_container_width(side, width);
            }
        }
        self.resize.notify(now);
    }
    /// Timer housekeeping. Returns whether the surfaces were refit.
    pub fn tick(&mut self, now: std::time::Instant) -> bool {
        self.notices.expire(now);
        if !self.resize.poll(now) {
            return false;
        }
        self.surfaces.refit();
        if let Some(front) = self.surfaces.get(Side::Front) {
            self.projector.refresh_preview(front);
        }
        true
    }

    // 3D mockup.

    pub fn load_model(&mut self, source: &ModelSource) -> ModelStatus {
        self.viewer.load_model(source, &self.projector).clone()
    }
    /// One animation frame of the mockup. Returns whether the texture was re-uploaded.
    pub fn frame(&mut self) -> bool {
        match self.viewer.frame() {
            Ok(uploaded) => uploaded,
            Err(e) => {
                log::error!("mockup frame: {e}");
                false
            }
        }
    }

    // Designs.

    /// Both surfaces and the garment choices, as saved.
    pub fn design(&self) -> Result<SavedDesign, AppError> {
        let serialize = |side: Side| -> Result<Snapshot, AppError> {
            self.surfaces
                .get(side)
                .ok_or(AppError::MissingSurface(side))?
                .serialize()
                .map_err(AppError::from)
        };
        Ok(SavedDesign {
            front: serialize(Side::Front)?,
            back: serialize(Side::Back)?,
            size: self.state.size,
            color: self.state.base_color,
            saved_at: Some(chrono::Utc::now()),
        })
    }
    pub fn save_design(&mut self) -> bool {
        let design = match self.design() {
            Ok(design) => design,
            Err(e) => {
                self.notices.error(format!("Couldn't save design: {e}"));
                return false;
            }
        };
        let saved = persist(self.store.as_mut(), &mut self.notices, DESIGN_KEY, &design);
        if saved {
            self.notices.info("Design saved");
        }
        saved
    }
    /// Replace both surfaces with a saved design. Loading is undoable on each side.
    pub fn load_design(&mut self, design: &SavedDesign) -> Result<(), AppError> {
        for side in Side::ALL {
            if self.surfaces.get(side).is_none() {
                return Err(AppError::MissingSurface(side));
            }
        }
        let mut previous = Vec::with_capacity(Side::ALL.len());
        for side in Side::ALL {
            if let Some(surface) = self.surfaces.get(side) {
                previous.push((side, surface.serialize()?));
            }
        }
        // All or nothing: a side the engine refuses puts back the sides already replaced.
        for (done, side) in Side::ALL.into_iter().enumerate() {
            if let Err(e) = self.surfaces.restore(side, design.surface(side)) {
                for (side, snapshot) in previous.iter().take(done) {
                    if let Err(e) = self.surfaces.restore(*side, snapshot) {
                        log::error!("rolling back {side} after a rejected design: {e}");
                    }
                }
                return Err(e.into());
            }
        }
        for side in Side::ALL {
            if let Some(surface) = self.surfaces.get(side) {
                self.history.push(side, surface.serialize()?);
            }
            self.resync(side);
        }
        self.resync(self.surfaces.active());
        self.state.size = design.size;
        self.state.base_color = design.color;
        Ok(())
    }
    /// Bring back the design last saved to storage, if there is one.
    pub fn restore_saved_design(&mut self) -> bool {
        let Some(design) =
            storage::load_or::<Option<SavedDesign>>(self.store.as_ref(), DESIGN_KEY, None)
        else {
            return false;
        };
        match self.load_design(&design) {
            Ok(()) => true,
            Err(e) => {
                self.notices.error(format!("Couldn't restore design: {e}"));
                false
            }
        }
    }
    pub fn export_design(&self, path: &std::path::Path) -> Result<(), AppError> {
        let design = self.design()?;
        std::fs::write(path, serde_json::to_string_pretty(&design)?)?;
        Ok(())
    }
    pub fn import_design(&mut self, path: &std::path::Path) -> Result<(), AppError> {
        let design: SavedDesign = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        self.load_design(&design)
    }

    // Saved colors, stickers, settings.

    /// Remember a color. Colors already saved are not added twice.
    pub fn save_color(&mut self, color: Color) -> bool {
        if self.state.colors.contains(&color) {
            self.notices.info("Color already saved");
            return false;
        }
        self.state.colors.push(color);
        persist(
            self.store.as_mut(),
            &mut self.notices,
            COLORS_KEY,
            &self.state.colors,
        )
    }
    pub fn save_sticker(&mut self, name: &str, payload: &str) -> bool {
        if let Err(e) = data_url::decode(payload) {
            self.notices.error(format!("Couldn't read sticker: {e}"));
            return false;
        }
        self.state.stickers.push(SavedSticker {
            name: name.to_owned(),
            payload: payload.to_owned(),
        });
        persist(
            self.store.as_mut(),
            &mut self.notices,
            STICKERS_KEY,
            &self.state.stickers,
        )
    }
    pub fn update_settings(&mut self, price: PriceSettings) -> bool {
        self.state.price = price;
        persist(
            self.store.as_mut(),
            &mut self.notices,
            SETTINGS_KEY,
            &self.state.price,
        )
    }
    pub fn set_size(&mut self, size: Size) {
        self.state.size = size;
    }
    pub fn set_quantity(&mut self, quantity: u32) {
        self.state.quantity = quantity.max(1);
    }
    pub fn set_base_color(&mut self, color: Color) {
        self.state.base_color = color;
    }

    // Pricing and orders.

    #[must_use]
    pub fn quote(&self) -> Quote {
        pricing::quote(
            &self.state.price,
            self.state.size,
            self.surfaces.has_user_elements(Side::Back),
            self.state.quantity,
        )
    }
    pub fn add_to_cart(&mut self) -> bool {
        let quote = self.quote();
        let preview = self
            .projector
            .preview()
            .map(|preview| preview.data_url.to_string())
            .unwrap_or_default();
        if let Err(e) = self
            .cart
            .add(self.state.size, quote.quantity, quote.total, preview)
        {
            self.notices.warn(e.to_string());
            return false;
        }
        self.notices.info(format!("Added to cart: {quote}"));
        persist(
            self.store.as_mut(),
            &mut self.notices,
            CART_KEY,
            self.cart.lines(),
        )
    }
    pub fn remove_cart_line(&mut self, index: usize) -> Option<CartLine> {
        match self.cart.remove(index) {
            Ok(line) => {
                persist(
                    self.store.as_mut(),
                    &mut self.notices,
                    CART_KEY,
                    self.cart.lines(),
                );
                Some(line)
            }
            Err(e) => {
                self.notices.warn(e.to_string());
                None
            }
        }
    }
    pub fn place_order(&mut self) -> Option<Receipt> {
        match self.cart.place_order(&self.state.price.currency) {
            Ok(receipt) => {
                persist(
                    self.store.as_mut(),
                    &mut self.notices,
                    CART_KEY,
                    self.cart.lines(),
                );
                self.notices.info(format!("Order {} placed", receipt.id));
                Some(receipt)
            }
            Err(e) => {
                self.notices.warn(e.to_string());
                None
            }
        }
    }

    /// Carry out a hotkey action.
    pub fn perform(&mut self, action: Action) {
        log::trace!("action {action}");
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::Delete => {
                self.delete_selected();
            }
            Action::Duplicate => {
                self.duplicate_selected();
            }
            Action::SwitchSide => self.toggle_side(),
            Action::ZoomIn => self.zoom_in(),
            Action::ZoomOut => self.zoom_out(),
            Action::SaveDesign => {
                self.save_design();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use garment_core::{
        engine::{canvas::HeadlessCanvas, scene::HeadlessScene},
        storage::MemoryStore,
    };

    type TestApp = App<HeadlessCanvas, HeadlessScene>;

    fn booted_with(store: MemoryStore) -> TestApp {
        let mut app = TestApp::new(&Settings::default(), HeadlessScene::new(), Box::new(store));
        app.boot();
        app
    }
    fn booted() -> TestApp {
        booted_with(MemoryStore::new())
    }
    fn shown(app: &TestApp, side: Side) -> Snapshot {
        app.surfaces().get(side).unwrap().serialize().unwrap()
    }
    fn last_notice(app: &TestApp) -> &str {
        &app.notices().latest().unwrap().message
    }
    fn png_url(w: u32, h: u32) -> String {
        data_url::encode_png(&image::RgbaImage::from_pixel(w, h, image::Rgba([9, 9, 9, 255])))
            .unwrap()
    }

    #[test]
    fn boot_seeds_both_sides() {
        let app = booted();
        assert!(!app.shell().is_loading());
        assert_eq!(app.shell().banner(), None);
        for side in Side::ALL {
            assert_eq!(app.history().depth(side), 1);
        }
        assert_eq!(app.active(), Side::Front);
        assert_eq!(app.projector().preview().unwrap().generation, 1);
    }
    #[test]
    fn rect_text_undo_redo() {
        let mut app = booted();
        let initial = shown(&app, Side::Front);
        app.add_rect().unwrap();
        app.add_text("Hello").unwrap();
        let full = shown(&app, Side::Front);
        assert_eq!(app.history().depth(Side::Front), 3);

        assert!(app.undo());
        assert!(app.undo());
        assert_eq!(shown(&app, Side::Front), initial);
        assert!(!app.undo());
        assert_eq!(last_notice(&app), "Nothing to undo");

        assert!(app.redo());
        assert!(app.redo());
        assert_eq!(shown(&app, Side::Front), full);
        let surface = app.surfaces().get(Side::Front).unwrap();
        let kinds: Vec<_> = surface.elements().iter().map(|e| e.shape.kind()).collect();
        assert_eq!(kinds, ["rect", "rect", "text"]);
        assert!(!app.redo());
        assert_eq!(last_notice(&app), "Nothing to redo");
    }
    #[test]
    fn each_undo_reverses_the_latest_edit() {
        let mut app = booted();
        let mut states = vec![shown(&app, Side::Front)];
        let id = app.add_rect().unwrap();
        states.push(shown(&app, Side::Front));
        // Full history: the seeded floor plus 79 edits.
        #[allow(clippy::cast_precision_loss)]
        for step in 1..79 {
            assert!(app.modify_selected(&ElementPatch::moved_to(step as f32, 0.0)));
            states.push(shown(&app, Side::Front));
        }
        assert_eq!(app.history().depth(Side::Front), 80);
        assert_eq!(app.surfaces().get(Side::Front).unwrap().selection(), Some(id));

        states.pop();
        while let Some(expected) = states.pop() {
            assert!(app.undo());
            assert_eq!(shown(&app, Side::Front), expected);
        }
        assert!(!app.undo());
    }
    #[test]
    fn edit_after_undo_clears_redo() {
        let mut app = booted();
        app.add_rect();
        app.undo();
        assert!(app.history().can_redo(Side::Front));
        app.add_circle();
        assert!(!app.history().can_redo(Side::Front));
        assert!(!app.redo());
    }
    #[test]
    fn sides_do_not_bleed() {
        let mut app = booted();
        app.add_rect();
        let front = shown(&app, Side::Front);
        let back = shown(&app, Side::Back);

        app.perform(Action::SwitchSide);
        assert_eq!(app.active(), Side::Back);
        assert_eq!(app.panels().side(), Some(Side::Back));
        assert!(app.panels().layers.rows().is_empty());
        // Nothing to undo on the back, the front's edit stays put.
        assert!(!app.undo());
        app.perform(Action::SwitchSide);

        assert_eq!(shown(&app, Side::Front), front);
        assert_eq!(shown(&app, Side::Back), back);
        assert_eq!(app.history().depth(Side::Front), 2);
        assert_eq!(app.history().depth(Side::Back), 1);
    }
    #[test]
    fn back_edits_leave_preview_alone() {
        let mut app = booted();
        app.set_active(Side::Back);
        let before = app.projector().preview().unwrap().generation;
        app.add_circle();
        assert_eq!(app.projector().preview().unwrap().generation, before);
        app.set_active(Side::Front);
        app.add_circle();
        assert!(app.projector().preview().unwrap().generation > before);
    }
    #[test]
    fn saved_design_round_trip() {
        let mut app = booted();
        app.add_rect();
        app.add_text("Front");
        app.set_background(Color::rgb(0xfe, 0xf3, 0xc7));
        app.set_active(Side::Back);
        app.add_triangle();
        app.set_background(Color::rgb(0x11, 0x18, 0x27));
        app.set_size(Size::XL);
        app.set_base_color(Color::rgb(0x1e, 0x3a, 0x8a));

        let json = serde_json::to_string(&app.design().unwrap()).unwrap();
        let expected = Side::ALL.map(|side| shown(&app, side));

        let mut fresh = booted();
        fresh
            .load_design(&serde_json::from_str(&json).unwrap())
            .unwrap();
        for side in Side::ALL {
            assert_eq!(shown(&fresh, side), expected[side.index()]);
        }
        let back = fresh.surfaces().get(Side::Back).unwrap();
        assert_eq!(back.background(), Color::rgb(0x11, 0x18, 0x27));
        assert_eq!(back.elements().len(), 2);
        assert_eq!(fresh.state.size, Size::XL);
        // Loading is itself undoable.
        assert!(fresh.undo());
        assert_eq!(fresh.surfaces().get(Side::Front).unwrap().elements().len(), 1);
    }
    #[test]
    fn design_survives_storage() {
        let mut app = booted();
        app.add_circle();
        assert!(app.save_design());
        let expected = shown(&app, Side::Front);

        let mut store = MemoryStore::new();
        let saved = app.store.get(DESIGN_KEY).unwrap().unwrap();
        store.set(DESIGN_KEY, saved).unwrap();
        let mut fresh = booted_with(store);
        assert!(fresh.restore_saved_design());
        assert_eq!(shown(&fresh, Side::Front), expected);
    }
    #[test]
    fn bad_design_is_rejected_untouched() {
        let mut app = booted();
        app.add_rect();
        let before = shown(&app, Side::Front);
        let design = SavedDesign {
            front: Snapshot::new(r##"{"version":1,"background":"#ffffff","objects":[]}"##),
            back: Snapshot::new("not json"),
            size: Size::S,
            color: Color::WHITE,
            saved_at: None,
        };
        assert!(app.load_design(&design).is_err());
        assert_eq!(shown(&app, Side::Front), before);
        assert_eq!(app.state.size, Size::M);
    }
    #[test]
    fn design_from_newer_version_is_rejected_untouched() {
        let mut app = booted();
        app.add_rect();
        let front = shown(&app, Side::Front);
        let back = shown(&app, Side::Back);
        let depth = app.history().depth(Side::Front);
        let design = SavedDesign {
            front: Snapshot::new(r##"{"version":1,"background":"#ffffff","objects":[]}"##),
            back: Snapshot::new(r##"{"version":2,"background":"#ffffff","objects":[]}"##),
            size: Size::S,
            color: Color::WHITE,
            saved_at: None,
        };
        assert!(app.load_design(&design).is_err());
        assert_eq!(shown(&app, Side::Front), front);
        assert_eq!(shown(&app, Side::Back), back);
        assert_eq!(app.history().depth(Side::Front), depth);
        assert_eq!(app.history().current(Side::Front), Some(&front));
        assert_eq!(app.state.size, Size::M);
    }
    #[test]
    fn no_surfaces_still_reveals() {
        let mut settings = Settings::default();
        for mount in &mut settings.mounts {
            mount.id.clear();
        }
        let mut app = TestApp::new(&settings, HeadlessScene::new(), Box::new(MemoryStore::new()));
        app.boot();
        assert!(!app.shell().is_loading());
        assert_eq!(app.shell().banner(), Some(PARTIAL_LOAD_BANNER));

        assert!(app.add_rect().is_none());
        assert_eq!(last_notice(&app), NO_ACTIVE_CANVAS);
        assert!(!app.undo());
        assert_eq!(last_notice(&app), NO_ACTIVE_CANVAS);
    }
    #[test]
    fn missing_back_mount_is_partial() {
        let mut settings = Settings::default();
        settings.mounts[1].id.clear();
        let mut app = TestApp::new(&settings, HeadlessScene::new(), Box::new(MemoryStore::new()));
        app.boot();
        assert_eq!(app.shell().banner(), None);
        app.add_rect().unwrap();
        app.toggle_side();
        assert!(app.add_rect().is_none());
        assert_eq!(last_notice(&app), NO_ACTIVE_CANVAS);
    }
    #[test]
    fn selection_operations() {
        let mut app = booted();
        assert!(!app.delete_selected());
        assert_eq!(last_notice(&app), "Nothing selected");

        let id = app.add_rect().unwrap();
        let copy = app.duplicate_selected().unwrap();
        assert_ne!(id, copy);
        assert_eq!(app.panels().properties.shown().unwrap().id, copy);
        assert!(app.delete_selected());
        assert!(app.panels().properties.shown().is_none());
        assert_eq!(app.panels().layers.rows().len(), 1);
        assert!(app.select(Some(id)));
        // Selecting records nothing.
        assert_eq!(app.history().depth(Side::Front), 4);
    }
    #[test]
    fn zoom_is_clamped_and_shared() {
        let mut app = booted();
        app.set_zoom(10.0);
        assert!((app.zoom() - MAX_ZOOM).abs() < f32::EPSILON);
        app.set_zoom(f32::NAN);
        assert!((app.zoom() - MAX_ZOOM).abs() < f32::EPSILON);
        for _ in 0..40 {
            app.perform(Action::ZoomOut);
        }
        assert!((app.zoom() - MIN_ZOOM).abs() < f32::EPSILON);
        let back = app.surfaces().get(Side::Back).unwrap();
        assert!((back.zoom() - MIN_ZOOM).abs() < f32::EPSILON);
    }
    #[test]
    fn resize_refits_after_quiet_period() {
        use std::time::{Duration, Instant};
        let mut app = booted();
        let start = Instant::now();
        app.resized([Some(324.0), None], start);
        app.resized([Some(224.0), None], start + Duration::from_millis(50));
        assert!(!app.tick(start + Duration::from_millis(100)));
        assert_eq!(app.surfaces().get(Side::Front).unwrap().dimensions(), [476, 666]);
        assert!(app.tick(start + Duration::from_millis(170)));
        assert_eq!(app.surfaces().get(Side::Front).unwrap().dimensions(), [200, 280]);
        assert!(!app.tick(start + Duration::from_millis(400)));
    }
    #[test]
    fn storage_failure_is_a_notice() {
        let mut app = booted_with(MemoryStore::with_quota(64));
        assert!(app.save_color(Color::rgb(1, 2, 3)));
        assert!(!app.save_color(Color::rgb(1, 2, 3)));
        assert_eq!(last_notice(&app), "Color already saved");

        app.add_rect();
        assert!(!app.save_design());
        assert!(last_notice(&app).starts_with("Couldn't save: storage quota exceeded"));
        // The session carries on.
        assert_eq!(app.history().depth(Side::Front), 2);
        assert_eq!(app.state.colors, [Color::rgb(1, 2, 3)]);
    }
    #[test]
    fn stickers() {
        let mut app = booted();
        assert!(!app.save_sticker("bad", "data:image/png;base64,AAAA"));
        assert!(app.save_sticker("dot", &png_url(400, 100)));
        let id = app.add_sticker(0).unwrap();
        let surface = app.surfaces().get(Side::Front).unwrap();
        let element = surface.elements().iter().find(|e| e.id == id).unwrap();
        assert_eq!(element.shape.kind(), "image");
        assert!((element.width.get() - 200.0).abs() < 1e-3);
        assert!((element.height.get() - 50.0).abs() < 1e-3);
        assert!(app.add_sticker(3).is_none());
    }
    #[test]
    fn pricing_and_orders() {
        let mut app = booted();
        assert_eq!(app.quote().total, 2500);
        app.set_active(Side::Back);
        app.add_text("Back print");
        app.set_size(Size::L);
        app.set_quantity(2);
        assert_eq!(app.quote().total, 2 * (2500 + 150 + 500));

        assert!(app.update_settings(PriceSettings {
            base_price: 1000,
            currency: "USD".into(),
        }));
        assert!(app.add_to_cart());
        assert!(app.cart().lines()[0].preview.starts_with("data:image/png;base64,"));
        app.set_quantity(1);
        assert!(app.add_to_cart());
        assert_eq!(app.cart().total(), 2 * 1650 + 1650);
        assert!(app.remove_cart_line(1).is_some());
        assert!(app.remove_cart_line(1).is_none());

        let receipt = app.place_order().unwrap();
        assert_eq!(receipt.total, 3300);
        assert_eq!(receipt.currency, "USD");
        assert!(app.cart().is_empty());
        assert!(app.place_order().is_none());
        let stored: Vec<CartLine> = storage::load_or(app.store.as_ref(), CART_KEY, vec![]);
        assert!(stored.is_empty());
    }
    #[test]
    fn mockup_follows_front_edits() {
        let mut app = booted();
        let shirt = ModelSource::Memory {
            name: "tshirt.gltf".into(),
            bytes: br#"{"asset":{"version":"2.0"},"nodes":[{"mesh":0},{"mesh":0}],"meshes":[{"primitives":[{}]}]}"#
                .to_vec()
                .into(),
        };
        assert!(matches!(
            app.load_model(&shirt),
            ModelStatus::Ready { meshes: 2, .. }
        ));
        // Dirty from boot.
        assert!(app.frame());
        assert!(!app.frame());
        app.add_rect();
        assert!(app.projector().is_texture_dirty());
        assert!(app.frame());
        app.set_active(Side::Back);
        app.add_rect();
        app.frame();
        assert!(!app.frame());
    }
    #[test]
    fn model_without_meshes() {
        let mut app = booted();
        let status = app.load_model(&ModelSource::Memory {
            name: "empty.gltf".into(),
            bytes: br#"{"asset":{"version":"2.0"}}"#.to_vec().into(),
        });
        assert_eq!(status, ModelStatus::Ready {
            name: "empty.gltf".into(),
            meshes: 0
        });
        assert!(!app.frame());
    }
}
