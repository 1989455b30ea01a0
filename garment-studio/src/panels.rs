//! The layer list and the properties panel. Both are rebuilt from scratch on every refresh.

use garment_core::{
    color::Color,
    engine::{EditingEngine, Element, ElementId, Shape},
    surface::Side,
};

#[derive(Clone, Debug, PartialEq)]
pub struct LayerRow {
    pub id: ElementId,
    pub kind: &'static str,
    pub label: String,
    pub selected: bool,
}

fn label(element: &Element) -> String {
    match &element.shape {
        Shape::Text { text, .. } => text.chars().take(24).collect(),
        shape => format!("{} {}", shape.kind(), element.id),
    }
}

/// User-placed elements, topmost first. The print guide and other locked aids are left out.
#[derive(Default)]
pub struct LayerList {
    rows: Vec<LayerRow>,
    renders: u64,
}
impl LayerList {
    pub fn render<E: EditingEngine>(&mut self, surface: &E) {
        let selection = surface.selection();
        self.rows = surface
            .elements()
            .iter()
            .rev()
            .filter(|element| element.selectable)
            .map(|element| LayerRow {
                id: element.id,
                kind: element.shape.kind(),
                label: label(element),
                selected: selection == Some(element.id),
            })
            .collect();
        self.renders += 1;
    }
    #[must_use]
    pub fn rows(&self) -> &[LayerRow] {
        &self.rows
    }
    /// How many times the list has been rebuilt.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Editable fields of the selected element.
#[derive(Clone, Debug, PartialEq)]
pub struct Properties {
    pub id: ElementId,
    pub kind: &'static str,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
    pub opacity: f32,
    pub fill: Color,
    pub text: Option<String>,
}

#[derive(Default)]
pub struct PropertiesPanel {
    shown: Option<Properties>,
}
impl PropertiesPanel {
    pub fn render<E: EditingEngine>(&mut self, surface: &E) {
        self.shown = surface.selection().and_then(|id| {
            let element = surface.elements().iter().find(|element| element.id == id)?;
            Some(Properties {
                id,
                kind: element.shape.kind(),
                left: element.left.get(),
                top: element.top.get(),
                width: element.width.get(),
                height: element.height.get(),
                angle: element.angle.get(),
                opacity: element.opacity.get(),
                fill: element.fill,
                text: match &element.shape {
                    Shape::Text { text, .. } => Some(text.clone()),
                    _ => None,
                },
            })
        });
    }
    #[must_use]
    pub fn shown(&self) -> Option<&Properties> {
        self.shown.as_ref()
    }
}

/// Everything in the side panel that reflects the active surface.
#[derive(Default)]
pub struct Panels {
    pub layers: LayerList,
    pub properties: PropertiesPanel,
    side: Option<Side>,
}
impl Panels {
    pub fn refresh<E: EditingEngine>(&mut self, side: Side, surface: &E) {
        self.side = Some(side);
        self.layers.render(surface);
        self.properties.render(surface);
    }
    /// Which surface the panels currently show.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        self.side
    }
}
