//! Elements placed on a surface, as the editing engine describes them.

use crate::{color::Color, util::Finite};

pub type ElementId = crate::StudioID<Element>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rect,
    Circle,
    Triangle,
    Text {
        text: String,
        #[serde(rename = "fontSize")]
        font_size: Finite,
    },
    /// An image, embedded as a data URL.
    Image { src: String },
}
impl Shape {
    /// Short name for layer lists.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }
}

fn selectable_default() -> bool {
    true
}
fn opacity_default() -> Finite {
    Finite::ONE
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub shape: Shape,
    pub left: Finite,
    pub top: Finite,
    pub width: Finite,
    pub height: Finite,
    #[serde(default)]
    pub angle: Finite,
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default = "opacity_default")]
    pub opacity: Finite,
    /// Non-selectable elements are visual aids (the print guide) and are hidden from the user.
    #[serde(default = "selectable_default")]
    pub selectable: bool,
}
impl Element {
    #[must_use]
    pub fn new(shape: Shape, [left, top]: [f32; 2], [width, height]: [f32; 2], fill: Color) -> Self {
        Self {
            id: ElementId::fresh(),
            shape,
            left: Finite::saturating(left),
            top: Finite::saturating(top),
            width: Finite::saturating(width.max(0.0)),
            height: Finite::saturating(height.max(0.0)),
            angle: Finite::ZERO,
            fill,
            stroke: None,
            opacity: Finite::ONE,
            selectable: true,
        }
    }
    #[must_use]
    pub fn with_stroke(mut self, stroke: Color) -> Self {
        self.stroke = Some(stroke);
        self
    }
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.selectable = false;
        self
    }
    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ElementPatch) {
        let set = |field: &mut Finite, value: Option<f32>| {
            if let Some(value) = value {
                *field = Finite::saturating(value);
            }
        };
        set(&mut self.left, patch.left);
        set(&mut self.top, patch.top);
        set(&mut self.width, patch.width.map(|w| w.max(0.0)));
        set(&mut self.height, patch.height.map(|h| h.max(0.0)));
        set(&mut self.angle, patch.angle);
        set(&mut self.opacity, patch.opacity.map(|o| o.clamp(0.0, 1.0)));
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let (Some(new_text), Shape::Text { text, .. }) = (&patch.text, &mut self.shape) {
            text.clone_from(new_text);
        }
    }
}

/// A partial update of an [`Element`]. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementPatch {
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub angle: Option<f32>,
    pub opacity: Option<f32>,
    pub fill: Option<Color>,
    /// Only meaningful for text elements.
    pub text: Option<String>,
}
impl ElementPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
    #[must_use]
    pub fn moved_to(left: f32, top: f32) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn snapshot_shape() {
        let element = Element::new(
            Shape::Text {
                text: "hi".into(),
                font_size: Finite::new(24.0).unwrap(),
            },
            [10.0, 20.0],
            [100.0, 30.0],
            Color::BLACK,
        );
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["fontSize"], 24.0);
        assert_eq!(json["fill"], "#000000");
        assert_eq!(json["selectable"], true);
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
    #[test]
    fn patch_applies() {
        let mut element = Element::new(Shape::Rect, [0.0, 0.0], [10.0, 10.0], Color::WHITE);
        element.apply(&ElementPatch {
            width: Some(-5.0),
            opacity: Some(4.0),
            text: Some("ignored".into()),
            ..ElementPatch::moved_to(3.0, f32::NAN)
        });
        assert_eq!(element.left.get(), 3.0);
        assert_eq!(element.top.get(), 0.0);
        assert_eq!(element.width.get(), 0.0);
        assert_eq!(element.opacity.get(), 1.0);
        assert_eq!(element.shape, Shape::Rect);
    }
}
