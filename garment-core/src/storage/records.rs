//! The documents kept in client storage, and their keys.

use crate::{
    color::Color,
    pricing::{PriceSettings, Size},
    surface::{Side, Snapshot},
};

pub const COLORS_KEY: &str = "ultra_colors_v3";
pub const STICKERS_KEY: &str = "ultra_stickers_v3";
pub const SETTINGS_KEY: &str = "ultra_settings_v3";
pub const CART_KEY: &str = "ultra_ware_v3";
pub const DESIGN_KEY: &str = "ultra_design_v3";

/// A reusable image the user saved.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SavedSticker {
    pub name: String,
    /// Image data URL.
    pub payload: String,
}

/// Price settings as stored.
pub type SavedSettings = PriceSettings;

/// One order line in the cart.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CartLine {
    pub size: Size,
    pub qty: u32,
    pub total: u64,
    /// Front preview at the time the line was added, as a data URL.
    pub preview: String,
}

/// Everything needed to bring a design back: both surfaces plus the garment choices.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SavedDesign {
    pub front: Snapshot,
    pub back: Snapshot,
    pub size: Size,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}
impl SavedDesign {
    #[must_use]
    pub fn surface(&self, side: Side) -> &Snapshot {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn design_document_shape() {
        let design = SavedDesign {
            front: Snapshot::new(r#"{"objects":[]}"#),
            back: Snapshot::new("{}"),
            size: Size::L,
            color: Color::rgb(0x22, 0x33, 0x44),
            saved_at: None,
        };
        let json = serde_json::to_value(&design).unwrap();
        assert_eq!(json["size"], "L");
        assert_eq!(json["color"], "#223344");
        assert_eq!(json["front"], r#"{"objects":[]}"#);
        assert!(json.get("saved_at").is_none());
        let back: SavedDesign = serde_json::from_value(json).unwrap();
        assert_eq!(back.surface(Side::Front), &design.front);
    }
}
