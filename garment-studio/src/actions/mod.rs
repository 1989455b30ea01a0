pub mod hotkeys;

/// Things the user can ask for with a single keypress.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum Action {
    Undo,
    Redo,
    /// Remove the selected element.
    Delete,
    Duplicate,
    /// Flip between the front and back surfaces.
    SwitchSide,
    ZoomIn,
    ZoomOut,
    SaveDesign,
}
