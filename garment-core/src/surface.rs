//! # Surfaces
//!
//! A garment has two independently editable design areas, [`Side::Front`] and [`Side::Back`].
//! The side is the identity everything else (history, preview, mounts) is keyed by.

/// Logical size of a surface, in CSS pixels. The on-screen size is fit to the container, keeping this aspect.
pub const SURFACE_SIZE: [u32; 2] = [500, 700];
/// Height over width.
pub const SURFACE_ASPECT: f32 = 700.0 / 500.0;

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}
impl Side {
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];
    /// Dense index, for per-side arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Full serialized state of one surface at one instant.
///
/// Opaque to everyone but the editing engine that produced it. Cloning is cheap and the contents
/// can never change after construction.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Snapshot(std::sync::Arc<str>);
impl Snapshot {
    #[must_use]
    pub fn new(serialized: impl Into<std::sync::Arc<str>>) -> Self {
        Self(serialized.into())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// Size of the serialized data, in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Snapshots can be huge (embedded images), don't dump them into logs.
        write!(
            f,
            "Snapshot({})",
            human_bytes::human_bytes(self.0.len() as f64)
        )
    }
}
