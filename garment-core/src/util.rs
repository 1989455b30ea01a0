//! Utility types, used throughout the crate.

/// An `f32` which is neither NaN nor infinite.
///
/// Element geometry is stored as `Finite` so snapshots always survive a JSON round trip,
/// which has no representation for NaN or infinities.
#[derive(Copy, Clone, PartialEq, PartialOrd, bytemuck::NoUninit, bytemuck::Zeroable, Debug)]
#[repr(transparent)]
pub struct Finite(f32);
impl Finite {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);
    pub fn new(val: f32) -> Result<Self, NotFinite> {
        if val.is_finite() {
            Ok(Self(val))
        } else {
            Err(NotFinite)
        }
    }
    /// Clamp infinities to the largest finite values, NaN to zero.
    /// For values coming from user input, where rejecting is worse than clamping.
    #[must_use]
    pub fn saturating(val: f32) -> Self {
        if val.is_nan() {
            Self::ZERO
        } else {
            Self(val.clamp(f32::MIN, f32::MAX))
        }
    }
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }
}
impl Default for Finite {
    fn default() -> Self {
        Self::ZERO
    }
}
impl TryFrom<f32> for Finite {
    type Error = NotFinite;
    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl From<Finite> for f32 {
    fn from(value: Finite) -> Self {
        value.get()
    }
}
impl std::fmt::Display for Finite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
impl serde::Serialize for Finite {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.0)
    }
}
impl<'de> serde::Deserialize<'de> for Finite {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <f32 as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("not finite")]
pub struct NotFinite;
