//! # IDs
//! Unique, namespaced IDs via [`StudioID<T>`]. IDs of different namespaces may share a numeric value
//! but are different types, so they can never be compared by accident.
//!
//! Fresh IDs come from [`Default`]. IDs that come back from a serialized snapshot are *observed*
//! on deserialization, bumping the namespace counter past them, so a design saved by a previous run
//! never collides with IDs handed out afterwards.

// Next available ID per namespace.
static ID_SERVER: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, std::sync::atomic::AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID that is unique within its namespace for this execution of the program.
pub struct StudioID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    _phantom: std::marker::PhantomData<T>,
}
impl<T: std::any::Any> Clone for StudioID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for StudioID<T> {}
impl<T: std::any::Any> PartialEq for StudioID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for StudioID<T> {}
impl<T: std::any::Any> std::hash::Hash for StudioID<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Safety: only a u64 is stored, the marker type is never instantiated.
unsafe impl<T: std::any::Any> Send for StudioID<T> {}
unsafe impl<T: std::any::Any> Sync for StudioID<T> {}

fn with_counter<R>(f: impl FnOnce(&std::sync::atomic::AtomicU64) -> R, ty: std::any::TypeId) -> R {
    let read = ID_SERVER.upgradable_read();
    if let Some(counter) = read.get(&ty) {
        f(counter)
    } else {
        // Only happens once per namespace.
        let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
        let counter = write
            .entry(ty)
            .or_insert_with(|| std::sync::atomic::AtomicU64::new(1));
        f(counter)
    }
}

impl<T: std::any::Any> StudioID<T> {
    /// Raw numeric value. Only meaningful within this namespace.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id.get()
    }
    /// Allocate a never-before-seen ID.
    #[must_use]
    pub fn fresh() -> Self {
        let id = with_counter(
            |counter| counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            std::any::TypeId::of::<T>(),
        );
        // Counter starts at one and only grows.
        let Some(id) = std::num::NonZeroU64::new(id) else {
            log::error!("{} ID space exhausted!", std::any::type_name::<T>());
            panic!("{} ID overflow", std::any::type_name::<T>());
        };
        Self {
            id,
            _phantom: std::marker::PhantomData,
        }
    }
    /// Re-create an ID from its raw value, making sure no future [`Self::fresh`] returns it.
    ///
    /// `None` for `u64::MAX`, which would leave no fresh ID after it.
    #[must_use]
    pub fn observe(raw: std::num::NonZeroU64) -> Option<Self> {
        let next = raw.get().checked_add(1)?;
        with_counter(
            |counter| counter.fetch_max(next, std::sync::atomic::Ordering::Relaxed),
            std::any::TypeId::of::<T>(),
        );
        Some(Self {
            id: raw,
            _phantom: std::marker::PhantomData,
        })
    }
}
impl<T: std::any::Any> Default for StudioID<T> {
    fn default() -> Self {
        Self::fresh()
    }
}
impl<T: std::any::Any> std::fmt::Display for StudioID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // rsplit always yields at least one item.
        let name = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or_default();
        write!(f, "{name}#{}", self.id)
    }
}
impl<T: std::any::Any> std::fmt::Debug for StudioID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
impl<T: std::any::Any> serde::Serialize for StudioID<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.id.get())
    }
}
impl<'de, T: std::any::Any> serde::Deserialize<'de> for StudioID<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <std::num::NonZeroU64 as serde::Deserialize>::deserialize(deserializer)?;
        Self::observe(raw).ok_or_else(|| {
            <D::Error as serde::de::Error>::invalid_value(
                serde::de::Unexpected::Unsigned(raw.get()),
                &"an id below u64::MAX",
            )
        })
    }
}
