//! Registry of objects that take part in layout
//!
//! Every participant is addressed by a stable identity ([`LocatableId`]). The
//! registry assigns each identity a column block of the linear system in
//! registration order; indices are only resolved when the system is built.

use std::fmt;

use super::types::CanvasLocation;

/// The minimal capability needed to be positioned by the solver
pub trait Locatable {
    /// Intrinsic width in pixels, if the object has one
    fn width(&self) -> Option<f64> {
        None
    }

    /// Intrinsic height in pixels, if the object has one
    fn height(&self) -> Option<f64> {
        None
    }

    /// Receive the solved pixel rectangle
    fn set_location(&mut self, location: CanvasLocation);
}

/// Index of a canvas in its image's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanvasId(pub(crate) usize);

impl CanvasId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a free-standing (non-canvas) locatable owned by an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) usize);

/// Identity of anything that can be registered for layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatableId {
    Canvas(CanvasId),
    Item(ItemId),
}

impl From<CanvasId> for LocatableId {
    fn from(id: CanvasId) -> Self {
        LocatableId::Canvas(id)
    }
}

impl From<ItemId> for LocatableId {
    fn from(id: ItemId) -> Self {
        LocatableId::Item(id)
    }
}

impl fmt::Display for LocatableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatableId::Canvas(id) => write!(f, "canvas #{}", id.0),
            LocatableId::Item(id) => write!(f, "item #{}", id.0),
        }
    }
}

/// Ordered, de-duplicated list of registered locatables
#[derive(Debug, Clone, Default)]
pub struct LocatableRegistry {
    entries: Vec<LocatableId>,
}

impl LocatableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locatable.
    ///
    /// Returns the new index, or `None` if it was already registered. A repeat
    /// registration never disturbs existing indices.
    pub fn add(&mut self, id: LocatableId) -> Option<usize> {
        if self.entries.contains(&id) {
            return None;
        }
        self.entries.push(id);
        Some(self.entries.len() - 1)
    }

    /// Column-block index of a registered locatable
    pub fn index_of(&self, id: LocatableId) -> Option<usize> {
        self.entries.iter().position(|&e| e == id)
    }

    pub fn contains(&self, id: LocatableId) -> bool {
        self.entries.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = LocatableId> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, index: usize) -> Option<LocatableId> {
        self.entries.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(i: usize) -> LocatableId {
        LocatableId::Canvas(CanvasId(i))
    }

    #[test]
    fn test_add_assigns_sequential_indices() {
        let mut registry = LocatableRegistry::new();
        assert_eq!(registry.add(canvas(0)), Some(0));
        assert_eq!(registry.add(canvas(3)), Some(1));
        assert_eq!(registry.add(LocatableId::Item(ItemId(0))), Some(2));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let mut registry = LocatableRegistry::new();
        registry.add(canvas(0));
        registry.add(canvas(1));
        assert_eq!(registry.add(canvas(0)), None);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of(canvas(1)), Some(1));
    }

    #[test]
    fn test_unknown_index_is_none() {
        let registry = LocatableRegistry::new();
        assert_eq!(registry.index_of(canvas(7)), None);
        assert!(registry.is_empty());
    }
}
