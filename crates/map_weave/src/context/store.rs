//! Typed, tagged component store: the shared blackboard of a generation run.
//!
//! Components are keyed by their concrete type plus an optional string tag, so
//! multiple components of one type can coexist under different tags. Lookups
//! walk entries most-recent-first, letting later steps override earlier
//! defaults. A lookup with no tag matches any tag; a tagged lookup is exact.
//!
//! Retrieval by abstract view (e.g. `dyn GridViewMut<bool>` for a concrete
//! grid type) is explicit: the component must be registered together with a
//! [`ViewCaster`] for that view. There is no implicit subtype matching.
use std::any::{type_name, Any, TypeId};

use crate::error::{Error, Result};

/// Cast functions wiring a concrete component type to an abstract view `V`,
/// registered alongside the component via [`ComponentStore::add_with_view`].
pub struct ViewCaster<V: ?Sized + 'static> {
    cast_ref: Box<dyn Fn(&dyn Any) -> Option<&V>>,
    cast_mut: Box<dyn Fn(&mut dyn Any) -> Option<&mut V>>,
}

impl<V: ?Sized + 'static> ViewCaster<V> {
    /// Build a caster for concrete component type `C`.
    pub fn of<C: Any>(cast_ref: fn(&C) -> &V, cast_mut: fn(&mut C) -> &mut V) -> Self {
        Self {
            cast_ref: Box::new(move |any| any.downcast_ref::<C>().map(cast_ref)),
            cast_mut: Box::new(move |any| any.downcast_mut::<C>().map(cast_mut)),
        }
    }
}

struct ViewSlot {
    view_id: TypeId,
    caster: Box<dyn Any>,
}

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    tag: Option<String>,
    value: Box<dyn Any>,
    views: Vec<ViewSlot>,
}

fn tag_matches(entry_tag: Option<&str>, query: Option<&str>) -> bool {
    match query {
        None => true,
        Some(tag) => entry_tag == Some(tag),
    }
}

/// Heterogeneous container keyed by (component type, optional tag).
#[derive(Default)]
pub struct ComponentStore {
    entries: Vec<Entry>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a component under `tag`. Fails with
    /// [`Error::DuplicateComponent`] if the exact (type, tag) pair exists.
    pub fn add<T: Any>(&mut self, component: T, tag: Option<&str>) -> Result<()> {
        self.insert(component, tag, Vec::new())
    }

    /// Like [`ComponentStore::add`], but also registers the component as
    /// retrievable through the abstract view `V`.
    pub fn add_with_view<C: Any, V: ?Sized + 'static>(
        &mut self,
        component: C,
        tag: Option<&str>,
        caster: ViewCaster<V>,
    ) -> Result<()> {
        let views = vec![ViewSlot {
            view_id: TypeId::of::<V>(),
            caster: Box::new(caster),
        }];
        self.insert(component, tag, views)
    }

    fn insert<C: Any>(
        &mut self,
        component: C,
        tag: Option<&str>,
        views: Vec<ViewSlot>,
    ) -> Result<()> {
        if self.has_exact(TypeId::of::<C>(), tag) {
            return Err(Error::DuplicateComponent {
                type_name: type_name::<C>(),
                tag: tag.map(str::to_owned),
            });
        }
        self.entries.push(Entry {
            type_id: TypeId::of::<C>(),
            type_name: type_name::<C>(),
            tag: tag.map(str::to_owned),
            value: Box::new(component),
            views,
        });
        Ok(())
    }

    fn has_exact(&self, type_id: TypeId, tag: Option<&str>) -> bool {
        self.entries
            .iter()
            .any(|e| e.type_id == type_id && e.tag.as_deref() == tag)
    }

    /// Most recently added component of concrete type `T` matching `tag`
    /// (`None` matches any tag).
    pub fn get_first<T: Any>(&self, tag: Option<&str>) -> Option<&T> {
        self.entries
            .iter()
            .rev()
            .filter(|e| tag_matches(e.tag.as_deref(), tag))
            .find_map(|e| e.value.downcast_ref::<T>())
    }

    pub fn get_first_mut<T: Any>(&mut self, tag: Option<&str>) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .rev()
            .filter(|e| tag_matches(e.tag.as_deref(), tag))
            .find_map(|e| e.value.downcast_mut::<T>())
    }

    /// Most recently added component registered with a view caster for `V`.
    /// This is the explicit polymorphic lookup variant: concrete components
    /// are only found here if they were added with a matching caster.
    pub fn get_first_view<V: ?Sized + 'static>(&self, tag: Option<&str>) -> Option<&V> {
        let view_id = TypeId::of::<V>();
        for entry in self.entries.iter().rev() {
            if !tag_matches(entry.tag.as_deref(), tag) {
                continue;
            }
            for slot in &entry.views {
                if slot.view_id != view_id {
                    continue;
                }
                if let Some(caster) = slot.caster.downcast_ref::<ViewCaster<V>>() {
                    if let Some(view) = (caster.cast_ref)(entry.value.as_ref()) {
                        return Some(view);
                    }
                }
            }
        }
        None
    }

    pub fn get_first_view_mut<V: ?Sized + 'static>(&mut self, tag: Option<&str>) -> Option<&mut V> {
        let idx = self.find_view_index(TypeId::of::<V>(), tag)?;
        self.view_at_mut(idx)
    }

    /// Existing component of type `T`, or the result of `factory` added under
    /// `tag` and returned.
    pub fn get_first_or_new<T: Any>(
        &mut self,
        tag: Option<&str>,
        factory: impl FnOnce() -> T,
    ) -> &mut T {
        let type_id = TypeId::of::<T>();
        let idx = self
            .entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.type_id == type_id && tag_matches(e.tag.as_deref(), tag))
            .map(|(i, _)| i);
        let idx = match idx {
            Some(idx) => idx,
            None => {
                self.entries.push(Entry {
                    type_id,
                    type_name: type_name::<T>(),
                    tag: tag.map(str::to_owned),
                    value: Box::new(factory()),
                    views: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        self.entries[idx]
            .value
            .downcast_mut::<T>()
            .expect("entry type id matches T")
    }

    /// Existing view `V`, or a new `C` from `factory` added under `tag` with
    /// the given caster, returned as the view.
    pub fn view_or_new<C: Any, V: ?Sized + 'static>(
        &mut self,
        tag: Option<&str>,
        factory: impl FnOnce() -> C,
        caster: ViewCaster<V>,
    ) -> &mut V {
        let view_id = TypeId::of::<V>();
        let idx = match self.find_view_index(view_id, tag) {
            Some(idx) => idx,
            None => {
                self.entries.push(Entry {
                    type_id: TypeId::of::<C>(),
                    type_name: type_name::<C>(),
                    tag: tag.map(str::to_owned),
                    value: Box::new(factory()),
                    views: vec![ViewSlot {
                        view_id,
                        caster: Box::new(caster),
                    }],
                });
                self.entries.len() - 1
            }
        };
        self.view_at_mut(idx)
            .expect("registered view caster matches component")
    }

    fn find_view_index(&self, view_id: TypeId, tag: Option<&str>) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| {
                tag_matches(e.tag.as_deref(), tag) && e.views.iter().any(|s| s.view_id == view_id)
            })
            .map(|(i, _)| i)
    }

    fn view_at_mut<V: ?Sized + 'static>(&mut self, idx: usize) -> Option<&mut V> {
        let view_id = TypeId::of::<V>();
        let entry = &mut self.entries[idx];
        let value = entry.value.as_mut();
        entry
            .views
            .iter()
            .find(|s| s.view_id == view_id)
            .and_then(|s| s.caster.downcast_ref::<ViewCaster<V>>())
            .and_then(|caster| (caster.cast_mut)(value))
    }

    /// Remove all components of type `T` under exactly `tag` (`None` removes
    /// only the untagged entry). Returns whether anything was removed.
    pub fn remove<T: Any>(&mut self, tag: Option<&str>) -> bool {
        let type_id = TypeId::of::<T>();
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.type_id == type_id && e.tag.as_deref() == tag));
        self.entries.len() != before
    }

    /// Whether any entry matches `T` by concrete type or registered view.
    pub fn contains<T: ?Sized + 'static>(&self, tag: Option<&str>) -> bool {
        self.contains_type_id(TypeId::of::<T>(), tag)
    }

    pub fn contains_type_id(&self, id: TypeId, tag: Option<&str>) -> bool {
        self.entries.iter().any(|e| {
            tag_matches(e.tag.as_deref(), tag)
                && (e.type_id == id || e.views.iter().any(|s| s.view_id == id))
        })
    }

    /// (type name, tag) pairs of all stored components, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.entries.iter().map(|e| (e.type_name, e.tag.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::grid::{grid_caster, Grid, GridView, GridViewMut};

    #[test]
    fn add_rejects_exact_duplicates() {
        let mut store = ComponentStore::new();
        store.add(7u32, Some("counter")).unwrap();
        let err = store.add(9u32, Some("counter")).unwrap_err();
        assert!(matches!(err, Error::DuplicateComponent { .. }));

        // Same type under another tag (or untagged) is fine.
        store.add(9u32, Some("other")).unwrap();
        store.add(11u32, None).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn untagged_and_tagged_are_distinct_keys() {
        let mut store = ComponentStore::new();
        store.add(1u32, None).unwrap();
        assert!(store.add(2u32, None).is_err());
        store.add(2u32, Some("a")).unwrap();
    }

    #[test]
    fn get_first_prefers_most_recent() {
        let mut store = ComponentStore::new();
        store.add(1u32, Some("a")).unwrap();
        store.add(2u32, Some("b")).unwrap();

        // No tag filter: last write wins across tags.
        assert_eq!(store.get_first::<u32>(None), Some(&2));
        // Exact tag lookup.
        assert_eq!(store.get_first::<u32>(Some("a")), Some(&1));
        assert_eq!(store.get_first::<u32>(Some("missing")), None);
    }

    #[test]
    fn view_lookup_requires_registration() {
        let mut store = ComponentStore::new();
        store.add(Grid::<bool>::new(3, 3), Some("plain")).unwrap();
        store
            .add_with_view(Grid::<bool>::new(4, 4), Some("viewed"), grid_caster::<bool>())
            .unwrap();

        // The plain entry is invisible to the polymorphic query.
        assert!(store
            .get_first_view::<dyn GridViewMut<bool>>(Some("plain"))
            .is_none());
        let view = store
            .get_first_view::<dyn GridViewMut<bool>>(Some("viewed"))
            .unwrap();
        assert_eq!(view.width(), 4);
    }

    #[test]
    fn view_lookup_is_last_write_wins_across_tags() {
        let mut store = ComponentStore::new();
        store
            .add_with_view(Grid::<bool>::new(3, 3), Some("first"), grid_caster::<bool>())
            .unwrap();
        store
            .add_with_view(Grid::<bool>::new(5, 5), Some("second"), grid_caster::<bool>())
            .unwrap();

        let view = store.get_first_view::<dyn GridViewMut<bool>>(None).unwrap();
        assert_eq!(view.width(), 5);
    }

    #[test]
    fn view_mut_writes_through_to_component() {
        let mut store = ComponentStore::new();
        store
            .add_with_view(Grid::<bool>::new(3, 3), Some("g"), grid_caster::<bool>())
            .unwrap();

        let view = store
            .get_first_view_mut::<dyn GridViewMut<bool>>(Some("g"))
            .unwrap();
        view.set(IVec2::new(1, 1), true);

        let grid = store.get_first::<Grid<bool>>(Some("g")).unwrap();
        assert!(grid.get(IVec2::new(1, 1)));
    }

    #[test]
    fn get_first_or_new_constructs_once() {
        let mut store = ComponentStore::new();
        let list = store.get_first_or_new(Some("numbers"), Vec::<u32>::new);
        list.push(1);
        let list = store.get_first_or_new(Some("numbers"), Vec::<u32>::new);
        list.push(2);
        assert_eq!(store.get_first::<Vec<u32>>(Some("numbers")).unwrap(), &[1, 2]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn view_or_new_creates_default_when_absent() {
        let mut store = ComponentStore::new();
        {
            let view = store.view_or_new::<Grid<bool>, dyn GridViewMut<bool>>(
                Some("WallFloor"),
                || Grid::new(10, 8),
                grid_caster::<bool>(),
            );
            view.set(IVec2::new(2, 2), true);
        }
        // Second call reuses the stored grid.
        let view = store.view_or_new::<Grid<bool>, dyn GridViewMut<bool>>(
            Some("WallFloor"),
            || Grid::new(1, 1),
            grid_caster::<bool>(),
        );
        assert_eq!(view.width(), 10);
        assert!(view.get(IVec2::new(2, 2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_is_exact_on_type_and_tag() {
        let mut store = ComponentStore::new();
        store.add(1u32, Some("a")).unwrap();
        store.add(2u32, None).unwrap();

        assert!(!store.remove::<u32>(Some("b")));
        assert!(store.remove::<u32>(Some("a")));
        assert!(store.remove::<u32>(None));
        assert!(store.is_empty());
    }

    #[test]
    fn contains_sees_views_and_concrete_types() {
        let mut store = ComponentStore::new();
        store
            .add_with_view(Grid::<bool>::new(2, 2), Some("g"), grid_caster::<bool>())
            .unwrap();
        assert!(store.contains::<Grid<bool>>(Some("g")));
        assert!(store.contains::<dyn GridViewMut<bool>>(Some("g")));
        assert!(!store.contains::<dyn GridViewMut<bool>>(Some("other")));
    }
}
