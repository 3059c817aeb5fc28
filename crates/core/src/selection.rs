//! Hierarchical item sets with cascading enable/disable.
//!
//! A [`Selection`] is used for every filter axis of a trace view: components,
//! event kinds and state kinds. Items form a tree; each carries a name, an
//! enabled flag and an open map of typed properties.
//!
//! Indexing an id outside the item universe is a caller bug and panics.

use std::collections::HashMap;
use std::ops::BitAnd;
use std::sync::Arc;

use lifeline_protocol::SharedStr;
use serde_json::Value;

/// Index of an item inside its selection.
pub type ItemId = usize;

#[derive(Debug, Clone)]
struct Item {
    name: SharedStr,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

/// Names and tree links. Shared between all selections cloned from the same
/// universe, so filtering a view copies only the flag vectors.
#[derive(Debug, Clone, Default)]
struct Universe {
    items: Vec<Item>,
    top_level: Vec<ItemId>,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    universe: Arc<Universe>,
    properties: Arc<Vec<HashMap<String, Value>>>,
    enabled: Vec<bool>,
    /// Set on items that were switched off by the upward cascade rather than
    /// by an explicit call.
    cascaded: Vec<bool>,
}

impl Selection {
    /// Parent link of top-level items.
    pub const ROOT: Option<ItemId> = None;

    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item under `parent`. New items start enabled.
    pub fn add_item(&mut self, name: impl Into<SharedStr>, parent: Option<ItemId>) -> ItemId {
        if let Some(p) = parent {
            self.check(p);
        }
        let id = self.enabled.len();
        let universe = Arc::make_mut(&mut self.universe);
        universe.items.push(Item {
            name: name.into(),
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => universe.items[p].children.push(id),
            None => universe.top_level.push(id),
        }
        Arc::make_mut(&mut self.properties).push(HashMap::new());
        self.enabled.push(true);
        self.cascaded.push(false);
        id
    }

    pub fn total_items_count(&self) -> usize {
        self.enabled.len()
    }

    /// Whether any item lives below the top level.
    pub fn has_subitems(&self) -> bool {
        self.universe.items.len() > self.universe.top_level.len()
    }

    pub fn item(&self, id: ItemId) -> &SharedStr {
        self.check(id);
        &self.universe.items[id].name
    }

    /// Children of `parent` in insertion order.
    pub fn items(&self, parent: Option<ItemId>) -> &[ItemId] {
        match parent {
            Some(p) => {
                self.check(p);
                &self.universe.items[p].children
            }
            None => &self.universe.top_level,
        }
    }

    pub fn items_count(&self, parent: Option<ItemId>) -> usize {
        self.items(parent).len()
    }

    pub fn has_children(&self, id: ItemId) -> bool {
        !self.items(Some(id)).is_empty()
    }

    /// The `index`-th child of `parent`.
    pub fn item_link(&self, index: usize, parent: Option<ItemId>) -> ItemId {
        self.items(parent)[index]
    }

    /// Look a child of `parent` up by name.
    pub fn find_item(&self, name: &str, parent: Option<ItemId>) -> Option<ItemId> {
        self.items(parent)
            .iter()
            .copied()
            .find(|&id| self.universe.items[id].name == name)
    }

    pub fn item_parent(&self, id: ItemId) -> Option<ItemId> {
        self.check(id);
        self.universe.items[id].parent
    }

    /// Position of `id` among its siblings.
    pub fn item_index(&self, id: ItemId) -> usize {
        let siblings = self.items(self.item_parent(id));
        siblings.iter().position(|&s| s == id).unwrap_or(0)
    }

    pub fn is_enabled(&self, id: ItemId) -> bool {
        self.check(id);
        self.enabled[id]
    }

    /// Enabled on the whole path from `id` up to the root.
    pub fn is_visible(&self, id: ItemId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if !self.is_enabled(c) {
                return false;
            }
            cur = self.universe.items[c].parent;
        }
        true
    }

    /// Set one item's flag and apply the cascade.
    ///
    /// * Disabling the last enabled child of an enabled parent disables the
    ///   parent, and so on upward.
    /// * Enabling an item with children, none of which is enabled, enables
    ///   all of them, and so on downward.
    /// * Enabling re-enables ancestors that the upward cascade switched off,
    ///   but never an ancestor that was disabled explicitly.
    pub fn set_enabled(&mut self, id: ItemId, enabled: bool) {
        self.check(id);
        self.enabled[id] = enabled;
        self.cascaded[id] = false;

        if enabled {
            self.reenable_cascaded_ancestors(id);
            self.enable_empty_subtrees(id);
        } else {
            self.disable_emptied_ancestors(id);
        }
    }

    fn disable_emptied_ancestors(&mut self, id: ItemId) {
        let mut cur = id;
        while let Some(parent) = self.universe.items[cur].parent {
            if !self.enabled[parent] || self.enabled_count(Some(parent)) > 0 {
                break;
            }
            self.enabled[parent] = false;
            self.cascaded[parent] = true;
            cur = parent;
        }
    }

    fn reenable_cascaded_ancestors(&mut self, id: ItemId) {
        let mut cur = id;
        while let Some(parent) = self.universe.items[cur].parent {
            if self.enabled[parent] || !self.cascaded[parent] {
                break;
            }
            self.enabled[parent] = true;
            self.cascaded[parent] = false;
            cur = parent;
        }
    }

    fn enable_empty_subtrees(&mut self, id: ItemId) {
        let mut worklist = vec![id];
        while let Some(link) = worklist.pop() {
            let children = &self.universe.items[link].children;
            if children.iter().any(|&c| self.enabled[c]) {
                continue;
            }
            for &child in children {
                self.enabled[child] = true;
                self.cascaded[child] = false;
                worklist.push(child);
            }
        }
    }

    pub fn enabled_items(&self, parent: Option<ItemId>) -> Vec<ItemId> {
        self.items(parent)
            .iter()
            .copied()
            .filter(|&id| self.enabled[id])
            .collect()
    }

    pub fn enabled_count(&self, parent: Option<ItemId>) -> usize {
        self.items(parent)
            .iter()
            .filter(|&&id| self.enabled[id])
            .count()
    }

    /// Enable the children of `parent`, and all their descendants when
    /// `recursive` is set. No cascade is applied.
    pub fn enable_all(&mut self, parent: Option<ItemId>, recursive: bool) -> &mut Self {
        self.fill(parent, recursive, true);
        self
    }

    /// Disable the children of `parent`, and all their descendants when
    /// `recursive` is set. No cascade is applied.
    pub fn disable_all(&mut self, parent: Option<ItemId>, recursive: bool) -> &mut Self {
        self.fill(parent, recursive, false);
        self
    }

    fn fill(&mut self, parent: Option<ItemId>, recursive: bool, value: bool) {
        let mut queue: Vec<ItemId> = self.items(parent).to_vec();
        while let Some(link) = queue.pop() {
            self.enabled[link] = value;
            self.cascaded[link] = false;
            if recursive {
                queue.extend_from_slice(&self.universe.items[link].children);
            }
        }
    }

    pub fn item_property(&self, id: ItemId, key: &str) -> Option<&Value> {
        self.check(id);
        self.properties[id].get(key)
    }

    pub fn set_item_property(&mut self, id: ItemId, key: impl Into<String>, value: impl Into<Value>) {
        self.check(id);
        Arc::make_mut(&mut self.properties)[id].insert(key.into(), value.into());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Two selections can be compared or intersected only when they were
    /// cloned from the same item set.
    pub fn same_universe(&self, other: &Selection) -> bool {
        self.total_items_count() == other.total_items_count()
    }

    fn check(&self, id: ItemId) {
        assert!(
            id < self.enabled.len(),
            "item id {id} outside selection of {} items",
            self.enabled.len()
        );
    }
}

/// Compares only the enabled flags.
impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        assert!(
            self.same_universe(other),
            "comparing selections over different item sets"
        );
        self.enabled == other.enabled
    }
}

impl BitAnd for &Selection {
    type Output = Selection;

    fn bitand(self, other: &Selection) -> Selection {
        assert!(
            self.same_universe(other),
            "intersecting selections over different item sets"
        );
        let mut result = self.clone();
        for (flag, &theirs) in result.enabled.iter_mut().zip(&other.enabled) {
            *flag = *flag && theirs;
        }
        result.cascaded.iter_mut().for_each(|c| *c = false);
        result
    }
}

impl BitAnd for Selection {
    type Output = Selection;

    fn bitand(self, other: Selection) -> Selection {
        &self & &other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// stand
    /// ├── node-a
    /// │   ├── cpu
    /// │   └── net
    /// └── node-b
    ///     └── disk
    fn tree() -> (Selection, [ItemId; 6]) {
        let mut s = Selection::new();
        let stand = s.add_item("stand", Selection::ROOT);
        let a = s.add_item("node-a", Some(stand));
        let cpu = s.add_item("cpu", Some(a));
        let net = s.add_item("net", Some(a));
        let b = s.add_item("node-b", Some(stand));
        let disk = s.add_item("disk", Some(b));
        (s, [stand, a, cpu, net, b, disk])
    }

    #[test]
    fn structure_accessors() {
        let (s, [stand, a, cpu, net, b, disk]) = tree();
        assert_eq!(s.total_items_count(), 6);
        assert_eq!(s.items(Selection::ROOT), &[stand]);
        assert_eq!(s.items(Some(a)), &[cpu, net]);
        assert_eq!(s.item(disk), "disk");
        assert_eq!(s.item_parent(disk), Some(b));
        assert_eq!(s.item_parent(stand), None);
        assert_eq!(s.item_index(net), 1);
        assert_eq!(s.item_link(1, Some(stand)), b);
        assert_eq!(s.find_item("net", Some(a)), Some(net));
        assert_eq!(s.find_item("net", Some(b)), None);
        assert!(s.has_children(a));
        assert!(!s.has_children(cpu));
        assert!(s.has_subitems());
    }

    #[test]
    fn disabling_last_child_disables_parent_upward() {
        let (mut s, [stand, _a, _cpu, _net, b, disk]) = tree();
        s.set_enabled(disk, false);
        assert!(!s.is_enabled(b));
        // stand still has node-a enabled
        assert!(s.is_enabled(stand));
    }

    #[test]
    fn disabling_one_of_two_children_keeps_parent() {
        let (mut s, [_, a, cpu, _net, _, _]) = tree();
        s.set_enabled(cpu, false);
        assert!(s.is_enabled(a));
    }

    #[test]
    fn cascade_reaches_the_top() {
        let (mut s, [stand, _a, cpu, net, _b, disk]) = tree();
        s.set_enabled(cpu, false);
        s.set_enabled(net, false);
        s.set_enabled(disk, false);
        assert!(!s.is_enabled(stand));
    }

    #[test]
    fn reenabling_child_restores_cascaded_parent() {
        let (mut s, [_, _, _, _, b, disk]) = tree();
        s.set_enabled(disk, false);
        assert!(!s.is_enabled(b));
        s.set_enabled(disk, true);
        assert!(s.is_enabled(disk));
        assert!(s.is_enabled(b));
    }

    #[test]
    fn explicitly_disabled_parent_stays_disabled() {
        let (mut s, [_, a, cpu, _net, _, _]) = tree();
        s.set_enabled(a, false);
        s.set_enabled(cpu, true);
        assert!(s.is_enabled(cpu));
        assert!(!s.is_enabled(a));
        assert!(!s.is_visible(cpu));
    }

    #[test]
    fn enabling_fully_disabled_subtree_enables_children() {
        let (mut s, [_, a, cpu, net, _, _]) = tree();
        s.disable_all(Some(a), true);
        s.set_enabled(a, false);
        s.set_enabled(a, true);
        assert!(s.is_enabled(cpu));
        assert!(s.is_enabled(net));
    }

    #[test]
    fn enabling_partially_enabled_subtree_leaves_children() {
        let (mut s, [_, a, cpu, net, _, _]) = tree();
        s.set_enabled(cpu, false);
        s.set_enabled(a, true);
        assert!(!s.is_enabled(cpu));
        assert!(s.is_enabled(net));
    }

    #[test]
    fn visibility_follows_path_to_root() {
        let (mut s, [stand, _a, cpu, _, _, _]) = tree();
        assert!(s.is_visible(cpu));
        s.disable_all(Selection::ROOT, false);
        assert!(!s.is_enabled(stand));
        assert!(s.is_enabled(cpu));
        assert!(!s.is_visible(cpu));
    }

    #[test]
    fn enable_disable_all_recursive() {
        let (mut s, [stand, a, cpu, net, b, disk]) = tree();
        s.disable_all(Some(stand), true);
        assert_eq!(s.enabled_items(Some(stand)), Vec::<ItemId>::new());
        assert!(!s.is_enabled(cpu) && !s.is_enabled(disk));
        s.enable_all(Some(stand), false);
        assert_eq!(s.enabled_items(Some(stand)), vec![a, b]);
        assert!(!s.is_enabled(net));
        assert_eq!(s.enabled_count(Some(a)), 0);
    }

    #[test]
    fn properties_are_typed_and_per_item() {
        let (mut s, [_, a, cpu, _, _, _]) = tree();
        s.set_item_property(a, "component", 7);
        s.set_item_property(cpu, "unit", "%");
        assert_eq!(s.item_property(a, "component"), Some(&Value::from(7)));
        assert_eq!(
            s.item_property(cpu, "unit").and_then(Value::as_str),
            Some("%")
        );
        assert!(s.item_property(a, "unit").is_none());
    }

    #[test]
    fn property_writes_do_not_leak_into_clones() {
        let (mut s, [_, a, _, _, _, _]) = tree();
        let before = s.clone();
        s.set_item_property(a, "k", true);
        assert!(before.item_property(a, "k").is_none());
    }

    #[test]
    fn equality_compares_flags_only() {
        let (s, [_, _, cpu, _, _, _]) = tree();
        let mut other = s.clone();
        assert_eq!(s, other);
        other.set_enabled(cpu, false);
        assert_ne!(s, other);
    }

    #[test]
    fn intersection_is_logical_and() {
        let (s, [_, _, cpu, net, _, disk]) = tree();
        let mut x = s.clone();
        x.set_enabled(cpu, false);
        let mut y = s.clone();
        y.set_enabled(net, false);
        let both = &x & &y;
        assert!(!both.is_enabled(cpu));
        assert!(!both.is_enabled(net));
        assert!(both.is_enabled(disk));
    }

    #[test]
    #[should_panic(expected = "outside selection")]
    fn out_of_range_id_panics() {
        let (s, _) = tree();
        let _ = s.is_enabled(42);
    }

    #[test]
    #[should_panic(expected = "different item sets")]
    fn intersecting_foreign_universe_panics() {
        let (s, _) = tree();
        let mut other = Selection::new();
        other.add_item("x", Selection::ROOT);
        let _ = &s & &other;
    }

    #[test]
    fn clear_empties_everything() {
        let (mut s, _) = tree();
        s.clear();
        assert_eq!(s.total_items_count(), 0);
        assert!(s.items(Selection::ROOT).is_empty());
    }
}
