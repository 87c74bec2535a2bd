//! Reference graph: a union-find arena of identifier equivalence classes.
//!
//! Every occurrence key belongs to exactly one live class. Merging links the
//! class with fewer occurrences under the other (ties: the larger canonical
//! key is linked under the smaller), OR-merges flags and moves occurrences,
//! so nothing is ever dropped.

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::index::OccurrenceKey;
use crate::oracle::Occurrence;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct RefFlags: u8 {
        /// Never renamed.
        const FIXED         = 1 << 0;
        /// Structural member name; allocated in the global signature namespace.
        const SIGNATURE     = 1 << 1;
        /// Capitalised JSX tag; allocated from the upper-case alphabet.
        const JSX_COMPONENT = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RefId(u32);

impl RefId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefNode {
    /// Canonical key: the first occurrence the node was created for.
    pub key: OccurrenceKey,
    pub name: String,
    pub occurrences: Vec<Occurrence>,
    pub flags: RefFlags,
    /// Parent in the union-find forest; `None` for a root.
    pub link: Option<RefId>,
}

impl RefNode {
    pub fn is_fixed(&self) -> bool {
        self.flags.contains(RefFlags::FIXED)
    }
}

#[derive(Debug, Default)]
pub struct RefGraph {
    nodes: Vec<RefNode>,
    by_key: FxHashMap<OccurrenceKey, RefId>,
    /// Project-wide member classes, one per spelling.
    members: FxHashMap<String, RefId>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a class for `key`, or join the class that already owns it.
    /// Occurrences already owned by another class merge that class in.
    pub fn add_node(
        &mut self,
        key: OccurrenceKey,
        name: &str,
        occurrences: impl IntoIterator<Item = Occurrence>,
        flags: RefFlags,
    ) -> RefId {
        let mut id = match self.by_key.get(&key) {
            Some(&existing) => self.find(existing),
            None => {
                let id = RefId(self.nodes.len() as u32);
                self.nodes.push(RefNode {
                    key,
                    name: name.to_string(),
                    occurrences: Vec::new(),
                    flags: RefFlags::empty(),
                    link: None,
                });
                id
            }
        };
        self.nodes[id.index()].flags |= flags;

        let mut occurrences: Vec<Occurrence> = occurrences.into_iter().collect();
        if !occurrences.iter().any(|o| o.key == key) && !self.by_key.contains_key(&key) {
            occurrences.insert(
                0,
                Occurrence {
                    key,
                    len: name.len() as u32,
                },
            );
        }
        for occurrence in occurrences {
            id = self.add_occurrence(id, occurrence);
        }
        self.find(id)
    }

    /// Add one occurrence to the class of `id`, merging with its current
    /// owner if it already has one. Returns the surviving root.
    pub fn add_occurrence(&mut self, id: RefId, occurrence: Occurrence) -> RefId {
        let root = self.find(id);
        match self.by_key.get(&occurrence.key) {
            Some(&owner) => self.union(root, owner),
            None => {
                self.by_key.insert(occurrence.key, root);
                self.nodes[root.index()].occurrences.push(occurrence);
                root
            }
        }
    }

    /// Root of `id`, compressing the path on the way.
    pub fn find(&mut self, id: RefId) -> RefId {
        let mut root = id;
        while let Some(parent) = self.nodes[root.index()].link {
            root = parent;
        }
        let mut current = id;
        while let Some(parent) = self.nodes[current.index()].link {
            if parent == root {
                break;
            }
            self.nodes[current.index()].link = Some(root);
            current = parent;
        }
        root
    }

    /// Root of `id` without mutating the forest.
    pub fn root(&self, id: RefId) -> RefId {
        let mut root = id;
        while let Some(parent) = self.nodes[root.index()].link {
            root = parent;
        }
        root
    }

    pub fn union(&mut self, a: RefId, b: RefId) -> RefId {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return a;
        }

        let (parent, child) = {
            let na = &self.nodes[a.index()];
            let nb = &self.nodes[b.index()];
            let a_wins = match na.occurrences.len().cmp(&nb.occurrences.len()) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Less => false,
                std::cmp::Ordering::Equal => na.key < nb.key,
            };
            if a_wins { (a, b) } else { (b, a) }
        };

        tracing::trace!(
            parent = %self.nodes[parent.index()].name,
            child = %self.nodes[child.index()].name,
            "merging reference classes"
        );

        let moved = std::mem::take(&mut self.nodes[child.index()].occurrences);
        let flags = self.nodes[child.index()].flags;
        self.nodes[child.index()].link = Some(parent);
        let node = &mut self.nodes[parent.index()];
        node.flags |= flags;
        node.occurrences.extend(moved);
        parent
    }

    /// Class owning `key`, if any.
    pub fn class_of(&self, key: OccurrenceKey) -> Option<RefId> {
        self.by_key.get(&key).map(|&id| self.root(id))
    }

    pub fn mark(&mut self, id: RefId, flags: RefFlags) {
        let root = self.find(id);
        self.nodes[root.index()].flags |= flags;
    }

    pub fn node(&self, id: RefId) -> &RefNode {
        &self.nodes[self.root(id).index()]
    }

    /// Live classes, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = RefId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.link.is_none())
            .map(|(idx, _)| RefId(idx as u32))
    }

    /// Join `id` into the member class for `name`, creating it on first use.
    pub fn join_member(&mut self, name: &str, id: RefId) -> RefId {
        match self.members.get(name).copied() {
            Some(class) => self.union(class, id),
            None => {
                self.members.insert(name.to_string(), id);
                self.find(id)
            }
        }
    }

    pub fn member_class(&self, name: &str) -> Option<RefId> {
        self.members.get(name).map(|&id| self.root(id))
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn occurrence_count(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FileId;

    fn occ(file: usize, offset: u32, len: u32) -> Occurrence {
        Occurrence {
            key: OccurrenceKey::new(FileId::new(file), offset),
            len,
        }
    }

    #[test]
    fn larger_class_absorbs_smaller() {
        let mut graph = RefGraph::new();
        let big = graph.add_node(occ(0, 10, 3).key, "foo", [occ(0, 10, 3), occ(0, 20, 3)], RefFlags::empty());
        let small = graph.add_node(occ(0, 1, 3).key, "foo", [occ(0, 1, 3)], RefFlags::FIXED);
        let root = graph.union(small, big);
        assert_eq!(root, big);
        assert!(graph.node(small).is_fixed());
        assert_eq!(graph.node(root).occurrences.len(), 3);
    }

    #[test]
    fn ties_keep_the_smaller_canonical_key() {
        let mut graph = RefGraph::new();
        let later = graph.add_node(occ(1, 0, 1).key, "a", [], RefFlags::empty());
        let earlier = graph.add_node(occ(0, 5, 1).key, "a", [], RefFlags::empty());
        assert_eq!(graph.union(later, earlier), earlier);
    }

    #[test]
    fn shared_occurrence_merges_classes() {
        let mut graph = RefGraph::new();
        let first = graph.add_node(occ(0, 0, 1).key, "a", [occ(0, 0, 1), occ(0, 8, 1)], RefFlags::empty());
        let second = graph.add_node(occ(0, 4, 1).key, "a", [occ(0, 4, 1), occ(0, 8, 1)], RefFlags::SIGNATURE);
        assert_eq!(graph.find(first), graph.find(second));
        assert_eq!(graph.roots().count(), 1);
        assert_eq!(graph.occurrence_count(), 3);
        assert!(graph.node(first).flags.contains(RefFlags::SIGNATURE));
    }

    #[test]
    fn every_occurrence_belongs_to_exactly_one_live_class() {
        let mut graph = RefGraph::new();
        let ids: Vec<_> = (0..6)
            .map(|i| graph.add_node(occ(0, i * 10, 1).key, "x", [occ(0, i * 10, 1)], RefFlags::empty()))
            .collect();
        graph.union(ids[0], ids[1]);
        graph.union(ids[2], ids[3]);
        graph.union(ids[1], ids[3]);

        let total: usize = graph.roots().map(|r| graph.node(r).occurrences.len()).sum();
        assert_eq!(total, graph.occurrence_count());
        for root in graph.roots() {
            for occurrence in &graph.node(root).occurrences {
                assert_eq!(graph.class_of(occurrence.key), Some(root));
            }
        }
    }
}
