//! Chain: per-bucket singly-linked lists threaded through a shared arena.
//!
//! Entries live in a `SlotMap` owned by the table; a bucket only records the
//! head and tail keys of its chain, and each node records the key of its
//! successor. Appending at the tail and unlinking a node whose predecessor
//! is known are both O(1). Relinking during growth moves keys, never
//! entries, and dropping the arena releases every node without walking the
//! chains.

use core::borrow::Borrow;
use slotmap::{DefaultKey, SlotMap};

pub(crate) type Nodes<K, V> = SlotMap<DefaultKey, Node<K, V>>;

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Full hash, cached at insertion so growth never calls back into `K: Hash`.
    pub(crate) hash: u64,
    pub(crate) next: Option<DefaultKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            next: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Chain {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl Chain {
    pub(crate) const EMPTY: Chain = Chain {
        head: None,
        tail: None,
    };

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    #[cfg(test)]
    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        self.tail
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Link a detached node (`next == None`) at the end of this chain.
    pub(crate) fn push_back<K, V>(&mut self, nodes: &mut Nodes<K, V>, id: DefaultKey) {
        debug_assert!(nodes[id].next.is_none(), "pushing a node that is still linked");
        match self.tail {
            Some(tail) => nodes[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Locate the node holding `q`, together with its predecessor in the chain.
    pub(crate) fn find_with_prev<K, V, Q>(
        &self,
        nodes: &Nodes<K, V>,
        hash: u64,
        q: &Q,
    ) -> Option<(Option<DefaultKey>, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = &nodes[id];
            if node.hash == hash && node.key.borrow() == q {
                return Some((prev, id));
            }
            prev = Some(id);
            cursor = node.next;
        }
        None
    }

    pub(crate) fn find<K, V, Q>(&self, nodes: &Nodes<K, V>, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.find_with_prev(nodes, hash, q).map(|(_, id)| id)
    }

    /// Detach `id` from the chain. `prev` must be its predecessor (None for the head).
    /// The node stays in the arena; the caller removes it.
    pub(crate) fn unlink<K, V>(
        &mut self,
        nodes: &mut Nodes<K, V>,
        prev: Option<DefaultKey>,
        id: DefaultKey,
    ) {
        let next = nodes[id].next.take();
        match prev {
            Some(p) => {
                debug_assert_eq!(nodes[p].next, Some(id));
                nodes[p].next = next;
            }
            None => {
                debug_assert_eq!(self.head, Some(id));
                self.head = next;
            }
        }
        if self.tail == Some(id) {
            self.tail = prev;
        }
    }

    pub(crate) fn links<'a, K, V>(&self, nodes: &'a Nodes<K, V>) -> Links<'a, K, V> {
        Links::starting_at(nodes, self.head)
    }
}

/// Walks a chain from a starting node to its tail.
pub(crate) struct Links<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    cursor: Option<DefaultKey>,
}

impl<'a, K, V> Links<'a, K, V> {
    pub(crate) fn starting_at(nodes: &'a Nodes<K, V>, start: Option<DefaultKey>) -> Self {
        Self {
            nodes,
            cursor: start,
        }
    }
}

impl<'a, K, V> Clone for Links<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            cursor: self.cursor,
        }
    }
}

impl<'a, K, V> Iterator for Links<'a, K, V> {
    type Item = (DefaultKey, &'a Node<K, V>);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.nodes[id];
        self.cursor = node.next;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(nodes: &mut Nodes<&'static str, i32>, keys: &[&'static str]) -> Chain {
        let mut c = Chain::EMPTY;
        for (i, k) in keys.iter().enumerate() {
            let id = nodes.insert(Node::new(*k, i as i32, 0));
            c.push_back(nodes, id);
        }
        c
    }

    fn keys(c: &Chain, nodes: &Nodes<&'static str, i32>) -> Vec<&'static str> {
        c.links(nodes).map(|(_, n)| n.key).collect()
    }

    /// Invariant: `push_back` preserves insertion order and tracks the tail.
    #[test]
    fn push_back_appends_in_order() {
        let mut nodes = Nodes::new();
        let c = chain_of(&mut nodes, &["a", "b", "c"]);
        assert_eq!(keys(&c, &nodes), ["a", "b", "c"]);
        let tail = c.tail().unwrap();
        assert_eq!(nodes[tail].key, "c");
        assert!(nodes[tail].next.is_none());
    }

    /// Invariant: Unlinking head, middle, and tail keeps head/tail consistent and
    /// later appends land after the surviving tail.
    #[test]
    fn unlink_head_middle_tail() {
        let mut nodes = Nodes::new();
        let mut c = chain_of(&mut nodes, &["a", "b", "c", "d"]);

        let (prev, id) = c.find_with_prev(&nodes, 0, "b").unwrap();
        c.unlink(&mut nodes, prev, id);
        nodes.remove(id);
        assert_eq!(keys(&c, &nodes), ["a", "c", "d"]);

        let (prev, id) = c.find_with_prev(&nodes, 0, "a").unwrap();
        assert!(prev.is_none());
        c.unlink(&mut nodes, prev, id);
        nodes.remove(id);
        assert_eq!(keys(&c, &nodes), ["c", "d"]);

        let (prev, id) = c.find_with_prev(&nodes, 0, "d").unwrap();
        c.unlink(&mut nodes, prev, id);
        nodes.remove(id);
        assert_eq!(keys(&c, &nodes), ["c"]);
        assert_eq!(c.head(), c.tail());

        let e = nodes.insert(Node::new("e", 9, 0));
        c.push_back(&mut nodes, e);
        assert_eq!(keys(&c, &nodes), ["c", "e"]);
    }

    #[test]
    fn unlink_last_node_empties_chain() {
        let mut nodes = Nodes::new();
        let mut c = chain_of(&mut nodes, &["only"]);
        let (prev, id) = c.find_with_prev(&nodes, 0, "only").unwrap();
        c.unlink(&mut nodes, prev, id);
        assert!(c.is_empty());
        assert!(c.tail().is_none());
        assert_eq!(c, Chain::EMPTY);
    }

    /// Invariant: Lookup compares the cached hash before the key.
    #[test]
    fn find_requires_matching_hash() {
        let mut nodes = Nodes::new();
        let mut c = Chain::EMPTY;
        let id = nodes.insert(Node::new("k", 1, 42));
        c.push_back(&mut nodes, id);
        assert_eq!(c.find(&nodes, 42, "k"), Some(id));
        assert_eq!(c.find(&nodes, 7, "k"), None);
        assert_eq!(c.find(&nodes, 42, "x"), None);
    }

    /// Dropping an arena holding a very long chain must not recurse per node.
    #[test]
    fn long_chain_drops_without_recursion() {
        let mut nodes: Nodes<u32, Vec<u8>> = Nodes::new();
        let mut c = Chain::EMPTY;
        for i in 0..200_000u32 {
            let id = nodes.insert(Node::new(i, vec![0u8; 1], 0));
            c.push_back(&mut nodes, id);
        }
        assert_eq!(c.links(&nodes).count(), 200_000);
        drop(nodes);
    }
}
