//! ChainedHashMap: bucket array, separate chaining, and the growth policy.

use crate::chain::{Chain, Links, Node, Nodes};
use crate::config::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD};
use crate::error::BucketError;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use slotmap::DefaultKey;

/// Hash table resolving collisions by chaining entries inside each bucket.
///
/// Every entry sits in bucket `hash(key) % capacity`. When an insert pushes
/// `len / capacity` above the load-factor threshold, the bucket array doubles
/// and every entry is relinked under the new capacity before `insert`
/// returns. Capacity never shrinks.
#[derive(Clone)]
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Box<[Chain]>,
    nodes: Nodes<K, V>, // entry storage; chains link through its keys
    threshold: f64,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Table with 100 buckets, threshold 0.5 and the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S> Default for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD, hasher)
    }

    /// `capacity` must be non-zero and `threshold` already in `(0, 1]`;
    /// `TableConfig::build` checks both.
    pub(crate) fn from_parts(capacity: usize, threshold: f64, hasher: S) -> Self {
        debug_assert!(capacity > 0);
        debug_assert!(threshold > 0.0 && threshold <= 1.0);
        Self {
            hasher,
            buckets: vec![Chain::EMPTY; capacity].into_boxed_slice(),
            nodes: Nodes::new(),
            threshold,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn locate<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.buckets[bucket_index(hash, self.buckets.len())].find(&self.nodes, hash, q)
    }

    /// Insert or overwrite. An existing key keeps its entry and position; its
    /// old value is returned. A new key is appended to its bucket's chain and
    /// may trigger growth.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.make_hash(&key);
        let slot = bucket_index(hash, self.buckets.len());
        if let Some(id) = self.buckets[slot].find(&self.nodes, hash, &key) {
            return Some(mem::replace(&mut self.nodes[id].value, value));
        }

        let id = self.nodes.insert(Node::new(key, value, hash));
        self.buckets[slot].push_back(&mut self.nodes, id);

        if exceeds(self.len(), self.buckets.len(), self.threshold) {
            self.grow();
        }
        None
    }

    pub fn find<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.locate(q)?;
        self.nodes.get(id).map(|n| &n.value)
    }

    /// Mutable access to the value stored under `q`, for in-place updates.
    pub fn find_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.locate(q)?;
        self.nodes.get_mut(id).map(|n| &mut n.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(q).is_some()
    }

    /// Remove the entry for `q`, returning its value. Absent keys are a no-op.
    pub fn erase<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let slot = bucket_index(hash, self.buckets.len());
        let (prev, id) = self.buckets[slot].find_with_prev(&self.nodes, hash, q)?;
        self.buckets[slot].unlink(&mut self.nodes, prev, id);
        self.nodes.remove(id).map(|n| n.value)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Alias of [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Effective growth threshold, after any fallback applied at construction.
    pub fn load_factor_threshold(&self) -> f64 {
        self.threshold
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry. The bucket count is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.fill(Chain::EMPTY);
    }

    /// Double the bucket array once and relink every entry into its bucket
    /// under the new capacity. Entries keep their arena slots; only links
    /// change. Chain order is preserved within each destination bucket
    /// relative to the old bucket walk.
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let Some(new_capacity) = old_capacity.checked_mul(2) else {
            tracing::debug!(old_capacity, "bucket array cannot double further");
            return;
        };
        tracing::debug!(
            old_capacity,
            new_capacity,
            size = self.len(),
            "growing bucket array"
        );

        let old = mem::replace(
            &mut self.buckets,
            vec![Chain::EMPTY; new_capacity].into_boxed_slice(),
        );
        for chain in old.iter() {
            let mut cursor = chain.head();
            while let Some(id) = cursor {
                let node = &mut self.nodes[id];
                cursor = node.next.take();
                let slot = bucket_index(node.hash, new_capacity);
                self.buckets[slot].push_back(&mut self.nodes, id);
            }
        }
    }

    fn head_of(&self, index: usize) -> Result<DefaultKey, BucketError> {
        let chain = self.buckets.get(index).ok_or(BucketError::OutOfRange {
            index,
            capacity: self.buckets.len(),
        })?;
        chain.head().ok_or(BucketError::Empty { index })
    }

    /// Borrow the first entry of bucket `index`.
    ///
    /// Bucket layout depends on the current capacity and changes whenever
    /// the table grows; the view cannot outlive the next mutating call.
    pub fn bucket(&self, index: usize) -> Result<BucketView<'_, K, V>, BucketError> {
        let id = self.head_of(index)?;
        Ok(BucketView {
            nodes: &self.nodes,
            id,
        })
    }

    /// Mutably borrow the first entry of bucket `index`. Same failure rules as
    /// [`bucket`](Self::bucket).
    pub fn bucket_mut(&mut self, index: usize) -> Result<BucketViewMut<'_, K, V>, BucketError> {
        let id = self.head_of(index)?;
        Ok(BucketViewMut {
            node: &mut self.nodes[id],
        })
    }

    /// Copy of the first entry of bucket `index`.
    pub fn bucket_entry(&self, index: usize) -> Result<(K, V), BucketError>
    where
        K: Clone,
        V: Clone,
    {
        let view = self.bucket(index)?;
        Ok((view.key().clone(), view.value().clone()))
    }

    /// Number of entries chained in bucket `index`; an empty bucket reports 0.
    pub fn chain_len(&self, index: usize) -> Result<usize, BucketError> {
        let chain = self.buckets.get(index).ok_or(BucketError::OutOfRange {
            index,
            capacity: self.buckets.len(),
        })?;
        if chain.is_empty() {
            return Ok(0);
        }
        Ok(chain.links(&self.nodes).count())
    }

    /// Entries in bucket order, then chain order within each bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            buckets: self.buckets.iter(),
            links: Links::starting_at(&self.nodes, None),
            remaining: self.nodes.len(),
        }
    }

    /// Mutable iteration. Order is unspecified.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.nodes.iter_mut(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Structural self-check used by the unit and property tests.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.buckets.len();
        assert!(capacity > 0, "capacity must stay positive");
        let mut reachable = 0;
        for (slot, chain) in self.buckets.iter().enumerate() {
            let mut last = None;
            for (id, node) in chain.links(&self.nodes) {
                assert_eq!(
                    bucket_index(node.hash, capacity),
                    slot,
                    "entry chained in the wrong bucket"
                );
                last = Some(id);
                reachable += 1;
            }
            assert_eq!(chain.tail(), last, "tail does not match last chained node");
        }
        assert_eq!(reachable, self.nodes.len(), "len must equal reachable entries");
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[inline]
fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[inline]
fn exceeds(len: usize, capacity: usize, threshold: f64) -> bool {
    len as f64 / capacity as f64 > threshold
}

/// Shared view of one chained entry, starting at a bucket head.
pub struct BucketView<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    id: DefaultKey,
}

impl<'a, K, V> Clone for BucketView<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for BucketView<'a, K, V> {}

impl<'a, K, V> BucketView<'a, K, V> {
    fn node(&self) -> &'a Node<K, V> {
        let nodes: &'a Nodes<K, V> = self.nodes;
        &nodes[self.id]
    }

    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    /// The following entry in the same chain.
    pub fn next(&self) -> Option<BucketView<'a, K, V>> {
        self.node().next.map(|id| BucketView {
            nodes: self.nodes,
            id,
        })
    }

    /// This entry and everything chained after it.
    pub fn iter(&self) -> ChainIter<'a, K, V> {
        ChainIter {
            links: Links::starting_at(self.nodes, Some(self.id)),
        }
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for BucketView<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketView")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}

/// Mutable view of a bucket head. Keys stay immutable.
pub struct BucketViewMut<'a, K, V> {
    node: &'a mut Node<K, V>,
}

impl<'a, K, V> BucketViewMut<'a, K, V> {
    pub fn key(&self) -> &K {
        &self.node.key
    }

    pub fn value(&self) -> &V {
        &self.node.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.node.value
    }

    pub fn into_value_mut(self) -> &'a mut V {
        &mut self.node.value
    }
}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for BucketViewMut<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketViewMut")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}

/// Iterator over one chain, from a [`BucketView`] to the chain's tail.
pub struct ChainIter<'a, K, V> {
    links: Links<'a, K, V>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.links.next().map(|(_, n)| (&n.key, &n.value))
    }
}

/// Iterator over immutable entries in `ChainedHashMap`, in bucket order.
pub struct Iter<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    buckets: core::slice::Iter<'a, Chain>,
    links: Links<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            buckets: self.buckets.clone(),
            links: self.links.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((_, n)) = self.links.next() {
                self.remaining -= 1;
                return Some((&n.key, &n.value));
            }
            let chain = self.buckets.next()?;
            self.links = chain.links(self.nodes);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// Iterator over mutable entries in `ChainedHashMap`.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| (&n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// Hashers that pin bucket placement in tests.
#[cfg(test)]
pub(crate) mod testing {
    use core::hash::{BuildHasher, Hasher};

    /// Integers hash to themselves, so `bucket == key % capacity`.
    #[derive(Clone, Copy, Default, Debug)]
    pub(crate) struct IdentityState;

    #[derive(Default)]
    pub(crate) struct IdentityHasher(u64);

    impl BuildHasher for IdentityState {
        type Hasher = IdentityHasher;
        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }

    impl Hasher for IdentityHasher {
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = self.0.rotate_left(8) ^ u64::from(b);
            }
        }
        fn write_u32(&mut self, n: u32) {
            self.0 = u64::from(n);
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn write_usize(&mut self, n: usize) {
            self.0 = n as u64;
        }
        fn finish(&self) -> u64 {
            self.0
        }
    }

    /// Every key hashes to 0: one chain holds everything.
    #[derive(Clone, Copy, Default, Debug)]
    pub(crate) struct ConstState;

    pub(crate) struct ConstHasher;

    impl BuildHasher for ConstState {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }

    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }
}
