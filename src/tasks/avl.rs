//! Ordered map backed by an AVL tree.
//!
//! Every node caches the height of its subtree (a leaf has height 1). After
//! each insert and remove the balance factor of every node, `height(left) -
//! height(right)`, stays within `[-1, 1]`, which bounds lookups to
//! `O(log n)` comparisons.

use std::{cmp::Ordering, mem};

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    height: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i64 {
        height(&self.left) as i64 - height(&self.right) as i64
    }
}

fn height<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if node
            .left
            .as_ref()
            .is_some_and(|left| left.balance_factor() < 0)
        {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        if node
            .right
            .as_ref()
            .is_some_and(|right| right.balance_factor() > 0)
        {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

fn insert<K: Ord, V>(
    link: Link<K, V>,
    key: K,
    value: V,
    old_value: &mut Option<V>,
) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        return Node::new(key, value);
    };

    match key.cmp(&node.key) {
        Ordering::Less => node.left = Some(insert(node.left.take(), key, value, old_value)),
        Ordering::Greater => node.right = Some(insert(node.right.take(), key, value, old_value)),
        Ordering::Equal => {
            *old_value = Some(mem::replace(&mut node.value, value));
            return node;
        }
    }

    rebalance(node)
}

// Detach the smallest node of the subtree, returning the remaining subtree
fn take_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove<K: Ord, V>(link: Link<K, V>, key: &K, removed: &mut Option<V>) -> Link<K, V> {
    let mut node = link?;

    match key.cmp(&node.key) {
        Ordering::Less => node.left = remove(node.left.take(), key, removed),
        Ordering::Greater => node.right = remove(node.right.take(), key, removed),
        Ordering::Equal => {
            let left = node.left.take();
            let right = node.right.take();
            *removed = Some(node.value);

            return match (left, right) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => {
                    // Replace with the in-order successor
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
        }
    }

    Some(rebalance(node))
}

#[derive(Debug)]
pub struct AvlMap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree, 0 when empty.
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Insert a key-value pair. If the key was already present its value is
    /// replaced and the previous one returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut old_value = None;
        self.root = Some(insert(self.root.take(), key, value, &mut old_value));
        if old_value.is_none() {
            self.len += 1;
        }
        old_value
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut removed = None;
        self.root = remove(self.root.take(), key, &mut removed);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Whether every node's subtrees differ in height by at most one, checked
    /// against freshly computed heights rather than the cached ones.
    pub fn is_balanced(&self) -> bool {
        fn check<K, V>(link: &Link<K, V>) -> Option<u32> {
            let Some(node) = link else {
                return Some(0);
            };
            let left = check(&node.left)?;
            let right = check(&node.right)?;
            if left.abs_diff(right) > 1 || node.height != 1 + left.max(right) {
                return None;
            }
            Some(1 + left.max(right))
        }

        check(&self.root).is_some()
    }

    /// In-order iterator over the entries.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }
}

pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut cursor: Option<&'a Node<K, V>>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((&node.key, &node.value))
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    #[test]
    fn sequential_inserts_stay_balanced() {
        let map: AvlMap<u32, u32> = (0..1024).map(|k| (k, k * 2)).collect();

        assert_eq!(map.len(), 1024);
        assert!(map.is_balanced());
        // A perfectly balanced tree of 1024 keys has height 11
        assert!(map.height() <= 12, "height={}", map.height());
        assert_eq!(map.get(&511), Some(&1022));
        assert_eq!(map.get(&1024), None);
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut map = AvlMap::new();
        assert_eq!(map.insert("foo", 1), None);
        assert_eq!(map.insert("foo", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"foo"), Some(&2));
    }

    #[test]
    fn remove_leaf_inner_and_root() {
        let mut map: AvlMap<i32, ()> = [50, 30, 70, 20, 40, 60, 80]
            .into_iter()
            .map(|k| (k, ()))
            .collect();

        assert_eq!(map.remove(&20), Some(()));
        assert_eq!(map.remove(&30), Some(()));
        assert_eq!(map.remove(&50), Some(()));
        assert_eq!(map.remove(&50), None);

        assert_eq!(map.len(), 4);
        assert!(map.is_balanced());
        let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![40, 60, 70, 80]);
    }

    #[test]
    fn shuffled_workload_matches_sorted_keys() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut keys: Vec<u64> = (0..2_000).collect();
        keys.shuffle(&mut rng);

        let mut map: AvlMap<u64, u64> = keys.iter().map(|k| (*k, *k)).collect();
        assert!(map.is_balanced());

        for key in keys.iter().filter(|k| *k % 3 == 0) {
            assert_eq!(map.remove(key), Some(*key));
            assert!(map.is_balanced());
        }

        let remaining: Vec<u64> = map.iter().map(|(k, _)| *k).collect();
        let expected: Vec<u64> = (0..2_000).filter(|k| k % 3 != 0).collect();
        assert_eq!(remaining, expected);
        assert_eq!(map.len(), expected.len());
    }

    #[test]
    fn empty_map() {
        let mut map: AvlMap<u8, u8> = AvlMap::default();
        assert!(map.is_empty());
        assert_eq!(map.height(), 0);
        assert_eq!(map.remove(&1), None);
        assert!(map.is_balanced());
        assert_eq!(map.iter().next(), None);
    }
}
