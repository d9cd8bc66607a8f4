use std::cell::Cell;
use std::marker::PhantomData;

use crate::gate::Gate;
use crate::reference::Ref;
use crate::utils::{pairing2, MyHash};

struct Entry<K, V> {
    key: K,
    value: V,
}

/// Direct-mapped computed table.
///
/// Entries are keyed by the [`MyHash`] value of the operation, which must be
/// injective over the keys in use; a colliding insert simply evicts.
pub struct Cache<K, T> {
    data: Vec<Option<Entry<u64, T>>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
    _phantom: PhantomData<K>,
}

impl<K, V> Cache<K, V> {
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");

        let size = 1 << bits;
        let bitmask = (size - 1) as u64;

        Self {
            data: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask,
            hits: Cell::new(0),
            misses: Cell::new(0),
            _phantom: PhantomData,
        }
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    fn index(&self, key: u64) -> usize {
        (key & self.bitmask) as usize
    }

    /// Get the cached result.
    pub fn get(&self, key: &K) -> Option<&V>
    where
        K: MyHash,
    {
        let key = key.hash();
        let index = self.index(key);
        match &self.data[index] {
            Some(entry) if entry.key == key => {
                self.hits.set(self.hits.get() + 1);
                Some(&entry.value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Insert a result into the cache.
    pub fn insert(&mut self, key: &K, value: V)
    where
        K: MyHash,
    {
        let k = key.hash();
        let index = self.index(k);
        self.data[index] = Some(Entry { key: k, value });
    }
}

/// Key of a memoized `combine` call.
///
/// Operands are stored in ascending order, since both gates are commutative.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OpKey {
    lhs: Ref,
    rhs: Ref,
    gate: Gate,
}

impl OpKey {
    pub fn new(a: Ref, b: Ref, gate: Gate) -> Self {
        let (lhs, rhs) = if a <= b { (a, b) } else { (b, a) };
        Self { lhs, rhs, gate }
    }
}

impl MyHash for OpKey {
    fn hash(&self) -> u64 {
        // Refs are below 2^31, so the pairing fits in 62 bits and the gate bit stays injective.
        let pair = pairing2(self.lhs.get() as u64, self.rhs.get() as u64);
        (pair << 1) | self.gate.code() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache() {
        let mut cache = Cache::<(u64, u64), i32>::new(3);

        cache.insert(&(1, 2), 3);
        cache.insert(&(2, 3), 1);
        cache.insert(&(1, 3), 2);

        assert_eq!(cache.get(&(1, 2)), Some(&3));
        assert_eq!(cache.get(&(2, 3)), Some(&1));
        assert_eq!(cache.get(&(1, 3)), Some(&2));
        assert_eq!(cache.get(&(2, 1)), None);
        assert_eq!(cache.get(&(3, 3)), None);
        assert_eq!(cache.hits(), 3);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn test_op_key_is_symmetric() {
        let a = Ref::new(7);
        let b = Ref::new(9);
        assert_eq!(OpKey::new(a, b, Gate::And), OpKey::new(b, a, Gate::And));
        assert_eq!(
            OpKey::new(a, b, Gate::Or).hash(),
            OpKey::new(b, a, Gate::Or).hash()
        );
        assert_ne!(
            OpKey::new(a, b, Gate::And).hash(),
            OpKey::new(a, b, Gate::Or).hash()
        );
    }

    #[test]
    fn test_cache_op_key() {
        let mut cache = Cache::<OpKey, Ref>::new(4);
        let key = OpKey::new(Ref::new(3), Ref::new(4), Gate::Or);
        cache.insert(&key, Ref::TRUE);
        assert_eq!(cache.get(&OpKey::new(Ref::new(4), Ref::new(3), Gate::Or)), Some(&Ref::TRUE));
        assert_eq!(cache.get(&OpKey::new(Ref::new(3), Ref::new(4), Gate::And)), None);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }
}
