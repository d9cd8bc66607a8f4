use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

/// Append-only unique table.
///
/// Values are interned: [`put`][Table::put] returns the index of an equal value
/// when one is already stored. Nothing is ever removed, so indices stay valid
/// for the lifetime of the table.
pub struct Table<T> {
    data: Vec<Entry<T>>,
    capacity: usize,

    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table holding at most `2^bits` cells (including the sentry).
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;
        // 0th cell is the sentry, so bucket heads can use 0 as "empty".
        let data = vec![Entry {
            value: T::default(),
            next: 0,
        }];

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;
        let buckets = vec![0; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data,
            capacity,
            buckets,
            bitmask,
        }
    }
}

impl<T> Table<T> {
    /// Get the maximum number of cells.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    /// Get the number of stored values (the sentry excluded).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    fn next(&self, index: usize) -> usize {
        self.data[index].next
    }

    /// Add a new value to the table and return its index, or `None` when the table is full.
    fn add(&mut self, value: T) -> Option<usize> {
        let index = self.data.len();
        if index >= self.capacity {
            return None;
        }
        self.data.push(Entry { value, next: 0 });
        Some(index)
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index.
    ///
    /// Returns `None` only when the value is new and the table is full.
    pub fn put(&mut self, value: T) -> Option<usize> {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            // Create new node and put it into the bucket.
            let i = self.add(value)?;
            self.buckets[bucket_index] = i;
            return Some(i);
        }

        loop {
            assert!(index > 0);

            if &value == self.value(index) {
                // The node already exists.
                return Some(index);
            }

            let next = self.next(index);

            if next == 0 {
                // Create new node and append it to the bucket.
                let i = self.add(value)?;
                self.data[index].next = i;
                return Some(i);
            } else {
                // Go to the next node in the bucket.
                index = next;
            }
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
