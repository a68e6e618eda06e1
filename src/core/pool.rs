//! # Buffer Pool
//!
//! A free-list of scratch buffers keyed by length. Sample grids and dense
//! interpolation buffers are large and identically shaped for every column,
//! so they are recycled instead of reallocated per region.
//!
//! Buffers are reset on checkout, never on return. A buffer sitting in the
//! pool still holds whatever the previous owner wrote into it.

use std::collections::HashMap;

/// Free-list of `Vec<T>` buffers grouped by length.
#[derive(Debug, Default)]
pub struct BufferPool<T> {
    free: HashMap<usize, Vec<Vec<T>>>,
    allocations: usize,
}

impl<T: Clone + Default> BufferPool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            free: HashMap::new(),
            allocations: 0,
        }
    }

    /// Takes a buffer of exactly `len` elements, every element reset to `T::default()`.
    ///
    /// A pooled buffer whose length no longer matches its size class is
    /// dropped and a fresh one allocated in its place.
    pub fn checkout(&mut self, len: usize) -> Vec<T> {
        match self.free.get_mut(&len).and_then(Vec::pop) {
            Some(mut buffer) if buffer.len() == len => {
                buffer.fill(T::default());
                buffer
            }
            _ => {
                self.allocations += 1;
                vec![T::default(); len]
            }
        }
    }

    /// Returns a buffer to the pool. Its contents are left untouched.
    pub fn checkin(&mut self, buffer: Vec<T>) {
        if buffer.is_empty() {
            return;
        }
        self.free.entry(buffer.len()).or_default().push(buffer);
    }

    /// Number of buffers currently waiting in the pool.
    pub fn available(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Number of fresh allocations the pool has had to make.
    pub fn allocations(&self) -> usize {
        self.allocations
    }
}
