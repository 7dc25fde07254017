/// Append-only growable buffer for vertex and index accumulation.
///
/// `expand` hands back a writable window over freshly appended,
/// zero-initialized elements so emitters can fill geometry in place.
/// Capacity grows geometrically and survives `clear`.
#[derive(Debug, Default)]
pub struct GrowableBuffer<T> {
    items: Vec<T>,
}

impl<T: Copy + Default> GrowableBuffer<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends `count` default elements and returns the new window.
    #[inline]
    pub fn expand(&mut self, count: usize) -> &mut [T] {
        let start = self.items.len();
        if self.items.capacity() < start + count {
            let wanted = (start + count).next_power_of_two().max(64);
            self.items.reserve_exact(wanted - start);
        }
        self.items.resize(start + count, T::default());
        &mut self.items[start..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Drops all elements, keeps the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
