/// A simple slab allocator.
///
/// A `Slab` stores values of type `T` in a contiguous vector and returns
/// small indices that are reused after removal. The scheduler uses it to
/// address spawned futures from their wakers without hashing.
pub(crate) struct Slab<T> {
    /// Slot storage; vacant slots are kept so indices stay stable.
    entries: Vec<Entry<T>>,
    /// Stack of vacant indices that can be reused.
    free: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

enum Entry<T> {
    Occupied(T),
    Vacant,
}

impl<T> Slab<T> {
    /// Creates a new `Slab` with room for `size` items before growing.
    pub(crate) fn new(size: usize) -> Self {
        Self {
            entries: Vec::with_capacity(size),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Inserts a value and returns its index.
    ///
    /// A vacant slot is reused when one exists, otherwise the slab grows.
    pub(crate) fn insert(&mut self, item: T) -> usize {
        self.len += 1;

        match self.free.pop() {
            Some(index) => {
                self.entries[index] = Entry::Occupied(item);
                index
            }
            None => {
                self.entries.push(Entry::Occupied(item));
                self.entries.len() - 1
            }
        }
    }

    /// Removes and returns the value stored at `index`.
    ///
    /// Returns `None` if the slot is out of range or already vacant.
    pub(crate) fn remove(&mut self, index: usize) -> Option<T> {
        let entry = self.entries.get_mut(index)?;

        match std::mem::replace(entry, Entry::Vacant) {
            Entry::Occupied(item) => {
                self.free.push(index);
                self.len -= 1;
                Some(item)
            }
            Entry::Vacant => None,
        }
    }

    /// Returns a mutable reference to the value at `index`, if occupied.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.entries.get_mut(index)? {
            Entry::Occupied(item) => Some(item),
            Entry::Vacant => None,
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Removes every value, returning them in index order.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        self.free.clear();
        self.len = 0;

        std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Occupied(item) => Some(item),
                Entry::Vacant => None,
            })
            .collect()
    }
}
