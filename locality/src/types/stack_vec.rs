/// Types that can be used as the backing store for a `StackVec`
pub trait Array: Default {
    /// The type of the array's elements.
    type Item;
    /// Returns the number of items the array can hold.
    fn capacity() -> usize;
    /// Get the full array as a slice
    fn as_slice(&self) -> &[Self::Item];
    /// Get the full array as a mutable slice
    fn as_mut_slice(&mut self) -> &mut [Self::Item];
}

macro_rules! impl_array(
    ($($size:expr),+) => {
        $(
            impl<T: Default> Array for [T; $size] where [T; $size]: Default {
                type Item = T;
                fn capacity() -> usize { $size }
                fn as_slice(&self) -> &[T] { self }
                fn as_mut_slice(&mut self) -> &mut [T] { self }
            }
        )+
    }
);
impl_array!(
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20,
    21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32
);

/// A stack-allocated vector with fixed capacity. If more elements than the
/// initial capacity are needed, this will panic.
///
/// The elements are stored inline in `A`, so creating, filling and reading
/// a `StackVec` never allocates. Only the first `len` elements are
/// accessible, through `Deref<Target = [A::Item]>`.
#[derive(Clone)]
pub struct StackVec<A: Array> {
    /// The current number of elements stored in the array
    len: usize,
    /// The array used for storage
    data: A
}

impl<A: Array> StackVec<A> {
    /// Create a new empty `StackVec`. The capacity is controlled by the type
    /// parameter `A`
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            len: 0,
            data: Default::default(),
        }
    }

    /// Add an element to this `StackVec`
    ///
    /// # Panics
    ///
    /// If the backing array is already full
    pub fn push(&mut self, value: A::Item) {
        if self.len == A::capacity() {
            panic!("StackVec is full, use a larger array as storage")
        }

        self.data.as_mut_slice()[self.len] = value;
        self.len += 1;
    }
}

impl<A: Array> std::ops::Deref for StackVec<A> {
    type Target = [A::Item];

    fn deref(&self) -> &Self::Target {
        &self.data.as_slice()[..self.len]
    }
}

impl<A: Array> std::fmt::Debug for StackVec<A> where A::Item: std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push() {
        let mut values = StackVec::<[usize; 3]>::new();
        assert!(values.is_empty());

        values.push(4);
        values.push(2);
        assert_eq!(&*values, &[4, 2]);
        assert_eq!(values.len(), 2);

        values.push(7);
        assert_eq!(format!("{:?}", values), "[4, 2, 7]");
    }

    #[test]
    #[should_panic(expected = "StackVec is full")]
    fn overflow() {
        let mut values = StackVec::<[usize; 1]>::new();
        values.push(1);
        values.push(2);
    }
}
