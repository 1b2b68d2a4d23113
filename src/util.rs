//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Clamps the value into the interval.
    /// The lower bound wins if the interval is empty.
    pub fn clamp(&self, value: T) -> T {
        T::max(self.min, T::min(value, self.max))
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// Yields `0..count` starting at `start` and wrapping around.
pub fn rotated_range(count: usize, start: usize) -> impl Iterator<Item = usize> {
    (0..count)
        .map(move |i| i + start)
        .map(move |i| if i >= count { i - count } else { i })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rotated_range_wraps() {
        assert_eq!(rotated_range(4, 2).collect::<Vec<_>>(), vec![2, 3, 0, 1]);
        assert_eq!(rotated_range(3, 0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(rotated_range(0, 0).count(), 0);
    }

    #[test]
    fn clamps_into_interval() {
        let range = Interval::new(0.001, 10.0);
        assert_eq!(range.clamp(-3.0), 0.001);
        assert_eq!(range.clamp(4.0), 4.0);
        assert_eq!(range.clamp(12.0), 10.0);
        assert!(range.contains(10.0));
        assert!(!range.contains(10.5));
    }
}
