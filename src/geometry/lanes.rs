use std::ops::{Add, AddAssign, Index, Mul, Sub};

use num_traits::Zero;

use super::{FloatType, WorldVector};

/// Batch of values, one per ray in flight.
///
/// All element-wise operations require both operands to have the same number of lanes.
/// Scalar operands are broadcast by capturing them in a closure passed to [`Lanes::map`].
#[derive(Clone, Debug, PartialEq)]
pub struct Lanes<T>(Vec<T>);

/// Lane selection, used to compact a batch before processing a subset of rays.
pub type Mask = Lanes<bool>;

impl<T> Lanes<T> {
    pub fn new(values: Vec<T>) -> Self {
        Lanes(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Lanes<U> {
        Lanes(self.0.iter().map(f).collect())
    }

    /// Combines two batches lane by lane.
    /// Panics if the lane counts differ.
    pub fn zip_map<U, V, F: FnMut(&T, &U) -> V>(&self, rhs: &Lanes<U>, mut f: F) -> Lanes<V> {
        assert_same_width(self.len(), rhs.len());
        Lanes(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        )
    }
}

impl<T: Clone> Lanes<T> {
    pub fn splat(value: T, len: usize) -> Self {
        Lanes(vec![value; len])
    }

    /// Returns only the lanes selected by the mask, in their original order.
    pub fn extract(&self, mask: &Mask) -> Self {
        assert_same_width(self.len(), mask.len());
        Lanes(
            self.0
                .iter()
                .zip(mask.iter())
                .filter(|(_, selected)| **selected)
                .map(|(value, _)| value.clone())
                .collect(),
        )
    }
}

impl<T: Clone + Zero> Lanes<T> {
    /// Inverse of [`Lanes::extract`]: scatters the compacted lanes back to the positions
    /// selected by the mask. Unselected lanes are zero.
    /// Panics if the number of lanes doesn't match the number of selected lanes in mask.
    pub fn place(&self, mask: &Mask) -> Self {
        assert!(
            self.len() == mask.count(),
            "placing {} lanes into a mask with {} selected lanes",
            self.len(),
            mask.count()
        );

        let mut compacted = self.0.iter();
        Lanes(
            mask.iter()
                .map(|&selected| {
                    if selected {
                        // Lane count was checked above
                        compacted.next().cloned().unwrap_or_else(T::zero)
                    } else {
                        T::zero()
                    }
                })
                .collect(),
        )
    }
}

impl Mask {
    pub fn any(&self) -> bool {
        self.0.iter().any(|&x| x)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&x| x).count()
    }

    /// Lane-wise `self || rhs`
    pub fn or(&self, rhs: &Mask) -> Mask {
        self.zip_map(rhs, |&a, &b| a || b)
    }

    /// Lane-wise `self && !rhs`
    pub fn and_not(&self, rhs: &Mask) -> Mask {
        self.zip_map(rhs, |&a, &b| a && !b)
    }

    /// Converts the mask to a 0.0 / 1.0 factor per lane.
    pub fn to_factor(&self) -> Lanes<FloatType> {
        self.map(|&x| if x { 1.0 } else { 0.0 })
    }
}

impl Lanes<WorldVector> {
    pub fn dot(&self, rhs: &Self) -> Lanes<FloatType> {
        self.zip_map(rhs, |a, b| a.dot(b))
    }

    pub fn cross(&self, rhs: &Self) -> Self {
        self.zip_map(rhs, |a, b| a.cross(b))
    }

    pub fn magnitude_squared(&self) -> Lanes<FloatType> {
        self.dot(self)
    }

    /// Scales every lane to unit length. Zero vectors stay zero.
    pub fn normalize(&self) -> Self {
        self.map(|v| {
            let magnitude = v.norm();
            v / if magnitude == 0.0 { 1.0 } else { magnitude }
        })
    }
}

fn assert_same_width(lhs: usize, rhs: usize) {
    assert!(
        lhs == rhs,
        "lane batches must have the same width ({lhs} != {rhs})"
    );
}

macro_rules! lanewise_op {
    ($trait:ident, $method:ident) => {
        impl<T, U, O> $trait<&Lanes<U>> for &Lanes<T>
        where
            T: Copy + $trait<U, Output = O>,
            U: Copy,
        {
            type Output = Lanes<O>;

            fn $method(self, rhs: &Lanes<U>) -> Lanes<O> {
                self.zip_map(rhs, |&a, &b| $trait::$method(a, b))
            }
        }
    };
}

lanewise_op!(Add, add);
lanewise_op!(Sub, sub);
lanewise_op!(Mul, mul);

impl<T: Copy + AddAssign> AddAssign<&Lanes<T>> for Lanes<T> {
    fn add_assign(&mut self, rhs: &Lanes<T>) {
        assert_same_width(self.len(), rhs.len());
        self.0
            .iter_mut()
            .zip(rhs.0.iter())
            .for_each(|(a, &b)| *a += b);
    }
}

impl<T> Default for Lanes<T> {
    fn default() -> Self {
        Lanes(Vec::new())
    }
}

impl<T> Index<usize> for Lanes<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T> FromIterator<T> for Lanes<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Lanes(iter.into_iter().collect())
    }
}
