use std::ops::Index;

use ndarray::{Array, ArrayBase, Data, Dimension, NdIndex, ShapeBuilder, Zip, iter::Iter};
use num_traits::Signed;

use super::{Element, GradientAggregator};

/// Read-only array access to the aggregate.
///
/// No mutable access is provided, the aggregate only changes through the `update*` methods.
impl<A: Element, D: Dimension> GradientAggregator<A, D> {
    /// Returns the shape of the aggregate, shared by every component.
    pub fn shape(&self) -> &[usize] {
        self.aggregate.shape()
    }

    pub fn raw_dim(&self) -> D {
        self.aggregate.raw_dim()
    }

    pub fn ndim(&self) -> usize {
        self.aggregate.ndim()
    }

    /// Returns the amount of elements of the aggregate (not the amount of components).
    pub fn len(&self) -> usize {
        self.aggregate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }

    /// Returns a reference to the aggregate's element at `index`, if it's in bounds.
    pub fn get<I: NdIndex<D>>(&self, index: I) -> Option<&A> {
        self.aggregate.get(index)
    }

    /// Iterates the aggregate's elements in logical (row major) order.
    pub fn iter(&self) -> Iter<'_, A, D> {
        self.aggregate.iter()
    }

    /// Creates a zeroed aggregator with as many components as this one and the given shape.
    pub fn similar<Sh: ShapeBuilder>(&self, shape: Sh) -> GradientAggregator<A, Sh::Dim> {
        self.similar_with(shape)
    }

    /// Same as `similar` but with a different element type.
    pub fn similar_with<B, Sh>(&self, shape: Sh) -> GradientAggregator<B, Sh::Dim>
    where
        B: Element,
        Sh: ShapeBuilder,
    {
        let aggregate = Array::zeros(shape);
        let components = vec![aggregate.clone(); self.ncomponents()];
        GradientAggregator::from_checked(components, aggregate)
    }

    /// Whether every element of the aggregate is within `tol` of the matching element of
    /// `other`. Arrays of a different shape are never close.
    pub fn abs_diff_eq<S>(&self, other: &ArrayBase<S, D>, tol: A) -> bool
    where
        S: Data<Elem = A>,
        A: PartialOrd,
    {
        self.shape() == other.shape()
            && Zip::from(&self.aggregate)
                .and(other)
                .all(|&a, &b| (a - b).abs() <= tol)
    }
}

impl<A, D, I> Index<I> for GradientAggregator<A, D>
where
    D: Dimension,
    I: NdIndex<D>,
{
    type Output = A;

    fn index(&self, index: I) -> &A {
        &self.aggregate[index]
    }
}

impl<A, S, D> PartialEq<ArrayBase<S, D>> for GradientAggregator<A, D>
where
    A: PartialEq,
    S: Data<Elem = A>,
    D: Dimension,
{
    fn eq(&self, other: &ArrayBase<S, D>) -> bool {
        self.aggregate == *other
    }
}

impl<'a, A, D: Dimension> IntoIterator for &'a GradientAggregator<A, D> {
    type Item = &'a A;
    type IntoIter = Iter<'a, A, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.aggregate.iter()
    }
}
