use ndarray::{ArrayBase, Data, Dimension};

use super::{Element, GradientAggregator};

/// The fraction of a sum's terms that have actually been observed.
///
/// Values without any notion of partial observation, such as plain arrays, are always fully
/// observed and keep the default of `1.0`. This lets optimizers rescale a step by the observed
/// fraction without caring whether they were handed an aggregator or a plain gradient.
pub trait InitializedFraction {
    fn initialized_fraction(&self) -> f64 {
        1.0
    }
}

impl<S: Data, D: Dimension> InitializedFraction for ArrayBase<S, D> {}

impl<T> InitializedFraction for [T] {}

impl<T> InitializedFraction for Vec<T> {}

impl<A: Element, D: Dimension> InitializedFraction for GradientAggregator<A, D> {
    fn initialized_fraction(&self) -> f64 {
        GradientAggregator::initialized_fraction(self)
    }
}
