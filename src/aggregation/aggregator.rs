use std::mem;

use log::trace;
use ndarray::{Array, ArrayBase, ArrayView, Data, Dimension, ShapeBuilder, Zip};
use num_traits::Zero;

use super::Element;
use crate::{Result, SagErr};

/// The way a bulk update gets applied onto the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkStrategy {
    /// Apply every entry's delta in sequence.
    Incremental,
    /// Overwrite the addressed components and sum all of them again.
    Resum,
}

impl BulkStrategy {
    /// Picks the cheaper strategy for `nentries` entries over `ncomponents` components.
    fn select(nentries: usize, ncomponents: usize) -> Self {
        if nentries.saturating_mul(2) <= ncomponents {
            Self::Incremental
        } else {
            Self::Resum
        }
    }
}

/// Keeps the running sum of `n` same-shaped components of a finite sum.
///
/// Replacing a component costs as much as the size of a single component, no matter how many
/// components there are, since only the difference between its new and old value is added
/// to the aggregate.
///
/// The aggregate can be read like a plain array (see the read-only accessors, `Index` and
/// `PartialEq` impls) but it can only be mutated through the `update*` methods, which keep
/// `aggregate == sum(components)` after every call.
#[derive(Debug, Clone)]
pub struct GradientAggregator<A, D: Dimension> {
    pub(super) components: Vec<Array<A, D>>,
    pub(super) aggregate: Array<A, D>,
    initialized: Vec<bool>,
    ninitialized: usize,
}

impl<A: Element, D: Dimension> GradientAggregator<A, D> {
    /// Creates a new `GradientAggregator` from explicit components and a target aggregate.
    ///
    /// Takes ownership of both `components` and `aggregate`, nothing is copied.
    ///
    /// # Arguments
    /// * `components` - The initial value of every component, all of them with the same shape.
    /// * `aggregate` - The buffer that will hold the sum, it must have the components' shape.
    /// * `overwrite` - Whether to recompute `aggregate` as the sum of `components`. When `false`
    ///   the given aggregate is trusted as is.
    ///
    /// # Returns
    /// A new `GradientAggregator` with no initialized components, or an error if `components`
    /// is empty or the shapes disagree.
    pub fn with_aggregate(
        components: Vec<Array<A, D>>,
        mut aggregate: Array<A, D>,
        overwrite: bool,
    ) -> Result<Self> {
        let Some(first) = components.first() else {
            return Err(SagErr::InvalidArgument(
                "at least one component is required",
            ));
        };

        let shape = first.shape();
        for component in &components[1..] {
            check_shape("component", component.shape(), shape)?;
        }

        check_shape("aggregate", aggregate.shape(), shape)?;

        if overwrite {
            sum_into(&mut aggregate, &components);
        }

        Ok(Self::from_checked(components, aggregate))
    }

    /// Creates a new `GradientAggregator` whose aggregate is the sum of `components`.
    ///
    /// Takes ownership of `components`.
    ///
    /// # Arguments
    /// * `components` - The initial value of every component, all of them with the same shape.
    ///
    /// # Returns
    /// A new `GradientAggregator` with no initialized components, or an error if `components`
    /// is empty or the shapes disagree.
    pub fn new(components: Vec<Array<A, D>>) -> Result<Self> {
        let Some(first) = components.first() else {
            return Err(SagErr::InvalidArgument(
                "at least one component is required",
            ));
        };

        let aggregate = Array::zeros(first.raw_dim());
        Self::with_aggregate(components, aggregate, true)
    }

    /// Same as `new` but copies the given arrays instead of taking ownership of them.
    pub fn from_views<S: Data<Elem = A>>(components: &[ArrayBase<S, D>]) -> Result<Self> {
        Self::new(components.iter().map(|c| c.to_owned()).collect())
    }

    /// Creates a new `GradientAggregator` by splitting `gradient` evenly into `n` components.
    ///
    /// Every component holds `gradient / n` while the aggregate keeps `gradient` exactly, it is
    /// not recomputed from the divided parts.
    ///
    /// # Arguments
    /// * `gradient` - The full gradient, becomes the aggregate.
    /// * `n` - The amount of components.
    ///
    /// # Returns
    /// A new `GradientAggregator` with no initialized components, or an error if `n` is zero
    /// or it can't be represented by the element type.
    pub fn split(gradient: Array<A, D>, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SagErr::InvalidArgument(
                "the number of components must be positive",
            ));
        }

        let divisor = A::from_usize(n).ok_or(SagErr::InvalidArgument(
            "the number of components doesn't fit the element type",
        ))?;

        let part = gradient.mapv(|g| g / divisor);
        Self::with_aggregate(vec![part; n], gradient, false)
    }

    /// Creates a new `GradientAggregator` of `n` zeroed components with the given shape.
    ///
    /// # Returns
    /// A new `GradientAggregator`, or an error if `n` is zero.
    pub fn zeros<Sh: ShapeBuilder<Dim = D>>(n: usize, shape: Sh) -> Result<Self> {
        if n == 0 {
            return Err(SagErr::InvalidArgument(
                "the number of components must be positive",
            ));
        }

        let aggregate = Array::zeros(shape);
        Ok(Self::from_checked(vec![aggregate.clone(); n], aggregate))
    }

    /// Builds the aggregator from already validated parts.
    pub(super) fn from_checked(components: Vec<Array<A, D>>, aggregate: Array<A, D>) -> Self {
        let n = components.len();

        Self {
            components,
            aggregate,
            initialized: vec![false; n],
            ninitialized: 0,
        }
    }

    /// Returns the amount of components, fixed at construction.
    pub fn ncomponents(&self) -> usize {
        self.components.len()
    }

    /// Returns a view of the `index`-th component, if there is one.
    pub fn component(&self, index: usize) -> Option<ArrayView<'_, A, D>> {
        self.components.get(index).map(|c| c.view())
    }

    /// Returns an iterator over views of every component, in index order.
    pub fn components(&self) -> impl ExactSizeIterator<Item = ArrayView<'_, A, D>> {
        self.components.iter().map(|c| c.view())
    }

    /// Returns a view of the aggregate, the sum of every component.
    pub fn aggregate(&self) -> ArrayView<'_, A, D> {
        self.aggregate.view()
    }

    /// Consumes the aggregator and yields the aggregate.
    pub fn into_aggregate(self) -> Array<A, D> {
        self.aggregate
    }

    /// Whether the `index`-th component has been explicitly updated at least once.
    pub fn is_initialized(&self, index: usize) -> bool {
        self.initialized.get(index).copied().unwrap_or(false)
    }

    /// Returns the amount of components that have been explicitly updated at least once.
    pub fn ninitialized(&self) -> usize {
        self.ninitialized
    }

    /// Returns the fraction of components that have been explicitly updated at least once.
    ///
    /// Construction never counts as an update, so this starts at `0` even when the aggregator
    /// was seeded with non zero components.
    pub fn initialized_fraction(&self) -> f64 {
        self.ninitialized as f64 / self.components.len() as f64
    }

    /// Replaces the `index`-th component with `value`, adjusting the aggregate by the delta.
    ///
    /// # Arguments
    /// * `index` - The component to replace, must be in `0..ncomponents()`.
    /// * `value` - The new value of the component, must have the aggregate's shape.
    ///
    /// # Returns
    /// An `IndexOutOfRange` or `ShapeMismatch` error, in which case nothing was modified.
    pub fn update<S>(&mut self, index: usize, value: ArrayBase<S, D>) -> Result<()>
    where
        S: Data<Elem = A>,
    {
        self.check_entry(index, value.shape())?;
        self.apply_delta(index, &value);
        Ok(())
    }

    /// Same as `update` taking the index and value as a single pair.
    pub fn update_entry<S>(&mut self, entry: (usize, ArrayBase<S, D>)) -> Result<()>
    where
        S: Data<Elem = A>,
    {
        let (index, value) = entry;
        self.update(index, value)
    }

    /// Replaces several components at once.
    ///
    /// The result is the same as calling `update` for every entry in order: the last entry
    /// for a repeated index wins and an index counts as initialized once. Every entry is
    /// validated before touching anything, so on error nothing was modified.
    ///
    /// # Arguments
    /// * `entries` - The `(index, value)` pairs to apply.
    ///
    /// # Returns
    /// An `IndexOutOfRange` or `ShapeMismatch` error for the first invalid entry.
    pub fn update_many<I, S>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, ArrayBase<S, D>)>,
        S: Data<Elem = A>,
    {
        let entries: Vec<_> = entries.into_iter().collect();

        for (index, value) in &entries {
            self.check_entry(*index, value.shape())?;
        }

        let strategy = BulkStrategy::select(entries.len(), self.components.len());
        trace!(
            "applying {} entries over {} components via {strategy:?}",
            entries.len(),
            self.components.len()
        );

        match strategy {
            BulkStrategy::Incremental => self.update_incremental(&entries),
            BulkStrategy::Resum => self.update_resum(&entries),
        }

        Ok(())
    }

    fn check_entry(&self, index: usize, shape: &[usize]) -> Result<()> {
        let len = self.components.len();
        if index >= len {
            return Err(SagErr::IndexOutOfRange { index, len });
        }

        check_shape("update value", shape, self.aggregate.shape())
    }

    /// Swaps `components[index]` for `value` inside the aggregate and then overwrites the
    /// component.
    ///
    /// The old value is taken out before the new one is added, so integer aggregates only ever
    /// hold partial sums of components.
    fn apply_delta<S: Data<Elem = A>>(&mut self, index: usize, value: &ArrayBase<S, D>) {
        let component = &mut self.components[index];

        Zip::from(&mut self.aggregate)
            .and(&*component)
            .and(value)
            .for_each(|acc, &old, &new| *acc = (*acc - old) + new);

        component.assign(value);
        self.mark_initialized(index);
    }

    fn update_incremental<S: Data<Elem = A>>(&mut self, entries: &[(usize, ArrayBase<S, D>)]) {
        for (index, value) in entries {
            self.apply_delta(*index, value);
        }
    }

    fn update_resum<S: Data<Elem = A>>(&mut self, entries: &[(usize, ArrayBase<S, D>)]) {
        for (index, value) in entries {
            self.components[*index].assign(value);
            self.mark_initialized(*index);
        }

        sum_into(&mut self.aggregate, &self.components);
    }

    fn mark_initialized(&mut self, index: usize) {
        if !mem::replace(&mut self.initialized[index], true) {
            self.ninitialized += 1;
        }
    }
}

fn check_shape(what: &'static str, got: &[usize], expected: &[usize]) -> Result<()> {
    if got != expected {
        return Err(SagErr::ShapeMismatch {
            what,
            got: got.to_vec(),
            expected: expected.to_vec(),
        });
    }

    Ok(())
}

/// Overwrites `aggregate` with the elementwise sum of `components`.
fn sum_into<A: Element, D: Dimension>(aggregate: &mut Array<A, D>, components: &[Array<A, D>]) {
    aggregate.fill(A::zero());

    for component in components {
        Zip::from(aggregate.view_mut())
            .and(component)
            .for_each(|acc, &c| *acc = *acc + c);
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2, array};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn random_entries(rng: &mut StdRng, n: usize, count: usize) -> Vec<(usize, Array2<i64>)> {
        (0..count)
            .map(|_| {
                let index = rng.random_range(0..n);
                let value = Array2::from_shape_fn((2, 3), |_| rng.random_range(-50..50));
                (index, value)
            })
            .collect()
    }

    fn exact_sum(aggregator: &GradientAggregator<i64, ndarray::Ix2>) -> Array2<i64> {
        aggregator
            .components()
            .fold(Array2::zeros((2, 3)), |acc, c| acc + c)
    }

    #[test]
    fn strategy_threshold() {
        assert_eq!(BulkStrategy::select(0, 1), BulkStrategy::Incremental);
        assert_eq!(BulkStrategy::select(1, 1), BulkStrategy::Resum);
        assert_eq!(BulkStrategy::select(2, 4), BulkStrategy::Incremental);
        assert_eq!(BulkStrategy::select(3, 4), BulkStrategy::Resum);
        assert_eq!(BulkStrategy::select(usize::MAX, 4), BulkStrategy::Resum);
    }

    #[test]
    fn both_strategies_reach_the_same_state() {
        const N: usize = 7;

        let mut rng = StdRng::seed_from_u64(42);

        for count in [1, 3, 5, 12] {
            let seed = random_entries(&mut rng, N, N);
            let entries = random_entries(&mut rng, N, count);

            let mut incremental = GradientAggregator::<i64, _>::zeros(N, (2, 3)).unwrap();
            incremental.update_incremental(&seed);
            let mut resum = incremental.clone();

            incremental.update_incremental(&entries);
            resum.update_resum(&entries);

            assert_eq!(incremental.aggregate, resum.aggregate);
            assert_eq!(incremental.components, resum.components);
            assert_eq!(incremental.initialized, resum.initialized);
            assert_eq!(incremental.ninitialized, resum.ninitialized);
            assert_eq!(incremental.aggregate, exact_sum(&incremental));
        }
    }

    #[test]
    fn resum_matches_sequential_updates_with_duplicates() {
        let a = array![[1., 2., 3.], [4., 5., 6.]];
        let b = array![[-1., 0., 1.], [2., 2., 2.]];

        let mut sequential = GradientAggregator::<f64, _>::zeros(3, (2, 3)).unwrap();
        sequential.update(0, a.view()).unwrap();
        sequential.update(0, b.view()).unwrap();

        let mut resum = GradientAggregator::<f64, _>::zeros(3, (2, 3)).unwrap();
        resum.update_resum(&[(0, a.view()), (0, b.view())]);

        assert_eq!(resum.components[0], b);
        assert_eq!(resum.aggregate, sequential.aggregate);
        assert_eq!(resum.ninitialized, 1);
    }

    #[test]
    fn resum_discards_a_stale_aggregate() {
        let components = vec![Array1::from_elem(2, 1), Array1::from_elem(2, 2)];
        let stale = Array1::from_elem(2, 100);

        let mut aggregator = GradientAggregator::with_aggregate(components, stale, false).unwrap();
        assert_eq!(aggregator.aggregate, Array1::from_elem(2, 100));

        aggregator.update_resum(&[(1, Array1::from_elem(2, 5))]);
        assert_eq!(aggregator.aggregate, Array1::from_elem(2, 6));
    }

    #[test]
    fn lowering_a_component_keeps_integer_sums_in_range() {
        let mut aggregator = GradientAggregator::<i32, _>::zeros(2, 2).unwrap();
        aggregator.update(0, array![5, 5]).unwrap();
        aggregator.update(1, array![1, 1]).unwrap();
        aggregator.update(0, array![3, 3]).unwrap();
        assert_eq!(aggregator.aggregate, array![4, 4]);

        // -100 - 100 and 100 - -100 don't fit an i8, the partial sums do
        let mut narrow = GradientAggregator::<i8, _>::zeros(2, 1).unwrap();
        narrow.update(0, array![100]).unwrap();
        narrow.update(1, array![27]).unwrap();
        narrow.update(0, array![-100]).unwrap();
        assert_eq!(narrow.aggregate, array![-73i8]);

        narrow.update_many([(0, array![100])]).unwrap();
        assert_eq!(narrow.aggregate, array![127i8]);
        assert_eq!(narrow.components, [array![100i8], array![27i8]]);
    }

    #[test]
    fn incremental_keeps_the_sum_invariant() {
        const N: usize = 5;

        let mut rng = StdRng::seed_from_u64(7);
        let mut aggregator = GradientAggregator::<i64, _>::zeros(N, (2, 3)).unwrap();

        for _ in 0..50 {
            let entries = random_entries(&mut rng, N, 2);
            aggregator.update_incremental(&entries);
            assert_eq!(aggregator.aggregate, exact_sum(&aggregator));
        }
    }
}
