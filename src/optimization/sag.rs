use log::trace;
use ndarray::{Array, ArrayView, Dimension, ShapeBuilder, Zip};

use super::{Optimizer, check_shapes};
use crate::{Element, GradientAggregator, Result, SagErr};

/// Stochastic average gradient optimization algorithm.
///
/// Remembers the latest gradient of every term of the objective and steps along the mean of
/// the ones observed so far. Keeping that mean up to date costs a single term gradient per
/// step thanks to the inner `GradientAggregator`.
///
/// Every step moves the parameters by `learning_rate / observed` times the aggregate, where
/// `observed` is the amount of terms updated so far. That equals a step size of
/// `learning_rate / (nterms * memory().initialized_fraction())`.
#[derive(Debug, Clone)]
pub struct Sag<A, D: Dimension> {
    learning_rate: A,
    memory: GradientAggregator<A, D>,
}

impl<A: Element, D: Dimension> Sag<A, D> {
    /// Creates a new `Sag` optimizer with an empty gradient memory.
    ///
    /// # Arguments
    /// * `nterms` - The amount of terms of the objective.
    /// * `shape` - The shape of the parameters.
    /// * `learning_rate` - The small coefficient that modulates the length of every step.
    ///
    /// # Returns
    /// A new `Sag` instance, or an error if `nterms` is zero.
    pub fn new<Sh>(nterms: usize, shape: Sh, learning_rate: A) -> Result<Self>
    where
        Sh: ShapeBuilder<Dim = D>,
    {
        let memory = GradientAggregator::zeros(nterms, shape)?;
        Ok(Self::with_memory(memory, learning_rate))
    }

    /// Creates a new `Sag` optimizer on top of an already seeded gradient memory.
    ///
    /// Seeded components only start counting towards the mean once their term gets updated,
    /// but they are part of the aggregate from the start.
    pub fn with_memory(memory: GradientAggregator<A, D>, learning_rate: A) -> Self {
        Self {
            learning_rate,
            memory,
        }
    }

    /// Returns the remembered term gradients.
    pub fn memory(&self) -> &GradientAggregator<A, D> {
        &self.memory
    }

    pub fn learning_rate(&self) -> A {
        self.learning_rate
    }
}

impl<A: Element, D: Dimension> Optimizer<A, D> for Sag<A, D> {
    /// Stores `grad` as the latest gradient of `term` and takes a step of length
    /// `learning_rate` along the mean of the observed term gradients.
    fn update_params(
        &mut self,
        term: usize,
        grad: ArrayView<'_, A, D>,
        params: &mut Array<A, D>,
    ) -> Result<()> {
        check_shapes(grad.shape(), params.shape())?;

        let observed = self.memory.ninitialized() + usize::from(!self.memory.is_initialized(term));
        let observed_elem = A::from_usize(observed).ok_or(SagErr::InvalidArgument(
            "the number of observed terms doesn't fit the element type",
        ))?;

        self.memory.update(term, grad)?;
        trace!(term = term, observed = observed; "stored term gradient");

        let step = self.learning_rate / observed_elem;
        Zip::from(params)
            .and(&self.memory.aggregate())
            .for_each(|p, &g| *p = *p - step * g);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};

    use super::*;

    #[test]
    fn steps_along_the_mean_of_observed_gradients() {
        let mut sag = Sag::new(3, 2, 1.).unwrap();
        let mut params = Array1::<f64>::zeros(2);

        let grad = array![2., 4.];
        sag.update_params(0, grad.view(), &mut params).unwrap();
        assert_eq!(params, array![-2., -4.]);

        let grad = array![4., 0.];
        sag.update_params(2, grad.view(), &mut params).unwrap();
        assert_eq!(params, array![-5., -6.]);

        // revisiting a term replaces its gradient instead of adding a new one
        let grad = array![0., 0.];
        sag.update_params(0, grad.view(), &mut params).unwrap();
        assert_eq!(params, array![-7., -6.]);

        assert_eq!(sag.memory().ninitialized(), 2);
        assert!(*sag.memory() == array![4., 0.]);
    }

    #[test]
    fn failed_steps_leave_everything_untouched() {
        let mut sag = Sag::new(2, 2, 1.).unwrap();
        let mut params = Array1::<f64>::ones(2);

        let grad = array![1., 1.];
        let err = sag.update_params(2, grad.view(), &mut params).unwrap_err();
        assert_eq!(err, SagErr::IndexOutOfRange { index: 2, len: 2 });

        let wide = array![1., 1., 1.];
        let err = sag.update_params(0, wide.view(), &mut params).unwrap_err();
        assert!(matches!(err, SagErr::ShapeMismatch { .. }));

        let mut wrong_params = Array1::<f64>::ones(3);
        let err = sag.update_params(0, wide.view(), &mut wrong_params);
        assert!(matches!(err, Err(SagErr::ShapeMismatch { .. })));

        assert_eq!(params, Array1::<f64>::ones(2));
        assert_eq!(wrong_params, Array1::<f64>::ones(3));
        assert_eq!(sag.memory().ninitialized(), 0);
        assert!(*sag.memory() == Array1::<f64>::zeros(2));
    }

    #[test]
    fn rejects_zero_terms() {
        assert!(Sag::<f64, _>::new(0, 2, 1.).is_err());
    }
}
