use ndarray::{Array, ArrayView, Dimension, Zip};

use super::{Optimizer, check_shapes};
use crate::{Element, Result};

/// Plain stochastic gradient descent, every step only follows the latest term gradient.
#[derive(Debug, Clone)]
pub struct GradientDescent<A> {
    learning_rate: A,
}

impl<A> GradientDescent<A> {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The small coefficient that modulates the length of every step.
    ///
    /// # Returns
    /// A new `GradientDescent` instance.
    pub fn new(learning_rate: A) -> Self {
        Self { learning_rate }
    }
}

impl<A: Element, D: Dimension> Optimizer<A, D> for GradientDescent<A> {
    fn update_params(
        &mut self,
        _term: usize,
        grad: ArrayView<'_, A, D>,
        params: &mut Array<A, D>,
    ) -> Result<()> {
        check_shapes(grad.shape(), params.shape())?;

        let lr = self.learning_rate;
        Zip::from(params)
            .and(&grad)
            .for_each(|p, &g| *p = *p - lr * g);

        Ok(())
    }
}
