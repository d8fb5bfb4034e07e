use std::num::NonZeroUsize;

use log::{debug, info};
use ndarray::{Array, Dimension};
use rand::Rng;

use super::FiniteSum;
use crate::{Element, Result, SagErr, optimization::Optimizer};

/// Drives an optimizer over a finite-sum objective by sampling one term per step.
///
/// Every epoch takes as many steps as the objective has terms, picking each term uniformly at
/// random with replacement.
pub struct Trainer<O, F, R> {
    optimizer: O,
    objective: F,
    epochs: NonZeroUsize,
    rng: R,
}

impl<O, F, R: Rng> Trainer<O, F, R> {
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `optimizer` - The optimization algorithm.
    /// * `objective` - The objective to minimize.
    /// * `epochs` - The amount of passes over the objective's terms.
    /// * `rng` - The random number generator used to sample terms.
    ///
    /// # Returns
    /// A new `Trainer` instance.
    pub fn new(optimizer: O, objective: F, epochs: NonZeroUsize, rng: R) -> Self {
        Self {
            optimizer,
            objective,
            epochs,
            rng,
        }
    }

    /// Minimizes the objective starting from `params`, which are updated in place.
    ///
    /// # Returns
    /// The objective's loss at the end of every epoch, or the first error raised by the
    /// objective or the optimizer.
    pub fn train<A, D>(&mut self, params: &mut Array<A, D>) -> Result<Vec<A>>
    where
        A: Element,
        D: Dimension,
        O: Optimizer<A, D>,
        F: FiniteSum<A, D>,
    {
        let nterms = self.objective.nterms();
        if nterms == 0 {
            return Err(SagErr::InvalidArgument(
                "the objective must have at least one term",
            ));
        }

        let epochs = self.epochs.get();
        let mut history = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            for _ in 0..nterms {
                let term = self.rng.random_range(0..nterms);
                let grad = self.objective.term_gradient(term, params.view())?;
                self.optimizer.update_params(term, grad.view(), params)?;
            }

            let loss = self.objective.loss(params.view())?;
            debug!("epoch {epoch}: loss={loss:?}");
            history.push(loss);
        }

        info!(epochs = epochs, nterms = nterms; "training finished");
        Ok(history)
    }

    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    pub fn objective(&self) -> &F {
        &self.objective
    }
}
