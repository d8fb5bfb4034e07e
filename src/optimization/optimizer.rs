use ndarray::{Array, ArrayView, Dimension};

use crate::Result;

/// Defines the strategy for updating model parameters based on the gradient of one term of a
/// finite-sum objective.
pub trait Optimizer<A, D: Dimension> {
    /// Updates the provided parameters using a freshly computed term gradient.
    ///
    /// # Arguments
    /// * `term` - The index of the objective's term `grad` was computed for.
    /// * `grad` - The gradient of that term at the current parameters.
    /// * `params` - The parameters to update.
    ///
    /// # Returns
    /// An error if `grad` and `params` have different shapes or `term` is not valid for the
    /// optimizer, in which case `params` is left untouched.
    fn update_params(
        &mut self,
        term: usize,
        grad: ArrayView<'_, A, D>,
        params: &mut Array<A, D>,
    ) -> Result<()>;
}
