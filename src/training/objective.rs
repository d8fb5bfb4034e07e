use ndarray::{Array, ArrayView, Dimension};

use crate::Result;

/// An objective made of a finite sum of terms, each with its own gradient.
///
/// Implementations own the data and the loss, optimizers only ever see the term gradients.
pub trait FiniteSum<A, D: Dimension> {
    /// Returns the amount of terms of the sum.
    fn nterms(&self) -> usize;

    /// Computes the gradient of the `term`-th term at `params`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if `term` is not below `nterms()`, `ShapeMismatch` if `params` doesn't
    /// have the expected shape.
    fn term_gradient(&self, term: usize, params: ArrayView<'_, A, D>) -> Result<Array<A, D>>;

    /// Evaluates the whole objective at `params`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `params` doesn't have the expected shape.
    fn loss(&self, params: ArrayView<'_, A, D>) -> Result<A>;
}
