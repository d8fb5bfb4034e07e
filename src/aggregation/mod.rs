mod aggregator;
mod fraction;
mod view;

use std::fmt::Debug;

use ndarray::LinalgScalar;
use num_traits::{FromPrimitive, Signed};

pub use aggregator::GradientAggregator;
pub use fraction::InitializedFraction;

/// The numeric element types an aggregator can hold: floats and signed integers.
///
/// Replacing a component may lower the aggregate, so unsigned types are rejected.
///
/// ```compile_fail
/// let _ = sag::GradientAggregator::<u32, _>::zeros(2, 2);
/// ```
pub trait Element: LinalgScalar + Signed + FromPrimitive + Debug {}

impl<T: LinalgScalar + Signed + FromPrimitive + Debug> Element for T {}
