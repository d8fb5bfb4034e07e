mod gradient_descent;
mod optimizer;
mod sag;

pub use gradient_descent::GradientDescent;
pub use optimizer::Optimizer;
pub use sag::Sag;

use crate::{Result, SagErr};

/// Checks that a gradient can be applied onto the given parameters.
fn check_shapes(grad: &[usize], params: &[usize]) -> Result<()> {
    if grad != params {
        return Err(SagErr::ShapeMismatch {
            what: "gradient",
            got: grad.to_vec(),
            expected: params.to_vec(),
        });
    }

    Ok(())
}
