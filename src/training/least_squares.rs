use ndarray::{Array1, Array2, ArrayView1, Ix1};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};

use super::FiniteSum;
use crate::{Result, SagErr};

/// The linear least squares objective `1/(2m) * sum_i (x_i . w - y_i)^2`, one term per row of
/// the design matrix.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl LeastSquares {
    /// Creates a new `LeastSquares` objective.
    ///
    /// # Arguments
    /// * `x` - The design matrix, one sample per row.
    /// * `y` - The targets, one per sample.
    ///
    /// # Returns
    /// A new `LeastSquares` instance, or an error if there are no samples or `y` doesn't have
    /// one target per sample.
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(SagErr::InvalidArgument(
                "the design matrix must have at least one row and column",
            ));
        }

        if y.len() != x.nrows() {
            return Err(SagErr::ShapeMismatch {
                what: "targets",
                got: y.shape().to_vec(),
                expected: vec![x.nrows()],
            });
        }

        Ok(Self { x, y })
    }

    /// Creates a random problem whose targets come from a random linear model plus gaussian
    /// noise.
    ///
    /// # Arguments
    /// * `samples` - The amount of rows of the design matrix.
    /// * `features` - The amount of columns of the design matrix.
    /// * `noise` - The standard deviation of the noise added to the targets.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// The objective along with the weights of the generating model, or an error if the
    /// dimensions are zero or `noise` is negative or not finite.
    pub fn synthetic<R: Rng + ?Sized>(
        samples: usize,
        features: usize,
        noise: f64,
        rng: &mut R,
    ) -> Result<(Self, Array1<f64>)> {
        const BAD_NOISE: SagErr =
            SagErr::InvalidArgument("the noise must be finite and non negative");

        if !noise.is_finite() || noise < 0. {
            return Err(BAD_NOISE);
        }

        let noise: Normal<f64> = Normal::new(0., noise).map_err(|_| BAD_NOISE)?;

        let x: Array2<f64> =
            Array2::from_shape_fn((samples, features), |_| StandardNormal.sample(rng));
        let weights: Array1<f64> = Array1::from_shape_fn(features, |_| StandardNormal.sample(rng));
        let y = x.dot(&weights) + Array1::from_shape_fn(samples, |_| noise.sample(rng));

        Ok((Self::new(x, y)?, weights))
    }

    /// Returns the amount of parameters the objective expects.
    pub fn nfeatures(&self) -> usize {
        self.x.ncols()
    }

    fn check_params(&self, params: &ArrayView1<'_, f64>) -> Result<()> {
        if params.len() != self.x.ncols() {
            return Err(SagErr::ShapeMismatch {
                what: "params",
                got: params.shape().to_vec(),
                expected: vec![self.x.ncols()],
            });
        }

        Ok(())
    }
}

impl FiniteSum<f64, Ix1> for LeastSquares {
    fn nterms(&self) -> usize {
        self.x.nrows()
    }

    fn term_gradient(&self, term: usize, params: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let len = self.nterms();
        if term >= len {
            return Err(SagErr::IndexOutOfRange { index: term, len });
        }

        self.check_params(&params)?;

        let row = self.x.row(term);
        let residual = row.dot(&params) - self.y[term];
        Ok(&row * residual)
    }

    fn loss(&self, params: ArrayView1<'_, f64>) -> Result<f64> {
        self.check_params(&params)?;

        let residuals = self.x.dot(&params) - &self.y;
        Ok(residuals.dot(&residuals) / (2. * self.nterms() as f64))
    }
}
