mod least_squares;
mod objective;
mod trainer;

pub use least_squares::LeastSquares;
pub use objective::FiniteSum;
pub use trainer::Trainer;
