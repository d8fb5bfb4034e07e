//! Incremental tracking of the sum of the term gradients of a finite-sum objective, the core
//! of stochastic average gradient (SAG) optimization.
//!
//! A [`GradientAggregator`] owns the latest gradient of every term along with their sum, and
//! keeps that sum exact while single terms get replaced, at the cost of one term per update.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod optimization;
pub mod training;

pub use aggregation::{Element, GradientAggregator, InitializedFraction};
pub use error::{Result, SagErr};
