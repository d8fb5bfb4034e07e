use std::env;

use anyhow::Context;
use log::info;
use ndarray::{Array1, Ix1};
use rand::{SeedableRng, rngs::StdRng};

use sag::{
    config::{OptimizerConfig, TrainingConfig},
    optimization::{GradientDescent, Optimizer, Sag},
    training::{LeastSquares, Trainer},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = env::args().nth(1).context("usage: sag <config.json>")?;

    let config =
        TrainingConfig::load(&path).with_context(|| format!("failed to load config '{path}'"))?;
    info!("loaded config from {path}: {config:?}");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let samples = config.samples.get();
    let features = config.features.get();
    let (objective, weights) = LeastSquares::synthetic(samples, features, config.noise, &mut rng)?;

    let mut params = Array1::zeros(features);
    let history = match config.optimizer {
        OptimizerConfig::GradientDescent { lr } => {
            let gd = GradientDescent::new(lr);
            train(gd, objective, &config, rng, &mut params)?
        }
        OptimizerConfig::Sag { lr } => {
            let sag = Sag::new(samples, features, lr)?;
            train(sag, objective, &config, rng, &mut params)?
        }
    };

    let max_err = (&params - &weights)
        .iter()
        .fold(0f64, |acc, d| acc.max(d.abs()));

    if let Some(loss) = history.last() {
        info!("final loss: {loss:e}");
    }
    info!("max parameter error against the generating model: {max_err:e}");

    Ok(())
}

fn train<O: Optimizer<f64, Ix1>>(
    optimizer: O,
    objective: LeastSquares,
    config: &TrainingConfig,
    rng: StdRng,
    params: &mut Array1<f64>,
) -> sag::Result<Vec<f64>> {
    Trainer::new(optimizer, objective, config.epochs, rng).train(params)
}
