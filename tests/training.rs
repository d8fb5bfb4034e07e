use std::num::NonZeroUsize;

use ndarray::Array1;
use rand::{SeedableRng, rngs::StdRng};
use sag::{
    InitializedFraction, SagErr,
    config::{OptimizerConfig, TrainingConfig},
    optimization::{GradientDescent, Sag},
    training::{FiniteSum, LeastSquares, Trainer},
};

const CONFIG: &str = r#"{
    "samples": 40,
    "features": 3,
    "epochs": 200,
    "seed": 7,
    "optimizer": { "kind": "sag", "lr": 0.02 }
}"#;

fn max_error(params: &Array1<f64>, weights: &Array1<f64>) -> f64 {
    (params - weights).iter().fold(0f64, |acc, d| acc.max(d.abs()))
}

#[test]
fn sag_recovers_the_generating_weights_from_a_config() {
    let config = TrainingConfig::from_json(CONFIG).unwrap();
    let OptimizerConfig::Sag { lr } = config.optimizer else {
        panic!("expected a sag optimizer, got {:?}", config.optimizer);
    };

    let samples = config.samples.get();
    let features = config.features.get();
    let mut rng = StdRng::seed_from_u64(config.seed.unwrap());
    let (objective, weights) =
        LeastSquares::synthetic(samples, features, config.noise, &mut rng).unwrap();
    assert_eq!(objective.nterms(), samples);

    let sag = Sag::new(samples, features, lr).unwrap();
    let mut trainer = Trainer::new(sag, objective, config.epochs, rng);
    let mut params = Array1::<f64>::zeros(features);
    let history = trainer.train(&mut params).unwrap();

    assert_eq!(history.len(), config.epochs.get());
    assert!(history.last().unwrap() < history.first().unwrap());
    assert!(max_error(&params, &weights) < 1e-2);

    let memory = trainer.optimizer().memory();
    assert_eq!(memory.initialized_fraction(), 1.);
    assert_eq!(InitializedFraction::initialized_fraction(memory), 1.);
}

#[test]
fn sag_and_gradient_descent_agree_on_the_minimizer() {
    let mut rng = StdRng::seed_from_u64(3);
    let (objective, weights) = LeastSquares::synthetic(20, 2, 0., &mut rng).unwrap();
    let epochs = NonZeroUsize::new(300).unwrap();

    let sag = Sag::new(20, 2, 0.05).unwrap();
    let mut sag_params = Array1::<f64>::zeros(2);
    Trainer::new(sag, objective.clone(), epochs, StdRng::seed_from_u64(1))
        .train(&mut sag_params)
        .unwrap();

    let mut gd_params = Array1::<f64>::zeros(2);
    Trainer::new(GradientDescent::new(0.02), objective, epochs, StdRng::seed_from_u64(1))
        .train(&mut gd_params)
        .unwrap();

    assert!(max_error(&sag_params, &weights) < 1e-3);
    assert!(max_error(&gd_params, &weights) < 1e-3);
}

#[test]
fn mismatched_parameters_are_rejected() {
    let mut rng = StdRng::seed_from_u64(0);
    let (objective, _) = LeastSquares::synthetic(5, 2, 0., &mut rng).unwrap();
    let epochs = NonZeroUsize::new(1).unwrap();
    let mut trainer = Trainer::new(GradientDescent::new(0.1), objective, epochs, rng);

    let mut params = Array1::<f64>::zeros(3);
    let err = trainer.train(&mut params).unwrap_err();

    assert!(matches!(err, SagErr::ShapeMismatch { what: "params", .. }));
    assert_eq!(params, Array1::<f64>::zeros(3));
}
