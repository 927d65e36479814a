use machine_learning::arch::{
    ParamBlock,
    activations::{PRELU_INIT, sigmoid},
    stages::StageSpec,
};
use molprop::{
    Activation, Batch, DatasetType, DescriptorEncoder, Encoder, ModelConfig, ModelError,
    MoleculeModel, Output, OutputMode, RunMode, TaskFlags, build_model,
};
use ndarray::{Array2, Axis};
use ndarray_rand::{
    RandomExt,
    rand::{SeedableRng, rngs::StdRng},
    rand_distr::Uniform,
};

const INPUT_DIM: usize = 12;
const TRAIN: RunMode = RunMode::Training { seed: 5 };

fn config(num_tasks: usize) -> ModelConfig {
    ModelConfig {
        hidden_size: 32,
        ffn_hidden_size: Some(16),
        encoder_depth: 2,
        seed: 17,
        ..ModelConfig::new(num_tasks, INPUT_DIM)
    }
}

fn random(shape: (usize, usize), seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::random_using(shape, Uniform::new(-1., 1.).unwrap(), &mut rng)
}

fn batch(size: usize) -> Batch<Array2<f32>> {
    Batch::new(random((size, INPUT_DIM), 99))
}

fn flat(output: Output) -> Array2<f32> {
    match output.as_flat() {
        Some(x) => x.clone(),
        None => panic!("expected a flat output, got {:?}", output.shape()),
    }
}

#[test]
fn both_classification_flags_conflict() {
    let config = config(1);
    let flags = TaskFlags {
        featurizer: false,
        classification: true,
        multiclass: true,
    };
    let encoder = DescriptorEncoder::from_config(&config).unwrap();

    let result = MoleculeModel::assemble(&config, flags, encoder);
    assert!(matches!(result, Err(ModelError::ConfigurationConflict)));
}

#[test]
fn regression_is_raw_in_both_modes() {
    let model = build_model(&config(3)).unwrap();
    let batch = batch(5);

    let inference = flat(model.forward(&batch, RunMode::Inference).unwrap());
    let training = flat(model.forward(&batch, TRAIN).unwrap());

    assert_eq!(inference.shape(), [5, 3]);
    assert_eq!(inference, training);
    assert_eq!(model.output_mode(), OutputMode::Regression);
    assert_eq!(model.num_tasks(), 3);
    assert!(!model.is_featurizer());
}

#[test]
fn dropout_only_applies_while_training() {
    let config = ModelConfig {
        dropout: 0.5,
        ..config(2)
    };
    let model = build_model(&config).unwrap();
    let batch = batch(8);

    let a = model.forward(&batch, RunMode::Inference).unwrap();
    let b = model.forward(&batch, RunMode::Inference).unwrap();
    assert_eq!(a, b);

    let first = model.forward(&batch, RunMode::Training { seed: 1 }).unwrap();
    let again = model.forward(&batch, RunMode::Training { seed: 1 }).unwrap();
    let other = model.forward(&batch, RunMode::Training { seed: 2 }).unwrap();
    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_ne!(first, a);
}

#[test]
fn classification_probabilities_at_inference_only() {
    let config = ModelConfig {
        dataset_type: DatasetType::Classification,
        ..config(4)
    };
    let model = build_model(&config).unwrap();
    let batch = batch(6);

    let probs = flat(model.forward(&batch, RunMode::Inference).unwrap());
    let logits = flat(model.forward(&batch, TRAIN).unwrap());

    assert_eq!(probs.shape(), [6, 4]);
    assert!(probs.iter().all(|&p| p > 0. && p < 1.));
    assert!(logits.iter().any(|&l| !(0. ..1.).contains(&l)));

    for (&p, &l) in probs.iter().zip(&logits) {
        assert!((sigmoid(l) - p).abs() < 1e-6);
    }
}

#[test]
fn multiclass_normalizes_each_task_at_inference() {
    let config = ModelConfig {
        dataset_type: DatasetType::Multiclass,
        multiclass_num_classes: 4,
        ..config(3)
    };
    let model = build_model(&config).unwrap();
    let batch = batch(5);

    let Output::PerClass(probs) = model.forward(&batch, RunMode::Inference).unwrap() else {
        panic!("expected a per class output");
    };
    let Output::PerClass(logits) = model.forward(&batch, TRAIN).unwrap() else {
        panic!("expected a per class output");
    };

    assert_eq!(probs.shape(), [5, 3, 4]);
    assert_eq!(logits.shape(), [5, 3, 4]);
    assert_eq!(model.output_size(), 12);

    for lane in probs.lanes(Axis(2)) {
        assert!((lane.sum() - 1.).abs() < 1e-5);
    }
    assert!(
        logits
            .lanes(Axis(2))
            .into_iter()
            .any(|lane| (lane.sum() - 1.).abs() > 1e-3)
    );
}

#[test]
fn featurizer_outputs_hidden_width() {
    let config = ModelConfig {
        ffn_num_layers: 3,
        featurizer: true,
        dataset_type: DatasetType::Classification,
        ..config(7)
    };
    let model = build_model(&config).unwrap();
    let batch = batch(3);
    assert!(model.is_featurizer());

    let features = flat(model.forward(&batch, RunMode::Inference).unwrap());
    assert_eq!(features.shape(), [3, 16]);
    // no sigmoid on featurizer outputs
    assert!(features.iter().any(|&v| !(0. ..1.).contains(&v)));

    let full = build_model(&ModelConfig {
        featurizer: false,
        ..config
    })
    .unwrap();
    assert_eq!(full.featurize(&batch, RunMode::Inference).unwrap().shape(), [3, 16]);
}

#[test]
fn featurize_matches_a_featurizer_model() {
    let config = ModelConfig {
        ffn_num_layers: 4,
        activation: Activation::Prelu,
        ..config(2)
    };
    let full = build_model(&config).unwrap();
    let mut featurizer = build_model(&ModelConfig {
        featurizer: true,
        seed: 1234,
        ..config
    })
    .unwrap();

    assert!(featurizer.num_params() < full.num_params());
    featurizer
        .load_params(&full.params()[..featurizer.num_params()])
        .unwrap();

    let batch = batch(4);
    let expected = flat(featurizer.forward(&batch, RunMode::Inference).unwrap());
    let features = full.featurize(&batch, RunMode::Inference).unwrap();

    assert_eq!(features, expected);
}

#[test]
fn single_stage_head_regression() {
    let config = ModelConfig {
        hidden_size: 64,
        ffn_num_layers: 1,
        ..config(3)
    };
    let model = build_model(&config).unwrap();

    assert_eq!(
        model.head_stages(),
        [
            StageSpec::Dropout { rate: 0. },
            StageSpec::Linear {
                input: 64,
                output: 3
            },
        ]
    );

    let output = flat(model.forward(&batch(4), RunMode::Inference).unwrap());
    assert_eq!(output.shape(), [4, 3]);

    // a single stage head has nothing to leave out
    let features = model.featurize(&batch(4), RunMode::Inference).unwrap();
    assert_eq!(features, output);
}

#[test]
fn deep_multiclass_head() {
    let config = ModelConfig {
        hidden_size: 32,
        ffn_hidden_size: None,
        ffn_num_layers: 3,
        dataset_type: DatasetType::Multiclass,
        multiclass_num_classes: 5,
        ..config(2)
    };
    let model = build_model(&config).unwrap();

    let linears: Vec<_> = model
        .head_stages()
        .into_iter()
        .filter_map(|spec| match spec {
            StageSpec::Linear { input, output } => Some((input, output)),
            _ => None,
        })
        .collect();
    assert_eq!(linears, [(32, 32), (32, 32), (32, 10)]);

    let output = model.forward(&batch(6), RunMode::Inference).unwrap();
    let probs = output.as_per_class().unwrap();
    assert_eq!(probs.shape(), [6, 2, 5]);

    for b in 0..6 {
        for t in 0..2 {
            let sum: f32 = probs.slice(ndarray::s![b, t, ..]).sum();
            assert!((sum - 1.).abs() < 1e-5);
        }
    }
}

#[test]
fn input_features_extend_the_head_input() {
    let config = ModelConfig {
        use_input_features: true,
        features_size: 5,
        ..config(1)
    };
    let model = build_model(&config).unwrap();

    assert_eq!(
        model.head_stages()[1],
        StageSpec::Linear {
            input: 32 + 5,
            output: 16
        }
    );

    let molecules = random((3, INPUT_DIM), 1);
    let missing = model.forward(&Batch::new(molecules.clone()), RunMode::Inference);
    assert!(matches!(missing, Err(ModelError::MissingFeatures)));

    let batch = Batch::with_features(molecules, random((3, 5), 2));
    let output = flat(model.forward(&batch, RunMode::Inference).unwrap());
    assert_eq!(output.shape(), [3, 1]);

    let wrong = Batch::with_features(random((3, INPUT_DIM), 1), random((3, 4), 2));
    assert!(matches!(
        model.forward(&wrong, RunMode::Inference),
        Err(ModelError::Ml(_))
    ));
}

#[test]
fn features_only_bypasses_the_encoder() {
    let config = ModelConfig {
        features_only: true,
        features_size: 6,
        ..config(2)
    };
    let model = build_model(&config).unwrap();

    assert_eq!(
        model.head_stages()[1],
        StageSpec::Linear {
            input: 6,
            output: 16
        }
    );
    // the encoder is still built and owns its share of the parameters
    assert_eq!(model.num_params(), model.encoder().size() + model.head().size());
    assert!(model.encoder().size() > 0);

    let features = random((4, 6), 3);
    let a = Batch::with_features(random((4, INPUT_DIM), 10), features.clone());
    let b = Batch::with_features(random((4, INPUT_DIM), 11), features);

    assert_eq!(
        model.forward(&a, RunMode::Inference).unwrap(),
        model.forward(&b, RunMode::Inference).unwrap()
    );
}

#[test]
fn prelu_slopes_belong_to_each_activation_stage() {
    let config = ModelConfig {
        ffn_num_layers: 3,
        activation: Activation::Prelu,
        ..config(1)
    };
    let model = build_model(&config).unwrap();

    let blocks: Vec<_> = model
        .encoder()
        .blocks()
        .into_iter()
        .chain(model.head().blocks())
        .collect();
    let slopes = |blocks: &[ParamBlock]| {
        blocks
            .iter()
            .filter(|block| matches!(block, ParamBlock::Slope { .. }))
            .count()
    };
    assert_eq!(slopes(&model.encoder().blocks()), 1);
    assert_eq!(slopes(&model.head().blocks()), 2);

    let mut offset = 0;
    for block in blocks {
        if let ParamBlock::Slope { len } = block {
            assert!(model.params()[offset..offset + len].iter().all(|&v| v == PRELU_INIT));
        }
        offset += block.len();
    }
    assert_eq!(offset, model.num_params());
}

#[test]
fn initialization_is_seeded() {
    let a = build_model(&config(2)).unwrap();
    let b = build_model(&config(2)).unwrap();
    let c = build_model(&ModelConfig {
        seed: 18,
        ..config(2)
    })
    .unwrap();

    assert_eq!(a.params(), b.params());
    assert_ne!(a.params(), c.params());
    assert_eq!(a.params().len(), a.num_params());
}

#[test]
fn load_params_checks_size() {
    let mut model = build_model(&config(1)).unwrap();
    let params = vec![0.; model.num_params() + 1];

    assert!(matches!(
        model.load_params(&params),
        Err(ModelError::Ml(_))
    ));

    model.load_params(&params[1..]).unwrap();
    let output = flat(model.forward(&batch(2), RunMode::Inference).unwrap());
    assert!(output.iter().all(|&v| v == 0.));
}

#[test]
fn invalid_configs_are_rejected_before_building() {
    let config = ModelConfig {
        dropout: 1.5,
        ..config(1)
    };

    assert!(matches!(
        build_model(&config),
        Err(ModelError::InvalidConfig(_))
    ));
}
