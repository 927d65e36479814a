use machine_learning::arch::{activations::ActFn, stages::StageSpec};

/// The shape of a feed-forward head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadShape {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
    pub depth: usize,
    pub dropout: f32,
    pub act_fn: ActFn,
}

/// The stage descriptors of a head, plus how many of them a featurizer keeps.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadLayout {
    pub specs: Vec<StageSpec>,
    pub feature_stages: usize,
}

/// Lays out a head.
///
/// * depth 1: `dropout, linear(input -> output)`.
/// * depth n > 1: `dropout, linear(input -> hidden)`, `n - 2` times
///   `act, dropout, linear(hidden -> hidden)` and, unless `featurizer`,
///   `act, dropout, linear(hidden -> output)`.
///
/// `feature_stages` counts the stages before that final triple, so running only them gives what a
/// featurizer head would output. A depth 1 head has no such triple and is kept whole.
pub fn layout(shape: HeadShape, featurizer: bool) -> HeadLayout {
    let HeadShape {
        input,
        hidden,
        output,
        depth,
        dropout,
        act_fn,
    } = shape;
    let dropout = StageSpec::Dropout { rate: dropout };

    if depth <= 1 {
        let specs = vec![dropout, StageSpec::Linear { input, output }];
        return HeadLayout {
            feature_stages: specs.len(),
            specs,
        };
    }

    let mut specs = vec![dropout, StageSpec::Linear { input, output: hidden }];
    for _ in 0..depth - 2 {
        specs.extend([
            StageSpec::Activation(act_fn),
            dropout,
            StageSpec::Linear {
                input: hidden,
                output: hidden,
            },
        ]);
    }

    let feature_stages = specs.len();
    if !featurizer {
        specs.extend([
            StageSpec::Activation(act_fn),
            dropout,
            StageSpec::Linear {
                input: hidden,
                output,
            },
        ]);
    }

    HeadLayout {
        specs,
        feature_stages,
    }
}
