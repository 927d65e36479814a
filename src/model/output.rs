use ndarray::{Array2, Array3};

/// The phase a forward call runs in.
///
/// Training passes apply dropout, with masks drawn from a generator seeded with `seed`, and skip
/// the probability transforms so losses can work on logits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Training { seed: u64 },
    Inference,
}

impl RunMode {
    pub fn is_training(&self) -> bool {
        matches!(self, RunMode::Training { .. })
    }
}

/// A batch of molecules and, optionally, their precomputed auxiliary features.
#[derive(Clone, Debug)]
pub struct Batch<I> {
    pub molecules: I,
    /// `[batch, features_size]`.
    pub features: Option<Array2<f32>>,
}

impl<I> Batch<I> {
    pub fn new(molecules: I) -> Self {
        Self {
            molecules,
            features: None,
        }
    }

    pub fn with_features(molecules: I, features: Array2<f32>) -> Self {
        Self {
            molecules,
            features: Some(features),
        }
    }
}

/// What a forward call produces.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// `[batch, width]`: one value per task, or feature vectors for featurizers.
    Flat(Array2<f32>),
    /// `[batch, tasks, classes]`.
    PerClass(Array3<f32>),
}

impl Output {
    pub fn shape(&self) -> &[usize] {
        match self {
            Output::Flat(x) => x.shape(),
            Output::PerClass(x) => x.shape(),
        }
    }

    pub fn as_flat(&self) -> Option<&Array2<f32>> {
        match self {
            Output::Flat(x) => Some(x),
            Output::PerClass(_) => None,
        }
    }

    pub fn as_per_class(&self) -> Option<&Array3<f32>> {
        match self {
            Output::PerClass(x) => Some(x),
            Output::Flat(_) => None,
        }
    }
}
