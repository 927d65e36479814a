use std::{env, fs};

use anyhow::{Context, bail};
use log::info;
use molprop::{Batch, ModelConfig, Output, RunMode, build_model};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A batch as read from disk: one row of descriptors, and optionally of features, per molecule.
#[derive(Deserialize)]
struct BatchFile {
    descriptors: Vec<Vec<f32>>,
    #[serde(default)]
    features: Option<Vec<Vec<f32>>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Prediction {
    Flat(Vec<Vec<f32>>),
    PerClass(Vec<Vec<Vec<f32>>>),
}

fn to_array(rows: Vec<Vec<f32>>, what: &str) -> anyhow::Result<Array2<f32>> {
    let ncols = rows.first().map_or(0, Vec::len);
    let nrows = rows.len();

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        bail!("{what} row {i} has {} values, expected {ncols}", row.len());
    }

    let data: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), data).with_context(|| format!("building {what} matrix"))
}

fn to_prediction(output: Output) -> Prediction {
    match output {
        Output::Flat(x) => Prediction::Flat(x.rows().into_iter().map(|r| r.to_vec()).collect()),
        Output::PerClass(x) => Prediction::PerClass(
            x.outer_iter()
                .map(|tasks| tasks.rows().into_iter().map(|r| r.to_vec()).collect())
                .collect(),
        ),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let [_, config_path, batch_path] = args.as_slice() else {
        bail!("usage: molprop <config.json> <batch.json>");
    };

    let config = ModelConfig::from_path(config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    let model = build_model(&config)?;
    info!("model has {} parameters", model.num_params());

    let batch_file: BatchFile = serde_json::from_str(
        &fs::read_to_string(batch_path).with_context(|| format!("reading {batch_path}"))?,
    )?;

    let descriptors = to_array(batch_file.descriptors, "descriptor")?;
    let batch = match batch_file.features {
        Some(features) => Batch::with_features(descriptors, to_array(features, "feature")?),
        None => Batch::new(descriptors),
    };

    let output = model.forward(&batch, RunMode::Inference)?;
    info!("predicted output of shape {:?}", output.shape());

    println!("{}", serde_json::to_string_pretty(&to_prediction(output))?);
    Ok(())
}
