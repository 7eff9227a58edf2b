//! Synthetic WDBC-shaped fixtures.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use logistic::config::Config;
use logistic::parse::{DIMENSIONS, FEATURE_NAMES};
use logistic::prediction::DEFAULT_QUERY;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Malignant rows are scaled up from the benign centre by this factor.
const MALIGNANT_SCALE: f64 = 1.5;

/// `(label, features)` rows; every third row is malignant.
pub fn synthetic_rows(count: usize, seed: u64) -> Vec<(u8, [f64; DIMENSIONS])> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let label = u8::from(i % 3 == 0);
            let scale = if label == 1 { MALIGNANT_SCALE } else { 1.0 };
            let mut features = [0.0; DIMENSIONS];
            for (feature, centre) in features.iter_mut().zip(DEFAULT_QUERY) {
                *feature = centre * scale * (1.0 + rng.gen_range(-0.1..0.1));
            }
            (label, features)
        })
        .collect()
}

pub fn kaggle_csv(rows: &[(u8, [f64; DIMENSIONS])]) -> String {
    let mut csv = format!("id,diagnosis,{},\n", FEATURE_NAMES.join(","));
    for (index, (label, features)) in rows.iter().enumerate() {
        let diagnosis = if *label == 1 { "M" } else { "B" };
        let values: Vec<String> = features.iter().map(f64::to_string).collect();
        writeln!(csv, "{},{diagnosis},{},", 900_000 + index, values.join(",")).unwrap();
    }
    csv
}

pub fn write_dataset(dir: &Path, rows: &[(u8, [f64; DIMENSIONS])]) -> PathBuf {
    let path = dir.join("breast-cancer.csv");
    std::fs::write(&path, kaggle_csv(rows)).unwrap();
    path
}

pub fn config_for(data_path: &Path) -> Config {
    let mut config = Config::default();
    config.data.path = data_path.to_path_buf();
    config
}
