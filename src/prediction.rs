use ndarray::ArrayView1;

use crate::classifier::Classifier;
use crate::error::ModelError;
use crate::parse::{Diagnosis, DIMENSIONS, FEATURE_NAMES};

/// The documented query sample.
pub const DEFAULT_QUERY: [f64; DIMENSIONS] = [
    13.54, 14.36, 87.46, 566.3, 0.09779, 0.08129, 0.06664, 0.04781, 0.1885, 0.05766, 0.2699,
    0.7886, 2.058, 23.56, 0.008462, 0.0146, 0.02387, 0.01315, 0.0198, 0.0023, 15.11, 19.26, 99.7,
    711.2, 0.144, 0.1773, 0.239, 0.1288, 0.2977, 0.07259,
];

/// Values further than this factor outside the training range are flagged.
const RANGE_SLACK: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContribution {
    pub index: usize,
    pub name: String,
    /// Signed term `w_j * x_j` of the decision function.
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeWarning {
    pub index: usize,
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub class: u8,
    pub diagnosis: Diagnosis,
    pub malignant_probability: f64,
    pub benign_probability: f64,
    pub confidence: f64,
    /// `round(10 * malignant_probability)`.
    pub risk_score: u8,
    pub top_features: Vec<FeatureContribution>,
    pub warnings: Vec<RangeWarning>,
}

pub fn feature_name(index: usize) -> String {
    FEATURE_NAMES
        .get(index)
        .map_or_else(|| format!("feature {index}"), |name| (*name).to_string())
}

/// Predicted diagnosis for one raw sample.
pub fn classify(classifier: &Classifier, sample: &[f64]) -> Result<Diagnosis, ModelError> {
    let class = classifier.predict(ArrayView1::from(sample))?;
    Diagnosis::from_class(class).ok_or(ModelError::InvalidLabel(class))
}

pub fn assess(
    classifier: &Classifier,
    sample: &[f64],
    top_n: usize,
) -> Result<Assessment, ModelError> {
    let row = ArrayView1::from(sample);

    let class = classifier.predict(row)?;
    let diagnosis = Diagnosis::from_class(class).ok_or(ModelError::InvalidLabel(class))?;
    let malignant_probability = classifier.predict_proba(row)?;
    let benign_probability = 1.0 - malignant_probability;

    let mut top_features: Vec<FeatureContribution> = classifier
        .contributions(row)?
        .iter()
        .enumerate()
        .map(|(index, &contribution)| FeatureContribution {
            index,
            name: feature_name(index),
            contribution,
        })
        .collect();
    top_features.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    top_features.truncate(top_n);

    let warnings = range_warnings(classifier.feature_ranges(), sample);
    for warning in &warnings {
        tracing::warn!(
            "{} value {} is far outside the training range [{}, {}]",
            warning.name,
            warning.value,
            warning.min,
            warning.max
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let risk_score = (malignant_probability * 10.0).round() as u8;

    Ok(Assessment {
        class,
        diagnosis,
        malignant_probability,
        benign_probability,
        confidence: malignant_probability.max(benign_probability),
        risk_score,
        top_features,
        warnings,
    })
}

fn range_warnings(ranges: &[(f64, f64)], sample: &[f64]) -> Vec<RangeWarning> {
    ranges
        .iter()
        .zip(sample)
        .enumerate()
        .filter(|(_, (&(min, max), &value))| value < min / RANGE_SLACK || value > max * RANGE_SLACK)
        .map(|(index, (&(min, max), &value))| RangeWarning {
            index,
            name: feature_name(index),
            value,
            min,
            max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::logistic_regression::TrainOptions;

    fn classifier() -> Classifier {
        let rows: Vec<[f64; 3]> = (0..30)
            .map(|i| {
                let class = f64::from(i % 2);
                [1.0 + 2.0 * class + 0.05 * f64::from(i), 5.0, 0.5 - 0.2 * class]
            })
            .collect();
        let labels = (0..30).map(|i| u8::from(i % 2 == 1)).collect();
        let dataset = Dataset::from_rows(rows, labels).unwrap();
        Classifier::fit(&dataset, TrainOptions::default(), false).unwrap().0
    }

    #[test]
    fn assessment_is_consistent_with_the_label() {
        let classifier = classifier();

        for sample in [[1.0, 5.0, 0.5], [3.5, 5.0, 0.3]] {
            let assessment = assess(&classifier, &sample, 2).unwrap();

            assert_eq!(assessment.class, classifier.predict(ArrayView1::from(&sample)).unwrap());
            assert_eq!(assessment.diagnosis, classify(&classifier, &sample).unwrap());
            assert!((assessment.malignant_probability + assessment.benign_probability - 1.0).abs() < 1e-12);
            assert!(assessment.confidence >= 0.5);
            assert!(assessment.risk_score <= 10);
            assert_eq!(assessment.diagnosis == Diagnosis::Malignant, assessment.malignant_probability > 0.5);
        }
    }

    #[test]
    fn top_features_are_ordered_by_magnitude() {
        let assessment = assess(&classifier(), &[3.5, 5.0, 0.3], 3).unwrap();

        assert_eq!(assessment.top_features.len(), 3);
        for pair in assessment.top_features.windows(2) {
            assert!(pair[0].contribution.abs() >= pair[1].contribution.abs());
        }
        assert_eq!(assessment.top_features[0].name, feature_name(assessment.top_features[0].index));
    }

    #[test]
    fn flags_values_far_outside_training_range() {
        let assessment = assess(&classifier(), &[1000.0, 5.0, 0.3], 1).unwrap();

        assert_eq!(assessment.warnings.len(), 1);
        assert_eq!(assessment.warnings[0].index, 0);
        assert_eq!(assessment.warnings[0].name, "mean radius");
    }

    #[test]
    fn wrong_length_sample_fails() {
        let classifier = classifier();

        assert!(matches!(
            assess(&classifier, &[1.0, 2.0], 5),
            Err(ModelError::FeatureCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(classify(&classifier, &[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn names_fall_back_past_known_attributes() {
        assert_eq!(feature_name(0), "mean radius");
        assert_eq!(feature_name(DIMENSIONS), "feature 30");
    }
}
