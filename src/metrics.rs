use crate::error::MetricsError;

fn check_lengths(predicted: usize, actual: usize) -> Result<(), MetricsError> {
    if predicted != actual {
        return Err(MetricsError::LengthMismatch { predicted, actual });
    }
    if actual == 0 {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

/// Fraction of positions where `predicted` equals `actual`.
pub fn accuracy<T: PartialEq>(predicted: &[T], actual: &[T]) -> Result<f64, MetricsError> {
    check_lengths(predicted.len(), actual.len())?;

    let matches = predicted
        .iter()
        .zip(actual)
        .filter(|(prediction, truth)| prediction == truth)
        .count();

    Ok(matches as f64 / actual.len() as f64)
}

/// Counts for a binary classifier where `1` is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(predicted: &[u8], actual: &[u8]) -> Result<Self, MetricsError> {
        check_lengths(predicted.len(), actual.len())?;

        let mut matrix = Self::default();
        for (&prediction, &truth) in predicted.iter().zip(actual) {
            match (prediction == 1, truth == 1) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_negative += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    /// `TP / (TP + FP)`, zero when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    /// `TP / (TP + FN)`, zero when there are no positives.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn f1(&self) -> f64 {
        let (precision, recall) = (self.precision(), self.recall());
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_matches_over_total() {
        let value = accuracy(&[1, 0, 1], &[1, 1, 1]).unwrap();

        assert!((value - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_bounds() {
        assert!((accuracy(&[0, 1], &[0, 1]).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(accuracy(&[1, 0], &[0, 1]).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn accuracy_rejects_mismatched_lengths() {
        assert!(matches!(
            accuracy(&[1, 0], &[1]),
            Err(MetricsError::LengthMismatch {
                predicted: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn accuracy_rejects_empty_input() {
        let empty: [u8; 0] = [];

        assert!(matches!(accuracy(&empty, &empty), Err(MetricsError::Empty)));
    }

    #[test]
    fn confusion_matrix_counts() {
        let matrix = ConfusionMatrix::from_labels(&[1, 1, 0, 0, 1], &[1, 0, 0, 1, 1]).unwrap();

        assert_eq!(
            matrix,
            ConfusionMatrix {
                true_positive: 2,
                false_positive: 1,
                true_negative: 1,
                false_negative: 1,
            }
        );
        assert_eq!(matrix.total(), 5);
        assert!((matrix.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((matrix.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((matrix.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_positive_predictions_gives_zero_precision() {
        let matrix = ConfusionMatrix::from_labels(&[0, 0], &[1, 0]).unwrap();

        assert!(matrix.precision().abs() < f64::EPSILON);
        assert!(matrix.f1().abs() < f64::EPSILON);
    }
}
