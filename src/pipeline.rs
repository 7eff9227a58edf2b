use std::fmt;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::dataset::{train_test_split, Dataset, SplitIndices};
use crate::error::Error;
use crate::logistic_regression::FitReport;
use crate::metrics::{accuracy, ConfusionMatrix};
use crate::parse;
use crate::plot;
use crate::prediction::{assess, Assessment};

#[derive(Debug, Clone)]
pub struct Report {
    pub split: SplitIndices,
    pub fit: FitReport,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
    pub test_confusion: ConfusionMatrix,
    pub assessment: Assessment,
}

/// Loads the configured dataset and runs [`run_on`].
pub fn run(config: &Config) -> Result<(Report, Classifier), Error> {
    let dataset = parse::parse(&config.data.path, config.data.layout)?;
    run_on(&dataset, config)
}

pub fn run_on(dataset: &Dataset, config: &Config) -> Result<(Report, Classifier), Error> {
    let [benign, malignant] = dataset.class_counts();
    tracing::info!("dataset has {malignant} malignant and {benign} benign samples");

    let split = train_test_split(dataset, config.split.test_fraction, config.split.seed)?;

    let (classifier, fit) = Classifier::fit(
        &split.train,
        config.model.train_options(),
        config.model.standardize,
    )?;

    let train_predictions = classifier.predict_dataset(&split.train)?.to_vec();
    let train_accuracy = accuracy(&train_predictions, &split.train.labels().to_vec())?;

    let test_predictions = classifier.predict_dataset(&split.test)?.to_vec();
    let test_truth = split.test.labels().to_vec();
    let test_accuracy = accuracy(&test_predictions, &test_truth)?;
    let test_confusion = ConfusionMatrix::from_labels(&test_predictions, &test_truth)?;

    tracing::info!("train accuracy {train_accuracy:.4}, test accuracy {test_accuracy:.4}");

    if let Some(path) = &config.report.loss_plot {
        plot::plot_losses(&fit.losses, path)?;
    }

    let assessment = assess(&classifier, &config.report.query, config.report.top_features)?;

    let report = Report {
        split: split.indices,
        fit,
        train_accuracy,
        test_accuracy,
        test_confusion,
        assessment,
    };
    Ok((report, classifier))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let assessment = &self.assessment;
        let label = match assessment.diagnosis {
            parse::Diagnosis::Malignant => "Malignant",
            parse::Diagnosis::Benign => "Benign",
        };

        writeln!(f, "The Accuracy predicted by the training is =  {}", self.train_accuracy)?;
        writeln!(f, "The Accuracy predicted by the test data is =  {}", self.test_accuracy)?;
        writeln!(
            f,
            "Test precision = {:.4}, recall = {:.4}, f1 = {:.4}",
            self.test_confusion.precision(),
            self.test_confusion.recall(),
            self.test_confusion.f1()
        )?;
        writeln!(f, "The breast cancer is {label} -  [{}]", assessment.class)?;
        writeln!(
            f,
            "Malignant probability = {:.4}, benign probability = {:.4}, confidence = {:.4}, risk score = {}/10",
            assessment.malignant_probability,
            assessment.benign_probability,
            assessment.confidence,
            assessment.risk_score
        )?;

        if !assessment.top_features.is_empty() {
            writeln!(f, "Top contributing features:")?;
            for feature in &assessment.top_features {
                writeln!(f, "  {:<26} {:+.4}", feature.name, feature.contribution)?;
            }
        }
        for warning in &assessment.warnings {
            writeln!(
                f,
                "Warning: {} value {} seems out of typical range [{}-{}]",
                warning.name, warning.value, warning.min, warning.max
            )?;
        }

        Ok(())
    }
}
