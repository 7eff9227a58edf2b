use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::DatasetError;

pub const DIMENSIONS: usize = 30;

/// Attribute names in column order: ten means, ten standard errors, ten worst values.
pub const FEATURE_NAMES: [&str; DIMENSIONS] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagnosis {
    Malignant,
    Benign,
}

impl Diagnosis {
    /// Binary class used by the model: malignant is the positive class.
    pub fn class(self) -> u8 {
        match self {
            Diagnosis::Malignant => 1,
            Diagnosis::Benign => 0,
        }
    }

    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            1 => Some(Diagnosis::Malignant),
            0 => Some(Diagnosis::Benign),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Diagnosis::Malignant => "malignant",
            Diagnosis::Benign => "benign",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column layout of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetLayout {
    /// Header row, then `id,diagnosis,<features>` with `M`/`B` diagnoses.
    #[default]
    Kaggle,
    /// The raw `wdbc.data` file: same columns as `Kaggle`, no header.
    Uci,
    /// Metadata row `n,d,name0,name1`, then `<features>,target` with `0` malignant.
    Sklearn,
}

impl DatasetLayout {
    fn has_header_row(self) -> bool {
        !matches!(self, DatasetLayout::Uci)
    }

    fn field_count(self) -> usize {
        match self {
            DatasetLayout::Kaggle | DatasetLayout::Uci => DIMENSIONS + 2,
            DatasetLayout::Sklearn => DIMENSIONS + 1,
        }
    }

    fn first_feature_column(self) -> usize {
        match self {
            DatasetLayout::Kaggle | DatasetLayout::Uci => 2,
            DatasetLayout::Sklearn => 0,
        }
    }
}

#[derive(Debug)]
pub struct CsvEntry {
    pub diagnosis: Diagnosis,
    pub values: [f64; DIMENSIONS],
}

pub fn to_diagnosis(diagnosis: &str) -> Option<Diagnosis> {
    match diagnosis.trim() {
        "M" => Some(Diagnosis::Malignant),
        "B" => Some(Diagnosis::Benign),
        _ => None,
    }
}

fn sklearn_target_to_diagnosis(target: &str) -> Option<Diagnosis> {
    match target.trim() {
        "0" => Some(Diagnosis::Malignant),
        "1" => Some(Diagnosis::Benign),
        _ => None,
    }
}

pub fn parse(file_path: &Path, layout: DatasetLayout) -> Result<Dataset, DatasetError> {
    let file = File::open(file_path).map_err(|source| DatasetError::Unavailable {
        path: file_path.to_path_buf(),
        source,
    })?;

    let dataset = parse_reader(BufReader::new(file), layout)?;
    tracing::info!(
        "loaded {} samples from {}",
        dataset.n_samples(),
        file_path.display()
    );

    Ok(dataset)
}

pub fn parse_reader<R: Read>(reader: R, layout: DatasetLayout) -> Result<Dataset, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(layout.has_header_row())
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        entries.push(to_entry(&record, layout)?);
    }

    if entries.is_empty() {
        return Err(DatasetError::Empty);
    }

    let labels = entries.iter().map(|entry| entry.diagnosis.class()).collect();
    let rows = entries.into_iter().map(|entry| entry.values).collect();

    Dataset::from_rows(rows, labels)
}

fn to_entry(record: &StringRecord, layout: DatasetLayout) -> Result<CsvEntry, DatasetError> {
    let line = record.position().map_or(0, csv::Position::line);

    // Kaggle exports end every row with a trailing comma.
    let fields: Vec<&str> = {
        let mut fields: Vec<&str> = record.iter().collect();
        while fields.last().is_some_and(|field| field.trim().is_empty()) {
            fields.pop();
        }
        fields
    };

    if fields.len() != layout.field_count() {
        return Err(DatasetError::FieldCount {
            line,
            expected: layout.field_count(),
            found: fields.len(),
        });
    }

    let diagnosis_str = match layout {
        DatasetLayout::Kaggle | DatasetLayout::Uci => fields[1],
        DatasetLayout::Sklearn => fields[DIMENSIONS],
    };
    let diagnosis = match layout {
        DatasetLayout::Kaggle | DatasetLayout::Uci => to_diagnosis(diagnosis_str),
        DatasetLayout::Sklearn => sklearn_target_to_diagnosis(diagnosis_str),
    }
    .ok_or_else(|| DatasetError::UnknownDiagnosis {
        line,
        value: diagnosis_str.to_string(),
    })?;

    let offset = layout.first_feature_column();
    let mut values = [0.0; DIMENSIONS];
    for (index, value) in values.iter_mut().enumerate() {
        let column = offset + index;
        let raw = fields[column].trim();
        *value = raw
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .ok_or_else(|| DatasetError::InvalidValue {
                line,
                column: column + 1,
                value: raw.to_string(),
            })?;
    }

    Ok(CsvEntry { diagnosis, values })
}
