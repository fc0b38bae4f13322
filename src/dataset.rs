use std::path::Path;

use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{error::Error, utils::files::ensure_parent};

/// One normalized tweet with its binary label (1 = hate or abusive)
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, new)]
pub struct Item {
    /// The normalized text
    pub tweet: String,

    /// The binary label
    pub label: u8,
}

/// The combined `{tweet, label}` dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

impl dataset::Dataset<Item> for Dataset {
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Dataset {
    /// Wrap already loaded items
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Load a transformed dataset. Empty text cells become empty strings; labels must be 0 or 1.
    pub fn load(path: &Path, text_column: &str, label_column: &str) -> Result<Self, Error> {
        let mut reader = open_csv(path)?;
        let headers = reader
            .headers()
            .map_err(|e| Error::parsing(path, e))?
            .clone();

        let text_index = column_index(&headers, text_column, path)?;
        let label_index = column_index(&headers, label_column, path)?;

        let mut items = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::parsing(path, e))?;

            let tweet = record.get(text_index).unwrap_or_default().to_string();
            let label = record.get(label_index).unwrap_or_default();
            let label = parse_label(label).ok_or_else(|| {
                Error::parsing(path, format!("row {}: invalid label {:?}", row + 1, label))
            })?;

            items.push(Item { tweet, label });
        }

        Ok(Self::from_items(items))
    }

    /// Every item, in order
    pub fn items(&self) -> Vec<Item> {
        self.iter().collect()
    }
}

/// Write items as a `{text, label}` CSV
pub fn write_items(
    path: &Path,
    items: &[Item],
    text_column: &str,
    label_column: &str,
) -> Result<(), Error> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::parsing(path, e))?;
    writer
        .write_record([text_column, label_column])
        .map_err(|e| Error::parsing(path, e))?;

    for item in items {
        writer
            .write_record([item.tweet.as_str(), &item.label.to_string()])
            .map_err(|e| Error::parsing(path, e))?;
    }

    writer.flush()?;

    Ok(())
}

/// Write a single-column CSV
pub fn write_column<T: ToString>(path: &Path, header: &str, values: &[T]) -> Result<(), Error> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::parsing(path, e))?;
    writer
        .write_record([header])
        .map_err(|e| Error::parsing(path, e))?;

    for value in values {
        writer
            .write_record([value.to_string()])
            .map_err(|e| Error::parsing(path, e))?;
    }

    writer.flush()?;

    Ok(())
}

/// Read the first column of a table as text. Missing cells become empty strings.
pub fn read_text_column(path: &Path) -> Result<Vec<String>, Error> {
    read_first_column(path)
}

/// Read the first column of a table as binary labels
pub fn read_label_column(path: &Path) -> Result<Vec<u8>, Error> {
    read_first_column(path)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            parse_label(&value).ok_or_else(|| {
                Error::parsing(path, format!("row {}: invalid label {:?}", row + 1, value))
            })
        })
        .collect()
}

fn read_first_column(path: &Path) -> Result<Vec<String>, Error> {
    let mut reader = open_csv(path)?;
    let headers = reader.headers().map_err(|e| Error::parsing(path, e))?;

    if headers.is_empty() {
        return Err(Error::parsing(path, "table has no columns"));
    }

    let mut values = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| Error::parsing(path, e))?;
        values.push(record.get(0).unwrap_or_default().to_string());
    }

    Ok(values)
}

/// Open a CSV file with headers, failing with [`Error::MissingInput`] if it does not exist
pub fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>, Error> {
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }

    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::parsing(path, e))
}

/// Locate a named column in a header row
pub fn column_index(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize, Error> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| Error::parsing(path, format!("missing column {:?}", name)))
}

/// Parse a binary label, accepting integral floats such as `1.0`
pub fn parse_label(value: &str) -> Option<u8> {
    let value = value.trim();

    let parsed = value
        .parse::<i64>()
        .ok()
        .or_else(|| match value.parse::<f64>() {
            Ok(float) if float.fract() == 0.0 => Some(float as i64),
            _ => None,
        })?;

    match parsed {
        0 | 1 => Some(parsed as u8),
        _ => None,
    }
}

/// Shuffle with a fixed seed and split off `ceil(test_fraction * n)` rows for testing.
///
/// Returns `(train, test)`, each in shuffled order. The same input and seed always yield the
/// same partition.
pub fn train_test_split<T>(items: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let total = items.len();
    let n_test = ((test_fraction * total as f64).ceil() as usize).min(total);

    let mut indices: Vec<usize> = (0..total).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();

    let test = indices[..n_test]
        .iter()
        .filter_map(|index| slots[*index].take())
        .collect();
    let train = indices[n_test..]
        .iter()
        .filter_map(|index| slots[*index].take())
        .collect();

    (train, test)
}
