use std::path::Path;

use crate::{
    artifacts::{DataIngestionArtifact, DataTransformationArtifact},
    config::{Config, Layout, TransformationConfig},
    dataset::{column_index, open_csv, parse_label, write_items, Item},
    error::Error,
    text::normalize,
};

/// Merges the two source tables into one normalized `{tweet, label}` dataset
pub struct DataTransformation<'a> {
    config: &'a TransformationConfig,
    layout: &'a Layout,
}

impl<'a> DataTransformation<'a> {
    /// Create the stage for one run
    pub fn new(config: &'a Config, layout: &'a Layout) -> Self {
        Self {
            config: &config.transformation,
            layout,
        }
    }

    /// Combine, relabel and normalize the ingested tables
    pub fn initiate(
        &self,
        ingestion: &DataIngestionArtifact,
    ) -> Result<DataTransformationArtifact, Error> {
        log::info!("Starting data transformation");

        let mut items = self.read_raw(&ingestion.raw_data_path)?;
        let raw_rows = items.len();

        items.extend(self.read_imbalanced(&ingestion.imbalanced_data_path)?);

        log::debug!(
            "Combined {} raw rows and {} imbalanced rows",
            raw_rows,
            items.len() - raw_rows
        );

        for item in items.iter_mut() {
            item.tweet = normalize(&item.tweet);
        }

        let transformed_data_path = self.layout.transformed_data_path();

        write_items(
            &transformed_data_path,
            &items,
            &self.config.text_column,
            &self.config.label_column,
        )?;

        log::info!(
            "Data transformation finished, {} rows written to {}",
            items.len(),
            transformed_data_path.display()
        );

        Ok(DataTransformationArtifact::new(transformed_data_path))
    }

    /// Read the 3-class table, folding hate speech and offensive language into label 1
    fn read_raw(&self, path: &Path) -> Result<Vec<Item>, Error> {
        let mut reader = open_csv(path)?;
        let headers = reader
            .headers()
            .map_err(|e| Error::parsing(path, e))?
            .clone();

        for column in &self.config.raw_drop_columns {
            column_index(&headers, column, path)?;
        }

        let class_index = column_index(&headers, &self.config.class_column, path)?;
        let text_index = column_index(&headers, &self.config.text_column, path)?;

        let mut items = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::parsing(path, e))?;

            let class = record.get(class_index).unwrap_or_default();
            let label = remap_class(class).ok_or_else(|| {
                Error::parsing(path, format!("row {}: invalid class {:?}", row + 1, class))
            })?;

            let tweet = record.get(text_index).unwrap_or_default().to_string();

            items.push(Item::new(tweet, label));
        }

        Ok(items)
    }

    /// Read the binary table, discarding its identifier column
    fn read_imbalanced(&self, path: &Path) -> Result<Vec<Item>, Error> {
        let mut reader = open_csv(path)?;
        let headers = reader
            .headers()
            .map_err(|e| Error::parsing(path, e))?
            .clone();

        column_index(&headers, &self.config.id_column, path)?;

        let label_index = column_index(&headers, &self.config.label_column, path)?;
        let text_index = column_index(&headers, &self.config.text_column, path)?;

        let mut items = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::parsing(path, e))?;

            let label = record.get(label_index).unwrap_or_default();
            let label = parse_label(label).ok_or_else(|| {
                Error::parsing(path, format!("row {}: invalid label {:?}", row + 1, label))
            })?;

            let tweet = record.get(text_index).unwrap_or_default().to_string();

            items.push(Item::new(tweet, label));
        }

        Ok(items)
    }
}

/// Map the 3-valued class (0 hate, 1 offensive, 2 neither) onto a binary label
fn remap_class(value: &str) -> Option<u8> {
    let value = value.trim();

    let class = value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|float| float.fract() == 0.0)
            .map(|float| float as i64)
    })?;

    match class {
        0 | 1 => Some(1),
        2 => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dataset::Dataset;

    const RAW: &str = "Unnamed: 0,count,hate_speech,offensive_language,neither,class,tweet\n\
        0,3,0,0,3,2,!!! RT @mayasolovely: As a woman you shouldn't complain\n\
        1,3,0,3,0,1,you are a bad person\n\
        2,3,2,1,0,0,I hate 2 all of them http://t.co/x\n";

    const IMBALANCED: &str = "id,label,tweet\n\
        1,0,@user when a father is dysfunctional\n\
        2,1,Running dogs\n";

    fn ingested(dir: &Path, raw: &str, imbalanced: &str) -> DataIngestionArtifact {
        let raw_path = dir.join("raw_data.csv");
        let imbalanced_path = dir.join("imbalanced_data.csv");
        fs::write(&raw_path, raw).unwrap();
        fs::write(&imbalanced_path, imbalanced).unwrap();

        DataIngestionArtifact::new(raw_path, imbalanced_path)
    }

    #[test]
    fn remaps_classes() {
        assert_eq!(remap_class("0"), Some(1));
        assert_eq!(remap_class("1"), Some(1));
        assert_eq!(remap_class("2"), Some(0));
        assert_eq!(remap_class("2.0"), Some(0));
        assert_eq!(remap_class("3"), None);
        assert_eq!(remap_class(""), None);
    }

    #[test]
    fn combines_raw_rows_then_imbalanced_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new();
        let layout = Layout::new(dir.path(), "run");
        let ingestion = ingested(dir.path(), RAW, IMBALANCED);

        let artifact = DataTransformation::new(&config, &layout)
            .initiate(&ingestion)
            .unwrap();

        let header = fs::read_to_string(&artifact.transformed_data_path).unwrap();
        assert_eq!(header.lines().next(), Some("tweet,label"));

        let items = Dataset::load(&artifact.transformed_data_path, "tweet", "label")
            .unwrap()
            .items();
        let labels: Vec<u8> = items.iter().map(|item| item.label).collect();

        assert_eq!(labels, vec![0, 1, 1, 0, 1]);
        assert_eq!(items[2].tweet, "hate");
        assert_eq!(items[4].tweet, "run dog");
    }

    #[test]
    fn missing_drop_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new();
        let layout = Layout::new(dir.path(), "run");
        let ingestion = ingested(dir.path(), "class,tweet\n0,hello\n", IMBALANCED);

        assert!(matches!(
            DataTransformation::new(&config, &layout).initiate(&ingestion),
            Err(Error::Parsing { .. })
        ));
    }

    #[test]
    fn bad_class_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new();
        let layout = Layout::new(dir.path(), "run");
        let raw = "Unnamed: 0,count,hate_speech,offensive_language,neither,class,tweet\n\
            0,3,0,0,3,7,hello\n";
        let ingestion = ingested(dir.path(), raw, IMBALANCED);

        assert!(matches!(
            DataTransformation::new(&config, &layout).initiate(&ingestion),
            Err(Error::Parsing { .. })
        ));
    }
}
