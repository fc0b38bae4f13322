use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use crate::{
    artifacts::DataIngestionArtifact,
    config::{Config, IngestionConfig, Layout},
    error::Error,
    utils::files::{copy_file, sorted_subdirs},
};

/// Extracts the dataset archive and copies out the two source tables
pub struct DataIngestion<'a> {
    config: &'a IngestionConfig,
    layout: &'a Layout,
}

impl<'a> DataIngestion<'a> {
    /// Create the stage for one run
    pub fn new(config: &'a Config, layout: &'a Layout) -> Self {
        Self {
            config: &config.ingestion,
            layout,
        }
    }

    /// Extract the archive and copy the raw and imbalanced tables into the run directory
    pub fn initiate(&self) -> Result<DataIngestionArtifact, Error> {
        log::info!("Starting data ingestion");

        let archive = Path::new(&self.config.archive_path);

        if !archive.is_file() {
            return Err(Error::MissingInput(archive.to_path_buf()));
        }

        let extract_dir = self.layout.extract_dir();
        extract_zip(archive, &extract_dir)?;

        let raw_data_path = self.layout.raw_data_path();
        let imbalanced_data_path = self.layout.imbalanced_data_path();

        for (name, target) in [
            (&self.config.raw_file_name, &raw_data_path),
            (&self.config.imbalanced_file_name, &imbalanced_data_path),
        ] {
            let source = find_file(&extract_dir, name)?
                .ok_or_else(|| Error::MissingInput(extract_dir.join(name)))?;

            log::debug!("Copying {} to {}", source.display(), target.display());

            copy_file(&source, target)?;
        }

        log::info!("Data ingestion finished");

        Ok(DataIngestionArtifact::new(raw_data_path, imbalanced_data_path))
    }
}

/// Extract every entry of a zip archive below `output_dir`
pub fn extract_zip(archive_path: &Path, output_dir: &Path) -> Result<(), Error> {
    log::debug!(
        "Extracting {} into {}",
        archive_path.display(),
        output_dir.display()
    );

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let outpath = output_dir.join(entry.mangled_name());

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }
    }

    Ok(())
}

/// Find a file by name, preferring the top level and then searching subdirectories in name order
fn find_file(dir: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    let candidate = dir.join(name);

    if candidate.is_file() {
        return Ok(Some(candidate));
    }

    for subdir in sorted_subdirs(dir)? {
        if let Some(found) = find_file(&subdir, name)? {
            return Ok(Some(found));
        }
    }

    Ok(None)
}
