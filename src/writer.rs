use std::{
    fmt,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    compression::{compress_writer, Compression},
    histogram::Histogram1D,
    traits::WriteHistogram,
    yoda::write_histo1d,
};

/// Supported output formats
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    EnumString,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// The plain-text [YODA](https://yoda.hepforge.org/) format
    #[default]
    Yoda,
    /// The serde representation of the histogram in YAML
    Yaml,
}

/// Where and how to write the output histogram
#[derive(Debug, Clone, TypedBuilder)]
pub struct FileWriter {
    #[builder(setter(into))]
    filename: PathBuf,
    #[builder(default)]
    format: OutputFormat,
    #[builder(default)]
    compression: Option<Compression>,
}

impl FileWriter {
    /// Create the output file, including missing parent directories
    ///
    /// An existing file is truncated.
    pub fn open(self) -> Result<HistogramFile, WriteError> {
        use WriteError::*;

        if let Some(dir) = self.filename.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .map_err(|err| CreateDirErr(dir.to_owned(), err))?;
            }
        }
        debug!("Opening {:?}", self.filename);
        let file = std::fs::File::create(&self.filename)
            .map_err(|err| CreateErr(self.filename.clone(), err))?;
        let sink = compress_writer(BufWriter::new(file), self.compression)
            .map_err(|err| CreateErr(self.filename.clone(), err))?;
        Ok(HistogramFile {
            path: self.filename,
            format: self.format,
            sink,
        })
    }
}

/// An open histogram output file
pub struct HistogramFile {
    path: PathBuf,
    format: OutputFormat,
    sink: Box<dyn Write>,
}

impl fmt::Debug for HistogramFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistogramFile")
            .field("path", &self.path)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl HistogramFile {
    /// Location of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WriteHistogram for HistogramFile {
    type Error = WriteError;

    fn write(mut self, hist: &Histogram1D) -> Result<(), Self::Error> {
        info!("Writing histogram `{}` to {:?}", hist.name(), self.path);
        match self.format {
            OutputFormat::Yoda => write_histo1d(&mut self.sink, hist)?,
            OutputFormat::Yaml => serde_yaml::to_writer(&mut self.sink, hist)?,
        }
        self.sink.flush()?;
        Ok(())
    }
}

/// Keeps the histogram in memory
#[derive(Debug)]
pub struct InMemory<'a>(pub &'a mut Option<Histogram1D>);

impl<'a> WriteHistogram for InMemory<'a> {
    type Error = std::convert::Infallible;

    fn write(self, hist: &Histogram1D) -> Result<(), Self::Error> {
        *self.0 = Some(hist.clone());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory {0:?}: {1}")]
    CreateDirErr(PathBuf, std::io::Error),
    #[error("Failed to create output file {0:?}: {1}")]
    CreateErr(PathBuf, std::io::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialise histogram: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_parse_format() {
        assert_eq!("yoda".parse(), Ok(OutputFormat::Yoda));
        assert_eq!("YAML".parse(), Ok(OutputFormat::Yaml));
        assert!("root".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn tst_in_memory() {
        let mut hist = Histogram1D::new("h", "test", 2, 0., 1.);
        hist.fill(0.2, 1.);
        let mut out = None;
        InMemory(&mut out).write(&hist).unwrap();
        assert_eq!(out, Some(hist));
    }

    #[test]
    fn tst_file_writer_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let filename = dir.path().join("output").join("jets.yaml");
        let file = FileWriter::builder()
            .filename(filename.clone())
            .format(OutputFormat::Yaml)
            .build()
            .open()
            .unwrap();
        assert_eq!(file.path(), filename);
        assert!(filename.exists());

        let mut hist = Histogram1D::new("h", "test", 2, 0., 1.);
        hist.fill(0.7, 2.);
        file.write(&hist).unwrap();
        let written = std::fs::read_to_string(&filename).unwrap();
        let read: Histogram1D = serde_yaml::from_str(&written).unwrap();
        assert_eq!(read, hist);
    }
}
