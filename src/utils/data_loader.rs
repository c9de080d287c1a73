//! Data loading utilities

use crate::error::{CleanError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Table file formats understood by the loader and saver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
}

impl FileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "json" => Ok(FileFormat::Json),
            "parquet" | "pq" => Ok(FileFormat::Parquet),
            _ => Err(CleanError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Data loader for various file formats
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned to infer CSV column types
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set the number of rows used for CSV type inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Detect file format from extension and load
    pub fn load(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let df = match FileFormat::from_path(path)? {
            FileFormat::Csv => self.load_delimited(path, b',')?,
            FileFormat::Tsv => self.load_delimited(path, b'\t')?,
            FileFormat::Json => JsonReader::new(File::open(path)?)
                .with_json_format(JsonFormat::Json)
                .finish()?,
            FileFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        };

        debug!(path = %path.display(), rows = df.height(), columns = df.width(), "Loaded table");
        Ok(df)
    }

    fn load_delimited(&self, path: &Path, delimiter: u8) -> Result<DataFrame> {
        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(File::open(path)?)
            .finish()?;
        Ok(df)
    }
}

/// Save DataFrame to various formats
pub struct DataSaver;

impl DataSaver {
    /// Detect file format from extension and save
    pub fn save(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let mut file = File::create(path)?;

        match format {
            FileFormat::Csv => CsvWriter::new(&mut file).finish(df)?,
            FileFormat::Tsv => CsvWriter::new(&mut file).with_separator(b'\t').finish(df)?,
            FileFormat::Json => JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?,
            FileFormat::Parquet => {
                ParquetWriter::new(file).finish(df)?;
            }
        }

        debug!(path = %path.display(), rows = df.height(), "Saved table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("a.csv")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a.PARQUET")).unwrap(), FileFormat::Parquet);
        assert!(matches!(
            FileFormat::from_path(Path::new("a.xlsx")),
            Err(CleanError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.csv");

        let mut df = df!(
            "ID" => &["A", "B"],
            "amount" => &[Some(1.5), None],
        )
        .unwrap();
        DataSaver::save(&mut df, &path).unwrap();

        let loaded = DataLoader::new().load(&path).unwrap();
        assert_eq!(loaded.height(), 2);
        assert_eq!(loaded.column("amount").unwrap().null_count(), 1);
        assert_eq!(loaded.column("ID").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, CleanError::IoError(_)));
    }
}
