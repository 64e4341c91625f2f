//! CSV loading for the reference dataset.

use std::path::Path;

use thiserror::Error;

use super::record::Record;

/// Failure to load the reference dataset.
#[derive(Debug, Error)]
#[error("failed to load records from {path}")]
pub struct DataError {
    pub path: String,
    #[source]
    pub source: csv::Error,
}

/// Load diamond records from a headered CSV file.
///
/// Columns are matched by header name, so column order does not matter and a
/// missing `price` column is fine (serving-side reference data may omit it).
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>, DataError> {
    let path = path.as_ref();
    let wrap = |source: csv::Error| DataError {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(wrap)?;

    reader
        .deserialize()
        .collect::<Result<Vec<Record>, csv::Error>>()
        .map_err(wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_records_parses_headered_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "carat,cut,color,clarity,depth,table,price,x,y,z").unwrap();
        writeln!(file, "0.23,Ideal,E,SI2,61.5,55,326,3.95,3.98,2.43").unwrap();
        writeln!(file, "0.21,Premium,E,SI1,59.8,61,326,3.89,3.84,2.31").unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cut, "Ideal");
        assert_eq!(records[0].price, Some(326.0));
        assert_eq!(records[1].x, 3.89);
    }

    #[test]
    fn load_records_missing_file_reports_path() {
        let err = load_records("/no/such/diamonds.csv").unwrap_err();
        assert!(err.to_string().contains("/no/such/diamonds.csv"));
    }

    #[test]
    fn load_records_malformed_row_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "carat,cut,color,clarity,depth,table,price,x,y,z").unwrap();
        writeln!(file, "not-a-number,Ideal,E,SI2,61.5,55,326,3.95,3.98,2.43").unwrap();

        assert!(load_records(file.path()).is_err());
    }
}
