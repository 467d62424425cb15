use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("{0} contains no mortality rows")]
    Empty(String),
}

/// One row of the regional mortality table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MortalityRow {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Cause")]
    pub cause: String,
    #[serde(rename = "Rate")]
    pub rate: f64,
    #[serde(rename = "SE")]
    pub se: f64,
}

/// Load every row of the CSV; extra columns (row index etc.) are ignored
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<MortalityRow>, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let wrap = |source| LoadError::Csv {
        path: display.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(wrap)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: MortalityRow = result.map_err(wrap)?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(LoadError::Empty(display));
    }

    log::info!("📂 Loaded {} mortality rows from {}", rows.len(), display);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_rows_ignores_extra_columns() {
        let file = csv_file(
            ",Region,Status,Sex,Cause,Rate,SE\n\
             1,HHS Region 01,Rural,Female,Heart disease,183.7,2.3\n\
             2,HHS Region 02,Urban,Male,Cancer, 198.1 ,1.1\n",
        );

        let rows = load_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "HHS Region 01");
        assert_eq!(rows[0].rate, 183.7);
        assert_eq!(rows[1].cause, "Cancer");
        assert_eq!(rows[1].rate, 198.1);
    }

    #[test]
    fn test_header_only_is_empty() {
        let file = csv_file("Region,Status,Sex,Cause,Rate,SE\n");
        assert!(matches!(load_rows(file.path()), Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_rows(dir.path().join("nope.csv")),
            Err(LoadError::Csv { .. })
        ));
    }

    #[test]
    fn test_bad_rate_is_error() {
        let file = csv_file("Region,Status,Sex,Cause,Rate,SE\nR1,Urban,Male,Cancer,abc,1.0\n");
        assert!(matches!(load_rows(file.path()), Err(LoadError::Csv { .. })));
    }
}
