use crate::error::{AnnotateError, AnnotateResult};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

pub const DEFAULT_DELIMITER: u8 = b'\t';

/// One non-comment row of a delimited table, with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub line: u64,
    pub fields: Vec<String>,
}

impl TableRow {
    /// Returns the trimmed field at `idx` when it is present and non-empty.
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields
            .get(idx)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Reads a header-less delimited file. Lines starting with `#` are skipped
/// and rows may have any number of columns.
pub fn read_rows<P: AsRef<Path>>(path: P, delimiter: u8) -> AnnotateResult<Vec<TableRow>> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| table_error(&label, e))?;
    let mut rows = vec![];
    for result in rdr.records() {
        let record = result.map_err(|e| table_error(&label, e))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(TableRow {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            fields: record.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(rows)
}

/// Parses a delimiter given on the command line or in a job file. `\t` and
/// `tab` are accepted for tab.
pub fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "\t" | "\\t" | "tab" => Ok(b'\t'),
        _ if raw.len() == 1 && raw.is_ascii() => Ok(raw.as_bytes()[0]),
        _ => Err(format!(
            "Invalid delimiter '{raw}': expected a single ASCII character"
        )),
    }
}

fn table_error(path: &str, source: csv::Error) -> AnnotateError {
    AnnotateError::Csv {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows_skips_comments_and_blank_rows() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("rows.tsv");
        std::fs::write(&path, "# header\n a \tb\tc\n\nd\n").unwrap();
        let rows = read_rows(&path, DEFAULT_DELIMITER).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["a", "b", "c"]);
        assert_eq!(rows[1].field(0), Some("d"));
        assert_eq!(rows[1].field(1), None);
    }

    #[test]
    fn test_read_rows_missing_file() {
        let td = tempfile::tempdir().unwrap();
        let err = read_rows(td.path().join("absent.tsv"), DEFAULT_DELIMITER).unwrap_err();
        let AnnotateError::Csv { path, source } = &err else {
            panic!("expected csv error, got {err:?}");
        };
        assert!(path.ends_with("absent.tsv"));
        assert!(matches!(
            source.kind(),
            csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert!(parse_delimiter(",,").is_err());
    }
}
