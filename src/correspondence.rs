use crate::error::{AnnotateError, AnnotateResult};
use crate::tables::read_rows;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Maps secondary identifiers (NCBI GI) to the primary ids used in the
/// ortholog table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Correspondence {
    primary_by_secondary: HashMap<String, String>,
}

impl Correspondence {
    pub fn new(primary_by_secondary: HashMap<String, String>) -> Self {
        Self {
            primary_by_secondary,
        }
    }

    /// Loads `secondary<delim>primary` rows. A repeated secondary id keeps
    /// its first primary id.
    pub fn from_delimited_file<P: AsRef<Path>>(path: P, delimiter: u8) -> AnnotateResult<Self> {
        let path = path.as_ref();
        let mut map: HashMap<String, String> = HashMap::new();
        for row in read_rows(path, delimiter)? {
            let (Some(secondary), Some(primary)) = (row.field(0), row.field(1)) else {
                return Err(AnnotateError::Table {
                    path: path.display().to_string(),
                    line: row.line,
                    message: "expected secondary and primary ids".to_string(),
                });
            };
            if let Some(existing) = map.get(secondary) {
                if existing != primary {
                    warn!(
                        secondary,
                        kept = existing.as_str(),
                        ignored = primary,
                        line = row.line,
                        "duplicate correspondence entry"
                    );
                }
                continue;
            }
            map.insert(secondary.to_string(), primary.to_string());
        }
        info!(path = %path.display(), entries = map.len(), "loaded id correspondence");
        Ok(Self::new(map))
    }

    pub fn primary_id(&self, secondary: &str) -> Option<&str> {
        self.primary_by_secondary.get(secondary).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.primary_by_secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_by_secondary.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Correspondence {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_id_lookup() {
        let corresp: Correspondence = [("GI1", "101"), ("GI2", "999")].into_iter().collect();
        assert_eq!(corresp.primary_id("GI1"), Some("101"));
        assert_eq!(corresp.primary_id("GI3"), None);
        assert_eq!(corresp.len(), 2);
    }

    #[test]
    fn test_from_delimited_file_keeps_first_duplicate() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("gi2ncbi.csv");
        std::fs::write(&path, "16127995,NP_414542.1\n16127995,NP_999999.1\n16127996,NP_414543.1\n")
            .unwrap();
        let corresp = Correspondence::from_delimited_file(&path, b',').unwrap();
        assert_eq!(corresp.len(), 2);
        assert_eq!(corresp.primary_id("16127995"), Some("NP_414542.1"));
    }

    #[test]
    fn test_from_delimited_file_rejects_missing_primary() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("gi2ncbi.tsv");
        std::fs::write(&path, "16127995\n").unwrap();
        let err = Correspondence::from_delimited_file(&path, b'\t').unwrap_err();
        assert!(matches!(err, AnnotateError::Table { .. }));
    }
}
