//! Ortholog pairs between a reference and a query genome.
//!
//! The pairs are stored as two index-aligned id lists plus a position index
//! for each side, so lookups do not scan the lists.

use crate::error::{AnnotateError, AnnotateResult};
use crate::tables::read_rows;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Which list an identifier was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrthologSide {
    Reference,
    Query,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrthologPair<'a> {
    pub reference: &'a str,
    pub query: &'a str,
    pub index: usize,
    pub matched_on: OrthologSide,
}

#[derive(Clone, Debug, Default)]
pub struct OrthologTable {
    reference: Vec<String>,
    query: Vec<String>,
    reference_index: HashMap<String, usize>,
    query_index: HashMap<String, usize>,
}

impl OrthologTable {
    /// Builds the table from two lists where entry `i` of each forms a pair.
    pub fn from_lists(reference: Vec<String>, query: Vec<String>) -> AnnotateResult<Self> {
        if reference.len() != query.len() {
            return Err(AnnotateError::MisalignedOrthologs {
                reference: reference.len(),
                query: query.len(),
            });
        }
        let reference_index = first_positions(&reference);
        let query_index = first_positions(&query);
        Ok(Self {
            reference,
            query,
            reference_index,
            query_index,
        })
    }

    pub fn from_pairs<I, R, Q>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, Q)>,
        R: Into<String>,
        Q: Into<String>,
    {
        let (reference, query): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(r, q)| (r.into(), q.into()))
            .unzip();
        let reference_index = first_positions(&reference);
        let query_index = first_positions(&query);
        Self {
            reference,
            query,
            reference_index,
            query_index,
        }
    }

    /// Loads pairs from a delimited file: reference id in the first column,
    /// query id in the second. Extra columns (e.g. divergence and e-value
    /// from reciprocal smallest distance output) are ignored.
    pub fn from_delimited_file<P: AsRef<Path>>(path: P, delimiter: u8) -> AnnotateResult<Self> {
        let path = path.as_ref();
        let mut pairs = vec![];
        for row in read_rows(path, delimiter)? {
            match (row.field(0), row.field(1)) {
                (Some(reference), Some(query)) => {
                    pairs.push((reference.to_string(), query.to_string()))
                }
                _ => {
                    return Err(AnnotateError::Table {
                        path: path.display().to_string(),
                        line: row.line,
                        message: "expected reference and query ids".to_string(),
                    });
                }
            }
        }
        let table = Self::from_pairs(pairs);
        info!(path = %path.display(), pairs = table.len(), "loaded ortholog pairs");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    pub fn reference_ids(&self) -> &[String] {
        &self.reference
    }

    pub fn query_ids(&self) -> &[String] {
        &self.query
    }

    /// Finds the pair containing `id`. The reference list is searched first,
    /// so an id present on both sides resolves to its reference pair.
    pub fn lookup(&self, id: &str) -> Option<OrthologPair<'_>> {
        let (index, matched_on) = match self.reference_index.get(id) {
            Some(&index) => (index, OrthologSide::Reference),
            None => (*self.query_index.get(id)?, OrthologSide::Query),
        };
        Some(OrthologPair {
            reference: &self.reference[index],
            query: &self.query[index],
            index,
            matched_on,
        })
    }
}

fn first_positions(ids: &[String]) -> HashMap<String, usize> {
    let mut positions = HashMap::with_capacity(ids.len());
    for (idx, id) in ids.iter().enumerate() {
        positions.entry(id.clone()).or_insert(idx);
    }
    positions
}
