use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed SBML: {0}")]
    Xml(String),
    #[error("SBML document has no <model> element")]
    MissingModel,
    #[error("SBML model has no fbc listOfGeneProducts")]
    MissingGeneProducts,
    #[error("Gene product index {index} out of range ({count} gene products)")]
    GeneProductIndex { index: usize, count: usize },
    #[error(
        "Ortholog lists are not aligned: {reference} reference ids vs {query} query ids"
    )]
    MisalignedOrthologs { reference: usize, query: usize },
    #[error("{path}:{line}: {message}")]
    Table {
        path: String,
        line: u64,
        message: String,
    },
    #[error("Could not read table '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("Could not serialize report '{path}': {source}")]
    Report {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid job config '{path}': {message}")]
    Config { path: String, message: String },
}

impl AnnotateError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::Error> for AnnotateError {
    fn from(err: quick_xml::Error) -> Self {
        AnnotateError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for AnnotateError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        AnnotateError::Xml(err.to_string())
    }
}

pub type AnnotateResult<T> = Result<T, AnnotateError>;
