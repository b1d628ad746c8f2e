pub mod about;
pub mod annotator;
pub mod correspondence;
pub mod error;
pub mod job;
pub mod ncbi_gi;
pub mod orthologs;
pub mod sbml_document;
pub mod tables;

pub use annotator::{AnnotationSummary, GeneProductOutcome, SbmlAnnotator};
pub use correspondence::Correspondence;
pub use error::{AnnotateError, AnnotateResult};
pub use orthologs::OrthologTable;
pub use sbml_document::SbmlDocument;
