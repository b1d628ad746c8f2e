//! Orthology annotation of SBML gene products.
//!
//! Each `fbc:geneProduct` is resolved GI → primary id → ortholog pair and its
//! `fbc:name` is rewritten as follows:
//!
//! * orthologs: `ortho:<reference id>/<query id>`
//! * other resolved products: `<genome>:<primary id>`, where `<genome>` is
//!   the output label up to its first `_`
//!
//! Products whose GI cannot be extracted or resolved keep their name.

use crate::correspondence::Correspondence;
use crate::error::AnnotateResult;
use crate::ncbi_gi::extract_ncbi_gi;
use crate::orthologs::OrthologTable;
use crate::sbml_document::SbmlDocument;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmatchedReason {
    NoSecondaryId,
    NoCorrespondence { secondary: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GeneProductOutcome {
    Ortholog { reference: String, query: String },
    Other { primary: String },
    Unmatched(UnmatchedReason),
}

impl GeneProductOutcome {
    pub fn is_ortholog(&self) -> bool {
        matches!(self, Self::Ortholog { .. })
    }

    /// Name to store on the gene product, if the outcome assigns one.
    pub fn display_name(&self, genome_prefix: &str) -> Option<String> {
        match self {
            Self::Ortholog { reference, query } => Some(format!("ortho:{reference}/{query}")),
            Self::Other { primary } => Some(format!("{genome_prefix}:{primary}")),
            Self::Unmatched(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneProductReport {
    pub gene_product: String,
    #[serde(flatten)]
    pub outcome: GeneProductOutcome,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationSummary {
    pub orthologs: usize,
    pub others: usize,
    pub gene_products: Vec<GeneProductReport>,
}

impl AnnotationSummary {
    pub fn total(&self) -> usize {
        self.orthologs + self.others
    }

    fn record(&mut self, report: GeneProductReport) {
        if report.outcome.is_ortholog() {
            self.orthologs += 1;
        } else {
            self.others += 1;
        }
        self.gene_products.push(report);
    }
}

impl fmt::Display for AnnotationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nombre d'enzymes orthologues : {}\nReste : {}",
            self.orthologs, self.others
        )
    }
}

/// Genome prefix for non-ortholog names: the label up to its first `_`.
pub fn genome_prefix(output_label: &str) -> &str {
    output_label
        .split_once('_')
        .map(|(prefix, _)| prefix)
        .unwrap_or(output_label)
}

pub fn classify(
    annotation: Option<&str>,
    correspondence: &Correspondence,
    orthologs: &OrthologTable,
) -> GeneProductOutcome {
    let Some(secondary) = annotation.and_then(extract_ncbi_gi) else {
        return GeneProductOutcome::Unmatched(UnmatchedReason::NoSecondaryId);
    };
    let Some(primary) = correspondence.primary_id(secondary) else {
        return GeneProductOutcome::Unmatched(UnmatchedReason::NoCorrespondence {
            secondary: secondary.to_string(),
        });
    };
    match orthologs.lookup(primary) {
        Some(pair) => GeneProductOutcome::Ortholog {
            reference: pair.reference.to_string(),
            query: pair.query.to_string(),
        },
        None => GeneProductOutcome::Other {
            primary: primary.to_string(),
        },
    }
}

#[derive(Clone, Debug)]
pub struct SbmlAnnotator {
    sbml_file: PathBuf,
    orthologs: OrthologTable,
    correspondence: Correspondence,
}

impl SbmlAnnotator {
    pub fn new<P: Into<PathBuf>>(
        sbml_file: P,
        orthologs: OrthologTable,
        correspondence: Correspondence,
    ) -> Self {
        Self {
            sbml_file: sbml_file.into(),
            orthologs,
            correspondence,
        }
    }

    pub fn sbml_file(&self) -> &Path {
        &self.sbml_file
    }

    /// Names every gene product of `doc`. The model name is left untouched.
    pub fn annotate_document(
        &self,
        doc: &mut SbmlDocument,
        output_label: &str,
    ) -> AnnotateResult<AnnotationSummary> {
        let prefix = genome_prefix(output_label);
        let outcomes: Vec<(String, GeneProductOutcome)> = doc
            .gene_products()
            .iter()
            .map(|gp| {
                let outcome = classify(
                    gp.annotation.as_deref(),
                    &self.correspondence,
                    &self.orthologs,
                );
                (gp.display_id().to_string(), outcome)
            })
            .collect();

        let mut summary = AnnotationSummary::default();
        for (idx, (gene_product, outcome)) in outcomes.into_iter().enumerate() {
            let name = outcome.display_name(prefix);
            match (&outcome, &name) {
                (GeneProductOutcome::Unmatched(reason), _) => {
                    warn!(
                        gene_product = gene_product.as_str(),
                        ?reason,
                        "gene product left unannotated"
                    )
                }
                (_, Some(name)) => {
                    doc.set_gene_product_name(idx, name)?;
                    debug!(
                        gene_product = gene_product.as_str(),
                        name = name.as_str(),
                        "annotated gene product"
                    );
                }
                (_, None) => {}
            }
            summary.record(GeneProductReport {
                gene_product,
                outcome,
                name,
            });
        }
        Ok(summary)
    }

    /// Annotates the model and saves it to `output_label`, which also becomes
    /// the model name.
    pub fn annotate(&self, output_label: &str) -> AnnotateResult<AnnotationSummary> {
        self.annotate_to(output_label, output_label)
    }

    /// Same as [`annotate`](Self::annotate) but writes to `output_path`.
    pub fn annotate_to<P: AsRef<Path>>(
        &self,
        output_label: &str,
        output_path: P,
    ) -> AnnotateResult<AnnotationSummary> {
        let mut doc = SbmlDocument::from_file(&self.sbml_file)?;
        let summary = self.annotate_document(&mut doc, output_label)?;
        doc.set_model_name(output_label)?;
        println!("{summary}");
        doc.save(output_path)?;
        Ok(summary)
    }
}
