//! JSON description of one annotation run.
//!
//! ```json
//! {
//!   "input": "models/ref_model.xml",
//!   "orthologs": "rsd/ref_vs_query.tsv",
//!   "correspondence": "tables/gi2ncbi.tsv",
//!   "output_label": "ref_vs_query.xml"
//! }
//! ```
//!
//! Relative paths are resolved against the directory of the job file. The
//! annotated model is written to `<output_dir>/<output_label>`, with
//! `output_dir` defaulting to that same directory.

use crate::annotator::{AnnotationSummary, SbmlAnnotator};
use crate::correspondence::Correspondence;
use crate::error::{AnnotateError, AnnotateResult};
use crate::orthologs::OrthologTable;
use crate::tables::{DEFAULT_DELIMITER, parse_delimiter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AnnotationJob {
    pub input: PathBuf,
    pub orthologs: PathBuf,
    pub correspondence: PathBuf,
    pub output_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Optional path for a JSON report of every gene product outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
    /// File the job was loaded from; `None` for jobs built in code.
    #[serde(skip)]
    pub job_file: Option<PathBuf>,
}

impl AnnotationJob {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AnnotateResult<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| AnnotateError::io(&label, e))?;
        let job: Self = serde_json::from_str(&text).map_err(|e| AnnotateError::Config {
            path: label.clone(),
            message: e.to_string(),
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let job = Self {
            job_file: Some(path.to_path_buf()),
            ..job.resolved_against(&base)
        };
        job.validate().map_err(|message| AnnotateError::Config {
            path: label,
            message,
        })?;
        Ok(job)
    }

    fn resolved_against(self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            input: resolve(self.input),
            orthologs: resolve(self.orthologs),
            correspondence: resolve(self.correspondence),
            output_dir: Some(resolve(self.output_dir.unwrap_or_default())),
            report: self.report.map(resolve),
            ..self
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.output_label.trim().is_empty() {
            return Err("output_label must not be empty".to_string());
        }
        self.delimiter_byte().map(|_| ())
    }

    pub fn delimiter_byte(&self) -> Result<u8, String> {
        match self.delimiter.as_deref() {
            Some(raw) => parse_delimiter(raw),
            None => Ok(DEFAULT_DELIMITER),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&self.output_label),
            None => PathBuf::from(&self.output_label),
        }
    }

    pub fn run(&self) -> AnnotateResult<AnnotationSummary> {
        let delimiter = self.delimiter_byte().map_err(|message| AnnotateError::Config {
            path: self
                .job_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<in-memory job>".to_string()),
            message,
        })?;
        let orthologs = OrthologTable::from_delimited_file(&self.orthologs, delimiter)?;
        let correspondence = Correspondence::from_delimited_file(&self.correspondence, delimiter)?;
        let annotator = SbmlAnnotator::new(&self.input, orthologs, correspondence);
        let summary = annotator.annotate_to(&self.output_label, self.output_path())?;
        if let Some(report) = &self.report {
            write_report(report, &summary)?;
        }
        Ok(summary)
    }
}

pub fn write_report(path: &Path, summary: &AnnotationSummary) -> AnnotateResult<()> {
    let label = path.display().to_string();
    let text = serde_json::to_string_pretty(summary).map_err(|source| AnnotateError::Report {
        path: label.clone(),
        source,
    })?;
    fs::write(path, text).map_err(|e| AnnotateError::io(label, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbml_document::SbmlDocument;

    fn copy_fixtures(dir: &Path) {
        for name in ["ref_model.xml", "ref_vs_query.rsd.tsv", "gi2ncbi.tsv"] {
            fs::copy(Path::new("test_files/fixtures").join(name), dir.join(name)).unwrap();
        }
    }

    #[test]
    fn test_from_json_file_resolves_relative_paths() {
        let td = tempfile::tempdir().unwrap();
        let job_path = td.path().join("job.json");
        fs::write(
            &job_path,
            r#"{
  "input": "ref_model.xml",
  "orthologs": "ref_vs_query.rsd.tsv",
  "correspondence": "/abs/gi2ncbi.tsv",
  "output_label": "ref_vs_query.xml",
  "output_dir": "out"
}"#,
        )
        .unwrap();
        let job = AnnotationJob::from_json_file(&job_path).unwrap();
        assert_eq!(job.job_file.as_deref(), Some(job_path.as_path()));
        assert_eq!(job.input, td.path().join("ref_model.xml"));
        assert_eq!(job.correspondence, PathBuf::from("/abs/gi2ncbi.tsv"));
        assert_eq!(job.output_path(), td.path().join("out").join("ref_vs_query.xml"));
        assert_eq!(job.delimiter_byte(), Ok(b'\t'));
    }

    #[test]
    fn test_from_json_file_rejects_unknown_fields_and_bad_delimiter() {
        let td = tempfile::tempdir().unwrap();
        let job_path = td.path().join("job.json");
        fs::write(
            &job_path,
            r#"{"input":"a","orthologs":"b","correspondence":"c","output_label":"x","verbose":true}"#,
        )
        .unwrap();
        let err = AnnotationJob::from_json_file(&job_path).unwrap_err();
        assert!(matches!(err, AnnotateError::Config { .. }));

        fs::write(
            &job_path,
            r#"{"input":"a","orthologs":"b","correspondence":"c","output_label":"x","delimiter":";;"}"#,
        )
        .unwrap();
        let err = AnnotationJob::from_json_file(&job_path).unwrap_err();
        assert!(err.to_string().contains("Invalid delimiter"));
    }

    #[test]
    fn test_run_annotates_and_writes_report() {
        let td = tempfile::tempdir().unwrap();
        copy_fixtures(td.path());
        let job_path = td.path().join("job.json");
        fs::write(
            &job_path,
            r#"{
  "input": "ref_model.xml",
  "orthologs": "ref_vs_query.rsd.tsv",
  "correspondence": "gi2ncbi.tsv",
  "output_label": "ref_vs_query.xml",
  "report": "report.json"
}"#,
        )
        .unwrap();
        let job = AnnotationJob::from_json_file(&job_path).unwrap();
        let summary = job.run().unwrap();
        assert_eq!((summary.orthologs, summary.others), (2, 3));

        let doc = SbmlDocument::from_file(td.path().join("ref_vs_query.xml")).unwrap();
        assert_eq!(doc.model_name().as_deref(), Some("ref_vs_query.xml"));
        assert_eq!(doc.gene_products()[1].name.as_deref(), Some("ref:999"));

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(td.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report["orthologs"], 2);
        assert_eq!(report["gene_products"][0]["name"], "ortho:101/201");
        assert_eq!(report["gene_products"][4]["reason"], "no_secondary_id");
    }

    #[test]
    fn test_run_reports_bad_delimiter_against_job_file() {
        let td = tempfile::tempdir().unwrap();
        copy_fixtures(td.path());
        let job_path = td.path().join("job.json");
        fs::write(
            &job_path,
            r#"{"input":"ref_model.xml","orthologs":"ref_vs_query.rsd.tsv","correspondence":"gi2ncbi.tsv","output_label":"ref_vs_query.xml"}"#,
        )
        .unwrap();
        let mut job = AnnotationJob::from_json_file(&job_path).unwrap();
        job.delimiter = Some("::".to_string());
        let err = job.run().unwrap_err();
        let AnnotateError::Config { path, message } = &err else {
            panic!("expected config error, got {err:?}");
        };
        assert_eq!(path, &job_path.display().to_string());
        assert!(message.contains("Invalid delimiter"));
        assert!(!td.path().join("ref_vs_query.xml").exists());
    }

    #[test]
    fn test_write_report_to_missing_directory_is_io_error() {
        let td = tempfile::tempdir().unwrap();
        let path = td.path().join("missing").join("report.json");
        let err = write_report(&path, &AnnotationSummary::default()).unwrap_err();
        assert!(matches!(err, AnnotateError::Io { .. }));
    }
}
