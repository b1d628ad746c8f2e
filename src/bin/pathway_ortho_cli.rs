use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use pathway_ortho::{
    Correspondence, OrthologTable, SbmlAnnotator, about,
    job::{AnnotationJob, write_report},
    tables::parse_delimiter,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pathway_ortho_cli")]
#[command(about = "Annotate SBML gene products with orthology information", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version and build information
    #[arg(short = 'V', long)]
    version: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate one SBML model
    Annotate {
        /// SBML model to annotate (left untouched)
        #[arg(short, long)]
        input: PathBuf,

        /// Ortholog pairs: reference id, query id, extra columns ignored
        #[arg(long)]
        orthologs: PathBuf,

        /// Correspondence table: NCBI GI, primary id
        #[arg(long)]
        correspondence: PathBuf,

        /// Output label, e.g. ref_vs_query.xml; used as model name and file name
        #[arg(short, long)]
        output: String,

        /// Directory to write the output file into
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Column delimiter of both tables ("tab" or a single character)
        #[arg(long, default_value = "tab")]
        delimiter: String,

        /// Write a JSON report of every gene product outcome
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run an annotation described by a JSON job file
    RunJob {
        /// Path to the job file
        job: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Annotate {
            input,
            orthologs,
            correspondence,
            output,
            output_dir,
            delimiter,
            report,
        }) => {
            let delimiter = parse_delimiter(&delimiter).map_err(|e| anyhow!(e))?;
            let orthologs = OrthologTable::from_delimited_file(&orthologs, delimiter)
                .context("Could not load ortholog pairs")?;
            let correspondence = Correspondence::from_delimited_file(&correspondence, delimiter)
                .context("Could not load id correspondence")?;
            let output_path = match output_dir {
                Some(dir) => dir.join(&output),
                None => PathBuf::from(&output),
            };
            let annotator = SbmlAnnotator::new(input, orthologs, correspondence);
            let summary = annotator
                .annotate_to(&output, &output_path)
                .with_context(|| {
                    format!("Could not annotate '{}'", annotator.sbml_file().display())
                })?;
            if let Some(report) = report {
                write_report(&report, &summary)?;
            }
            Ok(())
        }
        Some(Commands::RunJob { job }) => {
            let job = AnnotationJob::from_json_file(&job)?;
            job.run()
                .with_context(|| format!("Job for '{}' failed", job.input.display()))?;
            Ok(())
        }
        None => Err(anyhow!("Missing command; run with --help for usage")),
    }
}
