mod emit;
mod logging;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use zodgen_compile::{CompileEngine, CompileError, fingerprint, render_plan};
use zodgen_config::{
    ConfigError, GeneratorConfig, ValidationIssue, ValidationReport, load_config,
    validate_config_against_model,
};
use zodgen_core::{DataModel, Error as CoreError, build_relation_graph_report, validate_model};

use emit::{DriftKind, detect_drift, write_rendered};
use logging::init_logging;

const DEFAULT_OUT_DIR: &str = "generated";

#[derive(Debug, Error)]
enum CliError {
    #[error("logging error: {0}")]
    Logging(#[from] logging::LoggingError),
    #[error("output error: {0}")]
    Emit(#[from] emit::EmitError),
    #[error("model error: {0}")]
    Model(#[from] CoreError),
    #[error("cannot read model '{path}': {source}")]
    ModelRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse model '{path}': {source}")]
    ModelParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
    #[error("{0} generated file(s) are out of date")]
    Drift(usize),
}

#[derive(Parser, Debug)]
#[command(name = "zodgen", version, about = "Generate zod schemas from a data model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the model and write the generated schemas.
    Generate(GenerateArgs),
    /// Check the model and configuration without generating anything.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Data-model description (JSON).
    #[arg(long, value_name = "FILE")]
    model: PathBuf,
    /// Generator configuration (.json or .toml).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output directory; overrides the configured `output`.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Append JSON logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Compare against existing files and fail on drift instead of writing.
    #[arg(long, default_value_t = false)]
    check: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    #[command(flatten)]
    input: InputArgs,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        input,
        out,
        log_file,
        check,
    } = args;

    init_logging(log_file.as_deref())?;
    tracing::info!(event = "run_started", model = %input.model.display(), check);
    let timer = Instant::now();

    let model = read_model(&input.model)?;
    let config = read_config(input.config.as_deref())?;

    let report = validate_config_against_model(&config, &model);
    for issue in report.issues() {
        tracing::warn!(
            event = "config_warning",
            code = %issue.code,
            path = %issue.path,
            "{}",
            issue.message
        );
    }

    let out_dir = out
        .or_else(|| config.output.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    let plan = match CompileEngine::new(config).run(&model) {
        Ok(plan) => plan,
        Err(err) => {
            if let CompileError::Failed(report) = &err {
                for issue in &report.issues {
                    eprintln!("error: {issue}");
                }
            }
            tracing::info!(event = "run_finished", status = "error");
            return Err(err.into());
        }
    };
    let files = render_plan(&plan);
    tracing::info!(
        event = "plan_rendered",
        files = files.len(),
        fingerprint = %fingerprint(&plan)
    );

    if check {
        let drift = detect_drift(&out_dir, &files)?;
        for item in &drift {
            let label = match item.kind {
                DriftKind::Missing => "missing",
                DriftKind::Changed => "changed",
            };
            eprintln!("{label}: {}", item.path.display());
        }
        if !drift.is_empty() {
            tracing::info!(event = "run_finished", status = "drift", files = drift.len());
            return Err(CliError::Drift(drift.len()));
        }
        println!("{} file(s) up to date in {}", files.len(), out_dir.display());
    } else {
        let written = write_rendered(&out_dir, &files)?;
        for path in &written {
            tracing::debug!(event = "file_written", path = %path.display());
        }
        println!("wrote {} file(s) to {}", written.len(), out_dir.display());
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    init_logging(None)?;

    let model = read_model(&args.input.model)?;
    validate_model(&model)?;
    println!(
        "model ok: {} entities, {} enums",
        model.entities.len(),
        model.enums.len()
    );

    let graph = build_relation_graph_report(&model);
    println!(
        "relations: {} entities, {} edges",
        graph.summary.nodes, graph.summary.edges
    );
    if let Some(cycle) = &graph.cycle {
        println!("relation cycle: {} (emitted as lazy references)", cycle.join(" -> "));
    }

    let config = match read_config(args.input.config.as_deref()) {
        Ok(config) => config,
        Err(CliError::Config(ConfigError::Invalid(report))) => {
            print_report(&report);
            return Err(CliError::Config(ConfigError::Invalid(report)));
        }
        Err(err) => return Err(err),
    };

    let report = validate_config_against_model(&config, &model);
    print_report(&report);
    println!(
        "config ok: {} error(s), {} warning(s)",
        report.errors.len(),
        report.warnings.len()
    );
    Ok(())
}

fn read_model(path: &Path) -> Result<DataModel, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::ModelRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::ModelParse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_config(path: Option<&Path>) -> Result<GeneratorConfig, CliError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(GeneratorConfig::default()),
    }
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        print_issue("error", issue);
    }
    for issue in &report.warnings {
        print_issue("warning", issue);
    }
}

fn print_issue(label: &str, issue: &ValidationIssue) {
    eprintln!("{label}[{}] {}: {}", issue.code, issue.path, issue.message);
    if let Some(hint) = &issue.hint {
        eprintln!("  hint: {hint}");
    }
}
