use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand};
use helm_artifact_chart::ChartParser;
use helm_artifact_core::{SchemaDocument, TemplateDocument, validate_schema, validate_template};
use helm_artifact_generator::{
    ExposeAllAnalyzer, GeneratorConfig, ParameterAnalyzer, RecordedAnalyzer, SchemaGenerator,
    TemplateGenerator, run_pipeline,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "helm-artifact")]
#[command(about = "Generate configuration schemas and solution templates from Helm charts")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the parsed chart metadata and parameters.
    Inspect(InspectArgs),
    /// Generate a configuration schema.
    Schema(SchemaArgs),
    /// Generate a solution template.
    Template(TemplateArgs),
    /// Generate schema, template and report into a directory.
    Generate(GenerateArgs),
    /// Check a template against its schema.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Chart directory containing Chart.yaml.
    #[arg(long)]
    chart: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

/// Artifact identity shared by the generating commands.
#[derive(Debug, Args)]
struct ArtifactArgs {
    /// Chart directory containing Chart.yaml.
    #[arg(long)]
    chart: PathBuf,
    /// Artifact name written into the generated documents.
    #[arg(long)]
    name: String,
    /// Artifact version written into the generated documents.
    #[arg(long)]
    version: String,
    /// Generator configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct AnalyzerArgs {
    /// Recorded parameter analysis (YAML or JSON).
    #[arg(long, conflicts_with = "expose_all")]
    analysis: Option<PathBuf>,
    /// Mark every parameter configurable using the configured defaults.
    #[arg(long)]
    expose_all: bool,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    #[command(flatten)]
    artifact: ArtifactArgs,
    #[command(flatten)]
    analyzer: AnalyzerArgs,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TemplateArgs {
    #[command(flatten)]
    artifact: ArtifactArgs,
    /// Schema to take required parameters from. Without it every chart
    /// parameter is templated.
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    artifact: ArtifactArgs,
    #[command(flatten)]
    analyzer: AnalyzerArgs,
    /// Output directory for schema, template and report.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema YAML file.
    #[arg(long)]
    schema: PathBuf,
    /// Template YAML file.
    #[arg(long)]
    template: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Schema(args) => run_schema(args).await,
        Command::Template(args) => run_template(args),
        Command::Generate(args) => run_generate(args).await,
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let parser = ChartParser::new(&args.chart);
    let chart = parser.parse().map_err(|e| e.to_string())?;
    report_missing_dependencies(&parser.missing_local_dependencies(&chart));

    let raw = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&chart)
            .map_err(|err| format!("Failed to serialize chart: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&chart)
            .map_err(|err| format!("Failed to serialize chart: {err}"))?,
    };
    println!("{raw}");
    Ok(())
}

async fn run_schema(args: SchemaArgs) -> Result<(), String> {
    let config = load_config(args.artifact.config.as_deref())?;
    let analyzer = select_analyzer(&args.analyzer, &config)?;

    let parser = ChartParser::new(&args.artifact.chart);
    let chart = parser.parse().map_err(|e| e.to_string())?;
    report_missing_dependencies(&parser.missing_local_dependencies(&chart));

    let mut generator = SchemaGenerator::new(analyzer);
    let yaml = generator
        .generate(&chart, &args.artifact.name, &args.artifact.version)
        .await
        .map_err(|e| e.to_string())?;

    let excluded = generator.excluded_parameters();
    if !excluded.is_empty() {
        eprintln!(
            "{} parameter(s) not configurable: {}",
            excluded.len(),
            excluded.join(", ")
        );
    }

    emit(&yaml, args.output.as_deref(), "schema")
}

fn run_template(args: TemplateArgs) -> Result<(), String> {
    let config = load_config(args.artifact.config.as_deref())?;
    let schema = args
        .schema
        .as_deref()
        .map(|path| {
            let raw = read_file(path)?;
            SchemaDocument::from_yaml(&raw)
                .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
        })
        .transpose()?;

    let parser = ChartParser::new(&args.artifact.chart);
    let chart = parser.parse().map_err(|e| e.to_string())?;
    report_missing_dependencies(&parser.missing_local_dependencies(&chart));

    if schema.is_none() {
        eprintln!("No --schema given; templating every chart parameter.");
    }
    let yaml = TemplateGenerator::from_config(&config.dependencies)
        .generate(
            &chart,
            &args.artifact.name,
            &args.artifact.version,
            schema.as_ref(),
        )
        .map_err(|e| e.to_string())?;

    emit(&yaml, args.output.as_deref(), "template")
}

async fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = load_config(args.artifact.config.as_deref())?;
    let analyzer = select_analyzer(&args.analyzer, &config)?;

    let parser = ChartParser::new(&args.artifact.chart);
    let bundle = run_pipeline(
        &parser,
        analyzer,
        &config,
        &args.artifact.name,
        &args.artifact.version,
    )
    .await
    .map_err(|e| e.to_string())?;
    report_missing_dependencies(&bundle.report.missing_dependencies);

    fs::create_dir_all(&args.output).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            args.output.display()
        )
    })?;

    let schema_path = args.output.join(&config.output.schema_file);
    write_file(&schema_path, &bundle.schema_yaml)?;
    let template_path = args.output.join(&config.output.template_file);
    write_file(&template_path, &bundle.template_yaml)?;
    let report_path = args.output.join(&config.output.report_file);
    let report_raw = bundle.report.to_json().map_err(|e| e.to_string())?;
    write_file(&report_path, &report_raw)?;

    println!(
        "Generated schema with {} config(s) and template with {} config(s) in '{}'.",
        bundle.report.schema_config_count,
        bundle.report.template_config_count,
        args.output.display()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let schema = SchemaDocument::from_yaml(&read_file(&args.schema)?)
        .map_err(|err| format!("Invalid schema '{}': {err}", args.schema.display()))?;
    let template = TemplateDocument::from_yaml(&read_file(&args.template)?)
        .map_err(|err| format!("Invalid template '{}': {err}", args.template.display()))?;

    let mut findings = validate_schema(&schema);
    findings.extend(validate_template(&template, &schema));

    if findings.is_empty() {
        println!(
            "Validated schema ({} config(s)) and template ({} config(s)).",
            schema.rules.configs.len(),
            template.leaf_count()
        );
        return Ok(());
    }

    for finding in &findings {
        eprintln!("  {finding}");
    }
    Err(format!("{} validation finding(s)", findings.len()))
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, String> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading generator config");
            GeneratorConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))
        }
        None => Ok(GeneratorConfig::default()),
    }
}

/// Command-line flags override the configured analyzer mode.
fn select_analyzer(
    args: &AnalyzerArgs,
    config: &GeneratorConfig,
) -> Result<Arc<dyn ParameterAnalyzer>, String> {
    if args.expose_all {
        return Ok(Arc::new(ExposeAllAnalyzer::new(config.defaults.clone())));
    }
    if let Some(path) = &args.analysis {
        return Ok(Arc::new(RecordedAnalyzer::new(path)));
    }
    config
        .build_analyzer()
        .map_err(|err| format!("{err} (pass --analysis FILE or --expose-all)"))
}

fn report_missing_dependencies(missing: &[String]) {
    if !missing.is_empty() {
        eprintln!(
            "{} dependency chart(s) not vendored under charts/: {}",
            missing.len(),
            missing.join(", ")
        );
    }
}

fn emit(yaml: &str, output: Option<&Path>, kind: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            write_file(path, yaml)?;
            println!("Wrote {kind} to '{}'.", path.display());
        }
        None => print!("{yaml}"),
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
