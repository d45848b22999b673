//! Command-line interface for content-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - Turning export flags into a validated [`ExportRequest`]
//! - Dispatching subcommands and choosing the process exit code

pub mod completion;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{ExportOptions, ExportOrchestrator, ProgressTracker};
use crate::filter::{self, FILTERABLE_TYPES, FilterSpec, LastModifiedFilter};
use crate::formatter::{self, Colorizer, SummaryFormatter, TableFormatter};
use crate::model::{ElementType, ExportRequest, FileFormat, MetadataField, WorkflowStep};
use crate::repository::{ContentRepository, Credentials, DeliveryClient, ProbeReport, probe};

/// Export Kontent.ai content to Excel workbooks or CSV archives
#[derive(Parser, Debug)]
#[command(
    name = "content-export",
    version,
    about = "Export headless CMS content to Excel or CSV",
    long_about = "Fetches content items through the Delivery API, groups them by content type
and language, and writes an Excel workbook or a ZIP of workbooks or CSV files."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Environment identifier (UUID)
    #[arg(short = 'e', long, value_name = "ID", global = true)]
    pub environment_id: Option<String>,

    /// Delivery API key with secure access and preview permissions
    #[arg(short = 'k', long, value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for content-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export content items
    Export(ExportArgs),

    /// Check that the API key can read content, preview, types and languages
    Probe,

    /// List content types
    Types {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List languages
    Languages {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List filter operators, optionally for one element type
    Operators {
        #[arg(value_name = "ELEMENT_TYPE")]
        element_type: Option<ElementType>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Selections for one export run
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Content type codenames
    #[arg(short = 't', long = "type", value_name = "CODENAME", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Export every content type in the environment
    #[arg(long, conflicts_with = "types")]
    pub all_types: bool,

    /// Language codenames
    #[arg(short = 'l', long = "language", value_name = "CODENAME", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Export every language in the environment
    #[arg(long, conflicts_with = "languages")]
    pub all_languages: bool,

    /// Workflow step: published, draft or latest-version
    #[arg(short = 'w', long, value_name = "STEP")]
    pub workflow_step: Option<WorkflowStep>,

    /// Output format: excel or csv
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub format: Option<FileFormat>,

    /// Only items whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub item_name: Option<String>,

    /// Only items in this collection
    #[arg(long, value_name = "CODENAME")]
    pub collection: Option<String>,

    /// Last-modified filter, e.g. "is after=2024-01-01"
    #[arg(long, value_name = "PHRASE=VALUE")]
    pub last_modified: Option<String>,

    /// Element filter: <element_type>:<element_codename>:<phrase>=<value>
    #[arg(long = "filter", value_name = "FILTER")]
    pub filters: Vec<String>,

    /// Metadata columns prepended to every row, in the given order
    #[arg(short = 'm', long = "metadata", value_name = "FIELD", value_delimiter = ',')]
    pub metadata: Vec<MetadataField>,

    /// Directory the export is written to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// One row of the operator listing
#[derive(Debug, Serialize)]
struct OperatorEntry {
    element_type: ElementType,
    phrase: &'static str,
    operation: &'static str,
    default: bool,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file, environment and arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Effective configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.apply_env();
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Log level after verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        self.config.logging.level.to_tracing_level()
    }

    /// Colorizer honoring `--no-color` and the display config
    pub fn colorizer(&self) -> Colorizer {
        Colorizer::new(self.config.display.color_output)
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
        Self::apply_delivery_args(config, args);
    }

    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    fn apply_delivery_args(config: &mut Config, args: &CliArgs) {
        if let Some(id) = &args.environment_id {
            config.delivery.environment_id = Some(id.clone());
        }
        if let Some(key) = &args.api_key {
            config.delivery.api_key = Some(key.clone());
        }
        if let Commands::Export(export) = &args.command {
            if let Some(dir) = &export.output_dir {
                config.export.output_dir = dir.clone();
            }
            if export.no_progress {
                config.export.show_progress = false;
            }
        }
    }

    /// Run the selected subcommand
    ///
    /// # Returns
    /// * `Result<i32>` - Process exit code
    pub async fn run(&self) -> Result<i32> {
        match &self.args.command {
            Commands::Export(export) => self.run_export(export).await,
            Commands::Probe => {
                let (client, catalog) = self.connect().await?;
                println!(
                    "{}",
                    self.colorizer().success(&format!(
                        "Environment {} is ready: {} content type(s), {} language(s)",
                        client.environment_id(),
                        catalog.content_types.len(),
                        catalog.languages.len()
                    ))
                );
                Ok(0)
            }
            Commands::Types { json } => {
                let (_, catalog) = self.connect().await?;
                if *json {
                    println!("{}", formatter::to_json(&catalog.content_types)?);
                } else {
                    println!("{}", self.table().content_types(&catalog.content_types));
                }
                Ok(0)
            }
            Commands::Languages { json } => {
                let (_, catalog) = self.connect().await?;
                if *json {
                    println!("{}", formatter::to_json(&catalog.languages)?);
                } else {
                    println!("{}", self.table().languages(&catalog.languages));
                }
                Ok(0)
            }
            Commands::Operators { element_type, json } => {
                if *json {
                    println!("{}", formatter::to_json(&operator_entries(*element_type))?);
                } else {
                    println!("{}", self.table().operators(*element_type));
                }
                Ok(0)
            }
            Commands::Version => {
                self.show_version();
                Ok(0)
            }
            Commands::Completion { shell } => {
                completion::generate_completion(shell)?;
                Ok(0)
            }
            Commands::Config { show, validate } => self.handle_config_command(*show, *validate),
        }
    }

    fn table(&self) -> TableFormatter {
        TableFormatter::with_colors(self.config.display.color_output)
    }

    /// Resolve credentials and probe the environment
    async fn connect(&self) -> Result<(DeliveryClient, ProbeReport)> {
        let credentials = Credentials::resolve(
            self.config.delivery.environment_id.as_deref(),
            self.config.delivery.api_key.as_deref(),
        )?;
        debug!("Using environment {}", credentials.environment_id);

        let client = DeliveryClient::new(
            credentials.environment_id,
            credentials.api_key,
            self.config.delivery.clone(),
        )?;
        let catalog = probe(&client).await?;
        Ok((client, catalog))
    }

    async fn run_export(&self, export: &ExportArgs) -> Result<i32> {
        let (client, catalog) = self.connect().await?;
        let request = self.build_request(export, &catalog)?;
        info!(
            "Exporting {} content type(s) in {} language(s) as {}",
            request.content_types().len(),
            request.languages().len(),
            request.file_format()
        );

        let options = ExportOptions {
            concurrency: self.config.export.concurrency,
            export_date: Local::now().date_naive(),
        };
        let show_progress = self.config.export.show_progress && !self.args.quiet;
        let tracker = ProgressTracker::new(request.languages().len() as u64, show_progress);

        let mut orchestrator =
            ExportOrchestrator::new(&client, &catalog, options).with_progress(tracker);
        let report = orchestrator.run(&request).await?;

        let saved_to = match &report.output {
            Some(output) => Some(output.save_to(&self.config.export.output_dir).await?),
            None => None,
        };

        let summary = SummaryFormatter::new(self.config.display.color_output, !self.args.quiet)
            .format(&report, saved_to.as_deref());
        println!("{summary}");

        Ok(if report.is_success() { 0 } else { 1 })
    }

    /// Turn export flags into a validated request
    ///
    /// `--all-types` and `--all-languages` expand to everything the probe
    /// listed; the format falls back to `export.default_format`.
    fn build_request(&self, export: &ExportArgs, catalog: &ProbeReport) -> Result<ExportRequest> {
        let content_types: Vec<String> = if export.all_types {
            catalog.content_types.iter().map(|t| t.codename.clone()).collect()
        } else {
            export.types.clone()
        };
        let languages: Vec<String> = if export.all_languages {
            catalog.languages.iter().map(|l| l.codename.clone()).collect()
        } else {
            export.languages.clone()
        };

        let element_filters = export
            .filters
            .iter()
            .map(|f| FilterSpec::parse(f))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let last_modified = export
            .last_modified
            .as_deref()
            .map(LastModifiedFilter::parse)
            .transpose()?;

        let request = ExportRequest::builder()
            .content_types(content_types)
            .languages(languages)
            .workflow_step(export.workflow_step)
            .file_format(export.format.or(self.config.export.default_format))
            .item_name(export.item_name.clone())
            .collection(export.collection.clone())
            .last_modified(last_modified)
            .element_filters(element_filters)
            .metadata_fields(export.metadata.clone())
            .build()?;

        Ok(request)
    }

    fn show_version(&self) {
        println!("content-export version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<i32> {
        let mut code = 0;
        if validate {
            code = self.validate_config_file();
        }
        if show {
            self.show_config()?;
        }
        Ok(code)
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> i32 {
        let path = self.config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return 1;
        }

        match Config::from_file(&path).and_then(|config| config.validate()) {
            Ok(()) => {
                println!("✅ Configuration is valid");
                0
            }
            Err(e) => {
                println!("❌ {e}");
                1
            }
        }
    }

    /// Show effective configuration with the API key masked
    fn show_config(&self) -> Result<()> {
        println!("Configuration file: {}", self.config_path().display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_display_toml()?);
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }
}

/// Operator registry entries for one element type, or for all of them
fn operator_entries(element_type: Option<ElementType>) -> Vec<OperatorEntry> {
    let types: Vec<ElementType> = match element_type {
        Some(t) => vec![t],
        None => FILTERABLE_TYPES.to_vec(),
    };

    types
        .into_iter()
        .flat_map(|t| {
            filter::phrases(t)
                .iter()
                .enumerate()
                .map(move |(index, (phrase, operation))| OperatorEntry {
                    element_type: t,
                    phrase: *phrase,
                    operation: operation.name(),
                    default: index == 0,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::repository::{ContentTypeSchema, LanguageDescriptor};

    fn cli(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    fn export_args(cli: &CliInterface) -> &ExportArgs {
        match &cli.args.command {
            Commands::Export(export) => export,
            other => panic!("expected export, got {other:?}"),
        }
    }

    fn catalog() -> ProbeReport {
        ProbeReport {
            content_types: vec![
                ContentTypeSchema {
                    id: "t1".into(),
                    codename: "article".into(),
                    name: "Article".into(),
                    elements: vec![("title".into(), ElementType::Text)],
                },
                ContentTypeSchema {
                    id: "t2".into(),
                    codename: "author".into(),
                    name: "Author".into(),
                    elements: vec![("name".into(), ElementType::Text)],
                },
            ],
            languages: vec![
                LanguageDescriptor {
                    id: "l1".into(),
                    codename: "en-US".into(),
                    name: "English".into(),
                },
                LanguageDescriptor {
                    id: "l2".into(),
                    codename: "de-DE".into(),
                    name: "German".into(),
                },
            ],
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(CliArgs::try_parse_from(["content-export"]).is_err());
    }

    #[test]
    fn test_cli_args_with_global_flags() {
        let args = CliArgs::try_parse_from([
            "content-export",
            "types",
            "--no-color",
            "-q",
            "-e",
            "975bf280-fd91-488c-994c-2f04416e5ee3",
            "--json",
        ])
        .unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
        assert_eq!(
            args.environment_id.as_deref(),
            Some("975bf280-fd91-488c-994c-2f04416e5ee3")
        );
        assert!(matches!(args.command, Commands::Types { json: true }));
    }

    #[test]
    fn test_export_args_parsing() {
        let cli = cli(&[
            "content-export",
            "export",
            "-t",
            "article,author",
            "-l",
            "en-US",
            "-l",
            "de-DE",
            "-w",
            "draft",
            "-f",
            "csv",
            "--filter",
            "number:rating:is in the range of=1,5",
            "-m",
            "name,last_modified",
        ]);
        let export = export_args(&cli);
        assert_eq!(export.types, vec!["article", "author"]);
        assert_eq!(export.languages, vec!["en-US", "de-DE"]);
        assert_eq!(export.workflow_step, Some(WorkflowStep::Draft));
        assert_eq!(export.format, Some(FileFormat::Csv));
        assert_eq!(export.filters.len(), 1);
        assert_eq!(
            export.metadata,
            vec![MetadataField::Name, MetadataField::LastModified]
        );
    }

    #[test]
    fn test_all_types_conflicts_with_type() {
        let result =
            CliArgs::try_parse_from(["content-export", "export", "--all-types", "-t", "article"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_workflow_step_is_rejected() {
        let result = CliArgs::try_parse_from(["content-export", "export", "-w", "archived"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_args_override_config() {
        let cli = cli(&[
            "content-export",
            "-k",
            "key",
            "--vv",
            "--no-color",
            "export",
            "-o",
            "out",
            "--no-progress",
        ]);
        assert_eq!(cli.config.delivery.api_key.as_deref(), Some("key"));
        assert_eq!(cli.config.logging.level, LogLevel::Trace);
        assert!(!cli.config.display.color_output);
        assert_eq!(cli.config.export.output_dir, PathBuf::from("out"));
        assert!(!cli.config.export.show_progress);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_quiet_lowers_log_level() {
        let cli = cli(&["content-export", "-q", "version"]);
        assert_eq!(cli.config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_build_request_expands_all() {
        let cli = cli(&[
            "content-export",
            "export",
            "--all-types",
            "--all-languages",
            "-w",
            "published",
            "-f",
            "excel",
        ]);
        let request = cli.build_request(export_args(&cli), &catalog()).unwrap();
        assert_eq!(request.content_types(), ["article", "author"]);
        assert_eq!(request.languages(), ["en-US", "de-DE"]);
        assert_eq!(request.file_format(), FileFormat::Excel);
    }

    #[test]
    fn test_build_request_uses_default_format() {
        let mut cli = cli(&[
            "content-export",
            "export",
            "-t",
            "article",
            "-l",
            "en-US",
            "-w",
            "published",
        ]);
        assert!(matches!(
            cli.build_request(export_args(&cli), &catalog()),
            Err(ExportError::Validation(_))
        ));

        cli.config.export.default_format = Some(FileFormat::Csv);
        let request = cli.build_request(export_args(&cli), &catalog()).unwrap();
        assert_eq!(request.file_format(), FileFormat::Csv);
    }

    #[test]
    fn test_build_request_rejects_bad_filter() {
        let cli = cli(&[
            "content-export",
            "export",
            "-t",
            "article",
            "-l",
            "en-US",
            "-w",
            "published",
            "-f",
            "csv",
            "--filter",
            "asset:hero:contains=x",
        ]);
        assert!(matches!(
            cli.build_request(export_args(&cli), &catalog()),
            Err(ExportError::Filter(_))
        ));
    }

    #[test]
    fn test_operator_entries() {
        let entries = operator_entries(Some(ElementType::Number));
        assert!(entries[0].default);
        assert!(entries.iter().skip(1).all(|e| !e.default));
        assert!(entries.iter().any(|e| e.operation == "rangeFilter"));

        let all = operator_entries(None);
        assert!(all.len() > entries.len());
        assert!(formatter::to_json(&all).unwrap().contains("\"element_type\""));
    }
}
