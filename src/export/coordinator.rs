//! Export orchestrator
//!
//! Runs one export submission: validate the request against the environment,
//! fetch and assemble every language (the map phase, optionally concurrent),
//! fold the per-language results into stats and notices (the reduce phase,
//! always sequential), then package the worksheets.
//!
//! Packaging rules:
//! - Excel, one language with worksheets: that workbook alone.
//! - Excel, several languages with worksheets: a ZIP with one workbook each.
//! - CSV: always a ZIP, one folder per language.
//! - Nothing exported anywhere: no package and a single global notice.

use std::fmt;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{
    ExportError, FieldError, FormField, PackagingError, RepositoryError, Result, ValidationError,
};
use crate::model::{ExportRequest, FileFormat};
use crate::repository::{ContentRepository, ItemQuery, ProbeReport};

use super::grouping::{Assembly, WorksheetGroup, assemble};
use super::naming::{UniqueNames, archive_file_name, sanitize_language_name, workbook_file_name};
use super::package::{PackageKind, PackagedExport};
use super::progress::ProgressTracker;
use super::stats::{ExportRunStats, Notice, NoticeKind, NoticeScope, Severity, classify_languages};
use super::writers::{CsvSheetWriter, XlsxWorkbookWriter, ZipArchiveWriter};

/// Where the orchestrator is in a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Validating,
    /// The request referenced something the environment does not have
    Invalid,
    Running,
    Packaging,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExportPhase::Idle => "Idle",
            ExportPhase::Validating => "Validating",
            ExportPhase::Invalid => "Invalid",
            ExportPhase::Running => "Fetching items",
            ExportPhase::Packaging => "Packaging",
            ExportPhase::Failed => "Failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Languages fetched at the same time
    pub concurrency: usize,
    /// Date stamped into file names
    pub export_date: NaiveDate,
}

/// Outcome of one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageReport {
    pub codename: String,
    pub name: String,
    pub stats: ExportRunStats,
    /// Matches reported by the API
    pub total_count: u64,
    /// `(content type, rows)` per produced worksheet
    pub worksheets: Vec<(String, usize)>,
    pub divergent_types: Vec<String>,
    /// Set when fetching this language failed
    pub error: Option<String>,
}

/// Everything a front end needs to describe a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub environment_id: String,
    pub file_format: FileFormat,
    pub languages: Vec<LanguageReport>,
    pub notices: Vec<Notice>,
    /// `None` when nothing was exported
    pub output: Option<PackagedExport>,
}

impl ExportReport {
    pub fn total_found(&self) -> u64 {
        self.languages.iter().map(|l| l.stats.items_found).sum()
    }

    pub fn total_exported(&self) -> u64 {
        self.languages.iter().map(|l| l.stats.items_exported).sum()
    }

    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}

/// Worksheets produced for one language
struct LanguageOutput {
    codename: String,
    name: String,
    groups: Vec<WorksheetGroup>,
}

type LanguageResult<'r> = (&'r str, std::result::Result<(u64, Assembly), RepositoryError>);

/// Runs export submissions against one environment
pub struct ExportOrchestrator<'a, R: ContentRepository + ?Sized> {
    repository: &'a R,
    catalog: &'a ProbeReport,
    options: ExportOptions,
    tracker: ProgressTracker,
    phase: ExportPhase,
}

impl<'a, R: ContentRepository + ?Sized> ExportOrchestrator<'a, R> {
    /// Create a new orchestrator
    ///
    /// # Arguments
    /// * `repository` - Source of content items
    /// * `catalog` - Types and languages found by the probe
    /// * `options` - Concurrency and file name date
    pub fn new(repository: &'a R, catalog: &'a ProbeReport, options: ExportOptions) -> Self {
        Self {
            repository,
            catalog,
            options,
            tracker: ProgressTracker::hidden(),
            phase: ExportPhase::Idle,
        }
    }

    /// Report progress through the given tracker
    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    /// Execute one export submission
    ///
    /// # Arguments
    /// * `request` - Validated form selections
    ///
    /// # Returns
    /// * `Result<ExportReport>` - Report with the package, or the error that
    ///   ended the run. A run that exported nothing is a report without output.
    pub async fn run(&mut self, request: &ExportRequest) -> Result<ExportReport> {
        let outcome = self.execute(request).await;
        self.tracker.finish();

        self.phase = match &outcome {
            Ok(report) if report.is_success() => ExportPhase::Idle,
            Err(ExportError::Validation(_)) => ExportPhase::Invalid,
            _ => ExportPhase::Failed,
        };
        debug!("Export run ended in phase {}", self.phase);
        outcome
    }

    fn enter(&mut self, phase: ExportPhase) {
        debug!("Export phase: {} -> {}", self.phase, phase);
        self.phase = phase;
        self.tracker.set_phase(phase);
    }

    async fn execute(&mut self, request: &ExportRequest) -> Result<ExportReport> {
        self.enter(ExportPhase::Validating);
        self.check_catalog(request)?;

        self.enter(ExportPhase::Running);
        let results = self.fetch_languages(request).await;

        let environment_id = self.repository.environment_id().to_string();
        let (languages, outputs, first_error) = self.reduce(results);

        if languages.iter().all(|l| l.error.is_some()) {
            if let Some(err) = first_error {
                return Err(err.into());
            }
        }

        let mut report = ExportReport {
            environment_id,
            file_format: request.file_format(),
            notices: build_notices(&languages),
            languages,
            output: None,
        };

        if report.total_exported() == 0 {
            warn!("Nothing to export in any selected language");
            return Ok(report);
        }

        self.enter(ExportPhase::Packaging);
        let package = self.package(&report.environment_id, request.file_format(), &outputs)?;
        info!(
            "Packaged {} item(s) from {} language(s) into {}",
            report.total_exported(),
            outputs.len(),
            package.file_name
        );
        report.output = Some(package);
        Ok(report)
    }

    /// Reject codenames the environment does not define
    fn check_catalog(&self, request: &ExportRequest) -> std::result::Result<(), ValidationError> {
        let mut errors = Vec::new();

        for content_type in request.content_types() {
            if !self.catalog.content_types.iter().any(|t| &t.codename == content_type) {
                errors.push(FieldError {
                    field: FormField::ContentTypes,
                    message: format!("Content type '{content_type}' does not exist in this environment."),
                });
            }
        }
        for language in request.languages() {
            if !self.catalog.languages.iter().any(|l| &l.codename == language) {
                errors.push(FieldError {
                    field: FormField::Languages,
                    message: format!("Language '{language}' does not exist in this environment."),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Map phase: fetch and assemble each language independently
    async fn fetch_languages<'r>(&self, request: &'r ExportRequest) -> Vec<LanguageResult<'r>> {
        let repository = self.repository;
        let tracker = &self.tracker;
        let metadata = request.metadata_fields();
        let concurrency = self.options.concurrency.max(1);

        debug!(
            "Fetching {} language(s), {} at a time",
            request.languages().len(),
            concurrency
        );

        stream::iter(request.languages())
            .map(move |language| async move {
                let query = ItemQuery::for_language(request, language);
                let result = repository.fetch_items(&query).await.map(|fetched| {
                    let assembly = assemble(language, &fetched.items, metadata);
                    (fetched.total_count, assembly)
                });
                tracker.language_done(language);
                (language.as_str(), result)
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Reduce phase: fold results in request order
    fn reduce(
        &self,
        results: Vec<LanguageResult<'_>>,
    ) -> (Vec<LanguageReport>, Vec<LanguageOutput>, Option<RepositoryError>) {
        let mut languages = Vec::with_capacity(results.len());
        let mut outputs = Vec::new();
        let mut first_error = None;

        for (codename, result) in results {
            let name = self.catalog.language_name(codename).to_string();

            match result {
                Ok((total_count, assembly)) => {
                    let stats = ExportRunStats::new(assembly.items_found, assembly.items_exported);
                    info!(
                        "{}: {} item(s) found, {} exported",
                        codename, stats.items_found, stats.items_exported
                    );

                    languages.push(LanguageReport {
                        codename: codename.to_string(),
                        name: name.clone(),
                        stats,
                        total_count,
                        worksheets: assembly
                            .groups
                            .iter()
                            .map(|g| (g.content_type.clone(), g.rows.len()))
                            .collect(),
                        divergent_types: assembly.divergent_types,
                        error: None,
                    });
                    if !assembly.groups.is_empty() {
                        outputs.push(LanguageOutput {
                            codename: codename.to_string(),
                            name,
                            groups: assembly.groups,
                        });
                    }
                }
                Err(err) => {
                    warn!("Fetching items for {} failed: {}", codename, err);
                    languages.push(LanguageReport {
                        codename: codename.to_string(),
                        name,
                        stats: ExportRunStats::default(),
                        total_count: 0,
                        worksheets: Vec::new(),
                        divergent_types: Vec::new(),
                        error: Some(err.to_string()),
                    });
                    first_error.get_or_insert(err);
                }
            }
        }

        (languages, outputs, first_error)
    }

    fn package(
        &self,
        environment_id: &str,
        format: FileFormat,
        outputs: &[LanguageOutput],
    ) -> std::result::Result<PackagedExport, PackagingError> {
        let date = self.options.export_date;

        match format {
            FileFormat::Excel => {
                let mut workbooks = Vec::with_capacity(outputs.len());
                for output in outputs {
                    let mut writer = XlsxWorkbookWriter::new();
                    for group in &output.groups {
                        writer.add_group(group)?;
                    }
                    let sheets = writer.sheet_names().to_vec();
                    let language = sanitize_language_name(&output.name, &output.codename);
                    workbooks.push((
                        workbook_file_name(environment_id, &language, date),
                        writer.finish()?,
                        sheets,
                    ));
                }

                if workbooks.len() > 1 {
                    let mut archive = ZipArchiveWriter::new();
                    for (file_name, bytes, _) in &workbooks {
                        archive.add_entry(file_name, bytes)?;
                    }
                    let entries = archive.entries().to_vec();
                    return Ok(PackagedExport {
                        file_name: archive_file_name(environment_id, date),
                        bytes: archive.finish()?,
                        kind: PackageKind::WorkbookArchive,
                        entries,
                    });
                }

                let (file_name, bytes, entries) =
                    workbooks.pop().ok_or(PackagingError::NothingToPackage)?;
                Ok(PackagedExport {
                    file_name,
                    bytes,
                    kind: PackageKind::Workbook,
                    entries,
                })
            }
            FileFormat::Csv => {
                let writer = CsvSheetWriter::new();
                let mut archive = ZipArchiveWriter::new();
                let mut prefixes = UniqueNames::new();

                for output in outputs {
                    let sanitized = sanitize_language_name(&output.name, &output.codename);
                    let prefix = if prefixes.contains(&sanitized) {
                        prefixes.claim(&output.codename)
                    } else {
                        prefixes.claim(&sanitized)
                    };

                    for group in &output.groups {
                        let entry = format!("{prefix}/{}.csv", group.sheet_name);
                        archive.add_entry(&entry, &writer.encode(group)?)?;
                    }
                }

                let entries = archive.entries().to_vec();
                Ok(PackagedExport {
                    file_name: archive_file_name(environment_id, date),
                    bytes: archive.finish()?,
                    kind: PackageKind::CsvArchive,
                    entries,
                })
            }
        }
    }
}

/// Notices in language order: status, shape warnings, or the fetch failure.
///
/// Status notices come from [`classify_languages`] over the languages that
/// were fetched; a run that exported nothing gets its single global notice
/// after any fetch failures.
fn build_notices(languages: &[LanguageReport]) -> Vec<Notice> {
    let (global, per_language): (Vec<Notice>, Vec<Notice>) = classify_languages(
        languages
            .iter()
            .filter(|l| l.error.is_none())
            .map(|l| (l.codename.as_str(), l.stats)),
    )
    .into_iter()
    .partition(|n| n.scope == NoticeScope::Global);

    let mut notices = Vec::new();
    for language in languages {
        if let Some(message) = &language.error {
            notices.push(Notice::for_language(
                &language.codename,
                Severity::Error,
                NoticeKind::FetchFailed {
                    message: message.clone(),
                },
            ));
            continue;
        }
        if !global.is_empty() {
            continue;
        }
        notices.extend(
            per_language
                .iter()
                .filter(|n| n.language() == Some(language.codename.as_str()))
                .cloned(),
        );
        notices.extend(language.divergent_types.iter().map(|content_type| {
            Notice::for_language(
                &language.codename,
                Severity::Warning,
                NoticeKind::DivergentShape {
                    content_type: content_type.clone(),
                },
            )
        }));
    }

    notices.extend(global);
    notices
}
