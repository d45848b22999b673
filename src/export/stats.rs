//! Run statistics and user-facing notices

use std::fmt;

use serde::Serialize;

/// Per-language counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportRunStats {
    pub items_found: u64,
    pub items_exported: u64,
}

/// How completely a language was exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageStatus {
    NoItemsFound,
    AllSkipped,
    SomeSkipped,
    FullyExported,
}

impl ExportRunStats {
    pub fn new(items_found: u64, items_exported: u64) -> Self {
        debug_assert!(items_exported <= items_found);
        Self {
            items_found,
            items_exported,
        }
    }

    pub fn skipped(&self) -> u64 {
        self.items_found.saturating_sub(self.items_exported)
    }

    pub fn classify(&self) -> LanguageStatus {
        match (self.items_found, self.items_exported) {
            (0, _) => LanguageStatus::NoItemsFound,
            (_, 0) => LanguageStatus::AllSkipped,
            (found, exported) if exported < found => LanguageStatus::SomeSkipped,
            _ => LanguageStatus::FullyExported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Whether a notice concerns the whole run or one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeScope {
    Global,
    Language(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Nothing was exported in any language
    NoItems,
    NoItemsFound,
    AllSkipped { found: u64 },
    SomeSkipped { found: u64, exported: u64 },
    DivergentShape { content_type: String },
    FetchFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub scope: NoticeScope,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn global_no_items() -> Self {
        Notice {
            severity: Severity::Error,
            scope: NoticeScope::Global,
            kind: NoticeKind::NoItems,
        }
    }

    pub fn for_language(language: &str, severity: Severity, kind: NoticeKind) -> Self {
        Notice {
            severity,
            scope: NoticeScope::Language(language.to_string()),
            kind,
        }
    }

    /// Notice describing a language's export status, if it needs one
    pub fn from_stats(language: &str, stats: &ExportRunStats) -> Option<Self> {
        let (severity, kind) = match stats.classify() {
            LanguageStatus::NoItemsFound => (Severity::Info, NoticeKind::NoItemsFound),
            LanguageStatus::AllSkipped => (
                Severity::Warning,
                NoticeKind::AllSkipped {
                    found: stats.items_found,
                },
            ),
            LanguageStatus::SomeSkipped => (
                Severity::Warning,
                NoticeKind::SomeSkipped {
                    found: stats.items_found,
                    exported: stats.items_exported,
                },
            ),
            LanguageStatus::FullyExported => return None,
        };
        Some(Notice::for_language(language, severity, kind))
    }

    pub fn language(&self) -> Option<&str> {
        match &self.scope {
            NoticeScope::Language(language) => Some(language),
            NoticeScope::Global => None,
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::NoItems => write!(
                f,
                "No items matched the selected content types, languages and filters. Choose another workflow step or content type."
            ),
            NoticeKind::NoItemsFound => write!(f, "No items found"),
            NoticeKind::AllSkipped { found } => {
                write!(f, "All {found} item(s) had no content and were skipped")
            }
            NoticeKind::SomeSkipped { found, exported } => write!(
                f,
                "{} of {found} item(s) had no content and were skipped",
                found - exported
            ),
            NoticeKind::DivergentShape { content_type } => write!(
                f,
                "Items of '{content_type}' have different elements; columns follow the last exported item"
            ),
            NoticeKind::FetchFailed { message } => write!(f, "Fetching items failed: {message}"),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            NoticeScope::Global => write!(f, "{}", self.kind),
            NoticeScope::Language(language) => write!(f, "[{language}] {}", self.kind),
        }
    }
}

/// Notices for a set of per-language stats.
///
/// When nothing was exported anywhere a single global notice replaces the
/// per-language detail.
pub fn classify_languages<'a, I>(stats: I) -> Vec<Notice>
where
    I: IntoIterator<Item = (&'a str, ExportRunStats)>,
{
    let stats: Vec<(&str, ExportRunStats)> = stats.into_iter().collect();
    let total_exported: u64 = stats.iter().map(|(_, s)| s.items_exported).sum();
    if total_exported == 0 {
        return vec![Notice::global_no_items()];
    }

    stats
        .iter()
        .filter_map(|(language, s)| Notice::from_stats(language, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(ExportRunStats::new(0, 0).classify(), LanguageStatus::NoItemsFound);
        assert_eq!(ExportRunStats::new(5, 0).classify(), LanguageStatus::AllSkipped);
        assert_eq!(ExportRunStats::new(5, 3).classify(), LanguageStatus::SomeSkipped);
        assert_eq!(ExportRunStats::new(5, 5).classify(), LanguageStatus::FullyExported);
        assert_eq!(ExportRunStats::new(5, 3).skipped(), 2);
    }

    #[test]
    fn test_three_language_fixture() {
        let notices = classify_languages([
            ("en-US", ExportRunStats::new(0, 0)),
            ("de-DE", ExportRunStats::new(5, 0)),
            ("fr-FR", ExportRunStats::new(5, 3)),
        ]);

        assert_eq!(
            notices,
            vec![
                Notice::for_language("en-US", Severity::Info, NoticeKind::NoItemsFound),
                Notice::for_language("de-DE", Severity::Warning, NoticeKind::AllSkipped { found: 5 }),
                Notice::for_language(
                    "fr-FR",
                    Severity::Warning,
                    NoticeKind::SomeSkipped { found: 5, exported: 3 }
                ),
            ]
        );
        assert!(!notices.iter().any(|n| n.kind == NoticeKind::NoItems));
    }

    #[test]
    fn test_nothing_exported_is_one_global_notice() {
        let notices = classify_languages([
            ("en-US", ExportRunStats::new(0, 0)),
            ("de-DE", ExportRunStats::new(4, 0)),
        ]);
        assert_eq!(notices, vec![Notice::global_no_items()]);
        assert_eq!(notices[0].language(), None);
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::for_language(
            "fr-FR",
            Severity::Warning,
            NoticeKind::SomeSkipped { found: 5, exported: 3 },
        );
        assert_eq!(
            notice.to_string(),
            "[fr-FR] 2 of 5 item(s) had no content and were skipped"
        );
    }
}
