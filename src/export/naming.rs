//! File, sheet and archive entry names
//!
//! Names must be deterministic for the same input and must never collide
//! inside one workbook or archive.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const DATE_FORMAT: &str = "%Y-%m-%d";

static DISALLOWED_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("Invalid name regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("Invalid hyphen regex"));

/// Make a language display name safe for file names
///
/// # Arguments
/// * `name` - Language display name, e.g. `Español (Spain)`
/// * `codename` - Fallback when nothing survives sanitizing
///
/// # Returns
/// * `String` - e.g. `Espaol-Spain`
pub fn sanitize_language_name(name: &str, codename: &str) -> String {
    let stripped = DISALLOWED_NAME_CHARS.replace_all(name, "");
    let hyphenated = WHITESPACE_RUN.replace_all(stripped.trim(), "-");
    let collapsed = HYPHEN_RUN.replace_all(&hyphenated, "-");
    let sanitized = collapsed.trim_matches('-');

    if sanitized.is_empty() {
        codename.to_string()
    } else {
        sanitized.to_string()
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `{env}-{language}-export-{date}.xlsx`
pub fn workbook_file_name(environment_id: &str, language: &str, date: NaiveDate) -> String {
    format!("{environment_id}-{language}-export-{}.xlsx", format_date(date))
}

/// `{env}-export-{date}.zip`
pub fn archive_file_name(environment_id: &str, date: NaiveDate) -> String {
    format!("{environment_id}-export-{}.zip", format_date(date))
}

/// Strip characters Excel rejects in sheet names and cut to the length limit
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();

    if truncated.trim().is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// Hands out names that are unique ignoring case.
///
/// A name already taken gets a `~N` suffix; `max_len` keeps the suffixed
/// name within limits by shortening the base.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
    max_len: Option<usize>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            taken: HashSet::new(),
            max_len: Some(max_len),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    /// Reserve `name`, or the first free suffixed variant of it
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_lowercase()) {
            return name.to_string();
        }

        let (stem, extension) = split_extension(name);
        let mut n = 2;
        loop {
            let suffix = format!("~{n}{extension}");
            let stem = match self.max_len {
                Some(max) => {
                    let keep = max.saturating_sub(suffix.chars().count());
                    stem.chars().take(keep).collect::<String>()
                }
                None => stem.to_string(),
            };
            let candidate = format!("{stem}{suffix}");
            if self.taken.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Split `dir/name.ext` into `dir/name` and `.ext`
fn split_extension(name: &str) -> (&str, &str) {
    let file_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => name.split_at(file_start + dot),
        _ => (name, ""),
    }
}
