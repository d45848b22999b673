//! Credential pre-validation
//!
//! Before the export form is offered, the supplied key is checked in a fixed
//! order: secure access, preview, type listing, language listing. The first
//! failing step decides which remediation message the user sees.

use tracing::{debug, info};

use crate::error::{CredentialError, Result, SchemaError};

use super::{ContentRepository, ContentTypeSchema, LanguageDescriptor};

/// Resolved environment identifier and API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub environment_id: String,
    pub api_key: String,
}

impl Credentials {
    /// Check that both values are present and the environment id is well formed
    pub fn resolve(
        environment_id: Option<&str>,
        api_key: Option<&str>,
    ) -> std::result::Result<Self, CredentialError> {
        let environment_id = environment_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(CredentialError::MissingEnvironmentId)?;

        uuid::Uuid::parse_str(environment_id)
            .map_err(|_| CredentialError::InvalidEnvironmentId(environment_id.to_string()))?;

        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CredentialError::MissingApiKey)?;

        Ok(Self {
            environment_id: environment_id.to_lowercase(),
            api_key: api_key.to_string(),
        })
    }
}

/// What a successful probe learned about the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub content_types: Vec<ContentTypeSchema>,
    pub languages: Vec<LanguageDescriptor>,
}

impl ProbeReport {
    /// Display name for a language codename, falling back to the codename
    pub fn language_name<'a>(&'a self, codename: &'a str) -> &'a str {
        self.languages
            .iter()
            .find(|l| l.codename == codename)
            .map(|l| l.name.as_str())
            .unwrap_or(codename)
    }
}

/// Run the pre-validation sequence against a repository
///
/// # Arguments
/// * `repository` - Repository built from the supplied credentials
///
/// # Returns
/// * `Result<ProbeReport>` - Types and languages, or the first failing check
pub async fn probe<R: ContentRepository + ?Sized>(repository: &R) -> Result<ProbeReport> {
    let environment_id = repository.environment_id().to_string();

    debug!("Probing secure access for {}", environment_id);
    repository
        .secure_access_test()
        .await
        .map_err(|e| CredentialError::SecureAccessDenied(e.message()))?;

    debug!("Probing preview access for {}", environment_id);
    repository
        .preview_test()
        .await
        .map_err(|e| CredentialError::PreviewDenied(e.message()))?;

    let content_types = repository
        .fetch_types()
        .await
        .map_err(|e| CredentialError::TypesUnavailable(e.message()))?;
    if content_types.is_empty() {
        return Err(SchemaError::NoContentTypes { environment_id }.into());
    }

    let languages = repository
        .fetch_languages()
        .await
        .map_err(|e| CredentialError::LanguagesUnavailable(e.message()))?;
    if languages.is_empty() {
        return Err(SchemaError::NoLanguages { environment_id }.into());
    }

    info!(
        "Environment {} has {} content type(s) and {} language(s)",
        environment_id,
        content_types.len(),
        languages.len()
    );

    Ok(ProbeReport {
        content_types,
        languages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, RepositoryError};
    use crate::model::ElementType;
    use crate::repository::{FetchedItems, ItemQuery};
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    /// Repository whose checks fail at a chosen step
    #[derive(Default)]
    struct StubRepository {
        deny_secure: bool,
        deny_preview: bool,
        types: Vec<ContentTypeSchema>,
        languages: Vec<LanguageDescriptor>,
    }

    #[async_trait]
    impl ContentRepository for StubRepository {
        fn environment_id(&self) -> &str {
            "975bf280-fd91-488c-994c-2f04416e5ee3"
        }

        async fn fetch_items(&self, _query: &ItemQuery) -> std::result::Result<FetchedItems, RepositoryError> {
            Ok(FetchedItems::default())
        }

        async fn fetch_types(&self) -> std::result::Result<Vec<ContentTypeSchema>, RepositoryError> {
            Ok(self.types.clone())
        }

        async fn fetch_languages(&self) -> std::result::Result<Vec<LanguageDescriptor>, RepositoryError> {
            Ok(self.languages.clone())
        }

        async fn secure_access_test(&self) -> std::result::Result<(), RepositoryError> {
            if self.deny_secure {
                Err(RepositoryError::Request("secure access is disabled".into()))
            } else {
                Ok(())
            }
        }

        async fn preview_test(&self) -> std::result::Result<(), RepositoryError> {
            if self.deny_preview {
                Err(RepositoryError::Request("preview is disabled".into()))
            } else {
                Ok(())
            }
        }
    }

    fn ready() -> StubRepository {
        StubRepository {
            types: vec![ContentTypeSchema {
                id: "t1".into(),
                codename: "article".into(),
                name: "Article".into(),
                elements: vec![("title".into(), ElementType::Text)],
            }],
            languages: vec![LanguageDescriptor {
                id: "l1".into(),
                codename: "en-US".into(),
                name: "English".into(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_probe_success() {
        let report = assert_ok!(probe(&ready()).await);
        assert_eq!(report.content_types.len(), 1);
        assert_eq!(report.language_name("en-US"), "English");
        assert_eq!(report.language_name("fr-FR"), "fr-FR");
    }

    #[tokio::test]
    async fn test_probe_stops_at_first_failure() {
        let repository = StubRepository {
            deny_secure: true,
            deny_preview: true,
            ..ready()
        };
        match assert_err!(probe(&repository).await) {
            ExportError::Credential(CredentialError::SecureAccessDenied(msg)) => {
                assert_eq!(msg, "secure access is disabled")
            }
            other => panic!("unexpected error: {other}"),
        }

        let repository = StubRepository {
            deny_preview: true,
            ..ready()
        };
        assert!(matches!(
            probe(&repository).await,
            Err(ExportError::Credential(CredentialError::PreviewDenied(_)))
        ));
    }

    #[tokio::test]
    async fn test_probe_requires_schema() {
        let repository = StubRepository {
            types: Vec::new(),
            ..ready()
        };
        assert!(matches!(
            probe(&repository).await,
            Err(ExportError::Schema(SchemaError::NoContentTypes { .. }))
        ));

        let repository = StubRepository {
            languages: Vec::new(),
            ..ready()
        };
        assert!(matches!(
            probe(&repository).await,
            Err(ExportError::Schema(SchemaError::NoLanguages { .. }))
        ));
    }

    #[test]
    fn test_resolve_credentials() {
        let creds = Credentials::resolve(
            Some(" 975BF280-FD91-488C-994C-2F04416E5EE3 "),
            Some("key"),
        )
        .unwrap();
        assert_eq!(creds.environment_id, "975bf280-fd91-488c-994c-2f04416e5ee3");
    }

    #[test]
    fn test_resolve_reports_each_problem() {
        assert_eq!(
            Credentials::resolve(None, Some("key")),
            Err(CredentialError::MissingEnvironmentId)
        );
        assert_eq!(
            Credentials::resolve(Some("my-project"), Some("key")),
            Err(CredentialError::InvalidEnvironmentId("my-project".into()))
        );
        assert_eq!(
            Credentials::resolve(Some("975bf280-fd91-488c-994c-2f04416e5ee3"), Some("")),
            Err(CredentialError::MissingApiKey)
        );
    }
}
