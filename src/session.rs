//! Explain sessions: documentation backends and per-session caching.
//!
//! A session is started when the explain feature is switched on and ends
//! when it is switched off. The schema document is fetched at most once per
//! session, and raw explain text once per reference string. Ending the
//! session drops everything cached.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExplainError;
use crate::explain_text::{format_explain, FormattedExplain};
use crate::explanation::Explanation;
use crate::resolver::{field_reference, resolve_field};
use crate::schema::SchemaDocument;

/// Source of a parsed schema document.
pub trait SchemaProvider {
    /// Fetches and parses the schema document.
    fn fetch_schema(&self) -> Result<SchemaDocument, ExplainError>;
}

/// Source of raw `explain` text for a `kind[.field]` reference.
pub trait TextProvider {
    /// Returns the plain-text explanation for `reference`.
    fn explain_text(&self, reference: &str) -> Result<String, ExplainError>;
}

#[derive(Debug, Clone)]
/// [`SchemaProvider`] returning an in-memory document.
pub struct StaticSchemaProvider {
    schema: SchemaDocument,
}

impl StaticSchemaProvider {
    pub fn new(schema: SchemaDocument) -> Self {
        Self { schema }
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn fetch_schema(&self) -> Result<SchemaDocument, ExplainError> {
        Ok(self.schema.clone())
    }
}

#[derive(Debug, Clone)]
/// [`SchemaProvider`] reading a JSON schema document from disk.
pub struct FileSchemaProvider {
    path: PathBuf,
}

impl FileSchemaProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaProvider for FileSchemaProvider {
    fn fetch_schema(&self) -> Result<SchemaDocument, ExplainError> {
        SchemaDocument::from_path(&self.path)
    }
}

#[derive(Debug, Clone, Default)]
/// [`TextProvider`] backed by a caller-provided map of reference to text.
pub struct MapTextProvider {
    texts: HashMap<String, String>,
}

impl MapTextProvider {
    /// Creates a new map-backed provider.
    pub fn new(texts: HashMap<String, String>) -> Self {
        Self { texts }
    }
}

impl TextProvider for MapTextProvider {
    fn explain_text(&self, reference: &str) -> Result<String, ExplainError> {
        self.texts.get(reference).cloned().ok_or_else(|| {
            ExplainError::ProviderError(format!("no explain text for '{reference}'"))
        })
    }
}

/// Which documentation source a session draws on.
pub enum DocumentationBackend {
    /// Structured schema, explained by [`resolve_field`].
    Schema(Box<dyn SchemaProvider>),
    /// Raw explain text, reformatted by [`format_explain`].
    Text(Box<dyn TextProvider>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
/// Field documentation returned by [`ExplainSession::explain`].
pub enum Documentation {
    /// The explain feature is switched off.
    Inactive,
    Schema(Explanation),
    Text(FormattedExplain),
}

impl Documentation {
    /// Markup text for display; empty when inactive.
    pub fn to_markdown(&self) -> String {
        match self {
            Documentation::Inactive => String::new(),
            Documentation::Schema(explanation) => explanation.to_markdown(),
            Documentation::Text(formatted) => formatted.as_str().to_string(),
        }
    }
}

/// Explain feature state plus the documents cached while it is on.
pub struct ExplainSession {
    backend: DocumentationBackend,
    active: bool,
    schema: Option<SchemaDocument>,
    texts: HashMap<String, String>,
}

impl ExplainSession {
    /// Creates an inactive session over `backend`.
    pub fn new(backend: DocumentationBackend) -> Self {
        Self {
            backend,
            active: false,
            schema: None,
            texts: HashMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Switches the feature off and drops all cached documents.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.schema = None;
        self.texts.clear();
        debug!("explain session ended; cache cleared");
    }

    /// Flips the feature state and returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.active {
            self.deactivate();
        } else {
            self.activate();
        }
        self.active
    }

    /// Explains `field` of an object of `kind`.
    ///
    /// `field` is the dotted path below the kind; an empty field, or the
    /// literal `kind` field, explains the kind itself. Provider failures are
    /// returned as errors and leave nothing cached.
    pub fn explain(&mut self, kind: &str, field: &str) -> Result<Documentation, ExplainError> {
        if !self.active {
            return Ok(Documentation::Inactive);
        }

        let field = if field == "kind" { "" } else { field };
        let reference = field_reference(kind, field);

        if matches!(self.backend, DocumentationBackend::Schema(_)) {
            let schema = self.cached_schema()?;
            Ok(Documentation::Schema(resolve_field(schema, &reference)))
        } else {
            let raw = self.cached_text(&reference)?;
            Ok(Documentation::Text(format_explain(&raw)))
        }
    }

    /// Returns the session's schema document, fetching it on first use.
    pub fn cached_schema(&mut self) -> Result<&SchemaDocument, ExplainError> {
        let DocumentationBackend::Schema(provider) = &self.backend else {
            return Err(ExplainError::ProviderError(
                "session backend does not supply a schema".to_string(),
            ));
        };

        let schema = match self.schema.take() {
            Some(schema) => {
                debug!("schema cache hit");
                schema
            }
            None => {
                debug!("fetching schema for explain session");
                provider.fetch_schema().inspect_err(|err| {
                    warn!(%err, "schema fetch failed");
                })?
            }
        };
        Ok(self.schema.insert(schema))
    }

    fn cached_text(&mut self, reference: &str) -> Result<String, ExplainError> {
        let DocumentationBackend::Text(provider) = &self.backend else {
            return Err(ExplainError::ProviderError(
                "session backend does not supply explain text".to_string(),
            ));
        };

        if let Some(text) = self.texts.get(reference) {
            debug!(reference, "explain text cache hit");
            return Ok(text.clone());
        }

        let text = provider.explain_text(reference).inspect_err(|err| {
            warn!(reference, %err, "explain text fetch failed");
        })?;
        self.texts.insert(reference.to_string(), text.clone());
        Ok(text)
    }
}
