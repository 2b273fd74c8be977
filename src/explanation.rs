//! Explanation values produced by field resolution, and their markdown form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExplainError;
use crate::schema::{Properties, PropertyNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Reasons a field path could not be explained.
pub enum ExplainErrorKind {
    /// The kind is absent under every recognized namespace.
    KindNotFound,
    /// A `$ref` could not be followed to a definition.
    UnresolvableTypeReference,
    /// A path segment matched no property at its traversal point.
    FieldDoesNotExist,
}

impl ExplainErrorKind {
    /// User-facing message for this error.
    pub fn message(self) -> &'static str {
        match self {
            ExplainErrorKind::KindNotFound => "kind not found",
            ExplainErrorKind::UnresolvableTypeReference => "unresolvable type reference",
            ExplainErrorKind::FieldDoesNotExist => "field does not exist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One child entry of a compound explanation.
pub struct FieldSummary {
    pub name: String,
    pub type_desc: String,
    pub description: Option<String>,
}

impl FieldSummary {
    fn from_node(name: &str, node: &PropertyNode) -> Self {
        Self {
            name: name.to_string(),
            type_desc: node.type_desc(),
            description: node.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The `$ref` target a compound field's children were listed from.
pub struct ReferencedType {
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Result of resolving a field path against a schema.
pub enum Explanation {
    /// Terminal primitive or opaque field.
    Leaf {
        name: String,
        type_desc: String,
        description: Option<String>,
    },
    /// Field whose type enumerates child properties.
    Compound {
        name: String,
        /// The field's own description.
        description: Option<String>,
        /// Referenced type; `None` for inline objects.
        referenced_type: Option<ReferencedType>,
        children: Vec<FieldSummary>,
    },
    /// Resolution failure, reported as data.
    Error {
        header: String,
        error: ExplainErrorKind,
    },
}

impl Explanation {
    pub(crate) fn leaf(name: &str, type_desc: String, description: Option<&str>) -> Self {
        Explanation::Leaf {
            name: name.to_string(),
            type_desc,
            description: description.map(str::to_string),
        }
    }

    pub(crate) fn compound(
        name: &str,
        description: Option<&str>,
        referenced: Option<&PropertyNode>,
        properties: &Properties,
    ) -> Self {
        Explanation::Compound {
            name: name.to_string(),
            description: description.map(str::to_string),
            referenced_type: referenced.map(|node| ReferencedType {
                description: node.description.clone(),
            }),
            children: properties
                .iter()
                .map(|(child, node)| FieldSummary::from_node(child, node))
                .collect(),
        }
    }

    pub(crate) fn error(header: &str, error: ExplainErrorKind) -> Self {
        Explanation::Error {
            header: header.to_string(),
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Explanation::Error { .. })
    }

    /// Renders the explanation as lightly marked-up text (`**bold**` and newlines).
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }

    /// Serializes the explanation to JSON text.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, ExplainError> {
        let out = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        out.map_err(|e| ExplainError::SerializationError(e.to_string()))
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Explanation::Leaf {
                name,
                type_desc,
                description,
            } => write!(
                f,
                "**{name}** ({type_desc})\n\n{}",
                description.as_deref().unwrap_or_default()
            ),
            Explanation::Compound {
                name,
                description,
                referenced_type,
                children,
            } => {
                write!(f, "{name}: {}\n\n", description.as_deref().unwrap_or_default())?;
                if let Some(referenced) = referenced_type {
                    write!(f, "{}\n\n", referenced.description.as_deref().unwrap_or_default())?;
                }
                for child in children {
                    write!(
                        f,
                        "**{}** ({})\n\n{}\n\n",
                        child.name,
                        child.type_desc,
                        child.description.as_deref().unwrap_or_default()
                    )?;
                }
                Ok(())
            }
            Explanation::Error { header, error } => {
                write!(f, "**{header}:** {}", error.message())
            }
        }
    }
}
