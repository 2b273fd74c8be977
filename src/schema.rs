//! Typed API schema model and lookup helpers.
//!
//! A raw schema document (definitions keyed by versioned type name, `$ref`
//! pointers of the form `#/definitions/<name>`) is classified once into
//! [`PropertyNode`] values. Classification priority:
//! - `$ref` present: [`NodeShape::Reference`]
//! - `type: array` with `items`: [`NodeShape::ArrayOf`]
//! - `properties` present: [`NodeShape::InlineObject`]
//! - otherwise: [`NodeShape::Primitive`] (`type`, defaulting to `object`)
//!
//! A node that is not a JSON object (tuple-form `items`, boolean sub-schemas)
//! is kept as an opaque `object` primitive.

use std::fs;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::error::ExplainError;
use crate::inflect::singularize_versioned_name;

/// Namespace prefixes tried, in order, when looking up a top-level kind.
pub const KIND_NAMESPACES: &[&str] = &["v1.", "v1beta1."];

const DEFINITIONS_KEY: &str = "definitions";
const DEFAULT_TYPE: &str = "object";
const MAX_SCHEMA_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
/// A type or property definition.
///
/// A type definition is the node found by resolving a type name; it has the
/// same shape as a property definition.
pub struct PropertyNode {
    /// Prose description, if the schema carries one.
    pub description: Option<String>,
    /// Structural shape of the node.
    pub shape: NodeShape,
}

#[derive(Debug, Clone, PartialEq)]
/// Structural variants of a schema node.
pub enum NodeShape {
    /// Scalar or opaque type such as `string`, `integer`, or a free-form `object` map.
    Primitive { type_name: String },
    /// Object whose fields are enumerated inline.
    InlineObject {
        type_name: Option<String>,
        properties: Properties,
    },
    /// Pointer to another definition (`#/definitions/<name>`).
    Reference {
        type_name: Option<String>,
        target: String,
    },
    /// Array of the given element node.
    ArrayOf(Box<PropertyNode>),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Ordered property map, kept in document order.
pub struct Properties {
    entries: Vec<(String, PropertyNode)>,
}

impl Properties {
    /// Builds a property map from `(name, node)` pairs.
    pub fn new(entries: Vec<(String, PropertyNode)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, node)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Finds a property by name.
    ///
    /// Matching is case-insensitive. On a miss the last `.`-separated
    /// component of `name` is singularized and the lookup retried, until
    /// singularizing no longer changes the name.
    pub fn find_property(&self, name: &str) -> Option<&PropertyNode> {
        find_named(&self.entries, name)
    }
}

impl PropertyNode {
    /// Classifies a raw JSON schema node.
    pub fn from_json(value: &JsonValue) -> Result<Self, ExplainError> {
        classify_node(value, "$", 0)
    }

    /// Renders the type for display: `type`, arrays as `element[]`, `object` by default.
    pub fn type_desc(&self) -> String {
        match &self.shape {
            NodeShape::Primitive { type_name } => type_name.clone(),
            NodeShape::InlineObject { type_name, .. } | NodeShape::Reference { type_name, .. } => {
                type_name.as_deref().unwrap_or(DEFAULT_TYPE).to_string()
            }
            NodeShape::ArrayOf(items) => format!("{}[]", items.type_desc()),
        }
    }

    /// Returns the `$ref` this node points at, directly or through its array items.
    pub fn reference_target(&self) -> Option<&str> {
        match &self.shape {
            NodeShape::Reference { target, .. } => Some(target),
            NodeShape::ArrayOf(items) => match &items.shape {
                NodeShape::Reference { target, .. } => Some(target),
                _ => None,
            },
            _ => None,
        }
    }

    /// True when the node is reference-typed (direct `$ref` or array of `$ref`).
    pub fn is_reference(&self) -> bool {
        self.reference_target().is_some()
    }

    /// Inline child properties, if this node enumerates any.
    pub fn properties(&self) -> Option<&Properties> {
        match &self.shape {
            NodeShape::InlineObject { properties, .. } => Some(properties),
            _ => None,
        }
    }

    fn items(&self) -> Option<&PropertyNode> {
        match &self.shape {
            NodeShape::ArrayOf(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Parsed schema document: versioned type name to type definition.
pub struct SchemaDocument {
    definitions: Vec<(String, PropertyNode)>,
}

/// Lookup scope while chasing a `$ref` path.
enum Scope<'a> {
    Root,
    Definitions,
    Node(&'a PropertyNode),
    Properties(&'a Properties),
}

impl SchemaDocument {
    /// Builds a document from already-classified definitions.
    pub fn new(definitions: Vec<(String, PropertyNode)>) -> Self {
        Self { definitions }
    }

    /// Parses schema JSON text.
    pub fn from_json_str(input: &str) -> Result<Self, ExplainError> {
        let root: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(&root)
    }

    /// Reads and parses a schema JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExplainError> {
        let input = fs::read_to_string(path.as_ref()).map_err(|e| {
            ExplainError::SchemaError(format!(
                "failed to read '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_json_str(&input)
    }

    /// Classifies a parsed JSON document.
    ///
    /// Accepts either an object with a `definitions` map, or a bare map of
    /// definitions at the top level.
    pub fn from_json_value(root: &JsonValue) -> Result<Self, ExplainError> {
        let obj = root.as_object().ok_or_else(|| {
            ExplainError::SchemaError("schema document root must be an object".to_string())
        })?;

        let (defs, top_level): (&JsonMap<String, JsonValue>, bool) = match obj.get(DEFINITIONS_KEY) {
            Some(JsonValue::Object(defs)) => (defs, false),
            Some(_) => {
                return Err(ExplainError::SchemaError(
                    "schema 'definitions' must be an object".to_string(),
                ))
            }
            None => (obj, true),
        };

        let mut definitions = Vec::with_capacity(defs.len());
        for (name, def) in defs {
            // Bare documents may carry scalar metadata (`swagger: "2.0"`) next to definitions.
            if top_level && !def.is_object() {
                continue;
            }
            let node = classify_node(def, name, 0)?;
            definitions.push((name.clone(), node));
        }

        debug!(count = definitions.len(), "loaded schema definitions");
        Ok(Self { definitions })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Finds a definition by versioned type name (case-insensitive, singularize-on-miss).
    pub fn find_definition(&self, name: &str) -> Option<&PropertyNode> {
        find_named(&self.definitions, name)
    }

    /// Resolves a top-level kind under each of [`KIND_NAMESPACES`], first match wins.
    pub fn find_kind(&self, kind: &str) -> Option<&PropertyNode> {
        KIND_NAMESPACES
            .iter()
            .find_map(|ns| self.find_definition(&format!("{ns}{kind}")))
    }

    /// Follows a `$ref` path to the definition it names.
    ///
    /// The path is split on `/` and its first segment (`#`) dropped; each
    /// remaining segment is looked up in the current scope with
    /// [`Properties::find_property`] matching rules.
    pub fn find_type_definition(&self, reference: &str) -> Result<&PropertyNode, ExplainError> {
        let mut scope = Scope::Root;
        for segment in reference.split('/').skip(1) {
            let next = match scope {
                Scope::Root => {
                    if segment.to_lowercase() == DEFINITIONS_KEY {
                        Some(Scope::Definitions)
                    } else {
                        None
                    }
                }
                Scope::Definitions => self.find_definition(segment).map(Scope::Node),
                Scope::Node(node) => match segment.to_lowercase().as_str() {
                    "properties" => node.properties().map(Scope::Properties),
                    "items" => node.items().map(Scope::Node),
                    _ => None,
                },
                Scope::Properties(props) => props.find_property(segment).map(Scope::Node),
            };

            scope = next.ok_or_else(|| ExplainError::UnresolvableTypePath {
                reference: reference.to_string(),
                segment: segment.to_string(),
            })?;
        }

        match scope {
            Scope::Node(node) => Ok(node),
            _ => Err(ExplainError::UnresolvableTypePath {
                reference: reference.to_string(),
                segment: reference.rsplit('/').next().unwrap_or_default().to_string(),
            }),
        }
    }
}

fn find_named<'a>(entries: &'a [(String, PropertyNode)], name: &str) -> Option<&'a PropertyNode> {
    let mut sought = name.to_string();
    loop {
        let lowered = sought.to_lowercase();
        if let Some((_, node)) = entries.iter().find(|(n, _)| n.to_lowercase() == lowered) {
            return Some(node);
        }

        let singular = singularize_versioned_name(&sought);
        if singular == sought {
            return None;
        }
        sought = singular;
    }
}

fn classify_node(value: &JsonValue, path: &str, depth: usize) -> Result<PropertyNode, ExplainError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(ExplainError::SchemaError(format!(
            "schema nesting depth exceeds maximum ({MAX_SCHEMA_DEPTH}) at {path}"
        )));
    }

    let Some(obj) = value.as_object() else {
        debug!(path, "treating non-object schema node as opaque");
        return Ok(PropertyNode {
            description: None,
            shape: NodeShape::Primitive {
                type_name: DEFAULT_TYPE.to_string(),
            },
        });
    };

    let description = obj
        .get("description")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let type_name = obj.get("type").and_then(JsonValue::as_str);

    if let Some(target) = obj.get("$ref").and_then(JsonValue::as_str) {
        return Ok(PropertyNode {
            description,
            shape: NodeShape::Reference {
                type_name: type_name.map(str::to_string),
                target: target.to_string(),
            },
        });
    }

    if type_name == Some("array") {
        if let Some(items) = obj.get("items") {
            let items = classify_node(items, &format!("{path}.items"), depth + 1)?;
            return Ok(PropertyNode {
                description,
                shape: NodeShape::ArrayOf(Box::new(items)),
            });
        }
    }

    if let Some(props) = obj.get("properties").and_then(JsonValue::as_object) {
        let mut entries = Vec::with_capacity(props.len());
        for (name, prop) in props {
            let node = classify_node(prop, &format!("{path}.{name}"), depth + 1)?;
            entries.push((name.clone(), node));
        }
        return Ok(PropertyNode {
            description,
            shape: NodeShape::InlineObject {
                type_name: type_name.map(str::to_string),
                properties: Properties::new(entries),
            },
        });
    }

    Ok(PropertyNode {
        description,
        shape: NodeShape::Primitive {
            type_name: type_name.unwrap_or(DEFAULT_TYPE).to_string(),
        },
    })
}
