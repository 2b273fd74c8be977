//! Field-path resolution against a schema document.
//!
//! Walks `Kind.field.subfield...` one segment at a time:
//! - reference-typed node whose target enumerates properties: list them at
//!   the end of the path, otherwise descend into the next segment
//! - reference-typed node whose target is opaque: leaf with the target's
//!   type and the node's own description
//! - inline object: same two cases as a reference with properties
//! - anything else: leaf; trailing segments are ignored, as `kubectl explain`
//!   does for primitives and free-form maps

use std::iter::Peekable;

use tracing::{debug, warn};

use crate::explanation::{ExplainErrorKind, Explanation};
use crate::schema::{PropertyNode, SchemaDocument};

/// Splits a field path into `(kind, fields)` on every `.`.
///
/// Dots inside map keys are not distinguished from separators, so
/// `Deployment.metadata.annotations.deployment.kubernetes.io/revision`
/// yields five field segments after the kind.
pub fn split_field_path(field_path: &str) -> (&str, Vec<&str>) {
    let mut segments = field_path.split('.');
    let kind = segments.next().unwrap_or_default();
    (kind, segments.collect())
}

/// Builds the `kind[.field]` reference string used to query explain text.
pub fn field_reference(kind: &str, field: &str) -> String {
    if field.is_empty() {
        kind.to_string()
    } else {
        format!("{kind}.{field}")
    }
}

/// Resolves a dotted field path to an explanation.
///
/// Never fails: a missing kind, missing field, or dangling `$ref` is returned
/// as [`Explanation::Error`].
pub fn resolve_field(schema: &SchemaDocument, field_path: &str) -> Explanation {
    let (kind, fields) = split_field_path(field_path);

    let Some(kind_def) = schema.find_kind(kind) else {
        debug!(kind, "kind not found in schema");
        return Explanation::error(kind, ExplainErrorKind::KindNotFound);
    };

    chase_field_path(schema, kind_def, kind, fields.into_iter().peekable())
}

fn chase_field_path<'s, 'p, I>(
    schema: &'s SchemaDocument,
    start: &'s PropertyNode,
    start_name: &'p str,
    mut fields: Peekable<I>,
) -> Explanation
where
    I: Iterator<Item = &'p str>,
{
    let mut current = start;
    let mut name = start_name;

    loop {
        let properties = match current.reference_target() {
            Some(target) => {
                let referenced = match schema.find_type_definition(target) {
                    Ok(node) => node,
                    Err(err) => {
                        warn!(field = name, %err, "failed to chase type reference");
                        return Explanation::error(
                            target,
                            ExplainErrorKind::UnresolvableTypeReference,
                        );
                    }
                };

                let Some(properties) = referenced.properties() else {
                    return Explanation::leaf(
                        name,
                        referenced.type_desc(),
                        current.description.as_deref(),
                    );
                };

                if fields.peek().is_none() {
                    return Explanation::compound(
                        name,
                        current.description.as_deref(),
                        Some(referenced),
                        properties,
                    );
                }
                properties
            }
            None => {
                let Some(properties) = current.properties() else {
                    return Explanation::leaf(
                        name,
                        current.type_desc(),
                        current.description.as_deref(),
                    );
                };

                if fields.peek().is_none() {
                    return Explanation::compound(
                        name,
                        current.description.as_deref(),
                        None,
                        properties,
                    );
                }
                properties
            }
        };

        let Some(next_field) = fields.next() else {
            unreachable!("end of path handled above");
        };

        match properties.find_property(next_field) {
            Some(next) => {
                debug!(from = name, to = next_field, "descending into field");
                current = next;
                name = next_field;
            }
            None => {
                return Explanation::error(next_field, ExplainErrorKind::FieldDoesNotExist);
            }
        }
    }
}
