pub mod error;
pub mod explain_text;
pub mod explanation;
pub mod inflect;
pub mod resolver;
pub mod schema;
pub mod session;

pub use error::ExplainError;
pub use explain_text::{format_explain, FormattedExplain};
pub use explanation::{ExplainErrorKind, Explanation, FieldSummary, ReferencedType};
pub use resolver::{field_reference, resolve_field, split_field_path};
pub use schema::{NodeShape, Properties, PropertyNode, SchemaDocument};
pub use session::{
    Documentation, DocumentationBackend, ExplainSession, FileSchemaProvider, MapTextProvider,
    SchemaProvider, StaticSchemaProvider, TextProvider,
};

/// Loads a schema JSON document and resolves `field_path` against it.
pub fn explain_field_from_json(
    schema_json: &str,
    field_path: &str,
) -> Result<Explanation, ExplainError> {
    let schema = SchemaDocument::from_json_str(schema_json)?;
    Ok(resolve_field(&schema, field_path))
}

#[cfg(test)]
mod tests {
    use crate::{explain_field_from_json, format_explain, ExplainErrorKind, Explanation};

    const SCHEMA: &str = r#"{
        "definitions": {
            "v1.ConfigMap": {
                "description": "ConfigMap holds configuration data.",
                "properties": {
                    "data": {
                        "type": "object",
                        "description": "Data contains the configuration data."
                    }
                }
            }
        }
    }"#;

    #[test]
    fn explains_field_from_schema_json() {
        let explanation = explain_field_from_json(SCHEMA, "ConfigMap.data").unwrap();
        assert_eq!(
            explanation.to_markdown(),
            "**data** (object)\n\nData contains the configuration data."
        );
    }

    #[test]
    fn missing_kind_is_reported_as_data() {
        let explanation = explain_field_from_json(SCHEMA, "Secret.data").unwrap();
        assert_eq!(
            explanation,
            Explanation::Error {
                header: "Secret".to_string(),
                error: ExplainErrorKind::KindNotFound,
            }
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = explain_field_from_json("{not json", "ConfigMap").unwrap_err();
        assert!(err.to_string().contains("json error"));
    }

    #[test]
    fn formats_single_field_text() {
        assert_eq!(
            format_explain("FIELD: apiVersion").as_str(),
            "**FIELD:** apiVersion"
        );
    }
}
