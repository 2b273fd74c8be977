use serde_json::json;

use kube_explain::{resolve_field, ExplainErrorKind, Explanation, SchemaDocument};

fn fixture_schema() -> SchemaDocument {
    SchemaDocument::from_json_value(&json!({
        "swagger": "2.0",
        "definitions": {
            "v1beta1.Deployment": {
                "description": "Deployment enables declarative updates for Pods and ReplicaSets.",
                "properties": {
                    "apiVersion": {
                        "type": "string",
                        "description": "APIVersion defines the versioned schema of this representation."
                    },
                    "metadata": {
                        "$ref": "#/definitions/v1.ObjectMeta",
                        "description": "Standard object metadata."
                    },
                    "status": {
                        "description": "Most recently observed status of the Deployment.",
                        "properties": {
                            "replicas": {
                                "type": "integer",
                                "description": "Total number of non-terminated pods."
                            },
                            "conditions": {
                                "type": "array",
                                "description": "Represents the latest available observations.",
                                "items": {
                                    "properties": { "type": { "type": "string" } }
                                }
                            }
                        }
                    },
                    "broken": {
                        "$ref": "#/definitions/v1.Missing",
                        "description": "Points nowhere."
                    }
                }
            },
            "v1.ObjectMeta": {
                "description": "ObjectMeta is metadata that all persisted resources must have.",
                "properties": {
                    "annotations": {
                        "type": "object",
                        "description": "Annotations is an unstructured key value map."
                    },
                    "creationTimestamp": {
                        "$ref": "#/definitions/v1.Time",
                        "description": "CreationTimestamp is a timestamp representing the server time."
                    },
                    "generation": {
                        "type": "integer",
                        "description": "A sequence number representing a specific generation of the desired state."
                    },
                    "finalizers": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Must be empty before the object is deleted from the registry."
                    }
                }
            },
            "v1.Time": {
                "type": "string",
                "format": "date-time",
                "description": "Time is a wrapper around time.Time."
            },
            "v1.Pod": {
                "description": "Pod is a collection of containers.",
                "properties": {
                    "spec": {
                        "$ref": "#/definitions/v1.PodSpec",
                        "description": "Specification of the desired behavior of the pod."
                    }
                }
            },
            "v1.PodSpec": {
                "description": "PodSpec is a description of a pod.",
                "properties": {
                    "volumes": {
                        "type": "array",
                        "items": { "$ref": "#/definitions/v1.Volume" },
                        "description": "List of volumes that can be mounted."
                    }
                }
            },
            "v1.Volume": {
                "description": "Volume represents a named volume in a pod.",
                "properties": {
                    "name": { "type": "string", "description": "Volume's name." }
                }
            },
            "v1.Job": {
                "description": "Stable job.",
                "properties": {}
            },
            "v1beta1.Job": {
                "description": "Beta job.",
                "properties": {}
            },
            "v1.JSONSchemaProps": {
                "description": "JSONSchemaProps is a JSON-Schema following Specification Draft 4.",
                "properties": {
                    "not": { "$ref": "#/definitions/v1.JSONSchemaProps" }
                }
            }
        }
    }))
    .unwrap()
}

#[test]
fn primitive_leaf_under_referenced_type() {
    let schema = fixture_schema();
    let text = resolve_field(&schema, "Deployment.metadata.generation").to_markdown();
    assert!(text.starts_with("**generation** (integer)"));
    assert!(text.contains("A sequence number"));
}

#[test]
fn trailing_segment_after_primitive_is_ignored() {
    let schema = fixture_schema();
    let short = resolve_field(&schema, "Deployment.metadata.generation");
    let long = resolve_field(&schema, "Deployment.metadata.generation.biscuits");
    assert_eq!(short, long);
}

#[test]
fn missing_field_echoes_segment() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment.metadata.biscuits");
    assert!(explanation.is_error());
    assert!(explanation
        .to_markdown()
        .starts_with("**biscuits:** field does not exist"));
}

#[test]
fn missing_field_keeps_segment_case() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment.status.ReadyReplicas");
    assert_eq!(
        explanation,
        Explanation::Error {
            header: "ReadyReplicas".to_string(),
            error: ExplainErrorKind::FieldDoesNotExist,
        }
    );
}

#[test]
fn kind_lookup_is_case_insensitive() {
    let schema = fixture_schema();
    assert_eq!(
        resolve_field(&schema, "deployment.metadata"),
        resolve_field(&schema, "Deployment.metadata")
    );
}

#[test]
fn kind_lookup_tolerates_plural_kind() {
    let schema = fixture_schema();
    assert_eq!(
        resolve_field(&schema, "Deployments.metadata"),
        resolve_field(&schema, "Deployment.metadata")
    );
}

#[test]
fn kind_prefers_v1_over_v1beta1() {
    let schema = fixture_schema();
    let text = resolve_field(&schema, "Job").to_markdown();
    assert_eq!(text, "Job: Stable job.\n\n");
}

#[test]
fn unknown_kind_is_reported() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Biscuit.metadata");
    assert_eq!(
        explanation.to_markdown(),
        "**Biscuit:** kind not found"
    );
}

#[test]
fn compound_reference_lists_referenced_type_properties() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment.metadata");

    let Explanation::Compound {
        name,
        description,
        referenced_type,
        children,
    } = &explanation
    else {
        panic!("expected compound explanation, got {explanation:?}");
    };

    assert_eq!(name, "metadata");
    assert_eq!(description.as_deref(), Some("Standard object metadata."));
    assert_eq!(
        referenced_type.as_ref().and_then(|t| t.description.as_deref()),
        Some("ObjectMeta is metadata that all persisted resources must have.")
    );
    let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["annotations", "creationTimestamp", "generation", "finalizers"]
    );
    let types: Vec<&str> = children.iter().map(|c| c.type_desc.as_str()).collect();
    assert_eq!(types, vec!["object", "object", "integer", "string[]"]);

    assert!(explanation.to_markdown().starts_with(
        "metadata: Standard object metadata.\n\nObjectMeta is metadata that all persisted resources must have.\n\n**annotations** (object)\n\n"
    ));
}

#[test]
fn kind_alone_lists_inline_properties() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment");
    let Explanation::Compound {
        name,
        referenced_type,
        children,
        ..
    } = explanation
    else {
        panic!("expected compound explanation");
    };
    assert_eq!(name, "Deployment");
    assert_eq!(referenced_type, None);
    assert_eq!(children.len(), 4);
}

#[test]
fn reference_to_opaque_type_uses_property_description() {
    let schema = fixture_schema();
    let text = resolve_field(&schema, "Deployment.metadata.creationTimestamp").to_markdown();
    assert_eq!(
        text,
        "**creationTimestamp** (string)\n\nCreationTimestamp is a timestamp representing the server time."
    );
}

#[test]
fn free_form_map_is_explained_as_a_whole() {
    let schema = fixture_schema();
    let expected = resolve_field(&schema, "Deployment.metadata.annotations");
    let keyed = resolve_field(
        &schema,
        "Deployment.metadata.annotations.deployment.kubernetes.io/revision",
    );
    assert_eq!(keyed, expected);
    assert!(expected
        .to_markdown()
        .starts_with("**annotations** (object)"));
}

#[test]
fn inline_object_descends_into_children() {
    let schema = fixture_schema();
    let text = resolve_field(&schema, "Deployment.status.replicas").to_markdown();
    assert_eq!(
        text,
        "**replicas** (integer)\n\nTotal number of non-terminated pods."
    );
}

#[test]
fn array_of_inline_objects_is_a_leaf() {
    let schema = fixture_schema();
    let text = resolve_field(&schema, "Deployment.status.conditions.type").to_markdown();
    assert!(text.starts_with("**conditions** (object[])"));
}

#[test]
fn array_of_reference_resolves_item_type() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Pod.spec.volumes");
    let text = explanation.to_markdown();
    assert!(text.starts_with(
        "volumes: List of volumes that can be mounted.\n\nVolume represents a named volume in a pod.\n\n"
    ));
    assert!(text.contains("**name** (string)\n\nVolume's name."));

    let leaf = resolve_field(&schema, "pod.Spec.Volumes.NAME").to_markdown();
    assert_eq!(leaf, "**NAME** (string)\n\nVolume's name.");
}

#[test]
fn dangling_reference_is_reported() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment.broken");
    assert_eq!(
        explanation,
        Explanation::Error {
            header: "#/definitions/v1.Missing".to_string(),
            error: ExplainErrorKind::UnresolvableTypeReference,
        }
    );
    assert_eq!(
        explanation.to_markdown(),
        "**#/definitions/v1.Missing:** unresolvable type reference"
    );
}

#[test]
fn self_referential_type_terminates() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "JSONSchemaProps.not.not.not");
    let Explanation::Compound { name, children, .. } = explanation else {
        panic!("expected compound explanation");
    };
    assert_eq!(name, "not");
    assert_eq!(children.len(), 1);
}

#[test]
fn empty_trailing_segment_is_a_missing_field() {
    let schema = fixture_schema();
    let explanation = resolve_field(&schema, "Deployment.");
    assert_eq!(explanation.to_markdown(), "**:** field does not exist");
}

#[test]
fn top_level_definitions_shape_is_accepted() {
    let schema = SchemaDocument::from_json_value(&json!({
        "v1.ConfigMap": {
            "description": "ConfigMap holds configuration data.",
            "properties": {
                "data": { "type": "object", "description": "Configuration data." }
            }
        }
    }))
    .unwrap();

    let text = resolve_field(&schema, "ConfigMap.data").to_markdown();
    assert_eq!(text, "**data** (object)\n\nConfiguration data.");
}

#[test]
fn top_level_shape_skips_scalar_metadata() {
    let schema = SchemaDocument::from_json_value(&json!({
        "swagger": "2.0",
        "v1.Secret": {
            "properties": { "type": { "type": "string", "description": "Used to facilitate programmatic handling." } }
        }
    }))
    .unwrap();

    assert_eq!(schema.len(), 1);
    let text = resolve_field(&schema, "Secret.type").to_markdown();
    assert_eq!(text, "**type** (string)\n\nUsed to facilitate programmatic handling.");
}

#[test]
fn non_object_definitions_map_is_rejected() {
    let err = SchemaDocument::from_json_value(&json!({ "definitions": [] })).unwrap_err();
    assert!(err.to_string().contains("'definitions' must be an object"));
}

#[test]
fn odd_nodes_do_not_block_other_paths() {
    let schema = SchemaDocument::from_json_value(&json!({
        "definitions": {
            "v1.Pod": {
                "properties": {
                    "name": { "type": "string", "description": "Pod name." },
                    "odd": { "type": "array", "items": [{ "type": "string" }] },
                    "flag": true
                }
            }
        }
    }))
    .unwrap();

    assert_eq!(
        resolve_field(&schema, "Pod.name").to_markdown(),
        "**name** (string)\n\nPod name."
    );
    assert_eq!(
        resolve_field(&schema, "Pod.odd").to_markdown(),
        "**odd** (object[])\n\n"
    );
    assert_eq!(
        resolve_field(&schema, "Pod.flag").to_markdown(),
        "**flag** (object)\n\n"
    );
}
