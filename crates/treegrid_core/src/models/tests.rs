//! Model-level unit tests.

#[cfg(test)]
mod model_tests {
    use super::super::*;
    use crate::AppError;
    use serde_json::{json, Value};

    #[test]
    fn record_serializes_as_single_flat_object() {
        let record = record::Record::with_parent("1-1", Some("1"))
            .field("name", "Child")
            .field("budget", 500);
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            value,
            json!({"id": "1-1", "parentId": "1", "name": "Child", "budget": 500})
        );
    }

    #[test]
    fn record_deserializes_missing_or_null_parent_as_root() {
        let explicit: record::Record =
            serde_json::from_value(json!({"id": "a", "parentId": null, "x": 1})).expect("null");
        let missing: record::Record =
            serde_json::from_value(json!({"id": "b", "tags": ["t"]})).expect("missing");
        assert!(explicit.is_root());
        assert!(missing.is_root());
        assert_eq!(explicit.fields.get("x"), Some(&json!(1)));
        assert!(!missing.fields.contains_key("parentId"));
    }

    #[test]
    fn column_type_uses_kebab_case_tags() {
        let column = column::ColumnDescriptor {
            select_all: Some(true),
            ..column::ColumnDescriptor::new("tags", "Tags", column::ColumnType::MultiChoice)
        };
        let value = serde_json::to_value(&column).expect("serialize");
        assert_eq!(value["type"], "multi-choice");
        assert_eq!(value["selectAll"], true);
        assert!(value.get("width").is_none());
        assert!(column.select_all_enabled());
    }

    #[test]
    fn select_all_is_ignored_for_non_multi_choice_columns() {
        let column = column::ColumnDescriptor {
            select_all: Some(true),
            ..column::ColumnDescriptor::new("status", "Status", column::ColumnType::SingleChoice)
        };
        assert!(!column.select_all_enabled());
    }

    #[test]
    fn validate_columns_rejects_duplicates_and_empty_fields() {
        let name = column::ColumnDescriptor::new("name", "Name", column::ColumnType::PlainText);
        assert!(column::validate_columns(&[name.clone()]).is_ok());
        assert!(matches!(
            column::validate_columns(&[name.clone(), name.clone()]),
            Err(AppError::BadRequest(_))
        ));
        let mut empty = name;
        empty.field = " ".to_string();
        assert!(matches!(
            column::validate_columns(&[empty]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn event_wire_shape_has_type_and_camel_case_payload() {
        let event = event::Event::new(event::EventKind::NodeMoved(event::NodeMoved {
            node_id: "1-1".to_string(),
            old_parent_id: Some("1".to_string()),
            new_parent_id: None,
            new_index: 0,
        }));
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "NODE_MOVED");
        assert_eq!(value["payload"]["nodeId"], "1-1");
        assert_eq!(value["payload"]["oldParentId"], "1");
        assert!(value["payload"]["newParentId"].is_null());
        assert!(value["timestamp"].as_str().is_some());

        let decoded: event::Event = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, event);
    }

    #[test]
    fn update_event_keeps_null_old_value_through_the_wire() {
        let event = event::Event::new(event::EventKind::NodeDataUpdated(
            event::NodeDataUpdated {
                node_id: "2".to_string(),
                field: "owner".to_string(),
                old_value: Some(Value::Null),
                new_value: json!("kim"),
            },
        ));
        let text = serde_json::to_string(&event).expect("serialize");
        assert!(text.contains(r#""oldValue":null"#));
        let decoded: event::Event = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(decoded, event);

        let absent: event::Event = serde_json::from_value(json!({
            "id": "e1",
            "timestamp": "2026-01-01T00:00:00Z",
            "type": "NODE_DATA_UPDATED",
            "payload": {"nodeId": "2", "field": "budget", "newValue": 1}
        }))
        .expect("deserialize without oldValue");
        match absent.kind {
            event::EventKind::NodeDataUpdated(payload) => assert_eq!(payload.old_value, None),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn update_event_omits_absent_old_value() {
        let event = event::Event::new(event::EventKind::NodeDataUpdated(
            event::NodeDataUpdated {
                node_id: "2".to_string(),
                field: "budget".to_string(),
                old_value: None,
                new_value: json!(20000),
            },
        ));
        let value = serde_json::to_value(&event).expect("serialize");
        assert!(value["payload"].get("oldValue").is_none());
        assert_eq!(event.type_name(), "NODE_DATA_UPDATED");
    }

    #[test]
    fn import_payload_requires_data_array() {
        assert!(matches!(
            snapshot::ImportPayload::from_value(json!({"config": []})),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            snapshot::ImportPayload::from_value(json!({"data": {"id": "1"}})),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            snapshot::ImportPayload::from_value(json!({"data": [{"parentId": null}]})),
            Err(AppError::Serialization(_))
        ));

        let payload = snapshot::ImportPayload::from_value(json!({
            "meta": {"version": "1.0", "generatedAt": "2024-01-01T00:00:00Z"},
            "data": [{"id": "1", "parentId": null}]
        }))
        .expect("valid payload");
        assert_eq!(payload.data.len(), 1);
        assert!(payload.config.is_none());
    }

    #[test]
    fn snapshot_json_round_trips() {
        let snap = snapshot::Snapshot::new(
            vec![column::ColumnDescriptor::new(
                "name",
                "Name",
                column::ColumnType::PlainText,
            )],
            vec![record::Record::new("1").field("name", "Root")],
        );
        let text = serde_json::to_string(&snap).expect("serialize");
        assert!(text.contains("\"generatedAt\""));
        let payload = snapshot::ImportPayload::from_json(&text).expect("import");
        assert_eq!(payload.data, snap.data);
        assert_eq!(payload.config.as_deref(), Some(snap.config.as_slice()));
    }
}
