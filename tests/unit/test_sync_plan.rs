#[cfg(test)]
mod tests {
    use ostrichdb_dashboard::models::{
        ClusterId, ClusterIdentity, ClusterSummary, DataType, DraftField, RemoteRecord, TypedValue,
    };
    use ostrichdb_dashboard::services::sync_plan::{plan, plan_creation, plan_update};
    use ostrichdb_dashboard::services::{
        DraftService, PlanError, StepEffect, SyncMode, SyncOperation, ValidationError,
    };
    use uuid::Uuid;

    fn saved(name: &str) -> ClusterIdentity {
        ClusterIdentity {
            name: name.to_string(),
            id: ClusterId::Known("1".to_string()),
            record_count: 0,
        }
    }

    fn loaded(records: &[(&str, DataType, &str)]) -> DraftService {
        let remote: Vec<RemoteRecord> = records
            .iter()
            .enumerate()
            .map(|(i, (name, t, value))| {
                RemoteRecord::new(Some(&(i + 1).to_string()), name, *t, value)
            })
            .collect();
        DraftService::from_remote(&remote)
    }

    fn id_of(drafts: &DraftService, name: &str) -> Uuid {
        drafts
            .drafts()
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.client_id)
            .unwrap()
    }

    fn add(drafts: &mut DraftService, name: &str, data_type: DataType, value: &str) -> Uuid {
        let id = drafts.add_draft().client_id;
        drafts.set_name(id, name).unwrap();
        drafts.set_type(id, data_type).unwrap();
        drafts.set_value(id, value).unwrap();
        id
    }

    fn sibling(name: &str) -> ClusterSummary {
        ClusterSummary {
            name: name.to_string(),
            id: "9".to_string(),
            record_count: 0,
        }
    }

    #[test]
    fn test_creation_plan_lists_cluster_then_records_in_order() {
        let mut drafts = DraftService::new();
        let x = add(&mut drafts, "x", DataType::String, "hello");
        let y = add(&mut drafts, "y", DataType::Integer, "42");

        let plan = plan_creation(&ClusterIdentity::unsaved("c"), &drafts).unwrap();

        assert_eq!(plan.mode, SyncMode::Create);
        let ops: Vec<&SyncOperation> = plan.operations().collect();
        assert_eq!(
            ops,
            vec![
                &SyncOperation::CreateCluster {
                    name: "c".to_string()
                },
                &SyncOperation::CreateRecord {
                    name: "x".to_string(),
                    value: TypedValue::new(DataType::String, "hello"),
                },
                &SyncOperation::CreateRecord {
                    name: "y".to_string(),
                    value: TypedValue::new(DataType::Integer, "42"),
                },
            ]
        );
        assert_eq!(plan.steps[0].client_id, None);
        assert_eq!(plan.steps[1].client_id, Some(x));
        assert_eq!(plan.steps[2].client_id, Some(y));
        assert_eq!(plan.steps[1].effect, StepEffect::RecordCreated);
    }

    #[test]
    fn test_creation_validates_cluster_name() {
        let drafts = DraftService::new();
        let err = plan_creation(&ClusterIdentity::unsaved("bad name"), &drafts).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidClusterName(ValidationError::NameContainsWhitespace)
        );
    }

    #[test]
    fn test_creation_reports_every_invalid_draft() {
        let mut drafts = DraftService::new();
        add(&mut drafts, "a", DataType::Integer, "one");
        add(&mut drafts, "b", DataType::String, "fine");
        drafts.add_draft();

        match plan_creation(&ClusterIdentity::unsaved("c"), &drafts) {
            Err(PlanError::InvalidRecords { failures }) => {
                let names: Vec<&str> = failures.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["a", ""]);
                assert_eq!(failures[1].1, ValidationError::EmptyName);
            }
            other => panic!("expected invalid records, got {:?}", other),
        }
    }

    #[test]
    fn test_update_orders_field_calls_and_addresses() {
        let mut drafts = loaded(&[("a", DataType::Integer, "1")]);
        let a = id_of(&drafts, "a");
        drafts.set_name(a, "b").unwrap();
        drafts.set_type(a, DataType::Float).unwrap();
        drafts.set_value(a, "2.5").unwrap();

        let plan = plan_update(&saved("c"), None, &[], &drafts).unwrap();

        assert_eq!(plan.mode, SyncMode::Update);
        let ops: Vec<SyncOperation> = plan.operations().cloned().collect();
        assert_eq!(
            ops,
            vec![
                SyncOperation::RenameRecord {
                    from: "a".to_string(),
                    to: "b".to_string()
                },
                SyncOperation::RetypeRecord {
                    name: "b".to_string(),
                    data_type: DataType::Float
                },
                SyncOperation::RevalueRecord {
                    name: "b".to_string(),
                    value: TypedValue::new(DataType::Float, "2.5")
                },
            ]
        );
        let effects: Vec<StepEffect> = plan.steps.iter().map(|s| s.effect).collect();
        assert_eq!(
            effects,
            vec![
                StepEffect::FieldSynced(DraftField::Name),
                StepEffect::FieldSynced(DraftField::Type),
                StepEffect::FieldSynced(DraftField::Value),
            ]
        );
    }

    #[test]
    fn test_update_puts_rename_first_and_deletes_before_writes() {
        let mut drafts = loaded(&[
            ("keep", DataType::String, "k"),
            ("gone", DataType::String, "g"),
        ]);
        drafts.set_value(id_of(&drafts, "keep"), "k2").unwrap();
        drafts.mark_deleted(id_of(&drafts, "gone")).unwrap();
        add(&mut drafts, "new", DataType::Boolean, "true");

        let plan = plan_update(&saved("c"), Some("d"), &[sibling("c")], &drafts).unwrap();

        let ops: Vec<String> = plan.operations().map(|op| op.to_string()).collect();
        assert_eq!(
            ops,
            vec![
                "rename cluster 'c' to 'd'",
                "delete record 'gone'",
                "update value of record 'keep'",
                "create record 'new' (BOOLEAN)",
            ]
        );
        assert_eq!(plan.cluster, "c");
        assert_eq!(plan.final_cluster_name(), "d");
    }

    #[test]
    fn test_duplicate_cluster_rename_rejected_case_insensitively() {
        let drafts = DraftService::new();
        let err = plan_update(
            &saved("c"),
            Some("Other"),
            &[sibling("c"), sibling("OTHER")],
            &drafts,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidClusterName(ValidationError::DuplicateName {
                name: "Other".to_string()
            })
        );
    }

    #[test]
    fn test_case_only_cluster_rename_is_allowed() {
        let drafts = DraftService::new();
        let plan = plan_update(&saved("data"), Some("Data"), &[sibling("data")], &drafts).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.final_cluster_name(), "Data");
    }

    #[test]
    fn test_duplicate_live_record_names_rejected() {
        let mut drafts = loaded(&[("a", DataType::String, "1")]);
        add(&mut drafts, "a", DataType::String, "2");

        let err = plan_update(&saved("c"), None, &[], &drafts).unwrap_err();
        assert_eq!(
            err,
            PlanError::DuplicateRecordName {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_swapping_names_through_deletion_is_allowed() {
        // Deleting "a" while renaming "b" to "a" is an ordinary delete-then-rename
        let mut drafts = loaded(&[("a", DataType::String, "1"), ("b", DataType::String, "2")]);
        drafts.mark_deleted(id_of(&drafts, "a")).unwrap();
        let b = id_of(&drafts, "b");
        drafts.set_name(b, "a").unwrap();

        let plan = plan_update(&saved("c"), None, &[], &drafts).unwrap();
        let ops: Vec<String> = plan.operations().map(|op| op.to_string()).collect();
        assert_eq!(
            ops,
            vec!["delete record 'a'", "rename record 'b' to 'a'"]
        );
    }

    #[test]
    fn test_plan_picks_mode_from_cluster_id() {
        let mut drafts = DraftService::new();
        add(&mut drafts, "x", DataType::String, "1");

        let create = plan(&ClusterIdentity::unsaved("c"), None, &[], &drafts).unwrap();
        assert_eq!(create.mode, SyncMode::Create);

        let mut unknown = saved("c");
        unknown.id = ClusterId::Unknown;
        let update = plan(&unknown, None, &[], &drafts).unwrap();
        assert_eq!(update.mode, SyncMode::Update);
        assert_eq!(update.len(), 1);
    }

    #[test]
    fn test_plan_serializes_as_tagged_operations() {
        let mut drafts = loaded(&[("a", DataType::String, "1")]);
        drafts.mark_deleted(id_of(&drafts, "a")).unwrap();

        let plan = plan_update(&saved("c"), None, &[], &drafts).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["mode"], "update");
        assert_eq!(json["steps"][0]["operation"]["op"], "delete_record");
        assert_eq!(json["steps"][0]["operation"]["name"], "a");
        assert_eq!(json["steps"][0]["effect"], "record_deleted");
    }
}
