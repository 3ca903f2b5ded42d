// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use compliance_dashboard::compliance::{
        ComplianceType, DetailPage, EvaluationResult, PackScore, ScorePage,
    };
    use compliance_dashboard::config::ConformancePackTables;
    use compliance_dashboard::memory::MemoryStore;
    use compliance_dashboard::sources::{to_item, ComplianceSource};
    use compliance_dashboard::{Error, PlaybookCatalogEntry, Result};
    use conformance_pack_lambda::process_conformance_packs;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCHEDULED_EVENT: &str = r#"{"version":"0","id":"53dc4d37-cffa-4f76-80c9-8b7d4a4d2eaa","detail-type":"Scheduled Event","source":"aws.events","account":"123456789012","time":"2022-04-01T12:00:00Z","region":"us-east-1","resources":["arn:aws:events:us-east-1:123456789012:rule/compliance-dashboard"],"detail":{}}"#;

    struct SinglePack {
        results: Vec<EvaluationResult>,
    }

    #[async_trait]
    impl ComplianceSource for SinglePack {
        async fn compliance_scores(&self, _next_token: Option<String>) -> Result<ScorePage> {
            Ok(ScorePage {
                scores: vec![PackScore {
                    conformance_pack_name: "Operational-Best-Practices-for-EC2".to_string(),
                    score: Some("66.67".to_string()),
                }],
                next_token: None,
            })
        }

        async fn compliance_details(
            &self,
            conformance_pack_name: &str,
            _next_token: Option<String>,
        ) -> Result<DetailPage> {
            Ok(DetailPage {
                conformance_pack_name: conformance_pack_name.to_string(),
                results: self.results.clone(),
                next_token: None,
            })
        }
    }

    fn tables() -> ConformancePackTables {
        ConformancePackTables {
            summary: "conformance-pack-compliance-summary".to_string(),
            detail: "conformance-pack-compliance-detail".to_string(),
            playbook: "conformance-pack-compliance-playbook".to_string(),
            remediation: "conformance-pack-compliance-remediation".to_string(),
        }
    }

    fn result(compliance: ComplianceType, rule: &str, resource_id: &str) -> EvaluationResult {
        EvaluationResult {
            conformance_pack_name: "Operational-Best-Practices-for-EC2".to_string(),
            compliance_type: Some(compliance),
            config_rule_name: Some(rule.to_string()),
            resource_type: Some("AWS::EC2::Instance".to_string()),
            resource_id: Some(resource_id.to_string()),
        }
    }

    fn playbook_store(tables: &ConformancePackTables) -> MemoryStore {
        let entry = PlaybookCatalogEntry {
            rule_name: "RESTRICTEDSSH".to_string(),
            playbook_id: "PB1".to_string(),
            loe_hours: "2".to_string(),
            loe_sprints: "1".to_string(),
            skill_level: "2".to_string(),
            rank: "1".to_string(),
        };
        MemoryStore::new().with_items(&tables.playbook, vec![to_item(&entry).unwrap()])
    }

    #[tokio::test]
    async fn test_conformance_pack_handler() {
        let tables = tables();
        let store = playbook_store(&tables);
        let compliance = SinglePack {
            results: vec![
                result(ComplianceType::NonCompliant, "restricted-ssh-conformance-pack-ab12cd", "i-123"),
                result(ComplianceType::Compliant, "ec2-ebs-encryption-by-default-conformance-pack-ab12cd", "123456789012"),
                result(ComplianceType::NonCompliant, "ec2-imdsv2-check-conformance-pack-ab12cd", "i-123"),
            ],
        };

        let response = process_conformance_packs(
            serde_json::from_str(SCHEDULED_EVENT).unwrap(),
            &compliance,
            &store,
            &store,
            &tables,
        )
        .await
        .expect("Failed to handle event");

        assert_eq!(
            json!({"conformancePacks": 1, "details": 3, "remediations": 1}),
            response
        );
        let remediations = store.items(&tables.remediation);
        assert_eq!(1, remediations.len());
        assert_eq!(json!("RESTRICTEDSSHPB1i-123"), remediations[0]["ConfigRuleNamePlaybookIdResourceId"]);
        assert_eq!(json!(66.67), store.items(&tables.summary)[0]["Score"]);
    }

    #[tokio::test]
    async fn test_conformance_pack_handler_fails_on_malformed_result() {
        let tables = tables();
        let store = playbook_store(&tables);
        let mut malformed = result(ComplianceType::NonCompliant, "restricted-ssh", "i-1");
        malformed.config_rule_name = None;
        let compliance = SinglePack {
            results: vec![malformed],
        };

        let err = process_conformance_packs(json!({}), &compliance, &store, &store, &tables)
            .await
            .unwrap_err();
        let err = err
            .downcast_ref::<Error>()
            .expect("a compliance dashboard error");
        assert!(matches!(err, Error::MalformedResult { field: "ConfigRuleName", .. }));
        assert!(store.items(&tables.remediation).is_empty());
    }
}
