// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use aws_sdk_config::model::{ConformancePackComplianceScore, ConformancePackEvaluationResult};
use log::warn;

use crate::compliance::{ComplianceType, DetailPage, EvaluationResult, PackScore, ScorePage};
use crate::errors::{Error, Result};
use crate::sources::ComplianceSource;

/// Conformance pack compliance from the AWS Config API.
pub struct ConfigServiceSource {
    client: aws_sdk_config::Client,
}

impl ConfigServiceSource {
    pub fn new(client: aws_sdk_config::Client) -> Self {
        ConfigServiceSource { client }
    }
}

#[async_trait]
impl ComplianceSource for ConfigServiceSource {
    async fn compliance_scores(&self, next_token: Option<String>) -> Result<ScorePage> {
        let output = self
            .client
            .list_conformance_pack_compliance_scores()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::ComplianceApi(e.to_string()))?;

        let scores = output
            .conformance_pack_compliance_scores()
            .unwrap_or_default()
            .iter()
            .map(pack_score)
            .collect::<Result<Vec<_>>>()?;
        Ok(ScorePage {
            scores,
            next_token: output.next_token().map(String::from),
        })
    }

    async fn compliance_details(
        &self,
        conformance_pack_name: &str,
        next_token: Option<String>,
    ) -> Result<DetailPage> {
        let output = self
            .client
            .get_conformance_pack_compliance_details()
            .conformance_pack_name(conformance_pack_name)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::ComplianceApi(e.to_string()))?;

        let pack = output
            .conformance_pack_name()
            .unwrap_or(conformance_pack_name)
            .to_string();
        let results = output
            .conformance_pack_rule_evaluation_results()
            .unwrap_or_default()
            .iter()
            .map(|result| evaluation_result(&pack, result))
            .collect();
        Ok(DetailPage {
            conformance_pack_name: pack,
            results,
            next_token: output.next_token().map(String::from),
        })
    }
}

fn pack_score(score: &ConformancePackComplianceScore) -> Result<PackScore> {
    match score.conformance_pack_name() {
        Some(name) => Ok(PackScore {
            conformance_pack_name: name.to_string(),
            score: score.score().map(String::from),
        }),
        None => Err(Error::ComplianceApi(
            "compliance score listed without a conformance pack name".to_string(),
        )),
    }
}

fn evaluation_result(
    pack: &str,
    result: &ConformancePackEvaluationResult,
) -> EvaluationResult {
    let qualifier = result
        .evaluation_result_identifier()
        .and_then(|identifier| identifier.evaluation_result_qualifier());
    let compliance_type = result
        .compliance_type()
        .and_then(|compliance| match compliance.as_str().parse::<ComplianceType>() {
            Ok(compliance) => Some(compliance),
            Err(err) => {
                warn!("{} in conformance pack {}", err, pack);
                None
            }
        });
    EvaluationResult {
        conformance_pack_name: pack.to_string(),
        compliance_type,
        config_rule_name: qualifier
            .and_then(|q| q.config_rule_name())
            .map(String::from),
        resource_type: qualifier.and_then(|q| q.resource_type()).map(String::from),
        resource_id: qualifier.and_then(|q| q.resource_id()).map(String::from),
    }
}
