// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::warn;

use crate::errors::{Error, Result};
use crate::sources::WorkloadSource;
use crate::well_architected::{AnswerPage, AnswerSummary};

/// Workloads, lenses and answers from the AWS Well-Architected Tool API.
pub struct WellArchitectedSource {
    client: aws_sdk_wellarchitected::Client,
}

impl WellArchitectedSource {
    pub fn new(client: aws_sdk_wellarchitected::Client) -> Self {
        WellArchitectedSource { client }
    }
}

#[async_trait]
impl WorkloadSource for WellArchitectedSource {
    async fn workload_name(&self, workload_id: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_workload()
            .workload_id(workload_id)
            .send()
            .await
            .map_err(|e| Error::WorkloadApi(e.to_string()))?;
        Ok(output
            .workload()
            .and_then(|workload| workload.workload_name())
            .map(String::from))
    }

    async fn lens_name(&self, lens_alias: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_lens()
            .lens_alias(lens_alias)
            .send()
            .await
            .map_err(|e| Error::WorkloadApi(e.to_string()))?;
        Ok(output.lens().and_then(|lens| lens.name()).map(String::from))
    }

    async fn answers(
        &self,
        workload_id: &str,
        lens_alias: &str,
        next_token: Option<String>,
    ) -> Result<AnswerPage> {
        let output = self
            .client
            .list_answers()
            .workload_id(workload_id)
            .lens_alias(lens_alias)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::WorkloadApi(e.to_string()))?;

        let mut answer_summaries = Vec::new();
        for summary in output.answer_summaries().unwrap_or_default() {
            let question_id = match summary.question_id() {
                Some(id) => id.to_string(),
                None => {
                    warn!("Skipping answer without a question id for workload {}", workload_id);
                    continue;
                }
            };
            answer_summaries.push(AnswerSummary {
                question_id,
                pillar_id: summary.pillar_id().map(String::from),
                question_title: summary.question_title().unwrap_or_default().to_string(),
                risk: summary.risk().map(|risk| risk.as_str().to_string()),
                selected_choices: summary
                    .selected_choices()
                    .map(|choices| choices.to_vec())
                    .unwrap_or_default(),
            });
        }
        Ok(AnswerPage {
            answer_summaries,
            next_token: output.next_token().map(String::from),
        })
    }
}
