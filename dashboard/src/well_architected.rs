// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::sources::WorkloadSource;

pub const UPDATE_ANSWER_EVENT: &str = "UpdateAnswer";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTrailEvent {
    #[serde(default)]
    pub detail: Option<CloudTrailDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTrailDetail {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub request_parameters: Option<RequestParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestParameters {
    #[serde(default)]
    pub workload_id: Option<String>,
    #[serde(default)]
    pub lens_alias: Option<String>,
    #[serde(default)]
    pub question_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAnswerRequest {
    pub workload_id: String,
    pub lens_alias: String,
    pub question_id: String,
}

impl UpdateAnswerRequest {
    ///
    /// Extracts the answered question from a CloudTrail event. Anything other
    /// than an `UpdateAnswer` call carrying a workload, a lens and a question
    /// yields `None`. Lens aliases arrive URL encoded (lens ARNs contain `:`
    /// and `/`) and are decoded here.
    ///
    pub fn from_event(event: &CloudTrailEvent) -> Option<Self> {
        let detail = event.detail.as_ref()?;
        if detail.event_name.as_deref() != Some(UPDATE_ANSWER_EVENT) {
            return None;
        }
        let params = detail.request_parameters.as_ref()?;
        let present = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(String::from);
        let workload_id = present(&params.workload_id)?;
        let lens_alias = present(&params.lens_alias)?;
        let question_id = present(&params.question_id)?;
        let lens_alias = match urlencoding::decode(&lens_alias) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => lens_alias,
        };
        Some(UpdateAnswerRequest {
            workload_id,
            lens_alias,
            question_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnswerSummary {
    pub question_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pillar_id: Option<String>,
    pub question_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
    pub selected_choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerPage {
    pub answer_summaries: Vec<AnswerSummary>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnswerRecord {
    pub workload_id: String,
    pub lens_alias: String,
    pub answer_summaries: Vec<Vec<AnswerSummary>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiskRecord {
    pub workload_id_lens_alias: String,
    pub question_id: String,
    pub workload_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_name: Option<String>,
    pub lens_alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens_name: Option<String>,
    pub question_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
}

///
/// Names looked up for the risk records. Either may be absent when its lookup
/// failed; the records are still written without it.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkloadContext {
    pub workload_name: Option<String>,
    pub lens_name: Option<String>,
}

impl WorkloadContext {
    pub async fn fetch<W: WorkloadSource + Sync>(
        source: &W,
        request: &UpdateAnswerRequest,
    ) -> WorkloadContext {
        let workload_name = match source.workload_name(&request.workload_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Could not look up workload {}: {}", request.workload_id, e);
                None
            }
        };
        let lens_name = match source.lens_name(&request.lens_alias).await {
            Ok(name) => name,
            Err(e) => {
                warn!("Could not look up lens {}: {}", request.lens_alias, e);
                None
            }
        };
        WorkloadContext {
            workload_name,
            lens_name,
        }
    }
}

/// Accumulates the answer record and risk records for one workload and lens.
#[derive(Debug)]
pub struct RiskCollector<'r> {
    request: &'r UpdateAnswerRequest,
    context: WorkloadContext,
    answer: AnswerRecord,
    risks: Vec<RiskRecord>,
}

impl<'r> RiskCollector<'r> {
    pub fn new(request: &'r UpdateAnswerRequest, context: WorkloadContext) -> Self {
        RiskCollector {
            request,
            context,
            answer: AnswerRecord {
                workload_id: request.workload_id.clone(),
                lens_alias: request.lens_alias.clone(),
                answer_summaries: Vec::new(),
            },
            risks: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: &AnswerPage) {
        let workload_id_lens_alias =
            format!("{}{}", self.request.workload_id, self.request.lens_alias);
        for summary in &page.answer_summaries {
            self.risks.push(RiskRecord {
                workload_id_lens_alias: workload_id_lens_alias.clone(),
                question_id: summary.question_id.clone(),
                workload_id: self.request.workload_id.clone(),
                workload_name: self.context.workload_name.clone(),
                lens_alias: self.request.lens_alias.clone(),
                lens_name: self.context.lens_name.clone(),
                question_title: summary.question_title.clone(),
                risk: summary.risk.clone(),
            });
        }
        self.answer
            .answer_summaries
            .push(page.answer_summaries.clone());
    }

    pub fn finish(self) -> (AnswerRecord, Vec<RiskRecord>) {
        (self.answer, self.risks)
    }
}

/// Pages through every answer of the workload lens, continuing while a next token is returned.
pub async fn collect_risks<W: WorkloadSource + Sync>(
    source: &W,
    request: &UpdateAnswerRequest,
    context: WorkloadContext,
) -> Result<(AnswerRecord, Vec<RiskRecord>)> {
    info!(
        "Event: {}, WorkloadId: {}, LensAlias: {}, QuestionId: {}",
        UPDATE_ANSWER_EVENT, request.workload_id, request.lens_alias, request.question_id
    );
    let mut collector = RiskCollector::new(request, context);
    let mut next_token = None;
    loop {
        let page = source
            .answers(&request.workload_id, &request.lens_alias, next_token)
            .await?;
        collector.add_page(&page);
        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
        debug!("nextToken: {:?}", next_token);
    }
    Ok(collector.finish())
}

#[cfg(test)]
#[path = "well_architected_tests.rs"]
mod well_architected_tests;
