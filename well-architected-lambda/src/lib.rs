// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use compliance_dashboard::config::WellArchitectedTables;
use compliance_dashboard::sources::{RecordSink, WorkloadSource};
use compliance_dashboard::well_architected::{CloudTrailEvent, UpdateAnswerRequest};
use compliance_dashboard::WellArchitectedProcessor;
use lambda_runtime::Error;
use log::{debug, info};
use serde_json::{json, Value};

///
/// Handles the EventBridge notification of a Well-Architected Tool API call.
/// Only `UpdateAnswer` calls naming a workload, a lens and a question are
/// processed; any other event is acknowledged and ignored.
///
pub async fn process_answer_update<W, S>(
    payload: Value,
    workloads: &W,
    sink: &S,
    tables: &WellArchitectedTables,
) -> Result<Value, Error>
where
    W: WorkloadSource + Sync,
    S: RecordSink + Sync,
{
    debug!("Received event: {}", payload);
    let event: CloudTrailEvent = serde_json::from_value(payload)?;
    let request = match UpdateAnswerRequest::from_event(&event) {
        Some(request) => request,
        None => {
            info!("Ignoring event that is not an answer update");
            return Ok(json!({ "status": "ignored" }));
        }
    };

    let summary = WellArchitectedProcessor::new(workloads, sink, tables)
        .run(&request)
        .await?;
    Ok(json!({
        "status": "processed",
        "workloadId": request.workload_id,
        "lensAlias": request.lens_alias,
        "summary": summary,
    }))
}
