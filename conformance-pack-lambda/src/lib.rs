// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use compliance_dashboard::config::ConformancePackTables;
use compliance_dashboard::sources::{CatalogSource, ComplianceSource, RecordSink};
use compliance_dashboard::ConformancePackProcessor;
use lambda_runtime::Error;
use log::{debug, error};
use serde_json::Value;

///
/// Scheduled invocation: the payload carries nothing the session needs and is
/// only logged. The response reports how many records the session produced.
///
pub async fn process_conformance_packs<C, P, S>(
    payload: Value,
    compliance: &C,
    catalog: &P,
    sink: &S,
    tables: &ConformancePackTables,
) -> Result<Value, Error>
where
    C: ComplianceSource + Sync,
    P: CatalogSource + Sync,
    S: RecordSink + Sync,
{
    debug!("Received event: {}", payload);
    let summary = ConformancePackProcessor::new(compliance, catalog, sink, tables)
        .run()
        .await
        .map_err(|err| {
            error!("Conformance pack processing failed: {}", err);
            err
        })?;
    Ok(serde_json::to_value(summary)?)
}
