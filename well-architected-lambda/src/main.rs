// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use compliance_dashboard::aws::{DynamoDbStore, WellArchitectedSource};
use compliance_dashboard::config::{log_level_from_env, WellArchitectedTables};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use simple_logger::SimpleLogger;
use well_architected_lambda::process_answer_update;

#[tokio::main]
async fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(log_level_from_env()).init()?;

    let tables = WellArchitectedTables::from_env()?;
    let shared_config = aws_config::from_env().load().await;
    let workloads = WellArchitectedSource::new(aws_sdk_wellarchitected::Client::new(&shared_config));
    let store = DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&shared_config));

    let func = service_fn(|event: LambdaEvent<Value>| {
        process_answer_update(event.payload, &workloads, &store, &tables)
    });
    lambda_runtime::run(func).await?;
    Ok(())
}
