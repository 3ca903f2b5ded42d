// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use compliance_dashboard::aws::{ConfigServiceSource, DynamoDbStore};
use compliance_dashboard::config::{log_level_from_env, ConformancePackTables};
use conformance_pack_lambda::process_conformance_packs;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use simple_logger::SimpleLogger;

#[tokio::main]
async fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(log_level_from_env()).init()?;

    let tables = ConformancePackTables::from_env()?;
    // No extra configuration is needed as long as the Lambda role can read
    // AWS Config compliance and write the tables.
    let shared_config = aws_config::from_env().load().await;
    let compliance = ConfigServiceSource::new(aws_sdk_config::Client::new(&shared_config));
    let store = DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&shared_config));

    let func = service_fn(|event: LambdaEvent<Value>| {
        process_conformance_packs(event.payload, &compliance, &store, &store, &tables)
    });
    lambda_runtime::run(func).await?;
    Ok(())
}
