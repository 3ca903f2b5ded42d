// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;

use aws_types::region::Region;
use clap::Parser;
use log::info;
use simple_logger::SimpleLogger;

use compliance_dashboard::aws::DynamoDbStore;
use compliance_dashboard::config::{log_level_from_env, DEFAULT_PLAYBOOK_TABLE};
use compliance_dashboard::memory::MemoryStore;
use compliance_dashboard::playbooks::read_mapping_file;
use compliance_dashboard::processor::load_playbook_mapping;
use compliance_dashboard::Error;

const ABOUT: &str = "Loads the AWS Config rule to remediation playbook mapping workbook into the playbook catalog table";
const MAPPING_FILE_HELP: &str = "Provide path to the mapping workbook (.xlsx) or a CSV export of its first sheet";
const REGION_HELP: &str = "AWS region of the playbook catalog table";
const TABLE_NAME_HELP: &str = "Name of the playbook catalog table";
const DRY_RUN_HELP: &str = "Print the catalog entries as JSON lines instead of writing them";

const DEFAULT_MAPPING_FILE: &str = "ConfigRulePlaybookMapping.xlsx";
const DEFAULT_AWS_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Eq, PartialEq, Parser)]
#[clap(name = "playbook-loader", version, about = ABOUT)]
struct PlaybookLoader {
    #[arg(short = 'f', long, default_value = DEFAULT_MAPPING_FILE, help = MAPPING_FILE_HELP)]
    mapping_file: String,
    #[arg(short, long, default_value = DEFAULT_AWS_REGION, help = REGION_HELP)]
    region: String,
    #[arg(short, long, default_value = DEFAULT_PLAYBOOK_TABLE, help = TABLE_NAME_HELP)]
    table_name: String,
    #[arg(long, help = DRY_RUN_HELP)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    SimpleLogger::new()
        .with_level(log_level_from_env())
        .init()?;

    let args = PlaybookLoader::parse();
    let rows = read_mapping_file(Path::new(&args.mapping_file))?;

    if args.dry_run {
        let store = MemoryStore::new();
        load_playbook_mapping(rows, &store, &args.table_name).await?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for item in store.items(&args.table_name) {
            writeln!(out, "{}", serde_json::to_string(&item)?)?;
        }
        return Ok(());
    }

    let shared_config = aws_config::from_env()
        .region(Region::new(args.region.clone()))
        .load()
        .await;
    let store = DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&shared_config));
    let entries = load_playbook_mapping(rows, &store, &args.table_name).await?;
    info!(
        "Wrote {} playbook mappings to {} in {}",
        entries.len(),
        args.table_name,
        args.region
    );
    Ok(())
}
