// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Evaluation result in conformance pack `{pack}` is missing `{field}`")]
    MalformedResult { pack: String, field: &'static str },
    #[error("Unknown compliance type `{0}`")]
    UnknownComplianceType(String),
    #[error("Playbook catalog entry is missing `{0}`")]
    MalformedCatalogEntry(String),
    #[error("Required configuration `{0}` is not set")]
    MissingConfiguration(String),
    #[error("AWS Config request failed. Error = `{0}`")]
    ComplianceApi(String),
    #[error("AWS Well-Architected Tool request failed. Error = `{0}`")]
    WorkloadApi(String),
    #[error("Storage request for table `{table}` failed. Error = `{message}`")]
    Storage { table: String, message: String },
    #[error("Error serializing record {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error reading playbook mapping {0}")]
    CsvError(#[from] csv::Error),
    #[error("Error reading mapping workbook {0}")]
    WorkbookError(#[from] calamine::Error),
    #[error("I/O error when reading {0}")]
    IoError(#[from] std::io::Error),
    #[error("Logger could not be installed {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

impl Error {
    pub(crate) fn storage(table: &str, message: impl ToString) -> Self {
        Error::Storage {
            table: table.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<R> = std::result::Result<R, Error>;
