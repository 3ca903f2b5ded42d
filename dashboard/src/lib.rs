// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod aws;
pub mod compliance;
pub mod config;
pub mod errors;
pub mod memory;
pub mod playbooks;
pub mod processor;
pub mod remediation;
pub mod sources;
pub mod well_architected;

pub use errors::{Error, Result};
pub use playbooks::{PlaybookCatalog, PlaybookCatalogEntry};
pub use processor::{ConformancePackProcessor, ProcessingSummary, WellArchitectedProcessor};
pub use remediation::{normalize_prefix, RemediationSession, RemediationWorkItem};
