// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use log::LevelFilter;

use crate::errors::{Error, Result};

pub const SUMMARY_TABLE_NAME: &str = "SUMMARY_TABLE_NAME";
pub const DETAIL_TABLE_NAME: &str = "DETAIL_TABLE_NAME";
pub const PLAYBOOK_TABLE_NAME: &str = "PLAYBOOK_TABLE_NAME";
pub const REMEDIATION_TABLE_NAME: &str = "REMEDIATION_TABLE_NAME";
pub const ANSWERS_TABLE_NAME: &str = "TABLE_NAME";
pub const RISKS_TABLE_NAME: &str = "RISKS_TABLE_NAME";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_PLAYBOOK_TABLE: &str = "conformance-pack-compliance-playbook";

/// Tables written by the conformance pack processor, plus the playbook catalog it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformancePackTables {
    pub summary: String,
    pub detail: String,
    pub playbook: String,
    pub remediation: String,
}

impl ConformancePackTables {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ConformancePackTables {
            summary: required(&lookup, SUMMARY_TABLE_NAME)?,
            detail: required(&lookup, DETAIL_TABLE_NAME)?,
            playbook: required(&lookup, PLAYBOOK_TABLE_NAME)?,
            remediation: required(&lookup, REMEDIATION_TABLE_NAME)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellArchitectedTables {
    pub answers: String,
    pub risks: String,
}

impl WellArchitectedTables {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(WellArchitectedTables {
            answers: required(&lookup, ANSWERS_TABLE_NAME)?,
            risks: required(&lookup, RISKS_TABLE_NAME)?,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::MissingConfiguration(name.to_string()))
}

/// `LOG_LEVEL` when it names a level, `Info` otherwise.
pub fn log_level_from_env() -> LevelFilter {
    log_level(std::env::var(LOG_LEVEL).ok().as_deref())
}

pub fn log_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}
