// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceType {
    Compliant,
    NonCompliant,
    NotApplicable,
    InsufficientData,
}

impl ComplianceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceType::Compliant => "COMPLIANT",
            ComplianceType::NonCompliant => "NON_COMPLIANT",
            ComplianceType::NotApplicable => "NOT_APPLICABLE",
            ComplianceType::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl FromStr for ComplianceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "COMPLIANT" => Ok(ComplianceType::Compliant),
            "NON_COMPLIANT" => Ok(ComplianceType::NonCompliant),
            "NOT_APPLICABLE" => Ok(ComplianceType::NotApplicable),
            "INSUFFICIENT_DATA" => Ok(ComplianceType::InsufficientData),
            other => Err(Error::UnknownComplianceType(other.to_string())),
        }
    }
}

///
/// One rule evaluation of one resource, as reported for a conformance pack.
/// The qualifier fields are optional upstream; [`EvaluationResult::qualifier`]
/// is the single place where their presence is enforced. A missing or
/// unrecognised compliance type is kept as `None`.
///
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub conformance_pack_name: String,
    #[serde(default)]
    pub compliance_type: Option<ComplianceType>,
    #[serde(default)]
    pub config_rule_name: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
}

/// Borrowed view of a result whose qualifier fields are all present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualifier<'r> {
    pub config_rule_name: &'r str,
    pub resource_type: &'r str,
    pub resource_id: &'r str,
}

impl EvaluationResult {
    pub fn is_non_compliant(&self) -> bool {
        self.compliance_type == Some(ComplianceType::NonCompliant)
    }

    pub fn qualifier(&self) -> Result<Qualifier<'_>> {
        Ok(Qualifier {
            config_rule_name: self.required(&self.config_rule_name, "ConfigRuleName")?,
            resource_type: self.required(&self.resource_type, "ResourceType")?,
            resource_id: self.required(&self.resource_id, "ResourceId")?,
        })
    }

    // The stored detail key is an undelimited concatenation
    pub fn rule_resource_key(&self) -> Result<String> {
        let qualifier = self.qualifier()?;
        Ok(format!(
            "{}{}",
            qualifier.config_rule_name, qualifier.resource_id
        ))
    }

    fn required<'r>(&self, field: &'r Option<String>, name: &'static str) -> Result<&'r str> {
        field.as_deref().ok_or_else(|| self.malformed(name))
    }

    fn malformed(&self, field: &'static str) -> Error {
        Error::MalformedResult {
            pack: self.conformance_pack_name.clone(),
            field,
        }
    }
}

/// A compliance score as listed by the compliance API, before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackScore {
    pub conformance_pack_name: String,
    pub score: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScorePage {
    pub scores: Vec<PackScore>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailPage {
    pub conformance_pack_name: String,
    pub results: Vec<EvaluationResult>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConformancePackScore {
    #[serde(rename = "ConformancePackName")]
    pub conformance_pack_name: String,
    #[serde(rename = "Score")]
    pub score: f64,
}

pub const UNKNOWN_SCORE: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EvaluationRecord {
    pub conformance_pack_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_type: Option<ComplianceType>,
    pub config_rule_name_resource_id: String,
    pub config_rule_name: String,
    pub resource_type: String,
    pub resource_id: String,
}

pub fn process_scores(page: &ScorePage) -> Vec<ConformancePackScore> {
    page.scores
        .iter()
        .map(|each| ConformancePackScore {
            conformance_pack_name: each.conformance_pack_name.clone(),
            score: each
                .score
                .as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|s| s.is_finite())
                .unwrap_or(UNKNOWN_SCORE),
        })
        .collect()
}

pub fn process_details(page: &DetailPage) -> Result<Vec<EvaluationRecord>> {
    let mut records = Vec::with_capacity(page.results.len());
    for result in &page.results {
        let qualifier = result.qualifier()?;
        records.push(EvaluationRecord {
            conformance_pack_name: page.conformance_pack_name.clone(),
            compliance_type: result.compliance_type,
            config_rule_name_resource_id: result.rule_resource_key()?,
            config_rule_name: qualifier.config_rule_name.to_string(),
            resource_type: qualifier.resource_type.to_string(),
            resource_id: qualifier.resource_id.to_string(),
        });
    }
    Ok(records)
}

#[cfg(test)]
#[path = "compliance_tests.rs"]
mod compliance_tests;
