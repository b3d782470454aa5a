//! Analysis result types
//!
//! Mirror of the structured output schema sent to Gemini:
//! - HelmetStatus: helmet verdict with reasoning
//! - RuleCompliance: traffic-rule verdict with reasoning
//! - AnalysisResult: the full two-part safety report
//!
//! The wire format is camelCase JSON. Deserialization is strict: a response
//! missing a field, carrying a wrongly typed field, or adding unknown fields
//! is rejected rather than patched up with defaults.

use serde::{Deserialize, Serialize};

/// Helmet verdict for the pictured biker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HelmetStatus {
    pub wears_helmet: bool,
    pub reason: String,
}

/// Traffic-rule verdict for the pictured biker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleCompliance {
    pub is_compliant: bool,
    pub reason: String,
}

/// Structured safety report returned by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisResult {
    pub helmet_status: HelmetStatus,
    pub rule_compliance: RuleCompliance,
}
