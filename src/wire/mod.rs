use serde::{Deserialize, Serialize};
use std::fmt;

/// ========================================
/// AI proxy wire protocol
/// ========================================

pub const ANALYZE_FUNCTION: &str = "analyze-business-idea";
pub const IMPROVE_FUNCTION: &str = "improve-prompt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisType {
    BusinessAnalysis,
    GuidedQa,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub business_idea: String,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub result: String,
}

/// How an enhancement should rewrite the base prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImprovementKind {
    Clarity,
    Seo,
    Technical,
    CreativeEnhancement,
}

impl ImprovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImprovementKind::Clarity => "clarity",
            ImprovementKind::Seo => "seo",
            ImprovementKind::Technical => "technical",
            ImprovementKind::CreativeEnhancement => "creative-enhancement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImprovementKind::Clarity => "Improve for clarity & tone",
            ImprovementKind::Seo => "Improve for SEO-friendly output",
            ImprovementKind::Technical => "Improve for technical precision",
            ImprovementKind::CreativeEnhancement => "Expand with creative detail",
        }
    }
}

impl fmt::Display for ImprovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveRequest {
    pub original_prompt: String,
    pub improvement_type: ImprovementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResponse {
    pub improved_prompt: String,
}

/// Error body returned by the proxy on non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Website structure suggested for a business idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSuggestions {
    pub suggested_pages: Vec<String>,
    #[serde(default)]
    pub suggested_features: Vec<String>,
    #[serde(default)]
    pub suggested_design_style: String,
    #[serde(default)]
    pub explanation: String,
}
