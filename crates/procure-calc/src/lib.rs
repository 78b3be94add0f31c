//! # Procure Calculation Engine
//!
//! 報價索引、BOM 覆蓋分析、供應商整合分析與風險/節省彙總

pub mod consolidation;
pub mod coverage;
pub mod freshness;
pub mod plan;
pub mod quote_index;
pub mod risk;
pub mod savings;

// Re-export 主要類型
pub use consolidation::{ConsolidationAnalyzer, VendorConsolidation};
pub use coverage::{
    BomLineAnalysis, CoverageAnalyzer, CoverageSummary, QuoteAvailability, RequisitionItemSummary,
};
pub use freshness::QuoteFreshnessStats;
pub use plan::{RecommendedLine, RecommendedPlan};
pub use quote_index::{LineQuotes, QuoteIndex};
pub use risk::{
    BudgetRisk, RiskAssessment, RiskAssessor, RiskCategory, RiskFactor, RiskLevel, RiskScore,
};
pub use savings::{CategorySavings, LineSavings, SavingsSummarizer, SavingsSummary, VendorSavings};

use serde::Serialize;

/// 分析問題
///
/// 可恢復的錯誤（如單一規格報價查詢失敗）彙總於此，不中止整體分析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisIssue {
    /// 相關對象（規格ID或 BOM 行ID）
    pub subject_id: String,
    pub message: String,
    pub severity: IssueSeverity,
}

impl AnalysisIssue {
    pub fn new(subject_id: impl Into<String>, message: impl Into<String>, severity: IssueSeverity) -> Self {
        Self {
            subject_id: subject_id.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject_id, message, IssueSeverity::Info)
    }

    pub fn warning(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject_id, message, IssueSeverity::Warning)
    }

    pub fn error(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject_id, message, IssueSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}
