//! # Procure
//!
//! 專案採購優化引擎：BOM 覆蓋分析、供應商整合、分配優化、情境比較與風險/節省彙總。
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use procure::{InMemoryStore, ProcurementEngine, ProcurementStrategy};
//!
//! let store = InMemoryStore::new();
//! let engine = ProcurementEngine::new(store.clone(), store.clone(), store)
//!     .with_analysis_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
//! let analysis = engine.analyze_project("PRJ-001", &ProcurementStrategy::default());
//! ```

pub mod engine;

pub use engine::ProcurementEngine;

pub use procure_cache::{AnalysisContext, CacheStats, QuoteCache};
pub use procure_calc::{
    AnalysisIssue, BomLineAnalysis, BudgetRisk, CategorySavings, CoverageAnalyzer,
    CoverageSummary, IssueSeverity, LineSavings, QuoteAvailability, QuoteFreshnessStats,
    QuoteIndex, RecommendedLine, RecommendedPlan, RequisitionItemSummary, RiskAssessment,
    RiskCategory, RiskFactor, RiskLevel, RiskScore, SavingsSummary, VendorConsolidation,
    VendorSavings,
};
pub use procure_core::{
    BomLine, InMemoryStore, NoRatings, OptimizerConfig, ProcureError, ProcurementStrategy,
    Project, ProjectRequisition, ProjectStore, Quote, QuoteSource, QuoteStatus, RequisitionItem,
    Result, Specification, StrategyKind, VendorRating, VendorRatingSource, VendorRatingSummary,
};
pub use procure_optimizer::{
    AssignedLine, Assignment, ScenarioResult, UncoveredLine, UncoveredReason, VendorAssignment,
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// 專案分析結果
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalysis {
    pub project_id: String,
    pub project_name: String,
    pub budget: Decimal,
    pub analysis_date: NaiveDate,

    /// 呼叫方選擇的策略
    pub strategy: ProcurementStrategy,

    /// 每個 BOM 行的覆蓋分析（BOM 順序）
    pub bom_analyses: Vec<BomLineAnalysis>,

    pub coverage: CoverageSummary,

    /// 供應商整合機會
    pub vendor_consolidation: Vec<VendorConsolidation>,

    /// 推薦的供應商分配
    pub assignment: Assignment,

    pub recommended_plan: RecommendedPlan,

    /// 未分配的 BOM 行與原因
    pub uncovered_lines: Vec<UncoveredLine>,

    pub risk_assessment: RiskAssessment,

    pub savings_summary: SavingsSummary,

    pub quote_freshness: QuoteFreshnessStats,

    /// 彙總的非致命問題（報價查詢失敗、資料品質）
    pub issues: Vec<AnalysisIssue>,

    /// 計算時間（毫秒）
    #[serde(skip)]
    pub calculation_time_ms: u128,
}

impl ProjectAnalysis {
    /// 指定 BOM 行的分析
    pub fn bom_line(&self, bom_line_id: &str) -> Option<&BomLineAnalysis> {
        self.bom_analyses
            .iter()
            .find(|a| a.bom_line_id == bom_line_id)
    }

    /// 是否有任何報價查詢失敗
    pub fn has_data_issues(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error)
    }
}
