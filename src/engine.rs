//! 採購優化引擎

use chrono::NaiveDate;
use procure_cache::AnalysisContext;
use procure_calc::{
    AnalysisIssue, BomLineAnalysis, ConsolidationAnalyzer, CoverageAnalyzer, LineQuotes,
    QuoteFreshnessStats, QuoteIndex, RiskAssessor, SavingsSummarizer, VendorConsolidation,
};
use procure_core::{
    OptimizerConfig, ProcureError, ProcurementStrategy, Project, ProjectStore, QuoteSource,
    Result, Specification, VendorRatingSource, VendorRatingSummary,
};
use procure_optimizer::{
    AssignmentOptimizer, OptimizerInput, ScenarioComparator, ScenarioResult, UncoveredReason,
};
use std::collections::{BTreeSet, HashMap};

use crate::ProjectAnalysis;

/// 單次分析所需的已載入資料
///
/// 所有協作方 I/O 在建立時完成，之後的計算只讀取這些資料。
struct PreparedProject {
    project: Project,
    context: AnalysisContext,
    analyses: Vec<BomLineAnalysis>,
    consolidation: Vec<VendorConsolidation>,
    ratings: HashMap<String, VendorRatingSummary>,
    issues: Vec<AnalysisIssue>,
}

/// 採購優化引擎
///
/// 引擎在兩次呼叫之間不保存狀態；報價快取只存在於單次呼叫的 `AnalysisContext`。
pub struct ProcurementEngine<S, Q, R> {
    store: S,
    quotes: Q,
    ratings: R,
    analysis_date: NaiveDate,
    config: OptimizerConfig,
}

impl<S, Q, R> ProcurementEngine<S, Q, R>
where
    S: ProjectStore,
    Q: QuoteSource,
    R: VendorRatingSource,
{
    /// 創建新的引擎（分析基準日預設為今天）
    pub fn new(store: S, quotes: Q, ratings: R) -> Self {
        Self {
            store,
            quotes,
            ratings,
            analysis_date: chrono::Local::now().date_naive(),
            config: OptimizerConfig::default(),
        }
    }

    /// 建構器模式：設置分析基準日
    pub fn with_analysis_date(mut self, analysis_date: NaiveDate) -> Self {
        self.analysis_date = analysis_date;
        self
    }

    /// 建構器模式：設置優化器配置
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn analysis_date(&self) -> NaiveDate {
        self.analysis_date
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// 完整專案分析
    ///
    /// 未知專案是唯一的致命錯誤；個別規格的報價查詢失敗會記錄在 `issues`，
    /// 受影響的 BOM 行標記為 `data_unavailable`，其他行照常完成。
    pub fn analyze_project(
        &self,
        project_id: &str,
        strategy: &ProcurementStrategy,
    ) -> Result<ProjectAnalysis> {
        strategy.validate()?;
        self.config.validate()?;

        let start_time = std::time::Instant::now();

        let prepared = self.prepare(project_id)?;
        let PreparedProject {
            project,
            context,
            analyses,
            consolidation,
            ratings,
            mut issues,
        } = prepared;

        let config = &context.config;

        // Step 4: 分配優化
        tracing::debug!("Step 4: 分配優化（{}）", strategy.kind);
        let input = OptimizerInput::new(&analyses, &consolidation, &ratings, config);
        let assignment = AssignmentOptimizer::optimize(&input, strategy)?;
        let plan = assignment.to_plan();

        for uncovered in &assignment.uncovered {
            match uncovered.reason {
                UncoveredReason::VendorLimitExceeded | UncoveredReason::VendorFiltered => {
                    issues.push(AnalysisIssue::warning(
                        &uncovered.bom_line_id,
                        format!("BOM 行未分配: {}", uncovered.reason),
                    ));
                }
                UncoveredReason::NoQuotes | UncoveredReason::DataUnavailable => {}
            }
        }

        // Step 5: 報價新鮮度
        tracing::debug!("Step 5: 報價新鮮度");
        let specification_ids = project.specification_ids();
        let quote_freshness = QuoteFreshnessStats::compute(
            specification_ids
                .iter()
                .flat_map(|id| context.raw_quotes(id).iter()),
            context.as_of,
            config.stale_after_days,
        );

        // Step 6: 風險與節省
        tracing::debug!("Step 6: 風險與節省彙總");
        let risk_assessment = RiskAssessor::assess(
            &analyses,
            &plan,
            project.budget,
            &ratings,
            &quote_freshness,
            config,
        );
        let savings_summary = SavingsSummarizer::summarize(
            &analyses,
            &plan,
            project.budget,
            consolidation.len(),
            config,
        );

        let coverage = CoverageAnalyzer::summarize(&analyses);
        let cache_stats = context.cache().stats();
        let elapsed = start_time.elapsed().as_millis();

        tracing::info!(
            "專案 {} 分析完成：{} 個 BOM 行，{} 家推薦供應商，總成本 {}，風險 {}，問題 {} 筆，耗時 {} ms",
            project.id,
            analyses.len(),
            assignment.vendor_count(),
            assignment.total_cost,
            risk_assessment.overall,
            issues.len(),
            elapsed
        );
        tracing::debug!("報價快取: {:?}", cache_stats);

        Ok(ProjectAnalysis {
            project_id: project.id,
            project_name: project.name,
            budget: project.budget,
            analysis_date: context.as_of,
            strategy: strategy.clone(),
            uncovered_lines: assignment.uncovered.clone(),
            bom_analyses: analyses,
            coverage,
            vendor_consolidation: consolidation,
            assignment,
            recommended_plan: plan,
            risk_assessment,
            savings_summary,
            quote_freshness,
            issues,
            calculation_time_ms: elapsed,
        })
    }

    /// 以預設基準策略比較四種情境
    pub fn compare_scenarios(&self, project_id: &str) -> Result<Vec<ScenarioResult>> {
        self.compare_scenarios_with(project_id, &ProcurementStrategy::default())
    }

    /// 比較四種情境；`base` 的供應商限制、偏好與排除清單套用到每個策略
    pub fn compare_scenarios_with(
        &self,
        project_id: &str,
        base: &ProcurementStrategy,
    ) -> Result<Vec<ScenarioResult>> {
        base.validate()?;
        self.config.validate()?;

        let start_time = std::time::Instant::now();
        let prepared = self.prepare(project_id)?;

        let input = OptimizerInput::new(
            &prepared.analyses,
            &prepared.consolidation,
            &prepared.ratings,
            &prepared.context.config,
        );
        let results = ScenarioComparator::compare(&input, base, prepared.project.budget)?;

        tracing::info!(
            "專案 {} 情境比較完成：{} 個情境，耗時 {} ms",
            prepared.project.id,
            results.len(),
            start_time.elapsed().as_millis()
        );

        Ok(results)
    }

    /// 單一 BOM 行分析
    pub fn analyze_bom_line(&self, project_id: &str, bom_line_id: &str) -> Result<BomLineAnalysis> {
        let project = self.store.load_project(project_id)?;
        let line = project
            .bom_line(bom_line_id)
            .ok_or_else(|| ProcureError::BomLineNotFound(bom_line_id.to_string()))?;

        let mut context = AnalysisContext::new(self.analysis_date, self.config.clone());
        let specification_ids = vec![line.specification_id.clone()];
        let index = QuoteIndex::build(&mut context, &specification_ids, &self.quotes);
        let specification = self.store.specification(&line.specification_id);

        Ok(CoverageAnalyzer::analyze_line(
            &project,
            line,
            specification.as_ref(),
            index.lookup(&line.specification_id),
        ))
    }

    /// 載入專案並完成覆蓋與整合分析
    fn prepare(&self, project_id: &str) -> Result<PreparedProject> {
        let project = self.store.load_project(project_id)?;

        tracing::info!(
            "開始專案分析 {}：BOM 行 {} 個，請購單 {} 張",
            project.id,
            project.bom_lines.len(),
            project.requisitions.len()
        );

        let mut issues = Vec::new();
        let specification_ids = project.specification_ids();

        // Step 1: 報價索引（所有 I/O 在並行階段之前完成）
        tracing::debug!("Step 1: 報價索引（{} 個規格）", specification_ids.len());
        let mut context = AnalysisContext::new(self.analysis_date, self.config.clone());
        let index = QuoteIndex::build(&mut context, &specification_ids, &self.quotes);

        for specification_id in context.cache().failed_specifications() {
            tracing::warn!("規格 {} 報價查詢失敗，相關 BOM 行標記為資料不可用", specification_id);
            let message = match index.lookup(&specification_id) {
                LineQuotes::Unavailable(message) => message.to_string(),
                LineQuotes::Eligible(_) => {
                    ProcureError::data_unavailable(&specification_id, "報價查詢失敗").to_string()
                }
            };
            issues.push(AnalysisIssue::error(&specification_id, message));
        }

        let mut specifications: HashMap<String, Specification> = HashMap::new();
        for specification_id in &specification_ids {
            match self.store.specification(specification_id) {
                Some(specification) => {
                    specifications.insert(specification_id.clone(), specification);
                }
                None => issues.push(AnalysisIssue::info(
                    specification_id,
                    "目錄中找不到規格，以規格ID代替名稱與類別",
                )),
            }
        }

        let vendor_ids: BTreeSet<&str> = specification_ids
            .iter()
            .flat_map(|id| index.eligible(id))
            .map(|q| q.vendor_id.as_str())
            .collect();
        let ratings: HashMap<String, VendorRatingSummary> = vendor_ids
            .into_iter()
            .filter_map(|vendor_id| {
                self.ratings
                    .rating_summary(vendor_id)
                    .map(|summary| (vendor_id.to_string(), summary))
            })
            .collect();
        tracing::debug!("供應商評分: {} 家", ratings.len());

        // Step 2: BOM 覆蓋分析（並行）
        tracing::debug!("Step 2: BOM 覆蓋分析");
        let analyses = CoverageAnalyzer::analyze_project(&project, &index, &specifications);

        for analysis in analyses.iter().filter(|a| a.over_planned) {
            issues.push(AnalysisIssue::warning(
                &analysis.bom_line_id,
                format!(
                    "請購數量 {} 超過需求量 {}",
                    analysis.quantity_planned, analysis.quantity_needed
                ),
            ));
        }

        // Step 3: 供應商整合分析
        tracing::debug!("Step 3: 供應商整合分析");
        let consolidation = ConsolidationAnalyzer::analyze(&analyses, &ratings, &context.config);
        tracing::debug!("可用供應商: {} 家", consolidation.len());

        Ok(PreparedProject {
            project,
            context,
            analyses,
            consolidation,
            ratings,
            issues,
        })
    }
}
