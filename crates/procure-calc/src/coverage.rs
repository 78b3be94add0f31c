//! BOM 覆蓋分析

use procure_core::{BomLine, Project, Quote, Specification};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::quote_index::{LineQuotes, QuoteIndex};
use crate::risk::RiskLevel;

/// 請購項目摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequisitionItemSummary {
    pub item_id: Uuid,
    pub requisition_name: String,
    pub quantity_planned: u32,
    pub target_unit_price: Option<Decimal>,
    pub selected_quote_id: Option<Uuid>,
    pub procurement_status: String,
}

/// BOM 行的報價狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteAvailability {
    Available,
    NoQuotes,
    /// 報價查詢失敗（附錯誤訊息）
    DataUnavailable(String),
}

/// 單一 BOM 行的覆蓋分析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomLineAnalysis {
    pub bom_line_id: String,
    pub specification_id: String,
    pub specification_name: String,
    pub category: String,

    /// BOM 需求量
    pub quantity_needed: u32,

    /// 請購計劃量合計（多筆請購累加可能超過 u32）
    pub quantity_planned: u64,

    /// 覆蓋率（0-100，兩位小數）
    pub coverage_percent: Decimal,

    /// 計劃量不足
    pub has_gaps: bool,

    /// 計劃量超過需求（資料品質提示，不拒絕）
    pub over_planned: bool,

    pub requisition_items: Vec<RequisitionItemSummary>,

    /// 合格報價（按參考幣別單價升序）
    pub eligible_quotes: Vec<Quote>,

    pub availability: QuoteAvailability,

    /// 最低價報價
    pub best_quote: Option<Quote>,

    /// 最低價 × 需求量
    pub best_total_cost: Option<Decimal>,

    /// 最高價 × 需求量
    pub worst_total_cost: Option<Decimal>,

    /// Σ 目標單價 × 計劃量（無目標價時為 None）
    pub target_total_cost: Option<Decimal>,

    /// 有目標價的計劃量
    pub targeted_quantity: u64,

    /// 目標成本 − 最低價 × 有目標價的計劃量
    pub savings_vs_target: Option<Decimal>,

    pub risk: RiskLevel,
}

impl BomLineAnalysis {
    pub fn has_quotes(&self) -> bool {
        !self.eligible_quotes.is_empty()
    }

    pub fn is_data_unavailable(&self) -> bool {
        matches!(self.availability, QuoteAvailability::DataUnavailable(_))
    }

    /// 恰好一筆合格報價
    pub fn is_single_source(&self) -> bool {
        self.eligible_quotes.len() == 1
    }

    pub fn best_unit_price(&self) -> Option<Decimal> {
        self.best_quote.as_ref().map(|q| q.normalized_unit_price)
    }

    /// 完全覆蓋：有報價且覆蓋率達 100%
    pub fn is_fully_covered(&self) -> bool {
        self.has_quotes() && self.coverage_percent >= Decimal::ONE_HUNDRED
    }

    pub fn is_partially_covered(&self) -> bool {
        self.has_quotes() && self.coverage_percent < Decimal::ONE_HUNDRED
    }

    /// 每家供應商的最佳報價（按價格順序）
    pub fn vendor_offers(&self) -> Vec<&Quote> {
        let mut seen: Vec<&str> = Vec::new();
        let mut offers = Vec::new();
        for quote in &self.eligible_quotes {
            if !seen.contains(&quote.vendor_id.as_str()) {
                seen.push(&quote.vendor_id);
                offers.push(quote);
            }
        }
        offers
    }

    /// 預估支出：有目標價時用目標成本，否則以最低價採購需求量
    ///
    /// 不依計劃量計算，未請購的行仍計入市場價支出。
    pub fn planned_spend(&self) -> Decimal {
        self.target_total_cost
            .or(self.best_total_cost)
            .unwrap_or(Decimal::ZERO)
    }
}

/// 覆蓋統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub total_lines: usize,
    pub fully_covered: usize,
    pub partially_covered: usize,
    /// 無合格報價（含查詢失敗）
    pub uncovered: usize,
    pub total_quantity_needed: u64,
    pub total_quantity_planned: u64,
}

/// 覆蓋分析器
pub struct CoverageAnalyzer;

impl CoverageAnalyzer {
    /// 覆蓋率 = min(100, 100 × 計劃量 / 需求量)
    pub fn coverage_percent(quantity_planned: u64, quantity_needed: u32) -> Decimal {
        if quantity_needed == 0 {
            return Decimal::ONE_HUNDRED;
        }
        let percent = Decimal::from(quantity_planned) * Decimal::ONE_HUNDRED
            / Decimal::from(quantity_needed);
        percent.min(Decimal::ONE_HUNDRED).round_dp(2)
    }

    /// 風險分級
    ///
    /// - high: 無合格報價或覆蓋率為 0
    /// - medium: 單一報價或覆蓋率不足 100
    /// - low: 其他
    pub fn classify_risk(eligible_count: usize, coverage_percent: Decimal) -> RiskLevel {
        if eligible_count == 0 || coverage_percent.is_zero() {
            RiskLevel::High
        } else if eligible_count == 1 || coverage_percent < Decimal::ONE_HUNDRED {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// 分析單一 BOM 行（純函數）
    pub fn analyze_line(
        project: &Project,
        line: &BomLine,
        specification: Option<&Specification>,
        quotes: LineQuotes<'_>,
    ) -> BomLineAnalysis {
        let requisition_items: Vec<RequisitionItemSummary> = project
            .requisition_items_for(&line.id)
            .map(|(requisition_name, item)| RequisitionItemSummary {
                item_id: item.id,
                requisition_name: requisition_name.to_string(),
                quantity_planned: item.quantity_planned,
                target_unit_price: item.target_unit_price,
                selected_quote_id: item.selected_quote_id,
                procurement_status: item.procurement_status.clone(),
            })
            .collect();

        let quantity_planned: u64 = requisition_items
            .iter()
            .map(|i| u64::from(i.quantity_planned))
            .sum();
        let coverage_percent = Self::coverage_percent(quantity_planned, line.quantity_needed);

        let (eligible_quotes, availability) = match quotes {
            LineQuotes::Eligible([]) => (Vec::new(), QuoteAvailability::NoQuotes),
            LineQuotes::Eligible(quotes) => (quotes.to_vec(), QuoteAvailability::Available),
            LineQuotes::Unavailable(message) => (
                Vec::new(),
                QuoteAvailability::DataUnavailable(message.to_string()),
            ),
        };

        let best_quote = eligible_quotes.first().cloned();
        let best_total_cost = best_quote.as_ref().map(|q| q.total_for(line.quantity_needed));
        let worst_total_cost = eligible_quotes
            .last()
            .map(|q| q.total_for(line.quantity_needed));

        let mut target_total_cost: Option<Decimal> = None;
        let mut targeted_quantity = 0u64;
        for item in &requisition_items {
            if let Some(target) = item.target_unit_price {
                *target_total_cost.get_or_insert(Decimal::ZERO) +=
                    target * Decimal::from(item.quantity_planned);
                targeted_quantity += u64::from(item.quantity_planned);
            }
        }

        let savings_vs_target = match (target_total_cost, best_quote.as_ref()) {
            (Some(target), Some(best)) => {
                Some(target - best.normalized_unit_price * Decimal::from(targeted_quantity))
            }
            _ => None,
        };

        let risk = Self::classify_risk(eligible_quotes.len(), coverage_percent);

        BomLineAnalysis {
            bom_line_id: line.id.clone(),
            specification_id: line.specification_id.clone(),
            specification_name: specification
                .map(|s| s.name.clone())
                .unwrap_or_else(|| line.specification_id.clone()),
            category: specification
                .map(|s| s.category_name().to_string())
                .unwrap_or_else(|| line.specification_id.clone()),
            quantity_needed: line.quantity_needed,
            quantity_planned,
            coverage_percent,
            has_gaps: quantity_planned < u64::from(line.quantity_needed),
            over_planned: quantity_planned > u64::from(line.quantity_needed),
            requisition_items,
            eligible_quotes,
            availability,
            best_quote,
            best_total_cost,
            worst_total_cost,
            target_total_cost,
            targeted_quantity,
            savings_vs_target,
            risk,
        }
    }

    /// 並行分析所有 BOM 行，結果保持 BOM 順序
    pub fn analyze_project(
        project: &Project,
        index: &QuoteIndex,
        specifications: &HashMap<String, Specification>,
    ) -> Vec<BomLineAnalysis> {
        tracing::debug!("覆蓋分析: {} 個 BOM 行", project.bom_lines.len());

        project
            .bom_lines
            .par_iter()
            .map(|line| {
                Self::analyze_line(
                    project,
                    line,
                    specifications.get(&line.specification_id),
                    index.lookup(&line.specification_id),
                )
            })
            .collect()
    }

    /// 覆蓋統計
    pub fn summarize(analyses: &[BomLineAnalysis]) -> CoverageSummary {
        let mut summary = CoverageSummary {
            total_lines: analyses.len(),
            ..Default::default()
        };

        for analysis in analyses {
            if analysis.is_fully_covered() {
                summary.fully_covered += 1;
            } else if analysis.is_partially_covered() {
                summary.partially_covered += 1;
            } else {
                summary.uncovered += 1;
            }
            summary.total_quantity_needed += u64::from(analysis.quantity_needed);
            summary.total_quantity_planned += analysis.quantity_planned;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use procure_core::{ProjectRequisition, QuoteStatus, RequisitionItem};
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn project() -> Project {
        Project::new("PRJ", "Office", Decimal::from(10_000))
            .with_bom_line(BomLine::new("A", "SPEC-MON", 10))
            .with_bom_line(BomLine::new("B", "SPEC-DOCK", 5))
            .with_bom_line(BomLine::new("C", "SPEC-CAB", 4))
            .with_requisition(
                ProjectRequisition::new("Phase 1")
                    .with_item(RequisitionItem::new("A", 4).with_target_unit_price(Decimal::from(48)))
                    .with_item(RequisitionItem::new("B", 7)),
            )
            .with_requisition(
                ProjectRequisition::new("Phase 2")
                    .with_item(RequisitionItem::new("A", 6).with_target_unit_price(Decimal::from(50))),
            )
    }

    #[rstest]
    #[case(0, 10, Decimal::ZERO)]
    #[case(5, 10, Decimal::from(50))]
    #[case(1, 3, Decimal::new(3333, 2))]
    #[case(10, 10, Decimal::ONE_HUNDRED)]
    #[case(15, 10, Decimal::ONE_HUNDRED)]
    #[case(0, 0, Decimal::ONE_HUNDRED)]
    #[case(6_000_000_000, u32::MAX, Decimal::ONE_HUNDRED)]
    #[case(u64::from(u32::MAX), u32::MAX, Decimal::ONE_HUNDRED)]
    fn test_coverage_percent(#[case] planned: u64, #[case] needed: u32, #[case] expected: Decimal) {
        assert_eq!(CoverageAnalyzer::coverage_percent(planned, needed), expected);
    }

    #[rstest]
    #[case(0, Decimal::ONE_HUNDRED, RiskLevel::High)]
    #[case(3, Decimal::ZERO, RiskLevel::High)]
    #[case(1, Decimal::ONE_HUNDRED, RiskLevel::Medium)]
    #[case(3, Decimal::from(60), RiskLevel::Medium)]
    #[case(2, Decimal::ONE_HUNDRED, RiskLevel::Low)]
    fn test_classify_risk(#[case] count: usize, #[case] coverage: Decimal, #[case] expected: RiskLevel) {
        assert_eq!(CoverageAnalyzer::classify_risk(count, coverage), expected);
    }

    #[test]
    fn test_analyze_line_aggregates_requisitions() {
        let project = project();
        let quotes = vec![
            Quote::new("Y", "SPEC-MON", Decimal::from(45), date()),
            Quote::new("X", "SPEC-MON", Decimal::from(50), date()),
        ];
        let spec = Specification::new("SPEC-MON", "27-inch 4K monitor").with_category("Displays");

        let analysis = CoverageAnalyzer::analyze_line(
            &project,
            &project.bom_lines[0],
            Some(&spec),
            LineQuotes::Eligible(&quotes),
        );

        assert_eq!(analysis.quantity_planned, 10);
        assert_eq!(analysis.coverage_percent, Decimal::ONE_HUNDRED);
        assert_eq!(analysis.requisition_items.len(), 2);
        assert_eq!(analysis.category, "Displays");
        assert_eq!(analysis.best_total_cost, Some(Decimal::from(450)));
        assert_eq!(analysis.worst_total_cost, Some(Decimal::from(500)));
        // 4×48 + 6×50 = 492
        assert_eq!(analysis.target_total_cost, Some(Decimal::from(492)));
        assert_eq!(analysis.savings_vs_target, Some(Decimal::from(42)));
        assert_eq!(analysis.risk, RiskLevel::Low);
        assert_eq!(analysis.planned_spend(), Decimal::from(492));
    }

    #[test]
    fn test_no_target_reports_none() {
        let project = project();
        let quotes = vec![Quote::new("X", "SPEC-DOCK", Decimal::from(80), date())];
        let analysis = CoverageAnalyzer::analyze_line(
            &project,
            &project.bom_lines[1],
            None,
            LineQuotes::Eligible(&quotes),
        );

        assert!(analysis.target_total_cost.is_none());
        assert!(analysis.savings_vs_target.is_none());
        assert!(analysis.over_planned);
        assert!(!analysis.has_gaps);
        assert_eq!(analysis.risk, RiskLevel::Medium);
        // 無目標價：最低價 × 需求量 = 80 × 5
        assert_eq!(analysis.planned_spend(), Decimal::from(400));
    }

    #[test]
    fn test_expired_only_line_is_high_risk() {
        let project = project();
        let raw = vec![Quote::new("X", "SPEC-CAB", Decimal::from(20), date())
            .with_status(QuoteStatus::Expired)];
        let index = QuoteIndex::from_quotes(&raw, date());

        let analyses = CoverageAnalyzer::analyze_project(&project, &index, &HashMap::new());
        let c = &analyses[2];

        assert_eq!(c.bom_line_id, "C");
        assert!(c.best_quote.is_none());
        assert_eq!(c.availability, QuoteAvailability::NoQuotes);
        assert_eq!(c.risk, RiskLevel::High);
        assert_eq!(c.coverage_percent, Decimal::ZERO);
    }

    #[test]
    fn test_unavailable_line() {
        let project = project();
        let analysis = CoverageAnalyzer::analyze_line(
            &project,
            &project.bom_lines[0],
            None,
            LineQuotes::Unavailable("timeout"),
        );

        assert!(analysis.is_data_unavailable());
        assert_eq!(analysis.risk, RiskLevel::High);
        assert_eq!(analysis.specification_name, "SPEC-MON");
    }

    #[test]
    fn test_summarize() {
        let project = project();
        let quotes = vec![
            Quote::new("Y", "SPEC-MON", Decimal::from(45), date()),
            Quote::new("X", "SPEC-MON", Decimal::from(50), date()),
            Quote::new("X", "SPEC-DOCK", Decimal::from(80), date()),
        ];
        let index = QuoteIndex::from_quotes(&quotes, date());
        let analyses = CoverageAnalyzer::analyze_project(&project, &index, &HashMap::new());

        let summary = CoverageAnalyzer::summarize(&analyses);
        assert_eq!(summary.total_lines, 3);
        assert_eq!(summary.fully_covered, 2);
        assert_eq!(summary.partially_covered, 0);
        assert_eq!(summary.uncovered, 1);
        assert_eq!(summary.total_quantity_needed, 19);
        assert_eq!(summary.total_quantity_planned, 17);
    }

    #[rstest]
    #[case(&[3_000_000_000, 3_000_000_000], 10, 6_000_000_000)]
    #[case(&[u32::MAX, u32::MAX, 2], u32::MAX, 2 * u64::from(u32::MAX) + 2)]
    fn test_large_requisition_quantities(#[case] planned: &[u32], #[case] needed: u32, #[case] expected: u64) {
        let requisition = planned.iter().fold(ProjectRequisition::new("Bulk"), |req, qty| {
            req.with_item(RequisitionItem::new("BULK", *qty).with_target_unit_price(Decimal::ONE))
        });
        let project = Project::new("PRJ", "Bulk", Decimal::from(10_000))
            .with_bom_line(BomLine::new("BULK", "SPEC-BOLT", needed))
            .with_requisition(requisition);
        let quotes = vec![Quote::new("X", "SPEC-BOLT", Decimal::ONE, date())];

        let analysis = CoverageAnalyzer::analyze_line(
            &project,
            &project.bom_lines[0],
            None,
            LineQuotes::Eligible(&quotes),
        );

        assert_eq!(analysis.quantity_planned, expected);
        assert_eq!(analysis.targeted_quantity, expected);
        assert_eq!(analysis.coverage_percent, Decimal::ONE_HUNDRED);
        assert!(analysis.over_planned);
        assert!(!analysis.has_gaps);
        assert_eq!(analysis.target_total_cost, Some(Decimal::from(expected)));
        assert_eq!(analysis.savings_vs_target, Some(Decimal::ZERO));

        let summary = CoverageAnalyzer::summarize(std::slice::from_ref(&analysis));
        assert_eq!(summary.total_quantity_planned, expected);
    }
}
