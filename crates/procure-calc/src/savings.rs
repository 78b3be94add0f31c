//! 節省彙總

use procure_core::OptimizerConfig;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::coverage::BomLineAnalysis;
use crate::plan::RecommendedPlan;

/// 單行節省（以有目標價的計劃量比較）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSavings {
    pub bom_line_id: String,
    pub category: String,
    pub targeted_quantity: u64,
    /// 加權平均目標單價
    pub target_unit_price: Option<Decimal>,
    pub recommended_unit_price: Option<Decimal>,
    pub best_unit_price: Option<Decimal>,
    pub savings_per_unit: Option<Decimal>,
    pub total_savings: Option<Decimal>,
    pub savings_percent: Option<Decimal>,
}

/// 分類節省；無目標價的分類 `savings_percent` 為 None（不推斷為 0）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySavings {
    pub category: String,
    pub line_count: usize,
    pub target_total_cost: Option<Decimal>,
    pub recommended_total_cost: Decimal,
    pub savings: Option<Decimal>,
    pub savings_percent: Option<Decimal>,
}

/// 供應商節省（相對最差情況）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSavings {
    pub vendor_id: String,
    pub line_count: usize,
    pub recommended_cost: Decimal,
    pub worst_case_cost: Decimal,
    pub savings_vs_worst_case: Decimal,
}

/// 專案節省彙總
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub budget: Decimal,
    pub recommended_total_cost: Decimal,
    /// 所有有報價行的最低價總和
    pub best_case_cost: Decimal,
    /// 推薦行的最高價總和
    pub worst_case_cost: Decimal,
    pub target_total_cost: Option<Decimal>,
    pub savings_vs_budget: Decimal,
    pub savings_vs_target: Option<Decimal>,
    pub savings_vs_worst_case: Decimal,
    pub savings_percent_vs_budget: Option<Decimal>,
    /// 未使用的潛在供應商 × 每家估計節省
    pub consolidation_savings: Decimal,
    pub lines: Vec<LineSavings>,
    pub categories: Vec<CategorySavings>,
    pub vendors: Vec<VendorSavings>,
}

fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        None
    } else {
        Some((part / whole * Decimal::ONE_HUNDRED).round_dp(2))
    }
}

fn add_optional(acc: Option<Decimal>, value: Option<Decimal>) -> Option<Decimal> {
    match (acc, value) {
        (Some(a), Some(v)) => Some(a + v),
        (None, v) => v,
        (a, None) => a,
    }
}

/// 節省彙總器
pub struct SavingsSummarizer;

impl SavingsSummarizer {
    /// 單行節省
    pub fn line_savings(analysis: &BomLineAnalysis, plan: &RecommendedPlan) -> LineSavings {
        let recommended_unit_price = plan.line(&analysis.bom_line_id).map(|l| l.unit_price);
        let target_unit_price = analysis
            .target_total_cost
            .filter(|_| analysis.targeted_quantity > 0)
            .map(|total| total / Decimal::from(analysis.targeted_quantity));

        let (savings_per_unit, total_savings, savings_percent) =
            match (analysis.target_total_cost, target_unit_price, recommended_unit_price) {
                (Some(target_total), Some(target_unit), Some(recommended)) => {
                    let total = target_total
                        - recommended * Decimal::from(analysis.targeted_quantity);
                    (
                        Some(target_unit - recommended),
                        Some(total),
                        percent_of(total, target_total),
                    )
                }
                _ => (None, None, None),
            };

        LineSavings {
            bom_line_id: analysis.bom_line_id.clone(),
            category: analysis.category.clone(),
            targeted_quantity: analysis.targeted_quantity,
            target_unit_price,
            recommended_unit_price,
            best_unit_price: analysis.best_unit_price(),
            savings_per_unit,
            total_savings,
            savings_percent,
        }
    }

    /// 彙總節省
    pub fn summarize(
        analyses: &[BomLineAnalysis],
        plan: &RecommendedPlan,
        budget: Decimal,
        potential_vendor_count: usize,
        config: &OptimizerConfig,
    ) -> SavingsSummary {
        let lines: Vec<LineSavings> = analyses
            .iter()
            .map(|a| Self::line_savings(a, plan))
            .collect();

        let recommended_total_cost = plan.total_cost();
        let best_case_cost: Decimal = analyses.iter().filter_map(|a| a.best_total_cost).sum();

        let worst_case_cost: Decimal = analyses
            .iter()
            .filter(|a| plan.line(&a.bom_line_id).is_some())
            .filter_map(|a| a.worst_total_cost)
            .sum();

        let target_total_cost = analyses
            .iter()
            .fold(None, |acc, a| add_optional(acc, a.target_total_cost));
        let savings_vs_target = lines
            .iter()
            .fold(None, |acc, l| add_optional(acc, l.total_savings));

        // 分類（按名稱排序）
        let mut categories: BTreeMap<&str, CategorySavings> = BTreeMap::new();
        for (analysis, line) in analyses.iter().zip(&lines) {
            let entry = categories
                .entry(analysis.category.as_str())
                .or_insert_with(|| CategorySavings {
                    category: analysis.category.clone(),
                    line_count: 0,
                    target_total_cost: None,
                    recommended_total_cost: Decimal::ZERO,
                    savings: None,
                    savings_percent: None,
                });
            entry.line_count += 1;
            entry.target_total_cost = add_optional(entry.target_total_cost, analysis.target_total_cost);
            if let Some(recommended) = plan.line(&analysis.bom_line_id) {
                entry.recommended_total_cost += recommended.total_cost;
            }
            entry.savings = add_optional(entry.savings, line.total_savings);
        }
        let categories: Vec<CategorySavings> = categories
            .into_values()
            .map(|mut c| {
                c.savings_percent = match (c.savings, c.target_total_cost) {
                    (Some(savings), Some(target)) => percent_of(savings, target),
                    _ => None,
                };
                c
            })
            .collect();

        // 供應商
        let mut vendors: BTreeMap<&str, VendorSavings> = BTreeMap::new();
        for analysis in analyses {
            let Some(recommended) = plan.line(&analysis.bom_line_id) else {
                continue;
            };
            let entry = vendors
                .entry(recommended.vendor_id.as_str())
                .or_insert_with(|| VendorSavings {
                    vendor_id: recommended.vendor_id.clone(),
                    line_count: 0,
                    recommended_cost: Decimal::ZERO,
                    worst_case_cost: Decimal::ZERO,
                    savings_vs_worst_case: Decimal::ZERO,
                });
            entry.line_count += 1;
            entry.recommended_cost += recommended.total_cost;
            entry.worst_case_cost += analysis.worst_total_cost.unwrap_or(recommended.total_cost);
        }
        let vendors: Vec<VendorSavings> = vendors
            .into_values()
            .map(|mut v| {
                v.savings_vs_worst_case = v.worst_case_cost - v.recommended_cost;
                v
            })
            .collect();

        let vendors_avoided = potential_vendor_count.saturating_sub(plan.vendor_count());
        let consolidation_savings =
            config.consolidation_savings_per_vendor * Decimal::from(vendors_avoided as u64);

        let savings_vs_budget = budget - recommended_total_cost;

        SavingsSummary {
            budget,
            recommended_total_cost,
            best_case_cost,
            worst_case_cost,
            target_total_cost,
            savings_vs_budget,
            savings_vs_target,
            savings_vs_worst_case: worst_case_cost - recommended_total_cost,
            savings_percent_vs_budget: percent_of(savings_vs_budget, budget),
            consolidation_savings,
            lines,
            categories,
            vendors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageAnalyzer;
    use crate::plan::RecommendedLine;
    use crate::quote_index::QuoteIndex;
    use chrono::NaiveDate;
    use procure_core::{BomLine, Project, ProjectRequisition, Quote, RequisitionItem, Specification};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn fixture() -> (Vec<BomLineAnalysis>, RecommendedPlan) {
        let project = Project::new("PRJ", "Office", Decimal::from(10_000))
            .with_bom_line(BomLine::new("A", "SPEC-A", 10))
            .with_bom_line(BomLine::new("B", "SPEC-B", 5))
            .with_requisition(
                ProjectRequisition::new("R1")
                    .with_item(RequisitionItem::new("A", 8).with_target_unit_price(Decimal::from(50)))
                    .with_item(RequisitionItem::new("B", 5)),
            );
        let quotes = vec![
            Quote::new("X", "SPEC-A", Decimal::from(50), date()),
            Quote::new("Y", "SPEC-A", Decimal::from(45), date()),
            Quote::new("X", "SPEC-B", Decimal::from(80), date()),
        ];
        let mut specs = HashMap::new();
        specs.insert(
            "SPEC-A".to_string(),
            Specification::new("SPEC-A", "Monitor").with_category("Displays"),
        );
        specs.insert(
            "SPEC-B".to_string(),
            Specification::new("SPEC-B", "Dock").with_category("Accessories"),
        );
        let index = QuoteIndex::from_quotes(&quotes, date());
        let analyses = CoverageAnalyzer::analyze_project(&project, &index, &specs);

        let plan = RecommendedPlan::new()
            .with_line(RecommendedLine {
                bom_line_id: "A".to_string(),
                vendor_id: "Y".to_string(),
                quote_id: Uuid::nil(),
                unit_price: Decimal::from(45),
                quantity: 10,
                total_cost: Decimal::from(450),
            })
            .with_line(RecommendedLine {
                bom_line_id: "B".to_string(),
                vendor_id: "X".to_string(),
                quote_id: Uuid::nil(),
                unit_price: Decimal::from(80),
                quantity: 5,
                total_cost: Decimal::from(400),
            });

        (analyses, plan)
    }

    #[test]
    fn test_line_savings_on_planned_quantity() {
        let (analyses, plan) = fixture();
        let line = SavingsSummarizer::line_savings(&analyses[0], &plan);

        assert_eq!(line.target_unit_price, Some(Decimal::from(50)));
        assert_eq!(line.savings_per_unit, Some(Decimal::from(5)));
        // 8 × (50 − 45)
        assert_eq!(line.total_savings, Some(Decimal::from(40)));
        assert_eq!(line.savings_percent, Some(Decimal::from(10)));

        let no_target = SavingsSummarizer::line_savings(&analyses[1], &plan);
        assert!(no_target.total_savings.is_none());
        assert!(no_target.savings_percent.is_none());
    }

    #[test]
    fn test_summarize() {
        let (analyses, plan) = fixture();
        let summary = SavingsSummarizer::summarize(
            &analyses,
            &plan,
            Decimal::from(10_000),
            3,
            &OptimizerConfig::default(),
        );

        assert_eq!(summary.recommended_total_cost, Decimal::from(850));
        assert_eq!(summary.savings_vs_budget, Decimal::from(9150));
        assert_eq!(summary.best_case_cost, Decimal::from(850));
        assert_eq!(summary.worst_case_cost, Decimal::from(900));
        assert_eq!(summary.savings_vs_worst_case, Decimal::from(50));
        assert_eq!(summary.target_total_cost, Some(Decimal::from(400)));
        assert_eq!(summary.savings_vs_target, Some(Decimal::from(40)));
        assert_eq!(summary.consolidation_savings, Decimal::from(250));

        let accessories = &summary.categories[0];
        assert_eq!(accessories.category, "Accessories");
        assert!(accessories.target_total_cost.is_none());
        assert!(accessories.savings_percent.is_none());
        assert_eq!(accessories.recommended_total_cost, Decimal::from(400));

        let displays = &summary.categories[1];
        assert_eq!(displays.savings, Some(Decimal::from(40)));
        assert_eq!(displays.savings_percent, Some(Decimal::from(10)));

        assert_eq!(summary.vendors.len(), 2);
        assert_eq!(summary.vendors[1].vendor_id, "Y");
        assert_eq!(summary.vendors[1].savings_vs_worst_case, Decimal::from(50));
    }
}
