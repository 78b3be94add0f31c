//! 情境比較

use procure_core::{ProcurementStrategy, Result, StrategyKind};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::assignment::Assignment;
use crate::{AssignmentOptimizer, OptimizerInput};

/// 單一策略的情境結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub strategy: StrategyKind,
    pub name: String,
    pub vendor_count: usize,
    pub total_cost: Decimal,
    /// 預算 − 總成本（可為負）
    pub savings_vs_budget: Decimal,
    pub covered_lines: usize,
    pub uncovered_lines: usize,
    /// 使用供應商的平均評分（無評分時為 None）
    pub average_vendor_rating: Option<f64>,
    /// 供應商 → BOM 行
    pub vendor_lines: BTreeMap<String, Vec<String>>,
    pub trade_off: String,
}

/// 情境比較器
pub struct ScenarioComparator;

impl ScenarioComparator {
    /// 以四種固定策略各執行一次，結果按總成本升序
    ///
    /// `base` 的供應商限制、偏好與排除清單套用到每個策略。
    pub fn compare(
        input: &OptimizerInput<'_>,
        base: &ProcurementStrategy,
        budget: Decimal,
    ) -> Result<Vec<ScenarioResult>> {
        base.validate()?;
        input.config.validate()?;

        let assignments: Vec<Assignment> = StrategyKind::ALL
            .par_iter()
            .map(|kind| AssignmentOptimizer::optimize(input, &base.with_kind(*kind)))
            .collect::<Result<Vec<_>>>()?;

        let baseline = assignments
            .iter()
            .find(|a| a.strategy == StrategyKind::LowestCost)
            .map(|a| (a.total_cost, a.vendor_count()));

        let mut results: Vec<ScenarioResult> = assignments
            .iter()
            .map(|assignment| Self::describe(input, assignment, budget, baseline))
            .collect();

        results.sort_by(|a, b| {
            a.total_cost
                .cmp(&b.total_cost)
                .then_with(|| a.strategy.cmp(&b.strategy))
        });

        Ok(results)
    }

    /// 由分配結果建立情境描述
    pub fn describe(
        input: &OptimizerInput<'_>,
        assignment: &Assignment,
        budget: Decimal,
        baseline: Option<(Decimal, usize)>,
    ) -> ScenarioResult {
        let ratings: Vec<f64> = assignment
            .vendors
            .iter()
            .filter_map(|v| input.ratings.get(&v.vendor_id))
            .filter(|r| r.is_rated())
            .map(|r| r.overall_avg)
            .collect();
        let average_vendor_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        let mut trade_off = match (assignment.strategy, baseline) {
            (StrategyKind::LowestCost, _) | (_, None) => {
                format!("成本最低的基準方案，使用 {} 家供應商", assignment.vendor_count())
            }
            (_, Some((base_cost, base_vendors))) => {
                let cost_delta = assignment.total_cost - base_cost;
                let vendor_delta = assignment.vendor_count() as i64 - base_vendors as i64;
                if cost_delta.is_zero() && vendor_delta == 0 {
                    "與最低成本方案相同".to_string()
                } else {
                    format!(
                        "較最低成本方案成本 {:+}，供應商 {:+} 家",
                        cost_delta, vendor_delta
                    )
                }
            }
        };

        let limited = assignment
            .uncovered
            .iter()
            .filter(|u| !matches!(u.reason, crate::UncoveredReason::NoQuotes | crate::UncoveredReason::DataUnavailable))
            .count();
        if limited > 0 {
            trade_off.push_str(&format!("；{} 個 BOM 行受限未分配", limited));
        }
        if let Some(rating) = average_vendor_rating {
            trade_off.push_str(&format!("；供應商平均評分 {:.1}", rating));
        }

        ScenarioResult {
            strategy: assignment.strategy,
            name: assignment.strategy.title().to_string(),
            vendor_count: assignment.vendor_count(),
            total_cost: assignment.total_cost,
            savings_vs_budget: budget - assignment.total_cost,
            covered_lines: assignment.covered_count(),
            uncovered_lines: assignment.uncovered.len(),
            average_vendor_rating,
            vendor_lines: assignment.vendor_lines(),
            trade_off,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use procure_core::VendorRatingSummary;
    use std::collections::HashMap;

    #[test]
    fn test_compare_example() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let results = ScenarioComparator::compare(
            &input,
            &ProcurementStrategy::default(),
            Decimal::from(10_000),
        )
        .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].total_cost <= w[1].total_cost));

        let lowest = results.iter().find(|r| r.strategy == StrategyKind::LowestCost).unwrap();
        assert_eq!(lowest.total_cost, Decimal::from(850));
        assert_eq!(lowest.savings_vs_budget, Decimal::from(9150));

        let fewest = results.iter().find(|r| r.strategy == StrategyKind::FewestVendors).unwrap();
        assert_eq!(fewest.total_cost, Decimal::from(900));
        assert_eq!(fewest.vendor_count, 1);
        assert_eq!(fewest.savings_vs_budget, Decimal::from(9100));
        assert!(fewest.trade_off.contains("+50"));

        // 同成本時保持固定策略順序
        assert_eq!(results[0].strategy, StrategyKind::LowestCost);
        assert_eq!(results[1].strategy, StrategyKind::QualityFocused);
    }

    #[test]
    fn test_compare_is_idempotent() {
        let f = two_line_example();
        let mut ratings = HashMap::new();
        ratings.insert("X".to_string(), VendorRatingSummary::from_overall("X", 4.0));
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let base = ProcurementStrategy::default();

        let first = ScenarioComparator::compare(&input, &base, Decimal::from(10_000)).unwrap();
        let second = ScenarioComparator::compare(&input, &base, Decimal::from(10_000)).unwrap();

        assert_eq!(first, second);
        let fewest = first.iter().find(|r| r.strategy == StrategyKind::FewestVendors).unwrap();
        assert_eq!(fewest.average_vendor_rating, Some(4.0));
    }

    #[test]
    fn test_negative_savings_allowed() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let results = ScenarioComparator::compare(&input, &ProcurementStrategy::default(), Decimal::from(500)).unwrap();
        assert_eq!(results[0].savings_vs_budget, Decimal::from(-350));
    }

    #[test]
    fn test_lowest_cost_stays_floor_with_preferred_vendor() {
        // A：X $100、P $101（容差 2% 內），B：僅 X $50
        let f = fixture(
            &[("A", 1), ("B", 1)],
            &[("X", "A", 100), ("P", "A", 101), ("X", "B", 50)],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let base = ProcurementStrategy::default().with_preferred_vendor("P");

        let results = ScenarioComparator::compare(&input, &base, Decimal::from(10_000)).unwrap();

        let lowest = results.iter().find(|r| r.strategy == StrategyKind::LowestCost).unwrap();
        assert_eq!(lowest.total_cost, Decimal::from(150));
        assert_eq!(results[0].strategy, StrategyKind::LowestCost);
        assert!(results.iter().all(|r| r.total_cost >= lowest.total_cost));

        // 品質優先仍在容差內採用偏好供應商
        let quality = results.iter().find(|r| r.strategy == StrategyKind::QualityFocused).unwrap();
        assert_eq!(quality.total_cost, Decimal::from(151));
    }
}
