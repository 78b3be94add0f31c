//! 平衡策略

use procure_core::{ProcurementStrategy, StrategyKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::assignment::{Assignment, UncoveredReason};
use crate::candidates::{total_cost, vendor_count, CandidatePool, Pick};
use crate::fewest_vendors::FewestVendors;
use crate::lowest_cost::LowestCost;
use crate::{AssignmentStrategy, OptimizerInput};

/// 候選方案
struct BalancedCandidate<'a> {
    picks: Vec<Pick<'a>>,
    vendor_count: usize,
    covered: usize,
    cost: Decimal,
}

impl<'a> BalancedCandidate<'a> {
    fn new(pool: &CandidatePool<'a>, picks: Vec<Pick<'a>>) -> Self {
        Self {
            vendor_count: vendor_count(&picks),
            covered: picks.iter().filter(|p| p.vendor_id().is_some()).count(),
            cost: total_cost(pool, &picks),
            picks,
        }
    }
}

/// 在成本與供應商數之間取捨
///
/// 對每個候選供應商數 N，以前 N 家供應商（貪婪選擇順序，其次整合分析順序）
/// 重新計算最低成本分配，分數 = α × 成本 / 最低成本 + β × 供應商數 / 最少供應商數，取最低分。
pub struct Balanced;

impl AssignmentStrategy for Balanced {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Balanced
    }

    fn assign(&self, input: &OptimizerInput<'_>, strategy: &ProcurementStrategy) -> Assignment {
        let config = input.config;
        let pool = CandidatePool::build(input.analyses, strategy, |_| true);

        let lowest = BalancedCandidate::new(&pool, LowestCost::picks(&pool, strategy, Decimal::ZERO));
        let fewest_outcome = FewestVendors::picks(&pool, strategy, config);
        let fewest = BalancedCandidate::new(&pool, fewest_outcome.picks);

        let rationale = |_: &str, lines: &[crate::AssignedLine]| {
            format!("兼顧成本與供應商數：{} 個 BOM 行", lines.len())
        };

        if lowest.vendor_count == 0 || fewest.vendor_count == 0 {
            return Assignment::from_picks(self.kind(), &pool, &lowest.picks, rationale);
        }

        let min_vendors = fewest.vendor_count;
        let lowest_total = lowest.cost;

        let mut upper = fewest.vendor_count.max(lowest.vendor_count);
        if let Some(max) = strategy.max_vendors {
            upper = upper.min(max as usize);
        }

        let mut order = fewest_outcome.order;
        for vendor in pool.consolidation_order(input.consolidation) {
            if !order.contains(&vendor) {
                order.push(vendor);
            }
        }

        let fallback = lowest.picks.clone();
        let mut candidates = vec![lowest, fewest];
        for n in 1..=upper.min(order.len()) {
            let top = &order[..n];
            let picks = pool.cheapest_picks(
                strategy,
                config.preference_tolerance,
                |vendor| top.contains(&vendor),
                UncoveredReason::VendorLimitExceeded,
            );
            candidates.push(BalancedCandidate::new(&pool, picks));
        }

        // 只比較覆蓋最多的候選
        let best_coverage = candidates.iter().map(|c| c.covered).max().unwrap_or(0);
        candidates.retain(|c| c.covered == best_coverage);

        let score = |c: &BalancedCandidate<'_>| {
            let cost_ratio = if lowest_total.is_zero() {
                1.0
            } else {
                (c.cost / lowest_total).to_f64().unwrap_or(1.0)
            };
            config.balanced_cost_weight * cost_ratio
                + config.balanced_vendor_weight * (c.vendor_count as f64 / min_vendors as f64)
        };

        for candidate in &candidates {
            tracing::debug!(
                "平衡候選: {} 家供應商，成本 {}，分數 {:.4}",
                candidate.vendor_count,
                candidate.cost,
                score(candidate)
            );
        }

        let best = candidates.into_iter().min_by(|a, b| {
            score(a)
                .total_cmp(&score(b))
                .then_with(|| a.vendor_count.cmp(&b.vendor_count))
                .then_with(|| a.cost.cmp(&b.cost))
        });

        let picks = best.map(|b| b.picks).unwrap_or(fallback);
        Assignment::from_picks(self.kind(), &pool, &picks, rationale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::collections::HashMap;

    #[test]
    fn test_balanced_prefers_consolidation_when_cheap() {
        // 最低成本 850 / 2 家：0.6 + 0.8 = 1.4；整合 900 / 1 家：0.635 + 0.4 = 1.035
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let assignment = Balanced.assign(&input, &ProcurementStrategy::new(StrategyKind::Balanced));

        assert_eq!(assignment.vendor_count(), 1);
        assert_eq!(assignment.total_cost, Decimal::from(900));
    }

    #[test]
    fn test_balanced_keeps_cost_when_consolidation_expensive() {
        // 整合到 X 成本翻倍：1.2 + 0.4 = 1.6 > 最低成本 1.4
        let f = fixture(
            &[("A", 10), ("B", 10)],
            &[("X", "A", 10), ("X", "B", 30), ("Y", "B", 10)],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let assignment = Balanced.assign(&input, &ProcurementStrategy::new(StrategyKind::Balanced));

        assert_eq!(assignment.vendor_count(), 2);
        assert_eq!(assignment.total_cost, Decimal::from(200));
    }

    #[test]
    fn test_balanced_with_no_quotes() {
        let f = fixture(&[("A", 1)], &[]);
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let assignment = Balanced.assign(&input, &ProcurementStrategy::new(StrategyKind::Balanced));

        assert!(assignment.vendors.is_empty());
        assert_eq!(assignment.uncovered[0].reason, UncoveredReason::NoQuotes);
    }
}
