//! 最低成本策略

use procure_core::{ProcurementStrategy, StrategyKind};
use rust_decimal::Decimal;

use crate::assignment::{Assignment, UncoveredReason};
use crate::candidates::{cap_vendors, CandidatePool, Pick};
use crate::{AssignmentStrategy, OptimizerInput};

/// 每行獨立選最便宜的供應商；其他策略的成本下限
///
/// 偏好供應商只在同價時優先，不支付容差內的溢價，因此總成本是各行最低價之和。
pub struct LowestCost;

impl LowestCost {
    /// 逐行最低價選擇（套用供應商數上限）
    ///
    /// `tolerance` 為偏好供應商可接受的溢價比例；成本下限使用 `Decimal::ZERO`。
    pub(crate) fn picks<'a>(
        pool: &CandidatePool<'a>,
        strategy: &ProcurementStrategy,
        tolerance: Decimal,
    ) -> Vec<Pick<'a>> {
        let picks = pool.cheapest_picks(strategy, tolerance, |_| true, UncoveredReason::NoQuotes);
        cap_vendors(pool, picks, strategy, tolerance)
    }
}

impl AssignmentStrategy for LowestCost {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LowestCost
    }

    fn assign(&self, input: &OptimizerInput<'_>, strategy: &ProcurementStrategy) -> Assignment {
        let pool = CandidatePool::build(input.analyses, strategy, |_| true);
        let picks = Self::picks(&pool, strategy, Decimal::ZERO);

        Assignment::from_picks(self.kind(), &pool, &picks, |_, lines| {
            format!("{} 個 BOM 行報價最低", lines.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::collections::HashMap;

    #[test]
    fn test_no_quote_line_is_uncovered() {
        let f = fixture(&[("A", 10), ("C", 4)], &[("X", "A", 50)]);
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let assignment = LowestCost.assign(&input, &ProcurementStrategy::new(StrategyKind::LowestCost));

        assert!(assignment.vendor_for("C").is_none());
        assert_eq!(
            assignment.uncovered_line("C").unwrap().reason,
            UncoveredReason::NoQuotes
        );
        assert!(assignment.is_complete());
        assert_eq!(assignment.total_cost, Decimal::from(500));
    }

    #[test]
    fn test_priority_by_spend() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let assignment = LowestCost.assign(&input, &ProcurementStrategy::new(StrategyKind::LowestCost));

        // Y $450 > X $400
        assert_eq!(assignment.vendors[0].vendor_id, "Y");
        assert_eq!(assignment.vendors[0].priority, 1);
        assert_eq!(assignment.vendors[1].priority, 2);
        assert_eq!(assignment.to_plan().total_cost(), Decimal::from(850));
    }

    #[test]
    fn test_max_vendors_reassigns_within_kept() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let strategy = ProcurementStrategy::new(StrategyKind::LowestCost).with_max_vendors(1);

        let assignment = LowestCost.assign(&input, &strategy);

        assert_eq!(assignment.vendor_count(), 1);
        assert_eq!(assignment.total_cost, Decimal::from(900));
        assert!(assignment.uncovered.is_empty());
    }

    #[test]
    fn test_excluded_vendor_line_reported() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let strategy = ProcurementStrategy::new(StrategyKind::LowestCost).with_excluded_vendor("X");

        let assignment = LowestCost.assign(&input, &strategy);

        assert_eq!(assignment.vendor_count(), 1);
        assert_eq!(
            assignment.uncovered_line("B").unwrap().reason,
            UncoveredReason::VendorFiltered
        );
        assert!(!assignment.is_complete());
    }
}
