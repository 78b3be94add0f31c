//! 品質優先策略

use procure_core::{ProcurementStrategy, StrategyKind};

use crate::assignment::Assignment;
use crate::candidates::CandidatePool;
use crate::lowest_cost::LowestCost;
use crate::{AssignmentStrategy, OptimizerInput};

/// 排除評分低於 `min_vendor_rating` 的供應商後取最低成本
///
/// 設定門檻時，沒有評分的供應商同樣被排除；因此而無供應商的行回報為未覆蓋，
/// 不會退回低評分供應商。
pub struct QualityFocused;

impl QualityFocused {
    fn meets_rating(input: &OptimizerInput<'_>, strategy: &ProcurementStrategy, vendor_id: &str) -> bool {
        match strategy.min_vendor_rating {
            None => true,
            Some(min) => input
                .ratings
                .get(vendor_id)
                .filter(|r| r.is_rated())
                .map(|r| r.overall_avg >= min)
                .unwrap_or(false),
        }
    }
}

impl AssignmentStrategy for QualityFocused {
    fn kind(&self) -> StrategyKind {
        StrategyKind::QualityFocused
    }

    fn assign(&self, input: &OptimizerInput<'_>, strategy: &ProcurementStrategy) -> Assignment {
        let pool = CandidatePool::build(input.analyses, strategy, |vendor| {
            Self::meets_rating(input, strategy, vendor)
        });
        let picks = LowestCost::picks(&pool, strategy, input.config.preference_tolerance);

        Assignment::from_picks(self.kind(), &pool, &picks, |vendor_id, lines| {
            match input.ratings.get(vendor_id).filter(|r| r.is_rated()) {
                Some(rating) => format!(
                    "評分 {:.1}，{} 個 BOM 行報價最低",
                    rating.overall_avg,
                    lines.len()
                ),
                None => format!("{} 個 BOM 行報價最低（無評分）", lines.len()),
            }
        })
    }
}
