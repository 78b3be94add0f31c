//! 最少供應商策略（貪婪集合覆蓋）
//!
//! 貪婪選擇只決定供應商組合。最終分配在組合內為每行重新選最便宜報價，
//! 因此某行可能不由貪婪過程中認領它的供應商供應。

use procure_core::{OptimizerConfig, ProcurementStrategy, StrategyKind};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::assignment::{Assignment, UncoveredReason};
use crate::candidates::{vendor_count, CandidatePool, Pick};
use crate::lowest_cost::LowestCost;
use crate::{AssignmentStrategy, OptimizerInput};

/// 貪婪選擇的候選供應商
struct GreedyCandidate<'a> {
    vendor_id: &'a str,
    covered: Vec<usize>,
    score: f64,
    cost: Decimal,
    preferred: bool,
}

impl GreedyCandidate<'_> {
    /// 分數高者優先，其次偏好供應商、成本低、ID 小
    fn compare(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.preferred.cmp(&other.preferred))
            .then_with(|| other.cost.cmp(&self.cost))
            .then_with(|| other.vendor_id.cmp(self.vendor_id))
    }
}

/// 貪婪選擇結果
pub(crate) struct GreedyOutcome<'a> {
    pub picks: Vec<Pick<'a>>,
    /// 選中順序
    pub order: Vec<&'a str>,
}

/// 反覆選擇綜合分數最高的供應商，直到所有可覆蓋行都已分配
///
/// 回傳的分配是已選供應商內的逐行最低價，不是貪婪認領結果。
pub struct FewestVendors;

impl FewestVendors {
    /// 貪婪集合覆蓋
    ///
    /// 分數 = 剩餘可覆蓋行數 × w1 + (1 / 平均價格排名) × w2。
    /// 達到供應商數上限後，剩餘行只能由已選供應商供應，否則標記為 `vendor_limit_exceeded`。
    /// 最後在已選供應商內為每行重新選最便宜報價。
    pub(crate) fn greedy<'a>(
        pool: &CandidatePool<'a>,
        strategy: &ProcurementStrategy,
        config: &OptimizerConfig,
    ) -> GreedyOutcome<'a> {
        let limit = strategy.max_vendors.map(|m| m as usize);
        let ranks = pool.average_ranks();
        let vendors = pool.vendor_ids();

        let mut remaining: BTreeSet<usize> = pool
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_coverable())
            .map(|(i, _)| i)
            .collect();
        let mut chosen: Vec<&'a str> = Vec::new();

        while !remaining.is_empty() {
            if limit.is_some_and(|max| chosen.len() >= max) {
                tracing::debug!("已達供應商數上限，剩餘 {} 行", remaining.len());
                break;
            }

            let best = vendors
                .iter()
                .filter(|vendor| !chosen.contains(*vendor))
                .filter_map(|&vendor_id| {
                    let covered: Vec<usize> = remaining
                        .iter()
                        .copied()
                        .filter(|&i| pool.lines[i].offer_from(vendor_id).is_some())
                        .collect();
                    if covered.is_empty() {
                        return None;
                    }

                    let avg_rank = ranks.get(vendor_id).copied().unwrap_or(1.0);
                    let score = covered.len() as f64 * config.coverage_weight
                        + (1.0 / avg_rank) * config.rank_weight;
                    let cost = covered
                        .iter()
                        .filter_map(|&i| {
                            let line = &pool.lines[i];
                            line.offer_from(vendor_id)
                                .map(|o| o.quote.total_for(line.analysis.quantity_needed))
                        })
                        .sum();

                    Some(GreedyCandidate {
                        vendor_id,
                        covered,
                        score,
                        cost,
                        preferred: strategy.is_preferred(vendor_id),
                    })
                })
                .max_by(|a, b| a.compare(b));

            let Some(best) = best else {
                break;
            };

            tracing::debug!(
                "貪婪選擇 {}: 覆蓋 {} 行，分數 {:.3}",
                best.vendor_id,
                best.covered.len(),
                best.score
            );
            for i in &best.covered {
                remaining.remove(i);
            }
            chosen.push(best.vendor_id);
        }

        let picks = pool.cheapest_picks(
            strategy,
            config.preference_tolerance,
            |vendor| chosen.contains(&vendor),
            UncoveredReason::VendorLimitExceeded,
        );

        GreedyOutcome {
            picks,
            order: chosen,
        }
    }

    /// 最終選擇：貪婪結果供應商數多於最低成本方案（且覆蓋不多於它）時改用最低成本方案
    pub(crate) fn picks<'a>(
        pool: &CandidatePool<'a>,
        strategy: &ProcurementStrategy,
        config: &OptimizerConfig,
    ) -> GreedyOutcome<'a> {
        let greedy = Self::greedy(pool, strategy, config);
        let lowest = LowestCost::picks(pool, strategy, Decimal::ZERO);

        let covered = |picks: &[Pick<'_>]| picks.iter().filter(|p| p.vendor_id().is_some()).count();

        if vendor_count(&lowest) < vendor_count(&greedy.picks)
            && covered(&lowest) >= covered(&greedy.picks)
        {
            tracing::debug!("貪婪結果供應商數多於最低成本方案，改用最低成本方案的供應商組合");
            let order = lowest
                .iter()
                .filter_map(Pick::vendor_id)
                .fold(Vec::new(), |mut acc, vendor| {
                    if !acc.contains(&vendor) {
                        acc.push(vendor);
                    }
                    acc
                });
            return GreedyOutcome {
                picks: lowest,
                order,
            };
        }

        greedy
    }
}

impl AssignmentStrategy for FewestVendors {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FewestVendors
    }

    fn assign(&self, input: &OptimizerInput<'_>, strategy: &ProcurementStrategy) -> Assignment {
        let pool = CandidatePool::build(input.analyses, strategy, |_| true);
        let outcome = Self::picks(&pool, strategy, input.config);
        let total_lines = pool.coverable_count();

        Assignment::from_picks(self.kind(), &pool, &outcome.picks, |_, lines| {
            format!("整合供應：{} / {} 個可覆蓋 BOM 行", lines.len(), total_lines)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::collections::HashMap;

    #[test]
    fn test_max_vendors_leaves_lines_unassigned() {
        let f = fixture(
            &[("A", 1), ("B", 1), ("C", 1)],
            &[("X", "A", 10), ("X", "B", 10), ("Y", "C", 10)],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let strategy = ProcurementStrategy::new(StrategyKind::FewestVendors).with_max_vendors(1);

        let assignment = FewestVendors.assign(&input, &strategy);

        assert_eq!(assignment.vendor_count(), 1);
        assert_eq!(assignment.vendors[0].vendor_id, "X");
        assert_eq!(
            assignment.uncovered_line("C").unwrap().reason,
            UncoveredReason::VendorLimitExceeded
        );
    }

    #[test]
    fn test_reprices_within_chosen_vendors() {
        // X 先被選（覆蓋 A、B、C），D 需要 Y；B 最後改由較便宜的 Y 供應
        let f = fixture(
            &[("A", 1), ("B", 1), ("C", 1), ("D", 1)],
            &[
                ("X", "A", 10), ("X", "B", 20), ("X", "C", 10),
                ("Y", "B", 15), ("Y", "D", 10),
            ],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let strategy = ProcurementStrategy::new(StrategyKind::FewestVendors);
        let assignment = FewestVendors.assign(&input, &strategy);

        // 貪婪過程中 B 由 X 認領
        let pool = CandidatePool::build(&f.analyses, &strategy, |_| true);
        assert_eq!(FewestVendors::greedy(&pool, &strategy, &f.config).order, vec!["X", "Y"]);

        assert_eq!(assignment.vendor_count(), 2);
        assert_eq!(assignment.vendor_for("B").unwrap().vendor_id, "Y");
        assert_eq!(assignment.total_cost, Decimal::from(45));
    }

    #[test]
    fn test_preferred_breaks_score_ties() {
        // X、Y 各覆蓋兩行，平均排名與成本相同
        let f = fixture(
            &[("A", 1), ("B", 1)],
            &[("X", "A", 10), ("X", "B", 12), ("Y", "A", 12), ("Y", "B", 10)],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let plain = FewestVendors.assign(&input, &ProcurementStrategy::new(StrategyKind::FewestVendors));
        assert_eq!(plain.vendor_count(), 1);
        assert_eq!(plain.vendors[0].vendor_id, "X");

        let strategy = ProcurementStrategy::new(StrategyKind::FewestVendors).with_preferred_vendor("Y");
        let preferred = FewestVendors.assign(&input, &strategy);
        assert_eq!(preferred.vendor_count(), 1);
        assert_eq!(preferred.vendors[0].vendor_id, "Y");
    }

    #[test]
    fn test_falls_back_to_lowest_cost_vendor_set() {
        // 貪婪先選 Z（覆蓋四行），之後仍需 P、Q，共三家；最低成本方案只需 P、Q
        let f = fixture(
            &[("L1", 1), ("L2", 1), ("L3", 1), ("L4", 1), ("L5", 1), ("L6", 1)],
            &[
                ("P", "L1", 10), ("P", "L2", 10), ("P", "L3", 10),
                ("Q", "L4", 10), ("Q", "L5", 10), ("Q", "L6", 10),
                ("Z", "L1", 11), ("Z", "L2", 11), ("Z", "L4", 11), ("Z", "L5", 11),
            ],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);
        let strategy = ProcurementStrategy::new(StrategyKind::FewestVendors);

        let pool = CandidatePool::build(&f.analyses, &strategy, |_| true);
        let greedy = FewestVendors::greedy(&pool, &strategy, &f.config);
        assert_eq!(greedy.order, vec!["Z", "P", "Q"]);

        let lowest = LowestCost.assign(&input, &ProcurementStrategy::new(StrategyKind::LowestCost));
        let fewest = FewestVendors.assign(&input, &strategy);

        assert_eq!(fewest.vendor_count(), 2);
        assert_eq!(fewest.vendor_count(), lowest.vendor_count());
        assert_eq!(fewest.total_cost, lowest.total_cost);
    }
}
