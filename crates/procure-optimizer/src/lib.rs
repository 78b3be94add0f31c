//! # Procure Optimizer
//!
//! 供應商分配優化（四種策略）與情境比較

pub mod assignment;
pub mod balanced;
mod candidates;
pub mod fewest_vendors;
pub mod lowest_cost;
pub mod quality_focused;
pub mod scenario;

// Re-export 主要類型
pub use assignment::{AssignedLine, Assignment, UncoveredLine, UncoveredReason, VendorAssignment};
pub use balanced::Balanced;
pub use fewest_vendors::FewestVendors;
pub use lowest_cost::LowestCost;
pub use quality_focused::QualityFocused;
pub use scenario::{ScenarioComparator, ScenarioResult};

use procure_calc::{BomLineAnalysis, VendorConsolidation};
use procure_core::{OptimizerConfig, ProcurementStrategy, StrategyKind, VendorRatingSummary};
use std::collections::HashMap;

/// 優化器輸入（只讀）
#[derive(Debug, Clone, Copy)]
pub struct OptimizerInput<'a> {
    /// BOM 覆蓋分析結果（BOM 順序）
    pub analyses: &'a [BomLineAnalysis],

    /// 供應商整合分析結果
    pub consolidation: &'a [VendorConsolidation],

    /// 供應商評分
    pub ratings: &'a HashMap<String, VendorRatingSummary>,

    pub config: &'a OptimizerConfig,
}

impl<'a> OptimizerInput<'a> {
    pub fn new(
        analyses: &'a [BomLineAnalysis],
        consolidation: &'a [VendorConsolidation],
        ratings: &'a HashMap<String, VendorRatingSummary>,
        config: &'a OptimizerConfig,
    ) -> Self {
        Self {
            analyses,
            consolidation,
            ratings,
            config,
        }
    }
}

/// 分配策略
///
/// 每種策略都是確定性的：相同輸入得到相同輸出。
pub trait AssignmentStrategy {
    fn kind(&self) -> StrategyKind;

    fn assign(&self, input: &OptimizerInput<'_>, strategy: &ProcurementStrategy) -> Assignment;
}

/// 分配優化器
pub struct AssignmentOptimizer;

impl AssignmentOptimizer {
    /// 依策略產生分配結果
    ///
    /// 策略與配置在任何計算前驗證。
    pub fn optimize(
        input: &OptimizerInput<'_>,
        strategy: &ProcurementStrategy,
    ) -> procure_core::Result<Assignment> {
        strategy.validate()?;
        input.config.validate()?;

        let start_time = std::time::Instant::now();

        let assignment = match strategy.kind {
            StrategyKind::LowestCost => LowestCost.assign(input, strategy),
            StrategyKind::FewestVendors => FewestVendors.assign(input, strategy),
            StrategyKind::Balanced => Balanced.assign(input, strategy),
            StrategyKind::QualityFocused => QualityFocused.assign(input, strategy),
        };

        tracing::debug!(
            "策略 {}: {} 家供應商，總成本 {}，未覆蓋 {} 行，耗時 {} µs",
            strategy.kind,
            assignment.vendor_count(),
            assignment.total_cost,
            assignment.uncovered.len(),
            start_time.elapsed().as_micros()
        );

        Ok(assignment)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use procure_calc::{BomLineAnalysis, ConsolidationAnalyzer, CoverageAnalyzer, QuoteIndex, VendorConsolidation};
    use procure_core::{BomLine, OptimizerConfig, Project, Quote};
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    pub struct Fixture {
        pub analyses: Vec<BomLineAnalysis>,
        pub consolidation: Vec<VendorConsolidation>,
        pub config: OptimizerConfig,
    }

    /// 建立測試資料：`lines` 為 (行ID, 需求量)，`quotes` 為 (供應商, 行ID, 單價)
    pub fn fixture(lines: &[(&str, u32)], quotes: &[(&str, &str, i64)]) -> Fixture {
        let mut project = Project::new("PRJ", "Test", Decimal::from(10_000));
        for (id, qty) in lines {
            project = project.with_bom_line(BomLine::new(*id, format!("SPEC-{}", id), *qty));
        }
        let quotes: Vec<Quote> = quotes
            .iter()
            .map(|(vendor, line, price)| {
                Quote::new(*vendor, format!("SPEC-{}", line), Decimal::from(*price), date())
            })
            .collect();
        let index = QuoteIndex::from_quotes(&quotes, date());
        let analyses = CoverageAnalyzer::analyze_project(&project, &index, &HashMap::new());
        let config = OptimizerConfig::default();
        let consolidation = ConsolidationAnalyzer::analyze(&analyses, &HashMap::new(), &config);
        Fixture {
            analyses,
            consolidation,
            config,
        }
    }

    /// 範例：A 需 10（X $50、Y $45），B 需 5（僅 X $80）
    pub fn two_line_example() -> Fixture {
        fixture(
            &[("A", 10), ("B", 5)],
            &[("X", "A", 50), ("Y", "A", 45), ("X", "B", 80)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use procure_core::ProcureError;
    use rust_decimal::Decimal;

    #[test]
    fn test_invalid_strategy_rejected() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let strategy = ProcurementStrategy::new(StrategyKind::FewestVendors).with_max_vendors(0);
        assert!(matches!(
            AssignmentOptimizer::optimize(&input, &strategy),
            Err(ProcureError::InvalidStrategyConfig(_))
        ));
    }

    #[test]
    fn test_example_lowest_vs_fewest() {
        let f = two_line_example();
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        let lowest = AssignmentOptimizer::optimize(&input, &ProcurementStrategy::new(StrategyKind::LowestCost)).unwrap();
        assert_eq!(lowest.total_cost, Decimal::from(850));
        assert_eq!(lowest.vendor_count(), 2);
        assert_eq!(lowest.vendor_for("A").unwrap().vendor_id, "Y");
        assert_eq!(lowest.vendor_for("B").unwrap().vendor_id, "X");

        let fewest = AssignmentOptimizer::optimize(&input, &ProcurementStrategy::new(StrategyKind::FewestVendors)).unwrap();
        assert_eq!(fewest.total_cost, Decimal::from(900));
        assert_eq!(fewest.vendor_count(), 1);
        assert_eq!(fewest.vendors[0].bom_line_ids(), vec!["A", "B"]);
    }

    #[test]
    fn test_deterministic() {
        let f = fixture(
            &[("A", 3), ("B", 7), ("C", 2), ("D", 9)],
            &[
                ("X", "A", 10), ("Y", "A", 10), ("Z", "A", 12),
                ("X", "B", 5), ("Z", "B", 4),
                ("Y", "C", 30), ("Z", "C", 31),
                ("X", "D", 8), ("Y", "D", 8),
            ],
        );
        let ratings = HashMap::new();
        let input = OptimizerInput::new(&f.analyses, &f.consolidation, &ratings, &f.config);

        for kind in StrategyKind::ALL {
            let strategy = ProcurementStrategy::new(kind);
            let first = AssignmentOptimizer::optimize(&input, &strategy).unwrap();
            let second = AssignmentOptimizer::optimize(&input, &strategy).unwrap();
            assert_eq!(first, second, "{} 不具確定性", kind);
        }
    }
}
