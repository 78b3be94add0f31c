//! 供應商整合分析

use procure_core::{OptimizerConfig, Quote, VendorRatingSummary};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::coverage::BomLineAnalysis;

/// 單一供應商的整合視角
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorConsolidation {
    pub vendor_id: String,
    pub vendor_name: String,

    /// 可供應的 BOM 行（BOM 順序）
    pub lines_suppliable: Vec<String>,

    /// 可供應的規格數
    pub specification_count: usize,

    /// 可供應行的需求量合計
    pub total_quantity: u64,

    /// 全部由此供應商供應的成本（各行最佳報價 × 需求量）
    pub total_cost_if_used: Decimal,

    /// 平均價格排名（1 = 最便宜）
    pub average_price_rank: f64,

    /// 預估訂單數（涉及的請購單數，至少 1）
    pub estimated_order_count: usize,

    /// 可供應超過一定比例的 BOM 行
    pub shipping_advantage: bool,

    pub rating: Option<VendorRatingSummary>,
}

impl VendorConsolidation {
    pub fn line_count(&self) -> usize {
        self.lines_suppliable.len()
    }

    pub fn can_supply(&self, bom_line_id: &str) -> bool {
        self.lines_suppliable.iter().any(|id| id == bom_line_id)
    }

    pub fn overall_rating(&self) -> Option<f64> {
        self.rating
            .as_ref()
            .filter(|r| r.is_rated())
            .map(|r| r.overall_avg)
    }
}

#[derive(Default)]
struct VendorAccumulator {
    vendor_name: String,
    lines: Vec<String>,
    specifications: BTreeSet<String>,
    requisitions: BTreeSet<String>,
    total_quantity: u64,
    total_cost: Decimal,
    rank_sum: usize,
}

/// 供應商整合分析器
pub struct ConsolidationAnalyzer;

impl ConsolidationAnalyzer {
    /// 每家供應商在此行的最佳報價與排名（1 起算，依合格報價順序）
    pub fn price_ranks(eligible_quotes: &[Quote]) -> Vec<(&Quote, usize)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut ranked = Vec::new();
        for quote in eligible_quotes {
            if seen.contains(&quote.vendor_id.as_str()) {
                continue;
            }
            seen.push(&quote.vendor_id);
            ranked.push((quote, seen.len()));
        }
        ranked
    }

    /// 彙總供應商視角
    ///
    /// 排序：可供應行數降序，總成本升序，供應商ID升序。
    pub fn analyze(
        analyses: &[BomLineAnalysis],
        ratings: &HashMap<String, VendorRatingSummary>,
        config: &OptimizerConfig,
    ) -> Vec<VendorConsolidation> {
        let mut vendors: BTreeMap<String, VendorAccumulator> = BTreeMap::new();

        for analysis in analyses {
            for (quote, rank) in Self::price_ranks(&analysis.eligible_quotes) {
                let acc = vendors.entry(quote.vendor_id.clone()).or_default();
                if acc.vendor_name.is_empty() {
                    acc.vendor_name = quote.vendor_name.clone();
                }
                acc.lines.push(analysis.bom_line_id.clone());
                acc.specifications.insert(analysis.specification_id.clone());
                acc.requisitions.extend(
                    analysis
                        .requisition_items
                        .iter()
                        .map(|i| i.requisition_name.clone()),
                );
                acc.total_quantity += u64::from(analysis.quantity_needed);
                acc.total_cost += quote.total_for(analysis.quantity_needed);
                acc.rank_sum += rank;
            }
        }

        let total_lines = analyses.len() as f64;
        let mut result: Vec<VendorConsolidation> = vendors
            .into_iter()
            .map(|(vendor_id, acc)| {
                let line_count = acc.lines.len();
                VendorConsolidation {
                    rating: ratings.get(&vendor_id).cloned(),
                    vendor_name: acc.vendor_name,
                    specification_count: acc.specifications.len(),
                    total_quantity: acc.total_quantity,
                    total_cost_if_used: acc.total_cost,
                    average_price_rank: acc.rank_sum as f64 / line_count as f64,
                    estimated_order_count: acc.requisitions.len().max(1),
                    shipping_advantage: line_count as f64
                        > total_lines * config.shipping_advantage_share,
                    lines_suppliable: acc.lines,
                    vendor_id,
                }
            })
            .collect();

        result.sort_by(|a, b| {
            b.line_count()
                .cmp(&a.line_count())
                .then_with(|| a.total_cost_if_used.cmp(&b.total_cost_if_used))
                .then_with(|| a.vendor_id.cmp(&b.vendor_id))
        });

        tracing::debug!("供應商整合分析: {} 家供應商", result.len());
        result
    }
}
