//! 分配結果模型

use procure_calc::{RecommendedLine, RecommendedPlan};
use procure_core::{Quote, StrategyKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::candidates::{CandidatePool, Pick};

/// 已分配的 BOM 行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedLine {
    pub bom_line_id: String,
    pub specification_id: String,
    /// 引用的合格報價
    pub quote_id: Uuid,
    pub unit_price: Decimal,
    /// 需求量
    pub quantity: u32,
    pub line_cost: Decimal,
}

/// 供應商分配
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorAssignment {
    pub vendor_id: String,
    pub vendor_name: String,
    /// BOM 順序
    pub lines: Vec<AssignedLine>,
    pub total_cost: Decimal,
    /// 優先級（1 = 支出最大）
    pub priority: usize,
    pub rationale: String,
}

impl VendorAssignment {
    pub fn bom_line_ids(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.bom_line_id.as_str()).collect()
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }
}

/// 未覆蓋原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UncoveredReason {
    /// 沒有合格報價
    NoQuotes,
    /// 報價查詢失敗
    DataUnavailable,
    /// 受供應商數上限限制
    VendorLimitExceeded,
    /// 可供應的供應商全被排除（排除清單或評分門檻）
    VendorFiltered,
}

impl UncoveredReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UncoveredReason::NoQuotes => "no_quotes",
            UncoveredReason::DataUnavailable => "data_unavailable",
            UncoveredReason::VendorLimitExceeded => "vendor_limit_exceeded",
            UncoveredReason::VendorFiltered => "vendor_filtered",
        }
    }
}

impl fmt::Display for UncoveredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未覆蓋的 BOM 行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncoveredLine {
    pub bom_line_id: String,
    pub specification_id: String,
    pub reason: UncoveredReason,
}

/// 分配結果（推薦方案）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub strategy: StrategyKind,
    /// 按優先級排序
    pub vendors: Vec<VendorAssignment>,
    /// BOM 順序
    pub uncovered: Vec<UncoveredLine>,
    pub total_cost: Decimal,
}

impl Assignment {
    /// 由逐行選擇建立分配結果
    pub(crate) fn from_picks<F>(
        strategy: StrategyKind,
        pool: &CandidatePool<'_>,
        picks: &[Pick<'_>],
        rationale: F,
    ) -> Self
    where
        F: Fn(&str, &[AssignedLine]) -> String,
    {
        let mut by_vendor: BTreeMap<&str, (&Quote, Vec<AssignedLine>)> = BTreeMap::new();
        let mut uncovered = Vec::new();

        for (line, pick) in pool.lines.iter().zip(picks) {
            let analysis = line.analysis;
            match pick {
                Pick::Vendor(quote) => {
                    let assigned = AssignedLine {
                        bom_line_id: analysis.bom_line_id.clone(),
                        specification_id: analysis.specification_id.clone(),
                        quote_id: quote.id,
                        unit_price: quote.normalized_unit_price,
                        quantity: analysis.quantity_needed,
                        line_cost: quote.total_for(analysis.quantity_needed),
                    };
                    by_vendor
                        .entry(quote.vendor_id.as_str())
                        .or_insert_with(|| (*quote, Vec::new()))
                        .1
                        .push(assigned);
                }
                Pick::Uncovered(reason) => uncovered.push(UncoveredLine {
                    bom_line_id: analysis.bom_line_id.clone(),
                    specification_id: analysis.specification_id.clone(),
                    reason: *reason,
                }),
            }
        }

        let mut vendors: Vec<VendorAssignment> = by_vendor
            .into_iter()
            .map(|(vendor_id, (quote, lines))| VendorAssignment {
                vendor_id: vendor_id.to_string(),
                vendor_name: quote.vendor_name.clone(),
                total_cost: lines.iter().map(|l| l.line_cost).sum(),
                priority: 0,
                rationale: rationale(vendor_id, &lines),
                lines,
            })
            .collect();

        vendors.sort_by(|a, b| {
            b.total_cost
                .cmp(&a.total_cost)
                .then_with(|| a.vendor_id.cmp(&b.vendor_id))
        });
        for (i, vendor) in vendors.iter_mut().enumerate() {
            vendor.priority = i + 1;
        }

        Self {
            strategy,
            total_cost: vendors.iter().map(|v| v.total_cost).sum(),
            vendors,
            uncovered,
        }
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    pub fn covered_count(&self) -> usize {
        self.vendors.iter().map(VendorAssignment::item_count).sum()
    }

    /// 所有可覆蓋行都已分配
    pub fn is_complete(&self) -> bool {
        self.uncovered.iter().all(|u| {
            matches!(
                u.reason,
                UncoveredReason::NoQuotes | UncoveredReason::DataUnavailable
            )
        })
    }

    /// BOM 行分配到的供應商
    pub fn vendor_for(&self, bom_line_id: &str) -> Option<&VendorAssignment> {
        self.vendors
            .iter()
            .find(|v| v.lines.iter().any(|l| l.bom_line_id == bom_line_id))
    }

    pub fn uncovered_line(&self, bom_line_id: &str) -> Option<&UncoveredLine> {
        self.uncovered.iter().find(|u| u.bom_line_id == bom_line_id)
    }

    /// 供應商 → BOM 行
    pub fn vendor_lines(&self) -> BTreeMap<String, Vec<String>> {
        self.vendors
            .iter()
            .map(|v| {
                (
                    v.vendor_id.clone(),
                    v.lines.iter().map(|l| l.bom_line_id.clone()).collect(),
                )
            })
            .collect()
    }

    /// 轉換為推薦方案（供風險與節省彙總）
    pub fn to_plan(&self) -> RecommendedPlan {
        let mut plan = RecommendedPlan::new();
        for vendor in &self.vendors {
            for line in &vendor.lines {
                plan.insert(RecommendedLine {
                    bom_line_id: line.bom_line_id.clone(),
                    vendor_id: vendor.vendor_id.clone(),
                    quote_id: line.quote_id,
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    total_cost: line.line_cost,
                });
            }
        }
        plan
    }
}
