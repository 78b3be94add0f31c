//! 推薦方案（每個 BOM 行選定的供應商與成本）

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 單一 BOM 行的推薦採購
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedLine {
    pub bom_line_id: String,
    pub vendor_id: String,
    pub quote_id: Uuid,
    /// 參考幣別單價
    pub unit_price: Decimal,
    /// 採購數量（BOM 需求量）
    pub quantity: u32,
    pub total_cost: Decimal,
}

/// 推薦方案
///
/// 由優化器的分配結果轉換而來，供風險與節省彙總使用。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendedPlan {
    lines: BTreeMap<String, RecommendedLine>,
}

impl RecommendedPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加推薦行
    pub fn with_line(mut self, line: RecommendedLine) -> Self {
        self.insert(line);
        self
    }

    pub fn insert(&mut self, line: RecommendedLine) {
        self.lines.insert(line.bom_line_id.clone(), line);
    }

    pub fn line(&self, bom_line_id: &str) -> Option<&RecommendedLine> {
        self.lines.get(bom_line_id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &RecommendedLine> {
        self.lines.values()
    }

    /// 推薦總成本
    pub fn total_cost(&self) -> Decimal {
        self.lines.values().map(|l| l.total_cost).sum()
    }

    /// 使用的供應商（排序）
    pub fn vendor_ids(&self) -> BTreeSet<&str> {
        self.lines.values().map(|l| l.vendor_id.as_str()).collect()
    }

    pub fn vendor_count(&self) -> usize {
        self.vendor_ids().len()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
