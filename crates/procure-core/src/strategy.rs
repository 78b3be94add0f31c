//! 採購策略模型

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{ProcureError, Result};

/// 優化策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 最低成本：每行獨立選最便宜的供應商
    LowestCost,
    /// 最少供應商：貪婪集合覆蓋
    FewestVendors,
    /// 平衡：在成本與供應商數之間取捨
    Balanced,
    /// 品質優先：排除低評分供應商後取最低成本
    QualityFocused,
}

impl StrategyKind {
    /// 情境比較使用的固定策略順序
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::LowestCost,
        StrategyKind::FewestVendors,
        StrategyKind::Balanced,
        StrategyKind::QualityFocused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::LowestCost => "lowest_cost",
            StrategyKind::FewestVendors => "fewest_vendors",
            StrategyKind::Balanced => "balanced",
            StrategyKind::QualityFocused => "quality_focused",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StrategyKind::LowestCost => "最低成本",
            StrategyKind::FewestVendors => "最少供應商",
            StrategyKind::Balanced => "平衡方案",
            StrategyKind::QualityFocused => "品質優先",
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::LowestCost
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = ProcureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lowest_cost" | "lowest-cost" => Ok(StrategyKind::LowestCost),
            "fewest_vendors" | "fewest-vendors" => Ok(StrategyKind::FewestVendors),
            "balanced" => Ok(StrategyKind::Balanced),
            "quality_focused" | "quality-focused" => Ok(StrategyKind::QualityFocused),
            other => Err(ProcureError::InvalidStrategyConfig(format!(
                "未知策略類型: {}",
                other
            ))),
        }
    }
}

/// 採購策略（呼叫方輸入）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcurementStrategy {
    /// 策略
    pub kind: StrategyKind,

    /// 供應商數上限
    pub max_vendors: Option<u32>,

    /// 最低供應商評分（1-5）
    pub min_vendor_rating: Option<f64>,

    /// 偏好供應商（價格相近時優先）
    pub preferred_vendor_ids: BTreeSet<String>,

    /// 排除供應商（永不參與）
    pub excluded_vendor_ids: BTreeSet<String>,
}

impl ProcurementStrategy {
    /// 創建新的策略
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// 以策略名稱創建（未知名稱為呼叫方錯誤）
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// 建構器模式：設置供應商數上限
    pub fn with_max_vendors(mut self, max_vendors: u32) -> Self {
        self.max_vendors = Some(max_vendors);
        self
    }

    /// 建構器模式：設置最低供應商評分
    pub fn with_min_vendor_rating(mut self, rating: f64) -> Self {
        self.min_vendor_rating = Some(rating);
        self
    }

    /// 建構器模式：添加偏好供應商
    pub fn with_preferred_vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.preferred_vendor_ids.insert(vendor_id.into());
        self
    }

    /// 建構器模式：添加排除供應商
    pub fn with_excluded_vendor(mut self, vendor_id: impl Into<String>) -> Self {
        self.excluded_vendor_ids.insert(vendor_id.into());
        self
    }

    /// 套用相同約束但改用另一策略
    pub fn with_kind(&self, kind: StrategyKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }

    /// 在任何計算前驗證配置
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_vendors {
            if max < 1 {
                return Err(ProcureError::InvalidStrategyConfig(format!(
                    "供應商數上限必須 ≥ 1，實際為 {}",
                    max
                )));
            }
        }

        if let Some(rating) = self.min_vendor_rating {
            if !(1.0..=5.0).contains(&rating) {
                return Err(ProcureError::InvalidStrategyConfig(format!(
                    "最低供應商評分必須介於 1.0 與 5.0，實際為 {:.2}",
                    rating
                )));
            }
        }

        if let Some(vendor) = self
            .preferred_vendor_ids
            .intersection(&self.excluded_vendor_ids)
            .next()
        {
            return Err(ProcureError::InvalidStrategyConfig(format!(
                "供應商 {} 同時被偏好與排除",
                vendor
            )));
        }

        Ok(())
    }

    pub fn is_excluded(&self, vendor_id: &str) -> bool {
        self.excluded_vendor_ids.contains(vendor_id)
    }

    pub fn is_preferred(&self, vendor_id: &str) -> bool {
        self.preferred_vendor_ids.contains(vendor_id)
    }
}
