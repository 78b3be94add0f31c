//! 優化器調校參數

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProcureError, Result};

/// 優化器配置
///
/// 權重與容差均為設計參數，預設值僅為合理起點。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 最少供應商評分：覆蓋數權重（w1）
    pub coverage_weight: f64,

    /// 最少供應商評分：平均價格排名倒數權重（w2）
    pub rank_weight: f64,

    /// 平衡策略：成本比權重（α）
    pub balanced_cost_weight: f64,

    /// 平衡策略：供應商數比權重（β）
    pub balanced_vendor_weight: f64,

    /// 偏好供應商價格容差（0.02 = 2%）
    pub preference_tolerance: Decimal,

    /// 高風險行支出佔比超過此值時升級為 critical
    pub critical_spend_share: Decimal,

    /// 無到期日的報價超過此天數視為陳舊
    pub stale_after_days: u32,

    /// 供應商可供應行數佔比超過此值即具運輸優勢
    pub shipping_advantage_share: f64,

    /// 每少用一家潛在供應商估計節省的管理成本
    pub consolidation_savings_per_vendor: Decimal,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            coverage_weight: 0.7,
            rank_weight: 0.3,
            balanced_cost_weight: 0.6,
            balanced_vendor_weight: 0.4,
            preference_tolerance: Decimal::new(2, 2),
            critical_spend_share: Decimal::new(20, 2),
            stale_after_days: 90,
            shipping_advantage_share: 0.5,
            consolidation_savings_per_vendor: Decimal::from(250),
        }
    }
}

impl OptimizerConfig {
    /// 從 JSON 讀取（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置最少供應商評分權重
    pub fn with_fewest_vendor_weights(mut self, coverage_weight: f64, rank_weight: f64) -> Self {
        self.coverage_weight = coverage_weight;
        self.rank_weight = rank_weight;
        self
    }

    /// 建構器模式：設置平衡策略權重
    pub fn with_balanced_weights(mut self, cost_weight: f64, vendor_weight: f64) -> Self {
        self.balanced_cost_weight = cost_weight;
        self.balanced_vendor_weight = vendor_weight;
        self
    }

    /// 建構器模式：設置偏好容差
    pub fn with_preference_tolerance(mut self, tolerance: Decimal) -> Self {
        self.preference_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置升級門檻
    pub fn with_critical_spend_share(mut self, share: Decimal) -> Self {
        self.critical_spend_share = share;
        self
    }

    /// 建構器模式：設置陳舊天數
    pub fn with_stale_after_days(mut self, days: u32) -> Self {
        self.stale_after_days = days;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("coverage_weight", self.coverage_weight),
            ("rank_weight", self.rank_weight),
            ("balanced_cost_weight", self.balanced_cost_weight),
            ("balanced_vendor_weight", self.balanced_vendor_weight),
            ("shipping_advantage_share", self.shipping_advantage_share),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ProcureError::InvalidStrategyConfig(format!(
                    "{} 必須為非負有限值，實際為 {}",
                    name, value
                )));
            }
        }

        if self.preference_tolerance < Decimal::ZERO || self.preference_tolerance >= Decimal::ONE {
            return Err(ProcureError::InvalidStrategyConfig(format!(
                "偏好容差必須介於 [0, 1)，實際為 {}",
                self.preference_tolerance
            )));
        }

        if self.critical_spend_share < Decimal::ZERO || self.critical_spend_share > Decimal::ONE {
            return Err(ProcureError::InvalidStrategyConfig(format!(
                "升級門檻必須介於 [0, 1]，實際為 {}",
                self.critical_spend_share
            )));
        }

        Ok(())
    }
}
