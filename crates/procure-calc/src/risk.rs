//! 風險評估

use procure_core::{OptimizerConfig, VendorRatingSummary};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::coverage::BomLineAnalysis;
use crate::freshness::QuoteFreshnessStats;
use crate::plan::RecommendedPlan;

/// 低評分門檻
const LOW_RATING_THRESHOLD: f64 = 3.0;

/// 風險分數權重（百分比）：覆蓋、時程、預算、供應鏈、品質
const SCORE_WEIGHTS: [u32; 5] = [30, 15, 25, 20, 10];

/// 推薦供應商少於此數且 BOM 行多於 `DIVERSITY_MIN_LINES` 時視為供應商過度集中
const DIVERSITY_MIN_VENDORS: usize = 2;
const DIVERSITY_MIN_LINES: usize = 5;

/// 風險等級（依嚴重程度排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// 由 0-100 分數換算等級
    pub fn from_score(score: u32) -> Self {
        if score >= 75 {
            RiskLevel::Critical
        } else if score >= 50 {
            RiskLevel::High
        } else if score >= 25 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// 等級對應的分數
    pub fn score(&self) -> u32 {
        match self {
            RiskLevel::Low => 25,
            RiskLevel::Medium => 50,
            RiskLevel::High => 75,
            RiskLevel::Critical => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 風險類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    /// 無報價
    QuoteCoverage,
    /// 報價資料無法取得
    DataAvailability,
    /// 單一來源
    SingleSource,
    /// 請購覆蓋不足
    RequisitionCoverage,
    /// 請購超量
    DataQuality,
    /// 陳舊報價
    QuoteFreshness,
    /// 預算超支
    Budget,
    /// 低評分供應商
    VendorQuality,
    /// 推薦供應商過度集中
    SupplyChain,
    /// 推薦供應商沒有評分
    UnratedVendors,
    /// 推薦成本高於目標成本
    LineBudget,
}

/// 風險因素
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub level: RiskLevel,
    pub description: String,
    /// 受影響的 BOM 行或供應商
    pub affected: Vec<String>,
}

/// 預算風險
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRisk {
    pub budget: Decimal,
    pub projected_cost: Decimal,
    /// 預計超支（負數表示結餘）
    pub projected_overrun: Decimal,
    pub overrun_percent: Decimal,
    pub level: RiskLevel,
    /// 建議預備金
    pub contingency_needed: Decimal,
    /// 推薦成本高於目標成本的 BOM 行
    pub items_over_budget: Vec<String>,
}

impl BudgetRisk {
    /// 依推薦成本評估預算風險，預算為零時不評估
    pub fn assess(budget: Decimal, projected_cost: Decimal) -> Option<Self> {
        if budget <= Decimal::ZERO {
            return None;
        }

        let projected_overrun = projected_cost - budget;
        let overrun_percent = (projected_overrun / budget * Decimal::ONE_HUNDRED).round_dp(2);

        let (level, buffer) = if overrun_percent > Decimal::from(20) {
            (RiskLevel::Critical, Decimal::new(120, 2))
        } else if overrun_percent > Decimal::from(10) {
            (RiskLevel::High, Decimal::new(115, 2))
        } else if overrun_percent > Decimal::ZERO {
            (RiskLevel::Medium, Decimal::new(110, 2))
        } else {
            (RiskLevel::Low, Decimal::ZERO)
        };

        Some(Self {
            budget,
            projected_cost,
            projected_overrun,
            overrun_percent,
            level,
            contingency_needed: (projected_overrun * buffer).max(Decimal::ZERO),
            items_over_budget: Vec::new(),
        })
    }

    /// 建構器模式：設置超出目標成本的 BOM 行
    pub fn with_items_over_budget(mut self, items: Vec<String>) -> Self {
        self.items_over_budget = items;
        self
    }
}

/// 加權風險分數
///
/// 覆蓋分數為無報價行佔比（0-100），其餘類別以等級換算 25/50/75/100；
/// 未設定預算時預算分數為 0。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    pub coverage: u32,
    pub timeline: RiskLevel,
    pub budget: Option<RiskLevel>,
    pub supply_chain: RiskLevel,
    pub quality: RiskLevel,
    /// 加權總分（0-100，取整）
    pub score: u32,
}

impl RiskScore {
    fn new(
        coverage: u32,
        timeline: RiskLevel,
        budget: Option<RiskLevel>,
        supply_chain: RiskLevel,
        quality: RiskLevel,
    ) -> Self {
        let parts = [
            coverage,
            timeline.score(),
            budget.map(|level| level.score()).unwrap_or(0),
            supply_chain.score(),
            quality.score(),
        ];
        let weighted: u32 = parts.iter().zip(SCORE_WEIGHTS).map(|(p, w)| p * w).sum();

        Self {
            coverage,
            timeline,
            budget,
            supply_chain,
            quality,
            score: weighted / 100,
        }
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.score)
    }
}

/// 專案風險評估
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    /// 整體風險
    pub overall: RiskLevel,

    /// 各行風險中最嚴重者
    pub worst_line_risk: RiskLevel,

    /// 高風險行佔計劃支出的比例（0-1）
    pub high_risk_spend_share: Decimal,

    pub factors: Vec<RiskFactor>,
    pub budget: Option<BudgetRisk>,

    /// 加權風險分數
    pub risk_score: RiskScore,

    /// 推薦供應商過度集中
    pub low_vendor_diversity: bool,

    /// 沒有評分的推薦供應商
    pub unrated_vendors: Vec<String>,

    pub mitigation_actions: Vec<String>,
}

impl RiskAssessment {
    pub fn factor(&self, category: RiskCategory) -> Option<&RiskFactor> {
        self.factors.iter().find(|f| f.category == category)
    }
}

/// 風險評估器
pub struct RiskAssessor;

impl RiskAssessor {
    /// 整體風險：各行最嚴重風險；高風險行佔計劃支出超過門檻時升級為 critical
    pub fn overall_risk(analyses: &[BomLineAnalysis], critical_spend_share: Decimal) -> (RiskLevel, Decimal) {
        let worst = analyses
            .iter()
            .map(|a| a.risk)
            .max()
            .unwrap_or(RiskLevel::Low);

        let total_spend: Decimal = analyses.iter().map(BomLineAnalysis::planned_spend).sum();
        let high_spend: Decimal = analyses
            .iter()
            .filter(|a| a.risk >= RiskLevel::High)
            .map(BomLineAnalysis::planned_spend)
            .sum();

        let share = if total_spend > Decimal::ZERO {
            high_spend / total_spend
        } else {
            Decimal::ZERO
        };

        let overall = if share > critical_spend_share {
            RiskLevel::Critical
        } else {
            worst
        };

        (overall, share.round_dp(4))
    }

    /// 完整風險評估
    pub fn assess(
        analyses: &[BomLineAnalysis],
        plan: &RecommendedPlan,
        budget: Decimal,
        ratings: &HashMap<String, VendorRatingSummary>,
        freshness: &QuoteFreshnessStats,
        config: &OptimizerConfig,
    ) -> RiskAssessment {
        let worst_line_risk = analyses
            .iter()
            .map(|a| a.risk)
            .max()
            .unwrap_or(RiskLevel::Low);
        let (overall, high_risk_spend_share) =
            Self::overall_risk(analyses, config.critical_spend_share);

        let mut factors = Vec::new();
        let mut actions = Vec::new();

        let no_quotes = Self::line_ids(analyses, |a| !a.has_quotes() && !a.is_data_unavailable());
        if !no_quotes.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::QuoteCoverage,
                level: RiskLevel::Critical,
                description: format!("{} 個 BOM 行沒有可用報價", no_quotes.len()),
                affected: no_quotes,
            });
            actions.push("為無報價的 BOM 行向供應商索取報價".to_string());
        }

        let unavailable = Self::line_ids(analyses, BomLineAnalysis::is_data_unavailable);
        if !unavailable.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::DataAvailability,
                level: RiskLevel::High,
                description: format!("{} 個 BOM 行的報價資料無法取得", unavailable.len()),
                affected: unavailable,
            });
            actions.push("報價服務恢復後重新分析".to_string());
        }

        let single_source = Self::line_ids(analyses, BomLineAnalysis::is_single_source);
        if !single_source.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::SingleSource,
                level: RiskLevel::Medium,
                description: format!("{} 個 BOM 行只有單一報價來源", single_source.len()),
                affected: single_source,
            });
            actions.push("為單一來源的 BOM 行尋找更多供應商".to_string());
        }

        let partial = Self::line_ids(analyses, |a| a.has_gaps);
        if !partial.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::RequisitionCoverage,
                level: RiskLevel::Medium,
                description: format!("{} 個 BOM 行的請購數量不足", partial.len()),
                affected: partial,
            });
            actions.push("補齊請購數量不足的 BOM 行".to_string());
        }

        let over_planned = Self::line_ids(analyses, |a| a.over_planned);
        if !over_planned.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::DataQuality,
                level: RiskLevel::Low,
                description: format!("{} 個 BOM 行的請購數量超過需求", over_planned.len()),
                affected: over_planned,
            });
            actions.push("核對超量請購是否為重複下單".to_string());
        }

        if freshness.stale_quotes > 0 || freshness.expired_quotes > 0 {
            let level = if freshness.stale_share() > 0.5 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            factors.push(RiskFactor {
                category: RiskCategory::QuoteFreshness,
                level,
                description: format!(
                    "陳舊報價 {} 筆，已過期 {} 筆（共 {} 筆）",
                    freshness.stale_quotes, freshness.expired_quotes, freshness.total_quotes
                ),
                affected: Vec::new(),
            });
            actions.push("向供應商更新陳舊或過期的報價".to_string());
        }

        let items_over_budget = Self::items_over_budget(analyses, plan);
        let budget_risk = BudgetRisk::assess(budget, plan.total_cost())
            .map(|risk| risk.with_items_over_budget(items_over_budget.clone()));
        if let Some(risk) = budget_risk.as_ref().filter(|r| r.level > RiskLevel::Low) {
            factors.push(RiskFactor {
                category: RiskCategory::Budget,
                level: risk.level,
                description: format!(
                    "推薦成本 {} 超出預算 {}（{}%）",
                    risk.projected_cost, risk.budget, risk.overrun_percent
                ),
                affected: Vec::new(),
            });
            actions.push(format!("預留預備金 {}", risk.contingency_needed.round_dp(2)));
        }

        if !items_over_budget.is_empty() {
            factors.push(RiskFactor {
                category: RiskCategory::LineBudget,
                level: RiskLevel::Medium,
                description: format!("{} 個 BOM 行的推薦成本高於目標成本", items_over_budget.len()),
                affected: items_over_budget,
            });
            actions.push("與供應商議價或重新檢討超出目標價的 BOM 行".to_string());
        }

        let low_rated: Vec<String> = plan
            .vendor_ids()
            .into_iter()
            .filter(|vendor| {
                ratings
                    .get(*vendor)
                    .map(|r| r.is_rated() && r.overall_avg < LOW_RATING_THRESHOLD)
                    .unwrap_or(false)
            })
            .map(str::to_string)
            .collect();
        let has_low_rated = !low_rated.is_empty();
        if has_low_rated {
            factors.push(RiskFactor {
                category: RiskCategory::VendorQuality,
                level: RiskLevel::High,
                description: format!("{} 家推薦供應商平均評分低於 3.0", low_rated.len()),
                affected: low_rated,
            });
            actions.push("對低評分供應商加強驗收或改用其他供應商".to_string());
        }

        let recommended_vendors = plan.vendor_count();
        let unrated_vendors: Vec<String> = plan
            .vendor_ids()
            .into_iter()
            .filter(|vendor| !ratings.get(*vendor).is_some_and(VendorRatingSummary::is_rated))
            .map(str::to_string)
            .collect();
        let many_unrated = unrated_vendors.len() > recommended_vendors / 2;
        if many_unrated {
            factors.push(RiskFactor {
                category: RiskCategory::UnratedVendors,
                level: RiskLevel::Medium,
                description: format!(
                    "{} / {} 家推薦供應商沒有評分",
                    unrated_vendors.len(),
                    recommended_vendors
                ),
                affected: unrated_vendors.clone(),
            });
            actions.push("為未評分的推薦供應商建立交貨與品質紀錄".to_string());
        }

        let low_vendor_diversity =
            recommended_vendors < DIVERSITY_MIN_VENDORS && analyses.len() > DIVERSITY_MIN_LINES;
        if low_vendor_diversity {
            factors.push(RiskFactor {
                category: RiskCategory::SupplyChain,
                level: RiskLevel::Medium,
                description: format!(
                    "{} 個 BOM 行集中於 {} 家供應商",
                    analyses.len(),
                    recommended_vendors
                ),
                affected: plan.vendor_ids().into_iter().map(str::to_string).collect(),
            });
            actions.push("引入備援供應商以分散供應風險".to_string());
        }

        let no_quote_lines = analyses.iter().filter(|a| !a.has_quotes()).count();
        let single_source_lines = analyses.iter().filter(|a| a.is_single_source()).count();
        let coverage_score = if analyses.is_empty() {
            0
        } else {
            (no_quote_lines * 100 / analyses.len()) as u32
        };
        let timeline_level = if freshness.expired_quotes > 0 {
            RiskLevel::High
        } else if freshness.stale_quotes > 0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let supply_chain_level = if no_quote_lines > 0 {
            RiskLevel::Critical
        } else if single_source_lines > analyses.len() / 2 {
            RiskLevel::High
        } else if low_vendor_diversity {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let quality_level = if has_low_rated {
            RiskLevel::High
        } else if many_unrated {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let risk_score = RiskScore::new(
            coverage_score,
            timeline_level,
            budget_risk.as_ref().map(|r| r.level),
            supply_chain_level,
            quality_level,
        );

        tracing::debug!(
            "風險評估: 整體 {}，因素 {} 項，高風險支出佔比 {}，風險分數 {}",
            overall,
            factors.len(),
            high_risk_spend_share,
            risk_score.score
        );

        RiskAssessment {
            overall,
            worst_line_risk,
            high_risk_spend_share,
            factors,
            budget: budget_risk,
            risk_score,
            low_vendor_diversity,
            unrated_vendors,
            mitigation_actions: actions,
        }
    }

    /// 推薦成本高於目標成本的 BOM 行
    fn items_over_budget(analyses: &[BomLineAnalysis], plan: &RecommendedPlan) -> Vec<String> {
        analyses
            .iter()
            .filter(|a| {
                let target = a.target_total_cost.filter(|t| *t > Decimal::ZERO);
                match (target, plan.line(&a.bom_line_id)) {
                    (Some(target), Some(line)) => line.total_cost > target,
                    _ => false,
                }
            })
            .map(|a| a.bom_line_id.clone())
            .collect()
    }

    fn line_ids<F>(analyses: &[BomLineAnalysis], predicate: F) -> Vec<String>
    where
        F: Fn(&BomLineAnalysis) -> bool,
    {
        analyses
            .iter()
            .filter(|a| predicate(a))
            .map(|a| a.bom_line_id.clone())
            .collect()
    }
}
