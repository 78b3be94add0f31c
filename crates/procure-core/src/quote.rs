//! 供應商報價模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 報價狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// 有效
    Active,
    /// 已被新版本取代
    Superseded,
    /// 已過期
    Expired,
    /// 已接受（已承諾的行）
    Accepted,
    /// 已拒絕
    Declined,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Active => "active",
            QuoteStatus::Superseded => "superseded",
            QuoteStatus::Expired => "expired",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Declined => "declined",
        }
    }

    /// 狀態是否允許參與決策
    pub fn is_usable(&self) -> bool {
        matches!(self, QuoteStatus::Active | QuoteStatus::Accepted)
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(QuoteStatus::Active),
            "superseded" => Ok(QuoteStatus::Superseded),
            "expired" => Ok(QuoteStatus::Expired),
            "accepted" => Ok(QuoteStatus::Accepted),
            "declined" => Ok(QuoteStatus::Declined),
            other => Err(format!("未知報價狀態: {}", other)),
        }
    }
}

/// 報價
///
/// 由報價管理協作方擁有；`normalized_unit_price` 已在上游換算為參考幣別。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 報價ID
    pub id: Uuid,

    /// 供應商ID
    pub vendor_id: String,

    /// 供應商名稱
    pub vendor_name: String,

    /// 規格ID（經由產品關聯）
    pub specification_id: String,

    /// 產品名稱
    pub product_name: Option<String>,

    /// 原幣單價
    pub unit_price: Decimal,

    /// 原幣別
    pub currency: String,

    /// 參考幣別單價
    pub normalized_unit_price: Decimal,

    /// 報價日期
    pub quote_date: NaiveDate,

    /// 生效日
    pub valid_from: Option<NaiveDate>,

    /// 到期日
    pub valid_until: Option<NaiveDate>,

    /// 狀態
    pub status: QuoteStatus,
}

impl Quote {
    /// 創建新的報價（參考幣別報價，原幣即參考幣）
    pub fn new(
        vendor_id: impl Into<String>,
        specification_id: impl Into<String>,
        normalized_unit_price: Decimal,
        quote_date: NaiveDate,
    ) -> Self {
        let vendor_id = vendor_id.into();
        Self {
            id: Uuid::new_v4(),
            vendor_name: vendor_id.clone(),
            vendor_id,
            specification_id: specification_id.into(),
            product_name: None,
            unit_price: normalized_unit_price,
            currency: "USD".to_string(),
            normalized_unit_price,
            quote_date,
            valid_from: None,
            valid_until: None,
            status: QuoteStatus::Active,
        }
    }

    /// 建構器模式：設置供應商名稱
    pub fn with_vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = name.into();
        self
    }

    /// 建構器模式：設置產品名稱
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// 建構器模式：設置原幣價格
    pub fn with_native_price(mut self, unit_price: Decimal, currency: impl Into<String>) -> Self {
        self.unit_price = unit_price;
        self.currency = currency.into();
        self
    }

    /// 建構器模式：設置有效期間
    pub fn with_validity(mut self, valid_from: Option<NaiveDate>, valid_until: Option<NaiveDate>) -> Self {
        self.valid_from = valid_from;
        self.valid_until = valid_until;
        self
    }

    /// 建構器模式：設置到期日
    pub fn with_valid_until(mut self, valid_until: NaiveDate) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: QuoteStatus) -> Self {
        self.status = status;
        self
    }

    /// 是否已過到期日
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        self.valid_until.map(|until| as_of > until).unwrap_or(false)
    }

    /// 是否尚未生效
    pub fn is_pending(&self, as_of: NaiveDate) -> bool {
        self.valid_from.map(|from| as_of < from).unwrap_or(false)
    }

    /// 是否為合格報價（狀態 active/accepted 且在有效期間內）
    pub fn is_eligible(&self, as_of: NaiveDate) -> bool {
        self.status.is_usable() && !self.is_expired(as_of) && !self.is_pending(as_of)
    }

    /// 是否為陳舊報價
    ///
    /// 已過期即陳舊；設有未來到期日則不論報價多舊都不算陳舊；
    /// 無到期日時超過 `stale_after_days` 天視為陳舊。
    pub fn is_stale(&self, as_of: NaiveDate, stale_after_days: u32) -> bool {
        if self.is_expired(as_of) || self.status == QuoteStatus::Expired {
            return true;
        }
        if self.valid_until.is_some() {
            return false;
        }
        self.age_days(as_of) > i64::from(stale_after_days)
    }

    /// 報價天數
    pub fn age_days(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.quote_date).num_days()
    }

    /// 距離到期的天數，無到期日時返回 None
    pub fn days_until_expiration(&self, as_of: NaiveDate) -> Option<i64> {
        self.valid_until.map(|until| (until - as_of).num_days())
    }

    /// 指定數量的參考幣別總價
    pub fn total_for(&self, quantity: u32) -> Decimal {
        self.normalized_unit_price * Decimal::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(QuoteStatus::Active, true)]
    #[case(QuoteStatus::Accepted, true)]
    #[case(QuoteStatus::Superseded, false)]
    #[case(QuoteStatus::Expired, false)]
    #[case(QuoteStatus::Declined, false)]
    fn test_status_eligibility(#[case] status: QuoteStatus, #[case] eligible: bool) {
        let quote = Quote::new("V1", "SPEC-1", Decimal::from(10), date(2025, 1, 1)).with_status(status);
        assert_eq!(quote.is_eligible(date(2025, 2, 1)), eligible);
    }

    #[test]
    fn test_validity_window() {
        let quote = Quote::new("V1", "SPEC-1", Decimal::from(10), date(2025, 1, 1))
            .with_validity(Some(date(2025, 1, 10)), Some(date(2025, 3, 31)));

        assert!(!quote.is_eligible(date(2025, 1, 5)));
        assert!(quote.is_eligible(date(2025, 1, 10)));
        // 到期日當天仍有效
        assert!(quote.is_eligible(date(2025, 3, 31)));
        assert!(!quote.is_eligible(date(2025, 4, 1)));
        assert!(quote.is_expired(date(2025, 4, 1)));
    }

    #[test]
    fn test_staleness() {
        let as_of = date(2025, 6, 1);

        let old_open = Quote::new("V1", "SPEC-1", Decimal::from(10), date(2025, 1, 1));
        assert!(old_open.is_stale(as_of, 90));

        let old_but_valid = old_open.clone().with_valid_until(date(2025, 12, 31));
        assert!(!old_but_valid.is_stale(as_of, 90));

        let recent = Quote::new("V1", "SPEC-1", Decimal::from(10), date(2025, 5, 1));
        assert!(!recent.is_stale(as_of, 90));

        let expired = recent.with_valid_until(date(2025, 5, 15));
        assert!(expired.is_stale(as_of, 90));
        assert_eq!(expired.days_until_expiration(as_of), Some(-17));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Accepted".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert!("pending".parse::<QuoteStatus>().is_err());
    }
}
