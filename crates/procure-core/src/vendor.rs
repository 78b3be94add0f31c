//! 供應商評分模型

use serde::{Deserialize, Serialize};

/// 單筆供應商評分（各維度 1-5，可缺）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorRating {
    pub vendor_id: String,
    pub price: Option<u8>,
    pub quality: Option<u8>,
    pub delivery: Option<u8>,
    pub service: Option<u8>,
}

impl VendorRating {
    pub fn new(vendor_id: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            ..Default::default()
        }
    }

    /// 建構器模式：一次設置四個維度
    pub fn with_scores(mut self, price: u8, quality: u8, delivery: u8, service: u8) -> Self {
        self.price = Some(price);
        self.quality = Some(quality);
        self.delivery = Some(delivery);
        self.service = Some(service);
        self
    }
}

/// 供應商評分彙總
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRatingSummary {
    pub vendor_id: String,
    pub total_ratings: usize,
    pub avg_price: Option<f64>,
    pub avg_quality: Option<f64>,
    pub avg_delivery: Option<f64>,
    pub avg_service: Option<f64>,
    /// 各維度平均值的平均（無任何評分時為 0）
    pub overall_avg: f64,
}

impl VendorRatingSummary {
    /// 以單一整體評分建立彙總（評分服務只提供平均值時使用）
    pub fn from_overall(vendor_id: impl Into<String>, overall_avg: f64) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            total_ratings: 1,
            avg_price: None,
            avg_quality: None,
            avg_delivery: None,
            avg_service: None,
            overall_avg,
        }
    }

    /// 彙總多筆評分
    pub fn from_ratings(vendor_id: impl Into<String>, ratings: &[VendorRating]) -> Self {
        fn average(values: impl Iterator<Item = Option<u8>>) -> Option<f64> {
            let scores: Vec<f64> = values.flatten().map(f64::from).collect();
            if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            }
        }

        let avg_price = average(ratings.iter().map(|r| r.price));
        let avg_quality = average(ratings.iter().map(|r| r.quality));
        let avg_delivery = average(ratings.iter().map(|r| r.delivery));
        let avg_service = average(ratings.iter().map(|r| r.service));

        let dimensions: Vec<f64> = [avg_price, avg_quality, avg_delivery, avg_service]
            .into_iter()
            .flatten()
            .collect();
        let overall_avg = if dimensions.is_empty() {
            0.0
        } else {
            dimensions.iter().sum::<f64>() / dimensions.len() as f64
        };

        Self {
            vendor_id: vendor_id.into(),
            total_ratings: ratings.len(),
            avg_price,
            avg_quality,
            avg_delivery,
            avg_service,
            overall_avg,
        }
    }

    /// 是否有任何評分
    pub fn is_rated(&self) -> bool {
        self.total_ratings > 0
    }
}
