//! 報價新鮮度統計

use chrono::NaiveDate;
use procure_core::{Quote, QuoteStatus};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteFreshnessStats {
    pub total_quotes: usize,
    pub fresh_quotes: usize,
    pub stale_quotes: usize,
    pub expired_quotes: usize,
    pub average_age_days: i64,
}

impl QuoteFreshnessStats {
    /// 統計報價新鮮度（同ID只計一次）
    pub fn compute<'a, I>(quotes: I, as_of: NaiveDate, stale_after_days: u32) -> Self
    where
        I: IntoIterator<Item = &'a Quote>,
    {
        let mut stats = Self::default();
        let mut seen = HashSet::new();
        let mut total_age = 0i64;

        for quote in quotes {
            if !seen.insert(quote.id) {
                continue;
            }

            stats.total_quotes += 1;
            total_age += quote.age_days(as_of);

            if quote.is_expired(as_of) || quote.status == QuoteStatus::Expired {
                stats.expired_quotes += 1;
            } else if quote.is_stale(as_of, stale_after_days) {
                stats.stale_quotes += 1;
            } else {
                stats.fresh_quotes += 1;
            }
        }

        if stats.total_quotes > 0 {
            stats.average_age_days = total_age / stats.total_quotes as i64;
        }

        stats
    }

    /// 陳舊與過期報價佔比
    pub fn stale_share(&self) -> f64 {
        if self.total_quotes == 0 {
            return 0.0;
        }
        (self.stale_quotes + self.expired_quotes) as f64 / self.total_quotes as f64
    }
}
