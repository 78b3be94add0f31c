//! 報價查詢快取

use procure_core::{Quote, QuoteSource};
use std::collections::{BTreeSet, HashMap};

/// 單一規格的查詢結果
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteLookup {
    /// 查詢成功（可能為空）
    Loaded(Vec<Quote>),
    /// 協作方失敗，附錯誤訊息
    Unavailable(String),
}

impl QuoteLookup {
    pub fn quotes(&self) -> &[Quote] {
        match self {
            QuoteLookup::Loaded(quotes) => quotes,
            QuoteLookup::Unavailable(_) => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, QuoteLookup::Unavailable(_))
    }
}

/// 快取統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// 報價快取
///
/// 每個規格只向來源查詢一次，失敗結果同樣被記住，避免同一次分析重試。
#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: HashMap<String, QuoteLookup>,
    failed: BTreeSet<String>,
    stats: CacheStats,
}

impl QuoteCache {
    /// 創建新的快取
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得規格的報價，未快取時向來源查詢
    pub fn get_or_fetch<S>(&mut self, specification_id: &str, source: &S) -> &QuoteLookup
    where
        S: QuoteSource + ?Sized,
    {
        if self.entries.contains_key(specification_id) {
            self.stats.hits += 1;
            tracing::debug!("報價快取命中: {}", specification_id);
        } else {
            self.stats.misses += 1;
            let lookup = match source.quotes_for_specification(specification_id) {
                Ok(quotes) => QuoteLookup::Loaded(quotes),
                Err(err) => {
                    tracing::warn!("規格 {} 報價查詢失敗: {}", specification_id, err);
                    self.failed.insert(specification_id.to_string());
                    QuoteLookup::Unavailable(err.to_string())
                }
            };
            self.entries.insert(specification_id.to_string(), lookup);
        }

        &self.entries[specification_id]
    }

    /// 讀取已快取的結果
    pub fn get(&self, specification_id: &str) -> Option<&QuoteLookup> {
        self.entries.get(specification_id)
    }

    /// 檢查規格查詢是否失敗
    pub fn is_failed(&self, specification_id: &str) -> bool {
        self.failed.contains(specification_id)
    }

    /// 所有查詢失敗的規格（排序）
    pub fn failed_specifications(&self) -> Vec<String> {
        self.failed.iter().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清除所有快取
    pub fn clear(&mut self) {
        self.entries.clear();
        self.failed.clear();
        self.stats = CacheStats::default();
    }
}
