//! 分析上下文

use chrono::NaiveDate;
use procure_core::{OptimizerConfig, Quote, QuoteSource};

use crate::quote_cache::{QuoteCache, QuoteLookup};

/// 單次 `analyze_project` 呼叫的上下文
///
/// 沿呼叫鏈顯式傳遞；呼叫結束即丟棄，並發請求之間不共享快取。
#[derive(Debug)]
pub struct AnalysisContext {
    /// 分析基準日（判斷過期與陳舊）
    pub as_of: NaiveDate,

    /// 優化器配置
    pub config: OptimizerConfig,

    quotes: QuoteCache,
}

impl AnalysisContext {
    /// 創建新的上下文
    pub fn new(as_of: NaiveDate, config: OptimizerConfig) -> Self {
        Self {
            as_of,
            config,
            quotes: QuoteCache::new(),
        }
    }

    /// 取得規格的報價（經快取）
    pub fn quotes_for<S>(&mut self, specification_id: &str, source: &S) -> &QuoteLookup
    where
        S: QuoteSource + ?Sized,
    {
        self.quotes.get_or_fetch(specification_id, source)
    }

    /// 預先載入多個規格，返回查詢失敗的規格
    pub fn prefetch<S>(&mut self, specification_ids: &[String], source: &S) -> Vec<String>
    where
        S: QuoteSource + ?Sized,
    {
        for specification_id in specification_ids {
            self.quotes.get_or_fetch(specification_id, source);
        }
        specification_ids
            .iter()
            .filter(|id| self.quotes.is_failed(id))
            .cloned()
            .collect()
    }

    /// 已快取的查詢結果
    pub fn lookup(&self, specification_id: &str) -> Option<&QuoteLookup> {
        self.quotes.get(specification_id)
    }

    /// 已快取的原始報價（未過濾），查詢失敗或未載入時為空
    pub fn raw_quotes(&self, specification_id: &str) -> &[Quote] {
        self.quotes
            .get(specification_id)
            .map(QuoteLookup::quotes)
            .unwrap_or(&[])
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.quotes
    }
}
