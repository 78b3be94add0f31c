//! 報價索引：每個規格的合格報價

use chrono::NaiveDate;
use procure_cache::{AnalysisContext, QuoteLookup};
use procure_core::{Quote, QuoteSource};
use std::collections::HashMap;

/// 單一規格的報價狀態
#[derive(Debug, Clone, Copy)]
pub enum LineQuotes<'a> {
    /// 合格報價（可能為空），按參考幣別單價升序
    Eligible(&'a [Quote]),
    /// 協作方查詢失敗
    Unavailable(&'a str),
}

/// 報價索引
///
/// 在並行分析開始前建立；之後只讀。
#[derive(Debug, Clone, Default)]
pub struct QuoteIndex {
    eligible: HashMap<String, Vec<Quote>>,
    unavailable: HashMap<String, String>,
}

impl QuoteIndex {
    /// 過濾並排序合格報價
    ///
    /// 狀態須為 active/accepted 且在有效期間內；按參考幣別單價升序，
    /// 同價時報價日期較新者優先，再以供應商ID與報價ID固定順序。
    pub fn eligible_quotes(quotes: &[Quote], as_of: NaiveDate) -> Vec<Quote> {
        let mut eligible: Vec<Quote> = quotes
            .iter()
            .filter(|q| q.is_eligible(as_of))
            .cloned()
            .collect();

        eligible.sort_by(|a, b| {
            a.normalized_unit_price
                .cmp(&b.normalized_unit_price)
                .then_with(|| b.quote_date.cmp(&a.quote_date))
                .then_with(|| a.vendor_id.cmp(&b.vendor_id))
                .then_with(|| a.id.cmp(&b.id))
        });

        eligible
    }

    /// 經由上下文快取查詢所有規格並建立索引
    pub fn build<S>(ctx: &mut AnalysisContext, specification_ids: &[String], source: &S) -> Self
    where
        S: QuoteSource + ?Sized,
    {
        let as_of = ctx.as_of;
        let mut index = Self::default();

        for specification_id in specification_ids {
            match ctx.quotes_for(specification_id, source) {
                QuoteLookup::Loaded(quotes) => {
                    let eligible = Self::eligible_quotes(quotes, as_of);
                    tracing::debug!(
                        "規格 {}: 報價 {} 筆，合格 {} 筆",
                        specification_id,
                        quotes.len(),
                        eligible.len()
                    );
                    index.eligible.insert(specification_id.clone(), eligible);
                }
                QuoteLookup::Unavailable(message) => {
                    index
                        .unavailable
                        .insert(specification_id.clone(), message.clone());
                }
            }
        }

        index
    }

    /// 直接由報價建立索引（不經協作方）
    pub fn from_quotes(quotes: &[Quote], as_of: NaiveDate) -> Self {
        let mut grouped: HashMap<String, Vec<Quote>> = HashMap::new();
        for quote in quotes {
            grouped
                .entry(quote.specification_id.clone())
                .or_default()
                .push(quote.clone());
        }

        Self {
            eligible: grouped
                .into_iter()
                .map(|(spec, quotes)| {
                    let eligible = Self::eligible_quotes(&quotes, as_of);
                    (spec, eligible)
                })
                .collect(),
            unavailable: HashMap::new(),
        }
    }

    /// 標記規格查詢失敗
    pub fn mark_unavailable(&mut self, specification_id: impl Into<String>, message: impl Into<String>) {
        let specification_id = specification_id.into();
        self.eligible.remove(&specification_id);
        self.unavailable.insert(specification_id, message.into());
    }

    /// 查詢規格的合格報價
    pub fn lookup(&self, specification_id: &str) -> LineQuotes<'_> {
        if let Some(message) = self.unavailable.get(specification_id) {
            return LineQuotes::Unavailable(message);
        }
        LineQuotes::Eligible(
            self.eligible
                .get(specification_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        )
    }

    /// 合格報價（查詢失敗時為空）
    pub fn eligible(&self, specification_id: &str) -> &[Quote] {
        match self.lookup(specification_id) {
            LineQuotes::Eligible(quotes) => quotes,
            LineQuotes::Unavailable(_) => &[],
        }
    }

    pub fn is_unavailable(&self, specification_id: &str) -> bool {
        self.unavailable.contains_key(specification_id)
    }
}
