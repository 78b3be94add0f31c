//! 記憶體內的協作方實作（測試、示例與嵌入式使用）

use std::collections::{HashMap, HashSet};

use crate::source::{ProjectStore, QuoteSource, VendorRatingSource};
use crate::{
    ProcureError, Project, Quote, Result, Specification, VendorRating, VendorRatingSummary,
};

/// 記憶體資料儲存
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    projects: HashMap<String, Project>,
    specifications: HashMap<String, Specification>,
    quotes: HashMap<String, Vec<Quote>>,
    ratings: HashMap<String, Vec<VendorRating>>,
    unavailable_specifications: HashSet<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加專案
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.id.clone(), project);
        self
    }

    /// 建構器模式：添加規格
    pub fn with_specification(mut self, specification: Specification) -> Self {
        self.specifications
            .insert(specification.id.clone(), specification);
        self
    }

    /// 建構器模式：添加報價
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.add_quote(quote);
        self
    }

    /// 建構器模式：添加評分
    pub fn with_rating(mut self, rating: VendorRating) -> Self {
        self.ratings
            .entry(rating.vendor_id.clone())
            .or_default()
            .push(rating);
        self
    }

    /// 建構器模式：模擬某規格的報價查詢失敗
    pub fn with_unavailable_specification(mut self, specification_id: impl Into<String>) -> Self {
        self.unavailable_specifications
            .insert(specification_id.into());
        self
    }

    /// 添加報價
    pub fn add_quote(&mut self, quote: Quote) {
        self.quotes
            .entry(quote.specification_id.clone())
            .or_default()
            .push(quote);
    }

    /// 替換報價（同ID）
    pub fn replace_quote(&mut self, quote: Quote) {
        if let Some(quotes) = self.quotes.get_mut(&quote.specification_id) {
            if let Some(existing) = quotes.iter_mut().find(|q| q.id == quote.id) {
                *existing = quote;
                return;
            }
        }
        self.add_quote(quote);
    }
}

impl ProjectStore for InMemoryStore {
    fn load_project(&self, project_id: &str) -> Result<Project> {
        self.projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| ProcureError::ProjectNotFound(project_id.to_string()))
    }

    fn specification(&self, specification_id: &str) -> Option<Specification> {
        self.specifications.get(specification_id).cloned()
    }
}

impl QuoteSource for InMemoryStore {
    fn quotes_for_specification(&self, specification_id: &str) -> Result<Vec<Quote>> {
        if self.unavailable_specifications.contains(specification_id) {
            return Err(ProcureError::data_unavailable(
                specification_id,
                "報價服務無回應",
            ));
        }
        Ok(self
            .quotes
            .get(specification_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl VendorRatingSource for InMemoryStore {
    fn rating_summary(&self, vendor_id: &str) -> Option<VendorRatingSummary> {
        self.ratings
            .get(vendor_id)
            .map(|ratings| VendorRatingSummary::from_ratings(vendor_id, ratings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn test_unknown_project() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.load_project("missing"),
            Err(ProcureError::ProjectNotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_quotes_and_failures() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut store = InMemoryStore::new()
            .with_quote(Quote::new("V1", "SPEC-1", Decimal::from(10), date))
            .with_unavailable_specification("SPEC-2");

        assert_eq!(store.quotes_for_specification("SPEC-1").unwrap().len(), 1);
        assert!(store.quotes_for_specification("SPEC-3").unwrap().is_empty());
        assert!(store
            .quotes_for_specification("SPEC-2")
            .unwrap_err()
            .is_recoverable());

        let mut updated = store.quotes_for_specification("SPEC-1").unwrap().remove(0);
        updated.normalized_unit_price = Decimal::from(8);
        store.replace_quote(updated);
        let quotes = store.quotes_for_specification("SPEC-1").unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].normalized_unit_price, Decimal::from(8));
    }

    #[test]
    fn test_rating_summary() {
        let store = InMemoryStore::new()
            .with_rating(VendorRating::new("V1").with_scores(5, 5, 5, 5))
            .with_rating(VendorRating::new("V1").with_scores(3, 3, 3, 3));

        let summary = store.rating_summary("V1").unwrap();
        assert_eq!(summary.overall_avg, 4.0);
        assert!(store.rating_summary("V2").is_none());
    }
}
