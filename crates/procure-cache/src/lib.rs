//! # Procure Cache
//!
//! 單次分析範圍內的上下文與報價快取（不做行程級單例）

pub mod context;
pub mod quote_cache;

// Re-export 主要類型
pub use context::AnalysisContext;
pub use quote_cache::{CacheStats, QuoteCache, QuoteLookup};
