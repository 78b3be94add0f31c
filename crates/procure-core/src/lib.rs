//! # Procure Core
//!
//! 專案採購優化的核心資料模型與類型定義

pub mod config;
pub mod memory;
pub mod project;
pub mod quote;
pub mod source;
pub mod specification;
pub mod strategy;
pub mod vendor;

// Re-export 主要類型
pub use config::OptimizerConfig;
pub use memory::InMemoryStore;
pub use project::{BomLine, Project, ProjectRequisition, RequisitionItem};
pub use quote::{Quote, QuoteStatus};
pub use source::{NoRatings, ProjectStore, QuoteSource, VendorRatingSource};
pub use specification::Specification;
pub use strategy::{ProcurementStrategy, StrategyKind};
pub use vendor::{VendorRating, VendorRatingSummary};

/// 採購分析錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ProcureError {
    #[error("找不到專案: {0}")]
    ProjectNotFound(String),

    #[error("找不到 BOM 行: {0}")]
    BomLineNotFound(String),

    #[error("無效的策略配置: {0}")]
    InvalidStrategyConfig(String),

    #[error("規格 {specification_id} 的報價資料無法取得: {message}")]
    DataUnavailable {
        specification_id: String,
        message: String,
    },

    #[error("配置解析錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProcureError {
    /// 建立資料不可用錯誤
    pub fn data_unavailable(specification_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            specification_id: specification_id.into(),
            message: message.into(),
        }
    }

    /// 是否可在單行層級恢復（不中止整體分析）
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProcureError::DataUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProcureError>;
