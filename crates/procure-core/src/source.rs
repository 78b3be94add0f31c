//! 外部協作方介面
//!
//! 目錄、報價/匯率、專案/請購儲存與供應商評分服務都在引擎之外；
//! 引擎只透過這些 trait 讀取資料。

use crate::{Project, Quote, Result, Specification, VendorRatingSummary};

/// 專案 / BOM / 請購儲存
pub trait ProjectStore {
    /// 載入專案；未知專案返回 `ProcureError::ProjectNotFound`
    fn load_project(&self, project_id: &str) -> Result<Project>;

    /// 解析規格（目錄服務）
    fn specification(&self, specification_id: &str) -> Option<Specification>;
}

/// 報價來源（已換算為參考幣別）
pub trait QuoteSource {
    /// 指定規格的所有報價（含不合格的，由引擎過濾）；
    /// 失敗時返回 `ProcureError::DataUnavailable`
    fn quotes_for_specification(&self, specification_id: &str) -> Result<Vec<Quote>>;
}

/// 供應商評分服務（可選）
pub trait VendorRatingSource {
    fn rating_summary(&self, vendor_id: &str) -> Option<VendorRatingSummary>;
}

/// 不提供任何評分
pub struct NoRatings;

impl VendorRatingSource for NoRatings {
    fn rating_summary(&self, _vendor_id: &str) -> Option<VendorRatingSummary> {
        None
    }
}
