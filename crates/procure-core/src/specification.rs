//! 規格（通用物料類型）模型

use serde::{Deserialize, Serialize};

/// 規格，例如「27 吋 4K 顯示器」
///
/// 由目錄子系統擁有，本引擎只讀取。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// 規格ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 類別（節省彙總依此分組，缺省時以名稱代替）
    pub category: Option<String>,
}

impl Specification {
    /// 創建新的規格
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
        }
    }

    /// 建構器模式：設置類別
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// 節省彙總使用的類別名稱
    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_falls_back_to_name() {
        let spec = Specification::new("SPEC-MON", "27-inch 4K monitor");
        assert_eq!(spec.category_name(), "27-inch 4K monitor");

        let spec = spec.with_category("Displays");
        assert_eq!(spec.category_name(), "Displays");
    }
}
