//! 專案、BOM 與請購模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// BOM 行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    /// BOM 行ID
    pub id: String,

    /// 規格ID
    pub specification_id: String,

    /// 需求數量（≥ 1）
    pub quantity_needed: u32,

    /// 備註
    pub notes: Option<String>,
}

impl BomLine {
    /// 創建新的 BOM 行
    pub fn new(id: impl Into<String>, specification_id: impl Into<String>, quantity_needed: u32) -> Self {
        Self {
            id: id.into(),
            specification_id: specification_id.into(),
            quantity_needed,
            notes: None,
        }
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// 請購項目
///
/// 多個請購項目可引用同一 BOM 行（分批履行），其計劃數量加總即為該行覆蓋量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequisitionItem {
    /// 請購項目ID
    pub id: Uuid,

    /// 引用的 BOM 行ID
    pub bom_line_id: String,

    /// 計劃數量
    pub quantity_planned: u32,

    /// 目標單價（可選）
    pub target_unit_price: Option<Decimal>,

    /// 已選定報價
    pub selected_quote_id: Option<Uuid>,

    /// 採購狀態（pending, quoted, ordered, received, cancelled）
    pub procurement_status: String,
}

impl RequisitionItem {
    /// 創建新的請購項目
    pub fn new(bom_line_id: impl Into<String>, quantity_planned: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            bom_line_id: bom_line_id.into(),
            quantity_planned,
            target_unit_price: None,
            selected_quote_id: None,
            procurement_status: "pending".to_string(),
        }
    }

    /// 建構器模式：設置目標單價
    pub fn with_target_unit_price(mut self, price: Decimal) -> Self {
        self.target_unit_price = Some(price);
        self
    }

    /// 建構器模式：設置已選定報價
    pub fn with_selected_quote(mut self, quote_id: Uuid) -> Self {
        self.selected_quote_id = Some(quote_id);
        self
    }

    /// 建構器模式：設置採購狀態
    pub fn with_procurement_status(mut self, status: impl Into<String>) -> Self {
        self.procurement_status = status.into();
        self
    }

    /// 目標總成本（目標單價 × 計劃數量）
    pub fn target_total(&self) -> Option<Decimal> {
        self.target_unit_price
            .map(|price| price * Decimal::from(self.quantity_planned))
    }
}

/// 專案請購單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequisition {
    /// 請購單ID
    pub id: Uuid,

    /// 名稱
    pub name: String,

    /// 請購項目
    pub items: Vec<RequisitionItem>,
}

impl ProjectRequisition {
    /// 創建新的請購單
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// 建構器模式：添加請購項目
    pub fn with_item(mut self, item: RequisitionItem) -> Self {
        self.items.push(item);
        self
    }
}

/// 專案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// 專案ID
    pub id: String,

    /// 名稱
    pub name: String,

    /// 預算（參考幣別）
    pub budget: Decimal,

    /// BOM 行
    pub bom_lines: Vec<BomLine>,

    /// 請購單
    pub requisitions: Vec<ProjectRequisition>,
}

impl Project {
    /// 創建新的專案
    pub fn new(id: impl Into<String>, name: impl Into<String>, budget: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            budget,
            bom_lines: Vec::new(),
            requisitions: Vec::new(),
        }
    }

    /// 建構器模式：添加 BOM 行
    pub fn with_bom_line(mut self, line: BomLine) -> Self {
        self.bom_lines.push(line);
        self
    }

    /// 建構器模式：添加請購單
    pub fn with_requisition(mut self, requisition: ProjectRequisition) -> Self {
        self.requisitions.push(requisition);
        self
    }

    /// 查找 BOM 行
    pub fn bom_line(&self, bom_line_id: &str) -> Option<&BomLine> {
        self.bom_lines.iter().find(|line| line.id == bom_line_id)
    }

    /// 引用指定 BOM 行的所有請購項目（附請購單名稱）
    pub fn requisition_items_for<'a>(
        &'a self,
        bom_line_id: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a RequisitionItem)> + 'a {
        self.requisitions.iter().flat_map(move |req| {
            req.items
                .iter()
                .filter(move |item| item.bom_line_id == bom_line_id)
                .map(move |item| (req.name.as_str(), item))
        })
    }

    /// 專案涉及的規格ID（去重，保持 BOM 順序）
    pub fn specification_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for line in &self.bom_lines {
            if !ids.contains(&line.specification_id) {
                ids.push(line.specification_id.clone());
            }
        }
        ids
    }
}
