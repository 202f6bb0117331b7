// ==========================================
// 表格数据批量导入 - 名称派生策略
// ==========================================
// 用途: 没有 name 列时，由已转换的属性计算文档名
// ==========================================

use crate::domain::document::PropertyMap;

pub trait NamingStrategy: Send + Sync {
    /// 计算文档名；无法确定时返回 None
    fn derive_name(&self, properties: &PropertyMap) -> Option<String>;
}

// ==========================================
// BuildingDocumentNaming
// ==========================================
// 格式: "<楼宇> <区域>.<主题>.<文档日期>.<文档号>"
// 五个字段任一缺失或为空 → None
#[derive(Debug, Clone)]
pub struct BuildingDocumentNaming {
    building: String,
    sector: String,
    subject: String,
    document: String,
    document_date: String,
}

impl BuildingDocumentNaming {
    pub const BUILDING: &'static str = "bg:IDBuilding";
    pub const SECTOR: &'static str = "bg:IDSector";
    pub const SUBJECT: &'static str = "bg:IDSubject";
    pub const DOCUMENT: &'static str = "bg:IDDocument";
    pub const DOCUMENT_DATE: &'static str = "bg:IDDocumentDate";

    /// 自定义字段名
    pub fn with_fields(
        building: impl Into<String>,
        sector: impl Into<String>,
        subject: impl Into<String>,
        document: impl Into<String>,
        document_date: impl Into<String>,
    ) -> Self {
        Self {
            building: building.into(),
            sector: sector.into(),
            subject: subject.into(),
            document: document.into(),
            document_date: document_date.into(),
        }
    }
}

impl Default for BuildingDocumentNaming {
    fn default() -> Self {
        Self::with_fields(
            Self::BUILDING,
            Self::SECTOR,
            Self::SUBJECT,
            Self::DOCUMENT,
            Self::DOCUMENT_DATE,
        )
    }
}

impl NamingStrategy for BuildingDocumentNaming {
    fn derive_name(&self, properties: &PropertyMap) -> Option<String> {
        let text = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.as_text())
                .filter(|s| !s.trim().is_empty())
        };

        Some(format!(
            "{} {}.{}.{}.{}",
            text(&self.building)?,
            text(&self.sector)?,
            text(&self.subject)?,
            text(&self.document_date)?,
            text(&self.document)?
        ))
    }
}

// ==========================================
// NoDerivedName
// ==========================================
// 必须提供 name 列的部署使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDerivedName;

impl NamingStrategy for NoDerivedName {
    fn derive_name(&self, _properties: &PropertyMap) -> Option<String> {
        None
    }
}
