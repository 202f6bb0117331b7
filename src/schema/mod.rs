// ==========================================
// 表格数据批量导入 - 文档类型 Schema
// ==========================================
// 职责: 文档类型名 → 字段定义（字段是否存在、字段类型）
// 红线: 导入层只读，不做 schema 迁移
// ==========================================

pub mod static_catalog;

pub use static_catalog::StaticSchemaCatalog;

use crate::domain::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// DocumentType - 文档类型定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    name: String,
    fields: HashMap<String, FieldType>,
}

impl DocumentType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: HashMap::new(),
        }
    }

    /// 追加字段（构建器风格）
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> &HashMap<String, FieldType> {
        &self.fields
    }
}

// ==========================================
// SchemaCatalog Trait
// ==========================================
// 用途: 按名称解析文档类型
// 实现者: StaticSchemaCatalog
pub trait SchemaCatalog: Send + Sync {
    /// 查找文档类型，未注册返回 None
    fn document_type(&self, name: &str) -> Option<&DocumentType>;
}
