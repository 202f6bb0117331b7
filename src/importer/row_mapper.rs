// ==========================================
// 表格数据批量导入 - 行映射
// ==========================================
// 职责: 表头 + 一行单元格 → 属性映射
// 保留列: name / type / autofileimport（不作为字段）
// 字段解析: 先按表头原文匹配，找不到再去掉第一个 ':' 及之前的前缀
// ==========================================

use crate::domain::document::{FieldValue, PropertyMap};
use crate::importer::error::ImportIssue;
use crate::importer::field_converter::FieldConverter;
use crate::schema::DocumentType;

pub const NAME_COLUMN: &str = "name";
pub const TYPE_COLUMN: &str = "type";
pub const AUTO_IMPORT_COLUMN: &str = "autofileimport";

/// 自动导入的内容字段
pub const CONTENT_FIELD: &str = "content";

/// 自动导入列的开启值
pub const AUTO_IMPORT_ENABLED: &str = "1";

// ==========================================
// HeaderLayout - 保留列位置
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderLayout {
    pub name_index: Option<usize>,
    pub type_index: Option<usize>,
    pub auto_import_index: Option<usize>,
}

impl HeaderLayout {
    /// 扫描表头一次（同名列取第一个）
    pub fn scan(header: &[String]) -> Self {
        let position = |label: &str| header.iter().position(|h| h.trim() == label);
        Self {
            name_index: position(NAME_COLUMN),
            type_index: position(TYPE_COLUMN),
            auto_import_index: position(AUTO_IMPORT_COLUMN),
        }
    }
}

fn is_reserved(label: &str) -> bool {
    matches!(label, NAME_COLUMN | TYPE_COLUMN | AUTO_IMPORT_COLUMN)
}

// ==========================================
// RowMapper
// ==========================================
pub struct RowMapper {
    header: Vec<String>,
    layout: HeaderLayout,
    converter: FieldConverter,
}

impl RowMapper {
    pub fn new(header: Vec<String>, converter: FieldConverter) -> Self {
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();
        let layout = HeaderLayout::scan(&header);
        Self {
            header,
            layout,
            converter,
        }
    }

    pub fn layout(&self) -> HeaderLayout {
        self.layout
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn converter(&self) -> &FieldConverter {
        &self.converter
    }

    // 短行缺的单元格视为空
    fn cell<'r>(row: &'r [String], index: usize) -> &'r str {
        row.get(index).map(|c| c.trim()).unwrap_or("")
    }

    /// type 列的值；没有 type 列时返回 None
    pub fn type_cell<'r>(&self, row: &'r [String]) -> Option<&'r str> {
        self.layout.type_index.map(|i| Self::cell(row, i))
    }

    /// name 列的值；没有 name 列时返回 None
    pub fn name_cell<'r>(&self, row: &'r [String]) -> Option<&'r str> {
        self.layout.name_index.map(|i| Self::cell(row, i))
    }

    /// 本行是否要求按名称自动导入内容文件
    pub fn auto_import_requested(&self, row: &[String]) -> bool {
        self.layout
            .auto_import_index
            .is_some_and(|i| Self::cell(row, i) == AUTO_IMPORT_ENABLED)
    }

    /// 计算属性映射
    ///
    /// 任一单元格失败，整行作废，返回该单元格的问题
    pub fn compute_properties(
        &self,
        doc_type: &DocumentType,
        row: &[String],
    ) -> Result<PropertyMap, ImportIssue> {
        let mut properties = PropertyMap::new();

        for (col, label) in self.header.iter().enumerate() {
            if label.is_empty() || is_reserved(label) {
                continue;
            }

            let field_name =
                resolve_field_name(doc_type, label).ok_or_else(|| ImportIssue::UnknownField {
                    field: label.clone(),
                    doc_type: doc_type.name().to_string(),
                })?;

            let value = Self::cell(row, col);
            if value.is_empty() {
                continue;
            }

            let field_type =
                doc_type
                    .field_type(field_name)
                    .ok_or_else(|| ImportIssue::UnknownField {
                        field: label.clone(),
                        doc_type: doc_type.name().to_string(),
                    })?;
            let converted = self.converter.convert(field_type, label, value)?;
            properties.insert(label.clone(), converted);
        }

        Ok(properties)
    }

    /// 按派生名在 blob 目录查找内容文件，写入 content 字段
    pub fn attach_auto_import(
        &self,
        name: &str,
        properties: &mut PropertyMap,
    ) -> Result<(), ImportIssue> {
        let blob = self
            .converter
            .find_blob_by_prefix(name)
            .ok_or_else(|| ImportIssue::MissingFile(format!("{}.pdf", name)))?;

        tracing::debug!(name = %name, file = %blob.filename, "自动导入内容文件");
        properties.insert(CONTENT_FIELD.to_string(), FieldValue::Blob(blob));
        Ok(())
    }
}

/// 表头标签 → 类型上的字段名
pub fn resolve_field_name<'l>(doc_type: &DocumentType, label: &'l str) -> Option<&'l str> {
    if doc_type.has_field(label) {
        return Some(label);
    }
    label
        .split_once(':')
        .map(|(_, local)| local)
        .filter(|local| doc_type.has_field(local))
}
