// ==========================================
// 表格数据批量导入 - 文档领域模型
// ==========================================
// 职责: 字段值、Blob 引用、属性映射、文档实体
// 用途: 导入层构造，仓储层持久化
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ==========================================
// BlobRef - 二进制内容引用
// ==========================================
// 指向 blob 根目录下的文件，不复制内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub filename: String, // 文件名（不含目录）
    pub path: PathBuf,    // 解析后的完整路径
}

// ==========================================
// FieldValue - 已转换的字段值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    String(String),
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDate),
    StringList(Vec<String>),
    ComplexList(Vec<String>),
    Blob(BlobRef),
}

impl FieldValue {
    /// 标量值的文本形式（用于名称派生）
    ///
    /// 列表与 Blob 没有文本形式，返回 None
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Integer(v) => Some(v.to_string()),
            FieldValue::Long(v) => Some(v.to_string()),
            FieldValue::Double(v) => Some(v.to_string()),
            FieldValue::Boolean(v) => Some(v.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y%m%d").to_string()),
            FieldValue::StringList(_) | FieldValue::ComplexList(_) | FieldValue::Blob(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// 属性映射: 列标签 → 已转换值
pub type PropertyMap = BTreeMap<String, FieldValue>;

// ==========================================
// DocumentRef - 文档路径引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 父路径（根路径的父路径仍为 "/"）
    pub fn parent_path(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// Document - 文档实体
// ==========================================
// 对齐: documents 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub path: String,           // 完整路径（主键）
    pub parent_path: String,    // 父路径
    pub name: String,           // 文档名
    pub doc_type: String,       // 文档类型
    pub properties: PropertyMap, // 属性
}

impl Document {
    pub fn new(
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: PropertyMap,
    ) -> Self {
        Self {
            path: join_path(parent_path, name),
            parent_path: parent_path.to_string(),
            name: name.to_string(),
            doc_type: doc_type.to_string(),
            properties,
        }
    }

    pub fn doc_ref(&self) -> DocumentRef {
        DocumentRef::new(self.path.clone())
    }

    pub fn property(&self, key: &str) -> Option<&FieldValue> {
        self.properties.get(key)
    }

    /// 标题（dc:title）
    pub fn title(&self) -> Option<&str> {
        self.property("dc:title").and_then(|v| v.as_str())
    }
}

/// 拼接父路径与文档名，避免出现双斜杠
pub fn join_path(parent_path: &str, name: &str) -> String {
    let parent = parent_path.trim_end_matches('/');
    format!("{}/{}", parent, name.trim_start_matches('/'))
}
