// ==========================================
// 表格数据批量导入 - 静态 Schema 目录
// ==========================================
// 来源: 代码注册 或 JSON 文件
// JSON 格式: { "File": { "dc:title": "string", "file:content": "blob" } }
// ==========================================

use crate::domain::types::FieldType;
use crate::schema::{DocumentType, SchemaCatalog};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct StaticSchemaCatalog {
    types: HashMap<String, DocumentType>,
}

impl StaticSchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册文档类型（构建器风格）
    pub fn with_type(mut self, doc_type: DocumentType) -> Self {
        self.register(doc_type);
        self
    }

    pub fn register(&mut self, doc_type: DocumentType) {
        self.types.insert(doc_type.name().to_string(), doc_type);
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(json: &str) -> Result<Self, Box<dyn Error>> {
        let raw: HashMap<String, HashMap<String, FieldType>> = serde_json::from_str(json)?;

        let mut catalog = Self::new();
        for (type_name, fields) in raw {
            let doc_type = fields
                .into_iter()
                .fold(DocumentType::new(type_name), |t, (field, ty)| {
                    t.with_field(field, ty)
                });
            catalog.register(doc_type);
        }
        Ok(catalog)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 内置核心类型（File / Note / Folder）
    pub fn with_core_types() -> Self {
        let dublincore = |t: DocumentType| {
            t.with_field("dc:title", FieldType::String)
                .with_field("dc:description", FieldType::String)
                .with_field("dc:issued", FieldType::Date)
                .with_field("dc:subjects", FieldType::StringList)
                .with_field("dc:contributors", FieldType::StringList)
        };

        Self::new()
            .with_type(dublincore(DocumentType::new("File")).with_field("file:content", FieldType::Blob))
            .with_type(dublincore(DocumentType::new("Note")).with_field("note:note", FieldType::String))
            .with_type(dublincore(DocumentType::new("Folder")))
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl SchemaCatalog for StaticSchemaCatalog {
    fn document_type(&self, name: &str) -> Option<&DocumentType> {
        self.types.get(name)
    }
}
