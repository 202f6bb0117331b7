// ==========================================
// 表格数据批量导入 - 文档工厂策略
// ==========================================
// 职责: 判断是否已存在 / 创建 / 更新，导入核心只经由此接口改动文档库
// 变体:
// - DefaultDocumentFactory: 按目标路径判断存在
// - PropertyMatchDocumentFactory: 按父路径下同类型、同键属性值去重
// ==========================================

use crate::config::DocumentFactoryKind;
use crate::domain::document::{join_path, Document, DocumentRef, FieldValue, PropertyMap};
use crate::repository::document_store::DocumentStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::sync::Arc;

/// 标题字段
pub const TITLE_PROPERTY: &str = "dc:title";

// ==========================================
// DocumentFactory Trait
// ==========================================
pub trait DocumentFactory: Send + Sync {
    /// 目标文档是否已存在
    fn exists(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: &PropertyMap,
    ) -> RepositoryResult<bool>;

    /// 创建文档
    fn create_document(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: &PropertyMap,
    ) -> RepositoryResult<DocumentRef>;

    /// 更新已存在文档的属性
    fn update_document(
        &self,
        store: &dyn DocumentStore,
        doc_ref: &DocumentRef,
        properties: &PropertyMap,
    ) -> RepositoryResult<()>;
}

/// 按策略类型构造工厂
pub fn factory_for(kind: &DocumentFactoryKind) -> Arc<dyn DocumentFactory> {
    match kind {
        DocumentFactoryKind::Default => Arc::new(DefaultDocumentFactory),
        DocumentFactoryKind::PropertyMatch { key_property } => {
            Arc::new(PropertyMatchDocumentFactory::new(key_property.clone()))
        }
    }
}

// 未给标题时用文档名
fn with_default_title(name: &str, properties: &PropertyMap) -> PropertyMap {
    let mut properties = properties.clone();
    properties
        .entry(TITLE_PROPERTY.to_string())
        .or_insert_with(|| FieldValue::String(name.to_string()));
    properties
}

// ==========================================
// DefaultDocumentFactory
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDocumentFactory;

impl DocumentFactory for DefaultDocumentFactory {
    fn exists(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        _doc_type: &str,
        _properties: &PropertyMap,
    ) -> RepositoryResult<bool> {
        store.exists(&join_path(parent_path, name))
    }

    fn create_document(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: &PropertyMap,
    ) -> RepositoryResult<DocumentRef> {
        let document = Document::new(
            parent_path,
            name,
            doc_type,
            with_default_title(name, properties),
        );
        store.create_document(&document)?;
        Ok(document.doc_ref())
    }

    fn update_document(
        &self,
        store: &dyn DocumentStore,
        doc_ref: &DocumentRef,
        properties: &PropertyMap,
    ) -> RepositoryResult<()> {
        store.update_properties(doc_ref.as_str(), properties)
    }
}

// ==========================================
// PropertyMatchDocumentFactory
// ==========================================
// 行内没有键属性时退回按路径判断
#[derive(Debug, Clone)]
pub struct PropertyMatchDocumentFactory {
    key_property: String,
}

impl PropertyMatchDocumentFactory {
    pub fn new(key_property: impl Into<String>) -> Self {
        Self {
            key_property: key_property.into(),
        }
    }

    pub fn key_property(&self) -> &str {
        &self.key_property
    }
}

impl DocumentFactory for PropertyMatchDocumentFactory {
    fn exists(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: &PropertyMap,
    ) -> RepositoryResult<bool> {
        match properties.get(&self.key_property) {
            Some(value) => Ok(store
                .find_by_property(parent_path, Some(doc_type), &self.key_property, value)?
                .is_some()),
            None => store.exists(&join_path(parent_path, name)),
        }
    }

    fn create_document(
        &self,
        store: &dyn DocumentStore,
        parent_path: &str,
        name: &str,
        doc_type: &str,
        properties: &PropertyMap,
    ) -> RepositoryResult<DocumentRef> {
        DefaultDocumentFactory.create_document(store, parent_path, name, doc_type, properties)
    }

    fn update_document(
        &self,
        store: &dyn DocumentStore,
        doc_ref: &DocumentRef,
        properties: &PropertyMap,
    ) -> RepositoryResult<()> {
        if store.exists(doc_ref.as_str())? {
            return store.update_properties(doc_ref.as_str(), properties);
        }

        // 命中的文档可能在别的名字下
        let value = properties
            .get(&self.key_property)
            .ok_or_else(|| RepositoryError::NotFound(doc_ref.to_string()))?;
        let target = store
            .find_by_property(doc_ref.parent_path(), None, &self.key_property, value)?
            .ok_or_else(|| RepositoryError::NotFound(doc_ref.to_string()))?;
        store.update_properties(&target.path, properties)
    }
}
