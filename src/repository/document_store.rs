// ==========================================
// 表格数据批量导入 - 文档库 Trait
// ==========================================
// 职责: 定义文档读写与事务边界接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::document::{Document, FieldValue, PropertyMap};
use crate::repository::error::RepositoryResult;

// ==========================================
// DocumentStore Trait
// ==========================================
// 用途: 导入核心访问持久化状态的唯一途径
// 实现者: SqliteDocumentStore（使用 rusqlite）
pub trait DocumentStore: Send + Sync {
    // ===== 读取 =====

    /// 指定路径是否已有文档
    fn exists(&self, path: &str) -> RepositoryResult<bool>;

    /// 读取文档
    fn get_document(&self, path: &str) -> RepositoryResult<Option<Document>>;

    /// 在父路径下查找键属性等于给定值的第一个文档
    ///
    /// # 参数
    /// - doc_type: None 表示不限类型
    fn find_by_property(
        &self,
        parent_path: &str,
        doc_type: Option<&str>,
        key: &str,
        value: &FieldValue,
    ) -> RepositoryResult<Option<Document>>;

    // ===== 写入 =====

    /// 创建文档（路径已存在时报错）
    fn create_document(&self, document: &Document) -> RepositoryResult<()>;

    /// 合并更新属性（文档不存在时报错）
    fn update_properties(&self, path: &str, properties: &PropertyMap) -> RepositoryResult<()>;

    // ===== 事务 =====

    fn begin_transaction(&self) -> RepositoryResult<()>;

    fn commit_transaction(&self) -> RepositoryResult<()>;

    fn rollback_transaction(&self) -> RepositoryResult<()>;

    /// 当前是否处于事务中
    fn is_transaction_active(&self) -> bool;
}
