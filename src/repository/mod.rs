// ==========================================
// 表格数据批量导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供文档读写与事务接口，屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod document_factory;
pub mod document_store;
pub mod document_store_impl;
pub mod error;

// 重导出核心仓储
pub use document_factory::{
    factory_for, DefaultDocumentFactory, DocumentFactory, PropertyMatchDocumentFactory,
};
pub use document_store::DocumentStore;
pub use document_store_impl::SqliteDocumentStore;
pub use error::{root_cause, root_cause_message, RepositoryError, RepositoryResult};
