// ==========================================
// 表格数据批量导入 - 核心库
// ==========================================
// 职责: 表格行 → 文档库实体（创建/更新）
// 技术栈: Rust + SQLite
// 系统定位: 批量导入引擎（单行失败不阻断整个文件）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 文档类型 Schema
pub mod schema;

// 数据仓储层 - 文档库访问
pub mod repository;

// 导入层 - 行处理与转换管道
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 导入任务提交与日志查询
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FieldType, ImportStatus};

// 领域实体
pub use domain::{
    BlobRef, Document, DocumentRef, FieldValue, ImportJob, ImportJobId, ImportLog,
    ImportLogEntry, ImportResultSummary, PropertyMap,
};

// Schema
pub use schema::{DocumentType, SchemaCatalog, StaticSchemaCatalog};

// 导入引擎
pub use importer::{ImportEngine, ImportError, ImportIssue};

// 配置
pub use config::{DocumentFactoryKind, ImporterConfig, ImporterOptions};

// API
pub use api::{ImportApi, ImportUser};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "CSV 文档导入器";
