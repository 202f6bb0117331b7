// ==========================================
// 表格数据批量导入 - 导入层
// ==========================================
// 职责: 行处理与转换管道
// 流程: 数据源 → 行映射（字段转换）→ 名称 → 创建/更新 → 日志 → 批次提交
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod batch;
pub mod engine;
pub mod error;
pub mod field_converter;
pub mod naming;
pub mod notification;
pub mod row_mapper;
pub mod row_source;

// 重导出核心类型
pub use batch::BatchCoordinator;
pub use engine::ImportEngine;
pub use error::{ImportError, ImportIssue, ImportResult};
pub use field_converter::FieldConverter;
pub use naming::{BuildingDocumentNaming, NamingStrategy, NoDerivedName};
pub use notification::{build_recipients, ImportNotifier, ImportReport, LogNotifier};
pub use row_mapper::{HeaderLayout, RowMapper};
pub use row_source::{open_row_source, CsvRowSource, ExcelRowSource, RowSource};
