// ==========================================
// 表格数据批量导入 - 领域模型层
// ==========================================
// 职责: 定义导入任务、文档、字段值、导入日志等领域实体
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod document;
pub mod import_job;
pub mod import_log;
pub mod types;

// 重导出核心类型
pub use document::{join_path, BlobRef, Document, DocumentRef, FieldValue, PropertyMap};
pub use import_job::{ImportJob, ImportJobId, JobState};
pub use import_log::{ImportLog, ImportLogEntry, ImportResultSummary};
pub use types::{FieldType, ImportStatus};
