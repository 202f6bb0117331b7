// ==========================================
// 表格数据批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层:
// - ImportError: 任务级（读流失败、事务失败、参数非法），向调用方传播
// - ImportIssue: 行级（类型/字段/转换/命名/写库），只落日志不传播
// ==========================================

use crate::domain::import_log::ImportLogEntry;
use crate::domain::types::ImportStatus;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 选项错误 =====
    #[error("列表分隔正则非法 ({pattern}): {message}")]
    InvalidSeparator { pattern: String, message: String },

    #[error("日期格式非法: {0}")]
    InvalidDateFormat(String),

    // ===== 文档库错误 =====
    #[error("文档库操作失败: {0}")]
    Store(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// ImportIssue - 行级问题
// ==========================================
// Display 即日志的可读消息；每个变体对应一个 i18n key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportIssue {
    // ===== 结构 =====
    #[error("No header line, empty file?")]
    EmptyFile,

    #[error("Empty line")]
    EmptyLine,

    #[error("Error while doing the import: {0}")]
    ImportAborted(String),

    #[error("Error while importing line: {0}")]
    LineFailed(String),

    // ===== 类型解析 =====
    #[error("Missing 'type' value")]
    MissingType,

    #[error("The type '{0}' does not exist")]
    UnknownType(String),

    // ===== 字段 =====
    #[error("Field '{field}' does not exist on type '{doc_type}'")]
    UnknownField { field: String, doc_type: String },

    #[error("Unable to convert field '{field}' with value '{value}'")]
    Conversion { field: String, value: String },

    #[error("The file '{0}' does not exist")]
    MissingFile(String),

    // ===== 命名 =====
    #[error("Missing 'name' value or incorrect parameter name")]
    MissingName,

    // ===== 写库 =====
    #[error("Document already exists")]
    AlreadyExists,

    #[error("Unable to create document: {0}")]
    CreateFailed(String),

    #[error("Unable to update document: {0}")]
    UpdateFailed(String),
}

impl ImportIssue {
    /// 日志状态（空行与已存在为 SKIPPED，其余为 ERROR）
    pub fn status(&self) -> ImportStatus {
        match self {
            ImportIssue::EmptyLine | ImportIssue::AlreadyExists => ImportStatus::Skipped,
            _ => ImportStatus::Error,
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ImportIssue::EmptyFile => "csv_importer.empty_file",
            ImportIssue::EmptyLine => "csv_importer.empty_line",
            ImportIssue::ImportAborted(_) => "csv_importer.error_during_import",
            ImportIssue::LineFailed(_) => "csv_importer.error_importing_line",
            ImportIssue::MissingType => "csv_importer.missing_type_value",
            ImportIssue::UnknownType(_) => "csv_importer.not_existing_type",
            ImportIssue::UnknownField { .. } => "csv_importer.not_existing_field",
            ImportIssue::Conversion { .. } => "csv_importer.cannot_convert_field_value",
            ImportIssue::MissingFile(_) => "csv_importer.not_existing_file",
            ImportIssue::MissingName => "csv_importer.missing_name_value",
            ImportIssue::AlreadyExists => "csv_importer.document_already_exists",
            ImportIssue::CreateFailed(_) => "csv_importer.unable_to_create",
            ImportIssue::UpdateFailed(_) => "csv_importer.unable_to_update",
        }
    }

    /// 消息参数（按位置）
    pub fn params(&self) -> Vec<String> {
        match self {
            ImportIssue::ImportAborted(msg)
            | ImportIssue::LineFailed(msg)
            | ImportIssue::UnknownType(msg)
            | ImportIssue::MissingFile(msg)
            | ImportIssue::CreateFailed(msg)
            | ImportIssue::UpdateFailed(msg) => vec![msg.clone()],
            ImportIssue::UnknownField { field, doc_type } => vec![field.clone(), doc_type.clone()],
            ImportIssue::Conversion { field, value } => vec![field.clone(), value.clone()],
            _ => Vec::new(),
        }
    }

    /// 转为日志条目
    pub fn into_log_entry(self, line: u64) -> ImportLogEntry {
        ImportLogEntry::new(
            line,
            self.status(),
            self.to_string(),
            self.message_key(),
            self.params(),
        )
    }
}
