// ==========================================
// 表格数据批量导入 - 导入日志
// ==========================================
// 职责: 每行终态记录（追加写、保持行序）
// 红线: 日志只追加，不修改、不删除
// 红线: 只有导入引擎写入；外部只读快照
// ==========================================

use crate::domain::types::ImportStatus;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

// ==========================================
// ImportLogEntry - 单行导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLogEntry {
    pub line: u64,                 // 数据行号（1 起，表头不计；0 表示任务级）
    pub status: ImportStatus,      // 终态
    pub message: String,           // 可读消息（英文）
    pub localized_message: String, // 国际化 key
    pub params: Vec<String>,       // 消息参数（按位置）
}

impl ImportLogEntry {
    pub fn new(
        line: u64,
        status: ImportStatus,
        message: impl Into<String>,
        localized_message: impl Into<String>,
        params: Vec<String>,
    ) -> Self {
        Self {
            line,
            status,
            message: message.into(),
            localized_message: localized_message.into(),
            params,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ImportStatus::Error
    }

    /// 按当前语言渲染消息
    pub fn localized(&self) -> String {
        let names: Vec<String> = (0..self.params.len()).map(|i| i.to_string()).collect();
        let args: Vec<(&str, &str)> = names
            .iter()
            .zip(self.params.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        crate::i18n::t_with_args(&self.localized_message, &args)
    }
}

// ==========================================
// ImportResultSummary - 按状态汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResultSummary {
    pub total: usize,   // 日志条数
    pub success: usize, // 成功（创建/更新）
    pub skipped: usize, // 跳过
    pub error: usize,   // 错误
}

impl ImportResultSummary {
    pub fn from_entries(entries: &[ImportLogEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match entry.status {
                ImportStatus::Success => summary.success += 1,
                ImportStatus::Skipped => summary.skipped += 1,
                ImportStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

// ==========================================
// ImportLog - 任务拥有的日志序列
// ==========================================
#[derive(Debug, Default)]
pub struct ImportLog {
    entries: RwLock<Vec<ImportLogEntry>>,
}

impl ImportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&self, entry: ImportLogEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// 当前时刻的日志快照
    pub fn snapshot(&self) -> Vec<ImportLogEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 按状态过滤的快照（空过滤条件 = 全部）
    pub fn snapshot_by_status(&self, statuses: &[ImportStatus]) -> Vec<ImportLogEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .filter(|e| statuses.is_empty() || statuses.contains(&e.status))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> ImportResultSummary {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        ImportResultSummary::from_entries(&entries)
    }
}
