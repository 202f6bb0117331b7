// ==========================================
// 表格数据批量导入 - 导入任务
// ==========================================
// 职责: 一次文件提交对应一个任务；任务拥有自己的导入日志
// 标识: 仓库名 + 目标父路径 + 源文件名 + 开始时间
// ==========================================

use crate::config::ImporterOptions;
use crate::domain::import_log::ImportLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

// ==========================================
// ImportJobId - 任务标识
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportJobId(String);

impl ImportJobId {
    /// 由任务要素派生标识
    pub fn create(
        repository: &str,
        parent_path: &str,
        source_name: &str,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self(format!(
            "{}:{}:{}:{}",
            repository,
            parent_path,
            source_name,
            started_at.timestamp_millis()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImportJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// JobState - 任务状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Scheduled, // 已提交，等待执行
    Running,   // 执行中
    Completed, // 正常结束（含行级错误）
    Failed,    // 任务级失败（读流失败/事务失败）
}

// ==========================================
// ImportJob - 导入任务
// ==========================================
#[derive(Debug)]
pub struct ImportJob {
    id: ImportJobId,
    repository: String,
    parent_path: String,
    username: String,
    source_path: PathBuf,
    source_name: String,
    started_at: DateTime<Utc>,
    options: ImporterOptions,
    log: ImportLog,
    state: Mutex<JobState>,
}

impl ImportJob {
    pub fn new(
        repository: &str,
        parent_path: &str,
        username: &str,
        source_path: &Path,
        options: ImporterOptions,
    ) -> Self {
        let started_at = Utc::now();
        let source_name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let id = ImportJobId::create(repository, parent_path, &source_name, started_at);

        Self {
            id,
            repository: repository.to_string(),
            parent_path: parent_path.to_string(),
            username: username.to_string(),
            source_path: source_path.to_path_buf(),
            source_name,
            started_at,
            options,
            log: ImportLog::new(),
            state: Mutex::new(JobState::Scheduled),
        }
    }

    pub fn id(&self) -> &ImportJobId {
        &self.id
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn options(&self) -> &ImporterOptions {
        &self.options
    }

    pub fn log(&self) -> &ImportLog {
        &self.log
    }

    /// 任务标题
    pub fn title(&self) -> String {
        format!("CSV import in '{}'", self.parent_path)
    }

    pub fn state(&self) -> JobState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, state: JobState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}
