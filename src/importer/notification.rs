// ==========================================
// 表格数据批量导入 - 完成通知
// ==========================================
// 职责: 任务结束后汇总结果，交给通知渠道
// 收件人: 提交人邮箱 + 配置的 csv.mail.to
// 本模块不负责渲染与投递
// ==========================================

use crate::domain::import_job::ImportJob;
use crate::domain::import_log::{ImportLogEntry, ImportResultSummary};
use crate::domain::types::ImportStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// ==========================================
// ImportReport - 通知内容
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub job_id: String,
    pub title: String,
    pub source_name: String,
    pub parent_path: String,
    pub username: String,
    pub started_at: DateTime<Utc>,
    pub summary: ImportResultSummary,
    pub skipped_and_errors: Vec<ImportLogEntry>, // 非成功条目（按行序）
    pub recipients: Vec<String>,
}

impl ImportReport {
    pub fn from_job(job: &ImportJob, recipients: Vec<String>) -> Self {
        Self {
            job_id: job.id().to_string(),
            title: job.title(),
            source_name: job.source_name().to_string(),
            parent_path: job.parent_path().to_string(),
            username: job.username().to_string(),
            started_at: job.started_at(),
            summary: job.log().summary(),
            skipped_and_errors: job
                .log()
                .snapshot_by_status(&[ImportStatus::Skipped, ImportStatus::Error]),
            recipients,
        }
    }

    /// 邮件主题（当前语言）
    pub fn subject(&self) -> String {
        crate::i18n::t_with_args("csv_importer.mail_subject", &[("0", self.source_name.as_str())])
    }
}

/// 合并收件人（去空白、去重、保持顺序）
///
/// mail_to 可以是逗号分隔的多个地址
pub fn build_recipients(user_email: Option<&str>, mail_to: Option<&str>) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    let candidates = user_email
        .into_iter()
        .chain(mail_to.into_iter().flat_map(|m| m.split(',')));

    for address in candidates {
        let address = address.trim();
        if !address.is_empty() && !recipients.iter().any(|r| r == address) {
            recipients.push(address.to_string());
        }
    }
    recipients
}

// ==========================================
// ImportNotifier Trait
// ==========================================
#[async_trait]
pub trait ImportNotifier: Send + Sync {
    async fn notify(&self, report: &ImportReport) -> anyhow::Result<()>;
}

// ==========================================
// LogNotifier - 写入 tracing 日志
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ImportNotifier for LogNotifier {
    async fn notify(&self, report: &ImportReport) -> anyhow::Result<()> {
        let body = serde_json::to_string(report)?;
        info!(
            job_id = %report.job_id,
            recipients = ?report.recipients,
            subject = %report.subject(),
            body = %body,
            "导入结果通知"
        );
        Ok(())
    }
}
