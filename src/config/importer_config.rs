// ==========================================
// 表格数据批量导入 - 部署级配置
// ==========================================
// 显式注入导入引擎；取代进程级全局属性查询
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 未提供 type 列时使用的文档类型
pub const DEFAULT_DOCUMENT_TYPE: &str = "File";

/// 默认仓库名
pub const DEFAULT_REPOSITORY_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterConfig {
    pub repository_name: String,         // 仓库名（参与任务标识）
    pub blobs_folder: Option<PathBuf>,   // blob 根目录
    pub mail_to: Option<String>,         // 额外通知收件人
    pub default_document_type: String,   // 缺少 type 列时的默认类型
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            repository_name: DEFAULT_REPOSITORY_NAME.to_string(),
            blobs_folder: None,
            mail_to: None,
            default_document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
        }
    }
}

impl ImporterConfig {
    pub fn with_blobs_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.blobs_folder = Some(folder.into());
        self
    }

    pub fn with_default_document_type(mut self, doc_type: impl Into<String>) -> Self {
        self.default_document_type = doc_type.into();
        self
    }

    pub fn with_mail_to(mut self, mail_to: impl Into<String>) -> Self {
        self.mail_to = Some(mail_to.into());
        self
    }
}
