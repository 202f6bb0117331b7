// ==========================================
// 表格数据批量导入 - 任务级选项
// ==========================================
// 每次提交导入时指定；提交后不可变
// ==========================================

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";
pub const DEFAULT_LIST_SEPARATOR_REGEX: &str = r"\|";

// ==========================================
// DocumentFactoryKind - 文档工厂策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentFactoryKind {
    /// 按目标路径判断是否存在
    #[default]
    Default,
    /// 按父路径下同类型、同键属性值去重
    PropertyMatch { key_property: String },
}

// ==========================================
// ImporterOptions
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterOptions {
    pub batch_size: usize,             // 每提交一次事务的成功行数
    pub date_format: String,           // chrono strftime 格式
    pub list_separator_regex: String,  // 列表分隔正则
    pub update_existing: bool,         // 已存在时是否更新
    pub send_email: bool,              // 完成后是否通知
    pub document_factory: DocumentFactoryKind,
}

impl Default for ImporterOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            list_separator_regex: DEFAULT_LIST_SEPARATOR_REGEX.to_string(),
            update_existing: true,
            send_email: true,
            document_factory: DocumentFactoryKind::Default,
        }
    }
}

impl ImporterOptions {
    pub fn builder() -> ImporterOptionsBuilder {
        ImporterOptionsBuilder::default()
    }

    /// 生效的批次大小（0 视为 1）
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

// ==========================================
// ImporterOptionsBuilder
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ImporterOptionsBuilder {
    options: ImporterOptions,
}

impl ImporterOptionsBuilder {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.options.batch_size = batch_size.max(1);
        self
    }

    pub fn date_format(mut self, date_format: impl Into<String>) -> Self {
        self.options.date_format = date_format.into();
        self
    }

    pub fn list_separator_regex(mut self, regex: impl Into<String>) -> Self {
        self.options.list_separator_regex = regex.into();
        self
    }

    pub fn update_existing(mut self, update_existing: bool) -> Self {
        self.options.update_existing = update_existing;
        self
    }

    pub fn send_email(mut self, send_email: bool) -> Self {
        self.options.send_email = send_email;
        self
    }

    pub fn document_factory(mut self, kind: DocumentFactoryKind) -> Self {
        self.options.document_factory = kind;
        self
    }

    pub fn build(self) -> ImporterOptions {
        self.options
    }
}
