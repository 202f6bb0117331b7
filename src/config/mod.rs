// ==========================================
// 表格数据批量导入 - 配置层
// ==========================================
// 职责: 部署级配置（blob 目录/邮件/默认类型）+ 任务级选项
// 存储: config_kv 表（scope_id = 'global'）
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod importer_config;
pub mod importer_options;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImporterConfigReader;
pub use importer_config::ImporterConfig;
pub use importer_options::{DocumentFactoryKind, ImporterOptions, ImporterOptionsBuilder};
