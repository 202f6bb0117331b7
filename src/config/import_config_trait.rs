// ==========================================
// 表格数据批量导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 配置在构造导入引擎前一次性读出，引擎内不做临时查询
// ==========================================

use crate::config::importer_config::ImporterConfig;
use std::error::Error;

// ==========================================
// ImporterConfigReader Trait
// ==========================================
// 用途: 读取部署级导入配置
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImporterConfigReader: Send + Sync {
    /// 读取完整导入配置（缺失项使用默认值）
    ///
    /// # 返回
    /// - Ok(ImporterConfig): 合并默认值后的配置
    /// - Err: 数据库读取错误
    fn read_importer_config(&self) -> Result<ImporterConfig, Box<dyn Error>>;
}
