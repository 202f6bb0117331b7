// ==========================================
// 表格数据批量导入 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入状态 (Import Status)
// ==========================================
// 每一行的终态: 成功 / 跳过 / 错误
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Success, // 已创建或已更新
    Skipped, // 空行 / 文档已存在
    Error,   // 行级错误
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "SUCCESS",
            ImportStatus::Skipped => "SKIPPED",
            ImportStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 字段类型 (Field Type)
// ==========================================
// 闭合枚举: 每个变体对应一种转换函数
// 序列化格式: snake_case（与 schema JSON 一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Long,
    Double,
    Boolean,
    Date,
    StringList,  // 基础类型列表
    ComplexList, // 复杂类型列表（元素保持字符串）
    Blob,        // 二进制内容引用
}

impl FieldType {
    /// 是否为列表类型
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::StringList | FieldType::ComplexList)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::StringList => "string_list",
            FieldType::ComplexList => "complex_list",
            FieldType::Blob => "blob",
        };
        f.write_str(name)
    }
}
