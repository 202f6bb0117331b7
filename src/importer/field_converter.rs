// ==========================================
// 表格数据批量导入 - 字段值转换
// ==========================================
// 职责: 原始字符串单元格 → 按字段声明类型转换的 FieldValue
// 失败: 只影响当前行（返回 ImportIssue），不影响任务
// ==========================================

use crate::config::{ImporterConfig, ImporterOptions};
use crate::domain::document::{BlobRef, FieldValue};
use crate::domain::types::FieldType;
use crate::importer::error::{ImportError, ImportIssue, ImportResult};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

// ==========================================
// FieldConverter
// ==========================================
// 每个任务构造一次：日期格式、列表分隔正则、blob 根目录在任务内不变
#[derive(Debug, Clone)]
pub struct FieldConverter {
    date_format: String,
    list_separator: Regex,
    blobs_folder: Option<PathBuf>,
}

impl FieldConverter {
    /// 创建转换器（校验日期格式与分隔正则）
    pub fn new(
        date_format: &str,
        list_separator_regex: &str,
        blobs_folder: Option<PathBuf>,
    ) -> ImportResult<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ImportError::InvalidDateFormat(date_format.to_string()));
        }

        let list_separator =
            Regex::new(list_separator_regex).map_err(|e| ImportError::InvalidSeparator {
                pattern: list_separator_regex.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            date_format: date_format.to_string(),
            list_separator,
            blobs_folder,
        })
    }

    /// 由任务选项与部署配置构造
    pub fn from_options(options: &ImporterOptions, config: &ImporterConfig) -> ImportResult<Self> {
        Self::new(
            &options.date_format,
            &options.list_separator_regex,
            config.blobs_folder.clone(),
        )
    }

    /// 按声明类型转换单元格
    ///
    /// # 参数
    /// - label: 表头原文（用于错误消息）
    /// - raw: 已去空白、非空的单元格
    pub fn convert(
        &self,
        field_type: FieldType,
        label: &str,
        raw: &str,
    ) -> Result<FieldValue, ImportIssue> {
        let conversion_error = || ImportIssue::Conversion {
            field: label.to_string(),
            value: raw.to_string(),
        };

        match field_type {
            FieldType::Blob => self.resolve_blob(raw).map(FieldValue::Blob),
            FieldType::StringList => Ok(FieldValue::StringList(self.split_list(raw))),
            FieldType::ComplexList => Ok(FieldValue::ComplexList(self.split_list(raw))),
            FieldType::String => Ok(FieldValue::String(raw.to_string())),
            FieldType::Integer => raw
                .parse::<i32>()
                .map(FieldValue::Integer)
                .map_err(|_| conversion_error()),
            FieldType::Long => raw
                .parse::<i64>()
                .map(FieldValue::Long)
                .map_err(|_| conversion_error()),
            // NaN / inf 无法写入 JSON 属性列
            FieldType::Double => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Double)
                .ok_or_else(conversion_error),
            // 只接受字面量 true / false
            FieldType::Boolean => raw
                .parse::<bool>()
                .map(FieldValue::Boolean)
                .map_err(|_| conversion_error()),
            FieldType::Date => NaiveDate::parse_from_str(raw, &self.date_format)
                .map(FieldValue::Date)
                .map_err(|_| conversion_error()),
        }
    }

    fn split_list(&self, raw: &str) -> Vec<String> {
        self.list_separator.split(raw).map(str::to_string).collect()
    }

    /// 在 blob 根目录下按文件名解析
    pub fn resolve_blob(&self, filename: &str) -> Result<BlobRef, ImportIssue> {
        let missing = || ImportIssue::MissingFile(filename.to_string());

        let folder = self.blobs_folder.as_deref().ok_or_else(missing)?;
        if !is_plain_relative(filename) {
            return Err(missing());
        }

        let path = folder.join(filename);
        if !path.is_file() {
            return Err(missing());
        }

        Ok(BlobRef {
            filename: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(filename)
                .to_string(),
            path,
        })
    }

    /// 在 blob 根目录下找第一个（按文件名排序）以 prefix 开头的文件
    pub fn find_blob_by_prefix(&self, prefix: &str) -> Option<BlobRef> {
        let folder = self.blobs_folder.as_deref()?;
        let entries = match std::fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "blob 目录读取失败");
                return None;
            }
        };

        let mut candidates: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                name.starts_with(prefix).then(|| (name, entry.path()))
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .map(|(filename, path)| BlobRef { filename, path })
    }

    pub fn blobs_folder(&self) -> Option<&Path> {
        self.blobs_folder.as_deref()
    }
}

// 不允许绝对路径与 ..，文件必须位于根目录之下
fn is_plain_relative(filename: &str) -> bool {
    Path::new(filename)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
