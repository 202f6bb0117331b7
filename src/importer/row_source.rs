// ==========================================
// 表格数据批量导入 - 行数据源
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls/.xlsm/.ods 第一个工作表)
// 约定: 第一行是表头，由引擎解释；数据源只产出原始单元格
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::path::Path;

// ==========================================
// RowSource Trait
// ==========================================
// 按文件顺序逐行读取；Ok(None) 表示读完
pub trait RowSource {
    fn next_row(&mut self) -> ImportResult<Option<Vec<String>>>;

    /// 源名称（用于日志）
    fn source_name(&self) -> &str;
}

// ==========================================
// CSV 数据源
// ==========================================
// csv::Reader 会吞掉空的物理行；先按引号状态把物理行分类，
// 空行原样产出为零单元格行，保证行号与输入顺序一致
pub struct CsvRowSource {
    name: String,
    reader: csv::Reader<Cursor<Vec<u8>>>,
    record: StringRecord,
    lines: VecDeque<LineKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Record,
}

impl CsvRowSource {
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::from_reader(file_name_of(path), file)
    }

    pub fn from_reader<R: Read>(name: impl Into<String>, mut reader: R) -> ImportResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let lines = classify_lines(&data);

        let reader = ReaderBuilder::new()
            .has_headers(false) // 表头由引擎处理
            .flexible(true) // 允许行长度不一致
            .from_reader(Cursor::new(data));

        Ok(Self {
            name: name.into(),
            reader,
            record: StringRecord::new(),
            lines,
        })
    }

    fn read_record(&mut self) -> ImportResult<Option<Vec<String>>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    FieldStart,
    InField,
    InQuoted,
    QuoteInQuoted,
}

// 物理行分类（与 csv 默认方言一致: 逗号分隔、双引号转义）
// - 引号外的空行 → Blank
// - 引号外开始的非空行 → Record；引号内的续行不单独计数
// - 表头之前的空行丢弃
fn classify_lines(data: &[u8]) -> VecDeque<LineKind> {
    let mut lines = VecDeque::new();
    let mut state = ScanState::FieldStart;
    let mut at_line_start = true;

    for &b in data {
        if state == ScanState::InQuoted {
            if b == b'"' {
                state = ScanState::QuoteInQuoted;
            }
            continue;
        }

        match b {
            b'\r' => {}
            b'\n' => {
                if at_line_start {
                    lines.push_back(LineKind::Blank);
                }
                state = ScanState::FieldStart;
                at_line_start = true;
            }
            _ => {
                if at_line_start {
                    lines.push_back(LineKind::Record);
                    at_line_start = false;
                }
                state = match (state, b) {
                    (_, b',') => ScanState::FieldStart,
                    (ScanState::FieldStart, b'"') | (ScanState::QuoteInQuoted, b'"') => {
                        ScanState::InQuoted
                    }
                    _ => ScanState::InField,
                };
            }
        }
    }

    while lines.front() == Some(&LineKind::Blank) {
        lines.pop_front();
    }
    lines
}

impl RowSource for CsvRowSource {
    fn next_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        match self.lines.pop_front() {
            Some(LineKind::Blank) => Ok(Some(Vec::new())),
            Some(LineKind::Record) | None => self.read_record(),
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

// ==========================================
// Excel 数据源
// ==========================================
// 整个工作表一次性读入，之后逐行产出
pub struct ExcelRowSource {
    name: String,
    rows: std::vec::IntoIter<Vec<String>>,
}

impl ExcelRowSource {
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        Ok(Self {
            name: file_name_of(path),
            rows: range_to_rows(&range).into_iter(),
        })
    }
}

fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            // 去掉行尾空单元格
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            cells
        })
        .collect()
}

impl RowSource for ExcelRowSource {
    fn next_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        Ok(self.rows.next())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

// ==========================================
// 按扩展名选择数据源
// ==========================================
pub fn open_row_source(path: &Path) -> ImportResult<Box<dyn RowSource + Send>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvRowSource::from_path(path)?)),
        "xlsx" | "xls" | "xlsm" | "ods" => Ok(Box::new(ExcelRowSource::from_path(path)?)),
        _ => Err(ImportError::UnsupportedFormat(ext)),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
