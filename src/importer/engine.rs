// ==========================================
// 表格数据批量导入 - 导入引擎
// ==========================================
// 职责: 读表头 → 逐行处理 → 创建/更新 → 写日志 → 批次提交
// 流程: 类型解析 → 属性映射 → 名称确定 → 存在判断 → 创建/更新
// 红线: 行级问题只写日志、不中断任务；每个非空行恰好一条日志
// 红线: 只有读流失败与事务失败会终止任务
// ==========================================

use crate::config::ImporterConfig;
use crate::domain::document::{join_path, DocumentRef, PropertyMap};
use crate::domain::import_job::{ImportJob, JobState};
use crate::domain::import_log::{ImportLogEntry, ImportResultSummary};
use crate::domain::types::ImportStatus;
use crate::importer::batch::BatchCoordinator;
use crate::importer::error::{ImportIssue, ImportResult};
use crate::importer::field_converter::FieldConverter;
use crate::importer::naming::{BuildingDocumentNaming, NamingStrategy};
use crate::importer::row_mapper::RowMapper;
use crate::importer::row_source::{open_row_source, RowSource};
use crate::repository::{factory_for, root_cause_message, DocumentFactory, DocumentStore};
use crate::schema::SchemaCatalog;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// 行的成功终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOutcome {
    Created,
    Updated,
}

impl LineOutcome {
    fn into_log_entry(self, line: u64) -> ImportLogEntry {
        match self {
            LineOutcome::Created => ImportLogEntry::new(
                line,
                ImportStatus::Success,
                "Document created",
                "csv_importer.document_created",
                Vec::new(),
            ),
            LineOutcome::Updated => ImportLogEntry::new(
                line,
                ImportStatus::Success,
                "Document updated",
                "csv_importer.document_updated",
                Vec::new(),
            ),
        }
    }
}

// ==========================================
// ImportEngine
// ==========================================
pub struct ImportEngine<S: DocumentStore> {
    // 文档库
    store: S,

    // 文档类型目录
    catalog: Arc<dyn SchemaCatalog>,

    // 部署级配置
    config: ImporterConfig,

    // 名称派生策略（无 name 列时使用）
    naming: Arc<dyn NamingStrategy>,

    // 覆盖任务选项中的工厂策略
    factory: Option<Arc<dyn DocumentFactory>>,
}

impl<S: DocumentStore> ImportEngine<S> {
    /// 创建引擎
    ///
    /// # 参数
    /// - store: 文档库
    /// - catalog: 文档类型目录
    /// - config: 部署级配置（blob 目录、默认类型）
    pub fn new(store: S, catalog: Arc<dyn SchemaCatalog>, config: ImporterConfig) -> Self {
        Self {
            store,
            catalog,
            config,
            naming: Arc::new(BuildingDocumentNaming::default()),
            factory: None,
        }
    }

    pub fn with_naming_strategy(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_document_factory(mut self, factory: Arc<dyn DocumentFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// 打开任务的源文件并执行导入
    ///
    /// 源文件打不开时记一条第 0 行错误，任务失败
    pub fn run_job(&self, job: &ImportJob) -> ImportResult<ImportResultSummary> {
        match open_row_source(job.source_path()) {
            Ok(mut source) => self.run(job, source.as_mut()),
            Err(e) => {
                error!(job_id = %job.id(), error = %e, "源文件打开失败");
                job.log()
                    .append(ImportIssue::ImportAborted(e.to_string()).into_log_entry(0));
                job.set_state(JobState::Failed);
                Err(e)
            }
        }
    }

    /// 执行导入
    ///
    /// # 返回
    /// - Ok: 正常结束（可能含行级错误），附各状态计数
    /// - Err: 任务级失败（读流/事务），已处理的批次已提交
    #[instrument(skip(self, job, source), fields(job_id = %job.id(), source = %source.source_name()))]
    pub fn run(
        &self,
        job: &ImportJob,
        source: &mut dyn RowSource,
    ) -> ImportResult<ImportResultSummary> {
        job.set_state(JobState::Running);
        info!(parent_path = %job.parent_path(), username = %job.username(), "开始导入");

        match self.execute(job, source) {
            Ok(()) => {
                job.set_state(JobState::Completed);
                let summary = job.log().summary();
                info!(
                    total = summary.total,
                    success = summary.success,
                    skipped = summary.skipped,
                    error = summary.error,
                    "导入完成"
                );
                Ok(summary)
            }
            Err(e) => {
                job.set_state(JobState::Failed);
                error!(error = %e, "导入任务失败");
                Err(e)
            }
        }
    }

    fn execute(&self, job: &ImportJob, source: &mut dyn RowSource) -> ImportResult<()> {
        let options = job.options();
        let log = job.log();

        // 步骤 1: 任务级选项
        let converter = match FieldConverter::from_options(options, &self.config) {
            Ok(converter) => converter,
            Err(e) => {
                log.append(ImportIssue::ImportAborted(e.to_string()).into_log_entry(0));
                return Err(e);
            }
        };
        let factory = self
            .factory
            .clone()
            .unwrap_or_else(|| factory_for(&options.document_factory));

        // 步骤 2: 表头
        let header = match source.next_row() {
            Ok(Some(header)) => header,
            Ok(None) => {
                warn!("没有表头，空文件");
                log.append(ImportIssue::EmptyFile.into_log_entry(0));
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, "读取表头失败");
                log.append(ImportIssue::ImportAborted(e.to_string()).into_log_entry(0));
                return Err(e);
            }
        };
        let mapper = RowMapper::new(header, converter);
        debug!(layout = ?mapper.layout(), columns = mapper.header().len(), "表头解析完成");

        // 步骤 3: 逐行处理
        let mut batch = BatchCoordinator::begin(&self.store, options.effective_batch_size())?;
        let mut line: u64 = 0;
        loop {
            line += 1;
            let row = match source.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => {
                    error!(line, error = %e, "读取数据源失败，导入中止");
                    log.append(ImportIssue::ImportAborted(e.to_string()).into_log_entry(line));
                    batch.finish()?;
                    return Err(e);
                }
            };

            if is_empty_row(&row) {
                debug!(line, "空行");
                log.append(ImportIssue::EmptyLine.into_log_entry(line));
                continue;
            }

            match self.import_line(job, &mapper, factory.as_ref(), &row) {
                Ok(outcome) => {
                    debug!(line, outcome = ?outcome, "行导入成功");
                    log.append(outcome.into_log_entry(line));
                    batch.record_success()?;
                }
                Err(issue) => {
                    if issue.status() == ImportStatus::Error {
                        error!(line, message = %issue, "行导入失败");
                    } else {
                        debug!(line, message = %issue, "行已跳过");
                    }
                    log.append(issue.into_log_entry(line));
                }
            }
        }

        // 步骤 4: 提交最后一个窗口
        batch.finish()?;
        Ok(())
    }

    // 单行: 类型 → 属性 → 名称 → 创建/更新
    fn import_line(
        &self,
        job: &ImportJob,
        mapper: &RowMapper,
        factory: &dyn DocumentFactory,
        row: &[String],
    ) -> Result<LineOutcome, ImportIssue> {
        let type_name = mapper
            .type_cell(row)
            .unwrap_or(self.config.default_document_type.as_str());
        if type_name.trim().is_empty() {
            return Err(ImportIssue::MissingType);
        }
        let doc_type = self
            .catalog
            .document_type(type_name)
            .ok_or_else(|| ImportIssue::UnknownType(type_name.to_string()))?;

        let mut properties = mapper.compute_properties(doc_type, row)?;

        let name = match mapper.name_cell(row) {
            Some(name) => name.to_string(),
            None => {
                let derived = self
                    .naming
                    .derive_name(&properties)
                    .ok_or(ImportIssue::MissingName)?;
                if mapper.auto_import_requested(row) {
                    mapper.attach_auto_import(&derived, &mut properties)?;
                }
                derived
            }
        };
        if name.trim().is_empty() {
            return Err(ImportIssue::MissingName);
        }

        self.create_or_update(job, factory, &name, doc_type.name(), &properties)
    }

    fn create_or_update(
        &self,
        job: &ImportJob,
        factory: &dyn DocumentFactory,
        name: &str,
        type_name: &str,
        properties: &PropertyMap,
    ) -> Result<LineOutcome, ImportIssue> {
        let store: &dyn DocumentStore = &self.store;
        let parent_path = job.parent_path();

        let exists = factory
            .exists(store, parent_path, name, type_name, properties)
            .map_err(|e| ImportIssue::LineFailed(root_cause_message(&e)))?;

        if !exists {
            factory
                .create_document(store, parent_path, name, type_name, properties)
                .map_err(|e| ImportIssue::CreateFailed(root_cause_message(&e)))?;
            return Ok(LineOutcome::Created);
        }

        if !job.options().update_existing {
            return Err(ImportIssue::AlreadyExists);
        }

        let doc_ref = DocumentRef::new(join_path(parent_path, name));
        factory
            .update_document(store, &doc_ref, properties)
            .map_err(|e| ImportIssue::UpdateFailed(root_cause_message(&e)))?;
        Ok(LineOutcome::Updated)
    }
}

// 零单元格，或空白物理行产生的单个空单元格
fn is_empty_row(row: &[String]) -> bool {
    match row {
        [] => true,
        [only] => only.trim().is_empty(),
        _ => false,
    }
}
