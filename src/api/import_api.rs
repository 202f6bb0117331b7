// ==========================================
// 表格数据批量导入 - 导入API
// ==========================================
// 职责: 提交导入任务、后台执行、查询日志、完成通知
// 并发: 每个任务一个 blocking 线程 + 独立 SQLite 连接；任务之间互不共享状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImporterConfig, ImporterConfigReader, ImporterOptions};
use crate::domain::import_job::{ImportJob, ImportJobId, JobState};
use crate::domain::import_log::{ImportLogEntry, ImportResultSummary};
use crate::domain::types::ImportStatus;
use crate::importer::error::{ImportError, ImportIssue, ImportResult};
use crate::importer::{
    build_recipients, BuildingDocumentNaming, ImportEngine, ImportNotifier, ImportReport,
    LogNotifier, NamingStrategy,
};
use crate::repository::SqliteDocumentStore;
use crate::schema::SchemaCatalog;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 提交人
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportUser {
    pub username: String,
    pub email: Option<String>,
}

impl ImportUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// 任务执行所需的共享依赖
#[derive(Clone)]
struct JobContext {
    db_path: String,
    config: ImporterConfig,
    catalog: Arc<dyn SchemaCatalog>,
    naming: Arc<dyn NamingStrategy>,
}

impl JobContext {
    // 在当前线程执行一个任务（打开独立连接）
    fn run(&self, job: &ImportJob) -> ImportResult<ImportResultSummary> {
        let store = match SqliteDocumentStore::new(&self.db_path) {
            Ok(store) => store,
            Err(e) => {
                error!(job_id = %job.id(), error = %e, "文档库打开失败");
                job.log()
                    .append(ImportIssue::ImportAborted(e.to_string()).into_log_entry(0));
                job.set_state(JobState::Failed);
                return Err(ImportError::Store(e));
            }
        };

        ImportEngine::new(store, self.catalog.clone(), self.config.clone())
            .with_naming_strategy(self.naming.clone())
            .run_job(job)
    }
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    context: JobContext,
    notifier: Arc<dyn ImportNotifier>,
    jobs: Mutex<HashMap<ImportJobId, Arc<ImportJob>>>,
    tasks: Mutex<HashMap<ImportJobId, JoinHandle<()>>>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - db_path: 文档库 SQLite 路径（每个任务各自打开连接）
    /// - config: 部署级配置
    /// - catalog: 文档类型目录
    pub fn new(db_path: String, config: ImporterConfig, catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            context: JobContext {
                db_path,
                config,
                catalog,
                naming: Arc::new(BuildingDocumentNaming::default()),
            },
            notifier: Arc::new(LogNotifier),
            jobs: Mutex::new(HashMap::new()),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// 从 config_kv 表读取部署配置后创建
    pub fn from_config_manager(db_path: String, catalog: Arc<dyn SchemaCatalog>) -> ApiResult<Self> {
        let config = ConfigManager::new(&db_path)
            .and_then(|manager| manager.read_importer_config())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(Self::new(db_path, config, catalog))
    }

    pub fn with_naming_strategy(mut self, naming: Arc<dyn NamingStrategy>) -> Self {
        self.context.naming = naming;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ImportNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.context.config
    }

    fn lock_jobs(&self) -> ApiResult<MutexGuard<'_, HashMap<ImportJobId, Arc<ImportJob>>>> {
        self.jobs
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))
    }

    fn lock_tasks(&self) -> ApiResult<MutexGuard<'_, HashMap<ImportJobId, JoinHandle<()>>>> {
        self.tasks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))
    }

    // 创建任务并登记
    fn register_job(
        &self,
        parent_path: &str,
        source_path: &Path,
        user: &ImportUser,
        options: ImporterOptions,
    ) -> ApiResult<Arc<ImportJob>> {
        if !parent_path.starts_with('/') {
            return Err(ApiError::InvalidInput(format!(
                "目标父路径必须以 / 开头: {}",
                parent_path
            )));
        }
        if user.username.trim().is_empty() {
            return Err(ApiError::InvalidInput("用户名为空".to_string()));
        }

        let job = Arc::new(ImportJob::new(
            &self.context.config.repository_name,
            parent_path,
            &user.username,
            source_path,
            options,
        ));

        let mut jobs = self.lock_jobs()?;
        if jobs.contains_key(job.id()) {
            return Err(ApiError::DuplicateJob(job.id().to_string()));
        }
        jobs.insert(job.id().clone(), job.clone());
        Ok(job)
    }

    fn job(&self, id: &ImportJobId) -> ApiResult<Arc<ImportJob>> {
        self.lock_jobs()?
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("导入任务 {}", id)))
    }

    /// 提交导入任务（后台执行）
    ///
    /// # 参数
    /// - parent_path: 目标父路径
    /// - source_path: CSV / Excel 文件
    /// - user: 提交人（邮箱用于完成通知）
    /// - options: 任务级选项
    ///
    /// # 返回
    /// - Ok(ImportJobId): 任务标识，用于查询日志
    pub async fn launch_import(
        &self,
        parent_path: &str,
        source_path: &Path,
        user: &ImportUser,
        options: ImporterOptions,
    ) -> ApiResult<ImportJobId> {
        let job = self.register_job(parent_path, source_path, user, options)?;
        let job_id = job.id().clone();
        info!(job_id = %job_id, "导入任务已提交");

        let context = self.context.clone();
        let notifier = self.notifier.clone();
        let recipients = build_recipients(
            user.email.as_deref(),
            self.context.config.mail_to.as_deref(),
        );

        let handle = tokio::spawn(async move {
            let worker_job = job.clone();
            let result =
                tokio::task::spawn_blocking(move || context.run(&worker_job)).await;

            match result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(job_id = %job.id(), error = %e, "导入任务失败"),
                Err(e) => {
                    error!(job_id = %job.id(), error = %e, "导入线程异常退出");
                    job.set_state(JobState::Failed);
                }
            }

            if !job.options().send_email {
                return;
            }
            if recipients.is_empty() {
                info!(job_id = %job.id(), "未配置收件人，跳过结果通知");
                return;
            }
            let report = ImportReport::from_job(&job, recipients);
            if let Err(e) = notifier.notify(&report).await {
                warn!(job_id = %job.id(), error = %e, "结果通知发送失败");
            }
        });

        self.lock_tasks()?.insert(job_id.clone(), handle);
        Ok(job_id)
    }

    /// 等待任务结束
    pub async fn await_completion(&self, id: &ImportJobId) -> ApiResult<ImportResultSummary> {
        let job = self.job(id)?;
        let handle = self.lock_tasks()?.remove(id);
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| ApiError::InternalError(format!("导入任务异常: {}", e)))?;
        }
        Ok(job.log().summary())
    }

    /// 等待全部已提交任务结束
    pub async fn await_all(&self) -> ApiResult<Vec<ImportJobId>> {
        let handles: Vec<(ImportJobId, JoinHandle<()>)> = self.lock_tasks()?.drain().collect();
        let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();

        for result in join_all(handles).await {
            result.map_err(|e| ApiError::InternalError(format!("导入任务异常: {}", e)))?;
        }
        Ok(ids)
    }

    /// 同步执行导入（在当前线程，不发送通知）
    ///
    /// 任务级失败不作为 Err 返回，通过 job_state / 日志查询
    pub fn import_blocking(
        &self,
        parent_path: &str,
        source_path: &Path,
        user: &ImportUser,
        options: ImporterOptions,
    ) -> ApiResult<ImportJobId> {
        let job = self.register_job(parent_path, source_path, user, options)?;
        if let Err(e) = self.context.run(&job) {
            warn!(job_id = %job.id(), error = %e, "导入任务失败");
        }
        Ok(job.id().clone())
    }

    /// 任务的全部日志（按行序）
    pub fn get_import_logs(&self, id: &ImportJobId) -> ApiResult<Vec<ImportLogEntry>> {
        Ok(self.job(id)?.log().snapshot())
    }

    /// 按状态过滤的日志（空过滤条件 = 全部）
    pub fn get_import_logs_by_status(
        &self,
        id: &ImportJobId,
        statuses: &[ImportStatus],
    ) -> ApiResult<Vec<ImportLogEntry>> {
        Ok(self.job(id)?.log().snapshot_by_status(statuses))
    }

    /// 各状态计数
    pub fn get_import_result(&self, id: &ImportJobId) -> ApiResult<ImportResultSummary> {
        Ok(self.job(id)?.log().summary())
    }

    pub fn job_state(&self, id: &ImportJobId) -> ApiResult<JobState> {
        Ok(self.job(id)?.state())
    }

    /// 移除已结束任务及其日志
    ///
    /// 仍在排队或执行中的任务不能移除
    pub fn forget_job(&self, id: &ImportJobId) -> ApiResult<()> {
        {
            let mut jobs = self.lock_jobs()?;
            let state = jobs
                .get(id)
                .map(|job| job.state())
                .ok_or_else(|| ApiError::NotFound(format!("导入任务 {}", id)))?;
            if matches!(state, JobState::Scheduled | JobState::Running) {
                return Err(ApiError::InvalidInput(format!("导入任务仍在执行: {}", id)));
            }
            jobs.remove(id);
        }
        self.lock_tasks()?.remove(id);
        debug!(job_id = %id, "导入任务已移除");
        Ok(())
    }

    /// 已登记的任务标识
    pub fn job_ids(&self) -> ApiResult<Vec<ImportJobId>> {
        let mut ids: Vec<ImportJobId> = self.lock_jobs()?.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}
