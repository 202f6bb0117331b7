// ==========================================
// 表格数据批量导入 - 命令行入口
// ==========================================
// 用法:
//   csv-doc-importer <source_path> [parent_path] [schema_json] [options_json]
//
// - source_path: CSV / Excel 文件
// - parent_path: 目标父路径（默认 /）
// - schema_json: 文档类型定义（默认内置 File / Note / Folder）
// - options_json: ImporterOptions JSON（默认值见 ImporterOptions::default）
// 数据库: 环境变量 CSV_IMPORTER_DB_PATH 或用户数据目录
// 输出: 导入日志（JSON）写 stdout
// ==========================================

use csv_doc_importer::api::{ImportApi, ImportUser};
use csv_doc_importer::config::ImporterOptions;
use csv_doc_importer::db::get_default_db_path;
use csv_doc_importer::domain::JobState;
use csv_doc_importer::schema::StaticSchemaCatalog;
use csv_doc_importer::{logging, SchemaCatalog};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let source_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("用法: csv-doc-importer <source_path> [parent_path] [schema_json] [options_json]")?;
    let parent_path = args.next().unwrap_or_else(|| "/".to_string());

    let catalog: Arc<dyn SchemaCatalog> = match args.next() {
        Some(schema_path) => Arc::new(StaticSchemaCatalog::from_json_file(Path::new(&schema_path))?),
        None => Arc::new(StaticSchemaCatalog::with_core_types()),
    };

    let options: ImporterOptions = match args.next() {
        Some(options_path) => serde_json::from_str(&std::fs::read_to_string(options_path)?)?,
        None => ImporterOptions::default(),
    };

    let db_path = get_default_db_path();
    tracing::info!("==================================================");
    tracing::info!("{} v{}", csv_doc_importer::APP_NAME, csv_doc_importer::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let api = ImportApi::from_config_manager(db_path, catalog)?;
    let username = std::env::var("USER").unwrap_or_else(|_| "Administrator".to_string());
    let user = ImportUser::new(username);

    let job_id = api
        .launch_import(&parent_path, &source_path, &user, options)
        .await?;
    let summary = api.await_completion(&job_id).await?;

    let logs = api.get_import_logs(&job_id)?;
    println!("{}", serde_json::to_string_pretty(&logs)?);

    tracing::info!(
        total = summary.total,
        success = summary.success,
        skipped = summary.skipped,
        error = summary.error,
        "导入结束"
    );

    if api.job_state(&job_id)? == JobState::Failed {
        return Err(format!("导入任务失败: {}", job_id).into());
    }
    Ok(())
}
