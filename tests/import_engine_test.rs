// ==========================================
// 表格数据批量导入 - 导入引擎集成测试
// ==========================================
// 覆盖: 行级日志、类型/字段/转换错误、名称派生、自动导入、
//       创建/更新/跳过、批次提交边界、读流失败
// ==========================================


use csv_doc_importer::config::{DocumentFactoryKind, ImporterConfig, ImporterOptions};
use csv_doc_importer::domain::{Document, FieldValue, JobState, PropertyMap};
use csv_doc_importer::importer::{
    CsvRowSource, ImportEngine, ImportError, ImportResult, NoDerivedName, RowSource,
};
use csv_doc_importer::repository::{
    DocumentStore, RepositoryError, RepositoryResult, SqliteDocumentStore,
};
use csv_doc_importer::ImportStatus;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_helpers::*;

const DOCS_OK: &str = "\"name\",\"type\",\"dc:title\",\"dc:description\"
\"myfile\",\"File\",\"My File\",\"a simple file\"
\"mynote\",\"Note\",\"My Note\",\"a simple note\"
";

const DOCS_NOT_OK: &str = "\"name\",\"type\",\"dc:title\",\"dc:description\",\"dc:issued\"
\"myfile\",\"File\",\"My File\",\"a simple file\",\"10012010\"
\"mynote\",\"Note\",\"My Note\",\"a simple note\",\"10/01/2010\"
\"nonexisting\",\"NotExistingType\",\"Some Doc\",\"a doc\",\"\"
\"mynote2\",\"Note\",\"My Note 2\",\"a simple note\",\"\"
";

fn existing_note(title: &str) -> Document {
    let mut properties = PropertyMap::new();
    properties.insert("dc:title".to_string(), FieldValue::String(title.to_string()));
    Document::new("/", "mynote", "Note", properties)
}

fn text(value: &str) -> FieldValue {
    FieldValue::String(value.to_string())
}

// ==========================================
// 创建 / 跳过 / 更新
// ==========================================

#[test]
fn test_skip_existing_documents() {
    csv_doc_importer::logging::init_test();
    let engine = memory_engine(ImporterConfig::default());
    engine.store().create_document(&existing_note("Existing Note")).unwrap();

    let csv = write_csv(DOCS_OK);
    let job = new_job(csv.path(), skip_existing_options());
    let summary = engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].line, 1);
    assert_eq!(logs[0].status, ImportStatus::Success);
    assert_eq!(logs[0].message, "Document created");
    assert_eq!(logs[1].line, 2);
    assert_eq!(logs[1].status, ImportStatus::Skipped);
    assert_eq!(logs[1].message, "Document already exists");
    assert_eq!(summary.success, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(job.state(), JobState::Completed);

    let myfile = engine.store().get_document("/myfile").unwrap().unwrap();
    assert_eq!(myfile.doc_type, "File");
    assert_eq!(myfile.title(), Some("My File"));
    assert_eq!(myfile.property("dc:description"), Some(&text("a simple file")));

    let mynote = engine.store().get_document("/mynote").unwrap().unwrap();
    assert_eq!(mynote.title(), Some("Existing Note"));
    assert_eq!(mynote.property("dc:description"), None);
}

#[test]
fn test_update_existing_documents() {
    let engine = memory_engine(ImporterConfig::default());
    engine.store().create_document(&existing_note("Existing Note")).unwrap();

    let csv = write_csv(DOCS_OK);
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].message, "Document created");
    assert_eq!(logs[1].status, ImportStatus::Success);
    assert_eq!(logs[1].message, "Document updated");
    assert_eq!(logs[1].localized_message, "csv_importer.document_updated");

    let mynote = engine.store().get_document("/mynote").unwrap().unwrap();
    assert_eq!(mynote.title(), Some("My Note"));
    assert_eq!(mynote.property("dc:description"), Some(&text("a simple note")));
}

// ==========================================
// 行级错误不影响后续行
// ==========================================

#[test]
fn test_store_line_with_errors() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv(DOCS_NOT_OK);
    let job = new_job(csv.path(), skip_existing_options());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 4);

    assert_eq!(logs[0].line, 1);
    assert_eq!(logs[0].status, ImportStatus::Error);
    assert_eq!(
        logs[0].message,
        "Unable to convert field 'dc:issued' with value '10012010'"
    );
    assert_eq!(logs[0].localized_message, "csv_importer.cannot_convert_field_value");
    assert_eq!(logs[0].params, vec!["dc:issued".to_string(), "10012010".to_string()]);

    assert_eq!(logs[1].line, 2);
    assert_eq!(logs[1].status, ImportStatus::Success);
    assert_eq!(logs[1].message, "Document created");

    assert_eq!(logs[2].line, 3);
    assert_eq!(logs[2].status, ImportStatus::Error);
    assert_eq!(logs[2].message, "The type 'NotExistingType' does not exist");

    assert_eq!(logs[3].line, 4);
    assert_eq!(logs[3].status, ImportStatus::Success);

    let store = engine.store();
    assert!(!store.exists("/myfile").unwrap());
    assert!(store.exists("/mynote").unwrap());
    assert!(!store.exists("/nonexisting").unwrap());
    assert!(store.exists("/mynote2").unwrap());

    let mynote = store.get_document("/mynote").unwrap().unwrap();
    assert_eq!(
        mynote.property("dc:issued"),
        Some(&FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2010, 10, 1).unwrap()))
    );
}

#[test]
fn test_missing_type_and_unknown_field() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv(
        "name,type,dc:title,foo:bar\n\
         a,,A,\n\
         b,File,B,\n",
    );
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "Missing 'type' value");
    assert_eq!(logs[1].message, "Field 'foo:bar' does not exist on type 'File'");
    assert_eq!(engine.store().count_documents().unwrap(), 0);
}

#[test]
fn test_missing_name_value() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,dc:title\n  ,Note,No name\nok,Note,Ok\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].status, ImportStatus::Error);
    assert_eq!(logs[0].message, "Missing 'name' value or incorrect parameter name");
    assert_eq!(logs[1].status, ImportStatus::Success);
}

#[test]
fn test_namespace_prefix_and_list_values() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,dc:subjects,note:note\nn1,Note,art|science,hello\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let doc = engine.store().get_document("/n1").unwrap().unwrap();
    assert_eq!(
        doc.property("dc:subjects"),
        Some(&FieldValue::StringList(vec!["art".to_string(), "science".to_string()]))
    );
    assert_eq!(doc.property("note:note"), Some(&text("hello")));
    // 未给标题时用文档名
    assert_eq!(doc.title(), Some("n1"));
}

#[test]
fn test_long_conversion_error_is_row_scoped() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,ct:amount\nbad,File,12x\ngood,File,12\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].message, "Unable to convert field 'ct:amount' with value '12x'");
    assert_eq!(logs[1].message, "Document created");

    let good = engine.store().get_document("/good").unwrap().unwrap();
    assert_eq!(good.property("ct:amount"), Some(&FieldValue::Long(12)));
}

#[test]
fn test_non_finite_double_fails_row() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,ct:ratio\nd1,File,NaN\nd2,File,inf\nd3,File,0.75\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].message, "Unable to convert field 'ct:ratio' with value 'NaN'");
    assert_eq!(logs[1].message, "Unable to convert field 'ct:ratio' with value 'inf'");
    assert_eq!(logs[2].message, "Document created");

    assert!(!engine.store().exists("/d1").unwrap());
    let d3 = engine.store().get_document("/d3").unwrap().unwrap();
    assert_eq!(d3.property("ct:ratio"), Some(&FieldValue::Double(0.75)));
}

// ==========================================
// 空文件 / 只有表头 / 空行
// ==========================================

#[test]
fn test_empty_file() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("");
    let job = new_job(csv.path(), ImporterOptions::default());
    let summary = engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].line, 0);
    assert_eq!(logs[0].status, ImportStatus::Error);
    assert_eq!(logs[0].message, "No header line, empty file?");
    assert_eq!(summary.error, 1);
    assert_eq!(job.state(), JobState::Completed);
    assert_eq!(engine.store().count_documents().unwrap(), 0);
    assert!(!engine.store().is_transaction_active());
}

#[test]
fn test_header_only() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,dc:title\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    assert!(job.log().is_empty());
    assert_eq!(engine.store().count_documents().unwrap(), 0);
    assert!(!engine.store().is_transaction_active());
}

#[test]
fn test_empty_lines_are_skipped() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,dc:title\na,Note,A\n   \n,,\nb,Note,B\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    let lines: Vec<u64> = logs.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 4]);
    assert_eq!(logs[1].status, ImportStatus::Skipped);
    assert_eq!(logs[1].message, "Empty line");
    // 只有分隔符的行不是空行，按普通行处理
    assert_eq!(logs[2].status, ImportStatus::Error);
    assert_eq!(logs[2].message, "Missing 'type' value");
    assert_eq!(engine.store().count_documents().unwrap(), 2);
}

#[test]
fn test_blank_physical_lines_keep_line_numbers() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv("name,type,dc:title\na,Note,A\n\n\nb,Note,B\nc,Nope,C\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 5);
    assert_eq!(logs[0].line, 1);
    assert_eq!(logs[0].message, "Document created");
    for entry in &logs[1..3] {
        assert_eq!(entry.status, ImportStatus::Skipped);
        assert_eq!(entry.message, "Empty line");
        assert_eq!(entry.localized_message, "csv_importer.empty_line");
    }
    assert_eq!(logs[1].line, 2);
    assert_eq!(logs[2].line, 3);
    assert_eq!(logs[3].line, 4);
    assert_eq!(logs[3].message, "Document created");
    assert_eq!(logs[4].line, 5);
    assert_eq!(logs[4].message, "The type 'Nope' does not exist");

    let summary = job.log().summary();
    assert_eq!(summary.success, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.error, 1);
}

#[test]
fn test_blank_line_does_not_advance_batch() {
    let engine = ImportEngine::new(
        RecordingStore::new(),
        Arc::new(test_catalog()),
        ImporterConfig::default(),
    );
    let csv = write_csv("name,type,dc:title\na,Note,A\n\nb,Note,B\n\n\nc,Note,C\n");
    let options = ImporterOptions::builder().batch_size(2).build();
    let job = new_job(csv.path(), options);
    engine.run_job(&job).unwrap();

    assert_eq!(job.log().len(), 6);
    assert_eq!(engine.store().commits(), vec![2, 3]);
}

#[test]
fn test_line_numbers_strictly_increase() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv(
        "name,type,dc:title,dc:issued\n\
         a,Note,A,\n\
         b,Nope,B,\n\
         c,Note,C,31/31/2010\n\
         \u{20}\n\
         d,Note,D,01/02/2010\n",
    );
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 5);
    for (i, entry) in logs.iter().enumerate() {
        assert_eq!(entry.line, i as u64 + 1);
    }
}

// ==========================================
// 名称派生与自动导入
// ==========================================

const BUILDING_HEADER: &str =
    "bg:IDBuilding,bg:IDSector,bg:IDSubject,bg:IDDocument,bg:IDDocumentDate";

#[test]
fn test_derived_name_without_name_and_type_columns() {
    let engine = memory_engine(ImporterConfig::default());
    let csv = write_csv(&format!(
        "{}\nFOOBAR 6,D,D,9,20100416\n,D,D,9,20100416\n",
        BUILDING_HEADER
    ));
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, ImportStatus::Success);
    assert_eq!(logs[1].status, ImportStatus::Error);
    assert_eq!(logs[1].message, "Missing 'name' value or incorrect parameter name");

    let doc = engine
        .store()
        .get_document("/FOOBAR 6 D.D.20100416.9")
        .unwrap()
        .unwrap();
    assert_eq!(doc.doc_type, "File");
    assert_eq!(doc.title(), Some("FOOBAR 6 D.D.20100416.9"));
    assert_eq!(doc.property("bg:IDSubject"), Some(&text("D")));
}

#[test]
fn test_default_type_is_configurable() {
    let config = ImporterConfig::default().with_default_document_type("Note");
    let engine = memory_engine(config);
    let csv = write_csv("name,dc:title\nn,N\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    assert_eq!(engine.store().get_document("/n").unwrap().unwrap().doc_type, "Note");
}

#[test]
fn test_no_derived_name_strategy() {
    let engine = memory_engine(ImporterConfig::default())
        .with_naming_strategy(Arc::new(NoDerivedName));
    let csv = write_csv(&format!("{}\nFOOBAR 6,D,D,9,20100416\n", BUILDING_HEADER));
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].message, "Missing 'name' value or incorrect parameter name");
}

#[test]
fn test_auto_import_content_by_derived_name() {
    let blobs = TempDir::new().unwrap();
    std::fs::write(blobs.path().join("TEST 2 D.D.20100416.0.pdf"), b"%PDF-1.4").unwrap();

    let engine = memory_engine(ImporterConfig::default().with_blobs_folder(blobs.path()));
    let csv = write_csv(&format!(
        "{},filing:autoimport,autofileimport\n\
         TEST 2,D,D,0,20100416,yes,1\n\
         TEST 3,D,D,0,20100416,yes,1\n",
        BUILDING_HEADER
    ));
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, ImportStatus::Success);
    assert_eq!(logs[1].status, ImportStatus::Error);
    assert_eq!(logs[1].message, "The file 'TEST 3 D.D.20100416.0.pdf' does not exist");

    let doc = engine
        .store()
        .get_document("/TEST 2 D.D.20100416.0")
        .unwrap()
        .unwrap();
    assert_eq!(doc.property("filing:autoimport"), Some(&text("yes")));
    match doc.property("content") {
        Some(FieldValue::Blob(blob)) => assert_eq!(blob.filename, "TEST 2 D.D.20100416.0.pdf"),
        other => panic!("unexpected content: {:?}", other),
    }
}

#[test]
fn test_blob_field_resolution() {
    let blobs = TempDir::new().unwrap();
    std::fs::write(blobs.path().join("contract.pdf"), b"%PDF").unwrap();

    let engine = memory_engine(ImporterConfig::default().with_blobs_folder(blobs.path()));
    let csv = write_csv("name,type,file:content\nf1,File,contract.pdf\nf2,File,missing.pdf\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].status, ImportStatus::Success);
    assert_eq!(logs[1].message, "The file 'missing.pdf' does not exist");
    assert!(engine.store().exists("/f1").unwrap());
    assert!(!engine.store().exists("/f2").unwrap());
}

// ==========================================
// 文档工厂策略
// ==========================================

#[test]
fn test_property_match_factory_updates_matching_document() {
    let engine = memory_engine(ImporterConfig::default());
    let mut properties = PropertyMap::new();
    properties.insert("dc:title".to_string(), text("My Note"));
    engine
        .store()
        .create_document(&Document::new("/", "other", "Note", properties))
        .unwrap();

    let options = ImporterOptions::builder()
        .document_factory(DocumentFactoryKind::PropertyMatch {
            key_property: "dc:title".to_string(),
        })
        .build();
    let csv = write_csv(DOCS_OK);
    let job = new_job(csv.path(), options);
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs[0].message, "Document created");
    assert_eq!(logs[1].message, "Document updated");

    assert!(!engine.store().exists("/mynote").unwrap());
    let other = engine.store().get_document("/other").unwrap().unwrap();
    assert_eq!(other.property("dc:description"), Some(&text("a simple note")));
}

// ==========================================
// 批次提交边界（记录每次提交时已写入的文档数）
// ==========================================

struct RecordingStore {
    inner: SqliteDocumentStore,
    commits: Mutex<Vec<usize>>,
    fail_create: Option<String>,
    fail_commit: bool,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: SqliteDocumentStore::open_in_memory().unwrap(),
            commits: Mutex::new(Vec::new()),
            fail_create: None,
            fail_commit: false,
        }
    }

    fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::new()
        }
    }

    fn failing_create(name: &str) -> Self {
        Self {
            fail_create: Some(name.to_string()),
            ..Self::new()
        }
    }

    fn commits(&self) -> Vec<usize> {
        self.commits.lock().unwrap().clone()
    }

    fn count_documents(&self) -> RepositoryResult<usize> {
        self.inner.count_documents()
    }
}

impl DocumentStore for RecordingStore {
    fn exists(&self, path: &str) -> RepositoryResult<bool> {
        self.inner.exists(path)
    }

    fn get_document(&self, path: &str) -> RepositoryResult<Option<Document>> {
        self.inner.get_document(path)
    }

    fn find_by_property(
        &self,
        parent_path: &str,
        doc_type: Option<&str>,
        key: &str,
        value: &FieldValue,
    ) -> RepositoryResult<Option<Document>> {
        self.inner.find_by_property(parent_path, doc_type, key, value)
    }

    fn create_document(&self, document: &Document) -> RepositoryResult<()> {
        if self.fail_create.as_deref() == Some(document.name.as_str()) {
            return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string())
                .context(format!("写入文档失败: {}", document.path))
                .context("文档库不可用"));
        }
        self.inner.create_document(document)
    }

    fn update_properties(&self, path: &str, properties: &PropertyMap) -> RepositoryResult<()> {
        self.inner.update_properties(path, properties)
    }

    fn begin_transaction(&self) -> RepositoryResult<()> {
        self.inner.begin_transaction()
    }

    fn commit_transaction(&self) -> RepositoryResult<()> {
        if self.fail_commit {
            return Err(RepositoryError::DatabaseTransactionError(
                "database is locked".to_string(),
            ));
        }
        let count = self.inner.count_documents()?;
        self.commits.lock().unwrap().push(count);
        self.inner.commit_transaction()
    }

    fn rollback_transaction(&self) -> RepositoryResult<()> {
        self.inner.rollback_transaction()
    }

    fn is_transaction_active(&self) -> bool {
        self.inner.is_transaction_active()
    }
}

#[test]
fn test_commit_after_every_nth_success() {
    let engine = ImportEngine::new(
        RecordingStore::new(),
        Arc::new(test_catalog()),
        ImporterConfig::default(),
    );
    let csv = write_csv(
        "name,type,dc:title\n\
         a,Note,A\n\
         x,Nope,X\n\
         b,Note,B\n\
         \u{20}\n\
         c,Note,C\n\
         ,Note,no name\n\
         d,Note,D\n\
         e,Note,E\n",
    );
    let options = ImporterOptions::builder().batch_size(2).build();
    let job = new_job(csv.path(), options);
    let summary = engine.run_job(&job).unwrap();

    assert_eq!(summary.success, 5);
    // 第 2、4 个成功后各提交一次，结束时再提交一次
    assert_eq!(engine.store().commits(), vec![2, 4, 5]);
    assert!(!engine.store().is_transaction_active());
}

#[test]
fn test_create_failure_logs_root_cause() {
    let engine = ImportEngine::new(
        RecordingStore::failing_create("b"),
        Arc::new(test_catalog()),
        ImporterConfig::default(),
    );
    let csv = write_csv("name,type,dc:title\na,Note,A\nb,Note,B\nc,Note,C\n");
    let job = new_job(csv.path(), ImporterOptions::default());
    engine.run_job(&job).unwrap();

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[1].status, ImportStatus::Error);
    assert_eq!(
        logs[1].message,
        "Unable to create document: 数据库查询失败: disk I/O error"
    );
    assert_eq!(logs[1].localized_message, "csv_importer.unable_to_create");
    assert_eq!(logs[2].status, ImportStatus::Success);
    assert_eq!(engine.store().commits(), vec![2]);
}

#[test]
fn test_failed_final_commit_rolls_back_window() {
    let engine = ImportEngine::new(
        RecordingStore::failing_commit(),
        Arc::new(test_catalog()),
        ImporterConfig::default(),
    );
    let csv = write_csv("name,type,dc:title\na,Note,A\nb,Note,B\n");
    let job = new_job(csv.path(), ImporterOptions::default());

    assert!(matches!(engine.run_job(&job), Err(ImportError::Store(_))));
    assert_eq!(job.state(), JobState::Failed);
    assert!(!engine.store().is_transaction_active());
    assert_eq!(engine.store().count_documents().unwrap(), 0);
    assert!(engine.store().commits().is_empty());
}

// ==========================================
// 读流失败: 已处理窗口提交，任务失败
// ==========================================

struct BrokenSource {
    rows: std::vec::IntoIter<Vec<String>>,
}

impl BrokenSource {
    fn new(rows: &[&[&str]]) -> Self {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl RowSource for BrokenSource {
    fn next_row(&mut self) -> ImportResult<Option<Vec<String>>> {
        match self.rows.next() {
            Some(row) => Ok(Some(row)),
            None => Err(ImportError::CsvParseError("unexpected end of stream".to_string())),
        }
    }

    fn source_name(&self) -> &str {
        "broken.csv"
    }
}

#[test]
fn test_stream_failure_commits_window_and_fails_job() {
    let engine = memory_engine(ImporterConfig::default());
    let mut source = BrokenSource::new(&[
        &["name", "type", "dc:title"],
        &["a", "Note", "A"],
        &["b", "Note", "B"],
    ]);
    let job = new_job(std::path::Path::new("/tmp/broken.csv"), ImporterOptions::default());

    let result = engine.run(&job, &mut source);
    assert!(matches!(result, Err(ImportError::CsvParseError(_))));
    assert_eq!(job.state(), JobState::Failed);

    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[2].line, 3);
    assert_eq!(logs[2].status, ImportStatus::Error);
    assert_eq!(
        logs[2].message,
        "Error while doing the import: CSV 解析失败: unexpected end of stream"
    );
    assert_eq!(logs[2].localized_message, "csv_importer.error_during_import");

    assert_eq!(engine.store().count_documents().unwrap(), 2);
    assert!(!engine.store().is_transaction_active());
}

#[test]
fn test_header_read_failure() {
    let engine = memory_engine(ImporterConfig::default());
    let mut source = BrokenSource::new(&[]);
    let job = new_job(std::path::Path::new("/tmp/broken.csv"), ImporterOptions::default());

    assert!(engine.run(&job, &mut source).is_err());
    let logs = job.log().snapshot();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].line, 0);
    assert!(!engine.store().is_transaction_active());
}

#[test]
fn test_invalid_separator_fails_job() {
    let engine = memory_engine(ImporterConfig::default());
    let mut source = CsvRowSource::from_reader("a.csv", "name,type\na,Note\n".as_bytes()).unwrap();
    let options = ImporterOptions::builder().list_separator_regex("(").build();
    let job = new_job(std::path::Path::new("/tmp/a.csv"), options);

    assert!(matches!(
        engine.run(&job, &mut source),
        Err(ImportError::InvalidSeparator { .. })
    ));
    assert_eq!(job.log().len(), 1);
    assert_eq!(engine.store().count_documents().unwrap(), 0);
}

#[test]
fn test_missing_source_file() {
    let engine = memory_engine(ImporterConfig::default());
    let job = new_job(std::path::Path::new("/nonexistent/docs.csv"), ImporterOptions::default());

    assert!(matches!(engine.run_job(&job), Err(ImportError::FileNotFound(_))));
    assert_eq!(job.state(), JobState::Failed);
    assert_eq!(job.log().snapshot()[0].line, 0);
}
