// ==========================================
// 表格数据批量导入 - 文档库 SQLite 实现
// ==========================================
// 职责: 实现 DocumentStore（使用 rusqlite）
// 事务: 显式 BEGIN IMMEDIATE / COMMIT / ROLLBACK，由批次协调器驱动
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::document::{Document, FieldValue, PropertyMap};
use crate::repository::document_store::DocumentStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_DOCUMENT: &str =
    "SELECT path, parent_path, name, doc_type, properties_json FROM documents";

// ==========================================
// SqliteDocumentStore
// ==========================================
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDocumentStore {
    /// 打开（或创建）数据库文件并建表
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存库（测试、一次性导入）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        crate::db::configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出父路径下的全部文档（按路径排序）
    pub fn list_children(&self, parent_path: &str) -> RepositoryResult<Vec<Document>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE parent_path = ?1 ORDER BY path",
            SELECT_DOCUMENT
        ))?;
        let rows = stmt.query_map(params![parent_path], map_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.into_document()?);
        }
        Ok(documents)
    }

    /// 文档总数
    pub fn count_documents(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// documents 表的一行（属性尚未反序列化）
struct DocumentRow {
    path: String,
    parent_path: String,
    name: String,
    doc_type: String,
    properties_json: String,
}

impl DocumentRow {
    fn into_document(self) -> RepositoryResult<Document> {
        let properties: PropertyMap = serde_json::from_str(&self.properties_json)?;
        Ok(Document {
            path: self.path,
            parent_path: self.parent_path,
            name: self.name,
            doc_type: self.doc_type,
            properties,
        })
    }
}

// serde_json 把 NaN / inf 写成 null，读回时无法还原
fn encode_properties(properties: &PropertyMap) -> RepositoryResult<String> {
    if let Some((key, _)) = properties
        .iter()
        .find(|(_, v)| matches!(v, FieldValue::Double(d) if !d.is_finite()))
    {
        return Err(RepositoryError::SerializationError(format!(
            "属性 {} 不是有限数值",
            key
        )));
    }
    Ok(serde_json::to_string(properties)?)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        path: row.get(0)?,
        parent_path: row.get(1)?,
        name: row.get(2)?,
        doc_type: row.get(3)?,
        properties_json: row.get(4)?,
    })
}

impl DocumentStore for SqliteDocumentStore {
    fn exists(&self, path: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM documents WHERE path = ?1",
                params![path],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_document(&self, path: &str) -> RepositoryResult<Option<Document>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                &format!("{} WHERE path = ?1", SELECT_DOCUMENT),
                params![path],
                map_row,
            )
            .optional()?;
        row.map(DocumentRow::into_document).transpose()
    }

    fn find_by_property(
        &self,
        parent_path: &str,
        doc_type: Option<&str>,
        key: &str,
        value: &FieldValue,
    ) -> RepositoryResult<Option<Document>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE parent_path = ?1 AND (?2 IS NULL OR doc_type = ?2) ORDER BY path",
            SELECT_DOCUMENT
        ))?;
        let rows = stmt.query_map(params![parent_path, doc_type], map_row)?;

        for row in rows {
            let document = row?.into_document()?;
            if document.property(key) == Some(value) {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }

    fn create_document(&self, document: &Document) -> RepositoryResult<()> {
        let properties_json = encode_properties(&document.properties)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO documents (
                path, parent_path, name, doc_type, properties_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                document.path,
                document.parent_path,
                document.name,
                document.doc_type,
                properties_json,
                now
            ],
        )
        .map_err(|e| RepositoryError::from(e).context(format!("写入文档失败: {}", document.path)))?;
        Ok(())
    }

    fn update_properties(&self, path: &str, properties: &PropertyMap) -> RepositoryResult<()> {
        let mut document = self
            .get_document(path)?
            .ok_or_else(|| RepositoryError::NotFound(path.to_string()))?;

        document
            .properties
            .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        let properties_json = encode_properties(&document.properties)?;

        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE documents SET properties_json = ?1, updated_at = ?2 WHERE path = ?3",
            params![properties_json, Utc::now().to_rfc3339(), path],
        )
        .map_err(|e| RepositoryError::from(e).context(format!("更新文档失败: {}", path)))?;
        Ok(())
    }

    fn begin_transaction(&self) -> RepositoryResult<()> {
        self.get_conn()?
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit_transaction(&self) -> RepositoryResult<()> {
        self.get_conn()?
            .execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback_transaction(&self) -> RepositoryResult<()> {
        self.get_conn()?
            .execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn is_transaction_active(&self) -> bool {
        self.get_conn()
            .map(|conn| !conn.is_autocommit())
            .unwrap_or(false)
    }
}
