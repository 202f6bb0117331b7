// ==========================================
// 表格数据批量导入 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 叶子变体携带底层消息；Context 变体串起 caused-by 链
// ==========================================

use std::error::Error as StdError;
use thiserror::Error;

/// 根因遍历的最大深度（防止环形链）
pub const MAX_CAUSE_DEPTH: usize = 32;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 文档错误 =====
    #[error("文档不存在: {0}")]
    NotFound(String),

    #[error("文档已存在: {0}")]
    AlreadyExists(String),

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据错误 =====
    #[error("属性序列化失败: {0}")]
    SerializationError(String),

    // ===== 错误链 =====
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<RepositoryError>,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 包一层上下文，保留原错误为 cause
    pub fn context(self, context: impl Into<String>) -> Self {
        RepositoryError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 沿 source() 链找到最内层的错误
///
/// 超过 MAX_CAUSE_DEPTH 时返回当时所在的错误
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = err;
    for _ in 0..MAX_CAUSE_DEPTH {
        match current.source() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// 最内层错误的消息
pub fn root_cause_message(err: &(dyn StdError + 'static)) -> String {
    root_cause(err).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[test]
    fn test_root_cause_follows_chain() {
        let err = RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed: documents.path".to_string(),
        )
        .context("创建文档失败: /mynote")
        .context("导入第 3 行失败");

        assert_eq!(err.to_string(), "导入第 3 行失败");
        assert_eq!(
            root_cause_message(&err),
            "唯一约束违反: UNIQUE constraint failed: documents.path"
        );
    }

    #[test]
    fn test_root_cause_of_leaf_is_itself() {
        let err = RepositoryError::NotFound("/missing".to_string());
        assert_eq!(root_cause_message(&err), "文档不存在: /missing");
    }

    #[derive(Debug)]
    struct SelfCaused;

    impl fmt::Display for SelfCaused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("self caused")
        }
    }

    impl StdError for SelfCaused {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self)
        }
    }

    #[test]
    fn test_root_cause_bounded_on_cycle() {
        let err = SelfCaused;
        assert_eq!(root_cause_message(&err), "self caused");
    }

    #[test]
    fn test_from_rusqlite_unique() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: RepositoryError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }
}
