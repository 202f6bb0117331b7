// ==========================================
// 表格数据批量导入 - 批次事务协调
// ==========================================
// 规则:
// - 只有成功（创建/更新）的行计数
// - 每满 N 个成功提交一次并立即开启新事务
// - finish(): 提交当前窗口；调用方原本在事务中则重新开启
// - 未 finish 就被丢弃（提前返回、panic）: 回滚当前窗口
// ==========================================

use crate::importer::error::ImportResult;
use crate::repository::DocumentStore;
use tracing::{debug, warn};

pub struct BatchCoordinator<'a> {
    store: &'a dyn DocumentStore,
    batch_size: usize,
    successes: usize,
    commits: usize,
    caller_in_transaction: bool,
    finished: bool,
}

impl<'a> BatchCoordinator<'a> {
    /// 开启第一个事务窗口（已在事务中则沿用）
    pub fn begin(store: &'a dyn DocumentStore, batch_size: usize) -> ImportResult<Self> {
        let caller_in_transaction = store.is_transaction_active();
        if !caller_in_transaction {
            store.begin_transaction()?;
        }

        Ok(Self {
            store,
            batch_size: batch_size.max(1),
            successes: 0,
            commits: 0,
            caller_in_transaction,
            finished: false,
        })
    }

    /// 记录一行成功；到达批次边界时提交
    pub fn record_success(&mut self) -> ImportResult<()> {
        self.successes += 1;
        if self.successes % self.batch_size == 0 {
            self.store.commit_transaction()?;
            self.commits += 1;
            debug!(successes = self.successes, commits = self.commits, "批次提交");
            self.store.begin_transaction()?;
        }
        Ok(())
    }

    /// 提交最后一个窗口
    ///
    /// 提交失败时窗口仍未结束，由 Drop 回滚
    pub fn finish(mut self) -> ImportResult<()> {
        self.store.commit_transaction()?;
        self.finished = true;
        self.commits += 1;
        debug!(successes = self.successes, commits = self.commits, "最终提交");

        if self.caller_in_transaction {
            self.store.begin_transaction()?;
        }
        Ok(())
    }

    /// 累计成功行数
    pub fn successes(&self) -> usize {
        self.successes
    }

    /// 已提交次数
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Drop for BatchCoordinator<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if self.store.is_transaction_active() {
            warn!(successes = self.successes, "导入未正常结束，回滚当前批次");
            if let Err(e) = self.store.rollback_transaction() {
                warn!(error = %e, "批次回滚失败");
            }
        }
        if self.caller_in_transaction {
            if let Err(e) = self.store.begin_transaction() {
                warn!(error = %e, "重新开启事务失败");
            }
        }
    }
}
