//! 共享会话状态：槽位名 -> 最新值
//!
//! 每次 Runner 运行创建一个，所有单元通过 `&mut SessionState` 读写（不存在全局状态）。
//! 并行分支在 `snapshot()` 出的副本上运行，写入先缓冲在副本里，结束后由 `merge()` 按列表顺序并回。

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::workflow::{ExitSignal, LoopReport};

/// 会话状态：值表、本会话（或分支）内的写入缓冲、待处理的退出信号、循环报告
#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    values: HashMap<String, Value>,
    /// 自创建（或 snapshot）以来写过的槽位，合并时只回放这些
    writes: BTreeMap<String, Value>,
    exit: Option<ExitSignal>,
    loops: Vec<LoopReport>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
            writes: BTreeMap::new(),
            exit: None,
            loops: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, slot: &str) -> Option<&Value> {
        self.values.get(slot)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.values.contains_key(slot)
    }

    /// 写入槽位（后写覆盖先写）
    pub fn set(&mut self, slot: impl Into<String>, value: Value) {
        let slot = slot.into();
        tracing::debug!(session = %self.id, slot = %slot, "slot write");
        self.writes.insert(slot.clone(), value.clone());
        self.values.insert(slot, value);
    }

    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 为并行分支创建隔离副本：值相同，写入缓冲、退出信号与循环报告为空
    pub fn snapshot(&self) -> Self {
        Self {
            id: self.id.clone(),
            values: self.values.clone(),
            writes: BTreeMap::new(),
            exit: None,
            loops: Vec::new(),
        }
    }

    /// 将分支的缓冲写入并回当前会话；退出信号仅在当前没有时采纳
    pub fn merge(&mut self, branch: SessionState) {
        for (slot, value) in branch.writes {
            self.set(slot, value);
        }
        if self.exit.is_none() {
            self.exit = branch.exit;
        }
        self.loops.extend(branch.loops);
    }

    pub fn raise_exit(&mut self, signal: ExitSignal) {
        tracing::debug!(session = %self.id, raised_by = %signal.raised_by, "exit signal raised");
        self.exit = Some(signal);
    }

    pub fn exit_requested(&self) -> bool {
        self.exit.is_some()
    }

    /// 取走退出信号（仅 LoopAgent 调用）
    pub fn take_exit(&mut self) -> Option<ExitSignal> {
        self.exit.take()
    }

    pub fn record_loop(&mut self, report: LoopReport) {
        self.loops.push(report);
    }

    pub fn loop_reports(&self) -> &[LoopReport] {
        &self.loops
    }

    /// 拆出最终状态与循环报告（Runner 结束时调用）
    pub fn into_parts(self) -> (HashMap<String, Value>, Vec<LoopReport>) {
        (self.values, self.loops)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_write_wins() {
        let mut session = SessionState::new();
        session.set("x", json!(1));
        session.set("x", json!(2));
        assert_eq!(session.get("x"), Some(&json!(2)));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_snapshot_is_isolated_from_parent() {
        let mut parent = SessionState::new();
        parent.set("topic", json!("ai"));

        let mut branch = parent.snapshot();
        branch.set("tech", json!("report"));

        assert_eq!(branch.get("topic"), Some(&json!("ai")));
        assert!(!parent.contains("tech"));
    }

    #[test]
    fn test_merge_replays_only_branch_writes() {
        let mut parent = SessionState::new();
        parent.set("a", json!("old"));

        let first = parent.snapshot();
        let mut second = parent.snapshot();
        second.set("b", json!("new"));

        // first 未写入 a，合并不应把旧值带回覆盖
        parent.set("a", json!("updated"));
        parent.merge(first);
        parent.merge(second);

        assert_eq!(parent.get("a"), Some(&json!("updated")));
        assert_eq!(parent.get("b"), Some(&json!("new")));
    }

    #[test]
    fn test_take_exit_clears_signal() {
        let mut session = SessionState::new();
        session.raise_exit(ExitSignal {
            raised_by: "exit_loop".to_string(),
            payload: json!({"status": "approved"}),
        });
        assert!(session.exit_requested());
        assert!(session.take_exit().is_some());
        assert!(!session.exit_requested());
    }
}
