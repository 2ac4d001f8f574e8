//! 结果存储（ResultStore）
//!
//! 扫描线程独占写入，调用方随时读取不可变快照；读写锁保证并发读安全，
//! 且锁从不跨越文件 I/O 持有。
use parking_lot::RwLock;

use crate::types::FileOutcome;

#[derive(Debug, Default)]
pub struct ResultStore {
    items: RwLock<Vec<FileOutcome>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, outcome: FileOutcome) {
        self.items.write().push(outcome);
    }

    pub(crate) fn clear(&self) {
        self.items.write().clear();
    }

    /// 按替换次数降序的快照；次数相同保持追加顺序
    pub fn snapshot(&self) -> Vec<FileOutcome> {
        let mut out = self.items.read().clone();
        sort_outcomes(&mut out);
        out
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

/// 稳定排序：替换次数降序
pub(crate) fn sort_outcomes(outcomes: &mut [FileOutcome]) {
    outcomes.sort_by(|a, b| b.replacements.cmp(&a.replacements));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    fn outcome(name: &str, replacements: usize) -> FileOutcome {
        FileOutcome { path: PathBuf::from(name), size: 10, replacements }
    }

    #[test]
    fn snapshot_sorted_descending_and_stable() {
        let store = ResultStore::new();
        store.add(outcome("a", 1));
        store.add(outcome("b", 5));
        store.add(outcome("c", 1));
        store.add(outcome("d", 3));

        let names: Vec<_> = store
            .snapshot()
            .into_iter()
            .map(|o| o.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let store = ResultStore::new();
        store.add(outcome("a", 1));
        let snap = store.snapshot();
        store.add(outcome("b", 2));
        assert_eq!(snap.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        store.add(outcome(&format!("{t}-{i}"), i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 400);
        let snap = store.snapshot();
        assert!(snap.windows(2).all(|w| w[0].replacements >= w[1].replacements));
    }
}
