//! 预筛（Aho-Corasick）
//!
//! 设计目标：
//! - 用全部违禁词构建一个 AC 自动机，对文件内容做一次线性扫描。
//! - 原始内容中没有任何违禁词时直接判定“无命中”，跳过逐词替换。
//! - 预筛只做“是否可能命中”的判断，计数与遮盖仍由逐词流程完成，
//!   以保持逐词顺序相关的计数语义。

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use tracing::warn;

use crate::words::WordSet;

/// 预筛计划（不可变，可跨线程共享）
#[derive(Debug)]
pub(crate) struct PrefilterPlan {
    /// 构建失败（例如词条过多导致自动机超限）时为 None，此时退化为不预筛
    ac: Option<AhoCorasick>,
}

impl PrefilterPlan {
    /// 从违禁词集合构建预筛计划
    pub(crate) fn build(words: &WordSet) -> Self {
        if words.is_empty() {
            return Self { ac: None };
        }
        let ac = match AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(words.iter())
        {
            Ok(ac) => Some(ac),
            Err(err) => {
                warn!(%err, "prefilter disabled");
                None
            }
        };
        Self { ac }
    }

    /// 内容中是否可能存在违禁词；无自动机时保守返回 true
    pub(crate) fn may_match(&self, content: &str) -> bool {
        match &self.ac {
            Some(ac) => ac.is_match(content),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_content_without_any_word() {
        let plan = PrefilterPlan::build(&WordSet::parse("secret,token"));
        assert!(!plan.may_match("nothing to see here"));
        assert!(plan.may_match("a token appears"));
    }

    #[test]
    fn overlapping_words_still_detected() {
        // "ab" 与 "b" 共享字符；Standard 语义下任一命中即可
        let plan = PrefilterPlan::build(&WordSet::parse("ab,b"));
        assert!(plan.may_match("xb"));
    }

    #[test]
    fn empty_set_is_conservative() {
        let plan = PrefilterPlan::build(&WordSet::default());
        assert!(plan.may_match("anything"));
    }
}
