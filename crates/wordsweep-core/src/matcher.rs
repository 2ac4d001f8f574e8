//! 计数与遮盖（Matcher）
//!
//! 算法：按 WordSet 顺序逐词处理。对每个词，在“当前”内容（可能已被前面的词遮盖）
//! 上统计不重叠的字面出现次数，再将全部出现替换为等长的遮盖串。
//! 返回的总数是各词在被处理那一刻的计数之和。
//!
//! 顺序相关性示例：词表 `["ab", "b"]`、内容 `"ab"`，先遮盖为 `"**"`，
//! 随后 `"b"` 计数为 0。
use crate::prefilter::PrefilterPlan;
use crate::words::WordSet;

/// 默认遮盖字符
pub const DEFAULT_MASK: char = '*';

/// 遮盖结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskResult {
    pub content: String,
    pub replacements: usize,
}

/// 纯函数版本：对 `content` 依次应用 `words`，返回遮盖后的内容与总替换次数
///
/// 遮盖串长度按字符数（而非字节数）计算，保证遮盖后每行的可见宽度不变。
pub fn apply(content: &str, words: &WordSet, mask: char) -> MaskResult {
    let mut current = content.to_string();
    let mut replacements = 0usize;

    for word in words.iter() {
        let count = current.matches(word).count();
        if count == 0 {
            continue;
        }
        let masked: String = std::iter::repeat(mask).take(word.chars().count()).collect();
        current = current.replace(word, &masked);
        replacements += count;
    }

    MaskResult { content: current, replacements }
}

/// 绑定词表与预筛计划的匹配器，供扫描循环逐文件复用
#[derive(Debug)]
pub struct Matcher {
    words: WordSet,
    mask: char,
    plan: PrefilterPlan,
}

impl Matcher {
    pub fn new(words: WordSet, mask: char) -> Self {
        let plan = PrefilterPlan::build(&words);
        Self { words, mask, plan }
    }

    pub fn words(&self) -> &WordSet {
        &self.words
    }

    /// 先经 AC 预筛；原始内容无任何候选词时直接返回 0 次替换
    pub fn apply(&self, content: &str) -> MaskResult {
        if !self.plan.may_match(content) {
            return MaskResult { content: content.to_string(), replacements: 0 };
        }
        apply(content, &self.words, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &str) -> WordSet {
        WordSet::parse(raw)
    }

    #[test]
    fn counts_and_masks_single_word() {
        let r = apply("foo bar foo baz foo", &words("foo"), '*');
        assert_eq!(r.replacements, 3);
        assert_eq!(r.content, "*** bar *** baz ***");
    }

    #[test]
    fn counts_non_overlapping_occurrences() {
        let r = apply("aaaa", &words("aa"), '*');
        assert_eq!(r.replacements, 2);
        assert_eq!(r.content, "****");

        let r = apply("aaa", &words("aa"), '*');
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "**a");
    }

    #[test]
    fn later_word_sees_masked_content() {
        let r = apply("ab", &words("ab,b"), '*');
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "**");

        // 反序：先遮盖 "b"，"ab" 已不复存在
        let r = apply("ab", &words("b,ab"), '*');
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "a*");
    }

    #[test]
    fn matching_is_case_sensitive() {
        let r = apply("Secret secret SECRET", &words("secret"), '*');
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "Secret ****** SECRET");
    }

    #[test]
    fn duplicate_words_count_independently() {
        // 第二个 "x" 在已遮盖内容上计数为 0
        let r = apply("x x", &words("x,x"), '#');
        assert_eq!(r.replacements, 2);
        assert_eq!(r.content, "# #");
    }

    #[test]
    fn mask_length_follows_characters() {
        let r = apply("привет мир", &words("привет"), '*');
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "****** мир");
    }

    #[test]
    fn masked_output_is_idempotent() {
        let set = words("alpha,beta");
        let first = apply("alpha beta gamma alpha", &set, '*');
        assert_eq!(first.replacements, 3);
        let second = apply(&first.content, &set, '*');
        assert_eq!(second.replacements, 0);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn mask_can_spell_a_later_word() {
        let r = apply("abc", &words("abc,**"), '*');
        // "***" 中有一个不重叠的 "**"
        assert_eq!(r.replacements, 2);
        assert_eq!(r.content, "***");
    }

    #[test]
    fn matcher_prefilter_skips_clean_content() {
        let m = Matcher::new(words("token"), '*');
        let r = m.apply("clean text");
        assert_eq!(r.replacements, 0);
        assert_eq!(r.content, "clean text");

        let r = m.apply("token here");
        assert_eq!(r.replacements, 1);
        assert_eq!(r.content, "***** here");
    }
}
