//! 违禁词集合（WordSet）
//!
//! 输入为任意分隔的文本块：换行、回车、逗号、分号均视为分隔符，
//! 每个词条去除首尾空白，空词条丢弃。
//! - 不去重：重复词条按顺序各自参与匹配。
//! - 不做大小写归一化：按输入原样区分大小写。
use std::path::Path;

use crate::error::ScanError;

const DELIMITERS: [char; 4] = ['\n', '\r', ',', ';'];

/// 有序的违禁词序列；不变式：不含空串或纯空白词条
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSet {
    words: Vec<String>,
}

impl WordSet {
    /// 解析分隔符文本；空输入得到空集合（软失败）
    pub fn parse(raw: &str) -> Self {
        let words = raw
            .split(|c: char| DELIMITERS.contains(&c))
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    /// 从已拆分的列表构建（如配置文件中的数组），同样执行 trim 与空值过滤
    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// 读取 UTF-8 词表文件并解析
    pub fn from_file(path: &Path) -> Result<Self, ScanError> {
        let txt = std::fs::read_to_string(path).map_err(|source| ScanError::WordsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&txt))
    }

    /// 追加另一集合的词条（保持顺序）
    pub fn extend(&mut self, other: WordSet) {
        self.words.extend(other.words);
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_delimiters_and_trims() {
        let set = WordSet::parse("alpha, beta;gamma\r\n  delta \n");
        assert_eq!(set.as_slice(), &["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn empty_and_blank_input_yield_empty_set() {
        assert!(WordSet::parse("").is_empty());
        assert!(WordSet::parse(" \r\n ,;; \t").is_empty());
    }

    #[test]
    fn keeps_duplicates_and_case() {
        let set = WordSet::parse("Foo,foo,Foo");
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Foo", "foo", "Foo"]);
    }

    #[test]
    fn from_list_drops_blank_entries() {
        let set = WordSet::from_list(["  a ", "", "   ", "b"]);
        assert_eq!(set.as_slice(), &["a", "b"]);
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = WordSet::from_file(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ScanError::WordsIo { .. }));
    }
}
