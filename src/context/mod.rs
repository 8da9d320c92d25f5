//! 词典上下文构建
//!
//! 扫描用户消息，把命中的词典词条拼成 `Context: k1->v1; k2->v2; ` 注入 prompt。
//!
//! 匹配规则是对小写消息做子串包含判断，不按词边界切分：
//! 短 key 命中更长单词内部（如 `eat` 命中 `great`）属于可接受的上下文噪声。

use crate::dictionary::DictionaryIndex;
use crate::models::TranslationDirection;

/// 上下文前缀
pub const CONTEXT_PREFIX: &str = "Context: ";

/// 词典上下文注释
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAnnotation {
    text: String,
    pairs: usize,
}

impl ContextAnnotation {
    fn new() -> Self {
        Self {
            text: CONTEXT_PREFIX.to_string(),
            pairs: 0,
        }
    }

    fn push_pair(&mut self, key: &str, value: &str) {
        self.text.push_str(key);
        self.text.push_str("->");
        self.text.push_str(value);
        self.text.push_str("; ");
        self.pairs += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 命中的词条数
    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }
}

impl std::fmt::Display for ContextAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// 根据翻译方向构建上下文注释
pub fn build(
    message: &str,
    direction: TranslationDirection,
    index: &DictionaryIndex,
) -> ContextAnnotation {
    let haystack = message.to_lowercase();
    let mut annotation = ContextAnnotation::new();

    for (key, value) in index.entries(direction) {
        if haystack.contains(key) {
            annotation.push_pair(key, value);
        }
    }

    tracing::debug!(
        "[CONTEXT] direction={} 命中 {} 个词条",
        direction,
        annotation.pairs()
    );
    annotation
}
