//! Doggolingo 双向词典
//!
//! 进程启动时从两列 CSV（首行为表头）构建一次，之后只读，
//! 以 `Arc<DictionaryIndex>` 的形式在所有请求间共享，无需加锁。
//!
//! - key 一律小写，用于大小写无关的匹配
//! - value 保留原始大小写
//! - 重复 key 后写覆盖先写，位置保持首次出现的位置

mod error;

#[cfg(test)]
mod tests;

pub use error::DictionaryLoadError;

use crate::models::TranslationDirection;
use indexmap::IndexMap;
use std::io::Read;
use std::path::Path;

/// 双向词典索引
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    /// 小写 English -> Doggolingo
    forward: IndexMap<String, String>,
    /// 小写 Doggolingo -> English
    reverse: IndexMap<String, String>,
}

impl DictionaryIndex {
    /// 从 (english, doggo) 有序对构建
    pub fn build<I, E, D>(rows: I) -> Result<Self, DictionaryLoadError>
    where
        I: IntoIterator<Item = (E, D)>,
        E: Into<String>,
        D: Into<String>,
    {
        let mut index = Self::default();
        for (english, doggo) in rows {
            let english = english.into();
            let doggo = doggo.into();
            index.forward.insert(english.to_lowercase(), doggo.clone());
            index.reverse.insert(doggo.to_lowercase(), english);
        }

        if index.forward.is_empty() {
            return Err(DictionaryLoadError::Empty);
        }
        Ok(index)
    }

    /// 从 CSV 读取器构建，跳过表头行
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DictionaryLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.len() != 2 {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(DictionaryLoadError::Malformed {
                    line,
                    found: record.len(),
                });
            }
            rows.push((record[0].to_string(), record[1].to_string()));
        }

        Self::build(rows)
    }

    /// 从文件路径加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DictionaryLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let index = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(
            "[DICT] 已加载词典 {}: {} 个 English 词条, {} 个 Doggolingo 词条",
            path.display(),
            index.forward.len(),
            index.reverse.len()
        );
        Ok(index)
    }

    pub fn lookup_forward(&self, term: &str) -> Option<&str> {
        self.forward.get(&term.to_lowercase()).map(String::as_str)
    }

    pub fn lookup_reverse(&self, term: &str) -> Option<&str> {
        self.reverse.get(&term.to_lowercase()).map(String::as_str)
    }

    /// 按方向遍历词条，顺序为插入顺序
    pub fn entries(
        &self,
        direction: TranslationDirection,
    ) -> impl Iterator<Item = (&str, &str)> + '_ {
        let map = match direction {
            TranslationDirection::EnglishToDoggo => &self.forward,
            TranslationDirection::DoggoToEnglish => &self.reverse,
        };
        map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// English 词条数
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
