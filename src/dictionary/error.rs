//! 词典加载错误

use thiserror::Error;

/// 词典加载错误
///
/// 启动阶段致命：词典损坏时进程不得开始服务。
#[derive(Debug, Error)]
pub enum DictionaryLoadError {
    /// 文件不可读
    #[error("无法读取词典文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV 解析失败
    #[error("词典 CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    /// 列数不等于 2
    #[error("词典第 {line} 行格式错误: 期望 2 列, 实际 {found} 列")]
    Malformed { line: u64, found: usize },

    /// 没有任何数据行
    #[error("词典为空")]
    Empty,
}
