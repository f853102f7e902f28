//! # 统一错误处理模块
//!
//! 定义 xpsthick 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// xpsthick 统一错误类型
#[derive(Error, Debug)]
pub enum XpsError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid energy window: {0} (expected 'LOW:HIGH')")]
    InvalidWindow(String),

    #[error("Invalid range format: {0}")]
    InvalidRange(String),

    // ─────────────────────────────────────────────────────────────
    // 输入校验错误
    // ─────────────────────────────────────────────────────────────
    #[error("angles and ratios must have the same length ({angles} != {ratios})")]
    LengthMismatch { angles: usize, ratios: usize },

    #[error("weights must match the number of angles ({weights} != {angles})")]
    WeightLengthMismatch { weights: usize, angles: usize },

    #[error("Substrate area must be > 0 to compute a ratio (got {0})")]
    NonPositiveArea(f64),

    #[error("Invalid thickness bounds: [{lo}, {hi}]")]
    InvalidBounds { lo: f64, hi: f64 },

    #[error("No take-off angle gives an observable substrate signal")]
    NoUsableAngles,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XpsError>;
