//! # xpsthick 库入口
//!
//! 峰面积提取、衰减正演模型与厚度反演的公共 API，命令行程序 `main.rs` 也经由此处调用。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: batch, cli, commands, error, models, parsers, utils, xps

pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod parsers;
pub mod utils;
pub mod xps;

pub use error::{Result, XpsError};
pub use models::{AttenuationParams, EnergyWindow, Spectrum};
