//! # 数据模型模块
//!
//! 定义谱数据、能量窗口和衰减模型参数。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `xps/` 和 `commands/` 使用
//! - 子模块: params, spectrum

pub mod params;
pub mod spectrum;

pub use params::AttenuationParams;
pub use spectrum::{EnergyWindow, Spectrum};
