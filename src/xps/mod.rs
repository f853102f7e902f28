//! # XPS 厚度估算模块
//!
//! 从 XPS 峰面积估算衬底上覆盖层的厚度。
//!
//! ## 子模块
//! - `peaks`: 能量窗口内背景扣除与峰面积积分
//! - `attenuation`: 覆盖层/衬底强度衰减正演模型
//! - `solver`: 有界单参数 Levenberg-Marquardt 最小二乘
//! - `inversion`: 单角度/多角度厚度反演
//! - `plot`: 图表生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/` 的 AttenuationParams, EnergyWindow

pub mod attenuation;
pub mod export;
pub mod inversion;
pub mod peaks;
pub mod plot;
pub mod solver;

pub use attenuation::{ratio_over_to_sub, Ratio};
pub use inversion::{MultiAngleFit, ThicknessFit, DEFAULT_BOUNDS, DEFAULT_D0};
pub use peaks::{Background, PeakArea, ShirleyConfig};
pub use solver::{SolverConfig, SolverStatus};
