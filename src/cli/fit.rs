//! # fit 子命令 CLI 定义
//!
//! 厚度反演统一入口，包含三个子命令：
//! - `ratio`: 单角度，已知强度比
//! - `areas`: 单角度，已知两个峰面积
//! - `multi`: 多角度联合拟合
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`, `cli/plot.rs` 使用
//! - 参数传递给 `commands/fit.rs`

use super::{FitOptions, MaterialArgs};

use clap::{Args, Subcommand};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────
// Fit 主命令
// ─────────────────────────────────────────────────────────────

/// fit 主命令参数
#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(subcommand)]
    pub command: FitCommands,
}

/// fit 子命令
#[derive(Subcommand, Debug)]
pub enum FitCommands {
    /// Fit thickness from a measured overlayer/substrate ratio
    Ratio(FitRatioArgs),

    /// Fit thickness from overlayer and substrate peak areas
    Areas(FitAreasArgs),

    /// Fit one thickness to ratios measured at several take-off angles
    Multi(FitMultiArgs),
}

// ─────────────────────────────────────────────────────────────
// 单角度
// ─────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct FitRatioArgs {
    /// Measured ratio I_over / I_sub
    #[arg(short, long)]
    pub ratio: f64,

    /// Take-off angle from the surface normal (degrees)
    #[arg(short, long, default_value_t = 0.0)]
    pub theta: f64,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,
}

#[derive(Args, Debug)]
pub struct FitAreasArgs {
    /// Overlayer peak area
    #[arg(long)]
    pub a_over: f64,

    /// Substrate peak area (must be positive)
    #[arg(long)]
    pub a_sub: f64,

    /// Take-off angle from the surface normal (degrees)
    #[arg(short, long, default_value_t = 0.0)]
    pub theta: f64,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,
}

// ─────────────────────────────────────────────────────────────
// 多角度
// ─────────────────────────────────────────────────────────────

/// 多角度测量数据来源：命令行列表或 CSV 文件
#[derive(Args, Debug, Clone)]
pub struct AngleDataArgs {
    /// Take-off angles in degrees, comma separated
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "data")]
    pub angles: Vec<f64>,

    /// Measured ratios, one per angle
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "data")]
    pub ratios: Vec<f64>,

    /// Residual weights, one per angle
    #[arg(long, value_delimiter = ',', num_args = 1.., conflicts_with = "data")]
    pub weights: Vec<f64>,

    /// CSV file with columns angle,ratio[,weight]
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FitMultiArgs {
    #[command(flatten)]
    pub input: AngleDataArgs,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,
}
