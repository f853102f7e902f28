//! # plot 子命令 CLI 定义
//!
//! - `thickness`: 固定角度下的 R(d) 曲线
//! - `angle`: 多角度测量点与拟合厚度下的 R(θ) 曲线
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/plot.rs`

use super::fit::AngleDataArgs;
use super::{parse_bounds, FitOptions, MaterialArgs};

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// plot 主命令参数
#[derive(Args, Debug)]
pub struct PlotArgs {
    #[command(subcommand)]
    pub command: PlotCommands,
}

/// plot 子命令
#[derive(Subcommand, Debug)]
pub enum PlotCommands {
    /// Ratio versus thickness at a fixed take-off angle
    Thickness(PlotThicknessArgs),

    /// Ratio versus take-off angle with measured points
    Angle(PlotAngleArgs),
}

/// 图表/数据输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (x, ratio)
    Csv,
    /// XY data file with comment header
    Xy,
}

/// 图表外观参数
#[derive(Args, Debug, Clone)]
pub struct FigureArgs {
    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<PlotFormat>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(Args, Debug)]
pub struct PlotThicknessArgs {
    /// Measured ratio; when given, the fitted thickness is marked
    #[arg(short, long)]
    pub ratio: Option<f64>,

    /// Take-off angle from the surface normal (degrees)
    #[arg(short, long, default_value_t = 0.0)]
    pub theta: f64,

    /// Thickness range "LO:HI" (nm) [default: 0 to max(10, 3λcosθ)]
    #[arg(long, value_parser = parse_bounds)]
    pub d_range: Option<(f64, f64)>,

    /// Number of curve points
    #[arg(short, long, default_value_t = 400)]
    pub num: usize,

    /// Output file
    #[arg(short, long, default_value = "ratio_vs_thickness.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub figure: FigureArgs,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,
}

#[derive(Args, Debug)]
pub struct PlotAngleArgs {
    #[command(flatten)]
    pub input: AngleDataArgs,

    /// Thickness for the model curve (nm); fitted from the data if omitted
    #[arg(short = 'd', long)]
    pub thickness: Option<f64>,

    /// Output file
    #[arg(short, long, default_value = "ratio_vs_angle.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub figure: FigureArgs,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,
}
