//! # spectrum 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/spectrum.rs`

use super::{parse_window, FitOptions, LoaderArgs, MaterialArgs, ShirleyArgs};
use crate::models::EnergyWindow;
use crate::xps::Background;

use clap::Args;
use std::path::PathBuf;

/// spectrum 子命令参数
#[derive(Args, Debug)]
pub struct SpectrumArgs {
    /// Input: spectrum file or directory containing spectrum files
    pub input: PathBuf,

    /// Overlayer peak window "LOW:HIGH" (eV)
    #[arg(long, value_parser = parse_window)]
    pub over_window: EnergyWindow,

    /// Substrate peak window "LOW:HIGH" (eV)
    #[arg(long, value_parser = parse_window)]
    pub sub_window: EnergyWindow,

    /// Take-off angle from the surface normal (degrees)
    #[arg(short, long, default_value_t = 0.0)]
    pub theta: f64,

    /// Background model subtracted before integration
    #[arg(short, long, value_enum, default_value = "linear")]
    pub background: Background,

    #[command(flatten)]
    pub shirley: ShirleyArgs,

    #[command(flatten)]
    pub loader: LoaderArgs,

    #[command(flatten)]
    pub material: MaterialArgs,

    #[command(flatten)]
    pub fit: FitOptions,

    /// Results CSV (batch mode default: thickness_results.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for input files (batch mode, e.g., "*.csv,*.txt")
    #[arg(long, default_value = "*.csv,*.txt,*.dat")]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,
}
