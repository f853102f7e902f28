//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `area`: 谱图能量窗口内的峰面积
//! - `fit`: 厚度反演（嵌套子命令）
//!   - `ratio`: 由测得比值
//!   - `areas`: 由两个峰面积
//!   - `multi`: 多角度联合拟合
//! - `spectrum`: 谱文件到厚度的完整流程（支持目录批量）
//! - `plot`: 模型曲线图表（嵌套子命令）
//!   - `thickness`: R(d)
//!   - `angle`: R(θ)
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: area, fit, spectrum, plot
//! - 本文件定义各命令共享的参数组

pub mod area;
pub mod fit;
pub mod plot;
pub mod spectrum;

use crate::error::{XpsError, Result};
use crate::models::{AttenuationParams, EnergyWindow};
use crate::parsers::LoadOptions;
use crate::xps::{ShirleyConfig, SolverConfig};

use clap::{Args, Parser, Subcommand};

/// xpsthick - XPS 覆盖层厚度估算工具
#[derive(Parser)]
#[command(name = "xpsthick")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Estimate overlayer thickness from XPS intensity data", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Integrate background-subtracted peak areas in energy windows
    Area(area::AreaArgs),

    /// Fit overlayer thickness from ratios, areas or multi-angle data
    Fit(fit::FitArgs),

    /// Full pipeline: spectrum file(s) -> peak areas -> thickness
    Spectrum(spectrum::SpectrumArgs),

    /// Plot or export model ratio curves
    Plot(plot::PlotArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数组
// ─────────────────────────────────────────────────────────────

/// 材料参数（每项都可由 XPSTHICK_* 环境变量提供）
#[derive(Args, Debug, Clone)]
pub struct MaterialArgs {
    /// Overlayer sensitivity factor
    #[arg(long, env = "XPSTHICK_S_OVER")]
    pub s_over: f64,

    /// Overlayer relative density
    #[arg(long, env = "XPSTHICK_N_OVER")]
    pub n_over: f64,

    /// IMFP of the overlayer signal in the overlayer (nm)
    #[arg(long, env = "XPSTHICK_LAM_OVER")]
    pub lam_over: f64,

    /// Substrate sensitivity factor
    #[arg(long, env = "XPSTHICK_S_SUB")]
    pub s_sub: f64,

    /// Substrate relative density
    #[arg(long, env = "XPSTHICK_N_SUB")]
    pub n_sub: f64,

    /// IMFP of the substrate signal through the overlayer (nm)
    #[arg(long, env = "XPSTHICK_LAM_SUB_IN_OVER")]
    pub lam_sub_in_over: f64,

    /// Source intensity normalization for the overlayer line
    #[arg(long, env = "XPSTHICK_I0_OVER", default_value_t = 1.0)]
    pub i0_over: f64,

    /// Source intensity normalization for the substrate line
    #[arg(long, env = "XPSTHICK_I0_SUB", default_value_t = 1.0)]
    pub i0_sub: f64,
}

impl MaterialArgs {
    /// 构造参数集并检查所有常数为正
    pub fn to_params(&self) -> Result<AttenuationParams> {
        let params = AttenuationParams::new(
            self.s_over,
            self.n_over,
            self.lam_over,
            self.s_sub,
            self.n_sub,
            self.lam_sub_in_over,
        )
        .with_source_intensities(self.i0_over, self.i0_sub);

        let bad = params.non_positive_fields();
        if !bad.is_empty() {
            return Err(XpsError::InvalidArgument(format!(
                "material parameters must be positive: {}",
                bad.join(", ")
            )));
        }
        Ok(params)
    }
}

/// 反演参数
#[derive(Args, Debug, Clone)]
pub struct FitOptions {
    /// Initial thickness guess (nm)
    #[arg(long, default_value_t = 2.0)]
    pub d0: f64,

    /// Thickness search bounds "LO:HI" (nm)
    #[arg(long, default_value = "0:50", value_parser = parse_bounds)]
    pub bounds: (f64, f64),

    /// Maximum solver iterations
    #[arg(long, default_value_t = 100)]
    pub max_iter: usize,
}

impl FitOptions {
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            max_iterations: self.max_iter,
            ..SolverConfig::default()
        }
    }
}

/// 谱文件读取参数
#[derive(Args, Debug, Clone)]
pub struct LoaderArgs {
    /// Energy column (header name or 0-based index; auto-detected if omitted)
    #[arg(long)]
    pub energy_col: Option<String>,

    /// Intensity column (header name or 0-based index; auto-detected if omitted)
    #[arg(long)]
    pub intensity_col: Option<String>,

    /// Number of leading lines to skip
    #[arg(long, default_value_t = 0)]
    pub skip_rows: usize,

    /// Field delimiter (",", ";", "tab"); auto-detected if omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

impl LoaderArgs {
    pub fn to_options(&self) -> LoadOptions {
        LoadOptions {
            energy_col: self.energy_col.clone(),
            intensity_col: self.intensity_col.clone(),
            skip_rows: self.skip_rows,
            delimiter: self.delimiter,
        }
    }
}

/// Shirley 背景迭代参数
#[derive(Args, Debug, Clone)]
pub struct ShirleyArgs {
    /// Maximum Shirley background iterations
    #[arg(long, default_value_t = 200)]
    pub shirley_max_iter: usize,

    /// Shirley convergence tolerance (max absolute background change)
    #[arg(long, default_value_t = 1e-6)]
    pub shirley_tol: f64,
}

impl ShirleyArgs {
    pub fn to_config(&self) -> ShirleyConfig {
        ShirleyConfig {
            max_iter: self.shirley_max_iter,
            tol: self.shirley_tol,
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 参数解析函数
// ─────────────────────────────────────────────────────────────

/// 解析 "LO:HI" 形式的范围
pub fn parse_bounds(input: &str) -> std::result::Result<(f64, f64), String> {
    let parts: Vec<&str> = input.split(':').map(|s| s.trim()).collect();
    if parts.len() != 2 {
        return Err(format!("expected LO:HI, got '{}'", input));
    }
    let lo: f64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid lower value '{}'", parts[0]))?;
    let hi: f64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid upper value '{}'", parts[1]))?;
    Ok((lo, hi))
}

/// 解析能量窗口
pub fn parse_window(input: &str) -> std::result::Result<EnergyWindow, String> {
    input.parse::<EnergyWindow>().map_err(|e| e.to_string())
}

/// 解析分隔符
pub fn parse_delimiter(input: &str) -> std::result::Result<u8, String> {
    match input {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "space" => Ok(b' '),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        s => Err(format!(
            "delimiter must be a single ASCII character or 'tab', got '{}'",
            s
        )),
    }
}
