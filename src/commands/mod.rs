//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `xps/`, `batch/`, `utils/`
//! - 子模块: area, fit, spectrum, plot

pub mod area;
pub mod fit;
pub mod plot;
pub mod spectrum;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Area(args) => area::execute(args),
        Commands::Fit(args) => fit::execute(args),
        Commands::Spectrum(args) => spectrum::execute(args),
        Commands::Plot(args) => plot::execute(args),
    }
}
