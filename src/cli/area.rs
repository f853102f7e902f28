//! # area 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/area.rs`

use super::{parse_window, LoaderArgs, ShirleyArgs};
use crate::models::EnergyWindow;
use crate::xps::Background;

use clap::Args;
use std::path::PathBuf;

/// area 子命令参数
#[derive(Args, Debug)]
pub struct AreaArgs {
    /// Spectrum file (CSV/TXT with energy and intensity columns)
    pub input: PathBuf,

    /// Energy window "LOW:HIGH" in eV (repeat for several peaks)
    #[arg(short, long, required = true, value_parser = parse_window)]
    pub window: Vec<EnergyWindow>,

    /// Background model subtracted before integration
    #[arg(short, long, value_enum, default_value = "linear")]
    pub background: Background,

    #[command(flatten)]
    pub shirley: ShirleyArgs,

    #[command(flatten)]
    pub loader: LoaderArgs,
}
