//! # xpsthick - XPS 覆盖层厚度估算工具
//!
//! 由 X 射线光电子能谱峰强度，通过衰减模型反演衬底上薄覆盖层的厚度。
//!
//! ## 子命令
//! - `area`     - 能量窗口内的背景扣除与峰面积积分
//! - `fit`      - 厚度反演
//!   - `ratio`  - 由强度比
//!   - `areas`  - 由两个峰面积
//!   - `multi`  - 多角度联合拟合
//! - `spectrum` - 谱文件到厚度的完整流程（支持目录批量）
//! - `plot`     - 模型曲线图表与数据导出
//!
//! ## 依赖关系
//! ```text
//! main.rs → lib.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (谱文件与角度表解析)
//!   │     ├── xps/       (峰面积、正演模型、反演、图表、导出)
//!   │     ├── batch/     (批量并行处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

use clap::Parser;
use xpsthick::cli::Cli;
use xpsthick::{commands, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
