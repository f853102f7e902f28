//! # 美化输出工具
//!
//! 提供统一的终端输出样式。没有日志框架，所有进度与诊断信息都经由这里输出。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块及 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::fmt::Display;

/// 标题栏与分隔线宽度
const RULE_WIDTH: usize = 60;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印结果键值对
pub fn print_result(label: &str, value: &str) {
    println!("  {:<22} {}", label.dimmed(), value.bold());
}

/// 打印反演得到的厚度；未收敛时以警告形式给出最优估计
pub fn print_thickness(success: bool, d: f64, status: impl Display) {
    if success {
        println!(
            "{} Fitted thickness: {} ({})",
            "[OK]".green().bold(),
            format!("{:.4} nm", d).cyan().bold(),
            status
        );
    } else {
        print_warning(&format!(
            "Solver did not converge ({}); best estimate {:.4} nm",
            status, d
        ));
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(RULE_WIDTH);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(RULE_WIDTH).dimmed());
}
