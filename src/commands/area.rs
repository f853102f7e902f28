//! # area 子命令实现
//!
//! 读取谱文件，对每个能量窗口扣除背景并积分。
//!
//! ## 依赖关系
//! - 使用 `cli/area.rs` 定义的 AreaArgs
//! - 使用 `parsers/spectrum.rs` 读取谱
//! - 使用 `xps/peaks.rs` 计算面积

use crate::cli::area::AreaArgs;
use crate::error::Result;
use crate::parsers;
use crate::utils::output;
use crate::xps::peaks::{self, PeakArea};

use tabled::{Table, Tabled};

/// 执行峰面积积分
pub fn execute(args: AreaArgs) -> Result<()> {
    output::print_header("XPS Peak Area Integration");

    let spectrum = parsers::load_spectrum(&args.input, &args.loader.to_options())?;
    if let Some((lo, hi)) = spectrum.energy_range() {
        output::print_success(&format!(
            "Loaded spectrum '{}': {} points, {:.2} - {:.2} eV",
            spectrum.name,
            spectrum.len(),
            lo,
            hi
        ));
    }

    let shirley = args.shirley.to_config();
    let areas: Vec<PeakArea> = args
        .window
        .iter()
        .map(|w| {
            peaks::integrate_area_with(
                &spectrum.energy,
                &spectrum.intensity,
                *w,
                args.background,
                &shirley,
            )
        })
        .collect();

    for a in &areas {
        if a.samples < 2 {
            output::print_warning(&format!(
                "Window {} contains {} point(s); area set to 0",
                a.window, a.samples
            ));
        } else if !a.converged {
            output::print_warning(&format!(
                "Shirley background in window {} did not converge within {} iterations",
                a.window, shirley.max_iter
            ));
        }
    }

    print_area_table(&areas);

    if let [first, second] = areas.as_slice() {
        if second.area > 0.0 {
            output::print_result("Ratio (window 1 / 2)", &format!("{:.6}", first.area / second.area));
        }
    }

    Ok(())
}

/// 打印面积表格
pub(crate) fn print_area_table(areas: &[PeakArea]) {
    #[derive(Tabled)]
    struct AreaRow {
        #[tabled(rename = "Window (eV)")]
        window: String,
        #[tabled(rename = "Background")]
        background: String,
        #[tabled(rename = "Points")]
        samples: usize,
        #[tabled(rename = "Area")]
        area: String,
        #[tabled(rename = "Converged")]
        converged: String,
    }

    let rows: Vec<AreaRow> = areas
        .iter()
        .map(|a| AreaRow {
            window: a.window.to_string(),
            background: a.background.to_string(),
            samples: a.samples,
            area: format!("{:.6e}", a.area),
            converged: if a.converged { "yes" } else { "no" }.to_string(),
        })
        .collect();

    println!("{}", Table::new(&rows));
}
