use colored::Colorize;

use crate::color::Rgb;
use crate::config::HeatmapConfig;
use crate::render::RenderModel;

/// One terminal line per legend range: a palette swatch, the range, and how
/// many cells the current render put in that bucket.
pub fn legend_lines<C>(model: &RenderModel<C>, config: &HeatmapConfig) -> Vec<String> {
    model
        .legend
        .iter()
        .map(|swatch| {
            let bucket = swatch.entry.bucket_index;
            let color = config.palette.get(bucket).copied().unwrap_or(Rgb::new(0, 0, 0));
            let cells = model.cells.iter().filter(|cell| cell.bucket == bucket).count();
            format!(
                "{} {:>15} {:>6} cells",
                "    ".on_truecolor(color.r, color.g, color.b),
                swatch.label,
                cells
            )
        })
        .collect()
}

pub fn print_legend<C>(model: &RenderModel<C>, config: &HeatmapConfig) {
    println!(
        "{}",
        format!(
            "Resolution {} | {} cells | center {:.4}, {:.4}",
            model.resolution,
            model.cells.len(),
            model.view.center.latitude,
            model.view.center.longitude
        )
        .bold()
    );
    for line in legend_lines(model, config) {
        println!("{}", line);
    }
}
