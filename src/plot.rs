use std::path::Path;

use plotters::prelude::*;

use crate::error::PlotError;

const SIZE: (u32, u32) = (800, 600);

/// Renders the per-iteration training loss as an SVG line chart.
pub fn plot_losses(losses: &[f64], path: &Path) -> Result<(), PlotError> {
    if losses.is_empty() {
        return Err(PlotError::NoData);
    }

    let draw_error = |err: &dyn std::fmt::Display| PlotError::Draw {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let (min, max) = losses
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &loss| {
            (min.min(loss), max.max(loss))
        });
    let padding = ((max - min) * 0.05).max(1e-9);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|err| draw_error(&err))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("training loss", ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..losses.len(), (min - padding)..(max + padding))
        .map_err(|err| draw_error(&err))?;

    chart
        .configure_mesh()
        .x_desc("iteration")
        .y_desc("loss per sample")
        .draw()
        .map_err(|err| draw_error(&err))?;

    chart
        .draw_series(LineSeries::new(
            losses.iter().copied().enumerate(),
            &BLUE,
        ))
        .map_err(|err| draw_error(&err))?;

    root.present().map_err(|err| draw_error(&err))?;

    tracing::info!("wrote loss curve to {}", path.display());
    Ok(())
}
