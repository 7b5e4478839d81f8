use crate::error::PlotError;
use crate::layout::{clipped_points, format_megabases, step_points, unify_limits, TrackLimits};
use crate::series::{load_sample, GcWindow, Metric, SampleSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::ops::Range;

// Set1, desaturated
const PALETTE: [RGBColor; 4] = [
    RGBColor(200, 45, 47),
    RGBColor(66, 118, 161),
    RGBColor(85, 157, 82),
    RGBColor(141, 86, 148),
];
const DEPTH_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Canvas and data options for one plotting run.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    /// Pixel height given to each sample (upper plus lower row).
    pub track_height: u32,
    pub gc: GcWindow,
}

/// Span of all plotted positions; files that change chromosome can step backwards.
fn x_range(series: &SampleSeries) -> Range<u32> {
    let lo = series.xs.iter().copied().min().unwrap_or(0);
    let hi = series.xs.iter().copied().max().unwrap_or(lo);
    if hi > lo {
        lo..hi
    } else if lo == u32::MAX {
        lo - 1..lo
    } else {
        lo..lo + 1
    }
}

fn canvas_height(track_height: u32, n_samples: usize) -> Result<u32, PlotError> {
    u32::try_from(n_samples)
        .ok()
        .and_then(|n| track_height.checked_mul(n))
        .ok_or_else(|| {
            PlotError::InvalidArgument(format!(
                "Image too tall: {} samples x {} px per sample",
                n_samples, track_height
            ))
        })
}

/// Load every input, share y scales across them and write the stacked plot.
pub fn plot_coverage(
    inputs: &[String],
    output: &str,
    config: &PlotConfig,
    logger: &mut crate::Logger,
) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();

    logger.log("=== bigly-plot Log ===")?;
    logger.log(&format!("Software Version: v{}", crate::VERSION))?;
    logger.log(&format!(
        "Runtime: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    ))?;
    for input in inputs {
        logger.log(&format!("Input File: {}", input))?;
    }
    logger.log(&format!("Output Image: {}", output))?;
    logger.log(&format!("GC Window: {:?}", config.gc))?;

    println!("[Loading data]");
    for input in inputs {
        println!("    {}", input);
    }
    println!();

    let mut samples = Vec::with_capacity(inputs.len());
    for input in inputs {
        samples.push(load_sample(input, config.gc, logger)?);
    }

    let mut limits: Vec<TrackLimits> = samples.iter().map(TrackLimits::for_series).collect();
    unify_limits(&mut limits);

    println!("[Params]");
    println!("    Samples: {}.", samples.len());
    let size = (config.width, canvas_height(config.track_height, samples.len())?);
    println!("    Canvas: {} x {} px.", size.0, size.1);
    println!("    Depth axis: 0 - {:.1}.", limits[0].depth_top);
    println!();
    logger.log(&format!("Unified limits: {:?}", limits[0]))?;

    if output.to_lowercase().ends_with(".svg") {
        let root = SVGBackend::new(output, size).into_drawing_area();
        draw_tracks(&root, &samples, &limits)?;
    } else {
        let root = BitMapBackend::new(output, size).into_drawing_area();
        draw_tracks(&root, &samples, &limits)?;
    }

    let elapsed = start_time.elapsed();
    println!("[Outputs]");
    println!("    plot: {}", output);
    println!("{}", crate::progress::format_time_used(elapsed));

    logger.log(&format!("Plot written: {}", output))?;
    logger.log(&format!("Total time: {:.2}s", elapsed.as_secs_f64()))?;
    Ok(())
}

fn draw_tracks<DB>(
    root: &DrawingArea<DB, Shift>,
    samples: &[SampleSeries],
    limits: &[TrackLimits],
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let tracks = root.split_evenly((samples.len(), 1));
    for (area, (series, lim)) in tracks.iter().zip(samples.iter().zip(limits)) {
        let rows = area.split_evenly((2, 1));
        draw_coverage_row(&rows[0], series, lim)?;
        draw_discordant_row(&rows[1], series, lim)?;
    }

    root.present()?;
    Ok(())
}

/// Depth area, splitter steps and inverted soft-clip bars.
fn draw_coverage_row<DB>(
    area: &DrawingArea<DB, Shift>,
    series: &SampleSeries,
    lim: &TrackLimits,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let xs = x_range(series);
    let soft_bars = series.soft_clip_bars();
    let soft_floor = lim.soft_floor.unwrap_or(-1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(&series.name, ("sans-serif", 18))
        .margin(5)
        .x_label_area_size(25)
        .y_label_area_size(50)
        .right_y_label_area_size(if soft_bars.is_empty() { 0 } else { 50 })
        .build_cartesian_2d(xs.clone(), 0.0..lim.depth_top)?
        .set_secondary_coord(xs, soft_floor..0.0);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_desc("depth")
        .draw()?;

    let depth = clipped_points(&series.xs, series.values(Metric::Depth), lim.depth_top);
    chart
        .draw_series(AreaSeries::new(depth, 0.0, DEPTH_COLOR.mix(0.5)))?
        .label("depth")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], DEPTH_COLOR.mix(0.5).filled()));

    let splitters: Vec<f64> = series
        .values(Metric::Splitters)
        .iter()
        .map(|&v| v.min(lim.depth_top))
        .collect();
    chart
        .draw_series(LineSeries::new(
            step_points(&series.xs, &splitters),
            BLACK.stroke_width(1),
        ))?
        .label("splitters")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], BLACK));

    if !soft_bars.is_empty() {
        chart
            .configure_secondary_axes()
            .y_desc("soft-clips")
            .y_label_formatter(&|y| format!("{:.0}", -y))
            .draw()?;

        let style = PALETTE[2].stroke_width(3);
        chart
            .draw_secondary_series(soft_bars.iter().map(move |&(x, s)| {
                PathElement::new(vec![(x, 0.0), (x, (-s).max(soft_floor))], style)
            }))?
            .label("soft-clips")
            .legend(move |(x, y)| PathElement::new(vec![(x, y - 5), (x, y + 5)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Discordant markers on the left axis, insert sizes on the right.
fn draw_discordant_row<DB>(
    area: &DrawingArea<DB, Shift>,
    series: &SampleSeries,
    lim: &TrackLimits,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let xs = x_range(series);

    let mut chart = ChartBuilder::on(area)
        .margin(5)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .right_y_label_area_size(50)
        .build_cartesian_2d(xs.clone(), 0.0..lim.lower_top)?
        .set_secondary_coord(xs, lim.insert_bottom..lim.insert_top);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_formatter(&|x| format_megabases(*x as f64))
        .y_desc("discordant")
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("insert size")
        .draw()?;

    let markers = |metric: Metric| -> Vec<(u32, f64)> {
        series
            .xs
            .iter()
            .zip(series.values(metric))
            .filter(|(_, v)| **v != 0.0)
            .map(|(&x, &v)| (x, v))
            .collect()
    };

    for (metric, label, color) in [
        (Metric::Discordant, "discordant", PALETTE[1]),
        (Metric::DiscChrom, "discordant chromosome", PALETTE[2]),
    ] {
        chart
            .draw_series(
                markers(metric)
                    .into_iter()
                    .map(move |(x, y)| Circle::new((x, y.min(lim.lower_top)), 2, color.filled())),
            )?
            .label(label)
            .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
    }

    for (metric, label, color) in [
        (Metric::Inserts1, "insert-size-left", PALETTE[0]),
        (Metric::Inserts2, "insert-size-right", PALETTE[3]),
    ] {
        chart
            .draw_secondary_series(
                markers(metric)
                    .into_iter()
                    .map(move |(x, y)| Circle::new((x, y), 2, color.mix(0.65).filled())),
            )?
            .label(label)
            .legend(move |(x, y)| Circle::new((x, y), 3, color.mix(0.65).filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
