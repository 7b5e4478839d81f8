// Version information constants
const VERSION: &str = env!("CARGO_PKG_VERSION");

use clap::Parser;
use std::error::Error;
use std::io::{BufWriter, Write};
use std::path::Path;

mod error;
mod layout;
mod plot;
mod progress;
mod record;
mod series;

use error::PlotError;
use series::GcWindow;

/// Largest accepted width or per-sample height, in pixels.
const MAX_DIMENSION: u32 = 20_000;

/// Image written when no output path is given.
const DEFAULT_OUTPUT: &str = "bigly-plot.png";

/// Logger manager supporting dynamic progress display and detailed logging
pub struct Logger {
    writer: BufWriter<std::fs::File>,
    last_progress: String,
}

impl Logger {
    pub fn new(file: std::fs::File) -> Self {
        Self {
            writer: BufWriter::new(file),
            last_progress: String::new(),
        }
    }

    /// Record detailed log information
    pub fn log(&mut self, message: &str) -> std::io::Result<()> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.writer, "[{}] {}", timestamp, message)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Display dynamic progress information (overwrite previous line)
    pub fn progress(&mut self, message: &str) -> std::io::Result<()> {
        if !self.last_progress.is_empty() {
            print!("\r{}", " ".repeat(self.last_progress.len()));
        }
        print!("\r{}", message);
        std::io::stdout().flush()?;

        self.last_progress = message.to_string();
        Ok(())
    }

    /// Finish progress display
    pub fn finish_progress(&mut self) -> std::io::Result<()> {
        if !self.last_progress.is_empty() {
            println!();
            self.last_progress.clear();
        }
        Ok(())
    }
}

/// Stacked depth / discordance plots from bigly per-base output
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// bigly output file(s), plain text or .gz
    #[arg(required = true)]
    pub bigly: Vec<String>,
    /// Output image path (.png, or .svg for vector output); defaults to bigly-plot.png
    #[arg(short = 'p', long = "png")]
    pub png: Option<String>,
    /// GC-content window to collect
    #[arg(long = "gc", value_enum, default_value_t = GcWindow::Gc257)]
    pub gc: GcWindow,
    /// Image width in pixels
    #[arg(long = "width", default_value_t = 900)]
    pub width: u32,
    /// Image height per sample in pixels
    #[arg(long = "track-height", default_value_t = 500)]
    pub track_height: u32,
    /// Log file path (optional)
    #[arg(short = 'l', long = "log")]
    pub log: Option<String>,
}

fn validate_plot_args(args: &Cli) -> Result<(), PlotError> {
    for input in &args.bigly {
        if input.trim().is_empty() {
            return Err(PlotError::InvalidArgument(
                "Input file path cannot be empty".to_string(),
            ));
        }
        if !Path::new(input).exists() {
            return Err(PlotError::InvalidArgument(format!(
                "Input file does not exist: {}",
                input
            )));
        }
    }
    if let Some(png) = &args.png {
        if png.trim().is_empty() {
            return Err(PlotError::InvalidArgument(
                "Output image path cannot be empty".to_string(),
            ));
        }
    }
    if args.width < 100 || args.track_height < 100 {
        return Err(PlotError::InvalidArgument(format!(
            "Image dimensions must be at least 100 px, current: {} x {}",
            args.width, args.track_height
        )));
    }
    if args.width > MAX_DIMENSION || args.track_height > MAX_DIMENSION {
        return Err(PlotError::InvalidArgument(format!(
            "Image dimensions must be at most {} px, current: {} x {}",
            MAX_DIMENSION, args.width, args.track_height
        )));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    validate_plot_args(&cli)?;

    let log_file = if let Some(log_path) = &cli.log {
        std::fs::File::create(log_path)?
    } else {
        std::fs::File::create("bigly-plot.log")?
    };
    let mut logger = Logger::new(log_file);

    let output = cli.png.clone().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if cli.png.is_none() {
        logger.log(&format!("No output path given, writing {}", DEFAULT_OUTPUT))?;
    }

    let config = plot::PlotConfig {
        width: cli.width,
        track_height: cli.track_height,
        gc: cli.gc,
    };

    let result = plot::plot_coverage(&cli.bigly, &output, &config, &mut logger);
    if let Err(e) = &result {
        logger.log(&format!("Plotting failed: {}", e))?;
    }
    result
}
