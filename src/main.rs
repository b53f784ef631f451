//! kindle2pdf - e-reader screen capture to PDF converter
//!
//! CLI entry point

use clap::Parser;
use indicatif::ProgressBar;
use kindle2pdf::{
    create_capture_progress_bar, format_duration, format_file_size, Cli, Config,
    ConversionPipeline, DesktopAutomation, ExitCode, PipelineError, ProgressCallback, RunOptions,
    SilentProgress,
};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();

    std::process::exit(match run(&cli) {
        Ok(()) => ExitCode::Success.code(),
        Err(code) => code.code(),
    });
}

// ============ Progress Callback Implementation ============

/// Verbose progress callback for CLI output
struct VerboseProgress {
    verbose_level: u8,
    page_bar: ProgressBar,
}

impl VerboseProgress {
    fn new(verbose_level: u8, page_limit: usize) -> Self {
        Self {
            verbose_level,
            page_bar: create_capture_progress_bar(page_limit as u64),
        }
    }
}

impl ProgressCallback for VerboseProgress {
    fn on_step_start(&self, step: &str) {
        println!("  {}", step);
    }

    fn on_step_progress(&self, current: usize, total: usize) {
        self.page_bar.set_length(total as u64);
        self.page_bar.set_position(current as u64);
    }

    fn on_step_complete(&self, step: &str, message: &str) {
        if self.page_bar.position() > 0 && !self.page_bar.is_finished() {
            self.page_bar.finish_and_clear();
        }
        println!("    {}: {}", step, message);
    }

    fn on_debug(&self, message: &str) {
        if self.verbose_level > 0 {
            println!("    [DEBUG] {}", message);
        }
    }
}

// ============ Conversion ============

fn run(cli: &Cli) -> Result<(), ExitCode> {
    // Load config file if specified, otherwise search the working
    // directory; CLI mode flags are applied on top.
    let file_config = match &cli.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    };

    let mut config = file_config.resolve();
    if cli.comic {
        config = config.for_dark_pages();
    }
    let page_limit = config.page_limit;

    let mut driver = match DesktopAutomation::new() {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::GeneralError);
        }
    };

    let run_options = RunOptions {
        book_name: cli.name.clone(),
        spread: cli.comic,
        turn_from_right: cli.right,
    };

    let pipeline = ConversionPipeline::new(config);
    let result = if cli.quiet {
        pipeline.run_with_progress(&mut driver, &run_options, &SilentProgress)
    } else {
        let progress = VerboseProgress::new(cli.verbose, page_limit);
        pipeline.run_with_progress(&mut driver, &run_options, &progress)
    };

    match result {
        Ok(result) => {
            if !cli.quiet {
                println!(
                    "Done: {} ({} pages, {}, {})",
                    result.output_path.display(),
                    result.page_count,
                    format_file_size(result.output_size),
                    format_duration(Duration::from_secs_f64(result.elapsed_seconds)),
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(exit_code_for(&e))
        }
    }
}

fn exit_code_for(error: &PipelineError) -> ExitCode {
    match error {
        PipelineError::WindowNotFound(_) => ExitCode::WindowNotFound,
        PipelineError::Automation(_) => ExitCode::GeneralError,
        PipelineError::Capture(_) => ExitCode::ProcessingError,
        PipelineError::Geometry(_) => ExitCode::ProcessingError,
        PipelineError::PdfGeneration(_) => ExitCode::ProcessingError,
        PipelineError::Io(_) => ExitCode::OutputError,
    }
}
