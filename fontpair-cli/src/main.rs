//! Score font pairings from the command line.
//!
//! Results and errors are written to stdout. Exit status is 0 on success, 1
//! when a font cannot be analyzed, 2 when fewer than two fonts are given and
//! 3 when the configuration file cannot be read, parsed or validated.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use fontpair::{
    AnalysisRequest, CompatibilityReport, DeclaredMetrics, ErrorBody, FontData, FontMetrics,
    GlyphSource, Params, RequestError,
};
use serde::Serialize;

mod config;

#[derive(clap::Parser, Debug)]
#[command(version, about = "Measure fonts and score how well they pair.")]
struct Args {
    /// TOML file overriding analysis parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Output format for results.
#[derive(clap::ValueEnum, Copy, Clone, Default, Debug, PartialEq, Eq)]
enum Format {
    #[default]
    Json,
    Text,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Score a pair or a triple of fonts
    Analyze {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: Format,
        /// Pretty print JSON output
        #[arg(long)]
        pretty: bool,
        /// Font files in the order A, B and optionally C
        fonts: Vec<PathBuf>,
    },
    /// Print the measured and declared metrics of each font
    Metrics {
        /// Pretty print JSON output
        #[arg(long)]
        pretty: bool,
        /// Font files to measure (may use glob syntax)
        files: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsRecord<'a> {
    path: &'a Path,
    metrics: FontMetrics,
    declared: DeclaredMetrics,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    use clap::Parser as _;
    let args = Args::parse_from(wild::args());

    let (format, pretty) = match &args.command {
        Command::Analyze { format, pretty, .. } => (*format, *pretty),
        Command::Metrics { pretty, .. } => (Format::Json, *pretty),
    };
    let params = match args.config.as_deref().map(config::load).transpose() {
        Ok(params) => params.unwrap_or_default(),
        Err(e) => {
            print_error(&e, format, pretty);
            return ExitCode::from(3);
        }
    };

    match args.command {
        Command::Analyze {
            format,
            pretty,
            fonts,
        } => analyze(&fonts, &params, format, pretty),
        Command::Metrics { pretty, files } => metrics(&files, &params, pretty),
    }
}

fn analyze(paths: &[PathBuf], params: &Params, format: Format, pretty: bool) -> ExitCode {
    if paths.len() > 3 {
        log::warn!("only the first three fonts are analyzed");
    }
    let result = paths
        .iter()
        .take(3)
        .map(FontData::open)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RequestError::Analysis(e.into()))
        .and_then(|fonts| AnalysisRequest::from_fonts(fonts).analyze(params));
    match (result, format) {
        (Ok(report), Format::Json) => {
            print_json(&report, pretty);
            ExitCode::SUCCESS
        }
        (Ok(report), Format::Text) => {
            print_report(paths, &report);
            ExitCode::SUCCESS
        }
        (Err(e), format) => {
            log::debug!("analysis failed with status {}", e.status());
            print_error(&e, format, pretty);
            exit_code(&e)
        }
    }
}

fn metrics(paths: &[PathBuf], params: &Params, pretty: bool) -> ExitCode {
    let mut code = ExitCode::SUCCESS;
    for path in paths {
        let record = FontData::open(path).and_then(|data| {
            let font = data.load()?;
            Ok((
                FontMetrics::extract(&font, params),
                font.declared_metrics(params.extraction.font_size),
            ))
        });
        match record {
            Ok((Ok(metrics), declared)) => print_json(
                &MetricsRecord {
                    path,
                    metrics,
                    declared,
                },
                pretty,
            ),
            Ok((Err(e), _)) => {
                log::error!("{}: {e}", path.display());
                code = ExitCode::FAILURE;
            }
            Err(e) => {
                log::error!("{}: {e}", path.display());
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}

fn exit_code(error: &RequestError) -> ExitCode {
    if error.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn print_error(error: &impl std::fmt::Display, format: Format, pretty: bool) {
    match format {
        Format::Json => print_json(
            &ErrorBody {
                error: error.to_string(),
            },
            pretty,
        ),
        Format::Text => println!("error: {error}"),
    }
}

#[allow(clippy::explicit_write)]
fn print_json(value: &impl Serialize, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let text = text.unwrap_or_else(|e| {
        serde_json::json!({ "error": e.to_string() }).to_string()
    });
    writeln!(std::io::stdout(), "{text}").unwrap();
}

#[allow(clippy::explicit_write)]
fn print_report(paths: &[PathBuf], report: &CompatibilityReport) {
    let mut out = std::io::stdout().lock();
    for (label, (path, font)) in ["A", "B", "C"].iter().zip(paths.iter().zip(report.fonts())) {
        let contrast = font
            .stroke_contrast()
            .map(|contrast| format!("{contrast:.3}"))
            .unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "[{label}] {}\n    x-height {:.3}  cap-height {:.3}  contrast {contrast}  width {:.3}",
            path.display(),
            font.x_height(),
            font.cap_height(),
            font.avg_char_width(),
        )
        .unwrap();
    }
    if let CompatibilityReport::Trio(trio) = report {
        let scores = &trio.compatibility_scores;
        writeln!(
            out,
            "AB {:.3}  AC {:.3}  BC {:.3}",
            scores.ab, scores.ac, scores.bc
        )
        .unwrap();
        writeln!(
            out,
            "triangle area {:.4}  perimeter {:.4}",
            trio.triangle_method.area, trio.triangle_method.perimeter
        )
        .unwrap();
    }
    writeln!(out, "score {:.2} ({})", report.score(), report.grade()).unwrap();
}
