use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use log::info;
use speedline::{
    process_gpx, JsonRenderer, KmlRenderer, OverlayRenderer, RatioMode, Result, SpeedlineConfig,
    SpeedlineError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Color a GPX track by segment speed", long_about = None)]
struct Cli {
    /// GPX file to read (`-` or omitted for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output path (omitted for stdout)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatOpt::Kml)]
    format: FormatOpt,

    /// JSON file with pipeline settings; flags below override it
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Distance from a segment's first point that closes the segment (meters)
    #[arg(long)]
    threshold_meters: Option<f64>,

    /// Percentile of pairwise speeds drawn pure red
    #[arg(long)]
    low_percentile: Option<f64>,

    /// Percentile of pairwise speeds drawn pure green
    #[arg(long)]
    high_percentile: Option<f64>,

    /// How speeds are placed on the gradient
    #[arg(long, value_enum)]
    ratio_mode: Option<RatioModeOpt>,

    /// UTC offset for label start times, in minutes
    #[arg(long, allow_negative_numbers = true)]
    display_offset_minutes: Option<i32>,

    /// Document name written into the KML output
    #[arg(long, default_value = "Speedline")]
    name: String,

    /// Pretty-print JSON output
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatOpt {
    Kml,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RatioModeOpt {
    MinMax,
    FixedDenominator,
}

impl From<RatioModeOpt> for RatioMode {
    fn from(opt: RatioModeOpt) -> Self {
        match opt {
            RatioModeOpt::MinMax => RatioMode::MinMax,
            RatioModeOpt::FixedDenominator => RatioMode::FixedDenominator,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .try_init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("speedline: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let xml = read_input(cli.input.as_deref())?;

    let report = process_gpx(&xml, &config)?;

    let document = match cli.format {
        FormatOpt::Kml => KmlRenderer {
            document_name: cli.name.clone(),
            ..Default::default()
        }
        .render(&report)?,
        FormatOpt::Json => JsonRenderer { pretty: cli.pretty }.render(&report)?,
    };

    write_output(cli.output.as_deref(), &document)?;
    info!("[CLI] Wrote {} segments", report.segments.len());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SpeedlineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|e| SpeedlineError::ConfigError {
                message: format!("{}: {}", path.display(), e),
            })?
        }
        None => SpeedlineConfig::default(),
    };

    if let Some(threshold) = cli.threshold_meters {
        config.segment_threshold_meters = threshold;
    }
    if let Some(low) = cli.low_percentile {
        config.low_percentile = low;
    }
    if let Some(high) = cli.high_percentile {
        config.high_percentile = high;
    }
    if let Some(mode) = cli.ratio_mode {
        config.ratio_mode = mode.into();
    }
    if let Some(offset) = cli.display_offset_minutes {
        config.display_offset_minutes = offset;
    }

    config.validate()?;
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(fs::read_to_string(p)?),
        _ => {
            let mut xml = String::new();
            io::stdin().read_to_string(&mut xml)?;
            Ok(xml)
        }
    }
}

fn write_output(path: Option<&Path>, document: &str) -> Result<()> {
    match path {
        Some(p) => fs::write(p, document)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "speedline",
            "--threshold-meters",
            "100",
            "--ratio-mode",
            "fixed-denominator",
            "--display-offset-minutes",
            "-360",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.segment_threshold_meters, 100.0);
        assert_eq!(config.ratio_mode, RatioMode::FixedDenominator);
        assert_eq!(config.display_offset_minutes, -360);
        assert_eq!(config.low_percentile, 10.0);
    }

    #[test]
    fn test_invalid_flags_fail_validation() {
        let cli = Cli::parse_from(["speedline", "--low-percentile", "150"]);
        assert!(matches!(
            load_config(&cli),
            Err(SpeedlineError::ConfigError { .. })
        ));
    }
}
