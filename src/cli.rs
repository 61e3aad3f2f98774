//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::AnalysisConfig;
use crate::domain::code::{CodeNormalizer, StandardCodes, infer_kline_form};
use crate::domain::config_validation::{parse_optional_date, validate_analysis_config};
use crate::domain::error::StockMetricsError;
use crate::domain::metrics::{MetricsParams, compute_metrics_batch};
use crate::domain::panel::{build_unified_timeline, group_panel};
use crate::domain::resample::{Period, resample};
use crate::domain::returns::{MovingAverageWindows, build_returns, equal_weight_returns};
use crate::domain::signal::{Action, MomentumThresholds, momentum_signals};
use crate::domain::yearly::compute_yearly_metrics_batch;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stockmetrics",
    about = "Return, risk and momentum metrics for daily stock price panels"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Options shared by every command that reads the price panel.
#[derive(Args, Debug, Clone)]
pub struct PanelArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Panel CSV, overrides `[data] panel_path`
    #[arg(short, long)]
    pub panel: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
    pub format: ReportFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annualized return, max drawdown, Sharpe and Sortino per instrument
    Metrics(PanelArgs),
    /// Momentum BUY/SELL/HOLD signal per instrument
    Signals(PanelArgs),
    /// Daily returns with short and long moving averages
    Returns(PanelArgs),
    /// Per-year return, drawdown and daily Sharpe
    Yearly(PanelArgs),
    /// Equal-weighted daily return across all instruments
    Portfolio(PanelArgs),
    /// List the instrument codes present in the panel
    Codes(PanelArgs),
    /// Resample one instrument's daily bars to a coarser period
    Resample {
        #[arg(long)]
        code: String,
        #[arg(long)]
        period: Period,
        #[command(flatten)]
        args: PanelArgs,
    },
    /// Print both notations of an instrument code
    Code { code: String },
    /// Validate an analysis configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Table-producing analyses over the whole panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    Metrics,
    Signals,
    Returns,
    Yearly,
    Portfolio,
}

impl Analysis {
    fn name(self) -> &'static str {
        match self {
            Analysis::Metrics => "metrics",
            Analysis::Signals => "signals",
            Analysis::Returns => "returns",
            Analysis::Yearly => "yearly",
            Analysis::Portfolio => "portfolio",
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Metrics(args) => run_analysis(Analysis::Metrics, &args),
        Command::Signals(args) => run_analysis(Analysis::Signals, &args),
        Command::Returns(args) => run_analysis(Analysis::Returns, &args),
        Command::Yearly(args) => run_analysis(Analysis::Yearly, &args),
        Command::Portfolio(args) => run_analysis(Analysis::Portfolio, &args),
        Command::Codes(args) => run_codes(&args),
        Command::Resample { code, period, args } => run_resample(&code, period, &args),
        Command::Code { code } => run_code(&code),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Validates the config and resolves every analysis parameter, falling back
/// to defaults for absent keys.
pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, StockMetricsError> {
    validate_analysis_config(config)?;

    let defaults = AnalysisConfig::default();
    let path = |key: &str| {
        config
            .get_string("data", key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    };

    Ok(AnalysisConfig {
        panel_path: path("panel_path"),
        output_dir: path("output_dir"),
        start_date: parse_optional_date(config, "start_date")?,
        end_date: parse_optional_date(config, "end_date")?,
        metrics: MetricsParams {
            risk_free_rate: config.get_double(
                "metrics",
                "risk_free_rate",
                defaults.metrics.risk_free_rate,
            ),
            trading_days_per_year: config.get_double(
                "metrics",
                "trading_days_per_year",
                defaults.metrics.trading_days_per_year,
            ),
        },
        windows: MovingAverageWindows {
            short: get_count(config, "returns", "short_window", defaults.windows.short)?,
            long: get_count(config, "returns", "long_window", defaults.windows.long)?,
        },
        lookback: get_count(config, "signal", "lookback", defaults.lookback)?,
        thresholds: MomentumThresholds {
            buy: config.get_double("signal", "buy_threshold", defaults.thresholds.buy),
            sell: config.get_double("signal", "sell_threshold", defaults.thresholds.sell),
        },
    })
}

fn get_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StockMetricsError> {
    let value = config.get_int(section, key, i64::try_from(default).unwrap_or(i64::MAX));
    usize::try_from(value)
        .map_err(|_| StockMetricsError::invalid(section, key, format!("{key} must not be negative")))
}

/// Loads the config named by `--config` (or defaults), then applies the
/// `--panel` override. Returns the config with the resolved panel path.
fn resolve_config(args: &PanelArgs) -> Result<(AnalysisConfig, PathBuf), ExitCode> {
    let mut config = match &args.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = load_config(path)?;
            build_analysis_config(&adapter).map_err(|e| {
                eprintln!("error: {e}");
                ExitCode::from(&e)
            })?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(panel) = &args.panel {
        config.panel_path = Some(panel.clone());
    }
    match config.panel_path.clone() {
        Some(panel_path) => Ok((config, panel_path)),
        None => {
            let err = StockMetricsError::ConfigMissing {
                section: "data".into(),
                key: "panel_path".into(),
            };
            eprintln!("error: {err} (use --panel or set it in --config)");
            Err(ExitCode::from(&err))
        }
    }
}

fn reporter(format: ReportFormat) -> Box<dyn ReportPort> {
    match format {
        ReportFormat::Csv => Box::new(CsvReportAdapter),
        ReportFormat::Json => Box::new(JsonReportAdapter),
    }
}

/// `--output` wins; otherwise `<output_dir>/<stem>.<ext>` when an output
/// directory is configured; otherwise stdout.
pub fn resolve_output_path(
    explicit: Option<&Path>,
    output_dir: Option<&Path>,
    stem: &str,
    format: ReportFormat,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| output_dir.map(|dir| dir.join(format!("{}.{}", stem, format.extension()))))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, StockMetricsError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Renders into memory first so a failed run leaves an existing output file
/// untouched.
fn write_output<F>(path: Option<&Path>, write: F) -> Result<(), StockMetricsError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), StockMetricsError>,
{
    let mut rendered: Vec<u8> = Vec::new();
    write(&mut rendered)?;

    let mut out = open_output(path)?;
    out.write_all(&rendered)?;
    out.flush()?;
    if let Some(path) = path {
        eprintln!("Results written to: {}", path.display());
    }
    Ok(())
}

fn run_analysis(analysis: Analysis, args: &PanelArgs) -> ExitCode {
    let (config, panel_path) = match resolve_config(args) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let data_port = CsvAdapter::new(panel_path);
    let report = reporter(args.format);
    let output = resolve_output_path(
        args.output.as_deref(),
        config.output_dir.as_deref(),
        analysis.name(),
        args.format,
    );

    let result = write_output(output.as_deref(), |out| {
        run_analysis_pipeline(analysis, &data_port, report.as_ref(), &config, out)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Loads the panel through `data_port`, runs one analysis and writes its
/// table through `report`. Run summaries go to stderr.
pub fn run_analysis_pipeline(
    analysis: Analysis,
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    config: &AnalysisConfig,
    out: &mut dyn Write,
) -> Result<(), StockMetricsError> {
    let panel = data_port.fetch_panel(config.start_date, config.end_date)?;
    if panel.is_empty() {
        return Err(StockMetricsError::NoData {
            code: "panel".into(),
        });
    }

    let grouped = group_panel(&panel);
    let timeline = build_unified_timeline(&grouped);
    eprintln!(
        "Running {}: {} instruments, {} dates",
        analysis.name(),
        grouped.len(),
        timeline.len()
    );
    tracing::debug!(rows = panel.len(), analysis = analysis.name(), "panel loaded");

    match analysis {
        Analysis::Metrics => {
            let returns = build_returns(&panel, config.windows);
            let results = compute_metrics_batch(&returns, &config.metrics);
            let computable = results.iter().filter(|r| r.is_fully_computable()).count();
            eprintln!(
                "  {} of {} instruments fully computable",
                computable,
                results.len()
            );
            report.write_metrics(&results, out)
        }
        Analysis::Signals => {
            let signals = momentum_signals(&panel, config.lookback, &config.thresholds);
            let count = |action: Action| {
                signals
                    .iter()
                    .filter(|s| s.outcome.action() == Some(action))
                    .count()
            };
            eprintln!(
                "  BUY: {}  SELL: {}  HOLD: {}  insufficient data: {}",
                count(Action::Buy),
                count(Action::Sell),
                count(Action::Hold),
                signals.iter().filter(|s| s.outcome.action().is_none()).count()
            );
            report.write_signals(&signals, out)
        }
        Analysis::Returns => {
            let returns = build_returns(&panel, config.windows);
            report.write_returns(&returns, out)
        }
        Analysis::Yearly => {
            let returns = build_returns(&panel, config.windows);
            let yearly = compute_yearly_metrics_batch(&returns);
            eprintln!("  {} instrument-years", yearly.len());
            report.write_yearly(&yearly, out)
        }
        Analysis::Portfolio => {
            let returns = build_returns(&panel, config.windows);
            let curve = equal_weight_returns(&returns);
            report.write_portfolio(&curve, out)
        }
    }
}

fn run_resample(code: &str, period: Period, args: &PanelArgs) -> ExitCode {
    let (config, panel_path) = match resolve_config(args) {
        Ok(resolved) => resolved,
        Err(exit) => return exit,
    };
    let data_port = CsvAdapter::new(panel_path);
    let report = reporter(args.format);
    let stem = format!("{}_{}", StandardCodes.to_kline_form(code), period);
    let output = resolve_output_path(
        args.output.as_deref(),
        config.output_dir.as_deref(),
        &stem,
        args.format,
    );

    let result = write_output(output.as_deref(), |out| {
        run_resample_pipeline(code, period, &data_port, report.as_ref(), &config, out)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn run_resample_pipeline(
    code: &str,
    period: Period,
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    config: &AnalysisConfig,
    out: &mut dyn Write,
) -> Result<(), StockMetricsError> {
    let daily = data_port.fetch_series(code, config.start_date, config.end_date)?;
    if daily.is_empty() {
        return Err(StockMetricsError::NoData {
            code: code.to_string(),
        });
    }

    let bars = resample(&daily, period);
    eprintln!(
        "Resampled {}: {} daily bars -> {} {} bars",
        code,
        daily.len(),
        bars.len(),
        period
    );
    report.write_bars(code, &bars, out)
}

fn run_codes(args: &PanelArgs) -> ExitCode {
    let (config, panel_path) = match resolve_config(args) {
        Ok(resolved) => resolved,
        Err(exit) => return exit,
    };
    let data_port = CsvAdapter::new(panel_path);
    let report = reporter(args.format);
    let output = resolve_output_path(
        args.output.as_deref(),
        config.output_dir.as_deref(),
        "codes",
        args.format,
    );

    let result = write_output(output.as_deref(), |out| {
        run_codes_pipeline(&data_port, report.as_ref(), out)
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Writes every distinct instrument code in the panel with both notations.
pub fn run_codes_pipeline(
    data_port: &dyn DataPort,
    report: &dyn ReportPort,
    out: &mut dyn Write,
) -> Result<(), StockMetricsError> {
    let codes = data_port.list_codes()?;
    if codes.is_empty() {
        return Err(StockMetricsError::NoData {
            code: "panel".into(),
        });
    }
    eprintln!("{} instruments in panel", codes.len());
    report.write_codes(&codes, out)
}

fn run_code(code: &str) -> ExitCode {
    let (detail, kline) = StandardCodes.normalize(code);
    println!("detail: {}", detail);
    println!("kline:  {}", kline);

    let inferred = infer_kline_form(code);
    if inferred != kline {
        println!("inferred kline: {}", inferred);
    }
    if detail == kline {
        eprintln!("warning: {} is not a recognised instrument code", code);
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_analysis_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let show_path = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    };
    let show_date = |d: &Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string())
            .unwrap_or_else(|| "(open)".to_string())
    };

    eprintln!("\nData:");
    eprintln!("  panel_path: {}", show_path(&config.panel_path));
    eprintln!("  output_dir: {}", show_path(&config.output_dir));
    eprintln!(
        "  range:      {} to {}",
        show_date(&config.start_date),
        show_date(&config.end_date)
    );
    eprintln!("\nMetrics:");
    eprintln!("  risk_free_rate:        {}", config.metrics.risk_free_rate);
    eprintln!(
        "  trading_days_per_year: {}",
        config.metrics.trading_days_per_year
    );
    eprintln!("\nReturns:");
    eprintln!(
        "  moving averages: {} / {}",
        config.windows.short, config.windows.long
    );
    eprintln!("\nSignal:");
    eprintln!("  lookback:   {}", config.lookback);
    eprintln!(
        "  thresholds: buy > {}, sell < {}",
        config.thresholds.buy, config.thresholds.sell
    );

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_analysis_args() {
        let cli = Cli::try_parse_from([
            "stockmetrics",
            "metrics",
            "--panel",
            "panel.csv",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Metrics(args) => {
                assert_eq!(args.panel, Some(PathBuf::from("panel.csv")));
                assert_eq!(args.format, ReportFormat::Json);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_resample_period() {
        let cli = Cli::try_parse_from([
            "stockmetrics",
            "resample",
            "--code",
            "600000.SH",
            "--period",
            "weekly",
            "--panel",
            "panel.csv",
        ])
        .unwrap();
        match cli.command {
            Command::Resample { code, period, args } => {
                assert_eq!(code, "600000.SH");
                assert_eq!(period, Period::Week);
                assert_eq!(args.format, ReportFormat::Csv);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_period() {
        let result = Cli::try_parse_from([
            "stockmetrics",
            "resample",
            "--code",
            "sh.600000",
            "--period",
            "fortnight",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parses_codes() {
        let cli = Cli::try_parse_from(["stockmetrics", "codes", "-p", "panel.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Codes(ref args) if args.panel == Some(PathBuf::from("panel.csv"))));
    }

    #[test]
    fn negative_count_is_config_invalid() {
        let adapter = FileConfigAdapter::from_string("[signal]\nlookback = -3\n").unwrap();

        let err = get_count(&adapter, "signal", "lookback", 60).unwrap_err();

        assert!(matches!(
            err,
            StockMetricsError::ConfigInvalid { ref key, .. } if key == "lookback"
        ));
        assert_eq!(get_count(&adapter, "returns", "short_window", 5).unwrap(), 5);
    }

    #[test]
    fn output_path_precedence() {
        let explicit = resolve_output_path(
            Some(Path::new("out/m.csv")),
            Some(Path::new("data")),
            "metrics",
            ReportFormat::Csv,
        );
        assert_eq!(explicit, Some(PathBuf::from("out/m.csv")));

        let from_dir = resolve_output_path(None, Some(Path::new("data")), "metrics", ReportFormat::Json);
        assert_eq!(from_dir, Some(PathBuf::from("data/metrics.json")));

        assert_eq!(resolve_output_path(None, None, "metrics", ReportFormat::Csv), None);
    }
}
