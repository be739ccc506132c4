use clap::Parser;
use clickmatch::{
    ClickDispatcher, ClickMatchResult, DryRunDispatcher, Frame, MatchConfig, MatchResult,
    Outcome, Pipeline, PipelineConfig, RunReport, ScreenCapturer, Stage, StaticCapturer,
    Threshold,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const EXIT_OK: u8 = 0;
const EXIT_NOT_CLICKED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find a template on screen and click its center")]
struct Cli {
    /// Template image to search for.
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Minimum match score in [0, 1] required to click.
    #[arg(long, value_name = "SCORE")]
    threshold: Option<f64>,
    /// Optional JSON configuration file; flags override its values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Match against a saved screenshot instead of the live screen.
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,
    /// Resolve the click target without injecting input.
    #[arg(long)]
    dry_run: bool,
    /// Scan rows in parallel (the default when built with rayon).
    #[arg(long, conflicts_with = "sequential")]
    parallel: bool,
    /// Scan rows on a single thread.
    #[arg(long)]
    sequential: bool,
    /// Print the run report as JSON instead of status lines.
    #[arg(long)]
    json: bool,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    template_path: Option<PathBuf>,
    threshold: Option<f64>,
    screenshot_path: Option<PathBuf>,
    dry_run: bool,
    parallel: Option<bool>,
}

impl Config {
    /// Reads the config file named on the command line, if any, and applies
    /// the flags on top of it.
    fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let file_config = match &cli.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => Config::default(),
        };
        Ok(file_config.merge(cli))
    }

    /// Applies command-line values on top of the file values.
    fn merge(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.template {
            self.template_path = Some(path.clone());
        }
        if let Some(threshold) = cli.threshold {
            self.threshold = Some(threshold);
        }
        if let Some(path) = &cli.screenshot {
            self.screenshot_path = Some(path.clone());
        }
        self.dry_run |= cli.dry_run;
        if cli.parallel {
            self.parallel = Some(true);
        }
        if cli.sequential {
            self.parallel = Some(false);
        }
        self
    }

    /// Parallel scanning is on unless disabled, when rayon is compiled in.
    fn parallel(&self) -> bool {
        self.parallel.unwrap_or(cfg!(feature = "rayon"))
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: usize,
    y: usize,
    score: f64,
}

impl From<MatchResult> for MatchRecord {
    fn from(value: MatchResult) -> Self {
        Self {
            x: value.location.x,
            y: value.location.y,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutcomeRecord {
    Clicked { x: usize, y: usize, score: f64 },
    Rejected { score: f64, threshold: f64 },
    Failed { stage: String, error: String },
}

impl From<&Outcome> for OutcomeRecord {
    fn from(value: &Outcome) -> Self {
        match value {
            Outcome::Clicked { target, score } => OutcomeRecord::Clicked {
                x: target.x,
                y: target.y,
                score: *score,
            },
            Outcome::Rejected { score, threshold } => OutcomeRecord::Rejected {
                score: *score,
                threshold: threshold.value(),
            },
            Outcome::Failed { stage, error } => OutcomeRecord::Failed {
                stage: stage.to_string(),
                error: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    succeeded: bool,
    dry_run: bool,
    states: Vec<String>,
    template_size: Option<[usize; 2]>,
    frame_size: Option<[usize; 2]>,
    best: Option<MatchRecord>,
    outcome: OutcomeRecord,
}

impl Output {
    fn new(report: &RunReport, dry_run: bool) -> Self {
        Self {
            succeeded: report.succeeded(),
            dry_run,
            states: report.states().iter().map(|s| format!("{s:?}")).collect(),
            template_size: report.template_size().map(|s| [s.width, s.height]),
            frame_size: report.frame_size().map(|s| [s.width, s.height]),
            best: report.best().map(MatchRecord::from),
            outcome: report.outcome().into(),
        }
    }
}

fn print_status(report: &RunReport, dry_run: bool) {
    let failed_at = match report.outcome() {
        Outcome::Failed { stage, error } => Some((*stage, error)),
        _ => None,
    };
    let failure = |stage: Stage| {
        failed_at
            .filter(|(failed, _)| *failed == stage)
            .map(|(_, error)| error.to_string())
    };

    match (report.template_size(), failure(Stage::Load)) {
        (Some(size), _) => println!("load:    ok ({}x{})", size.width, size.height),
        (None, Some(error)) => println!("load:    failed: {error}"),
        (None, None) => return,
    }
    match (report.frame_size(), failure(Stage::Capture)) {
        (Some(size), _) => println!("capture: ok ({}x{})", size.width, size.height),
        (None, Some(error)) => println!("capture: failed: {error}"),
        (None, None) => return,
    }
    match (report.best(), failure(Stage::Match)) {
        (Some(best), _) => println!(
            "match:   score {:.4} at ({}, {})",
            best.score, best.location.x, best.location.y
        ),
        (None, Some(error)) => println!("match:   failed: {error}"),
        (None, None) => return,
    }
    match report.outcome() {
        Outcome::Clicked { target, .. } if dry_run => {
            println!("click:   dry run at ({}, {})", target.x, target.y)
        }
        Outcome::Clicked { target, .. } => println!("click:   ok at ({}, {})", target.x, target.y),
        Outcome::Rejected { score, threshold } => {
            println!("click:   skipped (score {score:.4} below threshold {threshold})")
        }
        Outcome::Failed { stage, error } if *stage == Stage::Click => {
            println!("click:   failed: {error}")
        }
        Outcome::Failed { .. } => {}
    }
}

/// Reads a saved screenshot when the pipeline asks for a frame, so a bad file
/// is reported as a capture failure in stage order.
struct ScreenshotFile(PathBuf);

impl ScreenCapturer for ScreenshotFile {
    fn capture(&mut self) -> ClickMatchResult<Frame> {
        StaticCapturer::from_file(&self.0)?.capture()
    }
}

#[cfg(feature = "desktop")]
fn backends(
    config: &Config,
) -> Result<(Box<dyn ScreenCapturer>, Box<dyn ClickDispatcher>), Box<dyn std::error::Error>> {
    let capturer: Box<dyn ScreenCapturer> = match &config.screenshot_path {
        Some(path) => Box::new(ScreenshotFile(path.clone())),
        None => Box::new(clickmatch::XcapCapturer::new()),
    };
    let dispatcher: Box<dyn ClickDispatcher> = if config.dry_run {
        Box::new(DryRunDispatcher::new())
    } else {
        Box::new(clickmatch::EnigoDispatcher::new())
    };
    Ok((capturer, dispatcher))
}

#[cfg(not(feature = "desktop"))]
fn backends(
    config: &Config,
) -> Result<(Box<dyn ScreenCapturer>, Box<dyn ClickDispatcher>), Box<dyn std::error::Error>> {
    let path = config
        .screenshot_path
        .as_ref()
        .ok_or("--screenshot is required when built without the desktop feature")?;
    Ok((
        Box::new(ScreenshotFile(path.clone())),
        Box::new(DryRunDispatcher::new()),
    ))
}

fn is_dry_run(config: &Config) -> bool {
    config.dry_run || cfg!(not(feature = "desktop"))
}

fn run(cli: Cli) -> Result<u8, Box<dyn std::error::Error>> {
    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("clickmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(EXIT_OK);
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(EXIT_OK);
    }

    let config = Config::load(&cli)?;
    let template_path = config
        .template_path
        .clone()
        .ok_or("a template path is required (--template or template_path in the config)")?;
    let threshold = match config.threshold {
        Some(value) => Threshold::new(value)?,
        None => Threshold::default(),
    };
    let dry_run = is_dry_run(&config);
    tracing::info!(
        template = %template_path.display(),
        threshold = threshold.value(),
        dry_run,
        "configuration resolved"
    );

    let (mut capturer, mut dispatcher) = backends(&config)?;
    let pipeline = Pipeline::new(PipelineConfig {
        template_path,
        threshold,
        matching: MatchConfig {
            parallel: config.parallel(),
        },
    });
    let report = pipeline.run(capturer.as_mut(), dispatcher.as_mut());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&Output::new(&report, dry_run))?);
    } else {
        print_status(&report, dry_run);
    }

    Ok(if report.succeeded() {
        EXIT_OK
    } else {
        EXIT_NOT_CLICKED
    })
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}
