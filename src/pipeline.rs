//! Match-then-act orchestration.
//!
//! A run is a single forward pass through
//! `Init → TemplateLoaded → FrameCaptured → Matched → Decided → Clicked`.
//! Any failing stage, and a below-threshold match, ends the run in
//! `Terminated` with no further side effects. In particular nothing is
//! clicked unless a target was accepted.

use crate::action::ClickDispatcher;
use crate::capture::ScreenCapturer;
use crate::gate::{Decision, DecisionGate, Threshold};
use crate::image::Size;
use crate::resolve::Target;
use crate::search::{MatchConfig, MatchResult, Matcher};
use crate::template::{load_template, Template};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::ClickMatchError;
use std::fmt;
use std::path::PathBuf;

/// Parameters of a run, passed explicitly to the [`Pipeline`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Template image to search for.
    pub template_path: PathBuf,
    /// Minimum score for a click.
    pub threshold: Threshold,
    /// Matcher settings.
    pub matching: MatchConfig,
}

impl PipelineConfig {
    /// Creates a configuration with the default threshold and matcher.
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            threshold: Threshold::default(),
            matching: MatchConfig::default(),
        }
    }
}

/// States visited by a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Run started; nothing loaded yet.
    Init,
    /// Template decoded and validated.
    TemplateLoaded,
    /// Screen frame obtained from the capturer.
    FrameCaptured,
    /// Best placement found and scored.
    Matched,
    /// Score met the threshold and a target was resolved.
    Decided,
    /// Click delivered to the target.
    Clicked,
    /// Run ended without a click.
    Terminated,
}

/// Stage that produced a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Reading and decoding the template file.
    Load,
    /// Grabbing the screen frame.
    Capture,
    /// Converting the frame and scoring placements.
    Match,
    /// Injecting the click.
    Click,
}

impl Stage {
    /// Returns a lowercase stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Capture => "capture",
            Stage::Match => "match",
            Stage::Click => "click",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// A click was dispatched at `target`.
    Clicked { target: Target, score: f64 },
    /// The best score fell below the threshold; nothing was clicked.
    Rejected { score: f64, threshold: Threshold },
    /// A stage failed; nothing after it ran.
    Failed { stage: Stage, error: ClickMatchError },
}

impl Outcome {
    fn failed(stage: Stage, error: ClickMatchError) -> Self {
        let message = error.to_string();
        trace_warn!("stage_failed", stage = stage.as_str(), error = message.as_str());
        Outcome::Failed { stage, error }
    }
}

/// Record of one run: visited states, measurements, and the outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    states: Vec<RunState>,
    template_size: Option<Size>,
    frame_size: Option<Size>,
    best: Option<MatchResult>,
    outcome: Outcome,
}

impl RunReport {
    /// Returns the states visited, starting with `Init`.
    pub fn states(&self) -> &[RunState] {
        &self.states
    }

    /// Returns the final state, `Clicked` or `Terminated`.
    pub fn final_state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Init)
    }

    /// Returns the template size if the template was loaded.
    pub fn template_size(&self) -> Option<Size> {
        self.template_size
    }

    /// Returns the frame size if a frame was captured.
    pub fn frame_size(&self) -> Option<Size> {
        self.frame_size
    }

    /// Returns the best match if matching completed.
    pub fn best(&self) -> Option<MatchResult> {
        self.best
    }

    /// Returns the terminal outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Returns true only if a click was dispatched.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Clicked { .. })
    }
}

#[derive(Default)]
struct Progress {
    states: Vec<RunState>,
    template_size: Option<Size>,
    frame_size: Option<Size>,
    best: Option<MatchResult>,
}

impl Progress {
    fn start() -> Self {
        Self {
            states: vec![RunState::Init],
            ..Self::default()
        }
    }

    fn advance(&mut self, state: RunState) {
        self.states.push(state);
    }

    fn finish(mut self, outcome: Outcome) -> RunReport {
        if !matches!(outcome, Outcome::Clicked { .. }) {
            self.advance(RunState::Terminated);
        }
        RunReport {
            states: self.states,
            template_size: self.template_size,
            frame_size: self.frame_size,
            best: self.best,
            outcome,
        }
    }
}

/// Runs single match-then-click attempts.
///
/// The pipeline keeps no state between runs; each call loads, captures,
/// matches and decides afresh.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline from an explicit configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Loads the configured template and performs one attempt.
    pub fn run<C, D>(&self, capturer: &mut C, dispatcher: &mut D) -> RunReport
    where
        C: ScreenCapturer + ?Sized,
        D: ClickDispatcher + ?Sized,
    {
        let _span = trace_span!("run", template = %self.config.template_path.display()).entered();
        let mut progress = Progress::start();
        let outcome = match load_template(&self.config.template_path) {
            Ok(template) => self.attempt(&template, capturer, dispatcher, &mut progress),
            Err(error) => Outcome::failed(Stage::Load, error),
        };
        progress.finish(outcome)
    }

    /// Performs one attempt with an already loaded template.
    pub fn run_with_template<C, D>(
        &self,
        template: &Template,
        capturer: &mut C,
        dispatcher: &mut D,
    ) -> RunReport
    where
        C: ScreenCapturer + ?Sized,
        D: ClickDispatcher + ?Sized,
    {
        let _span = trace_span!("run").entered();
        let mut progress = Progress::start();
        let outcome = self.attempt(template, capturer, dispatcher, &mut progress);
        progress.finish(outcome)
    }

    fn attempt<C, D>(
        &self,
        template: &Template,
        capturer: &mut C,
        dispatcher: &mut D,
        progress: &mut Progress,
    ) -> Outcome
    where
        C: ScreenCapturer + ?Sized,
        D: ClickDispatcher + ?Sized,
    {
        progress.template_size = Some(template.size());
        progress.advance(RunState::TemplateLoaded);
        match self.stages(template, capturer, dispatcher, progress) {
            Ok(outcome) | Err(outcome) => outcome,
        }
    }

    /// Capture → match → decide → click; `Err` carries an early terminal
    /// outcome.
    fn stages<C, D>(
        &self,
        template: &Template,
        capturer: &mut C,
        dispatcher: &mut D,
        progress: &mut Progress,
    ) -> Result<Outcome, Outcome>
    where
        C: ScreenCapturer + ?Sized,
        D: ClickDispatcher + ?Sized,
    {
        let frame = capturer
            .capture()
            .and_then(|raw| raw.to_bgr())
            .map_err(|err| Outcome::failed(Stage::Capture, err))?;
        let frame_size = frame.size();
        trace_event!(
            "frame_captured",
            width = frame_size.width,
            height = frame_size.height
        );
        progress.frame_size = Some(frame_size);
        progress.advance(RunState::FrameCaptured);

        let best = Matcher::new(template)
            .map(|matcher| matcher.with_config(self.config.matching.clone()))
            .and_then(|matcher| matcher.match_frame(frame.view()))
            .map_err(|err| Outcome::failed(Stage::Match, err))?;
        drop(frame);
        progress.best = Some(best);
        progress.advance(RunState::Matched);

        let target = match DecisionGate::new(self.config.threshold).accept(&best, template.size()) {
            Decision::Accepted(target) => target,
            Decision::Rejected { score, threshold } => {
                trace_event!("rejected", score = score, threshold = threshold.value());
                return Err(Outcome::Rejected { score, threshold });
            }
        };
        progress.advance(RunState::Decided);

        dispatcher
            .click(target)
            .map_err(|err| Outcome::failed(Stage::Click, err))?;
        trace_event!("clicked", x = target.x, y = target.y);
        progress.advance(RunState::Clicked);

        Ok(Outcome::Clicked {
            target,
            score: best.score,
        })
    }
}
