use clickmatch::{
    ClickMatchError, ClickMatchResult, DryRunDispatcher, Frame, Location, Outcome, PixelFormat,
    Pipeline, PipelineConfig, RunState, ScreenCapturer, Size, Stage, StaticCapturer, Target,
    Threshold,
};
use std::path::Path;

/// Counts capture calls so tests can prove a stage never ran.
struct CountingCapturer {
    inner: StaticCapturer,
    calls: usize,
}

impl CountingCapturer {
    fn new(frame: Frame) -> Self {
        Self {
            inner: StaticCapturer::new(frame),
            calls: 0,
        }
    }
}

impl ScreenCapturer for CountingCapturer {
    fn capture(&mut self) -> ClickMatchResult<Frame> {
        self.calls += 1;
        self.inner.capture()
    }
}

fn save_red_swatch(path: &Path) {
    ::image::RgbImage::from_pixel(2, 2, ::image::Rgb([255, 0, 0]))
        .save(path)
        .unwrap();
}

/// 4x4 white RGBA screen with a 2x2 red square whose top-left is (1, 1).
fn swatch_screen() -> Frame {
    let mut data = vec![255u8; 4 * 4 * 4];
    for y in 1..3 {
        for x in 1..3 {
            let idx = (y * 4 + x) * 4;
            data[idx..idx + 4].copy_from_slice(&[255, 0, 0, 255]);
        }
    }
    Frame::new(data, 4, 4, PixelFormat::Rgba).unwrap()
}

#[test]
fn swatch_on_screen_is_clicked_at_its_center() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("swatch.png");
    save_red_swatch(&template_path);

    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = CountingCapturer::new(swatch_screen());
    let mut dispatcher = DryRunDispatcher::new();
    let report = pipeline.run(&mut capturer, &mut dispatcher);

    assert!(report.succeeded());
    assert_eq!(
        report.outcome(),
        &Outcome::Clicked {
            target: Target { x: 2, y: 2 },
            score: 1.0,
        }
    );
    assert_eq!(dispatcher.clicks(), &[Target { x: 2, y: 2 }]);
    assert_eq!(capturer.calls, 1);

    let best = report.best().unwrap();
    assert_eq!(best.location, Location { x: 1, y: 1 });
    assert_eq!(report.template_size(), Some(Size::new(2, 2)));
    assert_eq!(report.frame_size(), Some(Size::new(4, 4)));
    assert_eq!(
        report.states(),
        &[
            RunState::Init,
            RunState::TemplateLoaded,
            RunState::FrameCaptured,
            RunState::Matched,
            RunState::Decided,
            RunState::Clicked,
        ]
    );
}

#[test]
fn weak_match_is_rejected_without_clicking() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("edge.png");
    ::image::GrayImage::from_raw(3, 1, vec![0, 0, 255])
        .unwrap()
        .save(&template_path)
        .unwrap();

    // A single placement whose correlation with the template is about 0.3.
    let screen = Frame::new(vec![155, 20, 125], 3, 1, PixelFormat::Gray).unwrap();
    let pipeline = Pipeline::new(PipelineConfig {
        threshold: Threshold::new(0.8).unwrap(),
        ..PipelineConfig::new(&template_path)
    });
    let mut capturer = CountingCapturer::new(screen);
    let mut dispatcher = DryRunDispatcher::new();
    let report = pipeline.run(&mut capturer, &mut dispatcher);

    assert!(!report.succeeded());
    match report.outcome() {
        Outcome::Rejected { score, threshold } => {
            assert!((score - 0.3).abs() < 0.01, "score {score}");
            assert_eq!(threshold.value(), 0.8);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(dispatcher.clicks().is_empty());
    assert_eq!(
        report.states(),
        &[
            RunState::Init,
            RunState::TemplateLoaded,
            RunState::FrameCaptured,
            RunState::Matched,
            RunState::Terminated,
        ]
    );
}

#[test]
fn missing_template_fails_before_capture() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("does-not-exist.png");

    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = CountingCapturer::new(swatch_screen());
    let mut dispatcher = DryRunDispatcher::new();
    let report = pipeline.run(&mut capturer, &mut dispatcher);

    assert_eq!(
        report.outcome(),
        &Outcome::Failed {
            stage: Stage::Load,
            error: ClickMatchError::PathNotFound {
                path: template_path.clone()
            },
        }
    );
    assert_eq!(capturer.calls, 0);
    assert!(dispatcher.clicks().is_empty());
    assert_eq!(report.states(), &[RunState::Init, RunState::Terminated]);
    assert_eq!(report.template_size(), None);
}

#[test]
fn undecodable_template_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("broken.png");
    std::fs::write(&template_path, b"\x89PNG but not really").unwrap();

    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = CountingCapturer::new(swatch_screen());
    let report = pipeline.run(&mut capturer, &mut DryRunDispatcher::new());

    assert!(matches!(
        report.outcome(),
        Outcome::Failed {
            stage: Stage::Load,
            error: ClickMatchError::DecodeFailure { .. },
        }
    ));
    assert_eq!(capturer.calls, 0);
}

#[test]
fn screenshot_file_feeds_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("swatch.png");
    save_red_swatch(&template_path);

    let screen_path = dir.path().join("screen.png");
    let mut screen = ::image::RgbImage::from_pixel(20, 12, ::image::Rgb([240, 240, 240]));
    for (x, y) in [(13, 7), (14, 7), (13, 8), (14, 8)] {
        screen.put_pixel(x, y, ::image::Rgb([255, 0, 0]));
    }
    screen.save(&screen_path).unwrap();

    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = StaticCapturer::from_file(&screen_path).unwrap();
    let mut dispatcher = DryRunDispatcher::new();
    let report = pipeline.run(&mut capturer, &mut dispatcher);

    assert!(report.succeeded());
    assert_eq!(dispatcher.clicks(), &[Target { x: 14, y: 8 }]);
}

#[test]
fn runs_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("swatch.png");
    save_red_swatch(&template_path);

    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = CountingCapturer::new(swatch_screen());
    let mut dispatcher = DryRunDispatcher::new();
    let first = pipeline.run(&mut capturer, &mut dispatcher);
    let second = pipeline.run(&mut capturer, &mut dispatcher);

    assert_eq!(first, second);
    assert_eq!(capturer.calls, 2);
    assert_eq!(dispatcher.clicks().len(), 2);
}
