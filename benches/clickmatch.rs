use clickmatch::{
    DryRunDispatcher, Frame, MatchConfig, Matcher, OwnedImage, PixelFormat, Pipeline,
    PipelineConfig, StaticCapturer, Template,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn make_screen(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
            data.extend_from_slice(&[value as u8, (value as u8).wrapping_add(64), (x & 0xFF) as u8]);
        }
    }
    data
}

fn extract_patch(
    image: &[u8],
    img_width: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let start = ((y0 + y) * img_width + x0) * 3;
        out.extend_from_slice(&image[start..start + width * 3]);
    }
    out
}

fn bench_matcher(c: &mut Criterion) {
    let img_width = 640;
    let img_height = 360;
    let screen = make_screen(img_width, img_height);
    let frame = OwnedImage::new(screen.clone(), img_width, img_height, 3).unwrap();

    let tpl_width = 48;
    let tpl_height = 32;
    let patch = extract_patch(&screen, img_width, 300, 200, tpl_width, tpl_height);
    let template = Template::new(&patch, tpl_width, tpl_height, PixelFormat::Bgr).unwrap();

    let sequential = Matcher::new(&template).unwrap();
    c.bench_function("zncc_full_scan", |b| {
        b.iter(|| black_box(sequential.match_frame(frame.view()).unwrap()));
    });

    if cfg!(feature = "rayon") {
        let parallel = Matcher::new(&template)
            .unwrap()
            .with_config(MatchConfig { parallel: true });
        c.bench_function("zncc_full_scan_parallel", |b| {
            b.iter(|| black_box(parallel.match_frame(frame.view()).unwrap()));
        });
    }

    let rgba: Vec<u8> = screen
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0], 255])
        .collect();
    let raw = Frame::new(rgba, img_width, img_height, PixelFormat::Rgba).unwrap();
    c.bench_function("rgba_to_bgr", |b| {
        b.iter(|| black_box(raw.to_bgr().unwrap()));
    });

    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.png");
    let rgb_patch: Vec<u8> = patch
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    ::image::RgbImage::from_raw(tpl_width as u32, tpl_height as u32, rgb_patch)
        .unwrap()
        .save(&template_path)
        .unwrap();
    let pipeline = Pipeline::new(PipelineConfig::new(&template_path));
    let mut capturer = StaticCapturer::new(raw.clone());
    c.bench_function("pipeline_dry_run", |b| {
        b.iter(|| {
            let mut dispatcher = DryRunDispatcher::new();
            black_box(pipeline.run(&mut capturer, &mut dispatcher))
        });
    });
}

criterion_group!(benches, bench_matcher);
criterion_main!(benches);
