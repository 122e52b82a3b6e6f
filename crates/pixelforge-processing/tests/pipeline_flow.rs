//! End-to-end flows: admission, preset pipelines, batch isolation.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use pixelforge_core::{AdmissionPolicy, Operation, OutputFormat, SourceImage, StepOutcome};
use pixelforge_processing::{
    AdmissionGate, AdmissionReason, BatchItemError, BatchRunner, Pipeline, Preset,
};
use tokio_util::sync::CancellationToken;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn encode_png(img: &DynamicImage) -> Bytes {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

fn png_source(name: &str, width: u32, height: u32) -> SourceImage {
    let img =
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([60, 120, 180, 255])));
    SourceImage::new(encode_png(&img), name.to_string(), "image/png".to_string())
}

#[tokio::test]
async fn amazon_preset_produces_square_jpeg_with_full_history() {
    init_tracing();
    let pipeline = Pipeline::new();
    let image = png_source("product.png", 2000, 1000);
    let operations = Preset::resolve("amazon").unwrap().operations();

    let output = pipeline.run(&image, &operations).await.unwrap();

    assert_eq!(output.artifact.format, OutputFormat::Jpeg);
    assert_eq!((output.artifact.width, output.artifact.height), (1600, 1600));
    assert_eq!(output.artifact.content_type(), "image/jpeg");

    let names: Vec<&str> = output.history.iter().map(|r| r.operation.name()).collect();
    assert_eq!(
        names,
        vec!["adjust_color", "sharpen", "resize", "convert_format", "watermark"]
    );

    // Geometry is already final when the watermark lands.
    assert_eq!(
        output.history[4].outcome,
        StepOutcome::Applied { width: 1600, height: 1600 }
    );

    // The artifact really decodes as a 1600x1600 JPEG.
    let decoded = image::load_from_memory(&output.artifact.data).unwrap();
    assert_eq!(decoded.dimensions(), (1600, 1600));
}

#[tokio::test]
async fn wide_source_is_letterboxed_not_cropped() {
    init_tracing();
    let pipeline = Pipeline::new();
    let image = png_source("wide.png", 2000, 1000);
    let operations = Preset::resolve("social").unwrap().operations();

    let output = pipeline.run(&image, &operations).await.unwrap();
    let decoded = image::load_from_memory(&output.artifact.data)
        .unwrap()
        .to_rgba8();

    assert_eq!(decoded.dimensions(), (1200, 1200));
    // Top band is white padding, the center belongs to the source.
    let top = decoded.get_pixel(600, 100).0;
    assert_eq!(&top[..3], &[255, 255, 255]);
    let center = decoded.get_pixel(600, 600).0;
    assert!(center[2] > center[0]);
}

#[tokio::test]
async fn oversize_upload_never_reaches_the_pipeline() {
    init_tracing();
    let gate = AdmissionGate::new(AdmissionPolicy::default());
    let six_mb = vec![0u8; 6 * 1024 * 1024];

    let rejected = gate
        .admit_upload(Bytes::from(six_mb), "huge.png", "image/png")
        .unwrap_err();

    assert!(rejected
        .reasons
        .iter()
        .any(|r| matches!(r, AdmissionReason::FileTooLarge { .. })));
}

#[tokio::test]
async fn admission_reports_every_violation_at_once() {
    init_tracing();
    let gate = AdmissionGate::new(AdmissionPolicy::default());
    let result = gate.admit(10 * 1024 * 1024, "tiff");

    assert!(!result.accepted);
    assert_eq!(result.reasons.len(), 2);
    assert!(result
        .reasons
        .iter()
        .any(|r| matches!(r, AdmissionReason::FileTooLarge { .. })));
    assert!(result
        .reasons
        .iter()
        .any(|r| matches!(r, AdmissionReason::UnsupportedExtension { .. })));
}

#[tokio::test]
async fn batch_isolates_a_corrupt_item_at_every_concurrency_limit() {
    init_tracing();
    for concurrency in [1, 2, 8] {
        let runner = BatchRunner::new(AdmissionPolicy::default(), concurrency);
        let mut images: Vec<SourceImage> =
            (0..4).map(|i| png_source(&format!("ok{i}.png"), 32, 32)).collect();
        images.insert(
            2,
            SourceImage::new(
                Bytes::from_static(b"definitely not pixels"),
                "corrupt.png".to_string(),
                "image/png".to_string(),
            ),
        );

        let outcome = runner.run(images, vec![Operation::Sharpen]).await;

        assert_eq!(outcome.succeeded.len(), 4, "concurrency {concurrency}");
        assert_eq!(outcome.failed.len(), 1, "concurrency {concurrency}");
        assert_eq!(outcome.failed[0].image.file_name, "corrupt.png");
        assert_eq!(outcome.stats.total_processed, 4);
        assert_eq!(outcome.stats.total_failed, 1);
    }
}

#[tokio::test]
async fn pre_cancelled_batch_fails_every_item_as_cancelled() {
    init_tracing();
    let runner = BatchRunner::new(AdmissionPolicy::default(), 2);
    let images = vec![png_source("a.png", 16, 16), png_source("b.png", 16, 16)];
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = runner
        .run_with_cancellation(images, |_| vec![Operation::Sharpen], cancel)
        .await;

    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.failed.len(), 2);
    assert!(outcome
        .failed
        .iter()
        .all(|f| matches!(f.error, BatchItemError::Cancelled)));
}

#[tokio::test]
async fn run_preset_applies_the_resolved_chain_to_every_image() {
    init_tracing();
    let runner = BatchRunner::new(AdmissionPolicy::default(), 4);
    let images = vec![png_source("x.png", 300, 200), png_source("y.png", 100, 400)];

    let outcome = runner.run_preset(images, "social").await.unwrap();

    assert_eq!(outcome.succeeded.len(), 2);
    for success in &outcome.succeeded {
        assert_eq!(success.artifact.format, OutputFormat::Png);
        assert_eq!((success.artifact.width, success.artifact.height), (1200, 1200));
        assert_eq!(success.history.len(), 5);
    }
}

#[tokio::test]
async fn webp_conversion_round_trips() {
    init_tracing();
    let pipeline = Pipeline::new();
    let image = png_source("photo.png", 64, 48);
    let operations = vec![Operation::convert_format(OutputFormat::WebP, 0.8).unwrap()];

    let output = pipeline.run(&image, &operations).await.unwrap();

    assert_eq!(output.artifact.format, OutputFormat::WebP);
    let decoded = image::load_from_memory(&output.artifact.data).unwrap();
    assert_eq!(decoded.dimensions(), (64, 48));
}
