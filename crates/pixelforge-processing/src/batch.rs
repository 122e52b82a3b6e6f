//! Concurrent batch runner.
//!
//! Each image is admitted, run through the pipeline, and tallied
//! independently; one bad file never sinks the rest of the batch.
//! Concurrency is bounded by a semaphore and a cancellation token
//! stops new work while letting in-flight items finish.

use std::sync::Arc;

use pixelforge_core::{AdmissionPolicy, Operation, SourceImage, UsageStats};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::admission::{AdmissionGate, AdmissionReason};
use crate::pipeline::{Pipeline, PipelineFailure, ProcessedArtifact};
use crate::preset::{self, UnknownPresetError};
use pixelforge_core::OperationRecord;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum BatchItemError {
    #[error("upload rejected: {}", .reasons.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; "))]
    Rejected { reasons: Vec<AdmissionReason> },
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
    #[error("cancelled before processing started")]
    Cancelled,
}

#[derive(Debug)]
pub struct BatchSuccess {
    pub image: SourceImage,
    pub artifact: ProcessedArtifact,
    pub history: Vec<OperationRecord>,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub image: SourceImage,
    pub error: BatchItemError,
}

/// Per-run report. `succeeded` and `failed` preserve the input order
/// of their items.
#[derive(Debug)]
pub struct BatchOutcome {
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
    pub stats: UsageStats,
}

pub struct BatchRunner {
    gate: AdmissionGate,
    pipeline: Arc<Pipeline>,
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(policy: AdmissionPolicy, concurrency: usize) -> Self {
        Self {
            gate: AdmissionGate::new(policy),
            pipeline: Arc::new(Pipeline::new()),
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Arc<Pipeline>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Runs every image through the same operation chain.
    pub async fn run(&self, images: Vec<SourceImage>, operations: Vec<Operation>) -> BatchOutcome {
        self.run_with_cancellation(images, |_| operations.clone(), CancellationToken::new())
            .await
    }

    /// Resolves a marketplace preset once and runs the batch with it.
    pub async fn run_preset(
        &self,
        images: Vec<SourceImage>,
        preset_name: &str,
    ) -> Result<BatchOutcome, UnknownPresetError> {
        let operations = preset::resolve(preset_name)?;
        Ok(self.run(images, operations).await)
    }

    pub async fn run_with_cancellation<F>(
        &self,
        images: Vec<SourceImage>,
        operations_for: F,
        cancel: CancellationToken,
    ) -> BatchOutcome
    where
        F: Fn(&SourceImage) -> Vec<Operation>,
    {
        let total = images.len();
        tracing::info!(total, concurrency = self.concurrency, "starting batch");

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, image) in images.into_iter().enumerate() {
            let operations = operations_for(&image);
            let gate = self.gate.clone();
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let result = process_item(&gate, &pipeline, &image, &operations, &semaphore, &cancel)
                    .await;
                (index, image, result)
            });
        }

        let mut slots: Vec<Option<(SourceImage, Result<(ProcessedArtifact, Vec<OperationRecord>), BatchItemError>)>> =
            (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, image, result)) => slots[index] = Some((image, result)),
                Err(err) => {
                    // Only reachable if a task panicked.
                    tracing::error!(error = %err, "batch task aborted");
                }
            }
        }

        let mut outcome = BatchOutcome {
            succeeded: Vec::new(),
            failed: Vec::new(),
            stats: UsageStats::default(),
        };
        for slot in slots.into_iter().flatten() {
            let (image, result) = slot;
            match result {
                Ok((artifact, history)) => {
                    outcome.stats.record_success(image.size_bytes, artifact.size_bytes);
                    outcome.succeeded.push(BatchSuccess {
                        image,
                        artifact,
                        history,
                    });
                }
                Err(error) => {
                    outcome.stats.record_failure(image.size_bytes);
                    outcome.failed.push(BatchFailure { image, error });
                }
            }
        }

        tracing::info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "batch finished"
        );
        outcome
    }
}

async fn process_item(
    gate: &AdmissionGate,
    pipeline: &Pipeline,
    image: &SourceImage,
    operations: &[Operation],
    semaphore: &Semaphore,
    cancel: &CancellationToken,
) -> Result<(ProcessedArtifact, Vec<OperationRecord>), BatchItemError> {
    // A closed semaphore is impossible here, it lives for the whole run.
    let _permit = match semaphore.acquire().await {
        Ok(permit) => permit,
        Err(_) => return Err(BatchItemError::Cancelled),
    };

    // Items already running keep going; items still waiting on a permit
    // stop here.
    if cancel.is_cancelled() {
        return Err(BatchItemError::Cancelled);
    }

    let extension = image.extension().unwrap_or_default();
    let admission = gate.admit(image.size_bytes, &extension);
    if !admission.accepted {
        return Err(BatchItemError::Rejected {
            reasons: admission.reasons,
        });
    }

    let output = pipeline.run(image, operations).await?;
    Ok((output.artifact, output.history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use image::{DynamicImage, Rgba, RgbaImage};
    use pixelforge_core::OutputFormat;

    use crate::codec;

    fn png_image(name: &str, width: u32, height: u32) -> SourceImage {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255])));
        let data = codec::encode(&img, OutputFormat::Png, 1.0).unwrap();
        SourceImage::new(Bytes::from(data), name.to_string(), "image/png".to_string())
    }

    #[tokio::test]
    async fn test_run_processes_all_images() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 2);
        let images = vec![
            png_image("a.png", 40, 40),
            png_image("b.png", 60, 30),
            png_image("c.png", 20, 80),
        ];

        let outcome = runner.run(images, vec![Operation::Sharpen]).await;

        assert_eq!(outcome.succeeded.len(), 3);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.stats.total_processed, 3);
        assert_eq!(outcome.stats.total_failed, 0);
        assert!(outcome.stats.bytes_out > 0);
    }

    #[tokio::test]
    async fn test_run_preserves_input_order() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 4);
        let images: Vec<SourceImage> = (0..8)
            .map(|i| png_image(&format!("img{i}.png"), 30 + i, 30))
            .collect();
        let names: Vec<String> = images.iter().map(|img| img.file_name.clone()).collect();

        let outcome = runner.run(images, Vec::new()).await;

        let out_names: Vec<&str> = outcome
            .succeeded
            .iter()
            .map(|s| s.image.file_name.as_str())
            .collect();
        assert_eq!(out_names, names.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_one_bad_item_does_not_fail_the_batch() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 4);
        let images = vec![
            png_image("good1.png", 40, 40),
            SourceImage::new(
                Bytes::from_static(b"not an image at all"),
                "broken.png".to_string(),
                "image/png".to_string(),
            ),
            png_image("good2.png", 40, 40),
        ];

        let outcome = runner.run(images, vec![Operation::Sharpen]).await;

        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].image.file_name, "broken.png");
        assert!(matches!(
            outcome.failed[0].error,
            BatchItemError::Pipeline(_)
        ));
        assert_eq!(outcome.stats.total_processed, 2);
        assert_eq!(outcome.stats.total_failed, 1);
    }

    #[tokio::test]
    async fn test_oversize_upload_is_rejected_not_processed() {
        let policy = AdmissionPolicy::new(1024, vec!["png".to_string()]);
        let runner = BatchRunner::new(policy, 2);
        let images = vec![png_image("big.png", 600, 600), png_image("small.png", 8, 8)];

        let outcome = runner.run(images, Vec::new()).await;

        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].image.file_name, "small.png");
        assert_eq!(outcome.failed.len(), 1);
        match &outcome.failed[0].error {
            BatchItemError::Rejected { reasons } => {
                assert!(matches!(reasons[0], AdmissionReason::FileTooLarge { .. }));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_token_marks_pending_items() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 1);
        let images = vec![png_image("a.png", 20, 20), png_image("b.png", 20, 20)];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = runner
            .run_with_cancellation(images, |_| Vec::new(), cancel)
            .await;

        assert!(outcome.succeeded.is_empty());
        assert_eq!(outcome.failed.len(), 2);
        for failure in &outcome.failed {
            assert!(matches!(failure.error, BatchItemError::Cancelled));
        }
        assert_eq!(outcome.stats.total_failed, 2);
    }

    #[tokio::test]
    async fn test_run_preset_unknown_name() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 2);
        let err = runner
            .run_preset(vec![png_image("a.png", 10, 10)], "ebay")
            .await
            .unwrap_err();
        assert_eq!(err.0, "ebay");
    }

    #[tokio::test]
    async fn test_concurrency_of_one_still_completes() {
        let runner = BatchRunner::new(AdmissionPolicy::default(), 1);
        let images: Vec<SourceImage> =
            (0..5).map(|i| png_image(&format!("{i}.png"), 16, 16)).collect();

        let outcome = runner.run(images, vec![Operation::AdjustColor]).await;
        assert_eq!(outcome.succeeded.len(), 5);
    }
}
