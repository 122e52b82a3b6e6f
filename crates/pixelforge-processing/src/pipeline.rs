//! Ordered operation pipeline.
//!
//! Validates the chain up front, decodes once, applies each operation
//! in order and encodes once at the end. The step history survives
//! failures so callers can see how far a run got.

use std::sync::Arc;

use bytes::Bytes;
use pixelforge_core::{
    InvalidOperation, Operation, OperationRecord, OutputFormat, SourceImage,
};

use crate::engine::{CpuEngine, OperationError, RasterEngine};

/// Final encoded image plus the metadata callers store alongside it.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    pub data: Bytes,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl ProcessedArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub artifact: ProcessedArtifact,
    pub history: Vec<OperationRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("operation {index} is invalid: {source}")]
    InvalidOperation {
        index: usize,
        #[source]
        source: InvalidOperation,
    },
    #[error("failed to decode source image: {source}")]
    Decode {
        #[source]
        source: OperationError,
    },
    #[error("operation {index} ({name}) failed: {source}")]
    Operation {
        index: usize,
        name: &'static str,
        #[source]
        source: OperationError,
    },
    #[error("failed to encode {format} output: {source}")]
    Encode {
        format: OutputFormat,
        #[source]
        source: OperationError,
    },
}

/// A failed run, carrying the records of every step that did complete.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PipelineFailure {
    #[source]
    pub error: PipelineError,
    pub history: Vec<OperationRecord>,
}

pub struct Pipeline {
    engine: Arc<dyn RasterEngine>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_engine(Arc::new(CpuEngine::new()))
    }

    pub fn with_engine(engine: Arc<dyn RasterEngine>) -> Self {
        Self { engine }
    }

    pub async fn run(
        &self,
        image: &SourceImage,
        operations: &[Operation],
    ) -> Result<PipelineOutput, PipelineFailure> {
        // Reject the whole chain before any pixel work runs.
        for (index, operation) in operations.iter().enumerate() {
            if let Err(source) = operation.validate() {
                return Err(PipelineFailure {
                    error: PipelineError::InvalidOperation { index, source },
                    history: Vec::new(),
                });
            }
        }

        let mut buffer = match self.engine.decode(image.data.clone()).await {
            Ok(buffer) => buffer,
            Err(source) => {
                return Err(PipelineFailure {
                    error: PipelineError::Decode { source },
                    history: Vec::new(),
                })
            }
        };

        let mut history = Vec::with_capacity(operations.len());
        for (index, operation) in operations.iter().enumerate() {
            buffer = match self.engine.apply(buffer, operation).await {
                Ok(buffer) => buffer,
                Err(source) => {
                    tracing::warn!(
                        image_id = %image.id,
                        step = index,
                        operation = operation.name(),
                        error = %source,
                        "pipeline step failed"
                    );
                    return Err(PipelineFailure {
                        error: PipelineError::Operation {
                            index,
                            name: operation.name(),
                            source,
                        },
                        history,
                    });
                }
            };
            history.push(OperationRecord::applied(
                operation.clone(),
                buffer.width(),
                buffer.height(),
            ));
        }

        let width = buffer.width();
        let height = buffer.height();
        let format = buffer.format;

        let data = match self.engine.encode(buffer).await {
            Ok(data) => data,
            Err(source) => {
                return Err(PipelineFailure {
                    error: PipelineError::Encode { format, source },
                    history,
                })
            }
        };

        tracing::debug!(
            image_id = %image.id,
            steps = history.len(),
            %format,
            width,
            height,
            bytes_out = data.len(),
            "pipeline completed"
        );

        let size_bytes = data.len() as u64;
        Ok(PipelineOutput {
            artifact: ProcessedArtifact {
                data,
                format,
                width,
                height,
                size_bytes,
            },
            history,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
