pub mod annotate;
pub mod batch;
pub mod config;
pub mod detect;
pub mod display;
pub mod error;
pub mod fetch;
pub mod models;

pub use annotate::{Annotator, ImageprocRenderer, Renderer};
pub use batch::{BatchRunner, BatchSummary};
pub use config::BatchConfig;
pub use detect::{DetectionClient, HttpDetectionClient};
pub use display::{FileSink, ImageSink};
pub use error::{BatchError, Error, Stage};
pub use fetch::{HttpObjectFetcher, ObjectFetcher};
pub use models::{
    BoundingBox, DetectParams, DetectionLabel, ImageRef, Instance, PixelRect,
};
