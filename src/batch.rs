use std::io::Write;
use std::sync::Mutex;

use crate::annotate::Annotator;
use crate::detect::DetectionClient;
use crate::display::ImageSink;
use crate::error::{BatchError, Error, Stage};
use crate::fetch::ObjectFetcher;
use crate::models::{DetectParams, DetectionLabel, ImageRef};

/// Outcome of a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Runs the fetch → detect → report → annotate → display pipeline over
/// an ordered list of image keys, strictly one image at a time.
pub struct BatchRunner {
    fetcher: Box<dyn ObjectFetcher>,
    detector: Box<dyn DetectionClient>,
    annotator: Annotator,
    sink: Box<dyn ImageSink>,
    params: DetectParams,
    keep_going: bool,
    verbose: bool,
    report: Mutex<Box<dyn Write + Send>>,
}

impl BatchRunner {
    pub fn new(
        fetcher: Box<dyn ObjectFetcher>,
        detector: Box<dyn DetectionClient>,
        annotator: Annotator,
        sink: Box<dyn ImageSink>,
    ) -> Self {
        Self {
            fetcher,
            detector,
            annotator,
            sink,
            params: DetectParams::default(),
            keep_going: false,
            verbose: false,
            report: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    pub fn with_params(mut self, params: DetectParams) -> Self {
        self.params = params;
        self
    }

    /// Skip failing images instead of aborting the whole batch.
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Redirect the textual report (defaults to stdout).
    pub fn with_report_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.report = Mutex::new(writer);
        self
    }

    /// Processes each key fully before moving to the next. With the
    /// default policy the first failure aborts the batch; with
    /// `keep_going` the failure is logged and the key is skipped.
    pub async fn run(&self, bucket: &str, keys: &[String]) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::default();

        for key in keys {
            let image = ImageRef::new(bucket, key);
            match self.process_one(&image).await {
                Ok(()) => summary.processed += 1,
                Err(err) if self.keep_going => {
                    eprintln!("skipping {}: {}", image, err);
                    summary.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    async fn process_one(&self, image: &ImageRef) -> Result<(), BatchError> {
        let fail = |stage: Stage, source: Error| BatchError {
            stage,
            image: image.clone(),
            source,
        };

        if self.verbose {
            println!("Processing {}...", image);
        }

        let bytes = self
            .fetcher
            .fetch(&image.bucket, &image.key)
            .await
            .map_err(|e| fail(Stage::Fetch, e))?;

        let labels = self
            .detector
            .detect(&image.bucket, &image.key, &self.params)
            .await
            .map_err(|e| fail(Stage::Detect, e))?;

        self.write_report(&labels)
            .map_err(|e| fail(Stage::Report, Error::Io(e)))?;

        let annotated = self
            .annotator
            .annotate(&bytes, &labels)
            .map_err(|e| fail(Stage::Annotate, e))?;

        self.sink
            .present(&image.key, &annotated)
            .map_err(|e| fail(Stage::Display, e))?;

        Ok(())
    }

    fn write_report(&self, labels: &[DetectionLabel]) -> std::io::Result<()> {
        let mut out = self.report.lock().unwrap();
        writeln!(out, "Detected Labels:")?;
        for label in labels {
            writeln!(out, "{}", label.report_line())?;
        }
        out.flush()
    }
}
