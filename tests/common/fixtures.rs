//! Deterministic in-memory stand-ins for the object store, the
//! detection service, and the display, plus a shared call log so tests
//! can assert processing order across all of them.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use labelgen::{
    BoundingBox, DetectParams, DetectionLabel, Error, ImageSink, Instance, ObjectFetcher,
    DetectionClient,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Encodes a solid-color image as PNG bytes.
pub fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("failed to encode test image");
    bytes.into_inner()
}

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// A label named "Cat" at 92.5% with one box covering (0.1, 0.2) to
/// (0.4, 0.6) of the image.
pub fn cat_label() -> DetectionLabel {
    DetectionLabel {
        name: "Cat".to_string(),
        confidence: 92.5,
        instances: vec![Instance {
            bounding_box: Some(BoundingBox {
                left: 0.1,
                top: 0.2,
                width: 0.3,
                height: 0.4,
            }),
        }],
    }
}

/// Object store fake serving from a key → bytes map.
pub struct FakeFetcher {
    pub bucket: String,
    pub objects: HashMap<String, Vec<u8>>,
    pub log: CallLog,
}

#[async_trait]
impl ObjectFetcher for FakeFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Error> {
        assert_eq!(bucket, self.bucket, "fetch called with wrong bucket");
        self.log.lock().unwrap().push(format!("fetch {}", key));
        match self.objects.get(key) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(Error::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

/// Detection service fake; keys absent from the map detect nothing.
pub struct FakeDetector {
    pub labels: HashMap<String, Vec<DetectionLabel>>,
    pub log: CallLog,
}

#[async_trait]
impl DetectionClient for FakeDetector {
    async fn detect(
        &self,
        _bucket: &str,
        key: &str,
        _params: &DetectParams,
    ) -> Result<Vec<DetectionLabel>, Error> {
        self.log.lock().unwrap().push(format!("detect {}", key));
        Ok(self.labels.get(key).cloned().unwrap_or_default())
    }
}

/// Display fake that keeps every presented image for inspection.
pub struct RecordingSink {
    pub images: Arc<Mutex<Vec<(String, RgbaImage)>>>,
    pub log: CallLog,
}

impl RecordingSink {
    pub fn new(log: CallLog) -> Self {
        Self {
            images: Arc::new(Mutex::new(Vec::new())),
            log,
        }
    }
}

impl ImageSink for RecordingSink {
    fn present(&self, key: &str, image: &RgbaImage) -> Result<(), Error> {
        self.log.lock().unwrap().push(format!("present {}", key));
        self.images
            .lock()
            .unwrap()
            .push((key.to_string(), image.clone()));
        Ok(())
    }
}

/// Report writer the test can read back after the runner is done.
#[derive(Clone, Default)]
pub struct SharedWriter(pub Arc<Mutex<Vec<u8>>>);

impl SharedWriter {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("report is not utf-8")
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
