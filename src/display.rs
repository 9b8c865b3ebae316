use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Consumer of the final annotated image. The shipped implementation
/// writes files; tests substitute a recording fake.
pub trait ImageSink: Send + Sync {
    fn present(&self, key: &str, image: &RgbaImage) -> Result<(), Error>;
}

/// Writes each annotated image as `<key stem>.labeled.png` into the
/// output directory.
pub struct FileSink {
    out_dir: PathBuf,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    fn output_path(&self, key: &str) -> PathBuf {
        // Keys may contain slashes; keep only the final component.
        let stem = Path::new(key)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| key.to_string());
        self.out_dir.join(format!("{}.labeled.png", stem))
    }
}

impl ImageSink for FileSink {
    fn present(&self, key: &str, image: &RgbaImage) -> Result<(), Error> {
        let path = self.output_path(key);
        image
            .save(&path)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}
