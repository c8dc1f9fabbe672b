//! Background upload pipeline: read file → normalize, tagged with a sequence id.
//!
//! Every submission gets a fresh [`UploadSeq`]. Completions for anything but the
//! latest seq are stale and must be discarded by the caller before allocating
//! resources (see [`UploadPipeline::is_current`]).

use std::path::PathBuf;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::{CustomizerError, Result};
use crate::normalize::{ImageNormalizer, ImageSource, NormalizedImage};

pub type UploadSeq = u64;

#[derive(Debug)]
pub struct UploadCompletion {
    pub seq: UploadSeq,
    /// Display name of the source file
    pub name: String,
    pub result: Result<NormalizedImage>,
}

pub struct UploadPipeline {
    runtime: Handle,
    normalizer: ImageNormalizer,
    tx: UnboundedSender<UploadCompletion>,
    rx: UnboundedReceiver<UploadCompletion>,
    latest: UploadSeq,
    in_flight: usize,
}

impl UploadPipeline {
    pub fn new(runtime: Handle, normalizer: ImageNormalizer) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            runtime,
            normalizer,
            tx,
            rx,
            latest: 0,
            in_flight: 0,
        }
    }

    pub fn latest(&self) -> UploadSeq {
        self.latest
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_current(&self, seq: UploadSeq) -> bool {
        seq == self.latest
    }

    fn next_seq(&mut self) -> UploadSeq {
        self.latest += 1;
        self.in_flight += 1;
        self.latest
    }

    /// Read `path` asynchronously, then normalize it on the blocking pool.
    pub fn submit_path(&mut self, path: PathBuf) -> UploadSeq {
        let seq = self.next_seq();
        let tx = self.tx.clone();
        let normalizer = self.normalizer.clone();
        let name = display_name(&path);

        tracing::info!("Upload #{seq}: reading {}", path.display());
        self.runtime.spawn(async move {
            let result = match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let source = ImageSource::from_path(&path, bytes);
                    run_normalize(normalizer, source).await
                }
                Err(source) => Err(CustomizerError::FileRead { path, source }),
            };
            let _ = tx.send(UploadCompletion { seq, name, result });
        });
        seq
    }

    /// Normalize an in-memory source.
    pub fn submit_source(&mut self, source: ImageSource) -> UploadSeq {
        let seq = self.next_seq();
        let tx = self.tx.clone();
        let normalizer = self.normalizer.clone();
        let name = source.name.clone();

        tracing::info!("Upload #{seq}: {} ({} bytes)", source.name, source.bytes.len());
        self.runtime.spawn(async move {
            let result = run_normalize(normalizer, source).await;
            let _ = tx.send(UploadCompletion { seq, name, result });
        });
        seq
    }

    /// Drain finished uploads (stale ones included; check [`Self::is_current`]).
    pub fn poll(&mut self) -> Vec<UploadCompletion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            done.push(completion);
        }
        done
    }

    /// Wait for the next finished upload. Returns None when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<UploadCompletion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }
}

async fn run_normalize(normalizer: ImageNormalizer, source: ImageSource) -> Result<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalizer.normalize(source))
        .await
        .unwrap_or_else(|e| Err(CustomizerError::Conversion(format!("normalize task failed: {e}"))))
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
