//! Capture device seam.
//!
//! The pipeline only needs `open`, `read_frame` and `release`. Pixel capture
//! lives outside this crate; the built-in [`LineCapture`] treats every text
//! line of a feed (a file, or stdin for keyboard-wedge scanners) as one frame.

use std::fmt;
use std::future::Future;
use std::io::{self, BufRead};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::thread;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// One captured frame. The payload is opaque to the pipeline and only
/// interpreted by a [`Decoder`](super::decoder::Decoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device could not be opened. Fatal at start.
    #[error("cannot open device: {0}")]
    Open(String),

    /// A single frame could not be read. The loop keeps going.
    #[error("unreadable frame: {0}")]
    Unreadable(String),

    /// The device has no more frames to give.
    #[error("capture closed")]
    Closed,
}

pub trait CaptureDevice: Send + 'static {
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Wait for the next frame. Must be safe to drop mid-way (the pipeline
    /// abandons it when stop is requested).
    fn read_frame(&mut self) -> impl Future<Output = Result<Frame, CaptureError>> + Send;

    /// Release the device. Called exactly once, on every exit path.
    fn release(&mut self);
}

/// Owns an opened device and releases it when dropped.
pub(crate) struct DeviceGuard<C: CaptureDevice> {
    device: C,
}

impl<C: CaptureDevice> DeviceGuard<C> {
    pub(crate) fn new(device: C) -> Self {
        Self { device }
    }
}

impl<C: CaptureDevice> Deref for DeviceGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.device
    }
}

impl<C: CaptureDevice> DerefMut for DeviceGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.device
    }
}

impl<C: CaptureDevice> Drop for DeviceGuard<C> {
    fn drop(&mut self) {
        self.device.release();
    }
}

type LineReader = Box<dyn AsyncBufRead + Unpin + Send>;

enum LineSource {
    Path(PathBuf),
    Stdin,
    Reader(Option<LineReader>),
}

impl fmt::Debug for LineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSource::Path(p) => write!(f, "Path({})", p.display()),
            LineSource::Stdin => f.write_str("Stdin"),
            LineSource::Reader(_) => f.write_str("Reader"),
        }
    }
}

/// Line-oriented feed: each line read is one frame.
#[derive(Debug)]
pub struct LineCapture {
    source: LineSource,
    reader: Option<FeedReader>,
}

/// Where an opened feed delivers its lines from.
enum FeedReader {
    Stream(LineReader),
    /// Lines pumped by a dedicated stdin thread. A blocked terminal read
    /// never holds up release or runtime shutdown.
    Pumped(mpsc::Receiver<io::Result<Vec<u8>>>),
}

impl fmt::Debug for FeedReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedReader::Stream(_) => f.write_str("Stream"),
            FeedReader::Pumped(_) => f.write_str("Pumped"),
        }
    }
}

const STDIN_BACKLOG: usize = 64;

fn spawn_stdin_pump() -> io::Result<mpsc::Receiver<io::Result<Vec<u8>>>> {
    let (tx, rx) = mpsc::channel(STDIN_BACKLOG);

    thread::Builder::new()
        .name("rollcall-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            loop {
                let mut line = Vec::new();
                let item = match input.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => Ok(line),
                    Err(e) => Err(e),
                };
                let failed = item.is_err();
                // a send error means the capture was released
                if tx.blocking_send(item).is_err() || failed {
                    break;
                }
            }
        })?;

    Ok(rx)
}

impl LineCapture {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: LineSource::Path(path.into()),
            reader: None,
        }
    }

    pub fn stdin() -> Self {
        Self {
            source: LineSource::Stdin,
            reader: None,
        }
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self {
            source: LineSource::Reader(Some(Box::new(reader))),
            reader: None,
        }
    }
}

impl CaptureDevice for LineCapture {
    fn open(&mut self) -> Result<(), CaptureError> {
        let reader = match &mut self.source {
            LineSource::Path(path) => {
                let file = std::fs::File::open(&*path)
                    .map_err(|e| CaptureError::Open(format!("{}: {e}", path.display())))?;
                FeedReader::Stream(Box::new(BufReader::new(tokio::fs::File::from_std(file))))
            }
            LineSource::Stdin => FeedReader::Pumped(
                spawn_stdin_pump().map_err(|e| CaptureError::Open(format!("stdin: {e}")))?,
            ),
            LineSource::Reader(slot) => FeedReader::Stream(
                slot.take()
                    .ok_or_else(|| CaptureError::Open("feed already consumed".into()))?,
            ),
        };

        debug!(source = ?self.source, reader = ?reader, "capture opened");
        self.reader = Some(reader);
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        match self.reader.as_mut().ok_or(CaptureError::Closed)? {
            FeedReader::Stream(reader) => {
                let mut line = Vec::new();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => Err(CaptureError::Closed),
                    Ok(_) => Ok(Frame::new(line)),
                    Err(e) => Err(CaptureError::Unreadable(e.to_string())),
                }
            }
            FeedReader::Pumped(rx) => match rx.recv().await {
                Some(Ok(line)) => Ok(Frame::new(line)),
                Some(Err(e)) => Err(CaptureError::Unreadable(e.to_string())),
                None => Err(CaptureError::Closed),
            },
        }
    }

    fn release(&mut self) {
        if self.reader.take().is_some() {
            debug!(source = ?self.source, "capture released");
        }
    }
}
