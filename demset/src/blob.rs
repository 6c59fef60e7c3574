//! Backing-store access.
//!
//! Tile blobs may live on storage that only supports sequential reads
//! efficiently (object storage, archive files). [`WindowedReader`]
//! emulates random access over such a source by keeping one sliding
//! byte window and refilling it with a single sequential read whenever
//! a request falls outside it.

use crate::DemError;
use log::debug;
use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

/// Random access over storage that prefers sequential reads.
pub trait BlobSource {
    /// Total blob size in bytes.
    fn len(&self) -> u64;

    /// Fills `buf` with the bytes starting at `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// A blob backed by a local file.
pub struct FileBlob {
    file: File,
    len: u64,
}

impl FileBlob {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl BlobSource for FileBlob {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)
    }
}

/// A blob held entirely in memory.
pub struct MemBlob {
    bytes: Vec<u8>,
}

impl MemBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl BlobSource for MemBlob {
    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = usize::try_from(offset)
            .ok()
            .filter(|start| start.checked_add(buf.len()).is_some_and(|end| end <= self.bytes.len()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "read past end of blob"))?;
        buf.copy_from_slice(&self.bytes[start..start + buf.len()]);
        Ok(())
    }
}

/// Opens blobs by the opaque path recorded in the catalog manifest.
pub trait BlobStore {
    fn open(&self, path: &str) -> Result<Box<dyn BlobSource>, DemError>;
}

/// Blobs as files under a root directory.
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for DirBlobStore {
    fn open(&self, path: &str) -> Result<Box<dyn BlobSource>, DemError> {
        Ok(Box::new(FileBlob::open(self.root.join(path))?))
    }
}

/// In-memory blob store, for tests and small fixed rasters.
#[derive(Default)]
pub struct MemBlobStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemBlobStore {
    pub fn insert<S: Into<String>>(&mut self, path: S, bytes: Vec<u8>) {
        self.blobs.insert(path.into(), bytes);
    }
}

impl BlobStore for MemBlobStore {
    fn open(&self, path: &str) -> Result<Box<dyn BlobSource>, DemError> {
        match self.blobs.get(path) {
            Some(bytes) => Ok(Box::new(MemBlob::new(bytes.clone()))),
            None => Err(DemError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no blob {path}"),
            ))),
        }
    }
}

/// One sliding read window over a [`BlobSource`].
///
/// Requests inside the window are served from memory. A request
/// outside it recenters the window on the requested offset and refills
/// it with one sequential read.
pub struct WindowedReader {
    source: Box<dyn BlobSource>,
    capacity: usize,
    start: u64,
    window: Vec<u8>,
}

impl WindowedReader {
    pub fn new(source: Box<dyn BlobSource>, capacity: usize) -> Self {
        Self {
            source,
            capacity: capacity.max(1),
            start: 0,
            window: Vec::new(),
        }
    }

    /// Returns `size` bytes at `offset`.
    ///
    /// The in-window test is inclusive at the window start; a request
    /// for the window's first byte does not trigger a refill.
    pub fn read(&mut self, offset: u64, size: usize) -> io::Result<&[u8]> {
        if offset + size as u64 > self.source.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of blob",
            ));
        }
        let in_window = !self.window.is_empty()
            && offset >= self.start
            && offset + size as u64 <= self.start + self.window.len() as u64;
        if !in_window {
            self.refill(offset, size)?;
        }
        let rel = (offset - self.start) as usize;
        Ok(&self.window[rel..rel + size])
    }

    fn refill(&mut self, offset: u64, size: usize) -> io::Result<()> {
        let len = self.source.len();
        let fill = self.capacity.max(size) as u64;
        let mut start = offset.saturating_sub(fill / 2);
        start = start.min(len.saturating_sub(fill));
        if start + fill < offset + size as u64 {
            start = offset + size as u64 - fill;
        }
        let end = len.min(start + fill);
        self.window.resize((end - start) as usize, 0);
        self.source.read_at(start, &mut self.window)?;
        self.start = start;
        debug!("window refill [{start}, {end})");
        Ok(())
    }
}
