//! A positioned byte stream over the image file.

use crate::error::Error;
use crate::error::Result;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::path::Path;

/// Wraps the image file descriptor. Reads and writes never short-return:
/// on short I/O the call fails with [`Error::Io`] instead of silently
/// returning less data than asked for.
pub struct Device {
	file: File,
}

impl Device {
	/// Opens `path` for read-write access. The image is held open for the
	/// lifetime of the returned `Device` and released when it is dropped.
	pub fn open(path: &Path) -> Result<Self> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.open(path)
			.map_err(|e| Error::io(0, 0, e))?;
		Ok(Self { file })
	}

	/// Reads exactly `len` bytes starting at `offset`.
	pub fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
		let mut buf = vec![0u8; len];
		self.file
			.seek(SeekFrom::Start(offset))
			.map_err(|e| Error::io(offset, len, e))?;
		self.file
			.read_exact(&mut buf)
			.map_err(|e| Error::io(offset, len, e))?;
		Ok(buf)
	}

	/// Writes `bytes` at `offset`.
	pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
		self.file
			.seek(SeekFrom::Start(offset))
			.map_err(|e| Error::io(offset, bytes.len(), e))?;
		self.file
			.write_all(bytes)
			.map_err(|e| Error::io(offset, bytes.len(), e))?;
		Ok(())
	}
}
