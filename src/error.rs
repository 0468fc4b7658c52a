//! The error kinds the engine can surface to a command.

use std::fmt;
use std::io;

/// An error produced while reading or mutating the image.
#[derive(Debug)]
pub enum Error {
	/// A positioned read or write returned short, or the underlying syscall
	/// failed.
	Io {
		offset: u64,
		len: usize,
		source: io::Error,
	},
	/// The superblock magic did not match `0xEF53`.
	NotExt2,
	/// No inode is free in any group.
	OutOfInodes,
	/// No block is free in any group.
	OutOfBlocks,
	/// A lookup did not find the requested name.
	NotFound,
	/// A create-style operation found the name already present.
	AlreadyExists,
	/// An operation required a directory but the inode is not one.
	NotDirectory,
	/// An operation required a non-directory but the inode is one.
	IsDirectory,
	/// `rmdir` on a directory containing more than `.` and `..`.
	NotEmpty,
	/// A name longer than 255 bytes.
	NameTooLong,
	/// A directory insert found no block with a large enough slack run, and
	/// directory growth is not implemented.
	NoSpaceInDir,
}

impl Error {
	pub fn io(offset: u64, len: usize, source: io::Error) -> Self {
		Self::Io {
			offset,
			len,
			source,
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Io { offset, len, source } => {
				write!(f, "I/O error at offset {offset} (len {len}): {source}")
			}
			Self::NotExt2 => write!(f, "not a valid ext2 filesystem"),
			Self::OutOfInodes => write!(f, "no free inodes available"),
			Self::OutOfBlocks => write!(f, "no free blocks available"),
			Self::NotFound => write!(f, "no such file or directory"),
			Self::AlreadyExists => write!(f, "file or directory already exists"),
			Self::NotDirectory => write!(f, "not a directory"),
			Self::IsDirectory => write!(f, "is a directory"),
			Self::NotEmpty => write!(f, "directory is not empty"),
			Self::NameTooLong => write!(f, "name is too long"),
			Self::NoSpaceInDir => write!(f, "no space left in directory"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io { source, .. } => Some(source),
			_ => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
