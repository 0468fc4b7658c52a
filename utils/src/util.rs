//! This module implements utility functions.

use std::fmt;
use std::mem::size_of;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Returns the current timestamp since the Unix epoch.
pub fn get_timestamp() -> Duration {
    SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System clock panic!")
}

/// Performs the log2 operatin on the given integer.
///
/// If the result is undefined, the function returns None.
pub fn log2(n: u64) -> Option<u64> {
	let num_bits = (size_of::<u64>() * 8) as u64;

	let n = num_bits - n.leading_zeros() as u64;
	if n > 0 {
		Some(n - 1)
	} else {
		None
	}
}

/// Returns `2^n`.
pub fn pow2(n: u32) -> u64 {
	1u64 << n
}

/// Divides `n` by `d`, rounding the result up.
pub fn ceil_division(n: u32, d: u32) -> u32 {
	(n + d - 1) / d
}

/// Rounds `n` up to the next multiple of 4.
pub fn round_up_4(n: u32) -> u32 {
	(n + 3) & !3
}

/// Reinterprets a `#[repr(C, packed)]` value as its raw on-disk byte
/// representation.
///
/// # Safety
///
/// `T` must have no padding the caller cares about preserving beyond what is
/// already part of its declared fields (true for every `#[repr(C, packed)]`
/// structure in this crate).
pub fn reinterpret<T>(value: &T) -> &[u8] {
	unsafe { std::slice::from_raw_parts(value as *const T as *const u8, size_of::<T>()) }
}

/// Reinterprets a byte buffer as a `#[repr(C, packed)]` value, copying it out.
///
/// # Safety
///
/// `bytes` must be at least `size_of::<T>()` long and `T` must be a type for
/// which any bit pattern is valid (true for every on-disk structure in this
/// crate, which consist solely of integers and byte arrays).
pub fn from_bytes<T: Copy>(bytes: &[u8]) -> T {
	assert!(bytes.len() >= size_of::<T>());
	unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const T) }
}

/// Structure representing a number of bytes.
pub struct ByteSize(pub u64);

impl ByteSize {
	/// Creates a size from a given number of sectors.
	pub fn from_sectors_count(cnt: u64) -> Self {
		Self(cnt * 512)
	}
}

impl fmt::Display for ByteSize {
	fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut order = log2(self.0).unwrap_or(0) / log2(1024).unwrap();

		let suffix = match order {
			0 => "bytes",
			1 => "KiB",
			2 => "MiB",
			3 => "GiB",
			4 => "TiB",
			5 => "PiB",
			6 => "EiB",
			7 => "ZiB",
			8 => "YiB",

			_ => {
				order = 0;
				"bytes"
			}
		};

		let unit = 1024usize.pow(order as u32);
		let nbr = self.0 / unit as u64;

		write!(fmt, "{} {}", nbr, suffix)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn bytesize() {
		assert_eq!(format!("{}", ByteSize(0)).as_str(), "0 bytes");
		assert_eq!(format!("{}", ByteSize(1)).as_str(), "1 bytes");
		assert_eq!(format!("{}", ByteSize(1023)).as_str(), "1023 bytes");
		assert_eq!(format!("{}", ByteSize(1024)).as_str(), "1 KiB");
		assert_eq!(format!("{}", ByteSize(1025)).as_str(), "1 KiB");
		assert_eq!(format!("{}", ByteSize(2048)).as_str(), "2 KiB");
		assert_eq!(format!("{}", ByteSize(1024 * 1024)).as_str(), "1 MiB");
		assert_eq!(
			format!("{}", ByteSize(1024 * 1024 * 1024)).as_str(),
			"1 GiB"
		);
		assert_eq!(
			format!("{}", ByteSize(1024 * 1024 * 1024 * 1024)).as_str(),
			"1 TiB"
		);
	}

	#[test]
	fn round_up_4() {
		assert_eq!(super::round_up_4(0), 0);
		assert_eq!(super::round_up_4(1), 4);
		assert_eq!(super::round_up_4(4), 4);
		assert_eq!(super::round_up_4(5), 8);
	}

	#[test]
	fn ceil_division() {
		assert_eq!(super::ceil_division(0, 4), 0);
		assert_eq!(super::ceil_division(1, 4), 1);
		assert_eq!(super::ceil_division(4, 4), 1);
		assert_eq!(super::ceil_division(5, 4), 2);
	}
}
