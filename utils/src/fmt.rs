//! Formatting helpers shared by the commands that print inode attributes.

use std::ffi::c_long;
use std::mem::MaybeUninit;

/// Type bits within an inode's mode field.
const S_IFDIR: u16 = 0x4000;
const S_IFREG: u16 = 0x8000;
const S_IFLNK: u16 = 0xA000;

const S_IRUSR: u16 = 0o400;
const S_IWUSR: u16 = 0o200;
const S_IXUSR: u16 = 0o100;
const S_IRGRP: u16 = 0o040;
const S_IWGRP: u16 = 0o020;
const S_IXGRP: u16 = 0o010;
const S_IROTH: u16 = 0o004;
const S_IWOTH: u16 = 0o002;
const S_IXOTH: u16 = 0o001;

/// Renders an inode's mode as a `ls -l`-style string: one type letter
/// followed by `rwxrwxrwx`.
pub fn mode_to_string(mode: u16) -> String {
	let mut s = String::with_capacity(10);
	s.push(match mode & 0xF000 {
		S_IFDIR => 'd',
		S_IFLNK => 'l',
		_ => '-',
	});
	let bits = [
		(S_IRUSR, 'r'),
		(S_IWUSR, 'w'),
		(S_IXUSR, 'x'),
		(S_IRGRP, 'r'),
		(S_IWGRP, 'w'),
		(S_IXGRP, 'x'),
		(S_IROTH, 'r'),
		(S_IWOTH, 'w'),
		(S_IXOTH, 'x'),
	];
	for (bit, c) in bits {
		s.push(if mode & bit != 0 { c } else { '-' });
	}
	s
}

/// Formats a byte count as a human-readable size (`B`, `KiB`, `MiB`, ...),
/// one decimal place past bytes.
pub fn format_size(size: u64) -> String {
	const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
	if size < 1024 {
		return format!("{size} B");
	}
	let mut value = size as f64;
	let mut unit = 0;
	while value >= 1024.0 && unit < UNITS.len() - 1 {
		value /= 1024.0;
		unit += 1;
	}
	format!("{value:.1} {}", UNITS[unit])
}

/// Formats a Unix timestamp using the host's local timezone, `DD/MM/YYYY
/// HH:MM:SS`. Returns `N/A` for a zero timestamp (the ext2 convention for
/// "unset").
pub fn format_time(timestamp: u32) -> String {
	if timestamp == 0 {
		return "N/A".to_string();
	}
	let time = timestamp as c_long;
	let mut tm = MaybeUninit::<libc::tm>::uninit();
	let tm = unsafe {
		libc::localtime_r(&time, tm.as_mut_ptr());
		tm.assume_init()
	};
	format!(
		"{:02}/{:02}/{} {:02}:{:02}:{:02}",
		tm.tm_mday,
		tm.tm_mon + 1,
		tm.tm_year + 1900,
		tm.tm_hour,
		tm.tm_min,
		tm.tm_sec
	)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn mode_to_string_regular() {
		assert_eq!(mode_to_string(S_IFREG | 0o644), "-rw-r--r--");
	}

	#[test]
	fn mode_to_string_directory() {
		assert_eq!(mode_to_string(S_IFDIR | 0o755), "drwxr-xr-x");
	}

	#[test]
	fn format_size_buckets() {
		assert_eq!(format_size(0), "0 B");
		assert_eq!(format_size(1023), "1023 B");
		assert_eq!(format_size(1024), "1.0 KiB");
		assert_eq!(format_size(1536), "1.5 KiB");
	}

	#[test]
	fn format_time_zero_is_na() {
		assert_eq!(format_time(0), "N/A");
	}
}
