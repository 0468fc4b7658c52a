//! The packed, variable-length directory entry list stored in a directory's
//! data blocks.
//!
//! Each entry is `{inode(4), rec_len(2), name_len(1), file_type(1),
//! name[name_len]}` padded to a 4-byte boundary. A block's invariant is
//! `sum(rec_len) == block_size`; the last entry's `rec_len` always reaches
//! the block end. A tombstone has `inode == 0` but still contributes its
//! `rec_len`.

/// Fixed header size preceding the name bytes.
pub const HEADER_LEN: u32 = 8;
/// Maximum name length (ext2 `EXT2_NAME_LEN`).
pub const NAME_MAX: usize = 255;

/// A read-only view of one directory entry at a known offset within a block.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
	pub offset: u32,
	pub inode: u32,
	pub rec_len: u16,
	pub name_len: u8,
	pub file_type: u8,
	pub name: &'a [u8],
}

impl<'a> EntryView<'a> {
	/// Whether this is a tombstone (deleted) entry.
	pub fn is_tombstone(&self) -> bool {
		self.inode == 0
	}
}

/// Parses the entry at `offset` within `block`.
pub fn read_entry(block: &[u8], offset: u32) -> EntryView<'_> {
	let o = offset as usize;
	let inode = u32::from_le_bytes(block[o..o + 4].try_into().unwrap());
	let rec_len = u16::from_le_bytes(block[o + 4..o + 6].try_into().unwrap());
	let name_len = block[o + 6];
	let file_type = block[o + 7];
	let name = &block[o + 8..o + 8 + name_len as usize];
	EntryView {
		offset,
		inode,
		rec_len,
		name_len,
		file_type,
		name,
	}
}

/// Writes a full entry (header + name) at `offset` within `block`.
pub fn write_entry(
	block: &mut [u8],
	offset: u32,
	inode: u32,
	rec_len: u16,
	name_len: u8,
	file_type: u8,
	name: &[u8],
) {
	let o = offset as usize;
	block[o..o + 4].copy_from_slice(&inode.to_le_bytes());
	block[o + 4..o + 6].copy_from_slice(&rec_len.to_le_bytes());
	block[o + 6] = name_len;
	block[o + 7] = file_type;
	block[o + 8..o + 8 + name.len()].copy_from_slice(name);
}

/// Overwrites just the `rec_len` field of the entry at `offset`.
pub fn set_rec_len(block: &mut [u8], offset: u32, rec_len: u16) {
	let o = offset as usize;
	block[o + 4..o + 6].copy_from_slice(&rec_len.to_le_bytes());
}

/// Overwrites just the `inode` field of the entry at `offset` (used to turn
/// an entry into, or out of, a tombstone).
pub fn set_inode(block: &mut [u8], offset: u32, inode: u32) {
	let o = offset as usize;
	block[o..o + 4].copy_from_slice(&inode.to_le_bytes());
}

/// The minimal record size for a name of `name_len` bytes: header plus the
/// name rounded up to a 4-byte boundary.
pub fn ideal_len(name_len: u8) -> u32 {
	HEADER_LEN + utils::util::round_up_4(name_len as u32)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn write_then_read_round_trips() {
		let mut block = vec![0u8; 64];
		write_entry(&mut block, 0, 7, 16, 4, 1, b"file");
		let e = read_entry(&block, 0);
		assert_eq!(e.inode, 7);
		assert_eq!(e.rec_len, 16);
		assert_eq!(e.name_len, 4);
		assert_eq!(e.file_type, 1);
		assert_eq!(e.name, b"file");
	}

	#[test]
	fn tombstone_detection() {
		let mut block = vec![0u8; 16];
		write_entry(&mut block, 0, 0, 16, 4, 0, b"gone");
		assert!(read_entry(&block, 0).is_tombstone());
	}

	#[test]
	fn ideal_len_rounds_name_to_4() {
		assert_eq!(ideal_len(1), 12); // 8 + round_up_4(1) = 8 + 4
		assert_eq!(ideal_len(4), 12);
		assert_eq!(ideal_len(5), 16);
	}
}
