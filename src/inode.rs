//! Inodes: the fixed-size per-file/per-directory metadata record.

use crate::device::Device;
use crate::error::Result;
use crate::group_desc::GroupDescriptor;
use crate::layout::block_offset;
use crate::layout::group_of_inode;
use crate::layout::index_in_group_of_inode;
use utils::util::from_bytes;
use utils::util::reinterpret;

/// Mode type bit: regular file.
pub const S_IFREG: u16 = 0x8000;
/// Mode type bit: directory.
pub const S_IFDIR: u16 = 0x4000;
/// Mode type bit: symbolic link.
pub const S_IFLNK: u16 = 0xA000;
/// Mask isolating the type bits within a mode.
const S_IFMT: u16 = 0xF000;

/// Directory entry `file_type` values.
pub const FT_UNKNOWN: u8 = 0;
pub const FT_REG_FILE: u8 = 1;
pub const FT_DIR: u8 = 2;
pub const FT_SYMLINK: u8 = 7;

/// Number of block pointers in an inode: 12 direct, 1 single-indirect, 1
/// double-indirect, 1 triple-indirect.
pub const N_BLOCKS: usize = 15;

/// The tagged variant an inode's mode resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
	Regular,
	Directory,
	Symlink,
	Other,
}

/// An inode record, fixed-size within the per-group inode table.
///
/// Declared `repr(C)` rather than `repr(C, packed)`: every field here
/// already falls on a naturally aligned offset (verified by the size
/// assertion below), so dropping `packed` reproduces the exact on-disk
/// layout while letting callers index `block` and friends without
/// tripping the packed-field-reference restriction.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Inode {
	pub mode: u16,
	pub uid: u16,
	pub size_low: u32,
	pub atime: u32,
	pub ctime: u32,
	pub mtime: u32,
	pub dtime: u32,
	pub gid: u16,
	pub links_count: u16,
	pub blocks: u32,
	pub flags: u32,
	pub osd1: u32,
	pub block: [u32; N_BLOCKS],
	pub generation: u32,
	pub file_acl: u32,
	pub size_high: u32,
	pub faddr: u32,
	pub osd2: [u8; 12],
}

const _: () = assert!(std::mem::size_of::<Inode>() == 128);

impl Inode {
	/// A zeroed inode, used as the starting point for `touch`/`mkdir`.
	pub fn zeroed() -> Self {
		unsafe { std::mem::zeroed() }
	}

	/// Byte offset of inode `n` (1-based) in the image.
	pub fn offset(
		dev: &mut Device,
		n: u32,
		inodes_per_group: u32,
		inode_size: usize,
		block_size: u32,
	) -> Result<u64> {
		let group = group_of_inode(n, inodes_per_group);
		let index = index_in_group_of_inode(n, inodes_per_group);
		let gd = GroupDescriptor::read(dev, group, block_size)?;
		let table_block = gd.inode_table;
		Ok(block_offset(table_block, block_size) + index as u64 * inode_size as u64)
	}

	/// Reads inode `n` (1-based).
	pub fn read(
		dev: &mut Device,
		n: u32,
		inodes_per_group: u32,
		inode_size: usize,
		block_size: u32,
	) -> Result<Self> {
		let off = Self::offset(dev, n, inodes_per_group, inode_size, block_size)?;
		// On-disk inode records may be larger than `size_of::<Inode>()` in
		// revision 1 (extra fields beyond this struct go unused); only the
		// leading 128 bytes are read back.
		let bytes = dev.read_at(off, std::mem::size_of::<Self>())?;
		Ok(from_bytes(&bytes))
	}

	/// Writes inode `n` (1-based).
	pub fn write(
		&self,
		dev: &mut Device,
		n: u32,
		inodes_per_group: u32,
		inode_size: usize,
		block_size: u32,
	) -> Result<()> {
		let off = Self::offset(dev, n, inodes_per_group, inode_size, block_size)?;
		dev.write_at(off, reinterpret(self))
	}

	/// The inode's type, derived from the mode's type bits.
	pub fn kind(&self) -> Kind {
		match self.mode & S_IFMT {
			S_IFREG => Kind::Regular,
			S_IFDIR => Kind::Directory,
			S_IFLNK => Kind::Symlink,
			_ => Kind::Other,
		}
	}

	/// An inode is live iff it has outstanding links and has not been
	/// marked deleted.
	pub fn is_live(&self) -> bool {
		self.links_count > 0 && self.dtime == 0
	}

	/// Full 64-bit size (`size_high << 32 | size_low`). The engine never
	/// creates files large enough to need `size_high`, but preserves it on
	/// round-trip.
	pub fn size(&self) -> u64 {
		((self.size_high as u64) << 32) | self.size_low as u64
	}

	pub fn set_size(&mut self, size: u64) {
		self.size_low = size as u32;
		self.size_high = (size >> 32) as u32;
	}
}

/// Maps a directory-entry `file_type` byte to the mode type bits to use when
/// initialising a fresh inode of that kind.
pub fn file_type_to_mode_bits(file_type: u8) -> u16 {
	match file_type {
		FT_DIR => S_IFDIR,
		FT_SYMLINK => S_IFLNK,
		_ => S_IFREG,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn kind_from_mode() {
		let mut inode = Inode::zeroed();
		inode.mode = S_IFREG | 0o644;
		assert_eq!(inode.kind(), Kind::Regular);
		inode.mode = S_IFDIR | 0o755;
		assert_eq!(inode.kind(), Kind::Directory);
		inode.mode = S_IFLNK | 0o777;
		assert_eq!(inode.kind(), Kind::Symlink);
	}

	#[test]
	fn live_requires_links_and_no_dtime() {
		let mut inode = Inode::zeroed();
		assert!(!inode.is_live());
		inode.links_count = 1;
		assert!(inode.is_live());
		inode.dtime = 123;
		assert!(!inode.is_live());
	}

	#[test]
	fn size_round_trip() {
		let mut inode = Inode::zeroed();
		inode.set_size(0x1_0000_0001);
		assert_eq!(inode.size(), 0x1_0000_0001);
	}
}
