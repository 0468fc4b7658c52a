//! Block group descriptors: one per block group, packed into a table right
//! after the superblock's block.

use crate::device::Device;
use crate::error::Result;
use crate::layout::group_descriptor_offset;
use utils::util::from_bytes;
use utils::util::reinterpret;

/// A single block group descriptor (32 bytes on disk).
///
/// `repr(C)`, not packed: every field already falls on a naturally aligned
/// offset, so this is the same 32-byte layout without the packed-field
/// restriction.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GroupDescriptor {
	pub block_bitmap: u32,
	pub inode_bitmap: u32,
	pub inode_table: u32,
	pub free_blocks_count: u16,
	pub free_inodes_count: u16,
	pub used_dirs_count: u16,
	_pad: u16,
	_reserved: [u32; 3],
}

const _: () = assert!(std::mem::size_of::<GroupDescriptor>() == 32);

impl GroupDescriptor {
	/// Reads the `g`th group descriptor.
	pub fn read(dev: &mut Device, g: u32, block_size: u32) -> Result<Self> {
		let off = group_descriptor_offset(g, block_size);
		let bytes = dev.read_at(off, std::mem::size_of::<Self>())?;
		Ok(from_bytes(&bytes))
	}

	/// Writes the `g`th group descriptor.
	pub fn write(&self, dev: &mut Device, g: u32, block_size: u32) -> Result<()> {
		let off = group_descriptor_offset(g, block_size);
		dev.write_at(off, reinterpret(self))
	}
}
