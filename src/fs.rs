//! Typed metadata I/O: superblock, group descriptors, inodes and data
//! blocks, all addressed through [`Device`] + [`layout`](crate::layout).
//!
//! `Filesystem` owns the only process-wide state besides the image handle
//! itself: an in-memory copy of the superblock, kept current with every
//! mutation and re-read only at open. There is no block cache beyond that:
//! every other metadata access re-reads from disk, which is slow but needs
//! no invalidation logic.

use crate::device::Device;
use crate::error::Result;
use crate::group_desc::GroupDescriptor;
use crate::inode::Inode;
use crate::layout::block_offset;
use crate::superblock::Superblock;
use std::path::Path;

pub struct Filesystem {
	pub device: Device,
	pub superblock: Superblock,
}

impl Filesystem {
	/// Opens `path` and reads its superblock. Fails with
	/// [`crate::error::Error::NotExt2`] if the magic does not match.
	pub fn open(path: &Path) -> Result<Self> {
		let mut device = Device::open(path)?;
		let superblock = Superblock::read(&mut device)?;
		Ok(Self { device, superblock })
	}

	pub fn block_size(&self) -> u32 {
		self.superblock.block_size()
	}

	pub fn inode_size(&self) -> usize {
		self.superblock.inode_size()
	}

	/// Persists the in-memory superblock back to the image.
	pub fn write_superblock(&mut self) -> Result<()> {
		self.superblock.write(&mut self.device)
	}

	pub fn read_group_desc(&mut self, g: u32) -> Result<GroupDescriptor> {
		let block_size = self.block_size();
		GroupDescriptor::read(&mut self.device, g, block_size)
	}

	pub fn write_group_desc(&mut self, g: u32, gd: &GroupDescriptor) -> Result<()> {
		let block_size = self.block_size();
		gd.write(&mut self.device, g, block_size)
	}

	pub fn read_inode(&mut self, n: u32) -> Result<Inode> {
		let inodes_per_group = self.superblock.inodes_per_group;
		let inode_size = self.inode_size();
		let block_size = self.block_size();
		Inode::read(&mut self.device, n, inodes_per_group, inode_size, block_size)
	}

	pub fn write_inode(&mut self, n: u32, inode: &Inode) -> Result<()> {
		let inodes_per_group = self.superblock.inodes_per_group;
		let inode_size = self.inode_size();
		let block_size = self.block_size();
		inode.write(&mut self.device, n, inodes_per_group, inode_size, block_size)
	}

	/// Reads a full block-sized buffer. Block 0 is never a valid argument.
	pub fn read_block(&mut self, block: u32) -> Result<Vec<u8>> {
		let off = block_offset(block, self.block_size());
		self.device.read_at(off, self.block_size() as usize)
	}

	/// Writes a full block-sized buffer.
	pub fn write_block(&mut self, block: u32, bytes: &[u8]) -> Result<()> {
		debug_assert_eq!(bytes.len(), self.block_size() as usize);
		let off = block_offset(block, self.block_size());
		self.device.write_at(off, bytes)
	}

	/// Which group a given inode number belongs to.
	pub fn group_of_inode(&self, n: u32) -> u32 {
		crate::layout::group_of_inode(n, self.superblock.inodes_per_group)
	}

	/// Which group a given block number belongs to (0-based block index
	/// within the volume, i.e. `block - 1`).
	pub fn group_of_block(&self, block: u32) -> u32 {
		(block - 1) / self.superblock.blocks_per_group
	}
}


#[cfg(test)]
mod test {
	use super::test_image;
	use super::*;

	#[test]
	fn open_reads_superblock() {
		let path = test_image::build(16, 128);
		let fs = Filesystem::open(&path).unwrap();
		assert_eq!(fs.block_size(), 1024);
		assert_eq!(fs.superblock.total_inodes, 16);
		std::fs::remove_file(path).ok();
	}

	#[test]
	fn read_root_inode_is_a_live_directory() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = fs.read_inode(crate::superblock::ROOT_INODE).unwrap();
		assert_eq!(root.kind(), crate::inode::Kind::Directory);
		assert!(root.is_live());
		std::fs::remove_file(path).ok();
	}
}
