//! Allocates and frees inodes and blocks, keeping bitmap bits, group
//! counters and superblock counters mutually consistent.
//!
//! Every allocation writes in a fixed order: bitmap, then superblock, then
//! group descriptor. A crash never leaves a bit marked free while a counter
//! says it's allocated (the opposite mismatch is fsck-repairable). Frees
//! mirror that order.

use crate::bitmap;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::inode::Kind;

/// Finds and claims the lowest-numbered free inode across all groups,
/// ascending. Returns the global (1-based) inode number.
pub fn allocate_inode(fs: &mut Filesystem) -> Result<u32> {
	let groups = fs.superblock.group_count();
	let per_group = fs.superblock.inodes_per_group;

	for g in 0..groups {
		let gd = fs.read_group_desc(g)?;
		if gd.free_inodes_count == 0 {
			continue;
		}
		let mut bitmap = fs.read_block(gd.inode_bitmap)?;
		let Some(bit) = bitmap::find_first_clear(&bitmap, per_group) else {
			continue;
		};
		bitmap::set(&mut bitmap, bit);
		fs.write_block(gd.inode_bitmap, &bitmap)?;

		fs.superblock.free_inodes_count -= 1;
		fs.write_superblock()?;

		let mut gd = gd;
		gd.free_inodes_count -= 1;
		fs.write_group_desc(g, &gd)?;

		return Ok(g * per_group + bit + 1);
	}
	Err(Error::OutOfInodes)
}

/// Finds and claims the lowest-numbered free block across all groups,
/// ascending. Returns the global (1-based) block number.
pub fn allocate_block(fs: &mut Filesystem) -> Result<u32> {
	let groups = fs.superblock.group_count();
	let per_group = fs.superblock.blocks_per_group;

	for g in 0..groups {
		let gd = fs.read_group_desc(g)?;
		if gd.free_blocks_count == 0 {
			continue;
		}
		let mut bitmap = fs.read_block(gd.block_bitmap)?;
		let Some(bit) = bitmap::find_first_clear(&bitmap, per_group) else {
			continue;
		};
		bitmap::set(&mut bitmap, bit);
		fs.write_block(gd.block_bitmap, &bitmap)?;

		fs.superblock.free_blocks_count -= 1;
		fs.write_superblock()?;

		let mut gd = gd;
		gd.free_blocks_count -= 1;
		fs.write_group_desc(g, &gd)?;

		return Ok(g * per_group + bit + 1);
	}
	Err(Error::OutOfBlocks)
}

/// Releases inode `n`. A no-op when `n == 0`. Decrements the owning group's
/// `used_dirs_count` when the inode being freed was a directory.
pub fn free_inode(fs: &mut Filesystem, n: u32) -> Result<()> {
	if n == 0 {
		return Ok(());
	}
	let inode = fs.read_inode(n)?;
	let g = fs.group_of_inode(n);
	let per_group = fs.superblock.inodes_per_group;
	let bit = (n - 1) % per_group;

	let gd = fs.read_group_desc(g)?;
	let mut bitmap = fs.read_block(gd.inode_bitmap)?;
	bitmap::clear(&mut bitmap, bit);
	fs.write_block(gd.inode_bitmap, &bitmap)?;

	fs.superblock.free_inodes_count += 1;
	fs.write_superblock()?;

	let mut gd = gd;
	gd.free_inodes_count += 1;
	if inode.kind() == Kind::Directory {
		gd.used_dirs_count -= 1;
	}
	fs.write_group_desc(g, &gd)?;

	Ok(())
}

/// Releases block `n`. A no-op when `n == 0`.
pub fn free_block(fs: &mut Filesystem, n: u32) -> Result<()> {
	if n == 0 {
		return Ok(());
	}
	let g = fs.group_of_block(n);
	let per_group = fs.superblock.blocks_per_group;
	let bit = (n - 1) % per_group;

	let gd = fs.read_group_desc(g)?;
	let mut bitmap = fs.read_block(gd.block_bitmap)?;
	bitmap::clear(&mut bitmap, bit);
	fs.write_block(gd.block_bitmap, &bitmap)?;

	fs.superblock.free_blocks_count += 1;
	fs.write_superblock()?;

	let mut gd = gd;
	gd.free_blocks_count += 1;
	fs.write_group_desc(g, &gd)?;

	Ok(())
}

/// Increments the `used_dirs_count` of the group owning inode `n`. Called
/// when a freshly allocated inode is initialised as a directory (the
/// allocator itself does not know the kind at allocation time).
pub fn mark_directory(fs: &mut Filesystem, n: u32) -> Result<()> {
	let g = fs.group_of_inode(n);
	let mut gd = fs.read_group_desc(g)?;
	gd.used_dirs_count += 1;
	fs.write_group_desc(g, &gd)
}
