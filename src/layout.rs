//! Pure arithmetic translating filesystem coordinates into byte offsets.
//!
//! No function here performs I/O; they only know how the on-disk structures
//! are laid out relative to one another.

/// Byte offset of the reserved area preceding the superblock.
pub const BASE_OFFSET: u64 = 1024;
/// Size in bytes of the superblock region.
pub const SUPERBLOCK_SIZE: u64 = 1024;
/// Size in bytes of one group descriptor.
pub const GROUP_DESC_SIZE: u64 = 32;

/// Byte offset of block `block` (1-based; block 0 is unused).
///
/// The source this engine is modelled on only ever ran against 1 KiB block
/// images, where `offset = BASE_OFFSET + (block - 1) * block_size` and
/// `offset = block * block_size` agree. For larger block sizes the two
/// diverge; this implementation picks `max(BASE_OFFSET, block * block_size)`
/// so the superblock always resolves to byte 1024 regardless of block size,
/// per spec-O-1.
pub fn block_offset(block: u32, block_size: u32) -> u64 {
	(block as u64 * block_size as u64).max(BASE_OFFSET)
}

/// Index of the block group containing inode `n` (1-based inode numbers).
pub fn group_of_inode(n: u32, inodes_per_group: u32) -> u32 {
	(n - 1) / inodes_per_group
}

/// Index of inode `n` within its group's inode table.
pub fn index_in_group_of_inode(n: u32, inodes_per_group: u32) -> u32 {
	(n - 1) % inodes_per_group
}

/// Byte offset of the `g`th group descriptor: the group descriptor table
/// immediately follows the superblock's own block, at
/// `BASE_OFFSET + block_size + g * sizeof(group_desc)`.
pub fn group_descriptor_offset(g: u32, block_size: u32) -> u64 {
	BASE_OFFSET + block_size as u64 + g as u64 * GROUP_DESC_SIZE
}

/// Number of groups for a filesystem with `blocks_count` total blocks and
/// `blocks_per_group` blocks in each full group.
pub fn group_count(blocks_count: u32, blocks_per_group: u32) -> u32 {
	utils::util::ceil_division(blocks_count, blocks_per_group)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn block_offset_1k() {
		assert_eq!(block_offset(1, 1024), 1024);
		assert_eq!(block_offset(2, 1024), 2048);
		assert_eq!(block_offset(3, 1024), 3072);
	}

	#[test]
	fn block_offset_4k_pins_superblock_at_1024() {
		assert_eq!(block_offset(0, 4096), 1024);
		assert_eq!(block_offset(1, 4096), 4096);
	}

	#[test]
	fn inode_group_math() {
		// inodes_per_group = 16: inode 1..16 in group 0, 17..32 in group 1.
		assert_eq!(group_of_inode(1, 16), 0);
		assert_eq!(group_of_inode(16, 16), 0);
		assert_eq!(group_of_inode(17, 16), 1);
		assert_eq!(index_in_group_of_inode(1, 16), 0);
		assert_eq!(index_in_group_of_inode(17, 16), 0);
		assert_eq!(index_in_group_of_inode(32, 16), 15);
	}

	#[test]
	fn group_descriptor_offset_1k() {
		assert_eq!(group_descriptor_offset(0, 1024), 2048);
		assert_eq!(group_descriptor_offset(1, 1024), 2080);
	}

	#[test]
	fn group_count_rounds_up() {
		assert_eq!(group_count(1024, 128), 8);
		assert_eq!(group_count(1025, 128), 9);
	}
}
