//! The ext2 superblock: on-disk layout and typed read/write.

use crate::device::Device;
use crate::error::Error;
use crate::error::Result;
use crate::layout::BASE_OFFSET;
use crate::layout::SUPERBLOCK_SIZE;
use utils::util::from_bytes;
use utils::util::pow2;
use utils::util::reinterpret;

/// The filesystem's magic number, at `s_magic`.
pub const EXT2_SIGNATURE: u16 = 0xef53;
/// The root directory is always inode 2.
pub const ROOT_INODE: u32 = 2;

/// The ext2 superblock structure, as it appears on disk (1024 bytes).
///
/// Field names and layout are taken from the revision-1 on-disk format;
/// reserved/unused fields are kept so a read-modify-write round-trip never
/// corrupts them.
///
/// `repr(C)` rather than `repr(C, packed)`: every field already falls on a
/// naturally aligned offset, so this is the same 1024-byte layout without
/// the packed-field-reference restriction on `volume_name` and friends.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Superblock {
	pub total_inodes: u32,
	pub total_blocks: u32,
	pub superuser_blocks: u32,
	pub free_blocks_count: u32,
	pub free_inodes_count: u32,
	pub superblock_block_number: u32,
	pub block_size_log: u32,
	pub fragment_size_log: u32,
	pub blocks_per_group: u32,
	pub fragments_per_group: u32,
	pub inodes_per_group: u32,
	pub last_mount_timestamp: u32,
	pub last_write_timestamp: u32,
	pub mount_count_since_fsck: u16,
	pub mount_count_before_fsck: u16,
	pub signature: u16,
	pub fs_state: u16,
	pub error_action: u16,
	pub minor_version: u16,
	pub last_fsck_timestamp: u32,
	pub fsck_interval: u32,
	pub os_id: u32,
	pub major_version: u32,
	pub uid_reserved: u16,
	pub gid_reserved: u16,

	// Extended superblock fields (revision 1).
	pub first_non_reserved_inode: u32,
	pub inode_size: u16,
	pub superblock_group: u16,
	pub optional_features: u32,
	pub required_features: u32,
	pub write_required_features: u32,
	pub filesystem_id: [u8; 16],
	pub volume_name: [u8; 16],
	pub last_mount_path: [u8; 64],
	pub compression_algorithms: u32,
	pub files_preallocate_count: u8,
	pub directories_preallocate_count: u8,
	_unused: u16,
	pub journal_id: [u8; 16],
	pub journal_inode: u32,
	pub journal_device: u32,
	pub orphan_inode_head: u32,

	_padding: [u8; 788],
}

const _: () = assert!(std::mem::size_of::<Superblock>() == 1024);

impl Superblock {
	/// Reads the superblock from the image.
	pub fn read(dev: &mut Device) -> Result<Self> {
		let bytes = dev.read_at(BASE_OFFSET, SUPERBLOCK_SIZE as usize)?;
		let sb: Self = from_bytes(&bytes);
		if sb.signature != EXT2_SIGNATURE {
			return Err(Error::NotExt2);
		}
		Ok(sb)
	}

	/// Writes the superblock back to the image.
	pub fn write(&self, dev: &mut Device) -> Result<()> {
		dev.write_at(BASE_OFFSET, reinterpret(self))
	}

	/// The block size in bytes: `1024 << s_log_block_size`.
	pub fn block_size(&self) -> u32 {
		pow2(self.block_size_log + 10) as u32
	}

	/// The size of one inode table entry.
	pub fn inode_size(&self) -> usize {
		if self.major_version >= 1 {
			self.inode_size as usize
		} else {
			128
		}
	}

	/// Number of block groups covering the whole filesystem.
	pub fn group_count(&self) -> u32 {
		crate::layout::group_count(self.total_blocks, self.blocks_per_group)
	}

	/// The volume name, trimmed at the first NUL (or the full 16 bytes if
	/// there is none).
	pub fn volume_name(&self) -> String {
		let end = self
			.volume_name
			.iter()
			.position(|&b| b == 0)
			.unwrap_or(self.volume_name.len());
		String::from_utf8_lossy(&self.volume_name[..end]).into_owned()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn block_size_from_log() {
		let mut sb: Superblock = unsafe { std::mem::zeroed() };
		sb.block_size_log = 0;
		assert_eq!(sb.block_size(), 1024);
		sb.block_size_log = 1;
		assert_eq!(sb.block_size(), 2048);
		sb.block_size_log = 2;
		assert_eq!(sb.block_size(), 4096);
	}

	#[test]
	fn inode_size_rev0_is_128() {
		let mut sb: Superblock = unsafe { std::mem::zeroed() };
		sb.major_version = 0;
		sb.inode_size = 256;
		assert_eq!(sb.inode_size(), 128);
		sb.major_version = 1;
		assert_eq!(sb.inode_size(), 256);
	}

	#[test]
	fn volume_name_trims_at_nul() {
		let mut sb: Superblock = unsafe { std::mem::zeroed() };
		sb.volume_name[0] = b'r';
		sb.volume_name[1] = b'o';
		sb.volume_name[2] = b'o';
		sb.volume_name[3] = b't';
		assert_eq!(sb.volume_name(), "root");
	}
}
