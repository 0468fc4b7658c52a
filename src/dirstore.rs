//! Iterates, inserts into, removes from and renames within the entry list
//! packed into a directory's direct data blocks.
//!
//! Indirect directory blocks are out of scope: real ext2 directories rarely
//! exceed the 12 direct blocks' worth of entries, and the source this engine
//! is modelled on never grows past them either.

use crate::dirent;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::inode::FT_DIR;
use utils::util::round_up_4;

/// One non-tombstone entry as seen while iterating a directory.
pub struct Entry {
	pub inode: u32,
	pub name: Vec<u8>,
	pub file_type: u8,
}

/// Calls `visit` for each non-tombstone entry of `dir_inode`, in
/// block-then-offset order.
pub fn iterate(fs: &mut Filesystem, dir_inode: u32, mut visit: impl FnMut(Entry)) -> Result<()> {
	let inode = fs.read_inode(dir_inode)?;
	let block_size = fs.block_size();
	for &block_num in inode.block[..12].iter() {
		if block_num == 0 {
			continue;
		}
		let block = fs.read_block(block_num)?;
		let mut offset = 0u32;
		while offset < block_size {
			let e = dirent::read_entry(&block, offset);
			if e.rec_len == 0 {
				break;
			}
			if !e.is_tombstone() {
				visit(Entry {
					inode: e.inode,
					name: e.name.to_vec(),
					file_type: e.file_type,
				});
			}
			offset += e.rec_len as u32;
		}
	}
	Ok(())
}

/// Returns the inode number of `name` in `dir_inode`, or 0 if absent.
pub fn lookup(fs: &mut Filesystem, dir_inode: u32, name: &[u8]) -> Result<u32> {
	let mut found = 0;
	iterate(fs, dir_inode, |e| {
		if found == 0 && e.name == name {
			found = e.inode;
		}
	})?;
	Ok(found)
}

/// Inserts `(child_inode, name, file_type)` into `dir_inode`, splitting the
/// first slot across any direct block whose slack is large enough. Bumps
/// the parent's link count when the new entry is a directory (the new
/// child's `..` back-reference).
pub fn insert(
	fs: &mut Filesystem,
	dir_inode: u32,
	child_inode: u32,
	name: &[u8],
	file_type: u8,
) -> Result<()> {
	if name.len() > dirent::NAME_MAX {
		return Err(Error::NameTooLong);
	}
	let parent = fs.read_inode(dir_inode)?;
	let block_size = fs.block_size();
	let needed = dirent::ideal_len(name.len() as u8);

	for &block_num in parent.block[..12].iter() {
		if block_num == 0 {
			continue;
		}
		let mut block = fs.read_block(block_num)?;
		let mut offset = 0u32;
		while offset < block_size {
			let e = dirent::read_entry(&block, offset);
			let ideal = dirent::ideal_len(e.name_len);
			let slack = e.rec_len as u32 - ideal;

			if slack >= needed {
				dirent::set_rec_len(&mut block, offset, ideal as u16);
				dirent::write_entry(
					&mut block,
					offset + ideal,
					child_inode,
					slack as u16,
					name.len() as u8,
					file_type,
					name,
				);
				fs.write_block(block_num, &block)?;

				if file_type == FT_DIR {
					let mut parent = parent;
					parent.links_count += 1;
					fs.write_inode(dir_inode, &parent)?;
				}
				return Ok(());
			}
			offset += e.rec_len as u32;
		}
	}
	Err(Error::NoSpaceInDir)
}

/// Removes `name` from `dir_inode`. The first entry in a block becomes a
/// tombstone (its `rec_len` still contributes to the block-sum invariant);
/// any later entry is coalesced into its predecessor's `rec_len`.
pub fn remove(fs: &mut Filesystem, dir_inode: u32, name: &[u8]) -> Result<()> {
	let parent = fs.read_inode(dir_inode)?;
	let block_size = fs.block_size();

	for &block_num in parent.block[..12].iter() {
		if block_num == 0 {
			continue;
		}
		let mut block = fs.read_block(block_num)?;
		let mut offset = 0u32;
		let mut prev_offset: Option<u32> = None;
		while offset < block_size {
			let e = dirent::read_entry(&block, offset);
			if !e.is_tombstone() && e.name == name {
				if let Some(prev) = prev_offset {
					let prev_entry = dirent::read_entry(&block, prev);
					let combined = prev_entry.rec_len + e.rec_len;
					dirent::set_rec_len(&mut block, prev, combined);
				} else {
					dirent::set_inode(&mut block, offset, 0);
				}
				fs.write_block(block_num, &block)?;
				return Ok(());
			}
			prev_offset = Some(offset);
			offset += e.rec_len as u32;
		}
	}
	Err(Error::NotFound)
}

/// Renames `old_name` to `new_name` within `dir_inode`. If the existing
/// slot's `rec_len` is large enough to hold the longer name, the name is
/// overwritten in place; otherwise falls back to `insert` + `remove`,
/// which is not atomic (spec-O-3): if `remove` fails after a successful
/// `insert` the directory ends up with two entries aliasing one inode.
pub fn rename_in_place(
	fs: &mut Filesystem,
	dir_inode: u32,
	old_name: &[u8],
	new_name: &[u8],
) -> Result<()> {
	if new_name.len() > dirent::NAME_MAX {
		return Err(Error::NameTooLong);
	}
	let parent = fs.read_inode(dir_inode)?;
	let block_size = fs.block_size();
	let needed = dirent::HEADER_LEN + round_up_4(new_name.len() as u32);

	for &block_num in parent.block[..12].iter() {
		if block_num == 0 {
			continue;
		}
		let mut block = fs.read_block(block_num)?;
		let mut offset = 0u32;
		while offset < block_size {
			let e = dirent::read_entry(&block, offset);
			if !e.is_tombstone() && e.name == old_name {
				if e.rec_len as u32 >= needed {
					let inode = e.inode;
					let file_type = e.file_type;
					let rec_len = e.rec_len;
					dirent::write_entry(
						&mut block,
						offset,
						inode,
						rec_len,
						new_name.len() as u8,
						file_type,
						new_name,
					);
					fs.write_block(block_num, &block)?;
					return Ok(());
				}
				let inode = e.inode;
				let file_type = e.file_type;
				insert(fs, dir_inode, inode, new_name, file_type)?;
				remove(fs, dir_inode, old_name)?;
				return Ok(());
			}
			offset += e.rec_len as u32;
		}
	}
	Err(Error::NotFound)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::fs::test_image;
	use crate::inode::FT_REG_FILE;

	#[test]
	fn insert_then_lookup() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;

		insert(&mut fs, root, 11, b"a", FT_REG_FILE).unwrap();
		assert_eq!(lookup(&mut fs, root, b"a").unwrap(), 11);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn insert_directory_bumps_parent_link_count() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;
		let before = fs.read_inode(root).unwrap().links_count;

		insert(&mut fs, root, 11, b"docs", FT_DIR).unwrap();
		let after = fs.read_inode(root).unwrap().links_count;
		assert_eq!(after, before + 1);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn remove_first_entry_leaves_tombstone_and_block_sum_intact() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;

		remove(&mut fs, root, b".").unwrap();
		assert_eq!(lookup(&mut fs, root, b".").unwrap(), 0);
		// ".." must still be reachable; block-sum invariant holds because
		// the tombstone kept its rec_len.
		assert_eq!(lookup(&mut fs, root, b"..").unwrap(), 2);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn remove_nonexistent_fails() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;
		assert!(matches!(remove(&mut fs, root, b"nope"), Err(Error::NotFound)));
		std::fs::remove_file(path).ok();
	}

	#[test]
	fn rename_round_trip_preserves_lookup() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;
		insert(&mut fs, root, 11, b"a", FT_REG_FILE).unwrap();

		rename_in_place(&mut fs, root, b"a", b"b").unwrap();
		assert_eq!(lookup(&mut fs, root, b"a").unwrap(), 0);
		assert_eq!(lookup(&mut fs, root, b"b").unwrap(), 11);

		rename_in_place(&mut fs, root, b"b", b"a").unwrap();
		assert_eq!(lookup(&mut fs, root, b"a").unwrap(), 11);
		assert_eq!(lookup(&mut fs, root, b"b").unwrap(), 0);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn name_too_long_is_rejected() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();
		let root = crate::superblock::ROOT_INODE;
		let ok_name = vec![b'a'; 255];
		let too_long = vec![b'a'; 256];
		insert(&mut fs, root, 11, &ok_name, FT_REG_FILE).unwrap();
		assert!(matches!(
			insert(&mut fs, root, 12, &too_long, FT_REG_FILE),
			Err(Error::NameTooLong)
		));
		std::fs::remove_file(path).ok();
	}
}
