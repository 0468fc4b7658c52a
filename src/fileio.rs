//! Reads a file inode's payload across the direct, single-indirect and
//! double-indirect block chains, and frees that same chain when a file is
//! deleted. Triple-indirect is never populated by this engine and is not
//! read back.

use crate::allocator;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::inode::Inode;

const DIRECT_COUNT: usize = 12;
const IND_IDX: usize = 12;
const DIND_IDX: usize = 13;

/// One chunk of file content: the full block buffer plus how many of its
/// leading bytes are part of the file (the last chunk may be short).
pub struct Chunk {
	pub bytes: Vec<u8>,
	pub usable_len: usize,
}

/// Calls `visit` once per data chunk of `inode`, in file order, until its
/// declared size is exhausted. A zero pointer anywhere in the chain yields a
/// zero-filled chunk (sparse hole or truncated source image) rather than
/// failing.
pub fn read_contents(
	fs: &mut Filesystem,
	inode: &Inode,
	mut visit: impl FnMut(Chunk),
) -> Result<()> {
	let block_size = fs.block_size() as usize;
	let size = inode.size() as usize;
	if size == 0 {
		return Ok(());
	}
	let total_blocks = (size + block_size - 1) / block_size;
	let ptrs_per_block = block_size / 4;

	let mut ind_cache: Option<(u32, Vec<u8>)> = None;
	let mut dind_cache: Option<(u32, Vec<u8>)> = None;

	for i in 0..total_blocks {
		let block_num = resolve_block(fs, inode, i, ptrs_per_block, &mut ind_cache, &mut dind_cache)?;
		let bytes = if block_num == 0 {
			vec![0u8; block_size]
		} else {
			fs.read_block(block_num)?
		};
		let remaining = size - i * block_size;
		let usable_len = remaining.min(block_size);
		visit(Chunk { bytes, usable_len });
	}
	Ok(())
}

/// Resolves the data block number for logical block index `i` of `inode`.
fn resolve_block(
	fs: &mut Filesystem,
	inode: &Inode,
	i: usize,
	ptrs_per_block: usize,
	ind_cache: &mut Option<(u32, Vec<u8>)>,
	dind_cache: &mut Option<(u32, Vec<u8>)>,
) -> Result<u32> {
	if i < DIRECT_COUNT {
		return Ok(inode.block[i]);
	}

	let i = i - DIRECT_COUNT;
	if i < ptrs_per_block {
		let ind_block = inode.block[IND_IDX];
		return read_ptr(fs, ind_block, i, ind_cache);
	}

	let i = i - ptrs_per_block;
	let dind_block = inode.block[DIND_IDX];
	if dind_block == 0 {
		return Ok(0);
	}
	let outer_index = i / ptrs_per_block;
	let inner_index = i % ptrs_per_block;
	let ind_block = read_ptr(fs, dind_block, outer_index, dind_cache)?;
	read_ptr(fs, ind_block, inner_index, ind_cache)
}

/// Reads the `index`-th little-endian `u32` pointer out of `block_num`,
/// keeping the last-read indirect block around since consecutive logical
/// blocks usually share one.
fn read_ptr(
	fs: &mut Filesystem,
	block_num: u32,
	index: usize,
	cache: &mut Option<(u32, Vec<u8>)>,
) -> Result<u32> {
	if block_num == 0 {
		return Ok(0);
	}
	if !matches!(cache, Some((b, _)) if *b == block_num) {
		let bytes = fs.read_block(block_num)?;
		*cache = Some((block_num, bytes));
	}
	let bytes = &cache.as_ref().unwrap().1;
	let o = index * 4;
	Ok(u32::from_le_bytes(bytes[o..o + 4].try_into().unwrap()))
}

/// Frees every data block reachable from `inode`'s block pointers, plus the
/// indirect-pointer blocks themselves, in traversal order.
pub fn free_all_blocks(fs: &mut Filesystem, inode: &Inode) -> Result<()> {
	for &b in &inode.block[..DIRECT_COUNT] {
		allocator::free_block(fs, b)?;
	}

	let ind_block = inode.block[IND_IDX];
	if ind_block != 0 {
		free_pointer_chain(fs, ind_block)?;
		allocator::free_block(fs, ind_block)?;
	}

	let dind_block = inode.block[DIND_IDX];
	if dind_block != 0 {
		let block_size = fs.block_size() as usize;
		let ptrs_per_block = block_size / 4;
		let bytes = fs.read_block(dind_block)?;
		for idx in 0..ptrs_per_block {
			let o = idx * 4;
			let ind_block = u32::from_le_bytes(bytes[o..o + 4].try_into().unwrap());
			if ind_block != 0 {
				free_pointer_chain(fs, ind_block)?;
				allocator::free_block(fs, ind_block)?;
			}
		}
		allocator::free_block(fs, dind_block)?;
	}

	// Triple-indirect is never populated by this engine; nothing to walk.
	Ok(())
}

/// Frees every non-zero data block pointed to by the pointers packed into
/// `ind_block`.
fn free_pointer_chain(fs: &mut Filesystem, ind_block: u32) -> Result<()> {
	let block_size = fs.block_size() as usize;
	let ptrs_per_block = block_size / 4;
	let bytes = fs.read_block(ind_block)?;
	for idx in 0..ptrs_per_block {
		let o = idx * 4;
		let b = u32::from_le_bytes(bytes[o..o + 4].try_into().unwrap());
		if b != 0 {
			allocator::free_block(fs, b)?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::fs::test_image;

	#[test]
	fn reads_direct_blocks_up_to_size() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();

		let b1 = allocator::allocate_block(&mut fs).unwrap();
		let b2 = allocator::allocate_block(&mut fs).unwrap();
		fs.write_block(b1, &vec![1u8; 1024]).unwrap();
		fs.write_block(b2, &vec![2u8; 1024]).unwrap();

		let mut inode = Inode::zeroed();
		inode.block[0] = b1;
		inode.block[1] = b2;
		inode.set_size(1500);

		let mut chunks = vec![];
		read_contents(&mut fs, &inode, |c| chunks.push(c)).unwrap();

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[0].usable_len, 1024);
		assert_eq!(chunks[1].usable_len, 476);
		assert_eq!(chunks[1].bytes[0], 2);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn sparse_hole_reads_as_zeros() {
		let path = test_image::build(16, 128);
		let mut fs = Filesystem::open(&path).unwrap();

		let mut inode = Inode::zeroed();
		inode.block[0] = 0;
		inode.set_size(1024);

		let mut chunks = vec![];
		read_contents(&mut fs, &inode, |c| chunks.push(c)).unwrap();
		assert_eq!(chunks.len(), 1);
		assert!(chunks[0].bytes.iter().all(|&b| b == 0));

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn reads_through_single_indirect_block() {
		let path = test_image::build(32, 256);
		let mut fs = Filesystem::open(&path).unwrap();

		let ind = allocator::allocate_block(&mut fs).unwrap();
		let data = allocator::allocate_block(&mut fs).unwrap();
		fs.write_block(data, &vec![9u8; 1024]).unwrap();

		let mut ptrs = vec![0u8; 1024];
		ptrs[0..4].copy_from_slice(&data.to_le_bytes());
		fs.write_block(ind, &ptrs).unwrap();

		let mut inode = Inode::zeroed();
		inode.block[IND_IDX] = ind;
		// 12 direct blocks (all holes) plus one indirect block of real data.
		inode.set_size((DIRECT_COUNT as u64 + 1) * 1024);

		let mut chunks = vec![];
		read_contents(&mut fs, &inode, |c| chunks.push(c)).unwrap();
		assert_eq!(chunks.len(), DIRECT_COUNT + 1);
		assert_eq!(chunks[DIRECT_COUNT].bytes[0], 9);

		std::fs::remove_file(path).ok();
	}

	#[test]
	fn free_all_blocks_reclaims_direct_and_indirect() {
		let path = test_image::build(32, 256);
		let mut fs = Filesystem::open(&path).unwrap();
		let before = fs.superblock.free_blocks_count;

		let direct = allocator::allocate_block(&mut fs).unwrap();
		let ind = allocator::allocate_block(&mut fs).unwrap();
		let data = allocator::allocate_block(&mut fs).unwrap();
		let mut ptrs = vec![0u8; 1024];
		ptrs[0..4].copy_from_slice(&data.to_le_bytes());
		fs.write_block(ind, &ptrs).unwrap();

		let mut inode = Inode::zeroed();
		inode.block[0] = direct;
		inode.block[IND_IDX] = ind;

		free_all_blocks(&mut fs, &inode).unwrap();
		assert_eq!(fs.superblock.free_blocks_count, before);

		std::fs::remove_file(path).ok();
	}
}
