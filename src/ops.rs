//! One routine per shell command. Each takes the filesystem and the current
//! [`Path`], and either returns printable output or an [`Error`].

use crate::allocator;
use crate::dirstore;
use crate::error::Error;
use crate::error::Result;
use crate::fileio;
use crate::fs::Filesystem;
use crate::inode::file_type_to_mode_bits;
use crate::inode::Inode;
use crate::inode::Kind;
use crate::inode::FT_DIR;
use crate::inode::FT_REG_FILE;
use crate::inode::S_IFDIR;
use crate::path::Path;
use std::io::Write;

/// Rejects directories with `IsDirectory` and any other non-regular kind
/// (symlinks included) with `NotDirectory`, for operations that only make
/// sense on a regular file's contents.
fn require_regular(inode: &Inode) -> Result<()> {
	if inode.kind() == Kind::Directory {
		Err(Error::IsDirectory)
	} else if inode.kind() != Kind::Regular {
		Err(Error::NotDirectory)
	} else {
		Ok(())
	}
}

/// Prints volume name, size, free space/inodes, block size and group count.
pub fn info(fs: &mut Filesystem) -> String {
	let sb = &fs.superblock;
	let block_size = sb.block_size();
	let total_bytes = sb.total_blocks as u64 * block_size as u64;
	let free_bytes = sb.free_blocks_count as u64 * block_size as u64;
	format!(
		"volume name: {}\ntotal size: {}\nfree space: {}\nfree inodes: {}\nblock size: {} bytes\ngroup count: {}",
		sb.volume_name(),
		utils::fmt::format_size(total_bytes),
		utils::fmt::format_size(free_bytes),
		sb.free_inodes_count,
		block_size,
		sb.group_count(),
	)
}

/// Lists the names present in the current directory.
pub fn ls(fs: &mut Filesystem, path: &Path) -> Result<Vec<String>> {
	let mut names = Vec::new();
	dirstore::iterate(fs, path.current_inode(), |e| {
		names.push(String::from_utf8_lossy(&e.name).into_owned());
	})?;
	Ok(names)
}

pub fn pwd(path: &Path) -> String {
	path.display()
}

pub fn cd(fs: &mut Filesystem, path: &mut Path, name: &str) -> Result<()> {
	path.cd(fs, name)
}

/// Formats `name`'s mode, uid, gid, size and mtime.
pub fn attr(fs: &mut Filesystem, path: &Path, name: &str) -> Result<String> {
	let n = dirstore::lookup(fs, path.current_inode(), name.as_bytes())?;
	if n == 0 {
		return Err(Error::NotFound);
	}
	let inode = fs.read_inode(n)?;
	Ok(format!(
		"{} {} {} {} {}",
		utils::fmt::mode_to_string(inode.mode),
		inode.uid,
		inode.gid,
		utils::fmt::format_size(inode.size()),
		utils::fmt::format_time(inode.mtime),
	))
}

/// Streams a regular file's contents to `out`.
pub fn cat(fs: &mut Filesystem, path: &Path, name: &str, out: &mut impl Write) -> Result<()> {
	let n = dirstore::lookup(fs, path.current_inode(), name.as_bytes())?;
	if n == 0 {
		return Err(Error::NotFound);
	}
	let inode = fs.read_inode(n)?;
	require_regular(&inode)?;
	fileio::read_contents(fs, &inode, |chunk| {
		let _ = out.write_all(&chunk.bytes[..chunk.usable_len]);
	})
}

/// Like [`cat`], but writes into the external file `dest` rather than stdout.
pub fn cp(fs: &mut Filesystem, path: &Path, source: &str, dest: &std::path::Path) -> Result<()> {
	let n = dirstore::lookup(fs, path.current_inode(), source.as_bytes())?;
	if n == 0 {
		return Err(Error::NotFound);
	}
	let inode = fs.read_inode(n)?;
	require_regular(&inode)?;
	let mut file = std::fs::File::create(dest).map_err(|e| Error::io(0, 0, e))?;
	fileio::read_contents(fs, &inode, |chunk| {
		let _ = file.write_all(&chunk.bytes[..chunk.usable_len]);
	})
}

/// Creates an empty regular file. Rolls back the inode allocation if the
/// directory insert fails.
pub fn touch(fs: &mut Filesystem, path: &Path, name: &str) -> Result<()> {
	if dirstore::lookup(fs, path.current_inode(), name.as_bytes())? != 0 {
		return Err(Error::AlreadyExists);
	}
	let n = allocator::allocate_inode(fs)?;
	let now = utils::util::get_timestamp().as_secs() as u32;
	let mut inode = Inode::zeroed();
	inode.mode = file_type_to_mode_bits(FT_REG_FILE) | 0o644;
	inode.links_count = 1;
	inode.atime = now;
	inode.ctime = now;
	inode.mtime = now;
	fs.write_inode(n, &inode)?;

	if let Err(e) = dirstore::insert(fs, path.current_inode(), n, name.as_bytes(), FT_REG_FILE) {
		allocator::free_inode(fs, n)?;
		return Err(e);
	}
	Ok(())
}

/// Creates a directory with `.`/`..` entries. Rolls back allocations in
/// reverse on any failure.
pub fn mkdir(fs: &mut Filesystem, path: &Path, name: &str) -> Result<()> {
	if dirstore::lookup(fs, path.current_inode(), name.as_bytes())? != 0 {
		return Err(Error::AlreadyExists);
	}
	let n = allocator::allocate_inode(fs)?;
	let block = match allocator::allocate_block(fs) {
		Ok(b) => b,
		Err(e) => {
			allocator::free_inode(fs, n)?;
			return Err(e);
		}
	};

	let block_size = fs.block_size();
	let now = utils::util::get_timestamp().as_secs() as u32;
	let mut inode = Inode::zeroed();
	inode.mode = S_IFDIR | 0o755;
	inode.links_count = 2;
	inode.set_size(block_size as u64);
	inode.block[0] = block;
	inode.blocks = block_size / 512;
	inode.atime = now;
	inode.ctime = now;
	inode.mtime = now;

	let mut data = vec![0u8; block_size as usize];
	crate::dirent::write_entry(&mut data, 0, n, 12, 1, FT_DIR, b".");
	crate::dirent::write_entry(
		&mut data,
		12,
		path.current_inode(),
		(block_size - 12) as u16,
		2,
		FT_DIR,
		b"..",
	);

	if let Err(e) = fs
		.write_block(block, &data)
		.and_then(|_| fs.write_inode(n, &inode))
	{
		allocator::free_block(fs, block).ok();
		allocator::free_inode(fs, n).ok();
		return Err(e);
	}

	if let Err(e) = dirstore::insert(fs, path.current_inode(), n, name.as_bytes(), FT_DIR) {
		allocator::free_block(fs, block).ok();
		allocator::free_inode(fs, n).ok();
		return Err(e);
	}
	allocator::mark_directory(fs, n)?;
	Ok(())
}

/// Removes a non-directory entry. Frees the inode and its data blocks once
/// the link count reaches zero.
pub fn rm(fs: &mut Filesystem, path: &Path, name: &str) -> Result<()> {
	let n = dirstore::lookup(fs, path.current_inode(), name.as_bytes())?;
	if n == 0 {
		return Err(Error::NotFound);
	}
	let mut inode = fs.read_inode(n)?;
	if inode.kind() == Kind::Directory {
		return Err(Error::IsDirectory);
	}
	dirstore::remove(fs, path.current_inode(), name.as_bytes())?;

	inode.links_count -= 1;
	if inode.links_count == 0 {
		inode.dtime = utils::util::get_timestamp().as_secs() as u32;
		fileio::free_all_blocks(fs, &inode)?;
		fs.write_inode(n, &inode)?;
		allocator::free_inode(fs, n)?;
	} else {
		fs.write_inode(n, &inode)?;
	}
	Ok(())
}

/// Removes an empty directory, verified both by link count and by scanning
/// its data block.
pub fn rmdir(fs: &mut Filesystem, path: &Path, name: &str) -> Result<()> {
	let n = dirstore::lookup(fs, path.current_inode(), name.as_bytes())?;
	if n == 0 {
		return Err(Error::NotFound);
	}
	let inode = fs.read_inode(n)?;
	if inode.kind() != Kind::Directory {
		return Err(Error::NotDirectory);
	}
	if inode.links_count > 2 {
		return Err(Error::NotEmpty);
	}
	let mut entry_count = 0;
	dirstore::iterate(fs, n, |_| entry_count += 1)?;
	if entry_count > 2 {
		return Err(Error::NotEmpty);
	}

	dirstore::remove(fs, path.current_inode(), name.as_bytes())?;
	let mut parent = fs.read_inode(path.current_inode())?;
	parent.links_count -= 1;
	fs.write_inode(path.current_inode(), &parent)?;

	allocator::free_block(fs, inode.block[0])?;
	allocator::free_inode(fs, n)?;
	Ok(())
}

/// Renames `old` to `new` in the current directory, preferring an in-place
/// rewrite over the non-atomic insert+remove fallback.
pub fn rename(fs: &mut Filesystem, path: &Path, old: &str, new: &str) -> Result<()> {
	if old == new {
		return Ok(());
	}
	if dirstore::lookup(fs, path.current_inode(), new.as_bytes())? != 0 {
		return Err(Error::AlreadyExists);
	}
	if dirstore::lookup(fs, path.current_inode(), old.as_bytes())? == 0 {
		return Err(Error::NotFound);
	}
	dirstore::rename_in_place(fs, path.current_inode(), old.as_bytes(), new.as_bytes())
}
