//! Tracks the shell's current directory as an inode number plus the stack of
//! names that got it there, so `pwd` can print a root-anchored path without
//! the engine needing parent pointers.

use crate::dirstore;
use crate::error::Error;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::inode::Kind;
use crate::superblock::ROOT_INODE;

pub struct Path {
	current_inode: u32,
	names: Vec<String>,
}

impl Path {
	/// Starts at the filesystem root.
	pub fn root() -> Self {
		Self {
			current_inode: ROOT_INODE,
			names: Vec::new(),
		}
	}

	pub fn current_inode(&self) -> u32 {
		self.current_inode
	}

	/// The root-anchored path, e.g. `/a/b`, or `/` at the root.
	pub fn display(&self) -> String {
		if self.names.is_empty() {
			"/".to_string()
		} else {
			format!("/{}", self.names.join("/"))
		}
	}

	/// `.` is a no-op, `..` pops and re-walks from root, anything else looks
	/// up `name` in the current directory and descends into it.
	pub fn cd(&mut self, fs: &mut Filesystem, name: &str) -> Result<()> {
		match name {
			"." => Ok(()),
			".." => {
				if self.names.is_empty() {
					return Ok(());
				}
				self.names.pop();
				self.current_inode = Self::walk_from_root(fs, &self.names)?;
				Ok(())
			}
			_ => {
				let child = dirstore::lookup(fs, self.current_inode, name.as_bytes())?;
				if child == 0 {
					return Err(Error::NotFound);
				}
				let inode = fs.read_inode(child)?;
				if inode.kind() != Kind::Directory {
					return Err(Error::NotDirectory);
				}
				self.names.push(name.to_string());
				self.current_inode = child;
				Ok(())
			}
		}
	}

	/// Re-resolves an inode by walking `names` from the root, used after a
	/// `..` pop since the engine keeps no parent pointers.
	fn walk_from_root(fs: &mut Filesystem, names: &[String]) -> Result<u32> {
		let mut inode = ROOT_INODE;
		for name in names {
			let child = dirstore::lookup(fs, inode, name.as_bytes())?;
			if child == 0 {
				return Err(Error::NotFound);
			}
			inode = child;
		}
		Ok(inode)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::fs::test_image;
	use crate::inode::FT_DIR;

	#[test]
	fn starts_at_root() {
		let path = Path::root();
		assert_eq!(path.current_inode(), ROOT_INODE);
		assert_eq!(path.display(), "/");
	}

	#[test]
	fn cd_into_child_and_back_up() {
		let img = test_image::build(16, 128);
		let mut fs = Filesystem::open(&img).unwrap();
		dirstore::insert(&mut fs, ROOT_INODE, 11, b"a", FT_DIR).unwrap();

		let mut path = Path::root();
		path.cd(&mut fs, "a").unwrap();
		assert_eq!(path.current_inode(), 11);
		assert_eq!(path.display(), "/a");

		path.cd(&mut fs, "..").unwrap();
		assert_eq!(path.current_inode(), ROOT_INODE);
		assert_eq!(path.display(), "/");

		std::fs::remove_file(img).ok();
	}

	#[test]
	fn dot_is_noop_and_root_dotdot_is_noop() {
		let img = test_image::build(16, 128);
		let mut fs = Filesystem::open(&img).unwrap();
		let mut path = Path::root();
		path.cd(&mut fs, ".").unwrap();
		assert_eq!(path.current_inode(), ROOT_INODE);
		path.cd(&mut fs, "..").unwrap();
		assert_eq!(path.current_inode(), ROOT_INODE);
		std::fs::remove_file(img).ok();
	}

	#[test]
	fn cd_into_file_fails() {
		let img = test_image::build(16, 128);
		let mut fs = Filesystem::open(&img).unwrap();
		dirstore::insert(&mut fs, ROOT_INODE, 11, b"f", crate::inode::FT_REG_FILE).unwrap();
		let mut path = Path::root();
		assert!(matches!(path.cd(&mut fs, "f"), Err(Error::NotDirectory)));
		std::fs::remove_file(img).ok();
	}

	#[test]
	fn cd_into_missing_fails() {
		let img = test_image::build(16, 128);
		let mut fs = Filesystem::open(&img).unwrap();
		let mut path = Path::root();
		assert!(matches!(path.cd(&mut fs, "nope"), Err(Error::NotFound)));
		std::fs::remove_file(img).ok();
	}
}
