//! `e2sh`: an offline, interactive shell for inspecting and editing an ext2
//! image file directly, without mounting it.

mod allocator;
mod bitmap;
mod device;
mod dirent;
mod dirstore;
mod error;
mod fileio;
mod fs;
mod group_desc;
mod inode;
mod layout;
mod ops;
mod path;
mod shell;
mod superblock;

use std::env;
use std::path::PathBuf;
use std::process::exit;

struct Args {
	prog: String,
	image_path: Option<PathBuf>,
}

fn parse_args() -> Args {
	let mut args = Args {
		prog: String::new(),
		image_path: None,
	};
	let mut iter = env::args();
	args.prog = iter.next().unwrap_or_else(|| "e2sh".to_owned());

	if let Some(arg) = iter.next() {
		args.image_path = Some(PathBuf::from(arg));
	}
	args
}

fn main() {
	let args = parse_args();

	let image_path = args.image_path.unwrap_or_else(|| {
		eprintln!("{}: specify path to an ext2 image", args.prog);
		exit(1);
	});

	let mut filesystem = fs::Filesystem::open(&image_path).unwrap_or_else(|e| {
		eprintln!("{}: {}: {}", args.prog, image_path.display(), e);
		exit(1);
	});

	let mut current_path = path::Path::root();
	shell::run(&mut filesystem, &mut current_path);
}
