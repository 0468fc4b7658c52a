//! The interactive read-eval-print loop: prompts, tokenises a line with
//! [`utils::tokenize`], dispatches to [`crate::ops`], and prints `Error:
//! ...` on stderr without ever exiting on a command failure.

use crate::error::Error;
use crate::fs::Filesystem;
use crate::path::Path;
use std::io;
use std::io::BufRead;
use std::io::Write;
use utils::tokenize::tokenize;

/// Runs the loop until `exit` or EOF on stdin.
pub fn run(fs: &mut Filesystem, path: &mut Path) {
	let stdin = io::stdin();
	loop {
		print!("[{}]$> ", path.display());
		let _ = io::stdout().flush();

		let mut line = String::new();
		let n = stdin.lock().read_line(&mut line).unwrap_or(0);
		if n == 0 {
			println!();
			break;
		}

		let tokens = tokenize(line.trim_end_matches('\n'));
		if tokens.is_empty() {
			continue;
		}

		match dispatch(fs, path, &tokens) {
			Ok(true) => break,
			Ok(false) => {}
			Err(e) => eprintln!("Error: {e}"),
		}
	}
}

/// Returns `Ok(true)` when the shell should exit.
fn dispatch(fs: &mut Filesystem, path: &mut Path, tokens: &[String]) -> Result<bool, Error> {
	let cmd = tokens[0].as_str();
	let args = &tokens[1..];

	match (cmd, args.len()) {
		("info", 0) => {
			println!("{}", crate::ops::info(fs));
		}
		("ls", 0) => {
			for name in crate::ops::ls(fs, path)? {
				println!("{name}");
			}
		}
		("pwd", 0) => {
			println!("{}", crate::ops::pwd(path));
		}
		("cd", 1) => crate::ops::cd(fs, path, &args[0])?,
		("attr", 1) => println!("{}", crate::ops::attr(fs, path, &args[0])?),
		("cat", 1) => {
			let stdout = io::stdout();
			crate::ops::cat(fs, path, &args[0], &mut stdout.lock())?;
		}
		("touch", 1) => crate::ops::touch(fs, path, &args[0])?,
		("mkdir", 1) => crate::ops::mkdir(fs, path, &args[0])?,
		("rm", 1) => crate::ops::rm(fs, path, &args[0])?,
		("rmdir", 1) => crate::ops::rmdir(fs, path, &args[0])?,
		("cp", 2) => crate::ops::cp(fs, path, &args[0], std::path::Path::new(&args[1]))?,
		("rename", 2) => crate::ops::rename(fs, path, &args[0], &args[1])?,
		("exit", 0) => return Ok(true),
		(other, n) => {
			eprintln!("Error: unknown command or wrong argument count: {other} ({n} args)");
		}
	}
	Ok(false)
}
