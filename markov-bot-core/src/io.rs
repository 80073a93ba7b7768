use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::time::SystemTime;

/// Reads a text file and returns all its non-empty lines.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let reader = BufReader::new(File::open(filename)?);
	let mut lines = Vec::new();
	for line in reader.lines() {
		let line = line?;
		if !line.trim().is_empty() {
			lines.push(line);
		}
	}
	Ok(lines)
}

/// Appends `line` and a line break to a file, creating it if needed.
pub(crate) fn append_line<P: AsRef<Path>>(filename: P, line: &str) -> io::Result<()> {
	let mut file = OpenOptions::new().create(true).append(true).open(filename)?;
	writeln!(file, "{line}")
}

/// Returns the modification time of a file.
///
/// - `Ok(None)` if the file does not exist
/// - Any other failure is returned as is
pub(crate) fn modified<P: AsRef<Path>>(path: P) -> io::Result<Option<SystemTime>> {
	match std::fs::metadata(path) {
		Ok(meta) => meta.modified().map(Some),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err),
	}
}
