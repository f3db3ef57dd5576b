use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Return the newest line currently in the file at `path`.
///
/// A missing file yields an empty string rather than an error, so a log that
/// minidlna has not created yet looks the same as a log with nothing new in
/// it. Callers that need to tell a first run apart from a misconfigured path
/// should check for the file themselves. Every other I/O failure is returned.
///
/// The whole file is scanned on every call; minidlna's log is rotated and
/// stays small.
pub fn last_line(path: &Path) -> io::Result<String> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(e),
    };

    let mut last: Vec<u8> = Vec::new();
    for chunk in BufReader::new(file).split(b'\n') {
        last = chunk?;
    }

    if last.last() == Some(&b'\r') {
        last.pop();
    }
    Ok(String::from_utf8_lossy(&last).into_owned())
}
