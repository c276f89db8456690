//! Leaf utilities for comparing file contents.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Bytes inspected by the binary probe.
const PROBE_LEN: usize = 8192;

const CHUNK_LEN: usize = 8192;

/// Compare two files for byte equality without loading either fully
/// into memory. A length mismatch short-circuits.
pub fn files_differ(left: &Path, right: &Path) -> io::Result<bool> {
    if std::fs::metadata(left)?.len() != std::fs::metadata(right)?.len() {
        return Ok(true);
    }

    let mut left = BufReader::new(File::open(left)?);
    let mut right = BufReader::new(File::open(right)?);
    let mut lbuf = [0u8; CHUNK_LEN];
    let mut rbuf = [0u8; CHUNK_LEN];

    loop {
        let ln = read_chunk(&mut left, &mut lbuf)?;
        let rn = read_chunk(&mut right, &mut rbuf)?;
        if ln != rn || lbuf[..ln] != rbuf[..rn] {
            return Ok(true);
        }
        if ln == 0 {
            return Ok(false);
        }
    }
}

/// Probe a file for binary content: a NUL byte within the first 8 KiB
/// marks it binary (the git heuristic).
pub fn is_binary(path: &Path) -> io::Result<bool> {
    let mut buf = [0u8; PROBE_LEN];
    let mut file = File::open(path)?;
    let n = read_chunk(&mut file, &mut buf)?;
    Ok(buf[..n].contains(&0))
}

/// Fill `buf` as far as the reader allows, retrying short reads.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_identical_files_do_not_differ() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"hello\nworld\n");
        let b = write_file(&dir, "b", b"hello\nworld\n");
        assert!(!files_differ(&a, &b).unwrap());
    }

    #[test]
    fn test_same_length_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"aaaa");
        let b = write_file(&dir, "b", b"aaab");
        assert!(files_differ(&a, &b).unwrap());
    }

    #[test]
    fn test_length_mismatch_differs() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"short");
        let b = write_file(&dir, "b", b"much longer content");
        assert!(files_differ(&a, &b).unwrap());
    }

    #[test]
    fn test_binary_probe() {
        let dir = TempDir::new().unwrap();
        let text = write_file(&dir, "t", b"plain text content\n");
        let binary = write_file(&dir, "b", b"\x00\x01\x02binary");
        assert!(!is_binary(&text).unwrap());
        assert!(is_binary(&binary).unwrap());
    }
}
