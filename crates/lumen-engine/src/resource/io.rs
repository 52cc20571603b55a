use std::path::Path;

use crate::error::IoError;

/// Reads a whole text file.
///
/// An unreadable file and a file with no content are reported as different
/// errors; both carry the path.
pub fn read_text_file(path: impl AsRef<Path>) -> Result<String, IoError> {
    let path = path.as_ref();

    let text = std::fs::read_to_string(path).map_err(|source| IoError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if text.is_empty() {
        return Err(IoError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@vertex fn main() {{}}\n").unwrap();

        let text = read_text_file(file.path()).unwrap();
        assert_eq!(text, "@vertex fn main() {}\n");
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wgsl");

        match read_text_file(&path) {
            Err(IoError::Unreadable { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_reported_separately() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let err = read_text_file(file.path()).unwrap_err();
        assert!(matches!(err, IoError::Empty { .. }));
        assert_eq!(err.path(), file.path());
    }

    #[test]
    fn error_message_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.fs.wgsl");

        let msg = read_text_file(&path).unwrap_err().to_string();
        assert!(msg.contains("gone.fs.wgsl"), "{msg}");
    }
}
