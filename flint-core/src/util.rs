use std::path::Path;

/// Returns `true` iff `path` exists and is a directory. Any probe
/// failure, including a missing path or a permission error, reads as
/// "not a directory".
pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_is_not_a_directory() {
        assert!(!dir_exists("/definitely/not/here"));
    }

    #[test]
    fn regular_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(!dir_exists(&file));
    }

    #[test]
    fn existing_directory_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(dir_exists(dir.path()));
    }
}
