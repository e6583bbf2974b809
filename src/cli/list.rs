use crate::error::Result;
use crate::naming::expand_all;
use std::path::PathBuf;

/// Files matched by `patterns`, in the order reverse and join would read them.
pub fn list_order<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    expand_all(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AontError;
    use tempfile::tempdir;

    #[test]
    fn test_list_order_is_natural() {
        let dir = tempdir().unwrap();
        for name in ["s.part9", "s.part10", "s.part1", "s.part010", "other"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pattern = dir.path().join("s.part*").to_string_lossy().into_owned();
        let names: Vec<String> = list_order(&[pattern])
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["s.part1", "s.part9", "s.part010", "s.part10"]);
    }

    #[test]
    fn test_list_without_matches_fails() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("none*").to_string_lossy().into_owned();
        assert!(matches!(list_order(&[pattern]), Err(AontError::Config(_))));
    }
}
