//! Keeps the mirrored unit-test tree aligned with the source tree

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn rust_files_under(root: &Path) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                    if let Ok(relative) = path.strip_prefix(root) {
                        found.insert(relative.to_string_lossy().replace('\\', "/"));
                    }
                }
            }
        }
        found
    }

    fn is_structural(path: &str) -> bool {
        path == "main.rs" || path == "lib.rs" || path.ends_with("mod.rs")
    }

    // Tests that src/ and tests/unit/ mirror each other file-for-file
    // Verified by deleting a unit test file and by adding an orphan one
    #[test]
    fn test_unit_tree_mirrors_src_tree() {
        let src = rust_files_under(Path::new("src"));
        let unit = rust_files_under(Path::new("tests/unit"));
        assert!(!src.is_empty(), "src directory should contain Rust files");

        let missing: Vec<&String> = src
            .iter()
            .filter(|path| !is_structural(path) && !unit.contains(*path))
            .collect();
        assert!(
            missing.is_empty(),
            "src files without a tests/unit counterpart: {missing:?}"
        );

        let orphaned: Vec<&String> = unit
            .iter()
            .filter(|path| !is_structural(path) && !src.contains(*path))
            .collect();
        assert!(
            orphaned.is_empty(),
            "tests/unit files without a src counterpart: {orphaned:?}"
        );
    }

    // Tests that every test file actually declares at least one test
    // Verified by emptying a unit test file
    #[test]
    fn test_every_test_file_has_tests() {
        let tests_root = Path::new("tests");
        let mut empty: Vec<PathBuf> = Vec::new();
        for relative in rust_files_under(tests_root) {
            if is_structural(&relative) {
                continue;
            }
            let path = tests_root.join(&relative);
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if !content.contains("#[test]") {
                empty.push(path);
            }
        }
        assert!(
            empty.is_empty(),
            "test files without any #[test] functions: {empty:?}"
        );
    }
}
