use std::fs::{create_dir_all, remove_dir_all};
use std::path::{Path, PathBuf};

/// a scratch directory for a single test that gets cleaned up
/// even after a panic
pub struct TestDirectory {
    // individual test dirs to enable test cases to run in parallel
    path: PathBuf,
}

impl TestDirectory {
    /// create (or reuse) `name` under the system temporary directory
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("lottery-wheel-{}", name));
        if let Err(e) = create_dir_all(&path) {
            panic!("could not create test directory {}: {}", path.display(), e);
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TestDirectory {
    fn drop(&mut self) {
        remove_dir_all(&self.path).unwrap();
    }
}
