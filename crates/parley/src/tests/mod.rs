
use std::path::PathBuf;

use uuid::Uuid;

/// Fresh directory under the system temp dir, removed on drop.
pub(crate) struct TempDir(PathBuf);

impl TempDir {
    #[allow(clippy::unwrap_used)]
    pub(crate) fn new() -> Self {
        let path = std::env::temp_dir().join(format!("parley-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub(crate) fn path(&self) -> &std::path::Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
