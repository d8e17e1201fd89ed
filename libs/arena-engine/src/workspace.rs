/// Workspace Manager - Per-Attempt Scratch Directories
///
/// Every execution attempt gets its own directory `<root>/attempt-<uuid>`.
/// The directory is created with a non-recursive `create_dir`, so two
/// attempts can never silently share one. Everything the attempt writes
/// (driver source, class files, binaries) lives inside it and goes away with
/// it.
///
/// Release is explicit (`Workspace::release`) on the normal path. If the
/// owning future is dropped or panics first, `Drop` removes the directory
/// synchronously. Removal failures are logged and otherwise ignored: a
/// leaked directory must never change a verdict.
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::adapter::SourceArtifact;

#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh, uniquely named workspace.
    pub async fn acquire(&self) -> io::Result<Workspace> {
        tokio::fs::create_dir_all(&self.root).await?;

        let id = Uuid::new_v4();
        let path = self.root.join(format!("attempt-{}", id));

        let mut builder = tokio::fs::DirBuilder::new();
        builder.mode(0o700);
        builder.create(&path).await?;

        debug!(workspace = %path.display(), "Workspace acquired");
        Ok(Workspace {
            id,
            path,
            released: false,
        })
    }
}

/// Exclusive owner of one attempt's scratch directory.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    path: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a generated source file into the workspace.
    pub async fn write_source(&self, artifact: &SourceArtifact) -> io::Result<PathBuf> {
        let target = self.resolve(&artifact.file_name)?;
        tokio::fs::write(&target, artifact.contents.as_bytes()).await?;
        Ok(target)
    }

    /// Path of a file inside the workspace; plain file names only.
    pub fn resolve(&self, file_name: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.path.join(file_name)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a plain file name", file_name),
            )),
        }
    }

    /// Remove the workspace and everything in it.
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => debug!(workspace = %self.path.display(), "Workspace released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                workspace = %self.path.display(),
                error = %e,
                "Failed to remove workspace"
            ),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Not released through the normal path: the attempt panicked or its
        // future was dropped. Blocking removal is the only option here.
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    workspace = %self.path.display(),
                    error = %e,
                    "Failed to remove abandoned workspace"
                );
            }
        }
    }
}
