use std::{
    future::Future,
    io::Write as _,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::{
    export::capture::CapturedImage,
    foundation::{
        core::ResourceHandle,
        error::{ThumbError, ThumbResult},
    },
};

/// Name collisions tried before giving up on a save.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Write permission for the shared media store.
pub enum Permission {
    /// Writes are allowed.
    Granted,
    /// Writes are refused until the user changes settings.
    Denied,
    /// Not asked yet; a request may grant it.
    Undetermined,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A persisted image.
pub struct SavedAsset {
    /// Location of the saved file.
    pub uri: ResourceHandle,
    /// Bytes written.
    pub len: usize,
}

/// Host media library: permission handling plus persistence.
pub trait MediaStore {
    /// Current permission without prompting.
    fn permission(&self) -> impl Future<Output = ThumbResult<Permission>>;
    /// Ask for permission; may prompt the user.
    fn request_permission(&self) -> impl Future<Output = ThumbResult<Permission>>;
    /// Persist `image`. Either the whole file is stored or nothing is.
    fn save(&self, image: &CapturedImage) -> impl Future<Output = ThumbResult<SavedAsset>>;
    /// Send the user to where the permission can be granted out-of-band.
    fn open_settings(&self) -> impl Future<Output = ThumbResult<()>>;
}

#[derive(Clone, Debug)]
/// [`MediaStore`] backed by a directory on disk.
///
/// Files are staged in a temp file inside the directory and renamed into place without
/// overwriting, so readers never observe a partial thumbnail.
pub struct GalleryDir {
    dir: PathBuf,
    allow_write: bool,
}

impl GalleryDir {
    /// Gallery rooted at `dir`; `allow_write = false` behaves like a denied permission.
    pub fn new(dir: impl Into<PathBuf>, allow_write: bool) -> Self {
        Self {
            dir: dir.into(),
            allow_write,
        }
    }

    /// Gallery directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check_access(&self) -> Permission {
        if !self.allow_write {
            return Permission::Denied;
        }
        match std::fs::metadata(&self.dir) {
            Ok(meta) if !meta.is_dir() || meta.permissions().readonly() => Permission::Denied,
            Ok(_) => Permission::Granted,
            Err(_) => Permission::Undetermined,
        }
    }
}

impl MediaStore for GalleryDir {
    async fn permission(&self) -> ThumbResult<Permission> {
        Ok(self.check_access())
    }

    async fn request_permission(&self) -> ThumbResult<Permission> {
        match self.check_access() {
            Permission::Undetermined => match std::fs::create_dir_all(&self.dir) {
                Ok(()) => Ok(self.check_access()),
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), error = %e, "cannot create gallery");
                    Ok(Permission::Denied)
                }
            },
            p => Ok(p),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(dir = %self.dir.display()))]
    async fn save(&self, image: &CapturedImage) -> ThumbResult<SavedAsset> {
        if self.check_access() != Permission::Granted {
            return Err(ThumbError::export("gallery is not writable"));
        }
        let dir = self.dir.clone();
        let bytes = image.bytes.clone();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let stem = format!("thumbnail-{millis}");
        let path = tokio::task::spawn_blocking(move || {
            persist_new(&dir, &bytes, &stem, MAX_NAME_ATTEMPTS)
        })
        .await
        .context("join gallery writer task")??;
        tracing::info!(path = %path.display(), "saved thumbnail");
        Ok(SavedAsset {
            uri: ResourceHandle::from(path),
            len: image.bytes.len(),
        })
    }

    async fn open_settings(&self) -> ThumbResult<()> {
        tracing::info!(
            dir = %self.dir.display(),
            allow_write = self.allow_write,
            "gallery access is configured by `gallery.allow_write` and the directory permissions"
        );
        Ok(())
    }
}

/// Stage `bytes` in a temp file, then rename it to the first free `<stem>[-N].png`.
///
/// On any failure the temp file is removed and no target file is created.
fn persist_new(dir: &Path, bytes: &[u8], stem: &str, max_attempts: u32) -> ThumbResult<PathBuf> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".thumbnail-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;
    tmp.write_all(bytes).context("write thumbnail bytes")?;
    tmp.as_file().sync_all().context("flush thumbnail bytes")?;

    for attempt in 0..max_attempts {
        let name = if attempt == 0 {
            format!("{stem}.png")
        } else {
            format!("{stem}-{attempt}.png")
        };
        let target = dir.join(name);
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => tmp = e.file,
            Err(e) => {
                return Err(anyhow::Error::new(e.error)
                    .context(format!("persist '{}'", target.display()))
                    .into());
            }
        }
    }
    Err(ThumbError::export("no free thumbnail file name"))
}

#[cfg(test)]
#[path = "../../tests/unit/export/media.rs"]
mod tests;
