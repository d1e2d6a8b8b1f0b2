//! Where the admin session token lives between requests.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Persists the bearer token attached to API requests.
pub trait TokenStore: Send + Sync {
    fn load<'a>(&'a self) -> StoreFuture<'a, Option<String>>;

    fn save<'a>(&'a self, token: &'a str) -> StoreFuture<'a, ()>;

    fn clear<'a>(&'a self) -> StoreFuture<'a, ()>;
}

/// Token kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load<'a>(&'a self) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.token.read().await.clone()) })
    }

    fn save<'a>(&'a self, token: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            *self.token.write().await = Some(token.to_string());
            Ok(())
        })
    }

    fn clear<'a>(&'a self) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            *self.token.write().await = None;
            Ok(())
        })
    }
}

/// Raw token in a single file. A missing or blank file means logged out.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load<'a>(&'a self) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) => {
                    let token = contents.trim();
                    Ok((!token.is_empty()).then(|| token.to_string()))
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    fn save<'a>(&'a self, token: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }

            let mut options = tokio::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&self.path).await?;
            file.write_all(token.as_bytes()).await?;
            file.flush().await?;

            // `mode` only applies on create; tighten a file left by an older version
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
            }

            Ok(())
        })
    }

    fn clear<'a>(&'a self) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("orecart-token-{}-{name}", std::process::id()))
            .join("token")
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("abc").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let path = scratch_path("round-trip");
        let store = FileTokenStore::new(&path);

        assert_eq!(store.load().await.unwrap(), None);

        store.save("eyJhbGciOi").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("eyJhbGciOi"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        // Clearing twice is fine
        store.clear().await.unwrap();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = scratch_path("mode");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).save("eyJhbGciOi").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "eyJhbGciOi");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_file_store_ignores_blank_file() {
        let path = scratch_path("blank");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "  \n").unwrap();

        assert_eq!(FileTokenStore::new(&path).load().await.unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
