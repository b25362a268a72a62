use std::sync::{Arc, Weak};

use uuid::Uuid;

/// What the presentation layer needs to show a thumbnail of the selected photo.
#[derive(Debug)]
pub struct PreviewData {
    pub url: String,
    pub content_type: String,
    pub bytes: Arc<[u8]>,
}

/// Owned preview resource. Only the engine holds one; dropping it releases
/// the resource and invalidates every handle given out for it.
#[derive(Debug)]
pub struct Preview {
    inner: Arc<PreviewData>,
}

impl Preview {
    pub fn new(content_type: &str, bytes: Arc<[u8]>) -> Self {
        Self {
            inner: Arc::new(PreviewData {
                url: format!("preview:{}", Uuid::new_v4()),
                content_type: content_type.to_string(),
                bytes,
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn handle(&self) -> PreviewHandle {
        PreviewHandle {
            url: self.inner.url.clone(),
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference to a preview. Stops resolving as soon as the engine
/// releases or replaces the preview.
#[derive(Debug, Clone)]
pub struct PreviewHandle {
    url: String,
    inner: Weak<PreviewData>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get(&self) -> Option<Arc<PreviewData>> {
        self.inner.upgrade()
    }

    pub fn is_released(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_resolves_while_preview_alive() {
        let preview = Preview::new("image/png", Arc::from(vec![1u8, 2, 3]));
        let handle = preview.handle();
        assert!(handle.url().starts_with("preview:"));
        assert_eq!(handle.url(), preview.url());
        assert_eq!(handle.get().unwrap().bytes.len(), 3);
        assert!(!handle.is_released());
    }

    #[test]
    fn test_drop_releases_handle() {
        let preview = Preview::new("image/png", Arc::from(vec![0u8; 4]));
        let handle = preview.handle();
        drop(preview);
        assert!(handle.is_released());
        assert!(handle.get().is_none());
    }

    #[test]
    fn test_each_preview_gets_distinct_url() {
        let bytes: Arc<[u8]> = Arc::from(vec![9u8]);
        let a = Preview::new("image/jpeg", bytes.clone());
        let b = Preview::new("image/jpeg", bytes);
        assert_ne!(a.url(), b.url());
    }
}
