//! Local photo previews for optimistic placeholders.
//!
//! A preview is an owned resource: created once when a placeholder is born,
//! released exactly once when the placeholder reaches a terminal state. The
//! registry keeps the image bytes as a base64 data URL so the UI can render
//! a picked photo before the CDN copy exists, and revokes them on release.

use base64::Engine;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// URL scheme for preview handles.
pub const PREVIEW_URL_SCHEME: &str = "preview://";

/// Registry of live preview resources.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: Mutex<HashMap<Uuid, String>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers preview data for a picked file and returns the owning
    /// handle. The URL stays resolvable until the handle is released.
    pub fn create(self: &Arc<Self>, mime_type: &str, data: &[u8]) -> PreviewHandle {
        let id = Uuid::new_v4();
        let data_url = format!(
            "data:{};base64,{}",
            mime_type,
            base64::engine::general_purpose::STANDARD.encode(data)
        );
        self.entries.lock().unwrap().insert(id, data_url);
        log::debug!("Preview {} registered ({} bytes)", id, data.len());
        PreviewHandle {
            id,
            url: format!("{}{}", PREVIEW_URL_SCHEME, id),
            registry: Arc::clone(self),
        }
    }

    /// Resolves a preview URL to its data URL, or None once released.
    pub fn resolve(&self, url: &str) -> Option<String> {
        let id = url.strip_prefix(PREVIEW_URL_SCHEME)?;
        let id = Uuid::parse_str(id).ok()?;
        self.entries.lock().unwrap().get(&id).cloned()
    }

    /// Number of previews not yet released.
    pub fn active(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn revoke(&self, id: Uuid) {
        self.entries.lock().unwrap().remove(&id);
        log::debug!("Preview {} released", id);
    }
}

/// Owning handle for one registered preview.
///
/// Not cloneable: the upload service keeps the handle for the lifetime of
/// its placeholder while the store only sees the URL string, so the
/// resource is released exactly once.
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    url: String,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Explicitly releases the preview. Dropping the handle has the same
    /// effect; this form marks the terminal transition at the call site.
    pub fn release(self) {}
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
    }
}
