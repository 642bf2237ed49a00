use std::path::Path;

use uuid::Uuid;

// Uploaded images live under a per-entity directory with a random name; the
// original filename is discarded except for its suffix so uploads can never
// collide or overwrite each other.

pub fn upload_path(kind: &str, original_name: &str) -> String {
    let suffix = Path::new(original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    format!("images/{}/{}{}", kind, Uuid::new_v4().simple(), suffix)
}
