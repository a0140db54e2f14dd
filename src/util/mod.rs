mod time;
mod writer;

pub use time::{file_stamp, format_local, now_utc, utc_rfc3339};
pub use writer::{ArtifactKind, ArtifactStore, ArtifactWriter};

use std::path::PathBuf;

use url::Url;

/// Accepts either a bare path or a `file://` URI for a local photo.
///
/// URIs are percent-decoded and may name `localhost` as host. Anything that
/// does not parse as a file URI is taken as a path verbatim.
pub fn local_path(reference: &str) -> PathBuf {
    let trimmed = reference.trim();
    if trimmed.starts_with("file:") {
        if let Some(path) = Url::parse(trimmed)
            .ok()
            .and_then(|url| url.to_file_path().ok())
        {
            return path;
        }
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn file_uris_become_paths() {
        assert_eq!(local_path("file:///tmp/a.jpg"), PathBuf::from("/tmp/a.jpg"));
        assert_eq!(local_path(" /tmp/b.png "), PathBuf::from("/tmp/b.png"));
    }

    #[cfg(unix)]
    #[test]
    fn file_uris_are_decoded_and_drop_localhost() {
        assert_eq!(
            local_path("file:///tmp/my%20photo.jpg"),
            PathBuf::from("/tmp/my photo.jpg")
        );
        assert_eq!(
            local_path("file://localhost/tmp/a.jpg"),
            PathBuf::from("/tmp/a.jpg")
        );
        assert_eq!(
            local_path("file:///storage/DCIM/Caf%C3%A9%20%231.jpg"),
            PathBuf::from("/storage/DCIM/Café #1.jpg")
        );
    }

    #[test]
    fn relative_paths_pass_through() {
        assert_eq!(local_path("photos/cat.jpg"), PathBuf::from("photos/cat.jpg"));
    }
}
