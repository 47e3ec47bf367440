use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::Sender;
use tracing::{debug, warn};

use super::{AssetEvent, AssetId, AssetKind, AssetPayload, ModelDesc};
use crate::error::AssetError;

/// Starts a background load; the result arrives on `events` as one [`AssetEvent`]
pub fn spawn_load(id: AssetId, kind: AssetKind, path: PathBuf, events: Sender<AssetEvent>) {
    let spawned = thread::Builder::new()
        .name(format!("asset-{}", id.0))
        .spawn({
            let events = events.clone();
            let path = path.clone();
            move || {
                let result = load_blocking(kind, &path);
                debug!(?id, ?kind, path = %path.display(), ok = result.is_ok(), "asset load finished");
                // Receiver dropped means the tracker is gone; nothing left to notify
                let _ = events.send(AssetEvent { id, result });
            }
        });

    if let Err(source) = spawned {
        warn!(?id, %source, "could not start asset worker");
        let _ = events.send(AssetEvent {
            id,
            result: Err(AssetError::Io { path, source }),
        });
    }
}

/// Reads and decodes an asset on the calling thread
pub fn load_blocking(kind: AssetKind, path: &Path) -> Result<AssetPayload, AssetError> {
    match kind {
        AssetKind::Model => ModelDesc::load(path).map(AssetPayload::Model),
        AssetKind::Font => {
            let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if !looks_like_font(&bytes) {
                return Err(AssetError::InvalidFont {
                    path: path.to_path_buf(),
                });
            }
            Ok(AssetPayload::Font(bytes))
        }
    }
}

/// sfnt version tag check (TrueType, OpenType/CFF, Apple)
fn looks_like_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_font_magic() {
        assert!(looks_like_font(&[0, 1, 0, 0, 9, 9]));
        assert!(looks_like_font(b"OTTO...."));
        assert!(!looks_like_font(b"{\"glyphs\": {}}"));
        assert!(!looks_like_font(&[0, 1]));
    }

    #[test]
    fn test_invalid_font_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"not a font").expect("write");

        let err = load_blocking(AssetKind::Font, file.path()).unwrap_err();
        assert!(matches!(err, AssetError::InvalidFont { .. }));
    }

    #[test]
    fn test_worker_delivers_event() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"(name: "rock", parts: [(geometry: Sphere(radius: 0.5), color: (90, 90, 90, 255))])"#)
            .expect("write");

        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_load(AssetId(3), AssetKind::Model, file.path().to_path_buf(), tx);

        let event = rx.recv_timeout(Duration::from_secs(5)).expect("event");
        assert_eq!(event.id, AssetId(3));
        match event.result {
            Ok(AssetPayload::Model(model)) => assert_eq!(model.name, "rock"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
