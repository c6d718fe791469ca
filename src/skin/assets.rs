use std::path::PathBuf;

use crate::error::PlayerError;
use crate::skin::archive::Archive;

/// Uniform way to get asset bytes, whether they live inside a skin bundle or
/// as loose files in a directory. Loaders stay agnostic about which one they
/// were given.
pub enum AssetSource {
    Bundle(Archive),
    Directory(PathBuf),
}

impl AssetSource {
    pub fn resolve(&self, name: &str) -> Result<Vec<u8>, PlayerError> {
        match self {
            AssetSource::Bundle(archive) => {
                let entry = archive
                    .lookup(name)
                    .ok_or_else(|| PlayerError::NotFound(name.to_string()))?;
                archive.read_entry(entry)
            }
            AssetSource::Directory(base) => {
                let path = base.join(name);
                std::fs::read(&path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        PlayerError::NotFound(path.display().to_string())
                    } else {
                        PlayerError::Io(e)
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AssetSource;
    use crate::error::PlayerError;

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("retroamp-assets-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn directory_source_reads_loose_files() {
        let dir = temp_dir("loose");
        std::fs::write(dir.join("MAIN.BMP"), b"pixels").expect("write asset");

        let source = AssetSource::Directory(dir.clone());
        assert_eq!(source.resolve("MAIN.BMP").expect("asset resolves"), b"pixels");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn directory_source_misses_map_to_not_found() {
        let dir = temp_dir("miss");
        let source = AssetSource::Directory(dir.clone());
        match source.resolve("NOPE.BMP") {
            Err(PlayerError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(dir);
    }
}
