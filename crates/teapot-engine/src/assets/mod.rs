//! Read-only access to bundled files (shader bytecode).
//!
//! On desktop the bundle is a directory; on Android it is the APK asset manager,
//! which the viewer crate wraps in its own `AssetSource`.

use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

/// Source of bundled files addressed by a relative, `/`-separated path.
pub trait AssetSource {
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        std::fs::read(&full).with_context(|| format!("read asset {}", full.display()))
    }
}

/// Reads a SPIR-V module and decodes it into 32-bit words.
///
/// Rejects files whose length is not a multiple of four or that lack the SPIR-V magic.
pub fn load_spirv(assets: &dyn AssetSource, path: &str) -> Result<Vec<u32>> {
    let bytes = assets.read(path)?;
    ash::util::read_spv(&mut Cursor::new(bytes))
        .with_context(|| format!("decode SPIR-V {path}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;

    use super::*;

    const MAGIC: u32 = 0x0723_0203;

    struct MemAssets(HashMap<&'static str, Vec<u8>>);

    impl AssetSource for MemAssets {
        fn read(&self, path: &str) -> Result<Vec<u8>> {
            self.0.get(path).cloned().ok_or_else(|| anyhow!("missing {path}"))
        }
    }

    fn words(ws: &[u32]) -> Vec<u8> {
        ws.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn decodes_little_endian_words() {
        let assets = MemAssets(HashMap::from([("a.spv", words(&[MAGIC, 0x0001_0000, 7]))]));
        let code = load_spirv(&assets, "a.spv").unwrap();
        assert_eq!(code, vec![MAGIC, 0x0001_0000, 7]);
    }

    #[test]
    fn rejects_truncated_bytecode() {
        let mut bytes = words(&[MAGIC, 1]);
        bytes.pop();
        let assets = MemAssets(HashMap::from([("a.spv", bytes)]));
        assert!(load_spirv(&assets, "a.spv").is_err());
    }

    #[test]
    fn missing_asset_error_names_path() {
        let assets = MemAssets(HashMap::new());
        let err = load_spirv(&assets, "shaders/x.spv").unwrap_err();
        assert!(format!("{err:#}").contains("shaders/x.spv"));
    }

    #[test]
    fn dir_assets_reads_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("teapot-assets-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("shaders")).unwrap();
        std::fs::write(dir.join("shaders/a.spv"), words(&[MAGIC])).unwrap();

        let assets = DirAssets::new(dir.clone());
        assert_eq!(load_spirv(&assets, "shaders/a.spv").unwrap(), vec![MAGIC]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
