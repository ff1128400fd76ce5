use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::util::dir_exists;

/// One verbatim copy instruction: everything under `src` lands under
/// `dest`, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// Discover the optional asset directories under `assets_root`.
///
/// `images` and `fonts` each contribute one target when present, in
/// that order. No side effects, safe to call once per build.
pub fn copy_targets(assets_root: &Path) -> Vec<CopyTarget> {
    let mut targets = Vec::new();

    for sub in ["images", "fonts"] {
        let src = assets_root.join(sub);
        if dir_exists(&src) {
            targets.push(CopyTarget {
                src,
                dest: PathBuf::from("assets").join(sub),
            });
        }
    }

    targets
}

/// Copy every file under each target into the output directory,
/// preserving the directory structure below `src`.
pub fn copy_all(targets: &[CopyTarget], output_dir: &Path) -> io::Result<()> {
    for target in targets {
        for entry in WalkDir::new(&target.src).into_iter().filter_map(|e| e.ok()) {
            if !entry.path().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&target.src) else {
                continue;
            };
            let dest = output_dir.join(&target.dest).join(rel);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_asset_directories_means_no_targets() {
        let root = tempfile::tempdir().unwrap();
        assert!(copy_targets(root.path()).is_empty());
    }

    #[test]
    fn images_only() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("images")).unwrap();

        let targets = copy_targets(root.path());
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].src, root.path().join("images"));
        assert_eq!(targets[0].dest, PathBuf::from("assets/images"));
    }

    #[test]
    fn images_before_fonts() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("fonts")).unwrap();
        std::fs::create_dir(root.path().join("images")).unwrap();

        let targets = copy_targets(root.path());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].dest, PathBuf::from("assets/images"));
        assert_eq!(targets[1].dest, PathBuf::from("assets/fonts"));
    }

    #[test]
    fn copy_all_preserves_structure() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("images/logos")).unwrap();
        std::fs::write(root.path().join("images/logos/main.png"), "png").unwrap();

        let targets = copy_targets(root.path());
        copy_all(&targets, out.path()).unwrap();

        let copied = out.path().join("assets/images/logos/main.png");
        assert_eq!(std::fs::read_to_string(copied).unwrap(), "png");
    }
}
