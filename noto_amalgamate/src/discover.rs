//! Finding the sources below the source root.

use std::path::{Path, PathBuf};

use glob::glob;

use crate::Error;

fn glob_sorted(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let dir = dir
        .to_str()
        .ok_or_else(|| Error::NonUtf8Path(dir.to_owned()))?;
    let dir = match dir.trim_end_matches('/') {
        "" if dir.starts_with('/') => "",
        "" => ".",
        trimmed => trimmed,
    };
    let pattern = format!("{}/{pattern}", glob::Pattern::escape(dir));
    let paths = glob(&pattern).map_err(|source| Error::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    let mut paths = paths.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

/// The `.glyphs` files directly inside `dir`, sorted by path.
///
/// `dir` must be valid UTF-8 since it becomes part of a glob pattern;
/// otherwise this fails with [`Error::NonUtf8Path`]. The same holds for
/// [`ufo_sources`].
pub fn glyphs_sources(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = glob_sorted(dir, "*.glyphs")?;
    paths.retain(|p| p.is_file());
    Ok(paths)
}

/// The `.ufo` directories anywhere below `dir`, sorted by path.
pub fn ufo_sources(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = glob_sorted(dir, "**/*.ufo")?;
    paths.retain(|p| p.is_dir());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn finds_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("NotoSerif.glyphs"), "{}").unwrap();
        fs::write(root.join("NotoSans.glyphs"), "{}").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::create_dir_all(root.join("nested/NotoSansMono-Regular.ufo")).unwrap();
        fs::create_dir_all(root.join("A-Regular.ufo")).unwrap();
        fs::write(root.join("nested/stray.glyphs"), "{}").unwrap();
        fs::write(root.join("file.ufo"), "").unwrap();

        let glyphs = glyphs_sources(root).unwrap();
        assert_eq!(
            glyphs,
            vec![root.join("NotoSans.glyphs"), root.join("NotoSerif.glyphs")]
        );

        let ufos = ufo_sources(root).unwrap();
        assert_eq!(
            ufos,
            vec![
                root.join("A-Regular.ufo"),
                root.join("nested/NotoSansMono-Regular.ufo")
            ]
        );
    }

    #[test]
    fn missing_directory_has_no_sources() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(glyphs_sources(&missing).unwrap().is_empty());
        assert!(ufo_sources(&missing).unwrap().is_empty());
    }
}
