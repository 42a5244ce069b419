//! 衝突しないファイル名の決定

use std::path::{Path, PathBuf};

/// 既存パスと衝突しない最初のパスを返す
///
/// `base` が空いていればそのまま、埋まっていれば拡張子の前に
/// ` (2)`, ` (3)`, ... を付けて空きを探す。存在判定は `exists` に委ねる。
pub fn next_available_path<F>(base: &Path, exists: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    if !exists(base) {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = base.parent().unwrap_or_else(|| Path::new(""));

    (2u64..)
        .map(|n| parent.join(format!("{} ({}){}", stem, n, extension)))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| base.to_path_buf())
}

/// ジオコーダ由来の文字列をファイル名・フォルダ名に使える形にする
pub fn sanitize_segment(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn taken(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_free_path_is_unchanged() {
        let existing = taken(&[]);
        let path = next_available_path(Path::new("/dest/Eiffel Tower.jpg"), |p| existing.contains(p));
        assert_eq!(path, PathBuf::from("/dest/Eiffel Tower.jpg"));
    }

    #[test]
    fn test_numbering_starts_at_two() {
        let existing = taken(&["/dest/name.jpg"]);
        let path = next_available_path(Path::new("/dest/name.jpg"), |p| existing.contains(p));
        assert_eq!(path, PathBuf::from("/dest/name (2).jpg"));
    }

    #[test]
    fn test_numbering_skips_taken() {
        let existing = taken(&["/dest/name.jpg", "/dest/name (2).jpg", "/dest/name (3).jpg"]);
        let path = next_available_path(Path::new("/dest/name.jpg"), |p| existing.contains(p));
        assert_eq!(path, PathBuf::from("/dest/name (4).jpg"));
    }

    #[test]
    fn test_no_extension() {
        let existing = taken(&["/dest/README"]);
        let path = next_available_path(Path::new("/dest/README"), |p| existing.contains(p));
        assert_eq!(path, PathBuf::from("/dest/README (2)"));
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Tour Eiffel"), "Tour Eiffel");
        assert_eq!(sanitize_segment("AC/DC: Live?"), "AC_DC_ Live_");
        assert_eq!(sanitize_segment(".."), "_");
        assert_eq!(sanitize_segment("  "), "_");
    }
}
