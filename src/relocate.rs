//! 撮影地フォルダへの写真の移動

use crate::error::{PhotoGeoError, Result};
use photo_geo_common::{next_available_path, sanitize_segment, PlaceIdentity};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 移動先フォルダ（`dest/国/州/市` または `dest/国/地域`）
pub fn destination_dir(root: &Path, place: &PlaceIdentity) -> PathBuf {
    place
        .destination_segments()
        .into_iter()
        .fold(root.to_path_buf(), |dir, segment| dir.join(sanitize_segment(segment)))
}

/// 移動後のファイル名（POIがあれば `POI + 元の拡張子`）
pub fn target_file_name(source: &Path, place: &PlaceIdentity) -> String {
    let original = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !place.has_poi() {
        return original;
    }

    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{}{}", sanitize_segment(&place.poi), extension)
}

/// 衝突しない名前で移動し、移動後のパスを返す
pub fn move_unique(source: &Path, dest_dir: &Path, preferred_name: &str) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(PhotoGeoError::FileMove(format!(
            "移動元がありません: {}",
            source.display()
        )));
    }

    std::fs::create_dir_all(dest_dir)?;
    let target = next_available_path(&dest_dir.join(preferred_name), |p| p.exists());

    match std::fs::rename(source, &target) {
        Ok(()) => {}
        // 別のファイルシステムへはコピーしてから削除
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_then_remove(source, &target, |p| std::fs::remove_file(p))?
        }
        Err(e) => return Err(move_error(source, &target, e)),
    }

    Ok(target)
}

fn move_error(source: &Path, target: &Path, err: std::io::Error) -> PhotoGeoError {
    PhotoGeoError::FileMove(format!("{} -> {}: {}", source.display(), target.display(), err))
}

/// コピーしてから移動元を消す。消せなければコピーを消して移動元だけを残す
fn copy_then_remove(
    source: &Path,
    target: &Path,
    remove_source: impl FnOnce(&Path) -> std::io::Result<()>,
) -> Result<()> {
    let copied = std::fs::copy(source, target).and_then(|_| remove_source(source));

    if let Err(e) = copied {
        if target.exists() {
            if let Err(cleanup) = std::fs::remove_file(target) {
                tracing::warn!("コピーを削除できません: {} ({})", target.display(), cleanup);
            }
        }
        return Err(move_error(source, target, e));
    }
    Ok(())
}
