//! 処理済み写真の台帳
//!
//! 写真の内容ハッシュ（SHA-256）を1行ずつ追記するテキストファイル。
//! 起動時に全行を読み込み、同じ内容の写真を二度処理しないようにする。

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// KMLファイルに対応する台帳のパス（`<kml>.db`）
pub fn ledger_path_for(document: &Path) -> PathBuf {
    let mut name = document.as_os_str().to_os_string();
    name.push(".db");
    PathBuf::from(name)
}

/// 写真の内容ハッシュを計算
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[derive(Debug)]
pub struct Ledger {
    /// 追記先（None ならメモリ上のみ）
    path: Option<PathBuf>,
    entries: HashSet<String>,
    /// 起動時に読み込んだ件数
    loaded: usize,
    writer: Option<File>,
    /// 既存ファイルが改行で終わっていない
    needs_newline: bool,
}

impl Ledger {
    /// 台帳ファイルを読み込む（なければ空）
    pub fn load(path: &Path) -> Result<Self> {
        let mut entries = HashSet::new();
        let mut needs_newline = false;

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            entries.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from),
            );
            needs_newline = !content.is_empty() && !content.ends_with('\n');
        }

        let loaded = entries.len();
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
            loaded,
            writer: None,
            needs_newline,
        })
    }

    /// ファイルに残さない台帳（KMLを使わない実行用）
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: HashSet::new(),
            loaded: 0,
            writer: None,
            needs_newline: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, fingerprint: &str) -> bool {
        self.entries.contains(fingerprint)
    }

    /// 処理済みとして記録し、ファイルへ追記する
    pub fn record(&mut self, fingerprint: &str) -> Result<()> {
        if !self.entries.insert(fingerprint.to_string()) {
            return Ok(());
        }

        if let Some(path) = &self.path {
            if self.writer.is_none() {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                self.writer = Some(file);
            }
            if let Some(writer) = self.writer.as_mut() {
                if std::mem::take(&mut self.needs_newline) {
                    writeln!(writer)?;
                }
                writeln!(writer, "{}", fingerprint)?;
                writer.flush()?;
                writer.sync_data()?;
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// 今回の実行で追加した件数
    pub fn newly_recorded(&self) -> usize {
        self.entries.len() - self.loaded
    }
}
