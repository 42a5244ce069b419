//! 撮影地マーカーのKML文書
//!
//! 象限（NW/NE/SW/SE）ごとのフォルダにマーカーを持ち、表示名で重複を除く。
//! 追加のたびに文書全体を書き出し、実行の最後に各フォルダを名前順に並べ替える。

mod kml;
mod placemark;

pub use kml::{KmlContent, DEFAULT_TITLE};
pub use placemark::{describe, Placemark, PIN_STYLE};

use crate::error::Result;
use photo_geo_common::Quadrant;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PlacemarkDocument {
    path: PathBuf,
    content: KmlContent,
    /// 文書内の全表示名
    names: HashSet<String>,
}

impl PlacemarkDocument {
    /// KMLを読み込む。ファイルがなければ空の文書を作成して書き出す
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let document = Self {
                path: path.to_path_buf(),
                content: KmlContent {
                    title: Some(DEFAULT_TITLE.to_string()),
                    ..Default::default()
                },
                names: HashSet::new(),
            };
            document.persist()?;
            tracing::info!(path = %path.display(), "新しいKMLを作成しました");
            return Ok(document);
        }

        let content = kml::parse(&std::fs::read_to_string(path)?)?;

        let names = content
            .folders
            .iter()
            .flatten()
            .map(|p| p.name.clone())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            content,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// 表示名が未登録なら追加して書き出す
    ///
    /// 既に同じ表示名があれば何もせず `false`。
    pub fn insert_if_absent(&mut self, placemark: Placemark) -> Result<bool> {
        if self.names.contains(&placemark.name) {
            return Ok(false);
        }

        self.names.insert(placemark.name.clone());
        self.content.folders[placemark.quadrant.index()].push(placemark);
        self.persist()?;
        Ok(true)
    }

    /// 各フォルダを表示名の順に並べ替えて書き出す
    pub fn sort_and_persist(&mut self) -> Result<()> {
        for quadrant in Quadrant::ALL {
            let folder = &mut self.content.folders[quadrant.index()];
            folder.sort_by(|a, b| a.name.cmp(&b.name));
            tracing::info!("{} の {} 件を並べ替え", quadrant.label(), folder.len());
        }
        self.persist()
    }

    /// 一時ファイルに書いて同期してから置き換える
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut temp = self.path.as_os_str().to_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let mut file = File::create(&temp)?;
        file.write_all(kml::render(&self.content).as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    pub fn placemarks(&self, quadrant: Quadrant) -> &[Placemark] {
        &self.content.folders[quadrant.index()]
    }

    pub fn len(&self) -> usize {
        self.content.folders.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
