//! 一括処理
//!
//! ## 処理フロー（1枚ずつ順番に）
//! 1. 内容ハッシュを計算し、処理済みならスキップ
//! 2. EXIFのGPSタグを10進度に変換（なければ警告して次へ。台帳には残さない）
//! 3. 逆ジオコーディング（レート制限中は再試行）
//! 4. 住所を正規化して表示名を作る
//! 5. 移動先があれば `国/州/市` へ移動
//! 6. KMLがあればマーカーを追加し、台帳にハッシュを追記
//!
//! 1枚ごとの失敗は記録して次へ進む。KML・台帳の読み書きの失敗だけが全体を止める。

use crate::document::{describe, Placemark, PlacemarkDocument};
use crate::error::{PhotoGeoError, Result};
use crate::geocoder::{self, GeocodeReply, ReverseGeocoder, RetryPolicy};
use crate::ledger::{fingerprint, ledger_path_for, Ledger};
use crate::relocate;
use crate::scanner::{self, ExifTagReader, ImageInfo, TagReader};
use photo_geo_common::normalize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source: PathBuf,
    /// 指定時は撮影地フォルダへ移動する
    pub destination: Option<PathBuf>,
    /// 指定時はKMLと台帳（`<kml>.db`）を使う
    pub document: Option<PathBuf>,
    /// KMLの説明にファイルの場所を含める
    pub show_file_location: bool,
    pub retry: RetryPolicy,
}

impl PipelineOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: None,
            document: None,
            show_file_location: false,
            retry: RetryPolicy::default(),
        }
    }
}

/// 実行結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// 見つかった写真
    pub total: usize,
    /// 処理済みとしてスキップ
    pub already_processed: usize,
    /// 読み込めなかった写真
    pub read_errors: usize,
    /// GPS情報なし
    pub missing_gps: usize,
    pub invalid_coordinates: usize,
    pub unexpected_responses: usize,
    /// 再試行上限までレート制限が続いた写真
    pub rate_limited: usize,
    /// 住所が得られた写真
    pub geocoded: usize,
    pub moved: usize,
    pub move_failures: usize,
    pub placemarks_added: usize,
    /// 同じ表示名が既にあった写真
    pub placemarks_existing: usize,
    /// 台帳に追加したハッシュ
    pub ledger_recorded: usize,
}

pub struct Pipeline<G, R = ExifTagReader> {
    options: PipelineOptions,
    geocoder: G,
    tag_reader: R,
}

impl<G: ReverseGeocoder> Pipeline<G> {
    pub fn new(options: PipelineOptions, geocoder: G) -> Self {
        Self {
            options,
            geocoder,
            tag_reader: ExifTagReader,
        }
    }
}

impl<G: ReverseGeocoder, R: TagReader> Pipeline<G, R> {
    pub fn with_tag_reader<T: TagReader>(self, tag_reader: T) -> Pipeline<G, T> {
        Pipeline {
            options: self.options,
            geocoder: self.geocoder,
            tag_reader,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn run(&self) -> Result<Summary> {
        let images = scanner::scan_folder(&self.options.source)?;
        let mut summary = Summary {
            total: images.len(),
            ..Default::default()
        };
        info!("{} 枚の写真が見つかりました", images.len());

        let mut document = match &self.options.document {
            Some(path) => Some(PlacemarkDocument::load(path)?),
            None => None,
        };
        let mut ledger = match &self.options.document {
            Some(path) => Ledger::load(&ledger_path_for(path))?,
            None => Ledger::in_memory(),
        };
        if let Some(path) = ledger.path() {
            info!("処理済みの写真 {} 件を読み込みました ({})", ledger.loaded(), path.display());
        }

        for (index, image) in images.iter().enumerate() {
            let progress = format!("[{}/{}]", index + 1, images.len());
            self.process(image, &progress, &mut ledger, document.as_mut(), &mut summary)
                .await?;
        }

        if let Some(document) = document.as_mut() {
            document.sort_and_persist()?;
            info!("KMLを書き出しました: {}", document.path().display());
        }

        summary.ledger_recorded = ledger.newly_recorded();
        Ok(summary)
    }

    /// 1枚分の処理。`Err` はKML・台帳の書き込み失敗のみ
    async fn process(
        &self,
        image: &ImageInfo,
        progress: &str,
        ledger: &mut Ledger,
        document: Option<&mut PlacemarkDocument>,
        summary: &mut Summary,
    ) -> Result<()> {
        let path = image.path.display();

        let bytes = match std::fs::read(&image.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("{} {} | 読み込めません: {}", progress, path, e);
                summary.read_errors += 1;
                return Ok(());
            }
        };

        let hash = fingerprint(&bytes);
        if ledger.contains(&hash) {
            info!("{} {} | 処理済みのためスキップ", progress, path);
            summary.already_processed += 1;
            return Ok(());
        }

        let located = self
            .tag_reader
            .read_tags(&bytes)
            .and_then(|tags| tags.position().map(|position| (tags, position)));
        let (tags, position) = match located {
            Ok(located) => located,
            Err(e) => {
                warn!("{} {} | GPS情報がありません ({})", progress, path, e);
                summary.missing_gps += 1;
                return Ok(());
            }
        };

        let reply = geocoder::resolve(
            &self.geocoder,
            position.latitude,
            position.longitude,
            &self.options.retry,
        )
        .await;

        let found = match reply {
            GeocodeReply::Address(found) => found,
            GeocodeReply::InvalidCoordinates => {
                let err = PhotoGeoError::InvalidCoordinates {
                    lat: position.latitude,
                    lon: position.longitude,
                };
                error!("{} {} | {}", progress, path, err);
                summary.invalid_coordinates += 1;
                return Ok(());
            }
            GeocodeReply::RateLimited => {
                error!("{} {} | レート制限が続いたためスキップ", progress, path);
                summary.rate_limited += 1;
                return Ok(());
            }
            GeocodeReply::UnexpectedResponse(message) => {
                error!("{} {} | {}", progress, path, PhotoGeoError::UnexpectedResponse(message));
                summary.unexpected_responses += 1;
                return Ok(());
            }
        };
        summary.geocoded += 1;

        let place = normalize(&found.fields, &tags.year());
        let display_name = place.display_name();
        info!("{} {} | {}", progress, path, display_name);
        debug!(
            "{}",
            serde_json::to_string_pretty(&found.response).unwrap_or_else(|_| found.response.to_string())
        );

        let mut location = absolute(&image.path);

        if let Some(root) = &self.options.destination {
            let dest_dir = relocate::destination_dir(root, &place);
            let file_name = relocate::target_file_name(&image.path, &place);

            match relocate::move_unique(&image.path, &dest_dir, &file_name) {
                Ok(moved) => {
                    info!("{} {} を {} へ移動しました", progress, path, moved.display());
                    summary.moved += 1;
                    location = absolute(&moved);
                }
                Err(e) => {
                    error!("{} {} | 移動できません: {}", progress, path, e);
                    summary.move_failures += 1;
                }
            }
        }

        if let Some(document) = document {
            let description = describe(
                tags.date_label(),
                self.options.show_file_location.then_some(location.as_path()),
                &found.address,
            );
            let placemark = Placemark::new(
                display_name,
                description,
                position.quadrant,
                position.latitude,
                position.longitude,
            );

            if document.insert_if_absent(placemark)? {
                info!("{} {} をKMLに追加しました", progress, path);
                summary.placemarks_added += 1;
            } else {
                info!("{} {} | KMLに同じ地名があるためスキップ", progress, path);
                summary.placemarks_existing += 1;
            }
        }

        ledger.record(&hash)?;
        Ok(())
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
