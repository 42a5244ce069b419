//! KMLの読み書き
//!
//! 書き出しは文字列を組み立て、読み込みは quick-xml のイベントで行う。
//! 扱うのは `kml/Document` 直下の象限フォルダ（NW/NE/SW/SE）とその中の Placemark の
//! 名前・説明・スタイル参照だけ。それ以外の要素とコメントは元のXMLのまま保持して書き戻す。

use super::placemark::{Placemark, PIN_STYLE};
use crate::error::{PhotoGeoError, Result};
use photo_geo_common::Quadrant;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const DEFAULT_TITLE: &str = "Where We've Been";

const PIN_ICON: &str = "http://maps.google.com/mapfiles/ms/micons/red-dot.png";

/// KML文書の中身
#[derive(Debug, Clone, Default)]
pub struct KmlContent {
    pub title: Option<String>,
    pub folders: [Vec<Placemark>; 4],
    /// `kml` 直下の Document 以外の要素
    pub root_extra: Vec<String>,
    /// Document 直下の扱わない要素（pin 以外の Style など）
    pub document_extra: Vec<String>,
    /// 象限フォルダ直下の扱わない要素
    pub folder_extra: [Vec<String>; 4],
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn push_raw(xml: &mut String, indent: &str, raw: &[String]) {
    for fragment in raw {
        xml.push_str(indent);
        xml.push_str(fragment);
        xml.push('\n');
    }
}

fn render_placemark(xml: &mut String, placemark: &Placemark) {
    xml.push_str("      <Placemark>\n");
    xml.push_str(&format!("        <name>{}</name>\n", escape_xml(&placemark.name)));
    if !placemark.description.is_empty() {
        xml.push_str(&format!(
            "        <description>{}</description>\n",
            escape_xml(&placemark.description)
        ));
    }
    if !placemark.style_url.is_empty() {
        xml.push_str(&format!("        <styleUrl>{}</styleUrl>\n", escape_xml(&placemark.style_url)));
    }
    if let Some(coordinates) = &placemark.coordinates {
        xml.push_str("        <Point>\n");
        xml.push_str(&format!("          <coordinates>{}</coordinates>\n", escape_xml(coordinates)));
        xml.push_str("        </Point>\n");
    }
    push_raw(xml, "        ", &placemark.extra);
    xml.push_str("      </Placemark>\n");
}

pub fn render(content: &KmlContent) -> String {
    let title = content.title.as_deref().unwrap_or(DEFAULT_TITLE);

    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    xml.push_str("  <Document>\n");
    xml.push_str(&format!("    <name>{}</name>\n", escape_xml(title)));
    xml.push_str(&format!("    <Style id=\"{}\">\n", PIN_STYLE));
    xml.push_str("      <IconStyle>\n");
    xml.push_str("        <scale>3</scale>\n");
    xml.push_str("        <Icon>\n");
    xml.push_str(&format!("          <href>{}</href>\n", PIN_ICON));
    xml.push_str("        </Icon>\n");
    xml.push_str("        <hotSpot x=\"20\" y=\"2\" xunits=\"pixels\" yunits=\"pixels\"/>\n");
    xml.push_str("      </IconStyle>\n");
    xml.push_str("    </Style>\n");
    push_raw(&mut xml, "    ", &content.document_extra);

    for quadrant in Quadrant::ALL {
        xml.push_str(&format!("    <Folder name=\"{}\">\n", quadrant.code()));
        xml.push_str(&format!("      <name>{}</name>\n", quadrant.label()));
        push_raw(&mut xml, "      ", &content.folder_extra[quadrant.index()]);

        for placemark in &content.folders[quadrant.index()] {
            render_placemark(&mut xml, placemark);
        }

        xml.push_str("    </Folder>\n");
    }

    xml.push_str("  </Document>\n");
    push_raw(&mut xml, "  ", &content.root_extra);
    xml.push_str("</kml>\n");
    xml
}

fn malformed(message: impl Into<String>) -> PhotoGeoError {
    PhotoGeoError::MalformedDocument(message.into())
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).to_string()
}

/// 読み込み途中のPlacemark
#[derive(Default)]
struct PlacemarkBuilder {
    name: Option<String>,
    description: String,
    style_url: String,
    extra: Vec<String>,
}

impl PlacemarkBuilder {
    fn build(self, quadrant: Quadrant) -> Result<Placemark> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| malformed("名前のないPlacemarkがあります"))?;

        Ok(Placemark {
            name,
            description: self.description,
            style_url: self.style_url,
            coordinates: None,
            extra: self.extra,
            quadrant,
        })
    }
}

/// フォルダの `name` 属性から象限を読む
fn folder_quadrant(start: &BytesStart) -> Result<Quadrant> {
    let attr = start
        .try_get_attribute("name")
        .map_err(|e| malformed(e.to_string()))?
        .ok_or_else(|| malformed("name属性のないFolderがあります"))?;
    let value = attr.unescape_value().map_err(|e| malformed(e.to_string()))?;

    value
        .parse::<Quadrant>()
        .map_err(|_| malformed(format!("未知のFolderです: {}", value)))
}

/// 書き出し時に作り直す共有スタイルか
fn is_pin_style(start: &BytesStart) -> bool {
    matches!(
        start.try_get_attribute("id"),
        Ok(Some(attr)) if attr.value.as_ref() == PIN_STYLE.as_bytes()
    )
}

// 開いている要素の深さ
const IN_KML: usize = 1;
const IN_DOCUMENT: usize = 2;
const IN_FOLDER: usize = 3;
const IN_PLACEMARK: usize = 4;

/// 要素の扱い
enum Action {
    /// 中に入って読む
    Enter,
    /// 元のXMLのまま保持する
    Keep,
    /// 読み飛ばす（書き出し時に作り直す）
    Skip,
}

struct KmlParser<'a> {
    content: &'a str,
    reader: Reader<&'a [u8]>,
    parsed: KmlContent,
    stack: Vec<String>,
    text: String,
    folder: Option<Quadrant>,
    placemark: Option<PlacemarkBuilder>,
    seen_document: bool,
}

impl<'a> KmlParser<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            reader: Reader::from_str(content),
            parsed: KmlContent::default(),
            stack: Vec::new(),
            text: String::new(),
            folder: None,
            placemark: None,
            seen_document: false,
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// 開始タグ（空要素を含む）をどう扱うか
    fn action(&mut self, start: &BytesStart, empty: bool) -> Result<Action> {
        let name = local_name(start);

        let action = match (self.stack.len(), name.as_str()) {
            (0, "kml") => Action::Enter,
            (0, other) => return Err(malformed(format!("ルート要素が kml ではありません: {}", other))),
            (IN_KML, "Document") if self.seen_document => {
                return Err(malformed("Document要素が複数あります"))
            }
            (IN_KML, "Document") => {
                self.seen_document = true;
                Action::Enter
            }
            (IN_DOCUMENT, "name") => Action::Enter,
            (IN_DOCUMENT, "Style") if is_pin_style(start) => Action::Skip,
            (IN_DOCUMENT, "Folder") => {
                self.folder = Some(folder_quadrant(start)?);
                Action::Enter
            }
            (IN_DOCUMENT, "Placemark") => return Err(malformed("象限フォルダの外にPlacemarkがあります")),
            (IN_FOLDER, "name") => Action::Skip,
            (IN_FOLDER, "Placemark") if empty => return Err(malformed("空のPlacemarkがあります")),
            (IN_FOLDER, "Placemark") => {
                self.placemark = Some(PlacemarkBuilder::default());
                Action::Enter
            }
            (IN_PLACEMARK, "name" | "description" | "styleUrl") => Action::Enter,
            (depth, _) if depth > IN_PLACEMARK => Action::Enter,
            _ => Action::Keep,
        };
        Ok(action)
    }

    /// 今いる要素に元のXMLを保持させる
    fn keep(&mut self, raw: &str) {
        let raw = raw.to_string();
        match (self.stack.len(), self.folder) {
            (IN_KML, _) => self.parsed.root_extra.push(raw),
            (IN_DOCUMENT, _) => self.parsed.document_extra.push(raw),
            (IN_FOLDER, Some(quadrant)) => self.parsed.folder_extra[quadrant.index()].push(raw),
            (IN_PLACEMARK, _) => {
                if let Some(builder) = self.placemark.as_mut() {
                    builder.extra.push(raw);
                }
            }
            _ => {}
        }
    }

    /// 要素が閉じたときに読んだ値を反映する
    fn close(&mut self, name: &str) -> Result<()> {
        let text = std::mem::take(&mut self.text);

        match (self.stack.len(), name) {
            (IN_KML, "Document") => {}
            (IN_DOCUMENT, "Folder") => self.folder = None,
            (IN_DOCUMENT, "name") => self.parsed.title = Some(text.trim().to_string()),
            (IN_FOLDER, "Placemark") => {
                if let (Some(builder), Some(quadrant)) = (self.placemark.take(), self.folder) {
                    self.parsed.folders[quadrant.index()].push(builder.build(quadrant)?);
                }
            }
            (IN_PLACEMARK, field) => {
                if let Some(builder) = self.placemark.as_mut() {
                    match field {
                        "name" => builder.name = Some(text.trim().to_string()),
                        // 説明文は前後の改行も含めてそのまま
                        "description" => builder.description = text,
                        "styleUrl" => builder.style_url = text.trim().to_string(),
                        _ => {}
                    }
                }
            }
            // 値の中の要素は文字列だけ集める
            (depth, _) if depth > IN_PLACEMARK => self.text = text,
            _ => {}
        }
        Ok(())
    }

    fn parse(mut self) -> Result<KmlContent> {
        loop {
            let offset = self.position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| malformed(format!("位置 {}: {}", offset, e)))?;

            match event {
                Event::Start(start) => match self.action(&start, false)? {
                    Action::Enter => {
                        if self.stack.len() <= IN_PLACEMARK {
                            self.text.clear();
                        }
                        self.stack.push(local_name(&start));
                    }
                    action => {
                        self.reader
                            .read_to_end(start.name())
                            .map_err(|e| malformed(format!("位置 {}: {}", offset, e)))?;
                        if let Action::Keep = action {
                            let content = self.content;
                            self.keep(&content[offset..self.position()]);
                        }
                    }
                },
                Event::Empty(start) => match self.action(&start, true)? {
                    Action::Enter => {
                        // 空の値・空のフォルダ
                        if self.stack.len() <= IN_PLACEMARK {
                            self.text.clear();
                        }
                        self.close(&local_name(&start))?;
                    }
                    Action::Keep => {
                        let content = self.content;
                        self.keep(&content[offset..self.position()]);
                    }
                    Action::Skip => {}
                },
                Event::Comment(_) => {
                    let content = self.content;
                    self.keep(&content[offset..self.position()]);
                }
                Event::Text(t) => {
                    let value = t.unescape().map_err(|e| malformed(e.to_string()))?;
                    self.text.push_str(&value);
                }
                Event::CData(c) => {
                    self.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Event::End(_) => {
                    let Some(name) = self.stack.pop() else {
                        return Err(malformed("対応しない終了タグがあります"));
                    };
                    self.close(&name)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(malformed("閉じられていない要素があります"));
        }
        if !self.seen_document {
            return Err(malformed("Document要素がありません"));
        }

        Ok(self.parsed)
    }
}

pub fn parse(content: &str) -> Result<KmlContent> {
    KmlParser::new(content).parse()
}
