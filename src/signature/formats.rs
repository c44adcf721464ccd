//! 種別ごとの範囲導出とメタデータ要約

use byteorder::{BigEndian, ByteOrder};

use super::container::ZipProbe;
use super::{MetadataSummary, Probe};
use crate::error::Result;
use crate::region::ByteRange;

const CORE_PROPS: &str = "docProps/core.xml";
const EXIF_WINDOW: usize = 100;
const TEXT_SAMPLE_CHARS: usize = 100;

pub(super) fn no_ranges(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(Vec::new())
}

pub(super) fn image_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 8)])
}

/// PNGシグネチャ（8バイト）
pub(super) fn png_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 7)])
}

/// 最初のAPP1(EXIF)マーカーから一定範囲
pub(super) fn exif_ranges(data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(find_exif(data)
        .map(|pos| vec![ByteRange::new(pos, pos + EXIF_WINDOW)])
        .unwrap_or_default())
}

pub(super) fn docx_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 30)])
}

/// core.xml があれば先頭500バイト
pub(super) fn docx_core_ranges(data: &[u8]) -> Result<Vec<ByteRange>> {
    let probe = ZipProbe::scan(data)?;
    if probe.contains(CORE_PROPS) {
        Ok(vec![ByteRange::new(0, 500)])
    } else {
        Ok(Vec::new())
    }
}

pub(super) fn mp3_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 10)])
}

pub(super) fn mp3_sensitive(data: &[u8]) -> Result<Vec<ByteRange>> {
    if data.starts_with(b"ID3") {
        Ok(vec![ByteRange::new(0, 128), ByteRange::new(128, 131)])
    } else {
        Ok(Vec::new())
    }
}

/// タイトル欄（3-32）
pub(super) fn mp3_file_name(data: &[u8]) -> Result<Vec<ByteRange>> {
    if data.starts_with(b"ID3") {
        Ok(vec![ByteRange::new(3, 32)])
    } else {
        Ok(Vec::new())
    }
}

pub(super) fn pdf_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 8)])
}

pub(super) fn mp4_header(_data: &[u8]) -> Result<Vec<ByteRange>> {
    Ok(vec![ByteRange::new(0, 32)])
}

fn find_exif(data: &[u8]) -> Option<usize> {
    data.windows(2).position(|w| w[0] == 0xFF && w[1] == 0xE1)
}

/// 全種別に共通の項目
fn base_summary(probe: &Probe<'_>, encoding: &str) -> MetadataSummary {
    let mut summary = MetadataSummary::new();
    summary.push_sensitive("File Name", probe.stem());
    summary.push("Extension", probe.extension());
    summary.push("Encoding", encoding);
    summary.push("Size", format!("{} bytes", probe.data.len()));
    summary
}

/// BOMとUTF-8妥当性からテキストのエンコーディングを推定
fn guess_text_encoding(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        "UTF-8 (BOM)"
    } else if data.starts_with(&[0xFF, 0xFE]) {
        "UTF-16 LE"
    } else if data.starts_with(&[0xFE, 0xFF]) {
        "UTF-16 BE"
    } else if data.is_ascii() {
        "ASCII"
    } else if std::str::from_utf8(data).is_ok() {
        "UTF-8"
    } else {
        "8-bit (unknown)"
    }
}

pub(super) fn text_summary(probe: &Probe<'_>) -> MetadataSummary {
    let mut summary = base_summary(probe, guess_text_encoding(probe.data));
    let sample: String = String::from_utf8_lossy(probe.data)
        .chars()
        .take(TEXT_SAMPLE_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    summary.push("Sample", sample);
    summary
}

pub(super) fn image_summary(probe: &Probe<'_>) -> MetadataSummary {
    let data = probe.data;
    let is_png = data.starts_with(&[0x89, 0x50, 0x4E, 0x47]);
    let mut summary = base_summary(probe, if is_png { "PNG DEFLATE" } else { "JPEG DCT" });

    if is_png && data.len() >= 24 && &data[12..16] == b"IHDR" {
        let width = BigEndian::read_u32(&data[16..20]);
        let height = BigEndian::read_u32(&data[20..24]);
        summary.push("Dimensions", format!("{width}x{height}"));
    }

    match find_exif(data) {
        Some(pos) => summary.push_sensitive("EXIF", format!("APP1 segment at {pos:#010X}")),
        None => summary.push("EXIF", "none"),
    }
    summary
}

pub(super) fn docx_summary(probe: &Probe<'_>) -> MetadataSummary {
    let mut summary = base_summary(probe, "UTF-8 (XML)");

    let zip = match ZipProbe::scan(probe.data) {
        Ok(zip) => zip,
        Err(e) => {
            summary.push("Core Properties", format!("unavailable ({e})"));
            return summary;
        }
    };
    summary.push("Entries", zip.entries().len().to_string());

    if !zip.contains(CORE_PROPS) {
        summary.push("Core Properties", "none");
        return summary;
    }
    let Some(xml) = zip.stored_bytes(probe.data, CORE_PROPS) else {
        summary.push("Core Properties", "compressed (not inspected)");
        return summary;
    };

    let xml = String::from_utf8_lossy(xml);
    for (label, element, sensitive) in [
        ("Creator", "creator", true),
        ("Last Modified By", "lastModifiedBy", true),
        ("Created", "created", false),
        ("Modified", "modified", false),
    ] {
        let value = xml_element_text(&xml, element).unwrap_or("N/A").to_string();
        if sensitive {
            summary.push_sensitive(label, value);
        } else {
            summary.push(label, value);
        }
    }
    summary
}

pub(super) fn mp3_summary(probe: &Probe<'_>) -> MetadataSummary {
    let data = probe.data;
    let frame_sync = data.len() > 131 && data[128] == 0xFF && (data[129] & 0xE0) == 0xE0;
    let mut summary = base_summary(probe, if frame_sync { "MPEG-1 Layer III" } else { "N/A" });

    if data.len() >= 5 && data.starts_with(b"ID3") {
        summary.push("Tag", format!("ID3v2.{}.{}", data[3], data[4]));
    }

    // ID3v1タグは末尾128バイト
    let tail = data.len().checked_sub(128).map(|start| &data[start..]);
    match tail.filter(|t| t.starts_with(b"TAG")) {
        Some(tag) => {
            summary.push_sensitive("Title", latin1_field(&tag[3..33]));
            summary.push_sensitive("Artist", latin1_field(&tag[33..63]));
            summary.push("Album", latin1_field(&tag[63..93]));
        }
        None => summary.push("ID3v1", "none"),
    }
    summary
}

pub(super) fn pdf_summary(probe: &Probe<'_>) -> MetadataSummary {
    let mut summary = base_summary(probe, "N/A");
    if let Some(rest) = probe.data.strip_prefix(b"%PDF-") {
        let version: String = rest
            .iter()
            .take(8)
            .take_while(|b| b.is_ascii_graphic())
            .map(|&b| b as char)
            .collect();
        summary.push("Version", version);
    }
    summary
}

pub(super) fn mp4_summary(probe: &Probe<'_>) -> MetadataSummary {
    let mut summary = base_summary(probe, "N/A");
    if let Some(brand) = probe.data.get(8..12) {
        summary.push("Major Brand", latin1_field(brand));
    }
    summary
}

/// 固定長フィールドをLatin-1として読み、NULと空白を除く
fn latin1_field(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect();
    let text = text.trim();
    if text.is_empty() { "N/A".to_string() } else { text.to_string() }
}

/// 名前空間接頭辞を無視して要素のテキストを取り出す
fn xml_element_text<'a>(xml: &'a str, local_name: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some(found) = xml[from..].find(local_name) {
        let start = from + found;
        from = start + local_name.len();

        let Some(lt) = xml[..start].rfind('<') else {
            continue;
        };
        let prefix = &xml[lt + 1..start];
        let is_open_tag = prefix.is_empty()
            || (prefix.ends_with(':') && !prefix.contains(['/', ' ', '>']));
        let after = xml[from..].chars().next();
        if !is_open_tag || !matches!(after, Some('>') | Some(' ')) {
            continue;
        }

        let content_start = from + xml[from..].find('>')? + 1;
        let content_end = content_start + xml[content_start..].find('<')?;
        let text = xml[content_start..content_end].trim();
        return if text.is_empty() { None } else { Some(text) };
    }
    None
}
