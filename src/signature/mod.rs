//! ファイル種別ごとのシグネチャ表と種別判定

mod container;
mod formats;

pub use container::{ZipEntry, ZipProbe};

use tracing::debug;

use crate::error::{InspectError, Result};
use crate::region::ByteRange;

/// 生の範囲を返す関数（ヘッダ・機微情報・ファイル名）
pub type RangeFn = fn(&[u8]) -> Result<Vec<ByteRange>>;

/// メタデータ要約を返す関数
pub type SummaryFn = fn(&Probe<'_>) -> MetadataSummary;

/// 要約関数に渡す入力（報告されたファイル名とバイト列）
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> Probe<'a> {
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self { name, data }
    }

    /// 拡張子を除いたファイル名
    pub fn stem(&self) -> &'a str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) => stem,
            None => self.name,
        }
    }

    /// 小文字化した拡張子
    pub fn extension(&self) -> String {
        extension_of(self.name)
    }
}

/// メタデータの1項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub label: &'static str,
    pub value: String,
    /// 個人情報などを含み得る項目
    pub sensitive: bool,
}

/// 種別ごとのメタデータ要約
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataSummary {
    entries: Vec<MetadataEntry>,
}

impl MetadataSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &'static str, value: impl Into<String>) {
        self.entries.push(MetadataEntry {
            label,
            value: value.into(),
            sensitive: false,
        });
    }

    pub fn push_sensitive(&mut self, label: &'static str, value: impl Into<String>) {
        self.entries.push(MetadataEntry {
            label,
            value: value.into(),
            sensitive: true,
        });
    }

    pub fn entries(&self) -> &[MetadataEntry] {
        &self.entries
    }

    /// ラベルで値を引く
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

/// ファイル種別の記述子
///
/// 種別ごとのクラス階層の代わりに、データと関数ポインタの表で表現する。
#[derive(Debug)]
pub struct SignatureDescriptor {
    pub tag: &'static str,
    /// 先頭のマジックバイト（None ならどんなバッファも一致）
    pub magic: Option<&'static [u8]>,
    pub header_ranges: RangeFn,
    pub sensitive_ranges: RangeFn,
    pub file_name_ranges: RangeFn,
    pub summary: SummaryFn,
}

impl SignatureDescriptor {
    /// マジックバイトが先頭に一致するか（短すぎるバッファは不一致）
    pub fn matches(&self, data: &[u8]) -> bool {
        match self.magic {
            None => true,
            Some(magic) => data.len() >= magic.len() && &data[..magic.len()] == magic,
        }
    }
}

/// 対応しているファイル種別
pub static SIGNATURES: &[SignatureDescriptor] = &[
    SignatureDescriptor {
        tag: "txt",
        magic: None,
        header_ranges: formats::no_ranges,
        sensitive_ranges: formats::no_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::text_summary,
    },
    SignatureDescriptor {
        tag: "jpg",
        magic: Some(&[0xFF, 0xD8]),
        header_ranges: formats::image_header,
        sensitive_ranges: formats::exif_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::image_summary,
    },
    SignatureDescriptor {
        tag: "jpeg",
        magic: Some(&[0xFF, 0xD8]),
        header_ranges: formats::image_header,
        sensitive_ranges: formats::exif_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::image_summary,
    },
    SignatureDescriptor {
        tag: "png",
        magic: Some(&[0x89, 0x50, 0x4E, 0x47]),
        header_ranges: formats::png_header,
        sensitive_ranges: formats::exif_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::image_summary,
    },
    SignatureDescriptor {
        tag: "docx",
        magic: Some(&[0x50, 0x4B, 0x03, 0x04]),
        header_ranges: formats::docx_header,
        sensitive_ranges: formats::docx_core_ranges,
        file_name_ranges: formats::docx_core_ranges,
        summary: formats::docx_summary,
    },
    SignatureDescriptor {
        tag: "mp3",
        magic: Some(&[0x49, 0x44, 0x33]),
        header_ranges: formats::mp3_header,
        sensitive_ranges: formats::mp3_sensitive,
        file_name_ranges: formats::mp3_file_name,
        summary: formats::mp3_summary,
    },
    SignatureDescriptor {
        tag: "pdf",
        magic: Some(&[0x25, 0x50, 0x44, 0x46]),
        header_ranges: formats::pdf_header,
        sensitive_ranges: formats::no_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::pdf_summary,
    },
    SignatureDescriptor {
        tag: "mp4",
        magic: Some(&[0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70]),
        header_ranges: formats::mp4_header,
        sensitive_ranges: formats::no_ranges,
        file_name_ranges: formats::no_ranges,
        summary: formats::mp4_summary,
    },
];

/// 種別タグから記述子を引く
pub fn lookup(tag: &str) -> Option<&'static SignatureDescriptor> {
    SIGNATURES.iter().find(|d| d.tag == tag)
}

/// ファイル名の拡張子（小文字）
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// ファイル名から宣言された種別を解決する（汎用フォールバックはしない）
pub fn declared_type(name: &str) -> Result<&'static SignatureDescriptor> {
    let ext = extension_of(name);
    lookup(&ext).ok_or(InspectError::UnsupportedType(ext))
}

/// 宣言された種別のマジックバイトを確認する
pub fn detect_type(data: &[u8], declared_tag: &str) -> Result<&'static SignatureDescriptor> {
    let descriptor =
        lookup(declared_tag).ok_or_else(|| InspectError::UnsupportedType(declared_tag.to_string()))?;

    if !descriptor.matches(data) {
        debug!(tag = declared_tag, len = data.len(), "signature mismatch");
        return Err(InspectError::InvalidFormat {
            tag: declared_tag.to_string(),
        });
    }
    Ok(descriptor)
}
