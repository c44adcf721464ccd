//! ZIPコンテナの簡易プローブ（ローカルファイルヘッダを先頭から辿る）

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{InspectError, Result};

const LOCAL_HEADER_SIG: u32 = 0x0403_4B50;
const LOCAL_HEADER_LEN: usize = 30;
/// データディスクリプタ付きエントリ（サイズがヘッダにない）
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
const MAX_ENTRIES: usize = 4096;

/// ZIPエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    /// 圧縮方式（0 = 無圧縮）
    pub method: u16,
    /// ローカルヘッダの位置
    pub header_offset: usize,
    /// 格納データの範囲（サイズ不明なら空）
    pub data: Range<usize>,
}

/// ZIPコンテナの走査結果
#[derive(Debug, Clone, Default)]
pub struct ZipProbe {
    entries: Vec<ZipEntry>,
}

impl ZipProbe {
    /// ローカルファイルヘッダを走査する
    ///
    /// 中央ディレクトリなどローカルヘッダ以外のシグネチャに達したら終了する。
    pub fn scan(data: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos + 4 <= data.len() && entries.len() < MAX_ENTRIES {
            if LittleEndian::read_u32(&data[pos..pos + 4]) != LOCAL_HEADER_SIG {
                break;
            }
            if pos + LOCAL_HEADER_LEN > data.len() {
                return Err(truncated(pos));
            }

            let header = &data[pos..pos + LOCAL_HEADER_LEN];
            let flags = LittleEndian::read_u16(&header[6..8]);
            let method = LittleEndian::read_u16(&header[8..10]);
            let compressed_size = LittleEndian::read_u32(&header[18..22]) as usize;
            let name_len = LittleEndian::read_u16(&header[26..28]) as usize;
            let extra_len = LittleEndian::read_u16(&header[28..30]) as usize;

            let name_start = pos + LOCAL_HEADER_LEN;
            let data_start = name_start + name_len + extra_len;
            if data_start > data.len() {
                return Err(truncated(pos));
            }
            let name = String::from_utf8_lossy(&data[name_start..name_start + name_len]).into_owned();

            if flags & FLAG_DATA_DESCRIPTOR != 0 && compressed_size == 0 {
                // サイズ不明: 次のローカルヘッダを探して続行
                entries.push(ZipEntry {
                    name,
                    method,
                    header_offset: pos,
                    data: data_start..data_start,
                });
                match find_next_header(data, data_start) {
                    Some(next) => pos = next,
                    None => break,
                }
                continue;
            }

            let data_end = data_start
                .checked_add(compressed_size)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| {
                    InspectError::sub_parser(
                        "docx",
                        format!("entry {name:?} at {pos:#x} runs past end of buffer"),
                    )
                })?;

            entries.push(ZipEntry {
                name,
                method,
                header_offset: pos,
                data: data_start..data_end,
            });
            pos = data_end;
        }

        if entries.is_empty() {
            return Err(InspectError::sub_parser("docx", "no local file header found"));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// 無圧縮で格納されたエントリの中身
    pub fn stored_bytes<'a>(&self, data: &'a [u8], name: &str) -> Option<&'a [u8]> {
        let entry = self.entry(name)?;
        if entry.method != 0 || entry.data.is_empty() {
            return None;
        }
        data.get(entry.data.clone())
    }
}

fn truncated(pos: usize) -> InspectError {
    InspectError::sub_parser("docx", format!("truncated local header at {pos:#x}"))
}

fn find_next_header(data: &[u8], from: usize) -> Option<usize> {
    let sig = LOCAL_HEADER_SIG.to_le_bytes();
    data.get(from..)?
        .windows(4)
        .position(|w| w == sig)
        .map(|p| p + from)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 無圧縮エントリだけのZIPを組み立てる
    pub(crate) fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, body) in files {
            out.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&0u16.to_le_bytes()); // method
            out.extend_from_slice(&[0; 8]); // time, date, crc
            out.extend_from_slice(&(body.len() as u32).to_le_bytes());
            out.extend_from_slice(&(body.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(body);
        }
        // 中央ディレクトリのシグネチャで終端
        out.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]);
        out
    }

    #[test]
    fn test_scan_entries() {
        let zip = build_zip(&[("[Content_Types].xml", b"<Types/>"), ("docProps/core.xml", b"<core/>")]);
        let probe = ZipProbe::scan(&zip).unwrap();

        assert_eq!(probe.entries().len(), 2);
        assert!(probe.contains("docProps/core.xml"));
        assert_eq!(probe.stored_bytes(&zip, "docProps/core.xml"), Some(&b"<core/>"[..]));
        assert_eq!(probe.entries()[1].header_offset, 30 + 19 + 8);
    }

    #[test]
    fn test_scan_truncated_header() {
        let zip = build_zip(&[("a.xml", b"abc")]);
        let err = ZipProbe::scan(&zip[..20]).unwrap_err();
        assert!(matches!(err, InspectError::SubParserFailure { .. }));
    }

    #[test]
    fn test_scan_size_past_end() {
        let mut zip = build_zip(&[("a.xml", b"abc")]);
        zip.truncate(30 + 5 + 1);
        assert!(ZipProbe::scan(&zip).is_err());
    }

    #[test]
    fn test_scan_not_a_zip() {
        assert!(ZipProbe::scan(b"plain text").is_err());
    }
}
