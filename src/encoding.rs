//! 文字エンコーディング
//!
//! テキスト欄は行全体を1つのデコーダで読み、マルチバイト文字の先頭バイトに
//! 文字を、継続バイトに `None` を割り当てる。

use encoding_rs::{DecoderResult, Encoding, EUC_JP, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use unicode_width::UnicodeWidthStr;

/// 表示できない文字の代替
pub const PLACEHOLDER: &str = ".";

/// 対応している文字エンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    ShiftJis,
    EucJp,
    Windows1252,
}

impl CharEncoding {
    pub const ALL: [CharEncoding; 6] = [
        CharEncoding::Utf8,
        CharEncoding::Utf16Le,
        CharEncoding::Utf16Be,
        CharEncoding::ShiftJis,
        CharEncoding::EucJp,
        CharEncoding::Windows1252,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CharEncoding::Utf8 => "UTF-8",
            CharEncoding::Utf16Le => "UTF-16LE",
            CharEncoding::Utf16Be => "UTF-16BE",
            CharEncoding::ShiftJis => "Shift_JIS",
            CharEncoding::EucJp => "EUC-JP",
            CharEncoding::Windows1252 => "Windows-1252",
        }
    }

    /// 名前から解決（大文字小文字・記号を無視）
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "utf8" => Some(CharEncoding::Utf8),
            "utf16" | "utf16le" => Some(CharEncoding::Utf16Le),
            "utf16be" => Some(CharEncoding::Utf16Be),
            "sjis" | "shiftjis" | "cp932" => Some(CharEncoding::ShiftJis),
            "eucjp" => Some(CharEncoding::EucJp),
            "latin1" | "iso88591" | "windows1252" | "cp1252" => Some(CharEncoding::Windows1252),
            _ => None,
        }
    }

    /// 次のエンコーディング（F2での切り替え順）
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|e| e == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            CharEncoding::Utf8 => UTF_8,
            CharEncoding::Utf16Le => UTF_16LE,
            CharEncoding::Utf16Be => UTF_16BE,
            CharEncoding::ShiftJis => SHIFT_JIS,
            CharEncoding::EucJp => EUC_JP,
            CharEncoding::Windows1252 => WINDOWS_1252,
        }
    }
}

/// デコード済みの1文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedChar {
    /// 表示文字列（制御文字・表示不能文字は "."）
    pub display: String,
    /// この文字が占めるバイト数
    pub byte_len: usize,
    /// 表示幅
    pub width: usize,
}

impl DecodedChar {
    fn from_text(text: &str, byte_len: usize) -> Self {
        let width = UnicodeWidthStr::width(text);
        if width == 0 || text.chars().any(|c| c.is_control()) {
            Self::placeholder(byte_len)
        } else {
            Self {
                display: text.to_string(),
                byte_len,
                width,
            }
        }
    }

    fn placeholder(byte_len: usize) -> Self {
        Self {
            display: PLACEHOLDER.to_string(),
            byte_len,
            width: 1,
        }
    }
}

/// バイト列をまとめてデコードし、各バイト位置に文字を割り当てる
///
/// 文字の先頭バイトは `Some`、継続バイトは `None`。不正な並びと末尾の
/// 未完成の並びは1バイトずつ "." になる。
pub fn decode_for_display(bytes: &[u8], encoding: CharEncoding) -> Vec<Option<DecodedChar>> {
    let mut out: Vec<Option<DecodedChar>> = vec![None; bytes.len()];
    let mut decoder = encoding.encoding().new_decoder_without_bom_handling();
    let mut text = String::with_capacity(16);
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        text.clear();
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[pos..pos + 1], &mut text, false);

        match result {
            DecoderResult::InputEmpty => {
                pos += 1;
                if !text.is_empty() {
                    out[start] = Some(DecodedChar::from_text(&text, pos - start));
                    start = pos;
                }
            }
            DecoderResult::Malformed(_, extra) => {
                // 不正な並びの直後から新しいデコーダでやり直す
                let resume = (pos + read).saturating_sub(extra as usize).max(start + 1);
                for slot in &mut out[start..resume] {
                    *slot = Some(DecodedChar::placeholder(1));
                }
                start = resume;
                pos = resume;
                decoder = encoding.encoding().new_decoder_without_bom_handling();
            }
            DecoderResult::OutputFull => {
                out[start] = Some(DecodedChar::placeholder(1));
                start += 1;
                pos = start;
                decoder = encoding.encoding().new_decoder_without_bom_handling();
            }
        }
    }

    for slot in &mut out[start..] {
        *slot = Some(DecodedChar::placeholder(1));
    }
    out
}

/// バイト列全体をテキストとして読む（不正な並びは U+FFFD）
pub fn decode_lossy(bytes: &[u8], encoding: CharEncoding) -> String {
    let (text, _) = encoding.encoding().decode_without_bom_handling(bytes);
    text.into_owned()
}

/// テキストをエンコーディングに戻す
///
/// encoding_rs は UTF-16 を出力できないので、そこだけ自前で並べる。
pub fn encode_text(text: &str, encoding: CharEncoding) -> Vec<u8> {
    match encoding {
        CharEncoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        CharEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        _ => {
            let (bytes, _, _) = encoding.encoding().encode(text);
            bytes.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displays(decoded: &[Option<DecodedChar>]) -> Vec<Option<&str>> {
        decoded.iter().map(|d| d.as_ref().map(|c| c.display.as_str())).collect()
    }

    #[test]
    fn test_ascii_and_controls() {
        let decoded = decode_for_display(b"Hi\n\x00!", CharEncoding::Utf8);
        assert_eq!(displays(&decoded), vec![Some("H"), Some("i"), Some("."), Some("."), Some("!")]);
    }

    #[test]
    fn test_utf8_multibyte() {
        let decoded = decode_for_display("aあb".as_bytes(), CharEncoding::Utf8);
        assert_eq!(displays(&decoded), vec![Some("a"), Some("あ"), None, None, Some("b")]);
        let wide = decoded[1].as_ref().unwrap();
        assert_eq!(wide.byte_len, 3);
        assert_eq!(wide.width, 2);
    }

    #[test]
    fn test_utf8_malformed_and_truncated() {
        // 0xE3 0x41: 先頭だけの並び + 'A'
        let decoded = decode_for_display(&[0xE3, 0x41, 0xE3, 0x81], CharEncoding::Utf8);
        assert_eq!(displays(&decoded), vec![Some("."), Some("A"), Some("."), Some(".")]);
    }

    #[test]
    fn test_shift_jis() {
        let decoded = decode_for_display(&[0x82, 0xA0, 0x41], CharEncoding::ShiftJis);
        assert_eq!(displays(&decoded), vec![Some("あ"), None, Some("A")]);
    }

    #[test]
    fn test_utf16le() {
        let decoded = decode_for_display(&[0x41, 0x00, 0x42, 0x30], CharEncoding::Utf16Le);
        assert_eq!(displays(&decoded), vec![Some("A"), None, Some("あ"), None]);
    }

    #[test]
    fn test_windows_1252_every_byte_is_one_char() {
        let bytes: Vec<u8> = (0..=255).collect();
        let decoded = decode_for_display(&bytes, CharEncoding::Windows1252);
        assert!(decoded.iter().all(|d| d.as_ref().is_some_and(|c| c.byte_len == 1)));
        assert_eq!(decoded[0x41].as_ref().unwrap().display, "A");
        assert_eq!(decoded[0x07].as_ref().unwrap().display, ".");
        assert_eq!(decoded[0x80].as_ref().unwrap().display, "€");
        assert_eq!(CharEncoding::from_name("latin1"), Some(CharEncoding::Windows1252));
    }

    #[test]
    fn test_from_name_and_cycle() {
        assert_eq!(CharEncoding::from_name("Shift_JIS"), Some(CharEncoding::ShiftJis));
        assert_eq!(CharEncoding::from_name("utf-16be"), Some(CharEncoding::Utf16Be));
        assert_eq!(CharEncoding::from_name("klingon"), None);

        let mut enc = CharEncoding::Utf8;
        for _ in 0..CharEncoding::ALL.len() {
            enc = enc.next();
        }
        assert_eq!(enc, CharEncoding::Utf8);
    }

    #[test]
    fn test_lossy_round_trip() {
        let text = decode_lossy("héllo".as_bytes(), CharEncoding::Utf8);
        assert_eq!(text, "héllo");
        assert_eq!(encode_text(&text, CharEncoding::Utf8), "héllo".as_bytes());
    }

    #[test]
    fn test_encode_utf16() {
        assert_eq!(encode_text("Aあ", CharEncoding::Utf16Le), vec![0x41, 0x00, 0x42, 0x30]);
        assert_eq!(encode_text("Aあ", CharEncoding::Utf16Be), vec![0x00, 0x41, 0x30, 0x42]);
        for encoding in CharEncoding::ALL {
            let bytes = encode_text("Hello", encoding);
            assert_eq!(decode_lossy(&bytes, encoding), "Hello", "{}", encoding.name());
        }
    }
}
