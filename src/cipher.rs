//! 学習用の可逆な暗号変換
//!
//! 結果は表示専用で、元のバッファには書き戻さない。

use tracing::debug;

use crate::encoding::{CharEncoding, decode_lossy, encode_text};
use crate::error::{InspectError, Result};

/// 暗号アルゴリズム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// デコード済みテキストのASCII英字を回転
    Caesar,
    /// バイト列と鍵の繰り返しのXOR
    Xor,
}

impl Algorithm {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "caesar" => Some(Algorithm::Caesar),
            "xor" => Some(Algorithm::Xor),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Caesar => "caesar",
            Algorithm::Xor => "xor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherKey {
    Shift(i64),
    Bytes(Vec<u8>),
}

/// ボタン1回分の暗号処理
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherJob {
    pub algorithm: Algorithm,
    pub key: CipherKey,
    pub direction: Direction,
}

/// 暗号処理の結果（表示専用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherOutput {
    pub bytes: Vec<u8>,
    /// テキストとして扱った場合の結果
    pub text: Option<String>,
}

impl CipherOutput {
    /// 空白区切りの大文字HEX
    pub fn hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CipherJob {
    /// 暗号境界: アルゴリズム名と鍵を検証する
    ///
    /// Caesar の鍵は 0-25 の整数、XOR の鍵は空でない文字列。
    pub fn parse(algorithm: &str, key: Option<&str>, direction: Direction) -> Result<Self> {
        let algorithm = Algorithm::from_name(algorithm)
            .ok_or_else(|| InspectError::invalid_key(format!("unknown algorithm {algorithm:?}")))?;
        let key = key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| InspectError::invalid_key("key is required"))?;

        let key = match algorithm {
            Algorithm::Caesar => {
                let shift: i64 = key
                    .trim()
                    .parse()
                    .map_err(|_| InspectError::invalid_key(format!("caesar key {key:?} is not an integer")))?;
                if !(0..=25).contains(&shift) {
                    return Err(InspectError::invalid_key(format!(
                        "caesar key {shift} outside 0-25"
                    )));
                }
                CipherKey::Shift(shift)
            }
            Algorithm::Xor => CipherKey::Bytes(key.as_bytes().to_vec()),
        };

        Ok(Self {
            algorithm,
            key,
            direction,
        })
    }

    /// 変換を実行する
    pub fn run(&self, data: &[u8], encoding: CharEncoding) -> Result<CipherOutput> {
        debug!(
            algorithm = self.algorithm.name(),
            direction = ?self.direction,
            len = data.len(),
            "cipher job"
        );
        match (&self.key, self.direction) {
            (CipherKey::Shift(shift), direction) => {
                let text = decode_lossy(data, encoding);
                let text = match direction {
                    Direction::Encrypt => caesar_encrypt(&text, *shift),
                    Direction::Decrypt => caesar_decrypt(&text, *shift),
                };
                Ok(CipherOutput {
                    bytes: encode_text(&text, encoding),
                    text: Some(text),
                })
            }
            // XORは自己逆変換
            (CipherKey::Bytes(key), _) => Ok(CipherOutput {
                bytes: xor(data, key)?,
                text: None,
            }),
        }
    }
}

fn rotate(text: &str, shift: i64) -> String {
    let shift = shift.rem_euclid(26) as u8;
    text.chars()
        .map(|c| {
            let base = match c {
                'a'..='z' => b'a',
                'A'..='Z' => b'A',
                _ => return c,
            };
            ((c as u8 - base + shift) % 26 + base) as char
        })
        .collect()
}

/// ASCII英字だけを shift mod 26 回転する
pub fn caesar_encrypt(text: &str, shift: i64) -> String {
    rotate(text, shift)
}

pub fn caesar_decrypt(text: &str, shift: i64) -> String {
    rotate(text, -shift.rem_euclid(26))
}

/// 鍵の繰り返しとXORする（空の鍵は拒否）
pub fn xor(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if key.is_empty() {
        return Err(InspectError::invalid_key("xor key must not be empty"));
    }
    Ok(data
        .iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Hello, World! zZ aA 123 ü日本";

    #[test]
    fn test_caesar_known_value() {
        assert_eq!(caesar_encrypt("abc XYZ", 3), "def ABC");
        assert_eq!(caesar_decrypt("def ABC", 3), "abc XYZ");
        assert_eq!(caesar_encrypt("abc", -1), "zab");
    }

    #[test]
    fn test_caesar_round_trip_all_shifts() {
        for shift in -100..=100 {
            let encrypted = caesar_encrypt(SAMPLE, shift);
            assert_eq!(caesar_decrypt(&encrypted, shift), SAMPLE, "shift {shift}");
        }
    }

    #[test]
    fn test_caesar_large_shift() {
        assert_eq!(caesar_encrypt("abc", i64::MAX), caesar_encrypt("abc", i64::MAX.rem_euclid(26)));
        assert_eq!(caesar_decrypt(&caesar_encrypt("Zz", i64::MIN), i64::MIN), "Zz");
    }

    #[test]
    fn test_caesar_leaves_non_letters() {
        assert_eq!(caesar_encrypt("1 + ü = !", 7), "1 + ü = !");
    }

    #[test]
    fn test_xor_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        for key in [&b"k"[..], b"key", b"\x00\xFF", b"a much longer key than usual"] {
            let encrypted = xor(&data, key).unwrap();
            assert_eq!(xor(&encrypted, key).unwrap(), data);
        }
    }

    #[test]
    fn test_xor_empty_key() {
        assert!(matches!(xor(b"data", b""), Err(InspectError::InvalidCipherKey(_))));
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        for key in [None, Some("")] {
            assert!(matches!(
                CipherJob::parse("xor", key, Direction::Encrypt),
                Err(InspectError::InvalidCipherKey(_))
            ));
        }
    }

    #[test]
    fn test_parse_caesar_key_range() {
        assert!(CipherJob::parse("caesar", Some("25"), Direction::Encrypt).is_ok());
        assert!(CipherJob::parse("Caesar", Some("0"), Direction::Decrypt).is_ok());
        for bad in ["26", "-1", "three", "1.5"] {
            assert!(CipherJob::parse("caesar", Some(bad), Direction::Encrypt).is_err(), "{bad}");
        }
        assert!(CipherJob::parse("aes", Some("k"), Direction::Encrypt).is_err());
    }

    #[test]
    fn test_job_round_trip_does_not_touch_input() {
        let data = b"Attack at dawn".to_vec();
        let snapshot = data.clone();

        let enc = CipherJob::parse("caesar", Some("13"), Direction::Encrypt).unwrap();
        let dec = CipherJob::parse("caesar", Some("13"), Direction::Decrypt).unwrap();
        let out = enc.run(&data, CharEncoding::Utf8).unwrap();
        assert_eq!(out.text.as_deref(), Some("Nggnpx ng qnja"));
        assert_eq!(dec.run(&out.bytes, CharEncoding::Utf8).unwrap().bytes, data);
        assert_eq!(data, snapshot);

        let xor_job = CipherJob::parse("xor", Some("k3y"), Direction::Encrypt).unwrap();
        let out = xor_job.run(&data, CharEncoding::Utf8).unwrap();
        assert_eq!(xor_job.run(&out.bytes, CharEncoding::Utf8).unwrap().bytes, data);
        assert_eq!(CipherOutput { bytes: vec![0x0A, 0xFF], text: None }.hex(), "0A FF");
    }

    #[test]
    fn test_caesar_job_round_trip_every_encoding() {
        let enc = CipherJob::parse("caesar", Some("3"), Direction::Encrypt).unwrap();
        let dec = CipherJob::parse("caesar", Some("3"), Direction::Decrypt).unwrap();
        for encoding in CharEncoding::ALL {
            let data = encode_text("Hello, World 42", encoding);
            let out = enc.run(&data, encoding).unwrap();
            assert_eq!(out.text.as_deref(), Some("Khoor, Zruog 42"), "{}", encoding.name());
            assert_eq!(out.bytes, encode_text("Khoor, Zruog 42", encoding), "{}", encoding.name());

            let back = dec.run(&out.bytes, encoding).unwrap();
            assert_eq!(back.bytes, data, "{}", encoding.name());
        }
    }
}
