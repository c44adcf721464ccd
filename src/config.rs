//! 設定

use std::path::PathBuf;

use crate::encoding::CharEncoding;
use crate::error::{InspectError, Result};

/// 読み込めるファイルサイズの上限（1MB）
pub const DEFAULT_MAX_FILE_SIZE: usize = 1024 * 1024;
/// 表示ウィンドウの既定の長さ
pub const DEFAULT_WINDOW_LENGTH: usize = 256;

/// 実行時の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 入力サイズの上限（バイト）
    pub max_file_size: usize,
    /// 表示ウィンドウの長さ（バイト）
    pub window_length: usize,
    /// テキスト欄のエンコーディング
    pub encoding: CharEncoding,
    /// ログの出力先
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            window_length: DEFAULT_WINDOW_LENGTH,
            encoding: CharEncoding::Utf8,
            log_file: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(InspectError::InvalidConfig(
                "max file size must be greater than zero".to_string(),
            ));
        }
        if self.window_length == 0 {
            return Err(InspectError::InvalidConfig(
                "window length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// エンコーディング名の解析（clapの value_parser 用）
pub fn parse_encoding(name: &str) -> std::result::Result<CharEncoding, String> {
    CharEncoding::from_name(name).ok_or_else(|| {
        let known: Vec<_> = CharEncoding::ALL.iter().map(|e| e.name()).collect();
        format!("unknown encoding {name:?} (expected one of {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.max_file_size, 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = Config {
            window_length: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        let config = Config {
            max_file_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!(parse_encoding("sjis"), Ok(CharEncoding::ShiftJis));
        assert!(parse_encoding("ebcdic").unwrap_err().contains("UTF-8"));
    }
}
