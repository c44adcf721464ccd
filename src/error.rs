//! エラー型

use thiserror::Error;

/// ライブラリ全体のエラー
///
/// どのエラーも発生した境界で回復され、ステータスメッセージとして表示される。
#[derive(Error, Debug)]
pub enum InspectError {
    /// 入力サイズが上限を超えている（解析前に拒否）
    #[error("File size {size} bytes exceeds {limit} bytes limit")]
    OversizedInput { size: usize, limit: usize },

    /// 拡張子に対応するシグネチャがない
    #[error("Unsupported file type: {0:?}")]
    UnsupportedType(String),

    /// マジックバイトが一致しない
    #[error("Invalid {tag} file: signature mismatch")]
    InvalidFormat { tag: String },

    /// 不正な編集（範囲外オフセット、不正なHEX）
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    /// 不正な暗号鍵
    #[error("Invalid cipher key: {0}")]
    InvalidCipherKey(String),

    /// フォーマット固有のサブパーサが失敗した
    #[error("{tag} sub-parser failed: {reason}")]
    SubParserFailure { tag: String, reason: String },

    /// ファイルがまだ読み込まれていない
    #[error("No file loaded")]
    NoDocument,

    /// 設定値が不正
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/Oエラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InspectError {
    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        InspectError::InvalidEdit(reason.into())
    }

    pub fn invalid_key(reason: impl Into<String>) -> Self {
        InspectError::InvalidCipherKey(reason.into())
    }

    pub fn sub_parser(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        InspectError::SubParserFailure {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InspectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_message() {
        let err = InspectError::OversizedInput { size: 2048, limit: 1024 };
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn test_sub_parser_message() {
        let err = InspectError::sub_parser("docx", "truncated local header");
        assert_eq!(err.to_string(), "docx sub-parser failed: truncated local header");
    }
}
