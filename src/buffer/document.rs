use super::ByteBuffer;
use crate::signature::SignatureDescriptor;

/// 読み込み済みファイルを表す構造体
///
/// 現在のバッファは編集のたびに丸ごと置き換わる。
#[derive(Debug)]
pub struct Document {
    /// 報告されたファイル名
    name: String,
    /// 判定済みのファイル種別
    descriptor: &'static SignatureDescriptor,
    /// 現在のバッファ
    buffer: ByteBuffer,
    /// 変更フラグ
    modified: bool,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        descriptor: &'static SignatureDescriptor,
        buffer: ByteBuffer,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            buffer,
            modified: false,
        }
    }

    /// ファイル名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &'static SignatureDescriptor {
        self.descriptor
    }

    /// 現在のバッファ
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    /// データの長さを取得
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 編集後のバッファに差し替える（戻り値は差し替え前のバッファ）
    pub fn replace_buffer(&mut self, buffer: ByteBuffer) -> ByteBuffer {
        self.modified = true;
        std::mem::replace(&mut self.buffer, buffer)
    }

    /// 変更されているかどうか
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}
