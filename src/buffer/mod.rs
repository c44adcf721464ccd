mod document;

pub use document::Document;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{InspectError, Result};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// バッファの識別子（分類結果の世代タグに使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

/// 不変のバイト列
///
/// 変更は常に新しい `ByteBuffer` を生成する（コピーオンライト）。
/// クローンは同じ内容と識別子を共有する。
#[derive(Clone)]
pub struct ByteBuffer {
    id: BufferId,
    data: Arc<[u8]>,
}

impl ByteBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            id: BufferId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            data: data.into(),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 指定位置のバイトを取得
    pub fn get(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// 生データへの参照を取得
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 1バイトだけ差し替えた新しいバッファを返す
    pub fn with_byte(&self, pos: usize, value: u8) -> Option<ByteBuffer> {
        if pos >= self.data.len() {
            return None;
        }
        let mut data = self.data.to_vec();
        data[pos] = value;
        Some(ByteBuffer::new(data))
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("id", &self.id)
            .field("len", &self.data.len())
            .finish()
    }
}

/// サイズ上限を確認してからファイルを読み込む
pub fn read_file(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len() as usize;
    if size > limit {
        return Err(InspectError::OversizedInput { size, limit });
    }

    let mut data = Vec::with_capacity(size);
    // 読み込み中にファイルが伸びても上限+1バイトまでしか読まない
    file.by_ref().take(limit as u64 + 1).read_to_end(&mut data)?;
    if data.len() > limit {
        return Err(InspectError::OversizedInput { size: data.len(), limit });
    }
    Ok(data)
}
