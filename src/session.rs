//! アプリケーション状態
//!
//! 現在のバッファ・領域・ウィンドウ・ハイライトをひとまとめに持つ。
//! どの操作も値を丸ごと置き換え、部分的な更新はしない。

use tracing::{debug, info};

use crate::buffer::{BufferId, ByteBuffer, Document};
use crate::cipher::{CipherJob, CipherOutput};
use crate::config::Config;
use crate::edit;
use crate::encoding::CharEncoding;
use crate::error::{InspectError, Result};
use crate::region::{self, Region};
use crate::render::{self, ByteInfo, RenderedView};
use crate::signature::{self, MetadataSummary, Probe, SignatureDescriptor};
use crate::window::ViewWindow;

/// 分類の依頼（バッファの識別子でタグ付けされる）
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub buffer: ByteBuffer,
    pub descriptor: &'static SignatureDescriptor,
    pub name: String,
}

impl ClassifyRequest {
    /// 分類と要約を実行する（別スレッドから呼んでもよい）
    pub fn run(self) -> Classification {
        let data = self.buffer.data();
        let regions = region::classify(data, self.descriptor);
        let summary = (self.descriptor.summary)(&Probe::new(&self.name, data));
        Classification {
            buffer_id: self.buffer.id(),
            regions,
            summary,
        }
    }
}

/// 分類結果
#[derive(Debug, Clone)]
pub struct Classification {
    /// 計算の元になったバッファ
    pub buffer_id: BufferId,
    pub regions: Vec<Region>,
    pub summary: MetadataSummary,
}

/// 1ファイル分の閲覧セッション
#[derive(Debug)]
pub struct Session {
    config: Config,
    document: Option<Document>,
    /// 分類待ちの間は None
    regions: Option<Vec<Region>>,
    summary: Option<MetadataSummary>,
    window: ViewWindow,
    highlight: Option<usize>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let window = ViewWindow::new(0, config.window_length, config.encoding);
        Self {
            config,
            document: None,
            regions: None,
            summary: None,
            window,
            highlight: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn regions(&self) -> Option<&[Region]> {
        self.regions.as_deref()
    }

    pub fn summary(&self) -> Option<&MetadataSummary> {
        self.summary.as_ref()
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlight
    }

    /// 分類待ちかどうか
    pub fn is_pending(&self) -> bool {
        self.document.is_some() && self.regions.is_none()
    }

    fn buffer_len(&self) -> usize {
        self.document.as_ref().map_or(0, Document::len)
    }

    fn document_ref(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(InspectError::NoDocument)
    }

    /// 入力境界: 上限チェック、宣言種別の解決、マジックバイトの確認
    ///
    /// 失敗したときは状態を変えない。成功すると分類待ちになる。
    pub fn load(&mut self, name: &str, bytes: Vec<u8>) -> Result<ClassifyRequest> {
        let limit = self.config.max_file_size;
        if bytes.len() > limit {
            return Err(InspectError::OversizedInput {
                size: bytes.len(),
                limit,
            });
        }
        let declared = signature::declared_type(name)?;
        let descriptor = signature::detect_type(&bytes, declared.tag)?;

        let buffer = ByteBuffer::new(bytes);
        info!(name, tag = descriptor.tag, len = buffer.len(), "file loaded");

        let len = buffer.len();
        let request = ClassifyRequest {
            buffer: buffer.clone(),
            descriptor,
            name: name.to_string(),
        };
        self.document = Some(Document::new(name, descriptor, buffer));
        self.regions = None;
        self.summary = None;
        self.highlight = None;
        self.window = ViewWindow::new(0, self.config.window_length, self.window.encoding).clamped(len);
        Ok(request)
    }

    /// 現在のバッファに対する分類依頼（分類済みなら None）
    pub fn pending_request(&self) -> Option<ClassifyRequest> {
        let document = self.document.as_ref()?;
        if self.regions.is_some() {
            return None;
        }
        Some(ClassifyRequest {
            buffer: document.buffer().clone(),
            descriptor: document.descriptor(),
            name: document.name().to_string(),
        })
    }

    /// 分類をその場で実行する
    pub fn classify_now(&mut self) {
        if let Some(request) = self.pending_request() {
            let result = request.run();
            self.accept(result);
        }
    }

    /// 分類結果を適用する
    ///
    /// 現在のバッファ以外から計算された結果は捨てる。
    pub fn accept(&mut self, result: Classification) -> bool {
        let current = self.document.as_ref().map(|d| d.buffer().id());
        if current != Some(result.buffer_id) {
            debug!(
                stale = ?result.buffer_id,
                current = ?current,
                "dropping stale classification"
            );
            return false;
        }
        debug!(regions = result.regions.len(), "classification applied");
        self.regions = Some(result.regions);
        self.summary = Some(result.summary);
        true
    }

    /// 編集境界: 1バイト書き換えて分類待ちに戻す
    pub fn edit(&mut self, offset: usize, hex: &str) -> Result<ClassifyRequest> {
        self.replace_buffer_with(|buffer| edit::apply_hex_edit(buffer, offset, hex))
    }

    /// 検証済みのバイト値で1バイト書き換える
    pub fn edit_byte(&mut self, offset: usize, value: u8) -> Result<ClassifyRequest> {
        self.replace_buffer_with(|buffer| edit::apply_edit(buffer, offset, value))
    }

    fn replace_buffer_with(
        &mut self,
        apply: impl FnOnce(&ByteBuffer) -> Result<ByteBuffer>,
    ) -> Result<ClassifyRequest> {
        let document = self.document.as_mut().ok_or(InspectError::NoDocument)?;
        let edited = apply(document.buffer())?;
        document.replace_buffer(edited);
        self.regions = None;
        self.summary = None;
        self.pending_request().ok_or(InspectError::NoDocument)
    }

    /// ハイライトを設定する（ウィンドウ外なら中央に寄せる）
    pub fn highlight(&mut self, offset: usize) -> bool {
        let len = self.buffer_len();
        if offset >= len {
            return false;
        }
        self.highlight = Some(offset);
        self.window = self.window.revealing(offset, len);
        true
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    /// 指定オフセットから表示する
    pub fn scrub(&mut self, offset: usize) {
        self.window = self.window.scrubbed_to(offset, self.buffer_len());
    }

    pub fn page_down(&mut self) {
        self.window = self.window.page_down(self.buffer_len());
    }

    pub fn page_up(&mut self) {
        self.window = self.window.page_up(self.buffer_len());
    }

    /// ウィンドウの長さを変える
    pub fn set_length(&mut self, length: usize) -> Result<()> {
        if length == 0 {
            return Err(InspectError::InvalidConfig(
                "window length must be greater than zero".to_string(),
            ));
        }
        self.config.window_length = length;
        self.window = self.window.with_length(length, self.buffer_len());
        Ok(())
    }

    pub fn set_encoding(&mut self, encoding: CharEncoding) {
        self.window = self.window.with_encoding(encoding);
    }

    /// 現在のウィンドウを描画する（未読み込み・分類待ちなら None）
    pub fn render(&self) -> Option<RenderedView> {
        let document = self.document.as_ref()?;
        let regions = self.regions.as_ref()?;
        Some(render::render(
            document.buffer().data(),
            regions,
            &self.window,
            self.highlight,
        ))
    }

    /// ハイライト中のバイトの詳細
    pub fn highlighted_info(&self) -> Option<ByteInfo> {
        let document = self.document.as_ref()?;
        let regions = self.regions.as_ref()?;
        render::byte_info(document.buffer().data(), regions, self.highlight?)
    }

    /// 暗号変換（結果は表示専用で、バッファは変えない）
    pub fn cipher(&self, job: &CipherJob) -> Result<CipherOutput> {
        let document = self.document_ref()?;
        job.run(document.buffer().data(), self.window.encoding)
    }
}
