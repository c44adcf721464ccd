//! バイト領域の分類
//!
//! 記述子が返す生の範囲を優先順位 FileName > Header > Sensitive > Content で
//! 解決し、`[0, len)` を隙間なく重なりなく覆う領域列にする。

use tracing::{debug, warn};

use crate::signature::{RangeFn, SignatureDescriptor};

/// 両端を含むバイト範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// バッファ長に切り詰める（範囲外なら None）
    pub fn clamp(self, len: usize) -> Option<Self> {
        if self.start > self.end || self.start >= len {
            return None;
        }
        Some(Self::new(self.start, self.end.min(len - 1)))
    }
}

/// 領域の種類（宣言順が優先順位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionKind {
    FileName,
    Header,
    Sensitive,
    Content,
    /// 分類結果に含まれないバイト
    Unknown,
}

impl RegionKind {
    pub const ALL: [RegionKind; 5] = [
        RegionKind::FileName,
        RegionKind::Header,
        RegionKind::Sensitive,
        RegionKind::Content,
        RegionKind::Unknown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RegionKind::FileName => "File Name",
            RegionKind::Header => "Header",
            RegionKind::Sensitive => "Sensitive",
            RegionKind::Content => "Content",
            RegionKind::Unknown => "Unknown",
        }
    }
}

/// 同じ種類の連続したバイト範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub range: ByteRange,
    pub kind: RegionKind,
}

/// 記述子が返した生の範囲
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRanges {
    pub file_name: Vec<ByteRange>,
    pub header: Vec<ByteRange>,
    pub sensitive: Vec<ByteRange>,
}

impl RawRanges {
    /// 記述子の範囲関数を実行する
    ///
    /// サブパーサの失敗はその関数の結果を空にするだけで、分類全体は止めない。
    pub fn collect(data: &[u8], descriptor: &SignatureDescriptor) -> Self {
        Self {
            file_name: run(descriptor, "file name", descriptor.file_name_ranges, data),
            header: run(descriptor, "header", descriptor.header_ranges, data),
            sensitive: run(descriptor, "sensitive", descriptor.sensitive_ranges, data),
        }
    }
}

fn run(descriptor: &SignatureDescriptor, what: &str, f: RangeFn, data: &[u8]) -> Vec<ByteRange> {
    match f(data) {
        Ok(ranges) => ranges,
        Err(e) => {
            warn!(tag = descriptor.tag, "{} ranges unavailable: {}", what, e);
            Vec::new()
        }
    }
}

/// バッファを分類する
pub fn classify(data: &[u8], descriptor: &SignatureDescriptor) -> Vec<Region> {
    if data.is_empty() {
        return Vec::new();
    }
    let raw = RawRanges::collect(data, descriptor);
    let regions = resolve(data.len(), &raw);
    debug!(tag = descriptor.tag, len = data.len(), regions = regions.len(), "classified");
    regions
}

/// 生の範囲を優先順位で解決し、同種の連続バイトをまとめる
pub fn resolve(len: usize, raw: &RawRanges) -> Vec<Region> {
    if len == 0 {
        return Vec::new();
    }

    // 優先度の低い順に塗り、高い種類で上書きする
    let mut kinds = vec![RegionKind::Content; len];
    for (kind, ranges) in [
        (RegionKind::Sensitive, &raw.sensitive),
        (RegionKind::Header, &raw.header),
        (RegionKind::FileName, &raw.file_name),
    ] {
        for range in ranges.iter().filter_map(|r| r.clamp(len)) {
            kinds[range.start..=range.end].fill(kind);
        }
    }

    let mut regions: Vec<Region> = Vec::new();
    for (pos, &kind) in kinds.iter().enumerate() {
        match regions.last_mut() {
            Some(last) if last.kind == kind => last.range.end = pos,
            _ => regions.push(Region {
                range: ByteRange::new(pos, pos),
                kind,
            }),
        }
    }
    regions
}

/// 指定位置の種類（領域外なら Unknown）
pub fn kind_at(regions: &[Region], pos: usize) -> RegionKind {
    let idx = regions.partition_point(|r| r.range.end < pos);
    match regions.get(idx) {
        Some(region) if region.range.contains(pos) => region.kind,
        _ => RegionKind::Unknown,
    }
}

/// 種類ごとの集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: RegionKind,
    pub bytes: usize,
    /// 最初に現れる領域
    pub first: Option<ByteRange>,
}

/// 種類ごとのバイト数と最初の範囲をまとめる
pub fn summarize(regions: &[Region]) -> Vec<KindSummary> {
    RegionKind::ALL
        .iter()
        .filter(|&&kind| kind != RegionKind::Unknown)
        .map(|&kind| {
            let mut matching = regions.iter().filter(|r| r.kind == kind);
            let first = matching.next().map(|r| r.range);
            let bytes = first.map_or(0, |r| r.len()) + matching.map(|r| r.range.len()).sum::<usize>();
            KindSummary { kind, bytes, first }
        })
        .collect()
}
