//! 1バイト編集

use tracing::debug;

use crate::buffer::ByteBuffer;
use crate::error::{InspectError, Result};

/// 2桁のHEX文字列をバイト値にする（`^[0-9A-Fa-f]{2}$` 以外は拒否）
pub fn parse_hex_byte(s: &str) -> Result<u8> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_hexdigit()) {
        return Err(InspectError::invalid_edit(format!(
            "expected two hex digits, got {s:?}"
        )));
    }
    u8::from_str_radix(s, 16).map_err(|e| InspectError::invalid_edit(e.to_string()))
}

/// 整数をバイト値として検証する
pub fn byte_from_int(value: i64) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| InspectError::invalid_edit(format!("byte value {value} out of range 0-255")))
}

/// パッチの値をパースする
///
/// `#` で始まれば10進整数（0-255）、それ以外は2桁のHEX。
pub fn parse_byte_value(s: &str) -> Result<u8> {
    match s.trim().strip_prefix('#') {
        Some(decimal) => {
            let value: i64 = decimal
                .parse()
                .map_err(|_| InspectError::invalid_edit(format!("byte value {decimal:?} is not an integer")))?;
            byte_from_int(value)
        }
        None => parse_hex_byte(s.trim()),
    }
}

/// オフセットをパースする
///
/// `0x` プレフィックスまたは `h` サフィックスで16進数、A-Fを含めば16進数、
/// それ以外は10進数。
pub fn parse_offset(input: &str) -> Option<usize> {
    let input = input.trim();
    if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = input.strip_suffix('h').or_else(|| input.strip_suffix('H')) {
        usize::from_str_radix(hex, 16).ok()
    } else if input.chars().all(|c| c.is_ascii_hexdigit())
        && input.chars().any(|c| c.is_ascii_alphabetic())
    {
        usize::from_str_radix(input, 16).ok()
    } else {
        input.parse().ok()
    }
}

/// 1バイトだけ変更した新しいバッファを返す（入力は変更しない）
///
/// 成功したら呼び出し側は分類と描画をやり直すこと。
pub fn apply_edit(buffer: &ByteBuffer, offset: usize, value: u8) -> Result<ByteBuffer> {
    let edited = buffer.with_byte(offset, value).ok_or_else(|| {
        InspectError::invalid_edit(format!(
            "offset {offset:#X} outside buffer of {} bytes",
            buffer.len()
        ))
    })?;
    debug!(offset, value, "byte edited");
    Ok(edited)
}

/// 編集境界: オフセットと2桁のHEX文字列
pub fn apply_hex_edit(buffer: &ByteBuffer, offset: usize, hex: &str) -> Result<ByteBuffer> {
    let value = parse_hex_byte(hex)?;
    apply_edit(buffer, offset, value)
}
