//! Framing for the Minecraft Server List Ping exchange.
//!
//! Every packet is `VarInt length` followed by `VarInt packet id` and the
//! packet body, where `length` covers the id and the body. Strings are
//! VarInt length-prefixed UTF-8.

use crate::error::{QueryError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol version announced in the handshake. Servers answer status
/// requests regardless of the version they actually speak.
pub const PROTOCOL_VERSION: i32 = 47;

pub const HANDSHAKE: i32 = 0x00;
pub const STATUS_REQUEST: i32 = 0x00;
pub const STATUS_RESPONSE: i32 = 0x00;
pub const PING: i32 = 0x01;
pub const PONG: i32 = 0x01;

/// Handshake `next state` value selecting the status flow.
const NEXT_STATE_STATUS: i32 = 1;

/// Upper bound for a single packet. Status responses carry the server icon
/// as base64, so they can be a few hundred KB.
pub const MAX_PACKET_LEN: usize = 2 * 1024 * 1024;

const VARINT_MAX_BYTES: usize = 5;

pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
  let mut value = value as u32;
  loop {
    if value & !0x7F == 0 {
      buf.push(value as u8);
      return;
    }
    buf.push((value & 0x7F) as u8 | 0x80);
    value >>= 7;
  }
}

/// Decode a VarInt from the front of `buf`, advancing it.
pub fn read_varint(buf: &mut &[u8]) -> Result<i32> {
  let mut result: u32 = 0;
  for i in 0..VARINT_MAX_BYTES {
    let (&byte, rest) = buf
      .split_first()
      .ok_or_else(|| QueryError::Protocol("truncated varint".to_string()))?;
    *buf = rest;
    result |= u32::from(byte & 0x7F) << (7 * i);
    if byte & 0x80 == 0 {
      return Ok(result as i32);
    }
  }
  Err(QueryError::Protocol("varint exceeds 5 bytes".to_string()))
}

async fn read_varint_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32> {
  let mut result: u32 = 0;
  for i in 0..VARINT_MAX_BYTES {
    let byte = reader.read_u8().await?;
    result |= u32::from(byte & 0x7F) << (7 * i);
    if byte & 0x80 == 0 {
      return Ok(result as i32);
    }
  }
  Err(QueryError::Protocol("varint exceeds 5 bytes".to_string()))
}

pub fn write_string(buf: &mut Vec<u8>, value: &str) {
  write_varint(buf, value.len() as i32);
  buf.extend_from_slice(value.as_bytes());
}

pub fn read_string(buf: &mut &[u8]) -> Result<String> {
  let len = read_varint(buf)?;
  let len = usize::try_from(len)
    .map_err(|_| QueryError::Protocol(format!("negative string length {len}")))?;
  if len > buf.len() {
    return Err(QueryError::Protocol(format!(
      "string length {len} exceeds remaining {} bytes",
      buf.len()
    )));
  }
  let (bytes, rest) = buf.split_at(len);
  *buf = rest;
  String::from_utf8(bytes.to_vec())
    .map_err(|e| QueryError::Protocol(format!("string is not utf-8: {e}")))
}

/// Body of the handshake packet that switches the connection to status.
pub fn handshake_body(host: &str, port: u16) -> Vec<u8> {
  let mut body = Vec::with_capacity(host.len() + 8);
  write_varint(&mut body, PROTOCOL_VERSION);
  write_string(&mut body, host);
  body.extend_from_slice(&port.to_be_bytes());
  write_varint(&mut body, NEXT_STATE_STATUS);
  body
}

/// Frame and send one packet.
pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, id: i32, body: &[u8]) -> Result<()> {
  let mut payload = Vec::with_capacity(body.len() + VARINT_MAX_BYTES);
  write_varint(&mut payload, id);
  payload.extend_from_slice(body);

  let mut frame = Vec::with_capacity(payload.len() + VARINT_MAX_BYTES);
  write_varint(&mut frame, payload.len() as i32);
  frame.extend_from_slice(&payload);

  writer.write_all(&frame).await?;
  writer.flush().await?;
  Ok(())
}

/// Read one packet, returning its id and body.
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(i32, Vec<u8>)> {
  let len = read_varint_from(reader).await?;
  let len = match usize::try_from(len) {
    Ok(len) if len > 0 && len <= MAX_PACKET_LEN => len,
    _ => return Err(QueryError::Protocol(format!("invalid packet length {len}"))),
  };

  let mut payload = vec![0u8; len];
  reader.read_exact(&mut payload).await?;

  let mut cursor = payload.as_slice();
  let id = read_varint(&mut cursor)?;
  Ok((id, cursor.to_vec()))
}
