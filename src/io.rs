//! Whole-document I/O over async byte streams.
//!
//! jsonb has no framing, so a document is simply everything up to end of
//! stream. The codec itself is synchronous; these helpers only move bytes,
//! so callers can convert between reading and writing and leave the output
//! untouched when conversion fails.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::JsonbError;

/// Initial read buffer size.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads a complete document (everything until end of stream).
pub async fn read_document<R>(reader: &mut R) -> Result<BytesMut, JsonbError>
where
    R: AsyncRead + Unpin,
{
    let mut document = BytesMut::with_capacity(READ_CHUNK_SIZE);
    loop {
        if document.capacity() == document.len() {
            document.reserve(READ_CHUNK_SIZE);
        }
        if reader.read_buf(&mut document).await? == 0 {
            break;
        }
    }
    Ok(document)
}

/// Writes a complete document and flushes the writer.
pub async fn write_document<W>(writer: &mut W, data: &[u8]) -> Result<(), JsonbError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{JsonbCodec, Mode};
    use std::io::Cursor;

    #[tokio::test]
    async fn read_whole_stream() {
        let data = vec![0xAB; READ_CHUNK_SIZE * 3 + 17];
        let mut reader = Cursor::new(data.clone());
        let document = read_document(&mut reader).await.unwrap();
        assert_eq!(&document[..], &data[..]);
    }

    #[tokio::test]
    async fn read_empty_stream() {
        let mut reader = Cursor::new(Vec::new());
        let document = read_document(&mut reader).await.unwrap();
        assert!(document.is_empty());
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let mut output = Vec::new();
        write_document(&mut output, &[0x05, 0x03, 0x02, 0x00]).await.unwrap();
        let mut reader = Cursor::new(output);
        let document = read_document(&mut reader).await.unwrap();
        assert_eq!(&document[..], &[0x05, 0x03, 0x02, 0x00]);
    }

    #[tokio::test]
    async fn read_convert_write() {
        let mut reader = Cursor::new(vec![0x04, 0x07, b'k', 0x00, 0x01, 0x00]);
        let document = read_document(&mut reader).await.unwrap();
        let text = JsonbCodec::default().transcode(Mode::Decode, &document).unwrap();
        let mut output = Vec::new();
        write_document(&mut output, &text).await.unwrap();
        assert_eq!(output, br#"{"k":false}"#);
    }
}
