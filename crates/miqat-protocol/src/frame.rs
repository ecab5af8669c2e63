//! Length-prefixed bincode frames shared by the daemon and the CLI.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side accepts.
pub const MAX_FRAME_BYTES: u32 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("input/output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame of {length} bytes exceeds the limit")]
    TooLarge { length: u32 },

    #[error("serialization error: {0}")]
    Codec(#[from] bincode::Error),
}

pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = bincode::serialize(message)?;
    let length = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    if length > MAX_FRAME_BYTES {
        return Err(FrameError::TooLarge { length });
    }

    writer.write_all(&length.to_le_bytes()).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// The length is checked before anything is allocated.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T, FrameError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut length_buffer = [0u8; 4];
    reader.read_exact(&mut length_buffer).await?;
    let length = u32::from_le_bytes(length_buffer);
    if length > MAX_FRAME_BYTES {
        return Err(FrameError::TooLarge { length });
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await?;
    Ok(bincode::deserialize(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    #[tokio::test]
    async fn request_travels_through_a_pipe() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        write_frame(&mut client, &Request::GetStats).await.unwrap();
        let received: Request = read_frame(&mut server).await.unwrap();

        assert_eq!(received, Request::GetStats);
    }

    #[tokio::test]
    async fn oversized_length_is_refused_before_reading_payload() {
        let (mut client, mut server) = tokio::io::duplex(64);

        client
            .write_all(&(MAX_FRAME_BYTES + 1).to_le_bytes())
            .await
            .unwrap();
        let result: Result<Response, _> = read_frame(&mut server).await;

        assert!(matches!(
            result,
            Err(FrameError::TooLarge { length }) if length == MAX_FRAME_BYTES + 1
        ));
    }

    #[tokio::test]
    async fn truncated_frame_is_an_io_error() {
        let (mut client, mut server) = tokio::io::duplex(64);

        client.write_all(&10u32.to_le_bytes()).await.unwrap();
        client.write_all(&[1, 2, 3]).await.unwrap();
        drop(client);
        let result: Result<Request, _> = read_frame(&mut server).await;

        assert!(matches!(result, Err(FrameError::Io(_))));
    }

    #[tokio::test]
    async fn garbage_payload_is_a_codec_error() {
        let (mut client, mut server) = tokio::io::duplex(64);

        client.write_all(&4u32.to_le_bytes()).await.unwrap();
        client.write_all(&[0xff, 0xff, 0xff, 0xff]).await.unwrap();
        let result: Result<Request, _> = read_frame(&mut server).await;

        assert!(matches!(result, Err(FrameError::Codec(_))));
    }
}
