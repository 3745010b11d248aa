//! Main client implementation

use crate::{
    link::LinkResolver,
    session::UploadSession,
    transport::Transport,
    types::*,
    Config, Result, StorageError,
};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Dropbox-backed storage client
pub struct DropboxStorage {
    config: Config,
    transport: Transport,
}

impl DropboxStorage {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = Transport::new(&config)?;
        Ok(Self { config, transport })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Upload ====================

    /// Stream `part` into a new upload session and commit it
    ///
    /// The returned object carries the service metadata plus the resolved
    /// `filename`. Fails with [`StorageError::IncompleteUpload`] whenever the
    /// bytes forwarded differ from `part.declared_size`, wrapping the step
    /// failure that caused it, if any.
    #[instrument(skip(self, part), fields(declared_size = part.declared_size))]
    pub async fn upload<R>(&self, part: FilePart<R>) -> Result<CommittedObject>
    where
        R: AsyncRead + Unpin,
    {
        let FilePart {
            content_type,
            file_name,
            declared_size,
            mut reader,
        } = part;

        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let file_name = match file_name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => {
                let generated = format!("{}.{}", Uuid::new_v4(), UNKNOWN_EXTENSION);
                info!(file_name = %generated, "Client didn't provide a file name, generated one");
                generated
            }
        };

        let mut session = UploadSession::start(&self.transport, &self.config, content_type)?;
        let streamed = self.forward(&mut session, &mut reader).await;
        let drained = session.checkpoint().await.map(|_| ());

        let failure = match (streamed, drained) {
            (Err(first), Err(second)) => {
                warn!(error = %second, "Checkpoint after a failed upload also failed");
                Some(first)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Some(e),
            (Ok(()), Ok(())) => None,
        };

        if session.offset() != declared_size {
            warn!(
                expected = declared_size,
                written = session.offset(),
                "Upload forwarded a different number of bytes than declared"
            );
            return Err(StorageError::IncompleteUpload {
                expected: declared_size,
                written: session.offset(),
                cause: failure.map(Box::new),
            });
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let commit = CommitInfo::for_file(&file_name);
        let response = session.finish(&commit).await?;
        let object = CommittedObject::from_finish(response, &file_name)?;

        info!(
            path = object.path_display().unwrap_or_default(),
            bytes = declared_size,
            "Upload committed"
        );
        Ok(object)
    }

    async fn forward<R>(&self, session: &mut UploadSession<'_>, reader: &mut R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let chunk_size = self.config.chunk_size;
        loop {
            let mut chunk = vec![0u8; chunk_size];
            let filled = read_chunk(reader, &mut chunk)
                .await
                .map_err(StorageError::InboundRead)?;
            if filled == 0 {
                return Ok(());
            }
            chunk.truncate(filled);
            session.append(Bytes::from(chunk)).await?;
            if filled < chunk_size {
                return Ok(());
            }
        }
    }

    // ==================== Links ====================

    /// Get a verified temporary download link for a committed object
    #[instrument(skip(self, object), fields(path = object.path_display()))]
    pub async fn get_link(&self, object: &CommittedObject) -> Result<String> {
        Ok(self.temporary_link(object).await?.link)
    }

    /// Like [`get_link`](Self::get_link), also returning the hash the link was checked against
    pub async fn temporary_link(&self, object: &CommittedObject) -> Result<TemporaryLink> {
        LinkResolver::new(&self.transport, &self.config)
            .resolve(object)
            .await
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream
async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_read_chunk_coalesces_short_reads() {
        // a chained reader yields at most one side per read call
        let first: &[u8] = &[1, 2, 3];
        let second: &[u8] = &[4, 5, 6, 7];
        let mut reader = first.chain(second);

        let mut buf = [0u8; 5];
        assert_eq!(read_chunk(&mut reader, &mut buf).await.unwrap(), 5);
        assert_eq!(buf, [1, 2, 3, 4, 5]);

        let mut buf = [0u8; 5];
        assert_eq!(read_chunk(&mut reader, &mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], &[6, 7]);

        assert_eq!(read_chunk(&mut reader, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_chunk_empty_stream() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut buf = [0u8; 8];
        assert_eq!(read_chunk(&mut reader, &mut buf).await.unwrap(), 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = Config::new("https://api.example.com", "nope", "token");
        assert!(matches!(DropboxStorage::new(config), Err(StorageError::Config(_))));
    }
}
