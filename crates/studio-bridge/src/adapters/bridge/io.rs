use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Lines},
    sync::mpsc,
};

use crate::error::AppResult;

use super::protocol::ClientResponse;

/// Newline-delimited JSON messages from the embedded side.
pub struct NdjsonReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> NdjsonReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
        }
    }

    /// Next JSON message, or `None` at EOF. Blank and unparsable lines are
    /// skipped; the channel may carry traffic that is not ours.
    pub async fn next_message(&mut self) -> AppResult<Option<serde_json::Value>> {
        while let Some(line) = self.lines.next_line().await? {
            let raw = line.trim();
            if raw.is_empty() {
                continue;
            }
            match serde_json::from_str(raw) {
                Ok(v) => return Ok(Some(v)),
                Err(e) => tracing::trace!(error = %e, "skipping non-json line"),
            }
        }
        Ok(None)
    }
}

/// Writes responses as JSON lines until every sender is gone.
pub async fn write_responses<W: AsyncWrite + Unpin>(
    writer: W,
    mut rx: mpsc::UnboundedReceiver<ClientResponse>,
) -> AppResult<()> {
    let mut out = BufWriter::new(writer);
    while let Some(resp) = rx.recv().await {
        let mut buf = serde_json::to_vec(&resp)?;
        buf.push(b'\n');
        out.write_all(&buf).await?;
        out.flush().await?;
    }
    out.shutdown().await?;
    Ok(())
}
