pub mod dispatcher;
pub mod io;
pub mod protocol;

use std::sync::Arc;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};

use crate::{
    cli::Args,
    core::{connection::SqliteExecutor, executor::Executor},
    error::{AppError, AppResult},
};

use dispatcher::{Dispatcher, InboundMessage};
use io::NdjsonReader;

pub fn run(args: Args) -> AppResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    rt.block_on(async move {
        let executor: Option<Arc<dyn Executor>> = match args.credentials() {
            Some(creds) => {
                tracing::info!(url = creds.url(), name = ?args.name, "opening database");
                Some(Arc::new(SqliteExecutor::connect(&creds, args.busy_timeout_ms)?))
            }
            None => {
                tracing::warn!("no url/auth token configured; bridge requests will be ignored");
                None
            }
        };

        tokio::select! {
            res = serve(tokio::io::stdin(), tokio::io::stdout(), executor) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                Ok(())
            }
        }
    })
}

/// Pumps requests from `reader` through a dispatcher and writes responses to
/// `writer`. At EOF, outstanding requests are answered before returning.
pub async fn serve<R, W>(reader: R, writer: W, executor: Option<Arc<dyn Executor>>) -> AppResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (reply, replies) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(io::write_responses(writer, replies));

    let mut dispatcher = Dispatcher::new();
    if let Some(executor) = executor {
        dispatcher.activate(executor);
    }

    let mut reader = NdjsonReader::new(reader);
    let mut accepted = 0usize;
    while let Some(data) = reader.next_message().await? {
        if dispatcher.dispatch(InboundMessage::new(data, reply.clone())) {
            accepted += 1;
        }
    }

    tracing::debug!(accepted, in_flight = dispatcher.in_flight(), "input closed; draining");
    dispatcher.drain().await;
    dispatcher.teardown();
    drop(reply);

    writer_task
        .await
        .map_err(|e| AppError::Internal(format!("writer task failed: {e}")))?
}
