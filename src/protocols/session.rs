//! Session - one debugger client over newline-delimited JSON.
//!
//! Inbound lines are dispatched one at a time on the calling task. The
//! outbound channel feeds a single-writer queue drained by one writer task,
//! so responses and notifications from any thread reach the transport whole
//! and in submission order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::types::ApiError;
use crate::config::SessionConfig;
use crate::protocols::dispatcher::Dispatcher;
use crate::protocols::domain_agent::Notifier;
use crate::protocols::outbound::OutboundChannel;

pub struct Session {
    session_id: String,
    dispatcher: Dispatcher,
    outbound: OutboundChannel,
    outbound_rx: mpsc::UnboundedReceiver<String>,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let (tx, outbound_rx) = mpsc::unbounded_channel::<String>();

        let outbound = OutboundChannel::new(move |message| {
            let line = serde_json::to_string(&message).map_err(|e| ApiError::ProtocolError {
                message: format!("Failed to serialize outbound message: {e}"),
            })?;
            tx.send(line).map_err(|_| ApiError::TransportClosed)
        });

        let dispatcher = Dispatcher::with_default_domains(outbound.clone(), config);
        log::info!(
            "Debugger session created: session={session_id}, domains={:?}",
            dispatcher.domains()
        );

        Self {
            session_id,
            dispatcher,
            outbound,
            outbound_rx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Handle for engine threads raising asynchronous events.
    pub fn notifier(&self) -> Notifier {
        self.dispatcher.notifier()
    }

    /// Serve requests from `reader` until EOF, writing replies to `writer`.
    ///
    /// Returns the writer once every queued message has been flushed. A
    /// failed write ends the session early with that error.
    pub async fn run<R, W>(self, reader: R, writer: W) -> Result<W, ApiError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let Session {
            session_id,
            mut dispatcher,
            outbound,
            outbound_rx,
        } = self;

        let mut writer_task = tokio::spawn(write_outbound(outbound_rx, writer));
        let mut writer_stopped = None;

        let mut lines = reader.lines();
        let read_result = loop {
            tokio::select! {
                // The writer only returns early when the transport failed.
                joined = &mut writer_task => {
                    log::error!("Outbound writer stopped, ending session: session={session_id}");
                    writer_stopped = Some(joined);
                    break Ok(());
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        log::trace!("[session {session_id}] <- {line}");
                        dispatcher.handle_message(line);
                    }
                    Ok(None) => {
                        log::info!("Debugger client disconnected: session={session_id}");
                        break Ok(());
                    }
                    Err(e) => {
                        log::error!("Failed to read from client: {e} (session={session_id})");
                        break Err(ApiError::IoError {
                            message: format!("Failed to read from client: {e}"),
                        });
                    }
                },
            }
        };

        // Dropping the sink closes the queue; the writer drains what is left.
        drop(outbound.detach());

        let joined = match writer_stopped {
            Some(joined) => joined,
            None => writer_task.await,
        };
        let writer = joined.map_err(|e| ApiError::IoError {
            message: format!("Outbound writer task failed: {e}"),
        })??;

        let dropped = outbound.delivery_failures();
        if dropped > 0 {
            log::warn!("Session ended with undelivered messages: session={session_id}, dropped={dropped}");
        }

        read_result.map(|()| writer)
    }
}

async fn write_outbound<W>(mut rx: mpsc::UnboundedReceiver<String>, mut writer: W) -> Result<W, ApiError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ApiError::IoError {
                message: format!("Failed to write to client: {e}"),
            })?;
        writer.write_all(b"\n").await.map_err(|e| ApiError::IoError {
            message: format!("Failed to write newline: {e}"),
        })?;
        writer.flush().await.map_err(|e| ApiError::IoError {
            message: format!("Failed to flush client stream: {e}"),
        })?;
    }
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Notification;
    use serde_json::{json, Value};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::BufReader;

    /// Writer whose every write fails, like stdout after the client went away.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn parse_lines(bytes: &[u8]) -> Vec<Value> {
        std::str::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let input = concat!(
            r#"{"id":1,"method":"Runtime.disable"}"#,
            "\n",
            r#"{"id":2,"method":"Runtime.enable","params":{}}"#,
            "\n\n",
            r#"{"id":3,"method":"Runtime.enable"}"#,
            "\n",
            r#"{"id":4,"method":"Runtime.disable"}"#,
            "\n",
        );

        let session = Session::new(&SessionConfig::default());
        let output = session
            .run(BufReader::new(input.as_bytes()), Vec::new())
            .await
            .unwrap();

        let sent = parse_lines(&output);
        assert_eq!(sent.len(), 5);
        assert_eq!(sent[0]["id"], json!(1));
        assert_eq!(sent[0]["error"]["message"], json!("Runtime domain not enabled"));
        assert_eq!(sent[1], json!({ "id": 2, "result": {} }));
        assert_eq!(sent[2]["method"], json!("Runtime.executionContextCreated"));
        assert_eq!(sent[3]["error"]["message"], json!("Runtime domain already enabled"));
        assert_eq!(sent[4], json!({ "id": 4, "result": {} }));
    }

    #[tokio::test]
    async fn test_notifier_after_session_end_is_noop() {
        let session = Session::new(&SessionConfig::default());
        let notifier = session.notifier();
        assert!(!session.session_id().is_empty());

        let output = session
            .run(BufReader::new(&b""[..]), Vec::new())
            .await
            .unwrap();
        assert!(output.is_empty());

        notifier.send_notification_to_client(Notification {
            method: "Debugger.paused".to_string(),
            params: Value::Null,
        });
    }

    #[tokio::test]
    async fn test_notification_queued_before_run_is_delivered() {
        let session = Session::new(&SessionConfig::default());
        session.notifier().send_notification_to_client(Notification {
            method: "Runtime.consoleAPICalled".to_string(),
            params: json!({ "type": "log" }),
        });

        let output = session
            .run(BufReader::new(&b""[..]), Vec::new())
            .await
            .unwrap();
        let sent = parse_lines(&output);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["method"], json!("Runtime.consoleAPICalled"));
    }

    #[tokio::test]
    async fn test_write_failure_ends_session_before_eof() {
        let (mut client, server) = tokio::io::duplex(1024);
        client
            .write_all(b"{\"id\":1,\"method\":\"Runtime.enable\"}\n")
            .await
            .unwrap();

        // `client` stays open, so the reader never sees EOF.
        let session = Session::new(&SessionConfig::default());
        let result = session.run(BufReader::new(server), BrokenPipe).await;
        assert!(matches!(result, Err(ApiError::IoError { .. })));

        drop(client);
    }
}
