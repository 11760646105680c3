//! Page server.
//!
//! Accepts TCP connections and answers exactly one page request on each:
//!
//! ```text
//!  accept ─▶ read until '\n' ─▶ parse ─▶ slice word list ─▶ write ─▶ close
//! ```
//!
//! Every connection runs in its own tokio task.  The word list is shared as
//! `Arc<WordList>` and only ever read, so tasks need no synchronisation.
//! Failures on one connection are logged and never reach the accept loop.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::protocol::{PageRequest, PageResponse, ProtocolError, MAX_REQUEST_LINE};
use crate::store::WordList;
use crate::timer::deadline;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("connection I/O error: {0}")]
    Io(io::Error),
    #[error("connection timed out")]
    Timeout,
}

impl From<io::Error> for ServerError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            ServerError::Timeout
        } else {
            ServerError::Io(err)
        }
    }
}

/// Build the response to `req` from `words`.
///
/// Out-of-range or non-positive requests get a bare `EOF`.  Otherwise up to
/// `count` words from `offset` are returned, flagged end-of-data when the
/// page comes up short or its last word is the last word of the list.
pub fn respond(words: &WordList, req: &PageRequest) -> PageResponse {
    let len = words.len();
    let start = match usize::try_from(req.offset) {
        Ok(start) if req.count > 0 && start < len => start,
        _ => return PageResponse::end(),
    };
    let count = usize::try_from(req.count).unwrap_or(usize::MAX);
    let end = start.saturating_add(count).min(len);
    let sent = end - start;

    PageResponse {
        words: words.as_slice()[start..end].to_vec(),
        end_of_data: sent < count || end == len,
    }
}

/// Serve a single request on `stream`, then close it.
///
/// A malformed request line is answered with `EOF`.  A peer that hangs up
/// before sending a newline gets no response.
pub async fn handle_connection<S>(
    stream: S,
    words: &WordList,
    io_timeout: Option<Duration>,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader).take(MAX_REQUEST_LINE as u64 + 1);

    let mut line = Vec::new();
    deadline(io_timeout, reader.read_until(b'\n', &mut line)).await?;

    let parsed = if line.ends_with(b"\n") {
        PageRequest::parse(&line)
    } else if line.len() > MAX_REQUEST_LINE {
        Err(ProtocolError::LineTooLong)
    } else {
        log::debug!("[server] peer closed before completing a request");
        return Ok(());
    };

    let response = match parsed {
        Ok(req) => {
            let resp = respond(words, &req);
            log::debug!(
                "[server] {},{} → {} word(s){}",
                req.offset,
                req.count,
                resp.words.len(),
                if resp.end_of_data { " +EOF" } else { "" }
            );
            resp
        }
        Err(e) => {
            log::warn!("[server] malformed request: {e}; answering EOF");
            PageResponse::end()
        }
    };

    deadline(io_timeout, writer.write_all(response.encode().as_bytes())).await?;
    deadline(io_timeout, writer.shutdown()).await?;
    Ok(())
}

/// A bound page server.
pub struct PageServer {
    listener: TcpListener,
    words: Arc<WordList>,
    io_timeout: Option<Duration>,
}

impl PageServer {
    /// Bind a listening socket on `bind_address:port`.
    ///
    /// Port 0 lets the OS pick; see [`PageServer::local_addr`].
    pub async fn bind(
        bind_address: &str,
        port: u16,
        words: impl Into<Arc<WordList>>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((bind_address, port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{bind_address}:{port}"),
                source,
            })?;
        Ok(Self {
            listener,
            words: words.into(),
            io_timeout: None,
        })
    }

    /// Bind using a validated [`ServerConfig`].
    pub async fn from_config(
        cfg: &ServerConfig,
        words: impl Into<Arc<WordList>>,
    ) -> Result<Self, ServerError> {
        Ok(Self::bind(&cfg.bind_address, cfg.port, words)
            .await?
            .with_io_timeout(cfg.io_timeout))
    }

    pub fn with_io_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.serve_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Connections already handed to a task are left to finish on their own.
    pub async fn serve_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        if let Ok(addr) = self.listener.local_addr() {
            log::info!("[server] listening on {addr} ({} words)", self.words.len());
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("[server] shutting down");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let words = Arc::clone(&self.words);
                        let io_timeout = self.io_timeout;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, &words, io_timeout).await {
                                log::warn!("[server] {peer}: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        log::warn!("[server] accept failed: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }
    }
}

/// Bind on `bind_address:port` and serve `words` until the process ends.
pub async fn serve(bind_address: &str, port: u16, words: WordList) -> Result<(), ServerError> {
    PageServer::bind(bind_address, port, words).await?.run().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(words: &[&str]) -> WordList {
        words.iter().copied().collect()
    }

    fn wire(words: &WordList, offset: i64, count: i64) -> String {
        respond(words, &PageRequest::new(offset, count)).encode()
    }

    #[test]
    fn middle_page_has_no_eof() {
        let w = list(&["a", "b", "c", "d", "e"]);
        assert_eq!(wire(&w, 0, 2), "a,b\n");
        assert_eq!(wire(&w, 2, 2), "c,d\n");
    }

    #[test]
    fn short_last_page_has_eof() {
        let w = list(&["a", "b", "c", "d", "e"]);
        assert_eq!(wire(&w, 4, 2), "e,EOF\n");
        assert_eq!(wire(&list(&["x", "y"]), 0, 5), "x,y,EOF\n");
    }

    #[test]
    fn full_page_reaching_end_has_eof() {
        let w = list(&["a", "b", "c", "d"]);
        assert_eq!(wire(&w, 2, 2), "c,d,EOF\n");
        assert_eq!(wire(&w, 0, 4), "a,b,c,d,EOF\n");
    }

    #[test]
    fn out_of_range_offset_is_bare_eof() {
        let w = list(&["a", "b", "c"]);
        assert_eq!(wire(&w, 3, 1), "EOF\n");
        assert_eq!(wire(&w, 10, 2), "EOF\n");
        assert_eq!(wire(&WordList::default(), 0, 1), "EOF\n");
    }

    #[test]
    fn invalid_count_or_offset_is_bare_eof() {
        let w = list(&["a", "b", "c"]);
        assert_eq!(wire(&w, 0, 0), "EOF\n");
        assert_eq!(wire(&w, 1, -4), "EOF\n");
        assert_eq!(wire(&w, -1, 2), "EOF\n");
    }

    #[test]
    fn huge_count_does_not_overflow() {
        let w = list(&["a", "b"]);
        assert_eq!(wire(&w, 1, i64::MAX), "b,EOF\n");
    }

    async fn exchange(words: &WordList, request: &[u8]) -> String {
        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(request).await.unwrap();
        handle_connection(server, words, None).await.unwrap();
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn connection_round_trip() {
        let w = list(&["a", "b", "c"]);
        assert_eq!(exchange(&w, b"1,1\n").await, "b\n");
        assert_eq!(exchange(&w, b"1,5\n").await, "b,c,EOF\n");
    }

    #[tokio::test]
    async fn malformed_request_gets_eof() {
        let w = list(&["a", "b", "c"]);
        assert_eq!(exchange(&w, b"garbage\n").await, "EOF\n");
        assert_eq!(exchange(&w, b"1,x\n").await, "EOF\n");
    }

    #[tokio::test]
    async fn oversized_request_gets_eof() {
        let w = list(&["a"]);
        let long = vec![b'7'; MAX_REQUEST_LINE + 10];
        assert_eq!(exchange(&w, &long).await, "EOF\n");
    }

    #[tokio::test]
    async fn request_split_across_writes() {
        let w = list(&["a", "b", "c"]);
        let (mut client, server) = tokio::io::duplex(64);
        let words = w.clone();
        let task = tokio::spawn(async move { handle_connection(server, &words, None).await });

        client.write_all(b"0").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b",").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"2\n").await.unwrap();

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(out, "a,b\n");
    }

    #[tokio::test]
    async fn hangup_without_newline_gets_no_response() {
        let w = list(&["a"]);
        let (mut client, server) = tokio::io::duplex(64);
        client.write_all(b"0,1").await.unwrap();
        client.shutdown().await.unwrap();
        handle_connection(server, &w, None).await.unwrap();
        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn stalled_peer_times_out() {
        let w = list(&["a"]);
        let (_client, server) = tokio::io::duplex(64);
        let err = handle_connection(server, &w, Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Timeout));
    }
}
