//! Pagination client.
//!
//! Walks the server's word list one page at a time and tallies every word
//! received into a [`FrequencyTable`]:
//!
//! ```text
//!  offset = start
//!  loop:
//!      connect ─▶ send "offset,k\n" ─▶ read one line ─▶ close
//!      tally words before EOF
//!      EOF seen?  stop : offset += k
//! ```
//!
//! Rounds are strictly sequential, one connection each.  Any connect, send
//! or receive failure aborts the whole fetch; there is no retry and no
//! partial result.  A page with no words and no EOF cannot make progress and
//! also aborts the fetch.

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::ClientConfig;
use crate::frequency::FrequencyTable;
use crate::protocol::{PageRequest, PageResponse};
use crate::timer::deadline;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(io::Error),
    #[error("timed out waiting for server")]
    Timeout,
    #[error("server closed the connection mid-response")]
    Truncated,
    #[error("server sent an empty page without EOF at offset {offset}")]
    EmptyPage { offset: i64 },
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::TimedOut {
            ClientError::Timeout
        } else {
            ClientError::Io(err)
        }
    }
}

/// Result of one complete pass over the list.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub table: FrequencyTable,
    /// Request/response rounds issued, including the one that returned EOF.
    pub rounds: u32,
    pub elapsed: Duration,
}

/// Client for one page server.
#[derive(Debug, Clone)]
pub struct PaginationClient {
    server_address: String,
    port: u16,
    io_timeout: Option<Duration>,
}

impl PaginationClient {
    pub fn new(server_address: impl Into<String>, port: u16) -> Self {
        Self {
            server_address: server_address.into(),
            port,
            io_timeout: None,
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> Self {
        Self::new(cfg.server_address.clone(), cfg.port).with_io_timeout(cfg.io_timeout)
    }

    pub fn with_io_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// One round: connect, send `req`, read the response line, close.
    pub async fn fetch_page(&self, req: PageRequest) -> Result<PageResponse, ClientError> {
        let addr = format!("{}:{}", self.server_address, self.port);
        let stream = deadline(
            self.io_timeout,
            TcpStream::connect((self.server_address.as_str(), self.port)),
        )
        .await
        .map_err(|source| ClientError::Connect { addr, source })?;

        let mut stream = BufReader::new(stream);
        deadline(self.io_timeout, stream.write_all(req.encode().as_bytes())).await?;

        let mut line = Vec::new();
        deadline(self.io_timeout, stream.read_until(b'\n', &mut line)).await?;
        if !line.ends_with(b"\n") {
            return Err(ClientError::Truncated);
        }
        Ok(PageResponse::parse(&String::from_utf8_lossy(&line)))
    }

    /// Fetch every page from `start_offset` to the end of the list and count
    /// the words.
    pub async fn fetch_all(
        &self,
        start_offset: i64,
        page_size: i64,
    ) -> Result<FrequencyTable, ClientError> {
        Ok(self.fetch_pass(start_offset, page_size).await?.table)
    }

    /// [`fetch_all`](Self::fetch_all), also reporting round count and time.
    ///
    /// A non-positive `page_size` means there is nothing to fetch: the pass
    /// returns an empty table without contacting the server.
    pub async fn fetch_pass(
        &self,
        start_offset: i64,
        page_size: i64,
    ) -> Result<PassSummary, ClientError> {
        let started = Instant::now();
        let mut table = FrequencyTable::new();
        let mut rounds = 0;

        if page_size > 0 {
            let mut offset = start_offset;
            loop {
                log::debug!("[client] → {offset},{page_size}");
                let page = self.fetch_page(PageRequest::new(offset, page_size)).await?;
                rounds += 1;
                log::debug!(
                    "[client] ← {} word(s){}",
                    page.words.len(),
                    if page.end_of_data { " +EOF" } else { "" }
                );
                table.extend(page.words.iter().map(String::as_str));
                if page.end_of_data {
                    break;
                }
                if page.words.is_empty() {
                    return Err(ClientError::EmptyPage { offset });
                }
                offset = offset.saturating_add(page_size);
            }
        }

        Ok(PassSummary {
            table,
            rounds,
            elapsed: started.elapsed(),
        })
    }

    /// Run `repetitions` full passes (at least one) and return the last.
    pub async fn fetch_repeated(
        &self,
        start_offset: i64,
        page_size: i64,
        repetitions: u32,
    ) -> Result<PassSummary, ClientError> {
        let repetitions = repetitions.max(1);
        let mut last = self.fetch_pass(start_offset, page_size).await?;
        log_pass(1, repetitions, &last);
        let mut total = last.elapsed;

        for pass in 2..=repetitions {
            last = self.fetch_pass(start_offset, page_size).await?;
            log_pass(pass, repetitions, &last);
            total += last.elapsed;
        }

        log::info!("[client] mean pass time {:.3?}", total / repetitions);
        Ok(last)
    }
}

fn log_pass(pass: u32, repetitions: u32, summary: &PassSummary) {
    log::info!(
        "[client] pass {pass}/{repetitions}: {} word(s), {} distinct, {} round(s) in {:.3?}",
        summary.table.total(),
        summary.table.len(),
        summary.rounds,
        summary.elapsed
    );
}
