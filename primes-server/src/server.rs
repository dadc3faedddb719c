//! Connection handling.
//!
//! ```text
//!   TcpListener::incoming()
//!          │
//!          ▼
//!   ┌──────────────┐  spawn   ┌────────────────────┐
//!   │ accept loop  │─────────►│ connection thread  │  one per client,
//!   └──────────────┘          │  read line         │  blocks only on I/O
//!                             │  write response    │
//!                             └───┬────────────▲───┘
//!                            Job  │            │ Response
//!                                 ▼            │
//!                      ┌───────────────────────┴──┐
//!                      │ worker pool (`workers`)  │
//!                      │  line → Request → reply  │
//!                      └────────────┬─────────────┘
//!                                   │ &dyn PrimeSource
//!                                   ▼
//!                       shared cache / one-shot sieve
//! ```
//!
//! A worker is busy only while it answers one request, so idle or slow
//! clients never hold one. At most `workers` requests are computed at once;
//! the rest wait in the job queue.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::protocol::{handle_line, Response};
use crate::source::PrimeSource;
use parking_lot::Mutex;
use scoped_threadpool::Pool;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, info, warn};

/// One request line waiting for a worker, plus where to send the answer.
struct Job {
    line: String,
    reply: Sender<Response>,
}

/// Serves prime queries from one [`PrimeSource`] across a pool of workers.
pub struct PrimeServer {
    source: Box<dyn PrimeSource>,
    workers: u32,
}

impl PrimeServer {
    /// Creates a server that computes at most `workers` requests at once
    /// (at least one).
    pub fn new(source: Box<dyn PrimeSource>, workers: usize) -> Self {
        let workers = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
        Self { source, workers }
    }

    /// Accept connections from `listener` until it fails permanently.
    pub fn serve(&self, listener: &TcpListener) {
        self.serve_incoming(listener.incoming());
    }

    /// Serve every connection yielded by `incoming`, returning once it is
    /// exhausted and all accepted connections have closed.
    pub fn serve_incoming<I>(&self, incoming: I)
    where
        I: Iterator<Item = io::Result<TcpStream>>,
    {
        let mut pool = Pool::new(self.workers);
        let source = self.source.as_ref();
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job>();
        let jobs = Mutex::new(jobs_rx);
        info!(
            "Serving with {} workers on the {} backend",
            self.workers,
            source.name()
        );

        pool.scoped(|scope| {
            for _ in 0..self.workers {
                let jobs = &jobs;
                scope.execute(move || run_worker(source, jobs));
            }

            // Workers exit once every sender, this one included, is gone.
            let jobs_tx = jobs_tx;
            thread::scope(|connections| {
                for stream in incoming {
                    match stream {
                        Ok(stream) => {
                            let jobs_tx = jobs_tx.clone();
                            connections.spawn(move || serve_stream(stream, jobs_tx));
                        }
                        Err(e) => warn!("Failed to accept connection: {e}"),
                    }
                }
            });
        });
    }
}

impl std::fmt::Debug for PrimeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimeServer")
            .field("backend", &self.source.name())
            .field("workers", &self.workers)
            .finish()
    }
}

/// Bind the listener described by `config`.
pub fn bind(config: &ServerConfig) -> ServerResult<TcpListener> {
    TcpListener::bind(config.bind_addr()).map_err(|e| ServerError::io("binding listener", e))
}

fn run_worker(source: &dyn PrimeSource, jobs: &Mutex<Receiver<Job>>) {
    loop {
        let job = jobs.lock().recv();
        let Ok(job) = job else {
            break;
        };
        // The client may have hung up while the job was queued.
        let _ = job.reply.send(handle_line(source, &job.line));
    }
}

fn serve_stream(stream: TcpStream, jobs: Sender<Job>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    debug!("Accepted connection from {peer}");

    let (reply_tx, reply_rx) = mpsc::channel();
    let submit = |line: &str| {
        jobs.send(Job {
            line: line.to_string(),
            reply: reply_tx.clone(),
        })
        .map_err(|_| ServerError::PoolClosed)?;
        reply_rx.recv().map_err(|_| ServerError::PoolClosed)
    };

    let result = stream
        .try_clone()
        .map_err(|e| ServerError::io("cloning stream", e))
        .and_then(|read_half| handle_connection(BufReader::new(read_half), stream, submit));

    match result {
        Ok(served) => debug!("Closed connection from {peer} after {served} requests"),
        Err(e) => warn!("Connection from {peer} ended with an error: {e}"),
    }
}

/// Answer newline-delimited requests from `reader` on `writer` until EOF.
///
/// Each non-blank line is passed to `answer`. Returns the number of
/// requests answered.
pub fn handle_connection<R, W, F>(reader: R, mut writer: W, mut answer: F) -> ServerResult<usize>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> ServerResult<Response>,
{
    let mut served = 0;
    for line in reader.lines() {
        let line = line.map_err(|e| ServerError::io("reading request", e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = answer(line)?;
        serde_json::to_writer(&mut writer, &response)?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| ServerError::io("writing response", e))?;
        served += 1;
    }
    Ok(served)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IncrementalSource;
    use prime_cache::ConcurrentPrimeCache;
    use std::io::Cursor;

    #[test]
    fn test_handle_connection_answers_each_line() {
        let source = IncrementalSource::new(ConcurrentPrimeCache::new());
        let input = "{\"method\":\"Sieve\",\"hi\":10}\n\n   \n{\"method\":\"Sieve\",\"hi\":1}\n";
        let mut output = Vec::new();

        let served = handle_connection(Cursor::new(input), &mut output, |line| {
            Ok(handle_line(&source, line))
        })
        .unwrap();

        assert_eq!(served, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"p\":[2,3,5,7]}\n{\"p\":[]}\n"
        );
    }

    #[test]
    fn test_malformed_line_keeps_connection_open() {
        let source = IncrementalSource::new(ConcurrentPrimeCache::new());
        let input = "garbage\n{\"method\":\"Sieve\",\"hi\":5}\n";
        let mut output = Vec::new();

        handle_connection(Cursor::new(input), &mut output, |line| {
            Ok(handle_line(&source, line))
        })
        .unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("{\"error\":\"malformed request"));
        assert_eq!(lines[1], "{\"p\":[2,3,5]}");
    }

    #[test]
    fn test_closed_pool_ends_the_connection() {
        let mut output = Vec::new();
        let result = handle_connection(
            Cursor::new("{\"method\":\"Stats\"}\n"),
            &mut output,
            |_| Err(ServerError::PoolClosed),
        );
        assert!(matches!(result, Err(ServerError::PoolClosed)));
        assert!(output.is_empty());
    }

    #[test]
    fn test_worker_answers_queued_jobs() {
        let source = IncrementalSource::new(ConcurrentPrimeCache::new());
        let (jobs_tx, jobs_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        for hi in [10, 3] {
            jobs_tx
                .send(Job {
                    line: format!("{{\"method\":\"Sieve\",\"hi\":{hi}}}"),
                    reply: reply_tx.clone(),
                })
                .unwrap();
        }
        drop(jobs_tx);

        run_worker(&source, &Mutex::new(jobs_rx));

        assert_eq!(reply_rx.recv().unwrap(), Response::Primes { p: vec![2, 3, 5, 7] });
        assert_eq!(reply_rx.recv().unwrap(), Response::Primes { p: vec![2, 3] });
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let server = PrimeServer::new(
            Box::new(IncrementalSource::new(ConcurrentPrimeCache::new())),
            0,
        );
        assert_eq!(server.workers, 1);
    }
}
