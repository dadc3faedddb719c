//! End-to-end tests over real TCP connections.
//!
//! Each test binds an ephemeral port, serves a fixed number of connections
//! on a background thread, and drives them with plain line-oriented clients.

use prime_cache::sieve::sieve;
use primes_server::config::{Backend, ServerConfig};
use primes_server::protocol::Response;
use primes_server::{build_source, PrimeServer};
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect(addr: SocketAddr) -> Self {
        let writer = TcpStream::connect(addr).unwrap();
        writer
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        let reader = BufReader::new(writer.try_clone().unwrap());
        Self { reader, writer }
    }

    fn call(&mut self, request: &str) -> Response {
        writeln!(self.writer, "{request}").unwrap();
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        serde_json::from_str(&line).unwrap()
    }

    fn sieve(&mut self, hi: i64) -> Vec<u64> {
        match self.call(&format!("{{\"method\":\"Sieve\",\"hi\":{hi}}}")) {
            Response::Primes { p } => p,
            other => panic!("unexpected response {other:?}"),
        }
    }
}

/// Serve exactly `connections` connections, then return.
fn spawn_server(config: ServerConfig, connections: usize) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = PrimeServer::new(build_source(&config).unwrap(), config.workers);
    let handle = thread::spawn(move || {
        server.serve_incoming(listener.incoming().take(connections));
    });
    (addr, handle)
}

#[test]
fn test_sieve_over_tcp() {
    let (addr, handle) = spawn_server(ServerConfig::default(), 1);
    let mut client = Client::connect(addr);

    assert_eq!(client.sieve(30), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    assert_eq!(client.sieve(150), sieve(150));
    assert_eq!(client.sieve(10), vec![2, 3, 5, 7]);
    assert!(client.sieve(1).is_empty());
    assert!(client.sieve(-20).is_empty());

    drop(client);
    handle.join().unwrap();
}

#[test]
fn test_stats_and_method_listing() {
    let (addr, handle) = spawn_server(ServerConfig::default(), 1);
    let mut client = Client::connect(addr);

    client.sieve(100);
    client.sieve(50);
    client.sieve(200);

    match client.call(r#"{"method":"Stats"}"#) {
        Response::Metrics { metrics } => {
            assert_eq!(metrics.get("requests"), Some(&3.0));
            assert_eq!(metrics.get("rebuilds"), Some(&1.0));
            assert_eq!(metrics.get("hits"), Some(&1.0));
            assert_eq!(metrics.get("extensions"), Some(&1.0));
            assert_eq!(metrics.get("frontier"), Some(&199.0));
        }
        other => panic!("unexpected response {other:?}"),
    }

    assert_eq!(
        client.call(r#"{"method":"ListMethods"}"#),
        Response::Methods {
            methods: vec![
                "ListMethods".to_string(),
                "Sieve".to_string(),
                "Stats".to_string()
            ]
        }
    );

    drop(client);
    handle.join().unwrap();
}

#[test]
fn test_errors_do_not_close_the_connection() {
    let config = ServerConfig {
        max_bound: 1_000,
        ..Default::default()
    };
    let (addr, handle) = spawn_server(config, 1);
    let mut client = Client::connect(addr);

    assert!(client.call("{not json").is_error());
    assert!(client.call(r#"{"method":"Factor","n":12}"#).is_error());
    assert_eq!(
        client.call(r#"{"method":"Sieve","hi":1001}"#),
        Response::Error {
            error: "bound 1001 exceeds the configured limit of 1000".to_string()
        }
    );
    assert_eq!(client.sieve(1_000), sieve(1_000));

    drop(client);
    handle.join().unwrap();
}

#[test]
fn test_concurrent_clients_share_the_cache() {
    let clients = 6;
    let config = ServerConfig {
        workers: clients,
        prefill: Some(500),
        ..Default::default()
    };
    let (addr, handle) = spawn_server(config, clients);

    let workers: Vec<_> = (0..clients)
        .map(|c| {
            thread::spawn(move || {
                let mut client = Client::connect(addr);
                for step in 0..20 {
                    let hi = ((step * clients + c) * 173) as i64;
                    assert_eq!(client.sieve(hi), sieve(hi), "client {c}, hi {hi}");
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    handle.join().unwrap();
}

#[test]
fn test_idle_clients_do_not_hold_workers() {
    let config = ServerConfig {
        workers: 1,
        ..Default::default()
    };
    let (addr, handle) = spawn_server(config, 4);

    // Connected but silent: none of these may tie up the only worker.
    let mut idle: Vec<Client> = (0..3).map(|_| Client::connect(addr)).collect();

    let mut active = Client::connect(addr);
    assert_eq!(active.sieve(10), vec![2, 3, 5, 7]);
    assert_eq!(active.sieve(30), sieve(30));

    // The idle connections are still usable afterwards.
    for client in &mut idle {
        assert_eq!(client.sieve(5), vec![2, 3, 5]);
    }

    drop(idle);
    drop(active);
    handle.join().unwrap();
}

#[test]
fn test_more_clients_than_workers() {
    let clients = 8;
    let config = ServerConfig {
        workers: 2,
        ..Default::default()
    };
    let (addr, handle) = spawn_server(config, clients);

    let connected: Vec<Client> = (0..clients).map(|_| Client::connect(addr)).collect();
    let workers: Vec<_> = connected
        .into_iter()
        .enumerate()
        .map(|(c, mut client)| {
            thread::spawn(move || {
                for step in 0..10 {
                    let hi = ((step * clients + c) * 211) as i64;
                    assert_eq!(client.sieve(hi), sieve(hi), "client {c}, hi {hi}");
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    handle.join().unwrap();
}

#[test]
fn test_one_shot_backend_matches_incremental() {
    let one_shot = ServerConfig {
        backend: Backend::OneShot,
        ..Default::default()
    };
    let (one_shot_addr, one_shot_handle) = spawn_server(one_shot, 1);
    let (incremental_addr, incremental_handle) = spawn_server(ServerConfig::default(), 1);

    let mut a = Client::connect(one_shot_addr);
    let mut b = Client::connect(incremental_addr);
    for hi in [97i64, 5, 1_000, 999, 2, 0, 4_096] {
        assert_eq!(a.sieve(hi), b.sieve(hi), "hi = {hi}");
    }

    match a.call(r#"{"method":"Stats"}"#) {
        Response::Metrics { metrics } => assert_eq!(metrics.get("requests"), Some(&7.0)),
        other => panic!("unexpected response {other:?}"),
    }

    drop(a);
    drop(b);
    one_shot_handle.join().unwrap();
    incremental_handle.join().unwrap();
}
