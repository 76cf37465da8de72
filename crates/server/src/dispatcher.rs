use std::io;
use std::net::{SocketAddr, TcpStream as StdTcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use docindex_store::{IndexStore, Registry};
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};

use crate::worker;

const LISTENER: Token = Token(0);
const ACCEPT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs the accept loop on its own thread, handing each connection off to a
/// dedicated worker thread. `shutdown()` flips `running` false; the loop
/// notices within one poll timeout (<=1s) and returns, at which point the
/// caller is responsible for joining any worker threads it spawned.
pub struct Dispatcher {
    running: Arc<AtomicBool>,
    next_connection_id: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            next_connection_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Signals the accept loop to stop. Safe to call from any thread,
    /// including from the command loop handling a `quit` command.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Binds `port` and runs the accept loop until `shutdown()` is called.
    /// Spawns one detached worker thread per accepted connection; worker
    /// join handles are not tracked here because a worker blocked in `recv`
    /// on a live connection cannot be interrupted short of closing its
    /// socket (see the protocol notes' known limitation).
    pub fn run(
        &self,
        port: u16,
        store: Arc<IndexStore>,
        registry: Arc<Registry>,
        artificial_delay: Duration,
    ) -> io::Result<()> {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let mut listener = TcpListener::bind(addr)?;

        let mut poll = Poll::new()?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;

        info!("server listening on port {}", port);

        let mut events = Events::with_capacity(16);
        while self.running.load(Ordering::SeqCst) {
            match poll.poll(&mut events, Some(ACCEPT_POLL_TIMEOUT)) {
                Ok(()) => {},
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            for event in events.iter() {
                if event.token() != LISTENER {
                    continue;
                }

                loop {
                    match listener.accept() {
                        Ok((stream, peer_addr)) => {
                            self.spawn_worker(
                                stream,
                                peer_addr,
                                Arc::clone(&store),
                                Arc::clone(&registry),
                                artificial_delay,
                            );
                        },
                        Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                        Err(e) => {
                            warn!("error accepting connection: {}", e);
                            break;
                        },
                    }
                }
            }
        }

        Ok(())
    }

    fn spawn_worker(
        &self,
        stream: mio::net::TcpStream,
        peer_addr: SocketAddr,
        store: Arc<IndexStore>,
        registry: Arc<Registry>,
        artificial_delay: Duration,
    ) {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::SeqCst);

        let std_stream = match to_blocking_std_stream(stream) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to hand off accepted connection: {}", e);
                return;
            },
        };

        info!("new client connected from {}", peer_addr);
        thread::spawn(move || {
            worker::run(
                std_stream,
                peer_addr,
                connection_id,
                store,
                registry,
                artificial_delay,
            );
        });
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an accepted `mio::net::TcpStream` (non-blocking, since it's
/// derived from a non-blocking listener) into a plain blocking
/// `std::net::TcpStream`, so the per-connection worker can use the
/// simple blocking read/write loops from the wire codec.
#[cfg(unix)]
fn to_blocking_std_stream(stream: mio::net::TcpStream) -> io::Result<StdTcpStream> {
    use std::os::unix::io::{FromRawFd, IntoRawFd};

    let std_stream = unsafe { StdTcpStream::from_raw_fd(stream.into_raw_fd()) };
    std_stream.set_nonblocking(false)?;
    Ok(std_stream)
}

#[cfg(windows)]
fn to_blocking_std_stream(stream: mio::net::TcpStream) -> io::Result<StdTcpStream> {
    use std::os::windows::io::{FromRawSocket, IntoRawSocket};

    let std_stream = unsafe { StdTcpStream::from_raw_socket(stream.into_raw_socket()) };
    std_stream.set_nonblocking(false)?;
    Ok(std_stream)
}
