//! Listener lifecycle: bind, readiness polling and shutdown.

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum request headers accepted per request.
pub const MAX_HEADERS: usize = 32;

/// How long [`ServerHandle::wait_ready`] polls before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_secs(1);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Bind `service` to the first address `addr` resolves to that accepts a
/// listener, and serve it from a background coroutine.
///
/// # Errors
///
/// The last bind error if no resolved address could be bound, or
/// `InvalidInput` if `addr` resolves to nothing.
pub fn serve<S, A>(service: S, addr: A) -> io::Result<ServerHandle>
where
    S: HttpService + Clone + Send + Sync + 'static,
    A: ToSocketAddrs,
{
    let mut last_err = None;
    for candidate in addr.to_socket_addrs()? {
        match HttpServerWithHeaders::<_, MAX_HEADERS>(service.clone()).start(candidate) {
            Ok(handle) => {
                info!(addr = %candidate, max_headers = MAX_HEADERS, "HTTP server listening");
                return Ok(ServerHandle {
                    addr: candidate,
                    handle,
                });
            }
            Err(err) => {
                debug!(addr = %candidate, error = %err, "Bind failed, trying next address");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

/// A running listener coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the listener accepts a TCP connection, up to [`READY_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// See [`ServerHandle::wait_ready_within`].
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_within(READY_TIMEOUT)
    }

    /// Block until the listener accepts a TCP connection.
    ///
    /// # Errors
    ///
    /// `TimedOut` if no connection succeeded before `timeout` elapsed.
    pub fn wait_ready_within(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("server on {} not ready after {timeout:?}", self.addr),
                ));
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
    }

    /// Cancel the listener coroutine and wait for it to exit.
    pub fn stop(self) {
        // SAFETY: `may` marks cancellation unsafe because the target may hold
        // resources mid-operation; the listener owns nothing shared and is
        // joined immediately after.
        #[allow(unsafe_code)]
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            warn!(addr = %self.addr, "Server coroutine ended with a panic");
        }
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the listener coroutine finishes on its own.
    ///
    /// # Errors
    ///
    /// The panic payload if the coroutine panicked.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}
