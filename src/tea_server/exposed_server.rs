use crate::request::BodyPrintLimit;
use crate::tea_server::builder::TeaServerBuilder;
use crate::tea_server::hyper::run_server;
use crate::tea_server::routes::ServerState;
use crate::{Expectation, Store};
use log::info;
use std::io;
use std::net::{SocketAddr, TcpListener};

/// An HTTP server running in the background to stand in for one of your dependencies,
/// replaying the responses of the [`Expectation`]s registered on it.
///
/// Expectations can be registered in two ways:
/// - over HTTP, with a `POST` to [`REGISTER_PATH`](crate::REGISTER_PATH) - this is what
///   the `tea` binary is for;
/// - in-process, with [`TeaServer::register`].
///
/// Every other request is matched against the registered expectations, in registration
/// order. If none matches, the server replies with a `404`.
///
/// The server runs on a dedicated thread with its own multi-threaded `tokio` runtime: it can be
/// driven from any async executor, or none at all.
/// When a `TeaServer` instance goes out of scope the server shuts down and frees its port.
pub struct TeaServer {
    store: Store,
    server_address: SocketAddr,
    // When `_shutdown_trigger` gets dropped the listening server terminates gracefully.
    _shutdown_trigger: tokio::sync::oneshot::Sender<()>,
}

impl TeaServer {
    /// You can use `TeaServer::builder` if you need to specify custom configuration - e.g.
    /// run on a specific port.
    ///
    /// If this is not your case, use [`TeaServer::start`].
    pub fn builder() -> TeaServerBuilder {
        TeaServerBuilder::new()
    }

    /// Start a new instance of a `TeaServer` listening on a random local port.
    ///
    /// Each instance of `TeaServer` is fully isolated, with its own [`Store`].
    ///
    /// ### Example:
    /// ```rust
    /// use tea::TeaServer;
    ///
    /// let server_one = TeaServer::start().unwrap();
    /// let server_two = TeaServer::start().unwrap();
    ///
    /// assert!(server_one.address() != server_two.address());
    /// ```
    pub fn start() -> io::Result<Self> {
        Self::builder().start()
    }

    pub(super) fn start_on(
        listener: TcpListener,
        body_print_limit: BodyPrintLimit,
    ) -> io::Result<Self> {
        let (shutdown_trigger, shutdown_receiver) = tokio::sync::oneshot::channel();
        let server_address = listener.local_addr()?;
        // Required by `tokio::net::TcpListener::from_std`.
        listener.set_nonblocking(true)?;

        let store = Store::new();
        let server_state = ServerState {
            store: store.clone(),
            body_print_limit,
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tea-server-worker")
            .build()?;
        std::thread::Builder::new()
            .name("tea-server".into())
            .spawn(move || {
                runtime.block_on(run_server(listener, server_state, shutdown_receiver))
            })?;
        info!("Server is running on {}", server_address);

        Ok(Self {
            store,
            server_address,
            _shutdown_trigger: shutdown_trigger,
        })
    }

    /// Register an [`Expectation`] on this instance of `TeaServer`.
    ///
    /// It is effective for every request received after `register` returns.
    ///
    /// ### Example:
    /// ```rust
    /// use tea::{Expectation, TeaServer, WantedResponse};
    ///
    /// let server = TeaServer::start().unwrap();
    /// server.register(
    ///     Expectation::given("GET", "/hello").respond_with(WantedResponse::new(200)),
    /// );
    ///
    /// assert_eq!(server.store().len(), 1);
    /// ```
    pub fn register(&self, expectation: Expectation) {
        self.store.register(expectation);
    }

    /// The [`Store`] backing this server, shared with the request handlers.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Return the base uri of this running instance of `TeaServer`, e.g. `http://127.0.0.1:4372`.
    ///
    /// Use this method to compose uris when interacting with this instance of `TeaServer` via
    /// an HTTP client.
    pub fn uri(&self) -> String {
        format!("http://{}", self.server_address)
    }

    /// Return the socket address of this running instance of `TeaServer`, e.g. `127.0.0.1:4372`.
    pub fn address(&self) -> &SocketAddr {
        &self.server_address
    }
}

impl std::fmt::Debug for TeaServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeaServer")
            .field("address", &self.server_address)
            .field("store", &self.store)
            .finish()
    }
}
