use crate::request::BodyPrintLimit;
use crate::TeaServer;
use std::env;
use std::io;
use std::net::TcpListener;

/// A builder providing a fluent API to assemble a [`TeaServer`] step-by-step.
/// Use [`TeaServer::builder`] to get started.
#[derive(Debug)]
pub struct TeaServerBuilder {
    listener: Option<TcpListener>,
    body_print_limit: BodyPrintLimit,
}

impl TeaServerBuilder {
    pub(super) fn new() -> Self {
        let body_print_limit = match env::var("TEA_BODY_PRINT_LIMIT")
            .ok()
            .and_then(|x| x.parse::<usize>().ok())
        {
            Some(0) => BodyPrintLimit::Unlimited,
            Some(limit) => BodyPrintLimit::Limited(limit),
            None => BodyPrintLimit::default(),
        };
        Self {
            listener: None,
            body_print_limit,
        }
    }

    /// Each instance of [`TeaServer`] is, by default, running on a random
    /// port available on your local machine.
    /// With `TeaServerBuilder::listener` you can choose to start the `TeaServer`
    /// instance on a specific port you have already bound.
    ///
    /// ### Example:
    /// ```rust
    /// use tea::TeaServer;
    ///
    /// // Arrange
    /// let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    /// let expected_server_address = listener
    ///     .local_addr()
    ///     .expect("Failed to get server address.");
    ///
    /// // Act
    /// let server = TeaServer::builder().listener(listener).start().unwrap();
    ///
    /// // Assert
    /// assert_eq!(&expected_server_address, server.address());
    /// ```
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// The server logs the full request, at the `debug` level, whenever a call does not match
    /// any expectation. By default, the size of the printed body is limited.
    ///
    /// You can configure this limit with `TeaServerBuilder::body_print_limit` or with the
    /// `TEA_BODY_PRINT_LIMIT` environment variable (`0` meaning no limit).
    pub fn body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    /// Finalise the builder and launch the [`TeaServer`] instance!
    ///
    /// It fails if no listener was provided and no local port could be bound, or if the
    /// background runtime cannot be started.
    pub fn start(self) -> io::Result<TeaServer> {
        let listener = match self.listener {
            Some(listener) => listener,
            None => TcpListener::bind("127.0.0.1:0")?,
        };
        TeaServer::start_on(listener, self.body_print_limit)
    }
}
