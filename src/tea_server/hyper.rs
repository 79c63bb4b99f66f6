use crate::tea_server::routes::{handle_request, ServerState};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use log::{debug, warn};
use std::convert::Infallible;
use tokio::net::TcpListener;

/// The actual HTTP server registering expectations and replaying them to incoming requests.
///
/// Each connection is served on its own task: requests are handled concurrently, sharing the
/// same [`Store`](crate::Store) through `server_state`.
pub(super) async fn run_server(
    listener: std::net::TcpListener,
    server_state: ServerState,
    mut shutdown_signal: tokio::sync::oneshot::Receiver<()>,
) {
    let listener = match TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            warn!("Cannot upgrade TcpListener, the server will not start: {}", e);
            return;
        }
    };

    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("Failed to accept an incoming connection: {}", e);
                    continue;
                }
            },
            // This resolves when either:
            // - the sender half of the channel gets dropped (i.e. TeaServer is dropped)
            // - the sender is used, therefore sending a poison pill willingly as a shutdown signal
            _ = &mut shutdown_signal => break,
        };

        let server_state = server_state.clone();
        tokio::task::spawn(async move {
            let request_handler = service_fn(move |request| {
                let server_state = server_state.clone();
                async move { Ok::<_, Infallible>(handle_request(request, &server_state).await) }
            });
            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), request_handler)
                .await
            {
                debug!("Connection closed with an error: {}", e);
            }
        });
    }
    debug!("Server shut down.");
}
