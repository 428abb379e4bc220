// Server module entry point
// Listener setup, accept loop and per-connection serving

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_reusable_listener;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config;
use crate::logger;

/// Accept connections until `shutdown` resolves
///
/// Connections already being served keep running on their own tasks.
pub async fn run(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => {
                logger::log_info(&format!(
                    "Listener closed, {} connection(s) still active",
                    active_connections.load(Ordering::SeqCst)
                ));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppState, Config};
    use crate::resolver::Catalog;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const CATALOG: &str = r#"
[[records]]
id = 1
[records.fields]
datas = { base64 = "AAECAwQFBgcICQ==" }
datas_fname = "intro.mp4"
"#;

    #[tokio::test]
    async fn test_serves_range_over_tcp() {
        let config = Config::from_toml_str("[logging]\naccess_log = false").unwrap();
        let catalog = Catalog::from_toml_str(CATALOG, ".").unwrap();
        let state = Arc::new(AppState::new(config, Arc::new(catalog)));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run(listener, state, async move {
            let _ = stop_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"GET /web/content/1 HTTP/1.1\r\nHost: localhost\r\nRange: bytes=0-2\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8_lossy(&raw);

        assert!(text.starts_with("HTTP/1.1 206 Partial Content\r\n"));
        assert!(text.contains("content-range: bytes 0-2/10\r\n"));
        assert!(raw.ends_with(&[0, 1, 2]));

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
