use std::{net::SocketAddr, path::PathBuf};

use anyhow::Result;
use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Configuration for the live development server
#[derive(Debug, Clone)]
pub struct LiveServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to serve on
    pub port: u16,
    /// Root directory to serve
    pub root: PathBuf,
    /// Auto-open browser
    pub open: bool,
    /// Allow cross-origin requests
    pub cors: bool,
}

impl Default for LiveServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            root: PathBuf::from("."),
            open: false,
            cors: false,
        }
    }
}

/// A static file server with a WebSocket live-reload channel.
///
/// The server itself never decides when to reload; whoever rebuilds the
/// served files pushes a full reload through a [`ReloadHandle`].
pub struct LiveServer {
    config: LiveServerConfig,
    reload_tx: broadcast::Sender<String>,
}

/// Sending side of the live-reload channel. Cheap to clone and usable
/// before the server starts accepting connections.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: broadcast::Sender<String>,
}

impl ReloadHandle {
    /// Tell every connected client to discard in-memory state and
    /// reload the page from scratch.
    pub fn request_full_reload(&self) {
        // No receivers just means no browser tab is attached yet.
        let _ = self.tx.send("full-reload".to_string());
    }
}

impl LiveServer {
    /// Create a new live server with the given configuration
    pub fn new(config: LiveServerConfig) -> Self {
        let (reload_tx, _) = broadcast::channel::<String>(100);
        Self { config, reload_tx }
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        ReloadHandle {
            tx: self.reload_tx.clone(),
        }
    }

    /// Run the live server
    pub async fn run(self) -> Result<()> {
        if !self.config.root.exists() {
            return Err(anyhow::anyhow!(
                "Root directory does not exist: {}",
                self.config.root.display()
            ));
        }

        let state = AppState {
            reload_tx: self.reload_tx.clone(),
        };

        let serve_dir = ServeDir::new(&self.config.root);
        let mut app = Router::new()
            .route("/__livereload", get(livereload_ws))
            .fallback_service(serve_dir)
            .with_state(state);
        if self.config.cors {
            app = app.layer(CorsLayer::permissive());
        }

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        println!("Serving at http://{}", addr);
        println!("Serving from: {}", self.config.root.display());
        println!("Live reload enabled at ws://{}/__livereload", addr);

        if self.config.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                eprintln!("Failed to open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    reload_tx: broadcast::Sender<String>,
}

async fn livereload_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| forward_reloads(socket, state.reload_tx))
}

/// Forward broadcast reload requests to one client until either side
/// goes away. The client only ever listens; anything it sends is
/// drained and ignored.
async fn forward_reloads(mut socket: WebSocket, reload_tx: broadcast::Sender<String>) {
    let mut reloads = reload_tx.subscribe();

    if socket
        .send(Message::Text("connected".to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            reload = reloads.recv() => {
                let Ok(message) = reload else { break };
                if socket.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                if incoming.is_none() {
                    break;
                }
            }
        }
    }
}

/// Client script that reloads the page whenever a full reload is
/// broadcast. Meant to be injected just before the closing body tag of
/// every served page.
pub fn livereload_script(host: &str, port: u16) -> String {
    format!(
        r#"
<script>
(function() {{
    const socket = new WebSocket('ws://{}:{}/__livereload');
    socket.onmessage = function(event) {{
        if (event.data === 'full-reload') {{
            location.reload();
        }}
    }};
    socket.onclose = function() {{
        console.log('Live reload disconnected');
    }};
}})();
</script>
"#,
        host, port
    )
}
