//! Static file server for the chat UI page

use anyhow::{bail, Context, Result};
use axum::http::header::{
    HeaderName, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::HeaderValue;
use axum::Router;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

/// Ports tried in order when none is given
pub const DEFAULT_PORTS: &[u16] = &[8000, 8001, 8080, 8888, 3000, 5000];

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub dir: PathBuf,
    pub ports: Vec<u16>,
    /// Page opened in the browser, relative to `dir`
    pub page: String,
    pub open_browser: bool,
}

/// Bind the first free port; the listener is returned so the port stays
/// reserved. Returns `None` without holding any socket if all are taken.
pub fn find_available_port(ports: &[u16]) -> Option<(u16, TcpListener)> {
    ports.iter().find_map(|&port| {
        TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .ok()
            .map(|listener| (port, listener))
    })
}

/// Serve `dir` with permissive CORS headers
pub fn router(dir: PathBuf) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .layer(cors_header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

fn cors_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

/// Serve until Ctrl-C
pub fn serve(options: ServeOptions) -> Result<()> {
    if !options.dir.is_dir() {
        bail!("{} is not a directory", options.dir.display());
    }

    let Some((port, listener)) = find_available_port(&options.ports) else {
        let tried: Vec<String> = options.ports.iter().map(|p| p.to_string()).collect();
        bail!("all candidate ports are in use (tried: {})", tried.join(", "));
    };

    let url = format!("http://localhost:{}/{}", port, options.page);
    println!("🚀 Chat UI Server Started!");
    println!();
    println!("📍 Server URL: {}", url);
    println!("📡 Port: {}", port);
    println!();

    if options.open_browser {
        println!("Opening browser...");
        if let Err(e) = webbrowser::open(&url) {
            println!("Could not open a browser: {}", e);
        }
        println!();
    }

    println!("Press Ctrl+C to stop the server");
    println!("{}", "-".repeat(50));

    listener
        .set_nonblocking(true)
        .context("Failed to configure listener")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::from_std(listener)
            .context("Failed to register listener")?;
        axum::serve(listener, router(options.dir))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;
        anyhow::Ok(())
    })?;

    println!("\n\n✋ Server stopped.");
    println!("Goodbye! 👋");
    Ok(())
}

async fn shutdown_signal() {
    // If the handler cannot be installed, serve until killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
