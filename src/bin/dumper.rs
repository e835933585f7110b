use anyhow::{Context, Result};
use tokio::signal;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use webhook_dumper::app::AppEnv;
use webhook_dumper::http::router;
use webhook_dumper::{config, services};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cnf = config::init().context("failed to load config")?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&cnf.rust_log).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
        .init();

    tracing::info!(
        "PORT: {}, NODE_ENV: {}",
        cnf.port,
        cnf.node_env.as_deref().unwrap_or("<unset>")
    );

    let dump_svc = services::wh_dump::FsDumpServiceImpl::new(cnf.data_dir.clone());
    let app = AppEnv::new(dump_svc).with_callback_token(cnf.xendit_callback_token.clone());
    if app.callback_token.is_none() {
        tracing::warn!("XENDIT_CALLBACK_TOKEN not set, accepting unauthenticated callbacks");
    }
    let service = router::service(app);

    let socket_addr = cnf.listen_addr()?;
    tracing::info!("server starting on {socket_addr}");
    let sock = if socket_addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    sock.set_reuseaddr(true)?;
    sock.set_reuseport(true)?;
    sock.bind(socket_addr)
        .with_context(|| format!("failed to bind {socket_addr}"))?;
    let listener = sock.listen(1024)?;

    axum::serve(
        listener,
        axum::ServiceExt::<axum::extract::Request>::into_make_service(service),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("axum server failed")?;
    tracing::info!("process terminated");
    Ok(())
}

// PM2 sends SIGINT on stop/restart and SIGTERM when killed through the OS.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install C-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install sigterm handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
        tracing::info!("ctrl-c hit, graceful shutdown...")
        },
        _ = sigterm => {
        tracing::info!("SIGTERM received, graceful shutdown...")
        },
    };
}
