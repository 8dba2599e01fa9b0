use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = medibot::config::StartArgs::parse();
    let app = medibot::app::state::AppState::new(&args);

    let addr = args.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("error while starting TCP listener");

    let router = medibot::app::server::router::router(app);

    info!("Listening on {addr}");

    axum::serve(listener, router)
        .await
        .expect("error while starting server");
}
