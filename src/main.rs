use httpwire::config::Config;
use httpwire::demo::Demo;
use httpwire::http::connection::BoxedWrite;
use httpwire::http::request::Request;
use httpwire::http::writer::ResponseWriter;
use httpwire::server::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let demo = Demo::new(cfg.demo.clone());
    let handler = move |writer: ResponseWriter<BoxedWrite>, request: Request| {
        let demo = demo.clone();
        async move { demo.handle(writer, request).await }
    };

    let server = Server::bind(&cfg.server, handler).await?;
    tracing::info!("Server started on {}", server.local_addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.close();

    Ok(())
}
