//! Demo business handler served by the `httpwire` binary.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::DemoConfig;
use crate::http::connection::BoxedWrite;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{StatusCode, write_error_response};
use crate::http::writer::{ResponseWriter, WriterState};
use crate::proxy::Passthrough;

const PASSTHROUGH_PREFIX: &str = "/httpbin/";
const UPSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Renders the small HTML status page.
pub fn html_page(title: &str, heading: &str, message: &str) -> String {
    format!(
        "<html>\n  <head>\n    <title>{}</title>\n  </head>\n  <body>\n    <h1>{}</h1>\n    <p>{}</p>\n  </body>\n</html>\n",
        title, heading, message
    )
}

/// Picks the status page for a target.
pub fn status_page(target: &str) -> (StatusCode, String) {
    match target {
        "/yourproblem" => (
            StatusCode::BAD_REQUEST,
            html_page(
                "400 Bad Request",
                "Bad Request",
                "Your request honestly kinda sucked.",
            ),
        ),
        "/myproblem" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            html_page(
                "500 Internal Server Error",
                "Internal Server Error",
                "Okay, you know what? This one is on me.",
            ),
        ),
        _ => (
            StatusCode::OK,
            html_page("200 OK", "Success!", "Your request was an absolute banger."),
        ),
    }
}

async fn write_page(
    mut writer: ResponseWriter<BoxedWrite>,
    status: StatusCode,
    page: &str,
) -> anyhow::Result<()> {
    let mut headers = Headers::new();
    headers.set_defaults(page.len(), &[("content-type", "text/html")]);

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub struct Demo {
    cfg: DemoConfig,
}

impl Demo {
    pub fn new(cfg: DemoConfig) -> Arc<Self> {
        Arc::new(Self { cfg })
    }

    pub async fn handle(
        &self,
        mut writer: ResponseWriter<BoxedWrite>,
        request: Request,
    ) -> anyhow::Result<()> {
        info!(method = %request.method(), target = %request.target(), "handling request");

        let Ok(target) = std::str::from_utf8(request.target_bytes()) else {
            let (status, page) = status_page("/yourproblem");
            return write_page(writer, status, &page).await;
        };

        if let Some(rest) = target.strip_prefix(PASSTHROUGH_PREFIX) {
            let relayed = match Passthrough::new(&self.cfg.upstream, UPSTREAM_CONNECT_TIMEOUT) {
                Ok(passthrough) => passthrough.relay(rest, &mut writer).await,
                Err(e) => Err(e),
            };
            return match relayed {
                Ok(_) => Ok(()),
                // Nothing sent yet, so the peer can still get a proper error.
                Err(e) if writer.state() == WriterState::Init => {
                    write_error_response(&mut writer, &e.to_string()).await?;
                    Ok(())
                }
                Err(e) => Err(e),
            };
        }

        if target.starts_with("/video") {
            return self.serve_video(writer).await;
        }

        let (status, page) = status_page(target);
        write_page(writer, status, &page).await
    }

    async fn serve_video(&self, mut writer: ResponseWriter<BoxedWrite>) -> anyhow::Result<()> {
        let body = match tokio::fs::read(&self.cfg.video_path).await {
            Ok(body) => body,
            Err(e) => {
                write_error_response(&mut writer, &e.to_string()).await?;
                return Ok(());
            }
        };

        let mut headers = Headers::new();
        headers.set_defaults(body.len(), &[("content-type", "video/mp4")]);

        writer.write_status_line(StatusCode::OK).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(&body).await?;
        writer.flush().await?;
        Ok(())
    }
}
