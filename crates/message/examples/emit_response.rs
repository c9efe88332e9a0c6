//! Answers every request on 127.0.0.1:8080 with a JSON description of it.
//!
//! ```text
//! curl -v 'http://127.0.0.1:8080/items?page=2' -H 'Cookie: session=abc'
//! ```

use bytes::BytesMut;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Decoder;

use micro_message::codec::RequestHeadDecoder;
use micro_message::emitter::{Emitter, EmitterConfig};
use micro_message::error::EmitError;
use micro_message::protocol::{HttpMessage, Response, ServerRequest};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            match serve(tcp_stream).await {
                Ok(()) => info!("finished process, connection shutdown"),
                Err(e) => error!(cause = %e, "service has error, connection shutdown"),
            }
        });
    }
}

async fn serve(mut tcp_stream: TcpStream) -> Result<(), EmitError> {
    let mut decoder = RequestHeadDecoder::default();
    let mut buf = BytesMut::with_capacity(8 * 1024);

    let mut response = loop {
        match decoder.decode(&mut buf) {
            Ok(Some(request)) => break describe(request),
            Ok(None) => {}
            Err(e) => {
                warn!(cause = %e, "can't decode request");
                break Response::json(&json!({ "error": e.to_string() }), 400)?;
            }
        }
        if tcp_stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }
    };

    let length = response.body().size().unwrap_or(0).to_string();
    let mut response = response.with_header("Content-Length", [length])?.with_header("Connection", ["close"])?;

    let (_reader, writer) = tcp_stream.split();
    let mut emitter = Emitter::with_config(writer, EmitterConfig::default().with_buffer_length(1024));
    emitter.emit(&mut response).await
}

fn describe(mut request: ServerRequest) -> Response {
    let body = request.body().to_text();
    let description = json!({
        "method": request.method().as_str(),
        "uri": request.uri().to_string(),
        "target": request.request_target(),
        "query": request.query_params().iter().collect::<Vec<_>>(),
        "cookies": request.cookie_params().iter().collect::<Vec<_>>(),
        "parsed_body": request.parsed_body(),
        "body": body,
    });

    Response::json(&description, 200).unwrap_or_default()
}
