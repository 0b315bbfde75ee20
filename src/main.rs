//! CLI entry point for typed_fetch.
//!
//! Sends one request, decodes the JSON response, and prints it to stdout.
//! Failures are logged with their error kind and returned as a non-zero exit.

use anyhow::{Context, Result, anyhow, bail};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use typed_fetch::config::HeaderFile;
use typed_fetch::fetch::auth::{ApiKey, UrlParam};
use typed_fetch::output::{CallRecord, append_record, print_json};
use typed_fetch::{
    BasicClient, ClientConfig, HttpClient, HttpMethod, Resource, ResourceClient, TransportConfig,
};
use url::Url;

#[derive(Parser)]
#[command(name = "typed_fetch")]
#[command(about = "Send a JSON HTTP request and print the decoded response", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a resource, optionally merging extra query parameters into the URL
    Get {
        #[arg(value_name = "URL")]
        url: String,

        /// Query parameter as KEY=VALUE (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// POST a pre-serialized body
    Post {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        body: BodyArgs,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// PUT a pre-serialized body
    Put {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        body: BodyArgs,

        #[command(flatten)]
        request: RequestArgs,
    },
    /// DELETE a resource
    Delete {
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Args)]
struct BodyArgs {
    /// Request body, sent as-is
    #[arg(short, long, conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the request body from a file
    #[arg(long, value_name = "PATH")]
    data_file: Option<String>,
}

#[derive(Args)]
struct RequestArgs {
    /// Extra header as NAME:VALUE (repeatable, overrides --headers-file)
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// JSON object of extra headers
    #[arg(long, value_name = "PATH")]
    headers_file: Option<String>,

    /// Send `Authorization: Bearer <TOKEN>`
    #[arg(long, value_name = "TOKEN")]
    bearer: Option<String>,

    /// Append an API key query parameter to every request
    #[arg(long, value_name = "NAME=VALUE")]
    api_key_param: Option<String>,

    /// Total request timeout, overriding TYPED_FETCH_TIMEOUT_SECS
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// CSV file to append a call record to
    #[arg(long, value_name = "PATH")]
    log_csv: Option<String>,
}

impl BodyArgs {
    fn read(self) -> Result<Option<Bytes>> {
        match (self.data, self.data_file) {
            (Some(data), _) => Ok(Some(Bytes::from(data))),
            (None, Some(path)) => {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("failed to read body from '{path}'"))?;
                Ok(Some(Bytes::from(bytes)))
            }
            (None, None) => Ok(None),
        }
    }
}

impl Commands {
    /// Splits a subcommand into its target, method payload, and shared options.
    fn into_call(self) -> Result<(String, HttpMethod, RequestArgs)> {
        Ok(match self {
            Commands::Get {
                url,
                query,
                request,
            } => {
                let pairs = query
                    .iter()
                    .map(|raw| split_pair(raw, '='))
                    .collect::<Result<Vec<_>>>()?;
                (url, HttpMethod::Get(pairs), request)
            }
            Commands::Post { url, body, request } => (url, HttpMethod::Post(body.read()?), request),
            Commands::Put { url, body, request } => (url, HttpMethod::Put(body.read()?), request),
            Commands::Delete { url, request } => (url, HttpMethod::Delete, request),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing();

    let cli = Cli::parse();
    let (url, method, request) = cli.command.into_call()?;

    send(&url, method, request).await
}

/// Logging setup: colored stderr, plus a JSON rolling log file when
/// `LOG_FILE_PATH` is set.
fn init_tracing() -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")));

    let (json_layer, file_guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let path = Path::new(&log_file_path);
            let log_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("logs"));
            let log_file_name = path.file_name().unwrap_or(OsStr::new("typed_fetch.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::try_from_env("RUST_LOG_JSON")
                        .unwrap_or_else(|_| EnvFilter::new("debug")),
                );
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}

/// Executes one call and reports it on stdout, stderr and the optional CSV log.
#[tracing::instrument(skip_all, fields(url = %url))]
async fn send(url: &str, method: HttpMethod, args: RequestArgs) -> Result<()> {
    let url = Url::parse(url).with_context(|| format!("invalid URL '{url}'"))?;

    let mut transport_config = TransportConfig::from_env()?;
    if let Some(secs) = args.timeout {
        transport_config.timeout = Some(Duration::from_secs(secs));
    }
    let client = ResourceClient::new(build_transport(&transport_config, &args)?, ClientConfig::default());

    let resource: Resource<serde_json::Value> =
        Resource::new(url, method).with_headers(collect_headers(&args)?);

    let method_name = resource.method().name();
    let target = resource.url().to_string();
    info!(method = method_name, "Sending request");

    let started = Instant::now();
    let result = client.execute(&resource).await;
    let elapsed = started.elapsed();

    let record = match &result {
        Ok(_) => CallRecord::success(method_name, &target, elapsed),
        Err(e) => CallRecord::from_error(method_name, &target, elapsed, e),
    };
    if let Some(path) = &args.log_csv {
        if let Err(e) = append_record(path, &record) {
            error!(path = %path, error = %e, "Failed to append call record");
        }
    }

    match result {
        Ok(document) => {
            info!(elapsed_ms = record.elapsed_ms, "Request succeeded");
            print_json(&document)
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Request failed");
            Err(e.into())
        }
    }
}

/// Wraps the base transport in whichever credential decorators were requested.
fn build_transport(config: &TransportConfig, args: &RequestArgs) -> Result<Box<dyn HttpClient>> {
    let mut transport: Box<dyn HttpClient> = Box::new(BasicClient::from_config(config)?);

    if let Some(token) = &args.bearer {
        transport = Box::new(ApiKey::bearer(transport, token.clone()));
    }
    if let Some(raw) = &args.api_key_param {
        let (param_name, key) = split_pair(raw, '=')?;
        transport = Box::new(UrlParam {
            inner: transport,
            param_name,
            key,
        });
    }

    Ok(transport)
}

/// Headers from `--headers-file` first, then `-H` flags on top.
fn collect_headers(args: &RequestArgs) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::new();

    if let Some(path) = &args.headers_file {
        let file = HeaderFile::load(path)?;
        headers.extend(file.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    }
    for raw in &args.headers {
        let (name, value) = split_pair(raw, ':')?;
        headers.push((name, value.trim().to_string()));
    }

    Ok(headers)
}

/// Splits `NAME<sep>VALUE` at the first separator. The name is trimmed and
/// must not be empty; the value is kept verbatim.
fn split_pair(raw: &str, separator: char) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(separator)
        .ok_or_else(|| anyhow!("expected NAME{separator}VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("missing name in '{raw}'");
    }
    Ok((name.to_string(), value.to_string()))
}
