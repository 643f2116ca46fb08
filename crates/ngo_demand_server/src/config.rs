use actix_web::http::header::HeaderValue;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "ngo_demand_server", about = "Food donation demand server")]
pub struct CliOptions {
    #[structopt(
        long = "http-port",
        env = "PORT",
        help = "Port number of the server",
        default_value = "5000"
    )]
    pub http_port: u16,

    #[structopt(
        long = "http-addr",
        env = "HOST",
        help = "Bind address of the server",
        default_value = "0.0.0.0"
    )]
    pub http_addr: String,

    #[structopt(
        long = "data-file",
        env = "DEMANDS_FILE",
        help = "JSON file the demands are persisted to; kept in memory only when unset"
    )]
    pub data_file: Option<PathBuf>,

    #[structopt(
        long = "tokens-file",
        env = "TOKENS_FILE",
        help = "JSON file mapping bearer tokens to principals"
    )]
    pub tokens_file: Option<PathBuf>,

    #[structopt(
        long = "frontend-url",
        env = "FRONTEND_URL",
        help = "Only allow CORS requests from this origin"
    )]
    pub frontend_url: Option<String>,

    #[structopt(
        long = "mode",
        env = "NODE_ENV",
        help = "development or production; internal error details are only sent in development"
    )]
    pub mode: Option<String>,

    #[structopt(long = "workers", help = "Number of HTTP workers", default_value = "4")]
    pub workers: usize,
}

impl CliOptions {
    pub fn is_development(&self) -> bool {
        self.mode.as_deref() == Some("development")
    }

    pub fn mode_label(&self) -> &str {
        self.mode.as_deref().unwrap_or("development")
    }

    /// Allowed CORS origin, normalized. `None` means every origin is allowed.
    pub fn cors_origin(&self) -> Result<Option<String>, String> {
        self.frontend_url.as_deref().map(normalize_origin).transpose()
    }

    /// Every required setting that is missing or malformed.
    pub fn settings_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.tokens_file.is_none() {
            problems.push("TOKENS_FILE (--tokens-file) is not set".to_string());
        }
        if let Err(e) = self.cors_origin() {
            problems.push(format!("FRONTEND_URL (--frontend-url) {}", e));
        }
        problems
    }
}

/// An origin is `scheme://host[:port]`; a trailing slash is dropped since browsers never send one.
fn normalize_origin(raw: &str) -> Result<String, String> {
    let origin = raw.trim().trim_end_matches('/');
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .ok_or_else(|| format!("must start with http:// or https://, got {:?}", raw))?;
    if rest.is_empty() || rest.contains('/') || rest.contains('*') {
        return Err(format!("must be a single origin without path, got {:?}", raw));
    }
    HeaderValue::from_str(origin).map_err(|_| format!("is not a valid header value: {:?}", raw))?;
    Ok(origin.to_string())
}
