// dqa-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ResolverError {
    #[error("Error executing resolve command ({status}):\n{stderr}")]
    #[diagnostic(
        code(dqa::infra::resolver::exit),
        help("The resolver exited with a non-zero status. Its standard error is shown above.")
    )]
    Exit { status: String, stderr: String },

    #[error("Resolve command did not finish within {0}s")]
    #[diagnostic(code(dqa::infra::resolver::timeout))]
    Timeout(u64),

    #[error("Could not start resolve command '{program}': {source}")]
    #[diagnostic(
        code(dqa::infra::resolver::spawn),
        help("Check the 'resolver.program' setting or the DQA_RESOLVER_PROGRAM variable.")
    )]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- SUBPROCESS (Resolver) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolver(#[from] ResolverError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(dqa::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CSV ---
    #[error("CSV Error: {0}")]
    #[diagnostic(code(dqa::infra::csv))]
    Csv(#[from] csv::Error),

    // --- JSON (resolver protocol) ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(dqa::infra::json))]
    Json(#[from] serde_json::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(dqa::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(dqa::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(dqa::infra::config_missing))]
    ConfigNotFound(String),

    // --- HTTP (remote rule sources) ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(code(dqa::infra::http))]
    Http(#[from] reqwest::Error),

    #[error("Remote source returned {status} for '{url}'")]
    #[diagnostic(code(dqa::infra::http_status))]
    HttpStatus { status: u16, url: String },

    #[error("Timed out after {0}s fetching '{1}'")]
    #[diagnostic(code(dqa::infra::timeout))]
    Timeout(u64, String),
}

impl From<anyhow::Error> for InfrastructureError {
    fn from(err: anyhow::Error) -> Self {
        InfrastructureError::ConfigError(format!("{:#}", err))
    }
}
