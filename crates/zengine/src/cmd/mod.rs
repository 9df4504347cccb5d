use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use zengine_fetch::RequestCredentials;
use zengine_rpc::DEFAULT_PARENT_ORIGIN;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod call;
pub mod fetch;
pub mod host;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a URL through the host bridge.
    Fetch(FetchArgs),
    /// Make a single host RPC call.
    Call(CallArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Fetch(args) => fetch::run(args, format),
        Command::Call(args) => call::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Settings for the in-process host the commands talk to.
#[derive(Args, Debug)]
pub struct HostArgs {
    /// Origin the host frame answers from.
    #[arg(long, default_value = DEFAULT_PARENT_ORIGIN)]
    pub origin: String,
    /// Delay before the host answers (e.g. 0ms, 2s).
    #[arg(long, default_value = "0ms")]
    pub latency: String,
    /// Per-call reply timeout (e.g. 30s, 500ms).
    #[arg(long, default_value = "30s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// URL to request.
    pub url: String,
    /// HTTP method.
    #[arg(long, short = 'X')]
    pub method: Option<String>,
    /// Request header as 'Name: value'. Repeat to append.
    #[arg(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,
    /// Request body.
    #[arg(long)]
    pub data: Option<String>,
    /// Credentials mode passed to the host.
    #[arg(long, value_enum)]
    pub credentials: Option<CredentialsArg>,
    /// Abort the request after this long (e.g. 100ms).
    #[arg(long)]
    pub abort_after: Option<String>,
    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// RPC method name (e.g. context, confirm, znHttp).
    pub method: String,
    /// JSON arguments.
    #[arg(long)]
    pub args: Option<String>,
    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CredentialsArg {
    Omit,
    SameOrigin,
    Include,
}

impl From<CredentialsArg> for RequestCredentials {
    fn from(arg: CredentialsArg) -> Self {
        match arg {
            CredentialsArg::Omit => RequestCredentials::Omit,
            CredentialsArg::SameOrigin => RequestCredentials::SameOrigin,
            CredentialsArg::Include => RequestCredentials::Include,
        }
    }
}

pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))
}

/// Parse `150ms`, `2s`, or a bare number of seconds.
pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

pub(crate) fn parse_timeout(input: &str) -> CliResult<Duration> {
    let timeout = parse_duration(input)?;
    if timeout.is_zero() {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }
    Ok(timeout)
}
