use std::time::Duration;

use tracing::{debug, info};
use zengine_fetch::{AbortController, FetchInit};
use zengine_rpc::{channel, RpcConfig};
use zengine_sdk::ZengineClient;

use crate::cmd::host::spawn_echo_host;
use crate::cmd::{parse_duration, parse_timeout, runtime, FetchArgs};
use crate::exit::{rpc_error, sdk_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: FetchArgs, format: OutputFormat) -> CliResult<i32> {
    let latency = parse_duration(&args.host.latency)?;
    let timeout = parse_timeout(&args.host.timeout)?;
    let abort_after = args.abort_after.as_deref().map(parse_duration).transpose()?;
    let init = build_init(&args)?;
    let config = RpcConfig {
        timeout,
        logging: true,
        ..RpcConfig::for_origin(args.host.origin.clone())
    };

    runtime()?.block_on(async move {
        let (client, host) = channel(config);
        client
            .start()
            .map_err(|err| rpc_error("failed to start client", err))?;
        spawn_echo_host(host, latency);

        let controller = AbortController::new();
        if let Some(delay) = abort_after {
            schedule_abort(controller.clone(), delay);
        }

        info!(url = %args.url, "fetching through host");
        let sdk = ZengineClient::new(client);
        let response = sdk
            .fetch((args.url.as_str(), init.signal(controller.signal())))
            .await
            .map_err(|err| sdk_error("fetch failed", err))?;

        print_response(&response, format);
        Ok::<_, CliError>(SUCCESS)
    })
}

fn schedule_abort(controller: AbortController, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        debug!(?delay, "aborting request");
        controller.abort();
    });
}

fn build_init(args: &FetchArgs) -> CliResult<FetchInit> {
    let mut init = FetchInit::new();
    if let Some(method) = &args.method {
        init = init.method(method.as_str());
    }
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        init = init
            .header(name, value)
            .map_err(|err| CliError::new(USAGE, format!("--header {raw:?}: {err}")))?;
    }
    if let Some(data) = &args.data {
        init = init.body(data.as_str());
    }
    if let Some(credentials) = args.credentials {
        init = init.credentials(credentials.into());
    }
    Ok(init)
}

fn parse_header(raw: &str) -> CliResult<(&str, &str)> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(CliError::new(
            USAGE,
            format!("header must look like 'Name: value': {raw}"),
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::new(USAGE, format!("header name is empty: {raw}")));
    }
    Ok((name, value.trim()))
}
