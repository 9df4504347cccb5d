use serde_json::Value;
use tracing::info;
use zengine_rpc::{channel, RpcCall, RpcConfig};

use crate::cmd::host::spawn_echo_host;
use crate::cmd::{parse_duration, parse_timeout, runtime, CallArgs};
use crate::exit::{rpc_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat};

pub fn run(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let latency = parse_duration(&args.host.latency)?;
    let timeout = parse_timeout(&args.host.timeout)?;
    let call = RpcCall::new(args.method.as_str(), resolve_args(args.args.as_deref())?);
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

        info!(method = %call.method, "calling host");
        let reply = client
            .call(call)
            .await
            .map_err(|err| rpc_error("call failed", err))?;
        print_value(&reply, format);
        Ok::<_, CliError>(SUCCESS)
    })
}

fn resolve_args(raw: Option<&str>) -> CliResult<Value> {
    match raw {
        Some(json) => serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--args is not valid JSON: {err}"))),
        None => Ok(Value::Null),
    }
}
