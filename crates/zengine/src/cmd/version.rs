use zengine_fetch::{FETCH_API_VERSION, FETCH_METHOD};
use zengine_rpc::{DEFAULT_CALL_TIMEOUT, DEFAULT_PARENT_ORIGIN};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("zengine {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: zengine");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("ZENGINE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("fetch_method: {FETCH_METHOD}");
    println!("fetch_api_version: {FETCH_API_VERSION}");
    println!("default_origin: {DEFAULT_PARENT_ORIGIN}");
    println!("call_timeout: {}s", DEFAULT_CALL_TIMEOUT.as_secs());
    println!("features: sdk={}, cli=true", cfg!(feature = "sdk"));

    Ok(SUCCESS)
}
