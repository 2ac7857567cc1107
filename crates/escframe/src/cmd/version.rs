use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("escframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: escframe");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", option_env!("ESCFRAME_BUILD_TARGET").unwrap_or("unknown"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
