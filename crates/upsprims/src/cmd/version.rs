use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("upsprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: upsprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", option_env!("UPSPRIMS_BUILD_TARGET").unwrap_or("unknown"));
    println!("profile: {}", option_env!("UPSPRIMS_BUILD_PROFILE").unwrap_or("unknown"));
    println!(
        "features: export={}, async={}, cli=true",
        cfg!(feature = "export"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}
