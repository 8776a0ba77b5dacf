use std::process::ExitCode as ProcessExitCode;

fn main() -> ProcessExitCode {
    let code = map1905_agent::cli::main();
    ProcessExitCode::from(i32::from(code) as u8)
}
