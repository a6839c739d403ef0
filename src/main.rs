use std::process::ExitCode;

fn main() -> ExitCode {
    dinedesk_lib::run()
}
