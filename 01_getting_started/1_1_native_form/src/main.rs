#![windows_subsystem = "windows"]

use common::{app::FormConfig, util::init_logging};

#[cfg(windows)]
fn run(config: &FormConfig) -> i32 {
    let mut platform = common::os::Win32Platform::new();
    common::app::launch(&mut platform, config)
}

#[cfg(not(windows))]
fn run(_config: &FormConfig) -> i32 {
    tracing::error!("this demo needs the Win32 windowing API");
    1
}

fn main() {
    init_logging();

    let exit_code = run(&FormConfig::default());

    tracing::info!(exit_code, "exiting");
    std::process::exit(exit_code);
}
