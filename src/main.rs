#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use domain::models::BackendErrorKind;
use domain::services::BackendErrors;
use yansi::Paint;

use crate::application::cli;
use crate::configuration::cache_dir;

fn handle_error(err: Error) {
    let info = BackendErrors::classify(&err, cli::identity().is_authenticated());

    eprintln!("{}", Paint::red(format!("Error: {err}")));
    if info.kind != BackendErrorKind::Unknown {
        eprintln!("\n{}", Paint::red(&info.user_message));
        for step in info.action_steps.iter() {
            eprintln!("  - {step}");
        }
    }

    eprintln!(
        "\n{}",
        Paint::new(format!(
            "Version: {}\nCommit: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE")
        ))
        .dimmed()
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_LOG=empire RUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("EMPIRE_LOG_DIR").unwrap_or_else(|_| {
        return cache_dir().to_string_lossy().to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("empire")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    if let Err(err) = cli::parse().await {
        drop(guard);
        handle_error(err);
    }
}
