use crate::commands::config::{Config, read_config};
use crate::output::{emit_error, emit_progress_message, is_json_mode};
use clap::ArgMatches;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use stowage::{Client, StowageError};

pub fn get_pwd_string() -> String {
    std::env::current_dir()
        .map(|dir| dir.to_string_lossy().to_string())
        .unwrap_or_else(|_| ".".to_string())
}

pub fn handle_error(message: String, pb: Option<&ProgressBar>) -> ! {
    handle_error_with_code(message, "error", pb)
}

pub fn handle_stowage_error(err: StowageError, pb: Option<&ProgressBar>) -> ! {
    handle_error_with_code(err.to_string(), err.code(), pb)
}

fn handle_error_with_code(message: String, code: &str, pb: Option<&ProgressBar>) -> ! {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if is_json_mode() {
        emit_error(&message, code);
    }

    eprintln!("{} {}", style("Error:").red().bold(), message);
    std::process::exit(1);
}

pub fn start_spinner(message: &str) -> ProgressBar {
    if is_json_mode() {
        emit_progress_message(message);
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(100);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb
}

pub fn finish_spinner(pb: &ProgressBar, message: &str) {
    if is_json_mode() {
        pb.finish_and_clear();
        return;
    }

    let elapsed = pb.elapsed();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix("✓");
    pb.finish_with_message(format!("{} ({:.2?})", message, elapsed));
}

/// Takes an argument value, prompting for it in interactive mode.
pub fn get_or_prompt(matches: &ArgMatches, id: &str, prompt: &str) -> String {
    if let Some(value) = matches.get_one::<String>(id) {
        return value.to_string();
    }

    if is_json_mode() {
        handle_error(
            format!("Missing required argument: --{} (required in --mode json)", id),
            None,
        );
    }

    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .unwrap_or_else(|e| handle_error(format!("Error: {}", e), None))
}

pub fn get_timeout(matches: &ArgMatches) -> Option<Duration> {
    matches.get_one::<u64>("timeout").map(|secs| Duration::from_secs(*secs))
}

/// Builds the client from command-line overrides falling back to the saved
/// config. Any failure ends the process.
pub fn get_client(matches: &ArgMatches) -> Client {
    let config = read_config().unwrap_or_else(|e| handle_error(e, None));

    let admin_email = matches
        .get_one::<String>("admin-email")
        .cloned()
        .or_else(|| config.as_ref().map(|c| c.admin_email.clone()))
        .unwrap_or_else(|| {
            handle_error(
                "No admin email configured. Run 'stowage config' or pass --admin-email."
                    .to_string(),
                None,
            )
        });

    let credentials_path = matches
        .get_one::<String>("credentials")
        .cloned()
        .or_else(|| config.as_ref().map(|c| c.credentials_path.clone()))
        .unwrap_or_else(|| {
            handle_error(
                "No credentials configured. Run 'stowage config' or pass --credentials."
                    .to_string(),
                None,
            )
        });

    let credential = std::fs::read(&credentials_path).unwrap_or_else(|e| {
        handle_error(
            format!("Failed to read credentials {}: {}", credentials_path, e),
            None,
        )
    });

    let mut builder = Client::builder(admin_email, credential);
    if let Some(Config {
        default_timeout_secs: Some(secs),
        ..
    }) = config.as_ref()
    {
        builder = builder.default_timeout(Duration::from_secs(*secs));
    }
    if let Some(config) = config.as_ref() {
        builder = builder.content_type_tagging(config.content_type_tagging);
    }
    if matches.get_flag("no-content-type") {
        builder = builder.content_type_tagging(false);
    }

    builder
        .build()
        .unwrap_or_else(|e| handle_stowage_error(e, None))
}
