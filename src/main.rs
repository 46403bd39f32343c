use clap::{Arg, ArgAction, Command, arg, value_parser};
use tracing_subscriber::EnvFilter;

use crate::output::{detect_mode_from_args, init_panic_hook_if_json, set_output_mode};
use crate::utils::handle_error;

mod commands;
mod output;
mod utils;

fn cli() -> Command {
    Command::new("stowage")
        .about("Upload and download objects to S3-compatible storage with bounded timeouts.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Output mode")
                .global(true)
                .value_parser(["interactive", "json"]),
        )
        .arg(
            Arg::new("admin-email")
                .short('e')
                .long("admin-email")
                .value_name("EMAIL")
                .help("The administrative identity, like 'admin@example.com'")
                .global(true),
        )
        .arg(
            Arg::new("credentials")
                .short('c')
                .long("credentials")
                .value_name("CREDENTIALS")
                .help("Path of the credential JSON file")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Abort the transfer after this many seconds (default: 50)")
                .global(true)
                .value_parser(value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("no-content-type")
                .long("no-content-type")
                .help("Do not tag uploads with a content type guessed from the extension")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("config").about("Save the admin email and credential file to use"))
        .subcommand(Command::new("whoami").about("Show the configured identity and storage"))
        .subcommand(Command::new("backends").about("List the supported storage backends"))
        .subcommand(
            Command::new("upload")
                .about("Upload a local file to a bucket")
                .arg(arg!(-b --bucket <BUCKET> "The bucket to upload to").required(false))
                .arg(
                    arg!(-n --name <NAME> "The object name (default: the file's base name)")
                        .required(false),
                )
                .arg(arg!(<path> "The file to upload")),
        )
        .subcommand(
            Command::new("download")
                .about("Download an object into a local directory")
                .arg(arg!(-b --bucket <BUCKET> "The bucket to download from").required(false))
                .arg(arg!(-o --object <OBJECT> "The object to download").required(false))
                .arg(
                    Arg::new("destination")
                        .short('d')
                        .long("destination")
                        .value_name("DESTINATION")
                        .help("The directory to write into (default: current directory)")
                        .required(false),
                ),
        )
        .subcommand(
            Command::new("cat")
                .about("Print an object to stdout")
                .arg(arg!(-b --bucket <BUCKET> "The bucket to read from").required(false))
                .arg(arg!(-o --object <OBJECT> "The object to print").required(false)),
        )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stowage=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    set_output_mode(detect_mode_from_args(&args));
    init_panic_hook_if_json();
    init_tracing();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("config", matches)) => commands::config(matches),
        Some(("whoami", _)) => commands::whoami(),
        Some(("backends", _)) => commands::backends(),
        Some(("upload", matches)) => commands::upload(matches).await,
        Some(("download", matches)) => commands::download(matches).await,
        Some(("cat", matches)) => commands::cat(matches).await,
        _ => {
            handle_error(
                "Invalid command! Run 'stowage --help' for more information.".to_string(),
                None,
            );
        }
    }
}
