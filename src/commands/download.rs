use crate::output::{emit_output, is_json_mode};
use crate::utils::{
    finish_spinner, get_client, get_or_prompt, get_pwd_string, get_timeout, handle_stowage_error,
    start_spinner,
};
use clap::ArgMatches;
use stowage::format_size_si;

pub async fn download(matches: &ArgMatches) {
    let bucket = get_or_prompt(matches, "bucket", "Enter the bucket to download from");
    let object = get_or_prompt(matches, "object", "Enter the object to download");
    let destination = matches
        .get_one::<String>("destination")
        .cloned()
        .unwrap_or_else(get_pwd_string);
    let timeout = get_timeout(matches);

    let client = get_client(matches);

    let pb = start_spinner(&format!("Downloading {}/{}...", bucket, object));

    let file = client
        .download_to_dir(&bucket, &object, &destination, timeout)
        .await
        .unwrap_or_else(|e| handle_stowage_error(e, Some(&pb)));

    if is_json_mode() {
        pb.finish_and_clear();
        emit_output(&file);
        return;
    }

    finish_spinner(
        &pb,
        &format!(
            "Downloaded {} ({}, mode {:o}) to {}",
            file.name,
            format_size_si(file.size),
            file.mode,
            file.full_file_path
        ),
    );
}
