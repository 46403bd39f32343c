use crate::output::{emit_output, is_json_mode};
use crate::utils::{get_client, get_or_prompt, get_timeout, handle_error, handle_stowage_error};
use clap::ArgMatches;
use std::io::Write;

pub async fn cat(matches: &ArgMatches) {
    let bucket = get_or_prompt(matches, "bucket", "Enter the bucket");
    let object = get_or_prompt(matches, "object", "Enter the object");
    let timeout = get_timeout(matches);

    let client = get_client(matches);

    let object = client
        .download_object(&bucket, &object, timeout)
        .await
        .unwrap_or_else(|e| handle_stowage_error(e, None));

    if is_json_mode() {
        emit_output(&serde_json::json!({
            "bucket": object.bucket_name,
            "object": object.filename,
            "size": object.size(),
            "text": String::from_utf8_lossy(&object.data),
        }));
        return;
    }

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&object.data)
        .and_then(|_| stdout.flush())
        .unwrap_or_else(|e| handle_error(format!("Failed to write to stdout: {}", e), None));
}
