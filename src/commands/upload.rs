use crate::output::{emit_output, is_json_mode};
use crate::utils::{
    finish_spinner, get_client, get_or_prompt, get_timeout, handle_error, handle_stowage_error,
    start_spinner,
};
use clap::ArgMatches;
use serde::Serialize;
use std::path::Path;
use stowage::format_size_si;

#[derive(Serialize)]
struct UploadOutput<'a> {
    bucket: &'a str,
    object: &'a str,
    size: u64,
    content_type: Option<&'static str>,
}

pub async fn upload(matches: &ArgMatches) {
    let bucket = get_or_prompt(matches, "bucket", "Enter the bucket to upload to");
    let path = matches
        .get_one::<String>("path")
        .cloned()
        .unwrap_or_else(|| handle_error("Missing required argument: PATH".to_string(), None));
    let timeout = get_timeout(matches);

    let client = get_client(matches);

    let pb = start_spinner(&format!("Uploading {}...", path));

    let result = match matches.get_one::<String>("name") {
        Some(name) => {
            let data = std::fs::read(Path::new(&path)).unwrap_or_else(|e| {
                handle_error(format!("Failed to read {}: {}", path, e), Some(&pb))
            });
            client.upload_data(&bucket, name, data, timeout).await
        }
        None => client.upload_path(&bucket, &path, timeout).await,
    };

    let object = result.unwrap_or_else(|e| handle_stowage_error(e, Some(&pb)));

    if is_json_mode() {
        pb.finish_and_clear();
        emit_output(&UploadOutput {
            bucket: &object.bucket_name,
            object: &object.filename,
            size: object.size(),
            content_type: client.content_type_for(&object.filename),
        });
        return;
    }

    finish_spinner(
        &pb,
        &format!(
            "Uploaded {} ({}) to {}",
            object.filename,
            format_size_si(object.size()),
            object.bucket_name
        ),
    );
}
