use crate::output::{emit_output, is_json_mode};
use crate::utils::{
    finish_spinner, get_or_prompt, get_timeout, handle_error, handle_stowage_error, start_spinner,
};
use clap::ArgMatches;
use dirs::home_dir;
use rmp_serde::Serializer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stowage::client::domain_of;
use stowage::storage_clients::{credential_details, parse_credential};

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub admin_email: String,
    pub credentials_path: String,
    pub default_timeout_secs: Option<u64>,
    pub content_type_tagging: bool,
}

pub fn config_path() -> Result<PathBuf, String> {
    let home_dir = home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;
    Ok(home_dir.join(".stowage").join("config.msgpack"))
}

pub fn read_config() -> Result<Option<Config>, String> {
    read_config_from(&config_path()?)
}

pub fn read_config_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read(path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;

    rmp_serde::from_slice(&contents)
        .map(Some)
        .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config_to(path: &Path, config: &Config) -> Result<(), String> {
    let mut buf = Vec::new();
    config
        .serialize(&mut Serializer::new(&mut buf))
        .map_err(|e| format!("Failed to encode config: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
    }

    std::fs::write(path, buf)
        .map_err(|e| format!("Failed to write config {}: {}", path.display(), e))
}

pub fn config(matches: &ArgMatches) {
    let admin_email = get_or_prompt(
        matches,
        "admin-email",
        "Enter the admin email (e.g. 'admin@example.com')",
    );

    if let Err(e) = domain_of(&admin_email) {
        handle_stowage_error(e, None);
    }

    let credentials = get_or_prompt(
        matches,
        "credentials",
        "Enter the path of the credential JSON file",
    );

    let credentials_path = std::fs::canonicalize(&credentials).unwrap_or_else(|e| {
        handle_error(format!("Failed to resolve {}: {}", credentials, e), None)
    });

    let credential = std::fs::read(&credentials_path)
        .map_err(|e| format!("Failed to read {}: {}", credentials_path.display(), e))
        .unwrap_or_else(|e| handle_error(e, None));
    let credential =
        parse_credential(&credential).unwrap_or_else(|e| handle_stowage_error(e, None));

    let pb = start_spinner("Writing config...");

    let config = Config {
        admin_email,
        credentials_path: credentials_path.display().to_string(),
        default_timeout_secs: get_timeout(matches).map(|timeout| timeout.as_secs()),
        content_type_tagging: !matches.get_flag("no-content-type"),
    };

    let path = config_path().unwrap_or_else(|e| handle_error(e, Some(&pb)));
    write_config_to(&path, &config).unwrap_or_else(|e| handle_error(e, Some(&pb)));

    if is_json_mode() {
        pb.finish_and_clear();
        emit_output(&serde_json::json!({
            "config_path": path.display().to_string(),
            "admin_email": config.admin_email,
            "storage_type": credential.storage_type,
            "details": credential_details(&credential),
        }));
        return;
    }

    finish_spinner(&pb, "Config written");
}
