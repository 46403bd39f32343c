use crate::commands::config::read_config;
use crate::output::{emit_output, is_json_mode};
use crate::utils::handle_error;
use stowage::client::domain_of;
use stowage::storage_clients::{
    StoreCredential, credential_details, parse_credential, public_fields,
};

pub fn whoami() {
    let config = read_config()
        .unwrap_or_else(|e| handle_error(e, None))
        .unwrap_or_else(|| {
            handle_error("Not configured. Run 'stowage config' first.".to_string(), None)
        });

    let domain = domain_of(&config.admin_email).unwrap_or_default();

    let credential = std::fs::read(&config.credentials_path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| parse_credential(&bytes).map_err(|e| e.to_string()));

    if is_json_mode() {
        emit_output(&serde_json::json!({
            "admin_email": config.admin_email,
            "domain": domain,
            "credentials_path": config.credentials_path,
            "storage": storage_json(&credential),
        }));
        return;
    }

    let details = match &credential {
        Ok(credential) => format!(
            "{} ({})",
            credential.storage_type,
            credential_details(credential)
        ),
        Err(e) => format!("unreadable: {}", e),
    };

    println!("You are: {} (domain: {})", config.admin_email, domain);
    println!("Storage: {}", details);
}

/// Secrets are left out entirely rather than masked.
fn storage_json(credential: &Result<StoreCredential, String>) -> serde_json::Value {
    match credential {
        Ok(credential) => serde_json::json!({
            "storage_type": credential.storage_type,
            "fields": public_fields(credential),
        }),
        Err(e) => serde_json::json!({ "error": e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage::storage_clients::StoreFields;

    #[test]
    fn test_storage_json_lists_public_fields_only() {
        let mut fields = StoreFields::new();
        fields.insert("region".to_string(), "auto".to_string());
        fields.insert("endpoint".to_string(), "https://storage.googleapis.com".to_string());
        fields.insert("access_key".to_string(), "GOOGEXAMPLE".to_string());
        fields.insert("secret_key".to_string(), "hunter2".to_string());
        let credential = Ok(StoreCredential {
            storage_type: "s3".to_string(),
            fields,
        });

        let json = storage_json(&credential);

        assert_eq!(
            json,
            serde_json::json!({
                "storage_type": "s3",
                "fields": {
                    "endpoint": "https://storage.googleapis.com",
                    "region": "auto",
                },
            })
        );
        assert!(!json.to_string().contains("hunter2"));
    }

    #[test]
    fn test_storage_json_reports_unreadable_credential() {
        let json = storage_json(&Err("No such file or directory".to_string()));
        assert_eq!(json["error"], "No such file or directory");
    }
}
