use crate::output::{emit_output, is_json_mode};
use stowage::storage_clients::store_definitions;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct BackendRow {
    id: String,
    label: String,
    fields: String,
}

pub fn backends() {
    if is_json_mode() {
        let backends: Vec<_> = store_definitions()
            .iter()
            .map(|definition| {
                let fields: Vec<_> = definition
                    .fields
                    .iter()
                    .map(|field| {
                        serde_json::json!({
                            "key": field.key,
                            "help": field.help,
                            "required": field.required,
                            "secret": field.secret,
                        })
                    })
                    .collect();
                serde_json::json!({
                    "id": definition.id,
                    "label": definition.label,
                    "fields": fields,
                })
            })
            .collect();
        emit_output(&backends);
        return;
    }

    let rows = store_definitions().iter().map(|definition| BackendRow {
        id: definition.id.to_string(),
        label: definition.label.to_string(),
        fields: definition
            .fields
            .iter()
            .map(|field| {
                if field.required {
                    format!("{}*", field.key)
                } else {
                    field.key.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", "),
    });

    println!("{}", Table::new(rows));
    println!("* required");
}
