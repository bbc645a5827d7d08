use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::model::Collection;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let collections: Vec<Value> = Collection::ALL
                .iter()
                .map(|c| {
                    json!({
                        "name": c.store_name(),
                        "label": c.label(),
                        "page_size": c.page_size(),
                        "searchable_fields": c.searchable_fields(),
                        "required_fields": c.schema().required_fields().map(|f| f.name).collect::<Vec<_>>(),
                        "joins_users": c.user_ref().is_some(),
                    })
                })
                .collect();
            output_success(
                &output_format,
                &format!("{} collections", collections.len()),
                Some(json!({ "collections": collections })),
            )
        }
        OutputFormat::Text => {
            for c in Collection::ALL {
                println!("{:<22} {:<20} search: {}", c.store_name(), c.label(), c.searchable_fields().join(", "));
            }
            Ok(())
        }
    }
}
