use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::load_guard;
use crate::cli::utils::{confirm, fail, output_empty_collection, output_error, output_success, read_records_file, read_stdin_object};
use crate::cli::OutputFormat;
use crate::editor::RecordEditor;
use crate::gateway::{fetch_record, fetch_records, HttpGateway};
use crate::model::record::to_json_array;
use crate::model::Collection;
use crate::render::{render_view, Layout};
use crate::screen::{MountOutcome, NotificationKind, Screen};
use crate::session::{SessionGuard, ENTRY_ROUTE};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "Show one page of a collection, optionally filtered")]
    List {
        #[arg(help = "Collection name (see `haven collections`)")]
        collection: Collection,
        #[arg(long, short, help = "Case-insensitive search term")]
        search: Option<String>,
        #[arg(long, short, default_value_t = 1, help = "Page number, 1-based")]
        page: usize,
        #[arg(long, value_enum, help = "Force card or table layout")]
        layout: Option<Layout>,
    },

    #[command(about = "Show a single record")]
    Show {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create record from stdin")]
    Create {
        #[arg(help = "Collection name")]
        collection: Collection,
    },

    #[command(about = "Update record fields from stdin")]
    Update {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Record ID to delete")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export every valid record as a JSON array")]
    Export {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Output file path (stdout when omitted)")]
        output: Option<PathBuf>,
    },

    #[command(about = "Create records from a JSON or YAML file")]
    Import {
        #[arg(help = "Collection name")]
        collection: Collection,
        #[arg(help = "Input file path")]
        input: PathBuf,
    },
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let guard = load_guard()?;
    let gateway = Arc::new(connect(&guard)?);

    match cmd {
        DataCommands::List { collection, search, page, layout } => {
            list(gateway, &guard, collection, search, page, layout, &output_format).await
        }
        DataCommands::Show { collection, id } => {
            require_session(&guard)?;
            match fetch_record(gateway.as_ref(), collection, &id).await {
                Ok(record) => match output_format {
                    OutputFormat::Json => output_success(
                        &output_format,
                        &format!("{} record {}", collection.label(), id),
                        Some(json!({ "record": record.to_json() })),
                    ),
                    OutputFormat::Text => {
                        println!("ID: {}", record.id());
                        for (name, value) in record.fields() {
                            println!("{}: {}", collection.column_label(name), value.display());
                        }
                        Ok(())
                    }
                },
                Err(e) => fail(&output_format, e.into()),
            }
        }
        DataCommands::Create { collection } => {
            require_session(&guard)?;
            let fields = read_stdin_object()?;
            let mut screen = Screen::new(collection, gateway);
            screen.open_create()?;
            screen.editor_mut().apply(fields)?;
            submit(&mut screen, &output_format).await
        }
        DataCommands::Update { collection, id } => {
            require_session(&guard)?;
            let fields = read_stdin_object()?;
            let mut screen = Screen::new(collection, gateway);
            if let Err(e) = screen.open_edit(&id).await {
                return fail(&output_format, e);
            }
            screen.editor_mut().apply(fields)?;
            submit(&mut screen, &output_format).await
        }
        DataCommands::Delete { collection, id, yes } => {
            require_session(&guard)?;
            let mut screen = Screen::new(collection, gateway);
            screen.request_delete(&id)?;

            let prompt = format!("Delete {} record '{}'?", collection.label().to_lowercase(), id);
            if !yes && !confirm(&prompt)? {
                screen.cancel();
                return output_success(&output_format, "Deletion cancelled", None);
            }

            match screen.confirm_delete().await {
                Ok(id) => output_success(
                    &output_format,
                    &format!("Deleted {} record {}", collection, id),
                    Some(json!({ "id": id })),
                ),
                Err(e) => fail(&output_format, e),
            }
        }
        DataCommands::Export { collection, output } => {
            require_session(&guard)?;
            let records = match fetch_records(gateway.as_ref(), collection).await {
                Ok(records) => records,
                Err(e) => return fail(&output_format, e.into()),
            };
            let body = serde_json::to_string_pretty(&to_json_array(&records))?;
            match output {
                Some(path) => {
                    fs::write(&path, body)?;
                    output_success(
                        &output_format,
                        &format!("Exported {} {} records to {}", records.len(), collection, path.display()),
                        Some(json!({ "count": records.len() })),
                    )
                }
                None => {
                    println!("{}", body);
                    Ok(())
                }
            }
        }
        DataCommands::Import { collection, input } => {
            require_session(&guard)?;
            import(gateway.as_ref(), collection, &input, &output_format).await
        }
    }
}

fn connect(guard: &SessionGuard) -> anyhow::Result<HttpGateway> {
    let gateway = HttpGateway::from_config()?;
    Ok(match guard.session() {
        Some(session) => gateway.with_token(&session.token),
        None => gateway,
    })
}

fn require_session(guard: &SessionGuard) -> anyhow::Result<()> {
    if guard.is_authenticated() {
        Ok(())
    } else {
        Err(not_signed_in())
    }
}

fn not_signed_in() -> anyhow::Error {
    anyhow::anyhow!("Not signed in (redirected to {}). Run `haven auth login <email>` first", ENTRY_ROUTE)
}

async fn list(
    gateway: Arc<HttpGateway>,
    guard: &SessionGuard,
    collection: Collection,
    search: Option<String>,
    page: usize,
    layout: Option<Layout>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut screen = Screen::new(collection, gateway);

    if let MountOutcome::Redirect { .. } = screen.mount(guard).await {
        return Err(not_signed_in());
    }
    if let Some(notification) = screen.notification() {
        if notification.kind == NotificationKind::Error {
            output_error(output_format, &notification.message, Some("GATEWAY_ERROR"))?;
            return Err(anyhow::anyhow!("Loading {} failed", collection));
        }
    }

    if let Some(term) = search {
        screen.search(term);
    }
    screen.go_to_page(page);
    let view = screen.view();

    match output_format {
        OutputFormat::Json => {
            if view.is_empty() && !view.is_searching() {
                return output_empty_collection(output_format, "records", "");
            }
            let records: Vec<Value> = view.page.items.iter().map(|r| r.to_json()).collect();
            output_success(
                output_format,
                &format!("{} of {} {} records", records.len(), view.page.total_items, collection),
                Some(json!({
                    "collection": collection.store_name(),
                    "search": view.search_term,
                    "page": view.page.page,
                    "page_size": view.page.page_size,
                    "total_pages": view.page.total_pages,
                    "total_items": view.page.total_items,
                    "page_numbers": view.page_numbers,
                    "records": records,
                })),
            )
        }
        OutputFormat::Text => {
            let layout = layout.unwrap_or_else(Layout::detect);
            print!("{}", render_view(collection, &view, layout));
            Ok(())
        }
    }
}

async fn submit(screen: &mut Screen<HttpGateway>, output_format: &OutputFormat) -> anyhow::Result<()> {
    match screen.submit_editor().await {
        Ok(outcome) => {
            let message = screen
                .notification()
                .map(|n| n.message.clone())
                .unwrap_or_else(|| "Saved".to_string());
            output_success(output_format, &message, Some(json!({ "id": outcome.id })))
        }
        Err(e) => fail(output_format, e),
    }
}

async fn import(
    gateway: &HttpGateway,
    collection: Collection,
    input: &std::path::Path,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let items = read_records_file(input)?;
    let mut editor = RecordEditor::new(collection);
    let mut created = Vec::new();
    let mut failed = Vec::new();

    for (index, fields) in items.into_iter().enumerate() {
        editor.open(None)?;
        editor.apply(fields)?;
        match editor.submit(gateway).await {
            Ok(outcome) => created.push(outcome.id),
            Err(e) => {
                tracing::warn!("Import entry {} rejected: {}", index + 1, e.message());
                failed.push(json!({ "entry": index + 1, "error": e.message() }));
                editor.cancel();
            }
        }
    }

    if let OutputFormat::Text = output_format {
        for failure in &failed {
            eprintln!("Entry {}: {}", failure["entry"], failure["error"].as_str().unwrap_or_default());
        }
    }

    let message = format!("Imported {} {} records, {} rejected", created.len(), collection, failed.len());
    if failed.is_empty() {
        output_success(output_format, &message, Some(json!({ "created": created })))
    } else {
        output_error(output_format, &message, Some("IMPORT_PARTIAL"))?;
        Err(anyhow::anyhow!(message))
    }
}
