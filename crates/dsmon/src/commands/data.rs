//! Data document handlers.

use std::io::Read;
use std::path::Path;

use serde_json::{Value, json};
use tabled::Tabled;

use crate::cli::{DataArgs, DataCommand, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct KeyRow {
    #[tabled(rename = "Key")]
    key: String,
}

pub async fn handle(session: &Session, args: DataArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client(global).await?;

    let out = match args.command {
        DataCommand::List => {
            let keys = client.list_data().await?;
            output::render_list(
                global.output(),
                &keys,
                |k| KeyRow { key: k.clone() },
                Clone::clone,
            )?
        }

        DataCommand::Get { id } => {
            let doc = client.get_data(&id).await?;
            output::render_single(
                global.output(),
                &doc,
                |d| serde_json::to_string_pretty(d).unwrap_or_else(|_| d.to_string()),
                Value::to_string,
            )?
        }

        DataCommand::Post { data, file } => {
            let doc = read_document(data.as_deref(), file.as_deref())?;
            let id = client.post_data(&doc).await?;
            output::render_single(
                global.output(),
                &json!({ "id": id }),
                |_| format!("Stored as {id}"),
                |_| id.to_string(),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

/// Inline JSON wins; otherwise read the file, with `-` meaning stdin.
fn read_document(inline: Option<&str>, file: Option<&Path>) -> Result<Value, CliError> {
    let raw = match (inline, file) {
        (Some(text), _) => text.to_owned(),
        (None, Some(path)) if path == Path::new("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::Validation {
                field: "document".into(),
                reason: "pass --data '<json>' or --file <path>".into(),
            });
        }
    };
    Ok(serde_json::from_str(&raw)?)
}
