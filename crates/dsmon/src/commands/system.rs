//! Health and version handlers.

use std::fmt::Write;

use crate::cli::GlobalOpts;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

pub async fn health(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client(global).await?;
    let status = client.health().await?;
    let color = output::should_color(global.color());

    let label = if status.health { "healthy" } else { "unhealthy" };
    let out = output::render_single(
        global.output(),
        &status,
        |_| format!("{}  {}", output::status_label(status.health, label, color), client.server()),
        |_| label.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn version(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client(global).await?;
    let info = client.version().await?;

    let out = output::render_single(
        global.output(),
        &info,
        |v| {
            let mut out = String::new();
            let _ = writeln!(out, "Version:   {}", v.version);
            let _ = writeln!(out, "Commit:    {}", v.commit_hash);
            let _ = writeln!(out, "Built:     {}", v.date);
            let _ = write!(out, "Signature: {}", v.signature);
            out
        },
        |v| v.version.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
