//! One-shot metrics fetch.

use serde_json::Value;
use tabled::Tabled;

use dsmon_api::MetricRecord;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util::compact;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Details")]
    details: String,
}

fn metric_row(record: &MetricRecord) -> MetricRow {
    let details = match record.as_json() {
        Value::Object(map) => {
            let rest: serde_json::Map<String, Value> = map
                .iter()
                .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "value")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if rest.is_empty() {
                String::new()
            } else {
                Value::Object(rest).to_string()
            }
        }
        other => other.to_string(),
    };

    MetricRow {
        name: record.name().unwrap_or("-").to_owned(),
        value: record.value().map_or_else(|| "-".into(), compact),
        details,
    }
}

fn metric_id(record: &MetricRecord) -> String {
    match (record.name(), record.value()) {
        (Some(name), Some(value)) => format!("{name}\t{}", compact(value)),
        (Some(name), None) => name.to_owned(),
        _ => record.as_json().to_string(),
    }
}

/// Render a metrics snapshot in the requested format.
pub(crate) fn render(format: OutputFormat, records: &[MetricRecord]) -> Result<String, CliError> {
    output::render_list(format, records, metric_row, metric_id)
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let client = session.client(global).await?;
    let records = client.fetch_metrics().await?;
    tracing::debug!(count = records.len(), "metrics fetched");

    let out = render(global.output(), &records)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
