//! Live dashboard: clock ticker plus metrics poller until Ctrl-C.

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use dsmon_api::MetricRecord;
use dsmon_core::{Dashboard, FetchOrdering};

use crate::cli::{GlobalOpts, OrderingArg, WatchArgs};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::{metrics, util};

impl From<OrderingArg> for FetchOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::CompletionOrder => Self::CompletionOrder,
            OrderingArg::LatestIssued => Self::LatestIssued,
        }
    }
}

pub async fn handle(session: &Session, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut dash_config = dsmon_config::dashboard_config(&session.config.defaults)?;
    if let Some(ref raw) = args.clock_interval {
        dash_config.clock_interval = util::parse_duration("clock-interval", raw)?;
    }
    if let Some(ref raw) = args.metrics_interval {
        dash_config.metrics_interval = util::parse_duration("metrics-interval", raw)?;
    }
    if let Some(ordering) = args.ordering {
        dash_config.ordering = ordering.into();
    }

    let client = session.client(global).await?;
    let dashboard = Dashboard::new(client, dash_config)?;

    // Fail fast on auth or connection problems before going live.
    dashboard.refresh_now().await?;
    let mut printed = 0u32;
    let mut last = dashboard.metrics().snapshot();
    print_snapshot(&dashboard, &last, global)?;
    printed += 1;
    if args.count.is_some_and(|n| printed >= n) {
        return Ok(());
    }

    let mut metrics_sub = dashboard.metrics().subscribe();
    let mut clock_sub = dashboard.clock().subscribe();
    let live_clock = !global.quiet && std::io::stderr().is_terminal();
    dashboard.start().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break Ok(()),
            snap = metrics_sub.changed() => {
                let Some(snap) = snap else { break Ok(()) };
                if *snap == *last {
                    continue;
                }
                if live_clock {
                    eprint!("\r\x1b[2K");
                }
                if let Err(e) = print_snapshot(&dashboard, &snap, global) {
                    break Err(e);
                }
                last = snap;
                printed += 1;
                if args.count.is_some_and(|n| printed >= n) {
                    break Ok(());
                }
            }
            tick = clock_sub.changed(), if live_clock => {
                if let Some(tick) = tick {
                    let mut stderr = std::io::stderr().lock();
                    let _ = write!(stderr, "\r{}", tick.format("%H:%M:%S"));
                    let _ = stderr.flush();
                }
            }
        }
    };

    if live_clock {
        eprintln!();
    }
    dashboard.shutdown().await;
    result
}

fn print_snapshot(
    dashboard: &Dashboard,
    records: &Arc<Vec<MetricRecord>>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = metrics::render(global.output(), records)?;
    if global.quiet {
        return Ok(());
    }

    let color = output::should_color(global.color());
    let stamp = dashboard
        .metrics()
        .last_updated()
        .unwrap_or_else(|| dashboard.clock().now())
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string();
    let header = format!("{} ({} metrics)", stamp, records.len());
    // Keep machine-readable formats clean on stdout.
    if matches!(global.output(), crate::cli::OutputFormat::Table) {
        output::print_output(&output::dim(&header, color), false);
    } else {
        eprintln!("{header}");
    }
    output::print_output(&body, false);
    Ok(())
}
