use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::terminal::{colors, print, progress::SpanProgress};
use maki_common::config::Config;
use maki_common::network::range;
use maki_common::probe::{self, ProbeKind, ProbeResult};
use maki_core::ScanEngine;
use maki_core::probes::{self, ProbeSettings};
use maki_core::report::Report;

pub async fn discover(cfg: &Config, cancel: &CancellationToken) -> anyhow::Result<()> {
    let targets: Vec<IpAddr> = range::enumerate(&cfg.target)?;

    print_target_info(cfg, &targets);

    let settings: ProbeSettings = ProbeSettings::from(cfg);
    let mut report: Report = Report::new(&cfg.target);

    for kind in &cfg.scans {
        if cancel.is_cancelled() {
            warn!("Skipping {kind}, the run was cancelled");
            continue;
        }

        print::header(&format!("starting {kind}"), cfg.quiet);
        let start_time: Instant = Instant::now();
        let results: Vec<ProbeResult> = run_scan(*kind, &settings, &targets, cfg, cancel).await;

        if results.len() < targets.len() {
            warn!(
                "{kind} was cancelled, {} of {} hosts were probed",
                results.len(),
                targets.len()
            );
        }

        print_results(*kind, &results, start_time.elapsed(), cfg);
        report.add_scan(*kind, results);
    }

    if let Some(dir) = &cfg.output_dir {
        match report.save_to_file(dir) {
            Ok(path) => info!("Results saved to: {}", path.display()),
            Err(e) => error!("Error saving results: {e:#}"),
        }
    }

    print::end_of_program();
    Ok(())
}

async fn run_scan(
    kind: ProbeKind,
    settings: &ProbeSettings,
    targets: &[IpAddr],
    cfg: &Config,
    cancel: &CancellationToken,
) -> Vec<ProbeResult> {
    let span: Span = info_span!("scan", indicatif.pb_show = true, probe = %kind);

    let mut engine: ScanEngine = ScanEngine::new(probes::build(kind, settings), cfg.workers)
        .with_progress(Arc::new(SpanProgress::new(span.clone())));
    engine.set_show_progress(!cfg.no_progress);

    engine.run(cancel, targets).instrument(span).await
}

fn print_target_info(cfg: &Config, targets: &[IpAddr]) {
    if cfg.quiet > 0 {
        return;
    }
    print::header("getting ready for discovery", cfg.quiet);

    let scans: String = cfg
        .scans
        .iter()
        .map(ProbeKind::to_string)
        .collect::<Vec<String>>()
        .join(", ");
    let workers: String = match cfg.workers {
        0 => "auto".to_string(),
        n => n.to_string(),
    };

    print::aligned_line("Target", &cfg.target, 7);
    print::aligned_line("Hosts", targets.len(), 7);
    print::aligned_line("Scans", scans, 7);
    print::aligned_line("Workers", workers, 7);
    if let Some(interface) = &cfg.interface {
        print::aligned_line("Iface", interface, 7);
    }
}

fn print_results(kind: ProbeKind, results: &[ProbeResult], total_time: Duration, cfg: &Config) {
    print::header(&format!("{kind} results"), cfg.quiet);

    let alive: Vec<&ProbeResult> = results.iter().filter(|result| result.alive).collect();
    if alive.is_empty() {
        print::no_results();
    }

    if cfg.quiet < 2 {
        for (idx, result) in alive.iter().enumerate() {
            print_host_tree(result, idx);
        }
    }

    let alive_count: usize = probe::count_alive(results);
    let summary: String = format!(
        "Total: {} hosts | Alive: {} | No response: {} | {}",
        results.len(),
        format!("{alive_count}").bold().green(),
        results.len() - alive_count,
        format!("{:.2}s", total_time.as_secs_f64()).bold().yellow()
    );

    print::fat_separator();
    print::centerln(&format!("{}", summary.color(colors::TEXT_DEFAULT)));
}

fn print_host_tree(result: &ProbeResult, idx: usize) {
    print::tree_head(idx, &result.address.to_string());
    print::as_tree_one_level(vec![
        ("Probe".to_string(), result.probe_name.color(colors::ACCENT)),
        ("Detail".to_string(), result.detail.normal()),
        (
            "Time".to_string(),
            format!("{}ms", result.duration.as_millis()).normal(),
        ),
    ]);
}
