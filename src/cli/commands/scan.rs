use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::scan::{LineCapture, ScanPipeline, ScanReport, ScanSettings, ScanSignal, TextDecoder};
use crate::ui::messages::{info, scan_status};
use std::time::Duration;
use tracing::debug;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Scan {
        session,
        feed,
        interval_ms,
        debounce_ms,
    } = cmd
    {
        let mut settings = ScanSettings::from(&cfg.scan);
        if let Some(ms) = interval_ms {
            settings.poll_interval = Duration::from_millis((*ms).max(1));
        }
        if let Some(ms) = debounce_ms {
            settings.debounce_window = Duration::from_millis(*ms);
        }

        let device = match feed {
            Some(path) => LineCapture::from_path(path),
            None => LineCapture::stdin(),
        };

        let pool = open_pool(cfg)?.into_shared();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let report = runtime.block_on(async move {
            let pipeline = ScanPipeline::new(pool, *session, device, TextDecoder, settings);
            run_until_done(pipeline).await
        });
        // a blocked file read must not keep the process alive
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
        let report = report?;

        info(format!(
            "Scan finished: {} marked present, {} unknown, {} repeated scans ignored",
            report.marked, report.unknown, report.debounced
        ));
    }

    Ok(())
}

async fn run_until_done(pipeline: ScanPipeline<LineCapture, TextDecoder>) -> AppResult<ScanReport> {
    let mut handle = pipeline.start()?;
    let mut status = handle.status();

    scan_status(&status.borrow_and_update());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = handle.next_signal() => match signal {
                Some(ScanSignal::MarkedPresent { entry, .. }) => {
                    debug!(person_id = %entry.person_id, "present");
                }
                Some(ScanSignal::UnknownIdentifier(code)) => {
                    debug!(%code, "unknown");
                }
                Some(ScanSignal::CameraUnavailable(reason)) => {
                    debug!(%reason, "capture failed");
                }
                None => break,
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                scan_status(&status.borrow_and_update());
            }
            res = &mut ctrl_c => {
                res.map_err(AppError::Io)?;
                println!();
                break;
            }
        }
    }

    handle.stop().await
}
