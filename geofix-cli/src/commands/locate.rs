//! Locate command - run one acquisition session against a replayed track.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use geofix::config::ConfigFile;
use geofix::geocode::{Geocoder, NominatimGeocoder, OfflineGeocoder};
use geofix::location::ReplayProvider;
use geofix::sequence::SequenceGenerator;
use geofix::session::{
    AcquisitionReport, AcquisitionSession, BroadcastObserver, SessionDriver, SessionStatus,
};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Reports buffered for the printer before it starts lagging.
const REPORT_BUFFER: usize = 64;

/// Arguments for the locate command.
pub struct LocateArgs {
    pub replay: PathBuf,
    pub offline: bool,
}

/// Run the locate command.
pub fn run(args: LocateArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("locate");
    let config = runner.config();

    let provider = ReplayProvider::from_path(&args.replay).map_err(|error| CliError::Replay {
        path: args.replay.clone(),
        error,
    })?;
    info!(
        path = %args.replay.display(),
        steps = provider.steps().len(),
        "Replay loaded"
    );

    let geocoder: Arc<dyn Geocoder> = if args.offline {
        Arc::new(OfflineGeocoder)
    } else {
        Arc::new(
            NominatimGeocoder::new(&config.geocoder.to_nominatim_config())
                .map_err(CliError::Geocoder)?,
        )
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let report = runtime.block_on(locate(config, provider, geocoder))?;
    print_summary(&report);
    Ok(())
}

async fn locate(
    config: &ConfigFile,
    provider: ReplayProvider,
    geocoder: Arc<dyn Geocoder>,
) -> Result<AcquisitionReport, CliError> {
    let session = AcquisitionSession::new(
        config.session.to_session_config(),
        SequenceGenerator::new(),
    );
    let (driver, handle) = SessionDriver::new(session, provider, geocoder);
    let driver = driver.with_first_address_notifier(ring_bell);

    let shutdown = CancellationToken::new();
    let driver_task = tokio::spawn(driver.run(shutdown.clone()));

    let (observer, mut reports) = BroadcastObserver::new(REPORT_BUFFER);
    handle.register_observer(Box::new(observer)).await?;

    let signal_handle = handle.clone();
    ctrlc::set_handler(move || {
        // The driver may already be gone
        let _ = signal_handle.stop();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    handle.start()?;

    let mut last = None;
    loop {
        match reports.recv().await {
            Ok(report) => {
                print_report(&report);
                let done = is_settled(&report);
                last = Some(report);
                if done {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Report printer lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }

    let report = match last {
        Some(report) => report,
        None => handle.report().await?,
    };

    shutdown.cancel();
    // A panicked driver has nothing left to report
    let _ = driver_task.await;

    Ok(report)
}

/// Whether no further report can change the outcome.
fn is_settled(report: &AcquisitionReport) -> bool {
    match report.status {
        SessionStatus::Stopped => true,
        SessionStatus::Converged => !report.geocoding,
        _ => false,
    }
}

fn print_report(report: &AcquisitionReport) {
    let status = match report.status {
        SessionStatus::Converged => style(report.status).green().bold(),
        SessionStatus::Stopped => style(report.status).yellow().bold(),
        _ => style(report.status).cyan(),
    };

    match &report.fix {
        Some(fix) => println!(
            "[{:>9}] {}  ±{:.0} m",
            status,
            fix.coordinate(),
            fix.horizontal_accuracy()
        ),
        None => println!("[{:>9}] waiting for a fix", status),
    }
}

fn print_summary(report: &AcquisitionReport) {
    println!();
    match &report.fix {
        Some(fix) => {
            println!("Location:  {}", fix.coordinate());
            println!("Accuracy:  {:.1} m", fix.horizontal_accuracy());
            println!("Taken at:  {}", fix.timestamp().to_rfc3339());
        }
        None => println!("Location:  {}", style("unknown").red()),
    }

    let address = report.address_line();
    if !address.is_empty() {
        let mut lines = address.lines();
        if let Some(first) = lines.next() {
            println!("Address:   {}", first);
        }
        for line in lines {
            println!("           {}", line);
        }
    }

    if let Some(error) = report.error {
        println!("Error:     {}", style(error).red());
    }
}

fn ring_bell() {
    let mut stdout = io::stdout();
    // Best effort; a closed stdout only loses the bell
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: SessionStatus, geocoding: bool) -> AcquisitionReport {
        AcquisitionReport {
            fix: None,
            address: None,
            status,
            error: None,
            geocoding,
            address_error: None,
        }
    }

    #[test]
    fn test_settled_states() {
        assert!(is_settled(&report(SessionStatus::Stopped, false)));
        assert!(is_settled(&report(SessionStatus::Converged, false)));
        assert!(!is_settled(&report(SessionStatus::Converged, true)));
        assert!(!is_settled(&report(SessionStatus::Refining, false)));
        assert!(!is_settled(&report(SessionStatus::Acquiring, false)));
        assert!(!is_settled(&report(SessionStatus::Idle, false)));
    }
}
