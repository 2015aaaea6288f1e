use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use upsprims::export::InfluxExporter;
use upsprims::session::Poller;

use crate::cmd::{device_exporter, parse_duration, WatchArgs};
use crate::config::Device;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_poll, OutputFormat};

const SLEEP_STEP: Duration = Duration::from_millis(100);

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let targets = args.target.resolve()?;
    let devices = targets.selected()?;
    let interval = args.interval.as_deref().map(parse_duration).transpose()?;
    let influx = if args.no_export { None } else { targets.influx };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut workers = Vec::with_capacity(devices.len());
    for device in devices {
        let exporter = influx
            .as_ref()
            .map(|influx| device_exporter(influx, &device))
            .transpose()?;
        let worker = Worker {
            interval: interval.unwrap_or(device.scan_interval),
            device,
            exporter,
            count: args.count,
            format,
        };
        let running = running.clone();
        workers.push(thread::spawn(move || worker.run(&running)));
    }

    for handle in workers {
        handle
            .join()
            .map_err(|_| CliError::new(INTERNAL, "polling thread panicked"))?;
    }
    Ok(SUCCESS)
}

struct Worker {
    device: Device,
    exporter: Option<InfluxExporter>,
    interval: Duration,
    count: Option<u64>,
    format: OutputFormat,
}

impl Worker {
    fn run(self, running: &AtomicBool) {
        let poller = Poller::from_config(self.device.session_config());
        info!(
            device = %self.device.id,
            endpoint = %self.device.endpoint,
            interval_ms = self.interval.as_millis() as u64,
            "polling started"
        );

        let mut cycles = 0u64;
        while running.load(Ordering::SeqCst) {
            let result = poller.poll_once();
            if cycles == 0 && !result.ups_responding {
                warn!(
                    device = %self.device.id,
                    "initial poll failed; continuing in background"
                );
            }
            print_poll(&self.device.id, &result, self.format);

            if let Some(exporter) = &self.exporter {
                if let Err(err) = exporter.push(&result) {
                    warn!(device = %self.device.id, error = %err, "influx export failed");
                }
            }

            cycles += 1;
            if self.count.is_some_and(|limit| cycles >= limit) {
                break;
            }
            sleep_while_running(running, self.interval);
        }

        info!(device = %self.device.id, cycles, "polling stopped");
    }
}

fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let until = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= until {
            break;
        }
        thread::sleep(SLEEP_STEP.min(until - now));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_returns_early_when_stopped() {
        let running = AtomicBool::new(false);
        let started = Instant::now();
        sleep_while_running(&running, Duration::from_secs(5));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_waits_for_interval() {
        let running = AtomicBool::new(true);
        let started = Instant::now();
        sleep_while_running(&running, Duration::from_millis(150));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
