#![cfg(all(unix, feature = "cli"))]

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Megatec-only UPS that also acknowledges control commands.
struct FakeUps {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeUps {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("fake ups should bind");
        listener
            .set_nonblocking(true)
            .expect("listener should switch to non-blocking");
        let addr = listener.local_addr().expect("listener should have an address");
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            let stop = Arc::clone(&stop);
                            thread::spawn(move || serve(stream, &stop));
                        }
                        Err(err) if err.kind() == ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            })
        };

        Self {
            addr,
            stop,
            handle: Some(handle),
        }
    }

    fn host(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for FakeUps {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn reply(command: &str) -> Option<&'static str> {
    match command {
        "Q1" => Some("(219.7 219.7 219.7 000 50.0 27.3 30.0 00001001\r"),
        "I" => Some("#LIVIGY PSH-1500 FW1.03\r"),
        "F" => Some("#220.0 005 24.00 50.0\r"),
        "QPI" => Some("(PI03\r"),
        _ => None,
    }
}

fn serve(mut stream: TcpStream, stop: &AtomicBool) {
    let _ = stream.set_read_timeout(Some(Duration::from_millis(50)));
    let mut line = Vec::new();
    let mut byte = [0u8; 1];

    while !stop.load(Ordering::SeqCst) {
        match stream.read(&mut byte) {
            Ok(0) => return,
            Ok(_) if byte[0] == b'\r' || byte[0] == b'\n' => {
                if line.is_empty() {
                    continue;
                }
                let command = String::from_utf8_lossy(&line).into_owned();
                line.clear();
                if let Some(reply) = reply(&command) {
                    if stream.write_all(reply.as_bytes()).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => line.push(byte[0]),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(_) => return,
        }
    }
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

fn upsprims(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_upsprims"))
        .args(args)
        .env_remove("UPSPRIMS_HOST")
        .env_remove("UPSPRIMS_PORT")
        .env_remove("UPSPRIMS_CONFIG")
        .output()
        .expect("upsprims should run")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let text = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(text.trim()).expect("stdout should be one JSON document")
}

#[test]
fn poll_reports_megatec_device_as_json() {
    let ups = FakeUps::start();
    let host = ups.host();
    let output = upsprims(&[
        "poll",
        "--host",
        &host,
        "--timeout",
        "200ms",
        "--format",
        "json",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["device"], host.as_str());
    assert_eq!(json["protocol_family"], "megatec");
    assert_eq!(json["ups_responding"], true);
    assert_eq!(json["input_voltage"], 219.7);
    assert_eq!(json["model"], "PSH-1500");
    assert_eq!(json["status_summary"], "Normal");
}

#[test]
fn poll_against_closed_port_fails_health_check() {
    let port = closed_port().to_string();
    let output = upsprims(&[
        "poll",
        "--host",
        "127.0.0.1",
        "--port",
        &port,
        "--timeout",
        "100ms",
        "--format",
        "json",
    ]);

    assert_eq!(output.status.code(), Some(30));
    let json = stdout_json(&output);
    assert_eq!(json["adapter_connected"], false);
    assert_eq!(json["ups_responding"], false);
    assert_eq!(json["status_summary"], "Adapter Disconnected");
}

#[test]
fn control_rejects_out_of_range_minutes_before_connecting() {
    let output = upsprims(&[
        "control",
        "test",
        "--minutes",
        "100",
        "--host",
        "127.0.0.1",
        "--port",
        &closed_port().to_string(),
    ]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn send_prints_reply_and_no_response() {
    let ups = FakeUps::start();
    let host = ups.host();

    let output = upsprims(&["send", "QPI", "--host", &host, "--timeout", "200ms", "--format", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["command"], "QPI");
    assert_eq!(json["response"], "(PI03");
    assert_eq!(json["acknowledged"], true);

    let output = upsprims(&["control", "beeper", "--host", &host, "--timeout", "200ms", "--format", "raw"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "NO_RESPONSE");
}

#[test]
fn probe_reports_unreachable_adapter() {
    let port = closed_port().to_string();
    let output = upsprims(&["probe", "--host", "127.0.0.1", "--port", &port, "--format", "json"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["reachable"], false);

    let ups = FakeUps::start();
    let output = upsprims(&["probe", "--host", &ups.host(), "--format", "json"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["reachable"], true);
}

#[test]
fn command_needs_device_key_with_several_devices() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("devices.toml");
    std::fs::write(
        &path,
        r#"
        [[device]]
        id = "rack-a"
        host = "127.0.0.1"
        port = 1

        [[device]]
        id = "rack-b"
        host = "127.0.0.1"
        port = 2
        "#,
    )
    .expect("config should be writable");
    let config = path.to_string_lossy().into_owned();

    let output = upsprims(&["control", "cancel-test", "--config", &config]);
    assert_eq!(output.status.code(), Some(64));

    let output = upsprims(&["poll", "--config", &config, "--device", "rack-z"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn missing_target_is_usage_error() {
    let output = upsprims(&["poll"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_prints_package_version() {
    let output = upsprims(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("upsprims {}", env!("CARGO_PKG_VERSION"))
    );
}
