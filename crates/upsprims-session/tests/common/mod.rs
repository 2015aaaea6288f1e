#![allow(dead_code)]

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use upsprims_session::{Poller, SessionConfig};
use upsprims_transport::Endpoint;

/// Reply function: command text and the byte that ended it.
pub type Responder = dyn Fn(&str, u8) -> Option<String> + Send + Sync;

/// A TCP fake of a UPS behind a serial adapter.
pub struct FakeUps {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    connections: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeUps {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, u8) -> Option<String> + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("fake ups should bind");
        listener
            .set_nonblocking(true)
            .expect("listener should switch to non-blocking");
        let addr = listener.local_addr().expect("listener should have an address");

        let stop = Arc::new(AtomicBool::new(false));
        let connections = Arc::new(AtomicUsize::new(0));
        let commands = Arc::new(Mutex::new(Vec::new()));
        let respond: Arc<Responder> = Arc::new(respond);

        let handle = {
            let stop = Arc::clone(&stop);
            let connections = Arc::clone(&connections);
            let commands = Arc::clone(&commands);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            connections.fetch_add(1, Ordering::SeqCst);
                            let respond = Arc::clone(&respond);
                            let commands = Arc::clone(&commands);
                            let stop = Arc::clone(&stop);
                            thread::spawn(move || serve(stream, &*respond, &commands, &stop));
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
            connections,
            commands,
            handle: Some(handle),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("127.0.0.1", self.addr.port())
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(self.endpoint()).with_timeout(Duration::from_millis(150))
    }

    pub fn poller(&self) -> Poller {
        Poller::from_config(self.config())
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("command log lock").clone()
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

fn serve(mut stream: TcpStream, respond: &Responder, commands: &Mutex<Vec<String>>, stop: &AtomicBool) {
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
                commands.lock().expect("command log lock").push(command.clone());
                if let Some(reply) = respond(&command, byte[0]) {
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

/// A port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

pub const QGS_REPLY: &str =
    "(230.1 50.0 229.8 50.0 001.2 025 380.1 379.9 054.6 054.5 031.5 100000000000\r";
pub const Q1_REPLY: &str = "(219.7 180.0 219.7 040 50.0 27.3 30.0 00000001\r";

/// Replies of a Centurion device, keyed by command.
pub fn centurion(command: &str) -> Option<String> {
    let reply = match command {
        "QGS" => QGS_REPLY,
        "Q1" => Q1_REPLY,
        "QMD" => "(PSH-3000 3000 90 1/1 230 230 02 12.0\r",
        "QRI" => "(230.0 13.0 48.0 50.0\r",
        "QMOD" => "(L\r",
        "QVFW" => "(VERFW:00322.02\r",
        _ => return None,
    };
    Some(reply.to_string())
}

/// Replies of a Megatec-only device.
pub fn megatec(command: &str) -> Option<String> {
    let reply = match command {
        "Q1" => "(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101\r",
        "I" => "#LIVIGY PSH-1500 FW1.03\r",
        "F" => "#220.0 005 24.00 50.0\r",
        _ => return None,
    };
    Some(reply.to_string())
}
