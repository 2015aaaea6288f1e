use std::time::Instant;

use tracing::{debug, info, warn};
use upsprims_frame::{FrameReader, FrameWriter, Terminator};
use upsprims_protocol::{ParseError, Query, UpsRecord};
use upsprims_transport::{connect, probe, Endpoint, UpsStream};

use crate::command::CommandResponse;
use crate::config::{RetryBudget, SessionConfig};
use crate::error::{AttemptError, ExchangeError, Result};

/// A successful query: the frame that parsed and what it parsed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchanged {
    pub raw: String,
    pub record: UpsRecord,
}

/// Sends commands to one adapter and collects parseable replies.
///
/// Holds no connection between calls. Every attempt connects, drains
/// banner bytes, sends the command with each [`Terminator`] in turn and
/// closes the socket on return.
#[derive(Debug, Clone)]
pub struct Exchanger {
    config: SessionConfig,
}

type Session = (FrameReader<UpsStream>, FrameWriter<UpsStream>);

impl Exchanger {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// Run one read-only query until a reply parses or `budget` runs out.
    pub fn exchange(&self, query: Query, budget: RetryBudget) -> Result<Exchanged> {
        let (raw, record) = self.exchange_with(query.command(), |raw| query.parse(raw), budget)?;
        Ok(Exchanged { raw, record })
    }

    /// Send `command` and return the first frame `parser` accepts.
    ///
    /// Frames that fail to parse are stale or interleaved replies and are
    /// skipped. The error carries the failure of the last attempt.
    pub fn exchange_with<T, F>(
        &self,
        command: &str,
        parser: F,
        budget: RetryBudget,
    ) -> Result<(String, T)>
    where
        F: Fn(&str) -> std::result::Result<T, ParseError>,
    {
        let attempts = budget.attempts.max(1);
        let mut last = AttemptError::NoFrame;

        for attempt in 1..=attempts {
            match self.attempt(command, &parser, budget.frames) {
                Ok(found) => {
                    debug!(command, attempt, endpoint = %self.config.endpoint, "exchange succeeded");
                    return Ok(found);
                }
                Err(err) => {
                    debug!(command, attempt, error = %err, "exchange attempt failed");
                    last = err;
                }
            }
        }

        Err(ExchangeError::Exhausted {
            command: command.to_string(),
            attempts,
            last,
        })
    }

    /// Send a control command and return the first frame read back.
    ///
    /// Only connection and socket failures are retried. A device that
    /// accepted every write but stayed silent yields
    /// [`CommandResponse::NoResponse`].
    pub fn send_command(&self, command: &str) -> Result<CommandResponse> {
        let budget = RetryBudget::COMMAND;
        let mut last = AttemptError::NoFrame;

        for attempt in 1..=budget.attempts {
            match self.command_attempt(command, budget.frames) {
                Ok(response) => {
                    info!(command, %response, endpoint = %self.config.endpoint, "command sent");
                    return Ok(response);
                }
                Err(err) => {
                    warn!(command, attempt, error = %err, "command attempt failed");
                    last = err;
                }
            }
        }

        Err(ExchangeError::Exhausted {
            command: command.to_string(),
            attempts: budget.attempts,
            last,
        })
    }

    /// Connect-only reachability check against the probe timeout.
    pub fn probe(&self) -> bool {
        probe(&self.config.endpoint, self.config.probe_timeout)
    }

    fn open(&self) -> std::result::Result<Session, AttemptError> {
        let stream = connect(&self.config.endpoint, self.config.timeout)?;
        let write_half = stream.try_clone()?;
        let mut reader = FrameReader::with_config(stream, self.config.frame);
        reader.drain()?;
        Ok((reader, FrameWriter::new(write_half)))
    }

    /// One connection: each terminator in turn until a frame parses.
    ///
    /// Fails with the parse error of the last terminator that produced
    /// frames, or [`AttemptError::NoFrame`] when none did.
    fn attempt<T, F>(
        &self,
        command: &str,
        parser: &F,
        frames: usize,
    ) -> std::result::Result<(String, T), AttemptError>
    where
        F: Fn(&str) -> std::result::Result<T, ParseError>,
    {
        let (mut reader, mut writer) = self.open()?;
        let mut rejected = None;

        for terminator in Terminator::ALL {
            writer.send(command, terminator)?;
            let deadline = Instant::now() + self.config.timeout;
            match collect(&mut reader, deadline, frames, |raw| parser(raw))? {
                Collected::Accepted(found) => return Ok(found),
                Collected::Rejected(source) => {
                    rejected = Some(AttemptError::Parse { terminator, source });
                }
                Collected::Silent => {}
            }
        }

        Err(rejected.unwrap_or(AttemptError::NoFrame))
    }

    fn command_attempt(
        &self,
        command: &str,
        frames: usize,
    ) -> std::result::Result<CommandResponse, AttemptError> {
        let (mut reader, mut writer) = self.open()?;

        for terminator in Terminator::ALL {
            writer.send(command, terminator)?;
            let deadline = Instant::now() + self.config.timeout;
            let outcome = collect(&mut reader, deadline, frames, |raw| {
                let reply = raw.trim();
                if reply.is_empty() {
                    Err(())
                } else {
                    Ok(reply.to_string())
                }
            })?;
            if let Collected::Accepted((_, reply)) = outcome {
                return Ok(CommandResponse::Frame(reply));
            }
        }

        Ok(CommandResponse::NoResponse)
    }
}

/// What one terminator variant produced.
enum Collected<T, E> {
    Accepted((String, T)),
    /// Frames arrived but none was accepted; holds the last rejection.
    Rejected(E),
    /// No frame before the deadline.
    Silent,
}

/// Read up to `frames` frames until `accept` takes one.
fn collect<T, E>(
    reader: &mut FrameReader<UpsStream>,
    deadline: Instant,
    frames: usize,
    accept: impl Fn(&str) -> std::result::Result<T, E>,
) -> std::result::Result<Collected<T, E>, AttemptError>
where
    E: std::fmt::Debug,
{
    let mut outcome = Collected::Silent;
    for _ in 0..frames {
        let raw = reader.read_frame(deadline)?;
        if raw.is_empty() {
            break;
        }
        match accept(&raw) {
            Ok(value) => return Ok(Collected::Accepted((raw, value))),
            Err(rejection) => {
                debug!(frame = %raw, ?rejection, "discarding frame");
                outcome = Collected::Rejected(rejection);
            }
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn exchanger_for(listener: &TcpListener) -> Exchanger {
        let port = listener.local_addr().unwrap().port();
        Exchanger::new(
            SessionConfig::new(Endpoint::new("127.0.0.1", port))
                .with_timeout(Duration::from_millis(200)),
        )
    }

    #[test]
    fn banner_is_drained_before_command() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let exchanger = exchanger_for(&listener);

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // Banner parses as a valid Q1 reply; only a drained banner keeps
            // it from being returned.
            stream
                .write_all(b"(111.1 111.1 111.1 000 50.0 27.3 30.0 00000000\r")
                .unwrap();
            thread::sleep(Duration::from_millis(150));
            stream
                .write_all(b"(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101\r")
                .unwrap();
            thread::sleep(Duration::from_millis(200));
        });

        let found = exchanger
            .exchange(Query::Q1, RetryBudget::new(1, 2))
            .unwrap();
        assert_eq!(found.record.input_voltage, Some(219.7));
        server.join().unwrap();
    }

    #[test]
    fn noise_line_does_not_hide_the_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let exchanger = exchanger_for(&listener);

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_secs(3)))
                .unwrap();
            let mut seen = Vec::new();
            let mut byte = [0u8; 1];
            // Only the bare-LF variant gets an answer.
            while !seen.ends_with(b"\nQ1\n") {
                match std::io::Read::read(&mut stream, &mut byte) {
                    Ok(1) => seen.push(byte[0]),
                    _ => return,
                }
            }
            stream
                .write_all(b"\xfe\xff\r(219.7 219.7 219.7 000 50.0 27.3 30.0 01010101\r")
                .unwrap();
            thread::sleep(Duration::from_millis(200));
        });

        let found = exchanger
            .exchange(Query::Q1, RetryBudget::new(1, 6))
            .unwrap();
        assert_eq!(found.record.input_voltage, Some(219.7));
        assert!(found.raw.starts_with("(219.7"));
        server.join().unwrap();
    }

    #[test]
    fn silent_command_is_no_response() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let exchanger = exchanger_for(&listener);

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(900));
            drop(stream);
        });

        let response = exchanger.send_command("Q").unwrap();
        assert_eq!(response, CommandResponse::NoResponse);
        server.join().unwrap();
    }
}
