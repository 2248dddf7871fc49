//! Mock agent bridge binary for integration testing
//!
//! Speaks the agent bridge protocol without a browser or language model.
//! The verdict of a `run` request is picked by markers in the task text,
//! which the tests put into the "input values" column:
//!
//! - `[[fail]]`: the agent reports the expected result was not met
//! - `[[fault]]`: the request fails
//! - `[[crash]]`: the process exits without answering
//!
//! Anything else succeeds.

use serde_json::{json, Value};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

fn main() {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = stdout.lock();

    let mut state = MockState::default();

    while let Some(message) = read_message(&mut reader) {
        let Some(outgoing) = state.process_message(&message) else {
            continue;
        };
        for msg in &outgoing {
            send_message(&mut writer, msg);
        }
        if state.exit {
            break;
        }
    }
}

fn read_message<R: BufRead>(reader: &mut R) -> Option<Value> {
    loop {
        let mut header_line = String::new();
        if reader.read_line(&mut header_line).unwrap_or(0) == 0 {
            return None;
        }

        let Some(length) = header_line.trim().strip_prefix("Content-Length:") else {
            continue;
        };
        let content_length: usize = length.trim().parse().unwrap_or(0);

        // Blank separator line
        let mut empty_line = String::new();
        reader.read_line(&mut empty_line).ok()?;

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).ok()?;

        if let Ok(value) = serde_json::from_slice(&body) {
            return Some(value);
        }
    }
}

fn send_message<W: Write>(writer: &mut W, message: &Value) {
    let body = message.to_string();
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).ok();
    writer.write_all(body.as_bytes()).ok();
    writer.flush().ok();
}

#[derive(Default)]
struct MockState {
    opened: bool,
    /// `run` requests served by this process
    runs: u64,
    exit: bool,
}

impl MockState {
    fn process_message(&mut self, message: &Value) -> Option<Vec<Value>> {
        if message.get("type")?.as_str()? != "request" {
            return None;
        }

        let command = message.get("command")?.as_str()?;
        let request_seq = message.get("seq")?.as_u64()?;
        let arguments = message.get("arguments").cloned().unwrap_or(json!({}));

        let mut outgoing = Vec::new();
        let result = match command {
            "open" => {
                self.opened = true;
                Ok(json!({ "locale": arguments["browser"]["locale"] }))
            }
            "run" if !self.opened => Err("browser is not open".to_string()),
            "run" => {
                self.runs += 1;
                let task = arguments["task"].as_str().unwrap_or_default();

                if task.contains("[[crash]]") {
                    std::process::exit(3);
                }

                if let Some(dir) = arguments["log_dir"].as_str() {
                    note_run(Path::new(dir), self.runs);
                }

                outgoing.push(json!({
                    "type": "event",
                    "event": "step",
                    "body": {
                        "step": 1,
                        "session_runs": self.runs,
                        "max_steps": arguments["max_steps"],
                        "max_actions_per_step": arguments["max_actions_per_step"],
                    }
                }));

                if task.contains("[[fault]]") {
                    Err("simulated agent fault".to_string())
                } else if task.contains("[[fail]]") {
                    Ok(json!({
                        "is_successful": false,
                        "action_results": [{"extracted_content": "error banner"}],
                        "final_result": "Expected result was not shown",
                    }))
                } else {
                    Ok(json!({
                        "is_successful": true,
                        "action_results": [{"extracted_content": "done"}],
                        "final_result": "Expected result confirmed",
                    }))
                }
            }
            "close" => {
                self.opened = false;
                self.exit = true;
                Ok(Value::Null)
            }
            other => Err(format!("unknown command '{other}'")),
        };

        outgoing.push(match result {
            Ok(body) => json!({
                "type": "response",
                "request_seq": request_seq,
                "success": true,
                "body": body,
            }),
            Err(message) => json!({
                "type": "response",
                "request_seq": request_seq,
                "success": false,
                "message": message,
            }),
        });

        Some(outgoing)
    }
}

/// Leave a trace in the case's log directory, like a real agent's history
fn note_run(dir: &Path, run: u64) {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("mock_agent.log"));
    if let Ok(mut file) = file {
        let _ = writeln!(file, "run {run}");
    }
}
