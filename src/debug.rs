use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines event log with named counters. Clones share one sink.
#[derive(Clone)]
pub struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

enum DebugSink {
    File(BufWriter<File>),
    Memory(Vec<String>),
}

struct DebugState {
    sink: DebugSink,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_sink(DebugSink::File(BufWriter::new(file))))
    }

    pub fn in_memory() -> Self {
        Self::with_sink(DebugSink::Memory(Vec::new()))
    }

    fn with_sink(sink: DebugSink) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DebugState {
                sink,
                counters: HashMap::new(),
            })),
        }
    }

    pub fn log_json(&self, json: &str) {
        if let Ok(mut state) = self.inner.lock() {
            state.write_line(json);
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.counters.get(key).copied())
            .unwrap_or(0)
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts_json = if counters.is_empty() {
                "{}".to_string()
            } else {
                let mut out = String::from("{");
                for (idx, (key, value)) in counters.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    out.push_str(&format!("\"{}\":{}", json_escape(key), value));
                }
                out.push('}');
                out
            };
            let json = format!(
                "{{\"type\":\"debug.summary\",\"context\":\"{}\",\"counts\":{}}}",
                json_escape(context),
                counts_json
            );
            state.write_line(&json);
        }
    }

    /// Lines captured by an in-memory logger; empty for file loggers.
    pub fn lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(state) => match &state.sink {
                DebugSink::Memory(lines) => lines.clone(),
                DebugSink::File(_) => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            if let DebugSink::File(writer) = &mut state.sink {
                let _ = writer.flush();
            }
        }
    }
}

impl DebugState {
    fn write_line(&mut self, json: &str) {
        match &mut self.sink {
            DebugSink::File(writer) => {
                let _ = writeln!(writer, "{json}");
            }
            DebugSink::Memory(lines) => lines.push(json.to_string()),
        }
    }
}

impl std::fmt::Debug for DebugLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugLogger").finish_non_exhaustive()
    }
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_drains_sorted_counters() {
        let logger = DebugLogger::in_memory();
        logger.increment("tag.path", 2);
        logger.increment("gradient", 1);
        assert_eq!(logger.counter("tag.path"), 2);
        logger.emit_summary("parse");
        let lines = logger.lines();
        assert_eq!(
            lines.last().map(String::as_str),
            Some("{\"type\":\"debug.summary\",\"context\":\"parse\",\"counts\":{\"gradient\":1,\"tag.path\":2}}")
        );
        assert_eq!(logger.counter("tag.path"), 0);
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(json_escape("a\"b\nc"), "a\\\"b\\nc");
    }
}
