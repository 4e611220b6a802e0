//! Integration tests for the diagnostics emitted with the `tracing` feature.
#![cfg(feature = "tracing")]

use std::io;
use std::sync::{Arc, Mutex};

use onepass::reduce::{count, try_any};
use onepass::SourceExt;
use tracing::Level;

/// Captures formatted log output in memory.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, captured.text())
}

#[test]
fn evaluation_runs_inside_a_span() {
    let (_, logs) = capture(|| vec![1, 2].request(count()).evaluate().unwrap());

    assert!(logs.contains("evaluate"));
    assert!(logs.contains("requests=1"));
    assert!(logs.contains("traversal complete"));
}

#[test]
fn every_pulled_element_is_traced() {
    let (_, logs) = capture(|| vec![1, 2, 3].request(count()).evaluate().unwrap());

    assert_eq!(logs.matches("dispatching element").count(), 3);
}

#[test]
fn request_fault_is_logged_with_position() {
    let (result, logs) = capture(|| {
        vec![1, 2, 3]
            .request(count())
            .and(try_any(|x: &i32| {
                if *x == 2 {
                    Err("bad element")
                } else {
                    Ok(false)
                }
            }))
            .evaluate()
    });

    assert!(result.is_err());
    assert!(logs.contains("request faulted during traversal"));
    assert!(logs.contains("position=2"));
    assert!(logs.contains("element=2"));
}
