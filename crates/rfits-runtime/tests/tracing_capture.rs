#![forbid(unsafe_code)]

//! Log capture for the session and dispatch paths.
//!
//! Installs a recording layer, drives a session, and checks that the
//! documented spans and warnings are emitted with their structured fields.
//!
//! Run:
//!   cargo test -p rfits-runtime --test tracing_capture

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rfits_harness::{RecordingSink, ScriptedSource, fixtures};
use rfits_runtime::{FileSelection, RenderDispatcher, ViewerSession};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    parent_name: Option<String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn warnings(&self, target: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == tracing::Level::WARN && e.target == target)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|pid| ctx.span(pid))
            .map(|span_ref| span_ref.name().to_string());
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
            parent_span_name,
        });
    }
}

fn with_captured<F: FnOnce()>(f: F) -> CaptureHandle {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn loaded_session() -> (
    ViewerSession<ScriptedSource, RenderDispatcher<RecordingSink>>,
    RecordingSink,
) {
    let (lo, hi) = fixtures::U16_RANGE;
    let source = ScriptedSource::loaded(fixtures::uniform(lo, hi, 100).unwrap());
    let recorder = RecordingSink::new();
    let session = ViewerSession::new(source, RenderDispatcher::new(recorder.clone()));
    (session, recorder)
}

#[test]
fn load_dispatches_inside_session_span() {
    let handle = with_captured(|| {
        let (mut session, _recorder) = loaded_session();
        session.load_stats().unwrap();
    });

    let spans = handle.spans();
    let load = spans.iter().find(|s| s.name == "session.load");
    assert!(load.is_some(), "missing session.load in {spans:?}");
    for name in ["dispatch.view", "dispatch.stretch"] {
        let span = spans
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("missing {name}"));
        assert_eq!(span.parent_name.as_deref(), Some("session.load"));
    }

    let loaded = handle
        .events()
        .into_iter()
        .find(|e| e.message == "image loaded")
        .expect("image loaded event");
    assert_eq!(loaded.target, "rfits.session");
    assert_eq!(loaded.fields.get("max").map(String::as_str), Some("65535.0"));
}

#[test]
fn renderer_failure_is_logged_not_raised() {
    let handle = with_captured(|| {
        let (mut session, recorder) = loaded_session();
        session.load_stats().unwrap();
        recorder.set_failing(true);
        assert_eq!(session.set_stretch_max(1000.0), Ok(true));
        assert_eq!(session.notice(), None);
    });

    let warnings = handle.warnings("rfits.dispatch");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    let w = &warnings[0];
    assert_eq!(w.message, "renderer rejected command");
    assert_eq!(w.fields.get("channel").map(String::as_str), Some("stretch"));
    assert_eq!(
        w.fields.get("error").map(String::as_str),
        Some("renderer unavailable")
    );
    assert_eq!(w.parent_span_name.as_deref(), Some("dispatch.stretch"));
}

#[test]
fn failed_open_warns_with_path() {
    let handle = with_captured(|| {
        let (mut session, _recorder) = loaded_session();
        let missing = PathBuf::from("missing.fits");
        assert!(session.open_file(FileSelection::Path(missing)).is_err());
        assert!(session.notice().is_some());
    });

    let warnings = handle.warnings("rfits.session");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert_eq!(warnings[0].message, "failed to open FITS file");
    assert_eq!(
        warnings[0].fields.get("path").map(String::as_str),
        Some("missing.fits")
    );
    assert_eq!(
        warnings[0].parent_span_name.as_deref(),
        Some("session.open_file")
    );
}
