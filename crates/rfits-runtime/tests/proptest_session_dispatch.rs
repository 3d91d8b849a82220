//! Property-based tests for session-to-renderer dispatch.
//!
//! 1. **One command per change**: for any mix of pointer, wheel, slider and
//!    reset input, the renderer receives exactly one view command for every
//!    operation that reported a view change, and none otherwise.
//! 2. **Renderer agrees**: the last view command equals the session's view.
//! 3. **Coalesced batches**: `handle_batch` with coalescing on sends one view
//!    command per change it reports.

use proptest::prelude::*;
use rfits_backend::ViewCommand;
use rfits_core::event::{Event, WheelEvent};
use rfits_harness::{RecordingSink, ScriptedSource};
use rfits_runtime::{CommandDispatch, DispatchConfig, RenderDispatcher, ViewerConfig, ViewerSession};

#[derive(Debug, Clone)]
enum Input {
    Event(Event),
    Slider(f64),
    Reset,
}

fn event_strategy() -> impl Strategy<Value = Event> {
    let coord = || -2000.0f64..2000.0;
    prop_oneof![
        2 => (coord(), coord()).prop_map(|(x, y)| Event::down(x, y)),
        8 => (coord(), coord()).prop_map(|(x, y)| Event::moved(x, y)),
        2 => (coord(), coord()).prop_map(|(x, y)| Event::up(x, y)),
        1 => (coord(), coord()).prop_map(|(x, y)| Event::leave(x, y)),
        4 => prop_oneof![Just(120.0f64), Just(-120.0f64)].prop_map(Event::wheel),
        1 => (prop_oneof![Just(1.0f64), Just(-1.0f64)], 1u32..100)
            .prop_map(|(d, n)| Event::Wheel(WheelEvent::new(d).with_notches(n))),
        1 => (0.0f64..2000.0, 0.0f64..2000.0).prop_map(|(w, h)| Event::resize(w, h)),
    ]
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        12 => event_strategy().prop_map(Input::Event),
        2 => (-100.0f64..1000.0).prop_map(Input::Slider),
        1 => Just(Input::Reset),
    ]
}

type Session = ViewerSession<ScriptedSource, RenderDispatcher<RecordingSink>>;

fn session(config: ViewerConfig) -> (Session, RecordingSink) {
    let recorder = RecordingSink::new();
    let session = ViewerSession::with_config(
        ScriptedSource::new(),
        RenderDispatcher::new(recorder.clone()),
        config,
    )
    .expect("default-derived config is valid");
    (session, recorder)
}

proptest! {
    #[test]
    fn every_view_change_is_sent_once(inputs in prop::collection::vec(input_strategy(), 0..200)) {
        let (mut s, recorder) = session(ViewerConfig::default());
        s.handle_event(&Event::resize(800.0, 600.0));

        let mut changes = 0usize;
        for input in &inputs {
            let changed = match *input {
                Input::Event(ref event) => s.handle_event(event),
                Input::Slider(pct) => s.set_zoom_percent(pct),
                Input::Reset => s.reset_view(),
            };
            changes += usize::from(changed);
            prop_assert_eq!(recorder.views().len(), changes);
        }

        let stats = s.dispatcher().stats();
        prop_assert_eq!(stats.sent as usize, changes);
        prop_assert_eq!(stats.failed, 0);
        prop_assert!(recorder.stretches().is_empty());
        if changes > 0 {
            prop_assert_eq!(recorder.last_view(), Some(ViewCommand::from(s.view())));
        }
    }

    #[test]
    fn coalesced_batches_send_one_view_per_change(
        events in prop::collection::vec(event_strategy(), 0..200),
    ) {
        let config = ViewerConfig {
            dispatch: DispatchConfig {
                coalesce_input: true,
                ..DispatchConfig::default()
            },
            ..ViewerConfig::default()
        };
        let (mut s, recorder) = session(config);
        s.handle_event(&Event::resize(800.0, 600.0));

        let changes = s.handle_batch(events);
        prop_assert_eq!(recorder.views().len(), changes);
        if changes > 0 {
            prop_assert_eq!(recorder.last_view(), Some(ViewCommand::from(s.view())));
        }
    }
}
