#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rfits_core::event::{Event, WheelEvent};
use rfits_core::event_coalescer::EventCoalescer;
use rfits_core::interaction::{InteractionConfig, InteractionMachine, Viewport};
use rfits_core::view::ViewTransform;

#[derive(Debug, Arbitrary)]
enum Input {
    Down(f64, f64),
    Move(f64, f64),
    Up(f64, f64),
    Leave(f64, f64),
    Wheel(f64, u8),
    Resize(f64, f64),
}

impl Input {
    fn event(&self) -> Event {
        match *self {
            Self::Down(x, y) => Event::down(x, y),
            Self::Move(x, y) => Event::moved(x, y),
            Self::Up(x, y) => Event::up(x, y),
            Self::Leave(x, y) => Event::leave(x, y),
            Self::Wheel(dy, n) => Event::Wheel(WheelEvent::new(dy).with_notches(u32::from(n))),
            Self::Resize(w, h) => Event::resize(w, h),
        }
    }
}

fuzz_target!(|inputs: Vec<Input>| {
    let mut machine = InteractionMachine::new(InteractionConfig::default(), Viewport::default());
    let mut view = ViewTransform::default();
    let mut coalescer = EventCoalescer::new();
    let mut ready = Vec::new();

    for input in &inputs {
        coalescer.feed(input.event(), &mut ready);
    }
    ready.extend(coalescer.flush());

    for event in &ready {
        if let Some(delta) = machine.process(event) {
            delta.apply(&mut view);
        }
        let zoom = view.zoom_percent();
        assert!((10.0..=500.0).contains(&zoom), "zoom escaped range: {zoom}");
        let (px, py) = view.pan();
        assert!(!px.is_nan() && !py.is_nan(), "pan became NaN");
    }

    view.reset();
    assert!(view.is_reset());
});
