//! Advisory progress notifications emitted while a map is being generated.
//!
//! Messages are best-effort: a sink may drop them, and nothing in generation
//! depends on a message having been delivered.

use std::sync::mpsc::Sender;

pub trait ProgressSink {
    fn report(&mut self, message: String);
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl ProgressSink for Silent {
    fn report(&mut self, _message: String) {}
}

impl ProgressSink for Vec<String> {
    fn report(&mut self, message: String) {
        self.push(message);
    }
}

impl ProgressSink for Sender<String> {
    fn report(&mut self, message: String) {
        // A hung-up receiver only means nobody is watching any more.
        let _ = self.send(message);
    }
}

impl<P: ProgressSink + ?Sized> ProgressSink for &mut P {
    fn report(&mut self, message: String) {
        (**self).report(message);
    }
}

pub struct FnSink<F>(F);

impl<F: FnMut(&str)> ProgressSink for FnSink<F> {
    fn report(&mut self, message: String) {
        (self.0)(&message);
    }
}

/// Adapts a closure into a sink.
pub fn from_fn<F: FnMut(&str)>(callback: F) -> FnSink<F> {
    FnSink(callback)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn channel_sink_survives_a_dropped_receiver() {
        let (mut sender, receiver) = mpsc::channel();
        sender.report("first".to_string());
        assert_eq!(receiver.recv().ok().as_deref(), Some("first"));
        drop(receiver);
        sender.report("nobody listens".to_string());
    }

    #[test]
    fn closure_sink_sees_messages_in_order() {
        let mut seen = Vec::new();
        {
            let mut sink = from_fn(|message: &str| seen.push(message.len()));
            sink.report("ab".to_string());
            sink.report("abcd".to_string());
        }
        assert_eq!(seen, vec![2, 4]);
    }
}
