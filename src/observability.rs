use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("markchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("markchat.client.request_errors");
pub(crate) static CLIENT_MALFORMED_RESPONSES: Counter =
    Counter::new("markchat.client.malformed_responses");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("markchat.client.request_duration_seconds");

pub(crate) static RENDER_INSTANT: Counter = Counter::new("markchat.render.instant");
pub(crate) static RENDER_TYPED: Counter = Counter::new("markchat.render.typed");
pub(crate) static RENDER_CANCELLED: Counter = Counter::new("markchat.render.cancelled");
pub(crate) static RENDER_TICKS: Counter = Counter::new("markchat.render.ticks");

pub(crate) static SESSION_TURNS: Counter = Counter::new("markchat.session.turns");
pub(crate) static SESSION_FAILURES: Counter = Counter::new("markchat.session.failures");
pub(crate) static SESSION_CODE_BLOCKS: Counter = Counter::new("markchat.session.code_blocks");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_MALFORMED_RESPONSES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&RENDER_INSTANT);
    collector.register_counter(&RENDER_TYPED);
    collector.register_counter(&RENDER_CANCELLED);
    collector.register_counter(&RENDER_TICKS);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_FAILURES);
    collector.register_counter(&SESSION_CODE_BLOCKS);
}
