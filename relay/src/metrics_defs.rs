//! Metrics emitted by the relay.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::counter!($def.name $(, $label => $value)*)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $label:expr => $value:expr)* $(,)?) => {
        metrics::histogram!($def.name $(, $label => $value)*)
    };
}

pub const RELAY_REQUESTS: MetricDef = MetricDef {
    name: "relay.requests",
    metric_type: MetricType::Counter,
    description: "Relay calls handled. Tagged with outcome.",
};

pub const UPSTREAM_DURATION: MetricDef = MetricDef {
    name: "relay.upstream.duration",
    metric_type: MetricType::Histogram,
    description: "Time spent waiting on the webhook in seconds",
};

pub const ALL_METRICS: &[MetricDef] = &[RELAY_REQUESTS, UPSTREAM_DURATION];

/// Registers descriptions with whatever recorder is installed.
pub fn describe_all() {
    for def in ALL_METRICS {
        match def.metric_type {
            MetricType::Counter => metrics::describe_counter!(def.name, def.description),
            MetricType::Histogram => metrics::describe_histogram!(def.name, def.description),
        }
    }
}
