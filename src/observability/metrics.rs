use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub order_transitions_total: IntCounterVec,
    pub order_events_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")
                .expect("valid orders_created_total metric");

        let order_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_transitions_total",
                "Order status transitions by target status",
            ),
            &["status"],
        )
        .expect("valid order_transitions_total metric");

        let order_events_total = IntCounter::new(
            "order_events_total",
            "Total notification events emitted",
        )
        .expect("valid order_events_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(order_events_total.clone()))
            .expect("register order_events_total");

        Self {
            registry,
            orders_created_total,
            order_transitions_total,
            order_events_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
