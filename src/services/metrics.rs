use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct MetricsRegistry {
    registry: Registry,
    pub http_requests: IntCounter,
    pub users_registered: IntCounter,
    pub users_activated: IntCounter,
    pub recipes_created: IntCounter,
    pub schedules_created: IntCounter,
}

impl MetricsRegistry {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests =
            IntCounter::new("foodbook_http_requests_total", "HTTP requests handled").unwrap();
        let users_registered =
            IntCounter::new("foodbook_users_registered_total", "Accounts registered").unwrap();
        let users_activated =
            IntCounter::new("foodbook_users_activated_total", "Accounts activated").unwrap();
        let recipes_created =
            IntCounter::new("foodbook_recipes_created_total", "Recipes created").unwrap();
        let schedules_created =
            IntCounter::new("foodbook_schedules_created_total", "Schedules created").unwrap();

        registry.register(Box::new(http_requests.clone())).unwrap();
        registry.register(Box::new(users_registered.clone())).unwrap();
        registry.register(Box::new(users_activated.clone())).unwrap();
        registry.register(Box::new(recipes_created.clone())).unwrap();
        registry.register(Box::new(schedules_created.clone())).unwrap();

        Self {
            registry,
            http_requests,
            users_registered,
            users_activated,
            recipes_created,
            schedules_created,
        }
    }

    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

lazy_static! {
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::new();
}
