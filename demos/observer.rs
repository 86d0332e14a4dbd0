//! Scripted demo of the notification hub.
//!
//! This example shows how to:
//! - Register named subscribers
//! - Drive state changes that reach every subscriber in order
//! - Unsubscribe one subscriber and keep notifying the rest
//!
//! Run with: cargo run --example observer
//! Add `RUST_LOG=state_hub=debug` to see the hub's own logging.

use parking_lot::Mutex;
use state_hub::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Prints every state it receives and remembers the latest one.
struct PrintingObserver {
    name: String,
    last_seen: Mutex<String>,
}

impl PrintingObserver {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            last_seen: Mutex::new(String::new()),
        })
    }
}

impl Subscriber<String> for PrintingObserver {
    fn notify(&self, state: &String) -> std::result::Result<(), SubscriberError> {
        *self.last_seen.lock() = state.clone();
        println!("Observer {}: State updated to {}", self.name, state);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let hub: NotificationHub = NotificationHub::new();

    let observer_a = PrintingObserver::new("A");
    let observer_b = PrintingObserver::new("B");

    hub.subscribe(observer_a.clone());
    hub.subscribe(observer_b.clone());

    hub.set_state("State 1".to_string())?;
    hub.set_state("State 2".to_string())?;

    hub.unsubscribe(&observer_a);
    hub.set_state("State 3".to_string())?;

    println!();
    println!("Current state: {}", hub.get_state());
    println!("Observer A last saw: {}", observer_a.last_seen.lock());
    println!("Observer B last saw: {}", observer_b.last_seen.lock());

    Ok(())
}
