//! Basic log shipper usage example
//!
//! Demonstrates development-mode mirroring, structured context, scoped
//! fields, a simulated outage and a clean shutdown. Batches go to an
//! in-memory transport so the example runs without an ingestion endpoint.
//!
//! Run with: cargo run --example basic_usage

use log_shipper::prelude::*;
use log_shipper::{info, warn};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Log Shipper - Basic Usage Example ===\n");

    let transport = MemoryTransport::new();

    let logger = Logger::builder()
        .service_name("crm-dashboard")
        .development(true)
        .max_buffer_size(5)
        .flush_interval(Duration::from_secs(2))
        .max_retries(2)
        .retry_delay(Duration::from_millis(200))
        .on_overflow(Arc::new(|count| {
            eprintln!("ALERT: {} logs dropped", count);
        }))
        .transport(transport.clone())
        .build()?;

    println!("1. Logging at different levels:");
    logger.debug("Cache warmed");
    logger.info("Dashboard started");
    logger.warn("Slow response from CRM sync");
    logger.error("Webhook signature mismatch");

    println!("\n2. Structured context:");
    logger.info_with_context(
        "Request handled",
        LogContext::new()
            .with_http("POST", "/api/leads", 201)
            .with_request_id("req-42")
            .with_field("duration_ms", 87),
    );
    info!(logger, "Lead {} assigned to {}", 1042, "sales-team");

    println!("\n3. Scoped fields:");
    {
        let _guard = logger.scoped_field("tenant", "acme");
        warn!(logger, "Quota at {}%", 91);
    }

    println!("\n4. Endpoint outage:");
    transport.fail_next(2);
    logger.info("Queued while the endpoint is down");
    println!("   flush -> {:?}", logger.flush());
    println!("   flush -> {:?}", logger.flush());

    let clean = logger.shutdown();

    println!("\n5. Delivery summary:");
    println!("   batches delivered: {}", transport.batches().len());
    println!("   entries delivered: {}", transport.delivered_entries().len());
    println!("   failed attempts:   {}", logger.metrics().failed_attempts());
    println!("   clean shutdown:    {}", clean);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
