// DevGate - demos/two_developers.rs
//
// Two developers share the same call sites; each only sees their own output.
//
// Run with:
//   DEV_ID=alice cargo run --example two_developers
//   DEV_ID=bob   cargo run --example two_developers
//   NODE_ENV=production DEV_ID=alice cargo run --example two_developers

use devgate::{devdebug, deverror, devlog, devwarn, GateConfig};

fn checkout(total: u32) {
    let alice = devgate::create_logger(Some("alice"));
    let bob = devgate::create_logger(Some("bob"));

    devlog!(alice => "checkout total = {total}");
    devwarn!(bob => "discount code path not covered yet");
    if total > 100 {
        deverror!(alice => "total {total} exceeds demo limit");
    }
    devdebug!(bob => "inspecting cart");
}

fn main() {
    let config = GateConfig::load();
    devgate::util::logging::init(false, config.log_level.as_deref());

    if let Err(e) = devgate::init(config) {
        tracing::warn!(error = %e, "DevGate already initialised");
    }

    match devgate::identity_source() {
        Some(resolved) => tracing::info!(
            dev_id = %resolved.value,
            source = %resolved.source,
            "Developer identified"
        ),
        None => tracing::info!("No developer identity; all output suppressed"),
    }

    // Shared call sites: unbound logger output goes to whoever is identified.
    devlog!("starting demo");
    checkout(42);
    checkout(120);
    devgate::trigger_breakpoint();
}
