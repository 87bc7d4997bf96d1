//! Bus-backed store: lazy fields, an event map, and debounced notifications

use std::time::Duration;

use partyline::{Bus, Message, Store};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> partyline::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();

    println!("=== Store Example: Login Flow ===\n");

    println!("1. Building the session store");
    let bus = Bus::new();
    let store = Store::builder("session")
        .field("user", "guest")
        .computed("token", |store| {
            // pretend a token fetch kicks off here
            let store = store.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                store.set("token", "tok-8f2a");
            });
            json!("pending")
        })
        .on("login", |store, msg| {
            if let Some(user) = msg.get("user") {
                store.set("user", user.clone());
            }
        })
        .build(&bus)?;

    println!("\n2. Watching for change notifications");
    let _sub = bus.on(store.change_topic(), |msg: &Message| {
        let store = msg.store().expect("change messages carry the store");
        println!(
            "   [change] user={} token={}",
            store.get("user").unwrap_or(json!("?")),
            store.get("token").unwrap_or(json!("?")),
        );
    });

    println!("\n3. First token read kicks off the fetch");
    println!("   token = {}", store.get("token").unwrap());

    println!("\n4. Logging in over the bus");
    bus.emit("login", Message::new().with("user", "brian"));

    println!("\n5. Three rapid updates coalesce into one notification");
    store.set("attempts", 1);
    store.set("attempts", 2);
    store.set("attempts", 3);

    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("\n6. Final state: {:?}", store.state());

    println!("\n7. Tearing down");
    store.destroy();

    println!("\n✓ Example complete!");
    Ok(())
}
