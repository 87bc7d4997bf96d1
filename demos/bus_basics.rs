//! Demonstration of topic-based publish/subscribe on the bus

use partyline::{Bus, Message};

fn main() {
    println!("=== Bus Example: Pub/Sub ===\n");

    println!("1. Creating a bus");
    let bus: Bus<Message> = Bus::new();

    println!("\n2. Subscribing two handlers to 'user-login'");
    let audit = bus.on("user-login", |msg: &Message| {
        let user = msg.get("user").and_then(|v| v.as_str()).unwrap_or("?");
        println!("   [audit] login recorded for {user}");
    });
    let greeter = bus.on("user-login", |msg: &Message| {
        let user = msg.get("user").and_then(|v| v.as_str()).unwrap_or("?");
        println!("   [greeter] welcome back, {user}!");
    });

    println!("\n3. Emitting a login event");
    bus.emit("user-login", Message::new().with("user", "brian"));

    println!("\n4. Unsubscribing the greeter");
    greeter.unsubscribe();

    println!("\n5. Emitting again (only the audit handler remains)");
    bus.emit("user-login", Message::new().with("user", "ada"));

    println!("\n6. Emitting with no payload delivers an empty message");
    let shape = bus.on("heartbeat", |msg: &Message| {
        println!("   [heartbeat] body has {} entries", msg.body().len());
    });
    bus.notify("heartbeat");
    shape.unsubscribe();

    println!("\n7. Emitting on a topic nobody subscribed to is a no-op");
    bus.emit("silence", Message::new());
    audit.unsubscribe();

    println!("\n✓ Example complete!");
}
