//! Dispatch server with the registrar and two echo handlers
//!
//! Run with: cargo run --example dispatcher [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example dispatcher                    # binds to 0.0.0.0:10842
//!   cargo run --example dispatcher localhost          # binds to 127.0.0.1:10842
//!   cargo run --example dispatcher 127.0.0.1:10843    # binds to 127.0.0.1:10843
//!
//! ## Echo
//!
//!   printf 'echo\nhello\n' | nc -q1 localhost 10842
//!
//! ## Rendezvous
//!
//! Terminal 1 registers itself as `callback` and waits:
//!   (printf 'sha256:c17dcddbc7b307ab652109d2c1a01fdd53890dffcbce3215da41d8104e551b0b\na callback\n'; cat) | nc localhost 10842
//!
//! Terminal 2 reaches terminal 1 through the server:
//!   (printf 'callback\n'; cat) | nc localhost 10842

use std::net::SocketAddr;

use pup_rs::protocol::constants::DEFAULT_PORT;
use pup_rs::{DispatchServer, Handler, ServerConfig};

/// Parse bind address from command line argument
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:10842
/// - "localhost:10843" -> 127.0.0.1:10843
/// - "127.0.0.1" -> 127.0.0.1:10842
/// - "0.0.0.0:10842" -> 0.0.0.0:10842
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: dispatcher [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:{})", DEFAULT_PORT);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  dispatcher                     # binds to 0.0.0.0:10842");
    eprintln!("  dispatcher localhost           # binds to 127.0.0.1:10842");
    eprintln!("  dispatcher 127.0.0.1:10843     # binds to 127.0.0.1:10843");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pup_rs=debug".parse()?)
                .add_directive("dispatcher=debug".parse()?),
        )
        .init();

    let server = DispatchServer::new(config);
    server.register("echo", Handler::EchoContent).await;
    server.register("hash", Handler::EchoHash).await;

    println!("Starting dispatch server on {}", server.bind_addr());
    println!();
    println!("=== Registrations ===");
    for registration in server.registrations().await {
        println!("{:<12} {}", registration.handler.kind(), registration.hash);
    }
    println!();

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("Failed to listen for Ctrl+C: {}", e);
            }
            println!("\nShutting down...");
        })
        .await?;

    let stats = server.stats();
    println!(
        "Stats: connections={} dispatched={} not_found={} failures={} registrations={} proxied_bytes={}",
        stats.connections_accepted,
        stats.dispatched,
        stats.not_found,
        stats.handler_failures,
        stats.registrations,
        stats.proxied_bytes,
    );

    Ok(())
}
