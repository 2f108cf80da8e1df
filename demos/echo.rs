//! A stateful client for a public WebSocket echo service.
//!
//! Run with logging enabled:
//! ```sh
//! RUST_LOG=debug cargo run --example echo --features tracing
//! ```

use ws_endpoint::{Command, Endpoint, HeaderMap, State};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut endpoint = Endpoint::new("wss://echo.websocket.org/", HeaderMap::new())?;
    println!("URL:   {}", endpoint.url());

    loop {
        tokio::select! {
            status = endpoint.status.recv() => {
                let Some(status) = status else { break };
                println!("STATE: {}", status.state);
                if let Some(error) = &status.error {
                    println!("ERROR: {error}");
                }
                match status.state {
                    State::Connected => {
                        let message = "test message";
                        endpoint.outbound.send(message.as_bytes().to_vec()).await?;
                        println!("SENT:  {message}");
                    }
                    State::Disconnected if status.error.is_none() => break,
                    _ => {}
                }
            }
            Some(payload) = endpoint.inbound.recv() => {
                println!("RECV:  {}", String::from_utf8_lossy(&payload));
                endpoint.command.send(Command::Quit).await?;
            }
        }
    }
    Ok(())
}
