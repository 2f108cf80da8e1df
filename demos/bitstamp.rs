//! Stream live BTC/USD trades from Bitstamp.
//!
//! ```sh
//! cargo run --example bitstamp
//! ```

use ws_endpoint::{Command, Endpoint, HeaderMap, State};

const SUBSCRIBE: &str = r#"{"event":"bts:subscribe","data":{"channel":"live_trades_btcusd"}}"#;
const TRADE_LIMIT: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut endpoint = Endpoint::new("wss://ws.bitstamp.net/", HeaderMap::new())?;
    let mut received = 0_usize;

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
                        // Subscriptions do not survive a reconnect; renew on
                        // every CONNECTED.
                        endpoint.command.send(Command::UseText).await?;
                        endpoint.outbound.send(SUBSCRIBE.as_bytes().to_vec()).await?;
                    }
                    State::Disconnected if status.error.is_none() => break,
                    _ => {}
                }
            }
            Some(payload) = endpoint.inbound.recv() => {
                println!("{}", String::from_utf8_lossy(&payload));
                received += 1;
                if received == TRADE_LIMIT {
                    endpoint.command.send(Command::Quit).await?;
                }
            }
        }
    }
    Ok(())
}
