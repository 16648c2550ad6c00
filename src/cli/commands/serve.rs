//! Web server command.

use console::style;

use crate::config::Settings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Starting covid API at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Feed:    {}", style(&settings.feed_url).dim());
    println!("  Regions: {}", style(&settings.wiki_url).dim());
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> 0.0.0.0:8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1:8080
/// - Host and port: "127.0.0.1:3000" -> 127.0.0.1:3000
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok((DEFAULT_HOST.to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
        if port_str.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Invalid port in bind address {:?}", bind);
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), DEFAULT_PORT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("3000").unwrap(),
            ("0.0.0.0".to_string(), 3000)
        );
        assert_eq!(
            parse_bind_address("127.0.0.1").unwrap(),
            ("127.0.0.1".to_string(), 8080)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0:8080").unwrap(),
            ("0.0.0.0".to_string(), 8080)
        );
        assert_eq!(
            parse_bind_address("localhost:9000").unwrap(),
            ("localhost".to_string(), 9000)
        );
    }

    #[test]
    fn test_parse_bind_address_invalid() {
        assert!(parse_bind_address("").is_err());
        assert!(parse_bind_address("localhost:99999").is_err());
    }
}
