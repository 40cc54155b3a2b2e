//! config-rs/lib.rs
//! Shared configuration utilities for consistent service configuration
//! Provides standardized functions for port/address management

use std::env;
use std::net::SocketAddr;

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ANALYZER")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// The port number to use for the service
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    match env::var(&var_name).ok().and_then(|v| v.parse::<u16>().ok()) {
        Some(port) => port,
        None => {
            if env::var(&var_name).is_ok() {
                log::warn!("Invalid port in {}, using default {}", var_name, default_port);
            }
            default_port
        }
    }
}

/// Create a SocketAddr for binding a service
///
/// Honors a full address override in `<SERVICE>_SERVICE_ADDR` (with or without
/// an http:// scheme prefix), then falls back to the port-only override.
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "ANALYZER")
/// * `default_port` - The default port to use if not specified in environment
///
/// # Returns
/// A SocketAddr configured with the appropriate bind address and port
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        // Accept both "host:port" and "http(s)://host:port" forms
        let trimmed = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);

        if let Ok(addr) = trimmed.parse::<SocketAddr>() {
            return addr;
        }
        log::warn!("Invalid address format in {}, using default", var_name);
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_service_port() {
        // Test with environment variable
        std::env::set_var("TESTPORT_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("TESTPORT", 8090), 9000);

        // Invalid value falls back to default
        std::env::set_var("TESTPORT_SERVICE_PORT", "not-a-port");
        assert_eq!(get_service_port("TESTPORT", 8090), 8090);

        // Test with default
        std::env::remove_var("TESTPORT_SERVICE_PORT");
        assert_eq!(get_service_port("TESTPORT", 8090), 8090);
    }

    #[test]
    fn test_get_bind_address() {
        // Full address override
        std::env::set_var("TESTBIND_SERVICE_ADDR", "127.0.0.1:9100");
        assert_eq!(
            get_bind_address("TESTBIND", 8090),
            "127.0.0.1:9100".parse::<SocketAddr>().unwrap()
        );

        // Scheme-prefixed override
        std::env::set_var("TESTBIND_SERVICE_ADDR", "http://127.0.0.1:9101");
        assert_eq!(
            get_bind_address("TESTBIND", 8090),
            "127.0.0.1:9101".parse::<SocketAddr>().unwrap()
        );

        // Default binds all interfaces on the default port
        std::env::remove_var("TESTBIND_SERVICE_ADDR");
        std::env::remove_var("TESTBIND_SERVICE_PORT");
        assert_eq!(
            get_bind_address("TESTBIND", 8090),
            "0.0.0.0:8090".parse::<SocketAddr>().unwrap()
        );
    }
}
