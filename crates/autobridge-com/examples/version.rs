//! Verification example: activate the configured component and print its version.
//! Reads AUTOBRIDGE_COMPONENT / AUTOBRIDGE_HELPER_MODULE / AUTOBRIDGE_COMPONENT_MODULE.
//!
//! Usage: cargo run -p autobridge-com --example version

fn main() {
    #[cfg(windows)]
    {
        tracing_subscriber::fmt::init();
        let _apartment = match autobridge_com::Apartment::single_threaded() {
            Ok(a) => a,
            Err(status) => {
                eprintln!("CoInitializeEx failed: {}", status);
                std::process::exit(1);
            }
        };
        let config = autobridge_core::BridgeConfig::from_env();
        let bridge = autobridge_com::bridge_from_config(&config);
        if let Err(e) = bridge.handle().check() {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        println!("Component {} version: {}", config.component, bridge.ver_s());
    }
    #[cfg(not(windows))]
    {
        println!("version is only supported on Windows.");
        std::process::exit(1);
    }
}
