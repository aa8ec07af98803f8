use crate::utils::config::{Chain, SCHEMA_VERSION};

/// Display version information
pub fn display_version() {
    println!("opcode-gas-scan v{}", env!("CARGO_PKG_VERSION"));
    println!("Snapshot Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Per-opcode gas statistics from EVM struct-log traces.");
    println!(
        "Chains: {}, {} (endpoints via {} / {})",
        Chain::Base,
        Chain::Optimism,
        Chain::Base.endpoint_env_var(),
        Chain::Optimism.endpoint_env_var()
    );
}
