//! `qlens config` -- display resolved configuration.
//!
//! # Examples
//!
//! ```text
//! qlens config show
//! qlens config show --config demos/quotelens.json
//! ```

use quotelens_types::config::Config;

/// Display the resolved configuration as formatted JSON.
pub fn config_show(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
