use std::{fs, path::Path};

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{LoggingConfig, TokenAuthConfig};
use crate::result::{AResult, AResultHelper};

/// Environment variable pointing at a TOML configuration file
pub const TESSERA_CONF: &str = "TESSERA_CONF";

#[derive(Args, Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClapConfig {
    #[clap(flatten)]
    pub token_auth: TokenAuthConfig,

    #[clap(flatten)]
    pub logging: LoggingConfig,
}

impl ClapConfig {
    /// Read the configuration from a TOML file.
    ///
    /// Missing sections and keys take their default values.
    pub fn load_from_file(path: &Path) -> AResult<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read the configuration file {}", path.display()))?;
        Ok(toml::from_str(&content)?)
    }
}
