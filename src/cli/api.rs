use clap::Parser;

use crate::{api::octopus, prelude::*};

#[derive(Parser)]
pub struct ApiArgs {
    #[clap(
        long = "endpoint",
        env = "OCTOPUS_ENDPOINT",
        default_value = "https://api.octopus.energy/",
        global = true
    )]
    endpoint: String,

    /// Account number, for example: `A-1234ABCD`.
    #[clap(long = "account", env = "OCTOPUS_ACCOUNT", global = true)]
    account: Option<String>,

    #[clap(long = "api-key", env = "OCTOPUS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
}

impl ApiArgs {
    pub fn account(&self) -> Result<&str> {
        self.account.as_deref().context("`--account` or `OCTOPUS_ACCOUNT` is required")
    }

    pub fn new_client(&self) -> octopus::Api {
        octopus::Api::new(octopus::Config {
            endpoint: self.endpoint.clone(),
            account: self.account.clone(),
            api_key: self.api_key.clone(),
        })
    }
}
