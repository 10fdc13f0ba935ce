use crate::transport::{Endpoints, TransportConfig};
use structopt::StructOpt;

/// A program to copy VALORANT player settings from one Riot account to another
#[derive(StructOpt, Debug)]
#[structopt()]
pub struct Args {
    /// Skip TLS certificate verification for every request
    #[structopt(long)]
    pub insecure: bool,

    /// Resolve each Riot host once and send every request to that address
    #[structopt(long)]
    pub pin_dns: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::from_args()
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            endpoints: Endpoints::default(),
            insecure: self.insecure,
            pin_dns: self.pin_dns,
        }
    }
}
