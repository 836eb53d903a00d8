use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Per-host Markdown content server
#[derive(Debug, Parser)]
#[command(name = "arbor", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:6969")]
    pub listen: String,

    /// Directory holding one site root per hostname
    #[arg(long, default_value = ".")]
    pub sites: PathBuf,

    /// Seconds a parsed template stays fresh; 0 caches forever
    #[arg(long = "template-ttl", default_value_t = 60)]
    pub template_ttl: u64,
}

impl Config {
    /// Template staleness bound; `None` means entries never expire
    pub fn template_max_age(&self) -> Option<Duration> {
        (self.template_ttl > 0).then(|| Duration::from_secs(self.template_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::parse_from(["arbor"]);
        assert_eq!(config.listen, "0.0.0.0:6969");
        assert_eq!(config.sites, PathBuf::from("."));
        assert_eq!(config.template_max_age(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let config = Config::parse_from(["arbor", "--template-ttl", "0"]);
        assert_eq!(config.template_max_age(), None);
    }
}
