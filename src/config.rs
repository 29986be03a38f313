use clap::Parser;

pub const DEFAULT_ADDR: &str = "127.0.0.1:6379";
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about)]
pub struct Config {
    /// The address to listen on, as host:port
    #[arg(short, long, env = "MINIDIS_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Maximum number of bytes buffered for a single connection while waiting for a complete
    /// command
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Number of framed commands that may wait for execution before readers are held back
    #[arg(long, env = "MINIDIS_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,
}

impl Config {
    pub fn with_addr(addr: impl Into<String>) -> Config {
        Config {
            addr: addr.into(),
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: DEFAULT_ADDR.to_string(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["minidis"]).unwrap();

        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "minidis",
            "--addr",
            "0.0.0.0:7000",
            "--queue-capacity",
            "8",
        ])
        .unwrap();

        assert_eq!(config.addr, "0.0.0.0:7000");
        assert_eq!(config.queue_capacity, 8);
    }
}
