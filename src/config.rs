use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "QUANT_STREAM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub strategy: StrategyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    /// Sleep between two streamed records, e.g. "10ms".
    pub pacing: String,
    /// Idle receive timeout per connection, e.g. "500s".
    pub recv_timeout: String,
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9999,
            data_file: PathBuf::from("QQQ.csv"),
            pacing: "10ms".to_string(),
            recv_timeout: "500s".to_string(),
            max_frame_bytes: 4096,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn pacing(&self) -> Result<Duration> {
        parse_duration(&self.pacing)
    }

    pub fn recv_timeout(&self) -> Result<Duration> {
        parse_duration(&self.recv_timeout)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub initial_capital: f64,
    pub max_frame_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9999,
            initial_capital: 1e6,
            max_frame_bytes: 4096,
        }
    }
}

impl ClientConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum StrategyKind {
    CrossoverMa,
    Momentum,
    BollingerBands,
    MeanReversion,
    Macd,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::CrossoverMa,
        StrategyKind::Momentum,
        StrategyKind::BollingerBands,
        StrategyKind::MeanReversion,
        StrategyKind::Macd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::CrossoverMa => "crossover_ma",
            StrategyKind::Momentum => "momentum",
            StrategyKind::BollingerBands => "bollinger_bands",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Macd => "macd",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let kind = match key.as_str() {
            "crossoverma" | "crossover" | "ma" => StrategyKind::CrossoverMa,
            "momentum" => StrategyKind::Momentum,
            "bollingerbands" | "bollinger" => StrategyKind::BollingerBands,
            "meanreversion" | "meanreversionstrategy" => StrategyKind::MeanReversion,
            "macd" | "macdstrategy" => StrategyKind::Macd,
            _ => bail!(
                "unknown strategy '{}', expected one of crossover_ma/momentum/bollinger_bands/mean_reversion/macd",
                s
            ),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for StrategyKind {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    /// Share of capital committed by a single Buy.
    pub fraction: f64,
    pub crossover_ma: CrossoverMaConfig,
    pub momentum: MomentumConfig,
    pub bollinger_bands: BandConfig,
    pub mean_reversion: BandConfig,
    pub macd: MacdConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: StrategyKind::CrossoverMa,
            fraction: 0.1,
            crossover_ma: CrossoverMaConfig::default(),
            momentum: MomentumConfig::default(),
            bollinger_bands: BandConfig::default(),
            mean_reversion: BandConfig::default(),
            macd: MacdConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrossoverMaConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverMaConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub lookback: usize,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            lookback: 50,
            buy_threshold: 0.05,
            sell_threshold: -0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub signal_window: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            short_window: 12,
            long_window: 26,
            signal_window: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub server_file: PathBuf,
    pub client_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            server_file: PathBuf::from("server.log"),
            client_file: PathBuf::from("client.log"),
        }
    }
}

/// Parse a duration such as "10ms", "2s", "5m", "1h".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let split_at = s
        .find(|c: char| !c.is_ascii_digit())
        .with_context(|| format!("invalid duration '{}': missing unit (ms/s/m/h)", s))?;
    let (num_str, unit) = s.split_at(split_at);
    if num_str.is_empty() {
        bail!("invalid duration '{}': expected format like '10ms'", s);
    }
    let n: u64 = num_str
        .parse()
        .with_context(|| format!("invalid duration '{}': quantity must be a positive integer", s))?;
    if n == 0 {
        bail!("invalid duration '{}': quantity must be > 0", s);
    }

    let unit_ms: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => bail!(
            "invalid duration '{}': unsupported unit '{}', expected one of ms/s/m/h",
            s,
            unit
        ),
    };

    n.checked_mul(unit_ms)
        .map(Duration::from_millis)
        .with_context(|| format!("invalid duration '{}': value is too large", s))
}

impl Config {
    /// Load `.env`, then the TOML file named by `QUANT_STREAM_CONFIG`
    /// (falling back to built-in defaults when the default path is absent),
    /// then environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_path(Path::new(&path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load_from_path(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("QUANT_STREAM_HOST") {
            self.server.host = host.clone();
            self.client.host = host;
        }
        if let Ok(port) = std::env::var("QUANT_STREAM_PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("QUANT_STREAM_PORT '{}' is not a valid port", port))?;
            self.server.port = port;
            self.client.port = port;
        }
        if let Ok(kind) = std::env::var("QUANT_STREAM_STRATEGY") {
            self.strategy.kind = kind.parse().context("QUANT_STREAM_STRATEGY is invalid")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.server.pacing().context("server.pacing is invalid")?;
        self.server
            .recv_timeout()
            .context("server.recv_timeout is invalid")?;
        if self.server.max_frame_bytes == 0 || self.client.max_frame_bytes == 0 {
            bail!("max_frame_bytes must be > 0");
        }
        if !self.client.initial_capital.is_finite() {
            bail!("client.initial_capital must be finite");
        }

        let s = &self.strategy;
        if !(s.fraction > 0.0 && s.fraction <= 1.0) {
            bail!("strategy.fraction must be in (0, 1], got {}", s.fraction);
        }
        let windows = [
            ("crossover_ma.short_window", s.crossover_ma.short_window),
            ("crossover_ma.long_window", s.crossover_ma.long_window),
            ("momentum.lookback", s.momentum.lookback),
            ("bollinger_bands.period", s.bollinger_bands.period),
            ("mean_reversion.period", s.mean_reversion.period),
            ("macd.short_window", s.macd.short_window),
            ("macd.long_window", s.macd.long_window),
            ("macd.signal_window", s.macd.signal_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                bail!("strategy.{} must be > 0", name);
            }
        }
        if s.momentum.sell_threshold > s.momentum.buy_threshold {
            bail!("strategy.momentum.sell_threshold must not exceed buy_threshold");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_valid() {
        assert_eq!(parse_duration("10ms").unwrap(), Duration::from_millis(10));
        assert_eq!(parse_duration("500s").unwrap(), Duration::from_secs(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration(" 1h ").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn parse_duration_rejects_invalid_inputs() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("99999999999999999999ms").is_err());
    }

    #[test]
    fn strategy_kind_accepts_class_style_names() {
        assert_eq!("CrossOverMA".parse::<StrategyKind>().unwrap(), StrategyKind::CrossoverMa);
        assert_eq!(
            "MeanReversionStrategy".parse::<StrategyKind>().unwrap(),
            StrategyKind::MeanReversion
        );
        assert_eq!("MACDStrategy".parse::<StrategyKind>().unwrap(), StrategyKind::Macd);
        assert_eq!(
            "bollinger-bands".parse::<StrategyKind>().unwrap(),
            StrategyKind::BollingerBands
        );
        assert!("rsi".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn strategy_kind_labels_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.as_str().parse::<StrategyKind>().unwrap(), kind);
        }
    }
}
