use clap::Parser;
use serde::{Deserialize, Serialize};

/**
 * Default location of the OECD meat consumption source.
 */
pub const DEFAULT_MEAT_SOURCE: &str = "https://raw.githubusercontent.com/peterphung2043/CUNY_DATA_608/master/Final%20Project/data/world_meat_consumption.csv";

/**
 * Default location of the World Bank GDP per capita source.
 */
pub const DEFAULT_GDP_SOURCE: &str = "https://raw.githubusercontent.com/peterphung2043/CUNY_DATA_608/master/Final%20Project/data/gdp_data.csv";

/**
 * Rows past this point in the GDP source are footer and metadata.
 */
pub const DEFAULT_GDP_ROW_LIMIT: usize = 266;

/**
 * Marker the GDP source uses for a missing value.
 */
pub const DEFAULT_MISSING_VALUE_SENTINEL: &str = "..";

/**
 * Command-line arguments for the application.
 */
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ApplicationArguments {
    /**
     * Path to the configuration file. Built-in defaults are used when absent.
     */
    #[arg(short, long)]
    pub config_file: Option<String>,
}

/**
 * Represents the configuration for the application.
 */
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /**
     * Logging configuration for the application.
     */
    pub logging: LoggingConfig,
    /**
     * Server configuration for the application.
     */
    pub server: Server,
    /**
     * Locations and layout of the two data sources.
     */
    pub sources: Sources,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /**
     * Whether to log the target of the log message.
     */
    pub target: bool,
    /**
     * Whether to log thread IDs .
     */
    pub thread_ids: bool,
    /**
     * Whether to log thread names.
     */
    pub thread_names: bool,
    /**
     * Whether to log line numbers.
     */
    pub line_number: bool,
    /**
     * Whether to log the log level.
     */
    pub level: bool,
    /**
     * Whether to use ANSI colors in logs.
     */
    pub ansi: bool,
    /**
     * Whether to also append logs to `logfile`.
     */
    pub file: bool,
    /**
     * Path to the log file.
     */
    pub logfile: String,
    /**
     * Additional directives for logging configuration.
     */
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            target: true,
            thread_ids: false,
            thread_names: false,
            line_number: false,
            level: true,
            ansi: true,
            file: false,
            logfile: "/tmp/meat_gdp_dashboard.log".to_string(),
            directives: vec![],
        }
    }
}

/**
 * Represents the server configuration for the application.
 */
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    /**
     * Number of worker threads for the server.
     */
    pub workers: usize,
    /**
     * HTTP port for the server.
     */
    pub http_port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Server { workers: 1, http_port: 8000 }
    }
}

/**
 * Where the two sources live and how the GDP source is laid out.
 * A source is either a local path or an http(s) URL.
 */
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sources {
    pub meat_source: String,
    pub gdp_source: String,
    pub gdp_row_limit: usize,
    pub missing_value_sentinel: String,
}

impl Default for Sources {
    fn default() -> Self {
        Sources {
            meat_source: DEFAULT_MEAT_SOURCE.to_string(),
            gdp_source: DEFAULT_GDP_SOURCE.to_string(),
            gdp_row_limit: DEFAULT_GDP_ROW_LIMIT,
            missing_value_sentinel: DEFAULT_MISSING_VALUE_SENTINEL.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            logging: LoggingConfig { directives: vec!["actix_web=warn".to_string()], ..LoggingConfig::default() },
            server: Server { workers: 2, http_port: 8080 },
            sources: Sources { meat_source: "./data/meat.csv".to_string(), ..Sources::default() },
        };
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.logging.target, deserialized.logging.target);
        assert_eq!(config.logging.ansi, deserialized.logging.ansi);
        assert_eq!(config.logging.logfile, deserialized.logging.logfile);
        assert_eq!(config.logging.directives, deserialized.logging.directives);
        assert_eq!(config.server.workers, deserialized.server.workers);
        assert_eq!(config.server.http_port, deserialized.server.http_port);
        assert_eq!(deserialized.sources.meat_source, "./data/meat.csv");
        assert_eq!(deserialized.sources.gdp_source, DEFAULT_GDP_SOURCE);
        assert_eq!(deserialized.sources.gdp_row_limit, 266);
        assert_eq!(deserialized.sources.missing_value_sentinel, "..");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let deserialized: Config = toml::from_str("[server]\nhttpPort = 9000\n").unwrap();
        assert_eq!(deserialized.server.http_port, 9000);
        assert_eq!(deserialized.server.workers, 1);
        assert_eq!(deserialized.sources.meat_source, DEFAULT_MEAT_SOURCE);
        assert!(!deserialized.logging.file);
    }

    #[test]
    fn test_source_keys_are_camel_case() {
        let deserialized: Config = toml::from_str("[sources]\ngdpSource = \"gdp.csv\"\ngdpRowLimit = 10\nmissingValueSentinel = \"NA\"\n").unwrap();
        assert_eq!(deserialized.sources.gdp_source, "gdp.csv");
        assert_eq!(deserialized.sources.gdp_row_limit, 10);
        assert_eq!(deserialized.sources.missing_value_sentinel, "NA");
    }
}
