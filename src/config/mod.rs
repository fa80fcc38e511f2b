use serde::Deserialize;

/// Response body encoding for property reads and action results.
///
/// `Json` serializes scalars as JSON text, `Text` writes the bare
/// primitive. Both presentation variants of the calculator are served by
/// the same handlers behind this switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseEncoding {
    #[default]
    Json,
    Text,
}

impl ResponseEncoding {
    /// Parse from a config/env string ("json" or "text")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" | "plain" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Complete thing server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThingConfig {
    /// Thing name, used as the base path of every route
    #[serde(default = "default_thing_name")]
    pub thing_name: String,
    /// Hostname advertised in the Thing Description (the listener always
    /// binds all interfaces)
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the thing model template JSON
    #[serde(default = "default_template_path")]
    pub template_path: String,
    #[serde(default)]
    pub encoding: ResponseEncoding,
}

fn default_thing_name() -> String {
    "http-calculator".to_string()
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_template_path() -> String {
    "things/calculator.tm.json".to_string()
}

impl Default for ThingConfig {
    fn default() -> Self {
        Self {
            thing_name: default_thing_name(),
            hostname: default_hostname(),
            port: default_port(),
            template_path: default_template_path(),
            encoding: ResponseEncoding::default(),
        }
    }
}

impl ThingConfig {
    /// Apply env var overrides on top of file/default values.
    ///
    /// `TM_PATH` keeps its historical name; the rest are prefixed.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("TM_PATH") {
            self.template_path = v;
        }
        if let Ok(v) = std::env::var("WOT_THING_NAME") {
            self.thing_name = v;
        }
        if let Ok(v) = std::env::var("WOT_HOSTNAME") {
            self.hostname = v;
        }
        if let Ok(v) = std::env::var("WOT_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.port = n;
            }
        }
        if let Ok(v) = std::env::var("WOT_RESPONSE_ENCODING") {
            if let Some(e) = ResponseEncoding::parse(&v) {
                self.encoding = e;
            }
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<ThingConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ThingConfig = toml::from_str(&contents)?;
    Ok(config)
}
