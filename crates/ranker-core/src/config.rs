//! 설정 관리.
//!
//! 선택적인 TOML 파일에서 설정을 읽고 `RANKER__SECTION__KEY` 환경 변수로
//! 덮어씁니다. `database.url`이 없으면 `DATABASE_URL`을 사용합니다.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

/// 설정 파일 기본 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// NSE 상장 종목 목록.
pub const DEFAULT_LISTING_URL: &str = "https://archives.nseindia.com/content/equities/EQUITY_L.csv";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// API 키 검사. HTTP 서버에서만 필요합니다.
    #[serde(default)]
    pub auth: AuthConfig,
    /// 재무 데이터 갱신 작업
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 심볼 유니버스 갱신 작업
    #[serde(default)]
    pub universe: UniverseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 요청별 전역 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 풀 연결 획득 타임아웃 (초)
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    /// 시작 시 데이터베이스 연결 최대 시도 횟수
    #[serde(default = "default_connect_attempts")]
    pub connect_max_attempts: u32,
    /// 연결 시도 간 초기 백오프 (밀리초)
    #[serde(default = "default_connect_backoff")]
    pub connect_backoff_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}
fn default_acquire_timeout() -> u64 {
    10
}
fn default_connect_attempts() -> u32 {
    5
}
fn default_connect_backoff() -> u64 {
    500
}

impl DatabaseConfig {
    /// `url`과 기본 풀 설정으로 생성합니다.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            connect_max_attempts: default_connect_attempts(),
            connect_backoff_ms: default_connect_backoff(),
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn connect_backoff(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_ms)
    }
}

/// API 키 검사 설정.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// 키를 담는 요청 헤더
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// 기대하는 키 값
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_name: default_header_name(),
            api_key: empty_secret(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn default_header_name() -> String {
    "X-API-KEY".to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::from(raw))
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            header_name: default_header_name(),
            api_key: SecretString::from(api_key.into()),
        }
    }

    /// 비어 있지 않은 키가 설정되었는지 여부.
    pub fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

/// 재무 데이터 갱신 작업 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// 주기 (초). 기본값 100시간.
    pub interval_secs: u64,
    /// 첫 실행 전 대기 (초)
    pub initial_delay_secs: u64,
    /// 심볼별 조회 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 프로바이더 요청 간 대기 (밀리초)
    pub request_delay_ms: u64,
    /// 비어 있지 않으면 유니버스 대신 이 목록으로 갱신
    pub symbols: Vec<String>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 100 * 60 * 60,
            initial_delay_secs: 60,
            fetch_timeout_secs: 30,
            request_delay_ms: 250,
            symbols: Vec::new(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 유니버스 갱신 작업 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// 주기 (초). 기본값 24시간.
    pub interval_secs: u64,
    /// 첫 실행 전 대기 (초)
    pub initial_delay_secs: u64,
    /// 거래소 상장 목록 CSV
    pub listing_url: String,
    /// 상장 심볼에 붙이는 접미사
    pub symbol_suffix: String,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            interval_secs: 24 * 60 * 60,
            initial_delay_secs: 5,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            symbol_suffix: ".NS".to_string(),
        }
    }
}

impl UniverseConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 레벨 필터
    pub level: String,
    /// 출력 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일(선택)과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("auth.header_name", default_header_name())?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_default("database.url", url)?;
        }

        let config = builder
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("RANKER")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("refresh.symbols"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 스케줄러를 멈추게 하거나 모든 조회를 타임아웃시키는 값을 거부합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let positive = [
            ("refresh.interval_secs", self.refresh.interval_secs),
            ("refresh.fetch_timeout_secs", self.refresh.fetch_timeout_secs),
            ("universe.interval_secs", self.universe.interval_secs),
            ("server.request_timeout_secs", self.server.request_timeout_secs),
        ];

        for (key, value) in positive {
            if value == 0 {
                return Err(config::ConfigError::Message(format!(
                    "{key} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// [`DEFAULT_CONFIG_PATH`]에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let refresh = RefreshConfig::default();
        assert_eq!(refresh.interval(), Duration::from_secs(360_000));
        assert!(refresh.symbols.is_empty());

        let universe = UniverseConfig::default();
        assert_eq!(universe.interval(), Duration::from_secs(86_400));
        assert_eq!(universe.symbol_suffix, ".NS");

        assert!(!AuthConfig::default().is_configured());
        assert!(AuthConfig::new("k").is_configured());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("ranker-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ranker.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[database]
url = "postgres://localhost/stocks"

[auth]
api_key = "secret-key"

[refresh]
fetch_timeout_secs = 5
symbols = ["TCS.NS", "INFY.NS"]
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.database.url, "postgres://localhost/stocks");
        assert_eq!(config.auth.header_name, "X-API-KEY");
        assert_eq!(config.auth.api_key.expose_secret(), "secret-key");
        assert_eq!(config.refresh.fetch_timeout_secs, 5);
        assert_eq!(config.refresh.symbols, vec!["TCS.NS", "INFY.NS"]);
        assert_eq!(config.server.port, 5000);

        std::fs::remove_dir_all(&dir).ok();
    }

    fn load_snippet(name: &str, body: &str) -> Result<AppConfig, config::ConfigError> {
        let dir = std::env::temp_dir().join(format!("ranker-config-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ranker.toml");
        std::fs::write(
            &path,
            format!("[database]\nurl = \"postgres://localhost/stocks\"\n\n{body}"),
        )
        .unwrap();

        let result = AppConfig::load(&path);
        std::fs::remove_dir_all(&dir).ok();
        result
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let err = load_snippet("universe", "[universe]\ninterval_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("universe.interval_secs"));

        let err = load_snippet("refresh", "[refresh]\ninterval_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("refresh.interval_secs"));

        let err = load_snippet("timeout", "[refresh]\nfetch_timeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("refresh.fetch_timeout_secs"));

        assert!(load_snippet("ok", "[refresh]\ninterval_secs = 1\n").is_ok());
    }
}
