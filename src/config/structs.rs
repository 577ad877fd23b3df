use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::CurrencyCode;
use crate::errors::PanelError;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，例如 LP__API__BASE_URL
pub const ENV_PREFIX: &str = "LP";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - logging: 日志配置
/// - api: 后端 REST 接口地址与超时
/// - bulk: 批量操作限制
/// - currency: 汇率表与最低提现金额
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LP，分隔符：__
    /// 示例：LP__BULK__MAX_EXPLICIT_IDS=1000
    pub fn load() -> Self {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a given path, falling back to defaults on any error
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from(path.as_ref()) {
            Ok(config) => {
                if path.as_ref().exists() {
                    eprintln!(
                        "[INFO] Configuration loaded from: {}",
                        path.as_ref().display()
                    );
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] {}", e);
                Self::default()
            }
        }
    }

    pub fn try_load_from(path: &Path) -> Result<Self, PanelError> {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::from(path).required(false))
            // 2. 从环境变量覆盖，前缀 LP，分隔符 __
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder
            .build()
            .map_err(|e| PanelError::config(format!("Failed to build config: {}", e)))?;
        let config = settings
            .try_deserialize::<StaticConfig>()
            .map_err(|e| PanelError::config(format!("Failed to deserialize config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), PanelError> {
        if self.bulk.max_explicit_ids == 0 {
            return Err(PanelError::config("bulk.max_explicit_ids must be at least 1"));
        }
        if self.bulk.default_page_size == 0 {
            return Err(PanelError::config("bulk.default_page_size must be at least 1"));
        }
        if self.currency.minimum_withdrawal_usd.is_sign_negative() {
            return Err(PanelError::config(
                "currency.minimum_withdrawal_usd must not be negative",
            ));
        }
        if let Some((code, rate)) = self
            .currency
            .rates
            .iter()
            .find(|(_, rate)| **rate <= Decimal::ZERO)
        {
            return Err(PanelError::config(format!(
                "currency.rates.{} must be positive, got {}",
                code, rate
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 后端 API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

/// 批量操作配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Explicit ID lists larger than this are refused locally
    #[serde(default = "default_max_explicit_ids")]
    pub max_explicit_ids: usize,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

/// 币种配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Units of each currency per 1 USD
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<CurrencyCode, Decimal>,
    #[serde(default = "default_minimum_withdrawal_usd")]
    pub minimum_withdrawal_usd: Decimal,
}

// ============================================================
// Default value functions
// ============================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/admin/v1".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_max_explicit_ids() -> usize {
    5000
}

fn default_page_size() -> u32 {
    crate::filter::DEFAULT_PAGE_SIZE
}

/// Built-in exchange rate table
pub fn default_rates() -> BTreeMap<CurrencyCode, Decimal> {
    [
        (CurrencyCode::Usd, Decimal::ONE),
        (CurrencyCode::Idr, Decimal::from(15_700)),
        (CurrencyCode::Myr, Decimal::new(47, 1)),
        (CurrencyCode::Sgd, Decimal::new(135, 2)),
        (CurrencyCode::Eur, Decimal::new(92, 2)),
        (CurrencyCode::Gbp, Decimal::new(79, 2)),
        (CurrencyCode::Inr, Decimal::from(83)),
        (CurrencyCode::Php, Decimal::from(56)),
    ]
    .into_iter()
    .collect()
}

fn default_minimum_withdrawal_usd() -> Decimal {
    Decimal::TWO
}

// ============================================================
// Default implementations
// ============================================================

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            token: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_explicit_ids: default_max_explicit_ids(),
            default_page_size: default_page_size(),
        }
    }
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            minimum_withdrawal_usd: default_minimum_withdrawal_usd(),
        }
    }
}
