use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 待处理源文件所在目录
    pub input_folder: String,
    /// 输出压缩包路径
    pub output_archive: String,
    /// 命名规则 TOML 文件（为空时使用默认命名规则）
    pub naming_config_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 打包完成后是否清空本批条目
    pub reset_after_package: bool,
    // --- 浏览器配置 ---
    /// 浏览器调试端口（连接已打开的浏览器时使用）
    pub browser_debug_port: u16,
    /// 是否自行启动无头浏览器
    pub browser_headless: bool,
    /// 无头模式下的浏览器可执行文件（为空时由 chromiumoxide 自动查找）
    pub browser_executable: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 节奏控制 ---
    /// 输出生成后到截图前的等待时间（毫秒）
    pub settle_delay_ms: u64,
    /// 两个条目之间的间隔（毫秒）
    pub pacing_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input".to_string(),
            output_archive: "submission.zip".to_string(),
            naming_config_file: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            reset_after_package: false,
            browser_debug_port: 2001,
            browser_headless: true,
            browser_executable: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            settle_delay_ms: 800,
            pacing_delay_ms: 700,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_archive: std::env::var("OUTPUT_ARCHIVE").unwrap_or(default.output_archive),
            naming_config_file: std::env::var("NAMING_CONFIG_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or(default.naming_config_file),
            verbose_logging: env_or("VERBOSE_LOGGING", default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            reset_after_package: env_or("RESET_AFTER_PACKAGE", default.reset_after_package),
            browser_debug_port: env_or("BROWSER_DEBUG_PORT", default.browser_debug_port),
            browser_headless: env_or("BROWSER_HEADLESS", default.browser_headless),
            browser_executable: std::env::var("BROWSER_EXECUTABLE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or(default.browser_executable),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            settle_delay_ms: env_or("SETTLE_DELAY_MS", default.settle_delay_ms),
            pacing_delay_ms: env_or("PACING_DELAY_MS", default.pacing_delay_ms),
        }
    }
}

/// 读取环境变量并解析，缺失时使用默认值，解析失败时记录警告并使用默认值
fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    match std::env::var(var_name) {
        Ok(value) => parse_or(var_name, &value, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(var_name: &str, value: &str, default: T) -> T {
    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: value.to_string(),
                expected_type: std::any::type_name::<T>().to_string(),
            };
            warn!("⚠️ {}，使用默认值", err);
            default
        }
    }
}
