use crate::llm::LlmConfig;
use crate::logging::{LogFormat, LogRotation};
use crate::seo::PromptProfile;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// 設定ファイルの探索順
const CONFIG_PATHS: [&str; 2] = ["ai-seo.toml", "config/ai-seo.toml"];

/// 環境変数プレフィックス (例: AI_SEO__SERVER__BIND_ADDR)
const ENV_PREFIX: &str = "AI_SEO";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub optimizer: PromptProfile,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
    pub log_rotation: LogRotation,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_dir: None,
            log_rotation: LogRotation::Daily,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// コンテンツレコードのJSONファイル（未指定ならメモリのみ）
    pub data_file: Option<PathBuf>,
    /// 更新をファイルへ書き戻すか
    pub persist: bool,
}

impl AppConfig {
    /// 設定ファイルから読み込み、環境変数で上書き
    ///
    /// `path` 未指定時は `ai-seo.toml`, `config/ai-seo.toml` の順に探す。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_layers(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_layers(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        // デフォルト値を設定
        settings = settings.add_source(config::Config::try_from(&AppConfig::default())?);

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("config file not found: {}", path.display()));
                }
                settings = settings.add_source(
                    config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(found) = CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
                    settings = settings.add_source(
                        config::File::from(found.to_path_buf()).format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // 環境変数で上書き (AI_SEO__ で始まる変数)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        settings
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// 特定の環境変数による個別上書き
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(SecretString::new(api_key.into_boxed_str()));
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.llm.default_model = model;
        }
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
    }

    /// バインドアドレスを解析
    pub fn bind_socket_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind_addr: {}", self.server.bind_addr))
    }

    /// サンプル設定のTOML文字列
    pub fn sample_toml() -> Result<String> {
        let sample = AppConfig {
            store: StoreConfig {
                data_file: Some(PathBuf::from("data/content.json")),
                persist: true,
            },
            ..AppConfig::default()
        };

        let toml_content = toml::to_string_pretty(&sample)?;

        Ok(format!(
            r#"# ai-seo configuration file
#
# ai-seo.toml として保存してください
# 環境変数での上書きも可能です (例: AI_SEO__SERVER__BIND_ADDR=0.0.0.0:8080)
# OPENAI_API_KEY / OPENAI_MODEL / BIND_ADDR も直接参照します

{}
# 設定説明:
#
# [server]
# log_format = pretty | json
# log_dir = 指定するとローテーション付きファイルにも出力
# log_rotation = daily | hourly | never
#
# [llm]
# provider = openai | azureopenai | local | custom
# api_key = "sk-..." (OPENAI_API_KEY 推奨)
# endpoint = Azure / ローカル / カスタムのベースURL
#
# [optimizer]
# industry = プロンプトで想定する業種
#
# [store]
# data_file = コンテンツレコードのJSON
# persist = true で更新をファイルへ書き戻す
"#,
            toml_content
        ))
    }

    /// サンプル設定ファイルを生成
    pub fn generate_sample(path: &Path) -> Result<()> {
        let content = Self::sample_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}
