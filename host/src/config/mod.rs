//! # Config 模块
//!
//! 模拟宿主的运行配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};

use data_scroll::ScrollConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// 页面描述文件路径
    #[serde(default)]
    pub page_path: Option<PathBuf>,

    /// 视口配置
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// 依次模拟的滚动位置
    #[serde(default = "default_scroll_steps")]
    pub scroll_steps: Vec<f32>,

    /// 传给 data-scroll 的选项（camelCase 键名）
    #[serde(default)]
    pub data_scroll: ScrollConfig,

    /// 日志过滤（`RUST_LOG` 语法）
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

/// 视口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// 视口宽度（px）
    #[serde(default = "default_viewport_width")]
    pub width: f32,

    /// 视口高度（px）
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl ViewportConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// 宽高必须是大于 0 的有限数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "视口宽度必须大于 0（{}）",
                self.width
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "视口高度必须大于 0（{}）",
                self.height
            )));
        }
        Ok(())
    }
}

fn default_scroll_steps() -> Vec<f32> {
    (0..=10).map(|i| i as f32 * 200.0).collect()
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            page_path: None,
            viewport: ViewportConfig::default(),
            scroll_steps: default_scroll_steps(),
            data_scroll: ScrollConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl SimConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 读取并解析配置文件（失败时返回错误）
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;

        if let Some(step) = self.scroll_steps.iter().find(|s| !s.is_finite() || **s < 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "滚动位置必须是非负数（{}）",
                step
            )));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
