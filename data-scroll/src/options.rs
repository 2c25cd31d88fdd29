//! # Options 模块
//!
//! 调用方配置。
//!
//! 可序列化部分（[`ScrollConfig`]）使用与原始选项一致的 camelCase 键名，
//! 钩子函数（[`Hooks`]）只能在代码中提供。

use serde::{Deserialize, Serialize};

use crate::breakpoint::Screens;
use crate::element::{Element, FROM_ATTRIBUTE, SPEED_ATTRIBUTE, TO_ATTRIBUTE};
use crate::error::ScrollError;
use crate::tween::TweenVars;

/// 属性选择器：`[attr]` 列表，元素带有任意一个属性即匹配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    attributes: Vec<String>,
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            attributes: vec![
                SPEED_ATTRIBUTE.to_string(),
                FROM_ATTRIBUTE.to_string(),
                TO_ATTRIBUTE.to_string(),
            ],
        }
    }
}

impl Selector {
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// 元素是否匹配
    pub fn matches(&self, element: &dyn Element) -> bool {
        self.attributes
            .iter()
            .any(|attribute| element.has_attribute(attribute))
    }
}

impl std::str::FromStr for Selector {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScrollError::InvalidSelector {
            selector: s.to_string(),
        };

        let attributes = s
            .split(',')
            .map(|clause| {
                clause
                    .trim()
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .map(str::trim)
                    .filter(|name| {
                        !name.is_empty()
                            && name
                                .chars()
                                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                    })
                    .map(str::to_string)
                    .ok_or_else(invalid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { attributes })
    }
}

impl TryFrom<String> for Selector {
    type Error = ScrollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clauses: Vec<String> = self
            .attributes
            .iter()
            .map(|attribute| format!("[{}]", attribute))
            .collect();
        write!(f, "{}", clauses.join(","))
    }
}

/// 可序列化的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollConfig {
    /// 创建时是否自动扫描并注册所有匹配元素
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,

    /// 断点表
    #[serde(default)]
    pub screens: Screens,

    /// 自动注册时使用的选择器
    #[serde(default)]
    pub selector: Selector,
}

fn default_auto_start() -> bool {
    true
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            auto_start: default_auto_start(),
            screens: Screens::default(),
            selector: Selector::default(),
        }
    }
}

/// 速度钩子
pub type SpeedHook = Box<dyn Fn(&dyn Element) -> Option<String>>;
/// from/to 钩子
pub type VariablesHook = Box<dyn Fn(&dyn Element) -> Option<TweenVars>>;
/// 调试标记钩子
pub type MarkersHook = Box<dyn Fn(&dyn Element) -> bool>;

/// 覆盖属性读取的钩子
///
/// 未设置的钩子回退到读取元素属性。
#[derive(Default)]
pub struct Hooks {
    pub speed: Option<SpeedHook>,
    pub from: Option<VariablesHook>,
    pub to: Option<VariablesHook>,
    pub markers: Option<MarkersHook>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("speed", &self.speed.is_some())
            .field("from", &self.from.is_some())
            .field("to", &self.to.is_some())
            .field("markers", &self.markers.is_some())
            .finish()
    }
}

/// 完整选项
#[derive(Debug, Default)]
pub struct Options {
    pub config: ScrollConfig,
    pub hooks: Hooks,
}

impl Options {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            hooks: Hooks::default(),
        }
    }

    pub fn with_speed(mut self, hook: impl Fn(&dyn Element) -> Option<String> + 'static) -> Self {
        self.hooks.speed = Some(Box::new(hook));
        self
    }

    pub fn with_from(mut self, hook: impl Fn(&dyn Element) -> Option<TweenVars> + 'static) -> Self {
        self.hooks.from = Some(Box::new(hook));
        self
    }

    pub fn with_to(mut self, hook: impl Fn(&dyn Element) -> Option<TweenVars> + 'static) -> Self {
        self.hooks.to = Some(Box::new(hook));
        self
    }

    pub fn with_markers(mut self, hook: impl Fn(&dyn Element) -> bool + 'static) -> Self {
        self.hooks.markers = Some(Box::new(hook));
        self
    }
}
