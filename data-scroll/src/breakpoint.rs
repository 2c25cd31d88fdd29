//! # Breakpoint 模块
//!
//! 断点表与媒体查询条件。
//!
//! 断点名映射到最小宽度（CSS 长度字符串），每个速度 token 的生效范围由
//! 自身断点的 `min-width` 与下一个 token 断点的 `max-width`（减 1px）组合而成，
//! 同一表达式内的各条件互斥。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ScrollError, ScrollResult};

/// 断点表（断点名 -> 最小宽度）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Screens(BTreeMap<String, String>);

impl Default for Screens {
    fn default() -> Self {
        Self::new([
            ("sm", "640px"),
            ("md", "768px"),
            ("lg", "1024px"),
            ("xl", "1280px"),
            ("2xl", "1536px"),
        ])
    }
}

impl Screens {
    /// 从 (断点名, 宽度) 列表创建断点表
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// 查询断点宽度
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// 所有断点名（按名称排序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 把断点解析为单个媒体查询子句
    ///
    /// - `Min` + 无断点 → `(min-width: 0px)`
    /// - `Min` + 断点 → `(min-width: <宽度>)`
    /// - `Max` + 断点 → `(max-width: <宽度 - 1>px)`
    /// - `Max` + 无断点 → [`ScrollError::MissingMaxBreakpoint`]
    pub fn resolve(&self, screen: Option<&str>, bound: Bound) -> ScrollResult<MediaClause> {
        let Some(name) = screen else {
            return match bound {
                Bound::Min => Ok(MediaClause::new(Bound::Min, "0px")),
                Bound::Max => Err(ScrollError::MissingMaxBreakpoint),
            };
        };

        let width = self
            .get(name)
            .ok_or_else(|| ScrollError::UnknownBreakpoint {
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })?;

        match bound {
            Bound::Min => Ok(MediaClause::new(Bound::Min, width)),
            Bound::Max => {
                let px = leading_integer(width).ok_or_else(|| ScrollError::InvalidWidth {
                    name: name.to_string(),
                    value: width.to_string(),
                })?;
                Ok(MediaClause::new(Bound::Max, format!("{}px", px - 1)))
            }
        }
    }
}

/// 媒体查询方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    fn feature(self) -> &'static str {
        match self {
            Self::Min => "min-width",
            Self::Max => "max-width",
        }
    }
}

/// 单个媒体查询子句，如 `(min-width: 768px)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaClause {
    pub bound: Bound,
    /// CSS 长度（原样保留断点表中的写法）
    pub width: String,
}

impl MediaClause {
    pub fn new(bound: Bound, width: impl Into<String>) -> Self {
        Self {
            bound,
            width: width.into(),
        }
    }

    /// 判断视口宽度是否满足该子句
    ///
    /// 无法换算为像素的长度视为不满足。
    pub fn matches(&self, viewport_width: f32) -> bool {
        let Some(px) = length_to_px(&self.width) else {
            return false;
        };
        match self.bound {
            Bound::Min => viewport_width >= px,
            Bound::Max => viewport_width <= px,
        }
    }
}

impl std::fmt::Display for MediaClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}: {})", self.bound.feature(), self.width)
    }
}

/// 一条规则的完整媒体条件：`min` 与可选的 `max` 的合取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCondition {
    pub min: MediaClause,
    pub max: Option<MediaClause>,
}

impl MediaCondition {
    pub fn new(min: MediaClause, max: Option<MediaClause>) -> Self {
        Self { min, max }
    }

    /// 判断视口宽度是否落在该条件内
    pub fn matches(&self, viewport_width: f32) -> bool {
        self.min.matches(viewport_width)
            && self
                .max
                .as_ref()
                .is_none_or(|max| max.matches(viewport_width))
    }
}

impl std::fmt::Display for MediaCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.min)?;
        if let Some(max) = &self.max {
            write!(f, " and {}", max)?;
        }
        Ok(())
    }
}

/// 取字符串开头的整数部分（`"768px"` → 768）
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<i64>().ok().map(|n| n * sign)
}

/// 把 CSS 长度换算为像素（支持 px / em / rem，em 与 rem 按 16px 计算）
fn length_to_px(s: &str) -> Option<f32> {
    let s = s.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix("rem") {
        (n, 16.0)
    } else if let Some(n) = s.strip_suffix("em") {
        (n, 16.0)
    } else {
        (s, 1.0)
    };
    number.trim().parse::<f32>().ok().map(|n| n * scale)
}
