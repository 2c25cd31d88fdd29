//! # Error 模块
//!
//! 定义 data-scroll 中使用的错误类型。
//!
//! 所有错误都只影响单条规则（或单个 token），调用方将其记录为警告后继续处理其他规则。

use thiserror::Error;

/// 视差规则相关错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    /// 断点不在断点表中
    #[error("断点 \"{name}\" 不在断点表中（{}）", .available.join(", "))]
    UnknownBreakpoint { name: String, available: Vec<String> },

    /// max 条件必须指定断点
    #[error("未指定断点时只支持 min 条件")]
    MissingMaxBreakpoint,

    /// 断点宽度无法换算为像素
    #[error("断点 \"{name}\" 的宽度 \"{value}\" 不是有效的长度")]
    InvalidWidth { name: String, value: String },

    /// 非首个 token 缺少断点
    #[error("只有第一个值可以省略断点（\"{token}\"）")]
    MissingBreakpoint { token: String },

    /// 速度值不是数字
    #[error("速度值 \"{token}\" 不是数字")]
    NotANumber { token: String },

    /// 速度必须大于 0
    #[error("速度必须大于 0（{speed}）")]
    InvalidSpeed { speed: f64 },

    /// from/to 变量不是合法的 JSON 对象
    #[error("属性 {attribute} 不是合法的 JSON 对象 - {message}")]
    MalformedVariables { attribute: String, message: String },

    /// 无法识别的选择器
    #[error("无法识别的选择器 \"{selector}\"，只支持 [attribute] 列表")]
    InvalidSelector { selector: String },
}

impl ScrollError {
    /// 是否属于 token 格式错误（MalformedToken）
    pub fn is_malformed_token(&self) -> bool {
        matches!(self, Self::MissingBreakpoint { .. } | Self::NotANumber { .. })
    }
}

/// Result 类型别名
pub type ScrollResult<T> = Result<T, ScrollError>;
