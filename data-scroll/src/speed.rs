//! # Speed 模块
//!
//! 速度表达式解析。
//!
//! ## 语法
//!
//! ```text
//! 表达式 = token { 空白 token }
//! token  = [断点 ":"] 值
//! 值     = 数字 | "clamp(" 数字 ")"
//! 数字   = 开头的十进制数字，其后的内容忽略（"2px" 即 2）
//! ```
//!
//! 例如 `"2"`、`"md:2 lg:clamp(1.5)"`、`"1.2 md:0.8"`。
//!
//! 只有第一个 token 可以省略断点；后续缺少断点的 token 会被丢弃并产生警告。
//! 值本身的校验（非数字、≤ 0、等于 1）推迟到注册阶段，
//! 因为这些 token 虽然不生成规则，但仍然限定前一个 token 的生效范围。

use crate::diagnostic::{Diagnostic, DiagnosticResult};
use crate::error::ScrollError;

/// 解析后的速度值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speed {
    /// 速度倍数（1 = 无视差）
    pub value: f64,
    /// 是否为 clamp 模式
    pub clamp: bool,
}

impl Speed {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            clamp: false,
        }
    }

    pub fn clamped(value: f64) -> Self {
        Self { value, clamp: true }
    }

    /// 解析值部分：`"2"` 或 `"clamp(1.5)"`
    ///
    /// 只读取开头的数字部分，`"2px"` 按 2 处理。
    /// 开头不是有限数字时返回 `None`。
    pub fn parse(raw: &str) -> Option<Self> {
        let (number, clamp) = match raw.strip_prefix("clamp(") {
            Some(inner) => (inner, true),
            None => (raw, false),
        };
        leading_number(number)
            .filter(|v| v.is_finite())
            .map(|value| Self { value, clamp })
    }

    /// 位移系数 `1/speed - 1`
    ///
    /// 速度过小时结果溢出为无穷大，由 [`SpeedToken::check`] 拒绝。
    pub fn factor(&self) -> f32 {
        (1.0 / self.value - 1.0) as f32
    }

    /// 触发器标识（速度的字符串形式）
    pub fn id(&self) -> String {
        self.value.to_string()
    }
}

/// 读取字符串开头最长的十进制数字（可带符号、小数点和指数）
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    // 至少需要一位数字
    if mantissa_end - end <= usize::from(mantissa_end > int_end) {
        return None;
    }
    end = mantissa_end;

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse().ok()
}

/// 速度表达式中的单个 token
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedToken {
    /// 原始文本，如 `"md:2"`
    pub text: String,
    /// 断点名（空字符串视为未指定）
    pub screen: Option<String>,
    /// 解析后的速度，值不是数字时为 `None`
    pub speed: Option<Speed>,
}

impl SpeedToken {
    /// 解析单个 token
    pub fn parse(text: &str) -> Self {
        let (screen, raw) = match text.split_once(':') {
            Some((screen, raw)) => (Some(screen).filter(|s| !s.is_empty()), raw),
            None => (None, text),
        };

        Self {
            text: text.to_string(),
            screen: screen.map(str::to_string),
            speed: Speed::parse(raw),
        }
    }

    /// 判断该 token 是否需要生成动画规则
    ///
    /// `has_variables` 表示元素是否声明了 from/to 变量：
    /// 速度为 1 且没有变量时无事可做。
    pub fn check(&self, has_variables: bool) -> SpeedCheck {
        let Some(speed) = self.speed else {
            return SpeedCheck::Skip(ScrollError::NotANumber {
                token: self.text.clone(),
            });
        };

        if speed.value == 1.0 && !has_variables {
            return SpeedCheck::NoOp;
        }

        if speed.value <= 0.0 || !speed.factor().is_finite() {
            return SpeedCheck::Skip(ScrollError::InvalidSpeed { speed: speed.value });
        }

        SpeedCheck::Animate(speed)
    }
}

/// [`SpeedToken::check`] 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedCheck {
    /// 生成动画规则
    Animate(Speed),
    /// 无事可做，静默跳过
    NoOp,
    /// 跳过并报告原因
    Skip(ScrollError),
}

/// 解析后的速度表达式
#[derive(Debug, Clone)]
pub struct SpeedExpression {
    /// 原始表达式
    pub source: String,
    /// 保留下来的 token（顺序与原文一致）
    pub tokens: Vec<SpeedToken>,
    /// 解析过程中的警告
    pub diagnostics: DiagnosticResult,
}

impl SpeedExpression {
    /// 解析速度表达式
    pub fn parse(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut diagnostics = DiagnosticResult::new();

        for (index, text) in source.split_whitespace().enumerate() {
            let token = SpeedToken::parse(text);
            if index > 0 && token.screen.is_none() {
                diagnostics.push(
                    Diagnostic::warn(
                        source,
                        ScrollError::MissingBreakpoint {
                            token: text.to_string(),
                        },
                    )
                    .with_token(text),
                );
                continue;
            }
            tokens.push(token);
        }

        Self {
            source: source.to_string(),
            tokens,
            diagnostics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
