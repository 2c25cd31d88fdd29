//! # 诊断模块
//!
//! 收集解析与注册过程中产生的警告。
//!
//! ## 设计原则
//!
//! - 所有问题都只是警告，不会中断其他规则的注册
//! - 每条诊断同时通过 `tracing` 输出，调用方也可以从返回值中读取
//! - 纯数据结构，不依赖 IO

use crate::error::ScrollError;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（规则被跳过）
    Warn,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 完整的速度表达式
    pub source: String,
    /// 出问题的 token（如果可定位）
    pub token: Option<String>,
    /// 具体错误
    pub error: ScrollError,
}

impl Diagnostic {
    /// 创建警告诊断
    pub fn warn(source: impl Into<String>, error: ScrollError) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            source: source.into(),
            token: None,
            error,
        }
    }

    /// 设置 token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// 通过 tracing 输出
    pub fn emit(&self) {
        let token = self.token.as_deref().unwrap_or("");
        match self.level {
            DiagnosticLevel::Warn => {
                tracing::warn!(expression = %self.source, token = %token, "[data-scroll] {}", self.error)
            }
            DiagnosticLevel::Info => {
                tracing::info!(expression = %self.source, token = %token, "[data-scroll] {}", self.error)
            }
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] \"{}\": {}", self.level, self.source, self.error)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 逐条通过 tracing 输出
    pub fn emit(&self) {
        for diagnostic in &self.diagnostics {
            diagnostic.emit();
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl std::fmt::Display for DiagnosticResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
