//! # data-scroll
//!
//! 响应式滚动视差的核心库。
//!
//! ## 架构概述
//!
//! `data-scroll` 是纯逻辑核心，不依赖任何 DOM、渲染或动画引擎。
//! 宿主实现三个接口：
//!
//! ```text
//! Host                                   data-scroll
//!   │  Element / Document                     │
//!   │  ScrollTracker (滚动、刷新、测量)       │
//!   │  MediaMatcher (断点条件执行)            │
//!   │──── DataScroll::apply(element) ───────►│ 解析速度 → 断点条件 → 规则
//!   │◄─── Element::set_style(...) ───────────│
//!   │──── refresh / update ─────────────────►│ 重新计算位移 / 推进状态机
//!   │──── DataScroll::destroy() ────────────►│ 撤销所有规则
//! ```
//!
//! ## 速度语义
//!
//! - `1`：无视差
//! - `> 1`：元素看起来比滚动慢
//! - `0 < speed < 1`：元素看起来比滚动快
//! - `clamp(x)`：第一屏内的元素起点固定为 0，避免加载时跳动
//!
//! ## 使用示例
//!
//! ```ignore
//! use data_scroll::{DataScroll, Options};
//!
//! let (mut scroll, report) = DataScroll::start(Options::default(), matcher, tracker, &document);
//! for diagnostic in report.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//!
//! scroll.apply(late_element);
//! scroll.destroy();
//! ```
//!
//! ## 模块结构
//!
//! - [`speed`]：速度表达式解析
//! - [`breakpoint`]：断点表与媒体条件
//! - [`offset`]：位移计算
//! - [`controller`]：滚动状态机
//! - [`registrar`]：规则注册
//! - [`rule`] / [`tween`] / [`trigger`]：单条规则的运行时
//! - [`element`] / [`tracker`] / [`media`]：宿主接口

pub mod breakpoint;
pub mod controller;
pub mod diagnostic;
pub mod element;
pub mod error;
pub mod media;
pub mod offset;
pub mod options;
pub mod registrar;
pub mod rule;
pub mod speed;
pub mod tracker;
pub mod trigger;
pub mod tween;

#[cfg(test)]
mod testing;

// 重导出核心类型
pub use breakpoint::{Bound, MediaClause, MediaCondition, Screens};
pub use controller::{ScrollController, ScrollState, Transition};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult};
pub use element::{
    Document, Element, FROM_ATTRIBUTE, MARKERS_ATTRIBUTE, SPEED_ATTRIBUTE, StyleProperty,
    StyleUpdate, TO_ATTRIBUTE, Visibility, WillChange,
};
pub use error::{ScrollError, ScrollResult};
pub use media::{MediaHandle, MediaMatcher, MediaSetup};
pub use offset::{Measurement, OffsetPair, SharedOffsets};
pub use options::{Hooks, Options, ScrollConfig, Selector};
pub use registrar::{ApplyReport, DataScroll, RulePlan, analyze_speed, plan_rules};
pub use rule::{RuleBinding, RuleInputs, ScrollRule};
pub use speed::{Speed, SpeedCheck, SpeedExpression, SpeedToken};
pub use tracker::{ScrollTracker, Subscription};
pub use trigger::{ScrollRange, TriggerEnd, TriggerSpec, TriggerStart};
pub use tween::{Tween, TweenVars, parse_variables};
