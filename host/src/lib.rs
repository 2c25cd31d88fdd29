//! # scroll-host
//!
//! data-scroll 的无界面宿主：模拟页面、视口、滚动追踪与断点匹配。
//!
//! ## 架构说明
//!
//! 宿主负责：
//! - 从 JSON 加载页面描述与运行配置
//! - 维护视口尺寸与滚动位置
//! - 滚动时推进规则，尺寸变化时切换断点并刷新测量
//! - 记录每一帧的内联样式
//!
//! 宿主不包含视差逻辑，只实现 data-scroll 要求的接口。

pub mod config;
pub mod media;
pub mod page;
pub mod simulation;
pub mod tracker;
pub mod viewport;

pub use config::{ConfigError, SimConfig, ViewportConfig};
pub use media::SimMatchMedia;
pub use page::{ElementSpec, InlineStyle, Page, PageElement, PageError, PageSpec};
pub use simulation::{ElementFrame, Frame, Simulation, Trace};
pub use tracker::SimTracker;
pub use viewport::Viewport;
