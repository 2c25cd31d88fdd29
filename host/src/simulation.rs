//! # Simulation 模块
//!
//! 把页面、视口、追踪器和断点匹配器组装成一个可驱动的模拟环境。
//!
//! ```text
//! Simulation
//!   ├── Viewport（宽、高、滚动位置）
//!   ├── Page（元素与内联样式）
//!   ├── SimTracker（滚动 → update，布局变化 → refresh）
//!   └── DataScroll<SimMatchMedia>（宽度变化 → sync）
//! ```

use std::fmt;
use std::rc::Rc;

use data_scroll::{ApplyReport, DataScroll, Element, Options, ScrollTracker};
use tracing::{debug, info};

use crate::config::{ConfigError, SimConfig, ViewportConfig};
use crate::media::SimMatchMedia;
use crate::page::{InlineStyle, Page};
use crate::tracker::SimTracker;
use crate::viewport::Viewport;

/// 单个元素在某一帧的样式
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFrame {
    pub id: String,
    pub style: InlineStyle,
}

/// 一帧快照
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub scroll: f32,
    pub elements: Vec<ElementFrame>,
}

impl Frame {
    pub fn element(&self, id: &str) -> Option<&ElementFrame> {
        self.elements.iter().find(|e| e.id == id)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} (width {})", self.scroll, self.width)?;
        for element in &self.elements {
            write!(f, "\n  {}: ", element.id)?;
            if element.style.is_empty() {
                write!(f, "-")?;
            } else {
                write!(f, "{}", element.style)?;
            }
        }
        Ok(())
    }
}

/// 多帧记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub frames: Vec<Frame>,
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", frame)?;
        }
        Ok(())
    }
}

/// 模拟环境
pub struct Simulation {
    viewport: Rc<Viewport>,
    page: Rc<Page>,
    tracker: Rc<SimTracker>,
    scroll: DataScroll<SimMatchMedia>,
    report: ApplyReport,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("viewport", &self.viewport)
            .field("elements", &self.page.len())
            .field("scroll", &self.scroll)
            .finish()
    }
}

impl Simulation {
    /// 按配置创建模拟环境，`autoStart` 开启时注册页面中的匹配元素
    pub fn new(config: &SimConfig, page: Page) -> Result<Self, ConfigError> {
        Self::with_options(config, page, Options::new(config.data_scroll.clone()))
    }

    /// 使用自定义选项（可带钩子）创建
    ///
    /// 视口尺寸取自 `config`，`config.data_scroll` 被 `options` 取代。
    pub fn with_options(
        config: &SimConfig,
        page: Page,
        options: Options,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let viewport = Rc::new(Viewport::new(config.viewport.width, config.viewport.height));
        let page = Rc::new(page);
        let tracker = Rc::new(SimTracker::new(viewport.clone(), page.clone()));
        let matcher = SimMatchMedia::new(viewport.clone());

        let (scroll, report) = DataScroll::start(
            options,
            matcher,
            tracker.clone() as Rc<dyn ScrollTracker>,
            &*page,
        );
        info!(
            elements = page.len(),
            registered = report.registered,
            warnings = report.diagnostics.warn_count(),
            "模拟环境就绪"
        );

        Ok(Self {
            viewport,
            page,
            tracker,
            scroll,
            report,
        })
    }

    /// 创建以来所有 `apply` 的汇总结果
    pub fn report(&self) -> &ApplyReport {
        &self.report
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tracker(&self) -> &SimTracker {
        &self.tracker
    }

    pub fn data_scroll(&self) -> &DataScroll<SimMatchMedia> {
        &self.scroll
    }

    /// 手动注册页面中的元素
    ///
    /// 元素不存在时返回 `None`。
    pub fn apply(&mut self, id: &str) -> Option<ApplyReport> {
        let target = self.page.element(id)?.clone();
        let report = self.scroll.apply(target as Rc<dyn Element>);
        self.report.registered += report.registered;
        self.report.diagnostics.merge(report.diagnostics.clone());
        Some(report)
    }

    /// 滚动到指定位置并返回该帧
    pub fn scroll_to(&mut self, scroll: f32) -> Frame {
        self.viewport.scroll_to(scroll);
        self.tracker.update();
        self.frame()
    }

    /// 改变视口尺寸
    ///
    /// 先按新宽度切换断点规则，再刷新所有规则的测量。
    /// 尺寸无效时不做任何改动。
    pub fn resize(&mut self, width: f32, height: f32) -> Result<Frame, ConfigError> {
        ViewportConfig::new(width, height).validate()?;

        debug!(width, height, "视口尺寸变化");
        self.viewport.resize(width, height);
        self.scroll.matcher_mut().sync();
        self.tracker.refresh();
        Ok(self.frame())
    }

    /// 触发一次布局刷新
    pub fn refresh(&mut self) -> Frame {
        self.tracker.refresh();
        self.frame()
    }

    /// 依次滚动到每个位置，记录所有帧
    pub fn run(&mut self, steps: &[f32]) -> Trace {
        Trace {
            frames: steps.iter().map(|&scroll| self.scroll_to(scroll)).collect(),
        }
    }

    /// 撤销所有规则
    pub fn destroy(&mut self) {
        self.scroll.destroy();
    }

    /// 当前帧快照
    pub fn frame(&self) -> Frame {
        Frame {
            width: self.viewport.width(),
            scroll: self.viewport.scroll(),
            elements: self
                .page
                .elements()
                .iter()
                .map(|element| ElementFrame {
                    id: element.id().to_string(),
                    style: element.style(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, PageSpec};
    use data_scroll::SPEED_ATTRIBUTE;

    fn page() -> Page {
        Page::new(PageSpec {
            elements: vec![
                ElementSpec::new("hero", 1200.0, 200.0).with_attribute(SPEED_ATTRIBUTE, "2"),
                ElementSpec::new("plain", 0.0, 100.0),
            ],
        })
        .unwrap()
    }

    fn config() -> SimConfig {
        let mut config = SimConfig::default();
        config.viewport.width = 1000.0;
        config.viewport.height = 800.0;
        config
    }

    #[test]
    fn test_new_registers_matching_elements() {
        let sim = Simulation::new(&config(), page()).unwrap();
        assert_eq!(sim.report().registered, 1);
        assert_eq!(sim.tracker().observer_count(), 1);
        assert!(sim.frame().element("plain").unwrap().style.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.viewport.width = -1.0;
        assert!(Simulation::new(&config, page()).is_err());
    }

    #[test]
    fn test_frame_display() {
        let mut sim = Simulation::new(&config(), page()).unwrap();
        insta::assert_snapshot!(sim.scroll_to(900.0).to_string(), @r"
        @900 (width 1000)
          hero: transform: translateY(0px); visibility: initial; will-change: transform
          plain: -
        ");
    }

    #[test]
    fn test_resize_rejects_invalid_dimensions() {
        let mut sim = Simulation::new(&config(), page()).unwrap();
        let before = sim.scroll_to(900.0);

        assert!(sim.resize(1000.0, 0.0).is_err());
        assert!(sim.resize(f32::NAN, 800.0).is_err());
        assert!(sim.resize(-1.0, 800.0).is_err());

        assert_eq!(sim.viewport().height(), 800.0);
        assert_eq!(sim.frame(), before);
        assert_eq!(sim.resize(1000.0, 600.0).unwrap().width, 1000.0);
    }

    #[test]
    fn test_manual_apply_without_auto_start() {
        let mut config = config();
        config.data_scroll.auto_start = false;
        let mut sim = Simulation::new(&config, page()).unwrap();
        assert_eq!(sim.report().registered, 0);

        let report = sim.apply("hero").unwrap();
        assert_eq!(report.registered, 1);
        assert_eq!(sim.report().registered, 1);
        assert!(sim.apply("missing").is_none());
    }
}
