//! # Tracker 模块
//!
//! 模拟滚动追踪器：维护已订阅的规则，滚动时推进、布局变化时刷新。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use data_scroll::{Element, ScrollRule, ScrollTracker, Subscription};
use tracing::{debug, info, warn};

use crate::page::Page;
use crate::viewport::Viewport;

type Observers = Rc<RefCell<Vec<(u64, Rc<RefCell<ScrollRule>>)>>>;

/// 模拟滚动追踪器
pub struct SimTracker {
    viewport: Rc<Viewport>,
    page: Rc<Page>,
    observers: Observers,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for SimTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimTracker")
            .field("viewport", &self.viewport)
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

impl SimTracker {
    pub fn new(viewport: Rc<Viewport>, page: Rc<Page>) -> Self {
        Self {
            viewport,
            page,
            observers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(1),
        }
    }

    /// 当前订阅的规则数量
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// 当前订阅的规则（按订阅顺序）
    pub fn rules(&self) -> Vec<Rc<RefCell<ScrollRule>>> {
        self.observers
            .borrow()
            .iter()
            .map(|(_, rule)| rule.clone())
            .collect()
    }

    /// 按当前滚动位置推进所有规则
    pub fn update(&self) {
        let scroll = self.viewport.scroll();
        for rule in self.rules() {
            rule.borrow_mut().update(scroll);
        }
    }

    /// 布局刷新：重新测量所有规则，再按当前滚动位置渲染
    pub fn refresh(&self) {
        let scroll = self.viewport.scroll();
        let rules = self.rules();
        debug!(count = rules.len(), scroll, "刷新所有规则");

        for rule in rules {
            let mut rule = rule.borrow_mut();
            rule.refresh(self);
            log_markers(&rule);
            rule.update(scroll);
        }
    }

    fn layout(&self, target: &dyn Element) -> Option<(f32, f32)> {
        let label = target.label();
        match self.page.element(&label) {
            Some(element) => Some((element.top(), element.rendered_top())),
            None => {
                warn!(target_label = %label, "元素不在页面中，按页面顶部处理");
                None
            }
        }
    }
}

fn log_markers(rule: &ScrollRule) {
    let trigger = rule.trigger();
    if !trigger.markers {
        return;
    }
    let offsets = rule.offsets();
    let range = rule.range();
    info!(
        id = %trigger.id,
        target_label = %rule.target().label(),
        start = %trigger.start(&offsets),
        end = %trigger.end(&offsets),
        scroll_start = range.start,
        scroll_end = range.end,
        "[markers]"
    );
}

impl ScrollTracker for SimTracker {
    fn viewport_height(&self) -> f32 {
        self.viewport.height()
    }

    fn scroll(&self) -> f32 {
        self.viewport.scroll()
    }

    fn position_in_viewport(&self, target: &dyn Element) -> f32 {
        let rendered = self.layout(target).map(|(_, rendered)| rendered).unwrap_or(0.0);
        (rendered - self.viewport.scroll()) / self.viewport.height()
    }

    fn layout_top(&self, target: &dyn Element) -> f32 {
        self.layout(target).map(|(top, _)| top).unwrap_or(0.0)
    }

    fn observe(&self, rule: Rc<RefCell<ScrollRule>>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        log_markers(&rule.borrow());
        self.observers.borrow_mut().push((id, rule));

        let observers = Rc::downgrade(&self.observers);
        Subscription::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}
