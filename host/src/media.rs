//! # Media 模块
//!
//! 模拟断点匹配器：按视口宽度执行或撤销登记的条件。
//!
//! 视口宽度变化后调用 [`SimMatchMedia::sync`]，先撤销不再成立的条件，
//! 再执行新成立的条件。

use std::rc::Rc;

use data_scroll::{MediaCondition, MediaHandle, MediaMatcher, MediaSetup, RuleBinding};
use tracing::debug;

use crate::viewport::Viewport;

struct Entry {
    handle: MediaHandle,
    condition: MediaCondition,
    setup: MediaSetup,
    binding: Option<RuleBinding>,
}

/// 模拟断点匹配器
pub struct SimMatchMedia {
    viewport: Rc<Viewport>,
    entries: Vec<Entry>,
    next_handle: u64,
}

impl std::fmt::Debug for SimMatchMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimMatchMedia")
            .field("width", &self.viewport.width())
            .field("entries", &self.entries.len())
            .field("active", &self.active_count())
            .finish()
    }
}

impl SimMatchMedia {
    pub fn new(viewport: Rc<Viewport>) -> Self {
        Self {
            viewport,
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    /// 按当前视口宽度同步所有条件
    pub fn sync(&mut self) {
        let width = self.viewport.width();

        for entry in &mut self.entries {
            if entry.binding.is_some() && !entry.condition.matches(width) {
                debug!(handle = entry.handle.0, condition = %entry.condition, width, "条件失效");
                entry.binding = None;
            }
        }

        for entry in &mut self.entries {
            if entry.binding.is_none() && entry.condition.matches(width) {
                debug!(handle = entry.handle.0, condition = %entry.condition, width, "条件生效");
                entry.binding = Some((entry.setup)());
            }
        }
    }

    /// 当前成立的条件数量
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.binding.is_some()).count()
    }

    /// 当前成立的条件（按登记顺序）
    pub fn active_conditions(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.binding.is_some())
            .map(|e| e.condition.to_string())
            .collect()
    }
}

impl MediaMatcher for SimMatchMedia {
    fn add(&mut self, condition: MediaCondition, mut setup: MediaSetup) -> MediaHandle {
        let handle = MediaHandle(self.next_handle);
        self.next_handle += 1;

        let binding = condition
            .matches(self.viewport.width())
            .then(|| setup());
        self.entries.push(Entry {
            handle,
            condition,
            setup,
            binding,
        });
        handle
    }

    fn revert_all(&mut self) {
        // 按登记的逆序撤销
        while let Some(entry) = self.entries.pop() {
            drop(entry.binding);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ElementSpec, Page, PageSpec};
    use crate::tracker::SimTracker;
    use data_scroll::{Bound, MediaClause, RuleInputs, Speed};

    fn condition(min: &str, max: Option<&str>) -> MediaCondition {
        MediaCondition::new(
            MediaClause::new(Bound::Min, min),
            max.map(|w| MediaClause::new(Bound::Max, w)),
        )
    }

    #[test]
    fn test_sync_switches_bindings() {
        let viewport = Rc::new(Viewport::new(600.0, 800.0));
        let page = Rc::new(
            Page::new(PageSpec {
                elements: vec![ElementSpec::new("a", 1000.0, 100.0)],
            })
            .unwrap(),
        );
        let tracker = Rc::new(SimTracker::new(viewport.clone(), page.clone()));
        let mut matcher = SimMatchMedia::new(viewport.clone());

        for (min, max, speed) in [("0px", Some("767px"), 2.0), ("768px", None, 0.5)] {
            let tracker = tracker.clone();
            let target = page.element("a").unwrap().clone();
            let condition = condition(min, max);
            let bound = condition.clone();
            matcher.add(
                condition,
                Box::new(move || {
                    RuleBinding::bind(
                        &*tracker,
                        target.clone(),
                        Speed::new(speed),
                        bound.clone(),
                        &RuleInputs::default(),
                    )
                }),
            );
        }

        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher.active_conditions(), ["(min-width: 0px) and (max-width: 767px)"]);
        assert_eq!(tracker.observer_count(), 1);

        viewport.resize(1024.0, 800.0);
        matcher.sync();
        assert_eq!(matcher.active_conditions(), ["(min-width: 768px)"]);
        assert_eq!(tracker.observer_count(), 1);
        assert_eq!(tracker.rules()[0].borrow().speed().value, 0.5);

        matcher.revert_all();
        assert!(matcher.is_empty());
        assert_eq!(tracker.observer_count(), 0);
        assert!(page.element("a").unwrap().style().is_empty());
    }
}
