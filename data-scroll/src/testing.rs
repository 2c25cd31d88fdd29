//! 单元测试用的宿主替身。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::breakpoint::MediaCondition;
use crate::element::{Document, Element, StyleProperty, StyleUpdate, Visibility, WillChange};
use crate::media::{MediaHandle, MediaMatcher, MediaSetup};
use crate::options::Selector;
use crate::rule::{RuleBinding, ScrollRule};
use crate::tracker::{ScrollTracker, Subscription};

#[derive(Debug, Default)]
struct FakeStyle {
    translate_y: Option<f32>,
    visibility: Option<Visibility>,
    will_change: Option<WillChange>,
    variables: HashMap<String, Value>,
}

pub struct FakeElement {
    label: String,
    height: f32,
    attributes: RefCell<HashMap<String, String>>,
    numeric: RefCell<HashMap<String, f64>>,
    style: RefCell<FakeStyle>,
    writes: Cell<usize>,
}

impl FakeElement {
    pub fn new(label: &str, height: f32) -> Rc<Self> {
        Rc::new(Self {
            label: label.to_string(),
            height,
            attributes: RefCell::new(HashMap::new()),
            numeric: RefCell::new(HashMap::new()),
            style: RefCell::new(FakeStyle::default()),
            writes: Cell::new(0),
        })
    }

    pub fn with_attribute(self: Rc<Self>, name: &str, value: &str) -> Rc<Self> {
        self.attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn set_numeric(&self, name: &str, value: f64) {
        self.numeric.borrow_mut().insert(name.to_string(), value);
    }

    pub fn translate_y(&self) -> Option<f32> {
        self.style.borrow().translate_y
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.style.borrow().visibility
    }

    pub fn will_change(&self) -> Option<WillChange> {
        self.style.borrow().will_change
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.style.borrow().variables.get(name).cloned()
    }

    /// set_style 调用次数
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Element for FakeElement {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn offset_height(&self) -> f32 {
        self.height
    }

    fn set_style(&self, update: StyleUpdate) {
        self.writes.set(self.writes.get() + 1);
        let mut style = self.style.borrow_mut();
        match update {
            StyleUpdate::TranslateY(y) => style.translate_y = Some(y),
            StyleUpdate::Visibility(v) => style.visibility = Some(v),
            StyleUpdate::WillChange(w) => style.will_change = Some(w),
            StyleUpdate::Variable { name, value } => {
                style.variables.insert(name, value);
            }
        }
    }

    fn clear_style(&self, property: &StyleProperty) {
        let mut style = self.style.borrow_mut();
        match property {
            StyleProperty::TranslateY => style.translate_y = None,
            StyleProperty::Visibility => style.visibility = None,
            StyleProperty::WillChange => style.will_change = None,
            StyleProperty::Variable(name) => {
                style.variables.remove(name);
            }
        }
    }

    fn numeric_style(&self, name: &str) -> Option<f64> {
        self.numeric.borrow().get(name).copied()
    }
}

type Observers = Rc<RefCell<Vec<(u64, Rc<RefCell<ScrollRule>>)>>>;

pub struct FakeTracker {
    viewport_height: Cell<f32>,
    scroll: Cell<f32>,
    placements: RefCell<Vec<(Rc<FakeElement>, f32)>>,
    observers: Observers,
    next_id: Cell<u64>,
}

impl FakeTracker {
    pub fn new(viewport_height: f32) -> Rc<Self> {
        Rc::new(Self {
            viewport_height: Cell::new(viewport_height),
            scroll: Cell::new(0.0),
            placements: RefCell::new(Vec::new()),
            observers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(1),
        })
    }

    /// 设置元素在页面中的顶部位置
    pub fn place(&self, element: &Rc<FakeElement>, top: f32) {
        self.placements.borrow_mut().push((element.clone(), top));
    }

    pub fn set_viewport_height(&self, height: f32) {
        self.viewport_height.set(height);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn rule(&self, index: usize) -> Rc<RefCell<ScrollRule>> {
        self.observers.borrow()[index].1.clone()
    }

    fn snapshot(&self) -> Vec<Rc<RefCell<ScrollRule>>> {
        self.observers
            .borrow()
            .iter()
            .map(|(_, rule)| rule.clone())
            .collect()
    }

    pub fn scroll_to(&self, scroll: f32) {
        self.scroll.set(scroll);
        for rule in self.snapshot() {
            rule.borrow_mut().update(scroll);
        }
    }

    pub fn refresh(&self) {
        for rule in self.snapshot() {
            let mut rule = rule.borrow_mut();
            rule.refresh(self);
            rule.update(self.scroll.get());
        }
    }

    fn placement(&self, target: &dyn Element) -> Option<(Rc<FakeElement>, f32)> {
        let label = target.label();
        self.placements
            .borrow()
            .iter()
            .find(|(element, _)| element.label == label)
            .cloned()
    }
}

impl ScrollTracker for FakeTracker {
    fn viewport_height(&self) -> f32 {
        self.viewport_height.get()
    }

    fn scroll(&self) -> f32 {
        self.scroll.get()
    }

    fn position_in_viewport(&self, target: &dyn Element) -> f32 {
        let (element, top) = self.placement(target).unwrap_or_else(|| {
            panic!("element {} was not placed", target.label());
        });
        let rendered = top + element.translate_y().unwrap_or(0.0);
        (rendered - self.scroll.get()) / self.viewport_height.get()
    }

    fn layout_top(&self, target: &dyn Element) -> f32 {
        self.placement(target).map(|(_, top)| top).unwrap_or(0.0)
    }

    fn observe(&self, rule: Rc<RefCell<ScrollRule>>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push((id, rule));

        let observers = Rc::downgrade(&self.observers);
        Subscription::new(move || {
            if let Some(observers) = observers.upgrade() {
                observers.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }
}

struct FakeEntry {
    condition: MediaCondition,
    setup: MediaSetup,
    binding: Option<RuleBinding>,
}

pub struct FakeMatcher {
    width: f32,
    entries: Vec<FakeEntry>,
    next_handle: u64,
}

impl FakeMatcher {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn set_width(&mut self, width: f32) {
        self.width = width;
        for entry in &mut self.entries {
            let active = entry.condition.matches(width);
            match (active, entry.binding.is_some()) {
                (true, false) => entry.binding = Some((entry.setup)()),
                (false, true) => entry.binding = None,
                _ => {}
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|e| e.binding.is_some()).count()
    }
}

impl MediaMatcher for FakeMatcher {
    fn add(&mut self, condition: MediaCondition, mut setup: MediaSetup) -> MediaHandle {
        let handle = MediaHandle(self.next_handle);
        self.next_handle += 1;
        let binding = condition.matches(self.width).then(|| setup());
        self.entries.push(FakeEntry {
            condition,
            setup,
            binding,
        });
        handle
    }

    fn revert_all(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct FakeDocument {
    elements: Vec<Rc<FakeElement>>,
}

impl FakeDocument {
    pub fn new(elements: Vec<Rc<FakeElement>>) -> Self {
        Self { elements }
    }
}

impl Document for FakeDocument {
    fn query_all(&self, selector: &Selector) -> Vec<Rc<dyn Element>> {
        self.elements
            .iter()
            .filter(|element| selector.matches(element.as_ref()))
            .map(|element| element.clone() as Rc<dyn Element>)
            .collect()
    }
}
