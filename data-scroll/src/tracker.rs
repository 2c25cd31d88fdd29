//! # Tracker 模块
//!
//! 滚动追踪器接口。
//!
//! 追踪器由宿主实现，负责：
//! - 提供视口高度、滚动距离与元素位置测量
//! - 在刷新时调用 [`ScrollRule::refresh`]，在滚动时调用 [`ScrollRule::update`]
//! - 在 [`Subscription`] 被丢弃后停止向规则派发事件

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::Element;
use crate::rule::ScrollRule;

/// 滚动追踪器
pub trait ScrollTracker {
    /// 视口高度
    fn viewport_height(&self) -> f32;

    /// 当前滚动距离
    fn scroll(&self) -> f32;

    /// 元素顶部（含当前位移）在视口中的归一化位置
    fn position_in_viewport(&self, target: &dyn Element) -> f32;

    /// 元素顶部（不含位移）距页面顶部的距离
    fn layout_top(&self, target: &dyn Element) -> f32;

    /// 订阅规则，返回的句柄被丢弃时取消订阅
    fn observe(&self, rule: Rc<RefCell<ScrollRule>>) -> Subscription;
}

/// 订阅句柄
///
/// 丢弃时执行取消回调。
#[must_use = "丢弃 Subscription 会立即取消订阅"]
pub struct Subscription(Option<Box<dyn FnOnce()>>);

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cancel)))
    }

    /// 不需要取消动作的订阅
    pub fn detached() -> Self {
        Self(None)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Subscription")
            .field(&self.0.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.0.take() {
            cancel();
        }
    }
}
