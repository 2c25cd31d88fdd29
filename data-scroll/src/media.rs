//! # Media 模块
//!
//! 断点条件执行接口。
//!
//! 宿主实现 [`MediaMatcher`]：为每个条件登记一个 setup 回调，
//! 条件成立时调用 setup 得到 [`RuleBinding`]，条件不再成立时丢弃该绑定（即撤销）。
//! `revert_all` 撤销并移除所有登记。

use crate::breakpoint::MediaCondition;
use crate::rule::RuleBinding;

/// 条件成立时执行的 setup 回调
pub type MediaSetup = Box<dyn FnMut() -> RuleBinding>;

/// 登记句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaHandle(pub u64);

/// 断点条件执行器
pub trait MediaMatcher {
    /// 登记条件；若条件当前成立，立即执行 setup
    fn add(&mut self, condition: MediaCondition, setup: MediaSetup) -> MediaHandle;

    /// 撤销所有登记（可重复调用）
    fn revert_all(&mut self);

    /// 当前登记数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
