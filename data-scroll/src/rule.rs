//! # Rule 模块
//!
//! 单个速度 token 在某个媒体条件下生成的动画规则。
//!
//! 规则组合了位移计算、状态机与补间：
//! - 刷新：重新测量并计算位移与触发区域
//! - 滚动：推进状态机，再按进度渲染补间
//! - 撤销：清除写入的所有样式

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::breakpoint::MediaCondition;
use crate::controller::{ScrollController, ScrollState};
use crate::element::{Element, StyleProperty};
use crate::offset::{Measurement, OffsetPair, SharedOffsets};
use crate::speed::Speed;
use crate::tracker::{ScrollTracker, Subscription};
use crate::trigger::{ScrollRange, TriggerSpec};
use crate::tween::{Tween, TweenVars};

/// 元素声明的动画输入（已解析的属性或钩子结果）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleInputs {
    /// 速度表达式
    pub speed: String,
    pub from: Option<TweenVars>,
    pub to: Option<TweenVars>,
    pub markers: bool,
}

impl RuleInputs {
    /// 是否声明了 from/to 变量
    pub fn has_variables(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// 动画规则
pub struct ScrollRule {
    target: Rc<dyn Element>,
    speed: Speed,
    condition: MediaCondition,
    trigger: TriggerSpec,
    offsets: SharedOffsets,
    controller: ScrollController,
    tween: Tween,
    range: ScrollRange,
    progress: f32,
}

impl std::fmt::Debug for ScrollRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollRule")
            .field("target", &self.target.label())
            .field("speed", &self.speed)
            .field("condition", &self.condition.to_string())
            .field("offsets", &self.offsets.get())
            .field("state", &self.controller.state())
            .field("range", &self.range)
            .finish()
    }
}

impl ScrollRule {
    /// 创建规则（尚未测量）
    pub fn new(
        target: Rc<dyn Element>,
        speed: Speed,
        condition: MediaCondition,
        inputs: &RuleInputs,
    ) -> Self {
        let offsets = SharedOffsets::new();
        let tween = Tween::new(
            target.clone(),
            offsets.clone(),
            inputs.from.as_ref(),
            inputs.to.as_ref(),
        );

        Self {
            trigger: TriggerSpec::new(speed.id(), inputs.markers),
            controller: ScrollController::new(speed, offsets.clone()),
            target,
            speed,
            condition,
            offsets,
            tween,
            range: ScrollRange::default(),
            progress: 0.0,
        }
    }

    /// 首次测量、初始隐藏并渲染当前滚动位置
    pub fn start(&mut self, tracker: &dyn ScrollTracker) {
        self.refresh(tracker);
        for update in self.controller.initial_styles() {
            self.target.set_style(update);
        }
        self.update(tracker.scroll());
    }

    /// 布局刷新：重新计算位移与触发区域
    ///
    /// clamp 模式需要先清除位移，使测量结果反映原始布局。
    pub fn refresh(&mut self, tracker: &dyn ScrollTracker) {
        if self.speed.clamp {
            self.target.clear_style(&StyleProperty::TranslateY);
            self.tween.invalidate();
        }

        let measurement = Measurement {
            viewport_height: tracker.viewport_height(),
            target_height: self.target.offset_height(),
            position_in_viewport: tracker.position_in_viewport(&*self.target),
            scroll: tracker.scroll(),
        };
        let mut offsets = OffsetPair::compute(&measurement, self.speed);
        if !offsets.is_finite() {
            warn!(
                target_label = %self.target.label(),
                speed = self.speed.value,
                ?measurement,
                "位移溢出，按 0 处理"
            );
            offsets = OffsetPair::default();
        }
        self.offsets.set(offsets);
        self.range = self.trigger.range(
            &offsets,
            tracker.layout_top(&*self.target),
            measurement.target_height,
            measurement.viewport_height,
        );

        debug!(
            target_label = %self.target.label(),
            id = %self.trigger.id,
            start_offset = offsets.start,
            end_offset = offsets.end,
            range_start = self.range.start,
            range_end = self.range.end,
            "刷新位移"
        );
    }

    /// 滚动更新
    ///
    /// 先处理状态转移，再按进度渲染，保证区域内位移始终是进度的线性函数。
    pub fn update(&mut self, scroll: f32) {
        let progress = self.range.progress(scroll);
        let (path, updates) = self.controller.advance(progress);

        if !path.is_empty() {
            trace!(target_label = %self.target.label(), id = %self.trigger.id, ?path, "状态转移");
            for update in updates {
                self.target.set_style(update);
            }
            self.tween.invalidate();
        }

        self.progress = progress;
        self.tween.render(progress);
    }

    /// 撤销规则写入的所有样式
    pub fn revert(&mut self) {
        self.tween.revert();
        self.target.clear_style(&StyleProperty::Visibility);
        self.target.clear_style(&StyleProperty::WillChange);
        debug!(target_label = %self.target.label(), id = %self.trigger.id, "撤销规则");
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn condition(&self) -> &MediaCondition {
        &self.condition
    }

    pub fn trigger(&self) -> &TriggerSpec {
        &self.trigger
    }

    pub fn offsets(&self) -> OffsetPair {
        self.offsets.get()
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }

    pub fn state(&self) -> ScrollState {
        self.controller.state()
    }

    /// 最近一次的原始进度
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> &Rc<dyn Element> {
        &self.target
    }
}

/// 媒体条件生效期间存活的规则绑定
///
/// 丢弃时撤销样式并取消追踪器订阅。
pub struct RuleBinding {
    rule: Rc<RefCell<ScrollRule>>,
    /// 目标元素描述，规则被借用时仍可用于日志
    label: String,
    _subscription: Subscription,
}

impl RuleBinding {
    /// 创建规则、完成首次测量并订阅追踪器
    pub fn bind(
        tracker: &dyn ScrollTracker,
        target: Rc<dyn Element>,
        speed: Speed,
        condition: MediaCondition,
        inputs: &RuleInputs,
    ) -> Self {
        let label = target.label();
        let rule = Rc::new(RefCell::new(ScrollRule::new(
            target, speed, condition, inputs,
        )));
        rule.borrow_mut().start(tracker);
        let subscription = tracker.observe(rule.clone());

        Self {
            rule,
            label,
            _subscription: subscription,
        }
    }

    pub fn rule(&self) -> &Rc<RefCell<ScrollRule>> {
        &self.rule
    }
}

impl std::fmt::Debug for RuleBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleBinding")
            .field("rule", &self.rule)
            .finish()
    }
}

impl Drop for RuleBinding {
    fn drop(&mut self) {
        match self.rule.try_borrow_mut() {
            Ok(mut rule) => rule.revert(),
            Err(_) => warn!(
                target_label = %self.label,
                "规则正在使用中，撤销被跳过，样式可能残留"
            ),
        }
    }
}
