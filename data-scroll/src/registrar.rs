//! # Registrar 模块
//!
//! 按元素注册断点规则。
//!
//! ```text
//! 元素属性/钩子 → RuleInputs
//!             → SpeedExpression::parse
//!             → plan_rules（断点解析 + 速度校验）
//!             → MediaMatcher::add（每条规则一个条件）
//! ```
//!
//! 规则级错误只产生诊断，不影响同一元素的其他 token，也不影响其他元素。

use std::rc::Rc;

use tracing::{debug, info};

use crate::breakpoint::{Bound, MediaCondition, Screens};
use crate::diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult};
use crate::element::{
    Document, Element, FROM_ATTRIBUTE, MARKERS_ATTRIBUTE, SPEED_ATTRIBUTE, TO_ATTRIBUTE,
};
use crate::error::ScrollError;
use crate::media::{MediaHandle, MediaMatcher};
use crate::options::Options;
use crate::rule::{RuleBinding, RuleInputs};
use crate::speed::{Speed, SpeedCheck, SpeedExpression, SpeedToken};
use crate::tracker::ScrollTracker;
use crate::tween::{TweenVars, parse_variables};

/// 未声明速度时的默认值
const DEFAULT_SPEED: &str = "1";

/// 一条待注册的规则
#[derive(Debug, Clone, PartialEq)]
pub struct RulePlan {
    pub token: SpeedToken,
    pub condition: MediaCondition,
    pub speed: Speed,
}

/// 为解析后的表达式生成规则
///
/// 每个 token 的条件为自身断点的 min 与下一个 token 断点的 max 的合取。
/// 值无效的 token 不生成规则，但仍作为下一个边界。
pub fn plan_rules(
    expression: &SpeedExpression,
    screens: &Screens,
    has_variables: bool,
) -> (Vec<RulePlan>, DiagnosticResult) {
    let mut plans = Vec::new();
    let mut diagnostics = DiagnosticResult::new();
    let warn = |error: ScrollError, token: &SpeedToken| {
        Diagnostic::warn(&expression.source, error).with_token(&token.text)
    };

    for (index, token) in expression.tokens.iter().enumerate() {
        let min = match screens.resolve(token.screen.as_deref(), Bound::Min) {
            Ok(clause) => clause,
            Err(e) => {
                diagnostics.push(warn(e, token));
                continue;
            }
        };

        let max = match expression.tokens.get(index + 1) {
            None => None,
            Some(next) => {
                let Some(next_screen) = next.screen.as_deref() else {
                    diagnostics.push(warn(
                        ScrollError::MissingBreakpoint {
                            token: next.text.clone(),
                        },
                        token,
                    ));
                    continue;
                };
                match screens.resolve(Some(next_screen), Bound::Max) {
                    Ok(clause) => Some(clause),
                    Err(e) => {
                        diagnostics.push(warn(e, token));
                        continue;
                    }
                }
            }
        };

        match token.check(has_variables) {
            SpeedCheck::Animate(speed) => plans.push(RulePlan {
                token: token.clone(),
                condition: MediaCondition::new(min, max),
                speed,
            }),
            SpeedCheck::NoOp => {}
            SpeedCheck::Skip(error @ ScrollError::NotANumber { .. }) => {
                let mut diagnostic = warn(error, token);
                diagnostic.level = DiagnosticLevel::Info;
                diagnostics.push(diagnostic);
            }
            SpeedCheck::Skip(error) => diagnostics.push(warn(error, token)),
        }
    }

    (plans, diagnostics)
}

/// 静态检查速度表达式（不需要元素与执行器）
///
/// 返回与注册时相同的诊断，假定元素没有 from/to 变量。
pub fn analyze_speed(source: &str, screens: &Screens) -> DiagnosticResult {
    let expression = SpeedExpression::parse(source);
    let mut result = expression.diagnostics.clone();
    let (_, diagnostics) = plan_rules(&expression, screens, false);
    result.merge(diagnostics);
    result
}

/// 单次 `apply` 的结果
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// 登记的条件数量
    pub registered: usize,
    pub diagnostics: DiagnosticResult,
}

impl ApplyReport {
    fn merge(&mut self, other: ApplyReport) {
        self.registered += other.registered;
        self.diagnostics.merge(other.diagnostics);
    }
}

/// 视差注册器
///
/// 持有自己的断点执行器，多个实例之间互不影响。
pub struct DataScroll<M: MediaMatcher> {
    options: Options,
    matcher: M,
    tracker: Rc<dyn ScrollTracker>,
    handles: Vec<MediaHandle>,
}

impl<M: MediaMatcher> std::fmt::Debug for DataScroll<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataScroll")
            .field("options", &self.options)
            .field("handles", &self.handles.len())
            .finish()
    }
}

impl<M: MediaMatcher> DataScroll<M> {
    /// 创建注册器（不扫描文档）
    pub fn new(options: Options, matcher: M, tracker: Rc<dyn ScrollTracker>) -> Self {
        Self {
            options,
            matcher,
            tracker,
            handles: Vec::new(),
        }
    }

    /// 创建注册器；`autoStart` 开启时注册文档中所有匹配元素
    pub fn start(
        options: Options,
        matcher: M,
        tracker: Rc<dyn ScrollTracker>,
        document: &dyn Document,
    ) -> (Self, ApplyReport) {
        let mut scroll = Self::new(options, matcher, tracker);
        let mut report = ApplyReport::default();

        if scroll.options.config.auto_start {
            let targets = document.query_all(&scroll.options.config.selector);
            info!(count = targets.len(), selector = %scroll.options.config.selector, "自动注册元素");
            for target in targets {
                report.merge(scroll.apply(target));
            }
        }

        (scroll, report)
    }

    /// 注册单个元素
    pub fn apply(&mut self, target: Rc<dyn Element>) -> ApplyReport {
        let mut report = ApplyReport::default();
        let inputs = self.resolve_inputs(&*target, &mut report.diagnostics);

        let expression = SpeedExpression::parse(&inputs.speed);
        report.diagnostics.merge(expression.diagnostics.clone());

        let (plans, diagnostics) = plan_rules(
            &expression,
            &self.options.config.screens,
            inputs.has_variables(),
        );
        report.diagnostics.merge(diagnostics);

        let inputs = Rc::new(inputs);
        for plan in plans {
            debug!(
                target_label = %target.label(),
                condition = %plan.condition,
                speed = plan.speed.value,
                clamp = plan.speed.clamp,
                "登记规则"
            );
            let tracker = self.tracker.clone();
            let target = target.clone();
            let inputs = inputs.clone();
            let condition = plan.condition.clone();
            let speed = plan.speed;
            let handle = self.matcher.add(
                plan.condition,
                Box::new(move || {
                    RuleBinding::bind(
                        &*tracker,
                        target.clone(),
                        speed,
                        condition.clone(),
                        &inputs,
                    )
                }),
            );
            self.handles.push(handle);
            report.registered += 1;
        }

        report.diagnostics.emit();
        report
    }

    /// 撤销自创建以来的所有登记（可重复调用）
    pub fn destroy(&mut self) {
        if !self.handles.is_empty() {
            info!(count = self.handles.len(), "撤销所有规则");
        }
        self.matcher.revert_all();
        self.handles.clear();
    }

    /// 已登记的条件数量
    pub fn registered(&self) -> usize {
        self.handles.len()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn matcher_mut(&mut self) -> &mut M {
        &mut self.matcher
    }

    /// 读取元素输入：钩子优先，否则读取属性
    fn resolve_inputs(&self, target: &dyn Element, diagnostics: &mut DiagnosticResult) -> RuleInputs {
        let hooks = &self.options.hooks;

        let speed = match &hooks.speed {
            Some(hook) => hook(target),
            None => target.attribute(SPEED_ATTRIBUTE),
        }
        .unwrap_or_else(|| DEFAULT_SPEED.to_string());

        let from = match &hooks.from {
            Some(hook) => hook(target),
            None => read_variables(target, FROM_ATTRIBUTE, &speed, diagnostics),
        };
        let to = match &hooks.to {
            Some(hook) => hook(target),
            None => read_variables(target, TO_ATTRIBUTE, &speed, diagnostics),
        };
        let markers = match &hooks.markers {
            Some(hook) => hook(target),
            None => target.has_attribute(MARKERS_ATTRIBUTE),
        };

        RuleInputs {
            speed,
            from,
            to,
            markers,
        }
    }
}

/// 读取并解析 from/to 属性，失败时记录警告并视为未声明
fn read_variables(
    target: &dyn Element,
    attribute: &str,
    source: &str,
    diagnostics: &mut DiagnosticResult,
) -> Option<TweenVars> {
    let text = target.attribute(attribute)?;
    match parse_variables(attribute, &text) {
        Ok(vars) => Some(vars),
        Err(e) => {
            diagnostics.push(Diagnostic::warn(source, e).with_token(text));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Visibility;
    use crate::options::ScrollConfig;
    use crate::testing::{FakeDocument, FakeElement, FakeMatcher, FakeTracker};
    use serde_json::json;

    fn conditions(source: &str) -> Vec<String> {
        let expression = SpeedExpression::parse(source);
        let (plans, _) = plan_rules(&expression, &Screens::default(), false);
        plans.iter().map(|p| p.condition.to_string()).collect()
    }

    #[test]
    fn test_plan_single_value() {
        assert_eq!(conditions("2"), vec!["(min-width: 0px)"]);
    }

    #[test]
    fn test_plan_breakpoint_ranges() {
        assert_eq!(
            conditions("md:2 lg:clamp(1.5)"),
            vec![
                "(min-width: 768px) and (max-width: 1023px)",
                "(min-width: 1024px)"
            ]
        );
        assert_eq!(
            conditions("2 md:3"),
            vec!["(min-width: 0px) and (max-width: 767px)", "(min-width: 768px)"]
        );
    }

    #[test]
    fn test_no_op_token_still_bounds_previous() {
        assert_eq!(
            conditions("md:2 lg:1"),
            vec!["(min-width: 768px) and (max-width: 1023px)"]
        );
    }

    #[test]
    fn test_unknown_breakpoint_skips_only_affected_rules() {
        let expression = SpeedExpression::parse("sm:2 huge:3 xl:4");
        let (plans, diagnostics) = plan_rules(&expression, &Screens::default(), false);
        // sm 的 max 依赖 huge，huge 的 min 依赖 huge，都被跳过
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].condition.to_string(), "(min-width: 1280px)");
        assert_eq!(diagnostics.warn_count(), 2);
    }

    #[test]
    fn test_invalid_speed_warns_once_per_token() {
        let result = analyze_speed("0 md:-1 lg:2", &Screens::default());
        assert_eq!(result.warn_count(), 2);
        insta::assert_snapshot!(result.to_string(), @r#"
        [WARN] "0 md:-1 lg:2": 速度必须大于 0（0）
        [WARN] "0 md:-1 lg:2": 速度必须大于 0（-1）
        "#);
    }

    #[test]
    fn test_not_a_number_is_informational() {
        let result = analyze_speed("md:fast", &Screens::default());
        assert_eq!(result.warn_count(), 0);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Info);
    }

    #[test]
    fn test_speed_one_registers_nothing() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("plain", 100.0).with_attribute(SPEED_ATTRIBUTE, "1");
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker);

        let report = scroll.apply(element);
        assert_eq!(report.registered, 0);
        assert!(report.diagnostics.is_empty());
        assert!(scroll.matcher().is_empty());
    }

    #[test]
    fn test_speed_one_with_variables_is_animated() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("fade", 100.0)
            .with_attribute(FROM_ATTRIBUTE, r#"{"opacity": 0}"#)
            .with_attribute(TO_ATTRIBUTE, r#"{"opacity": 1}"#);
        tracker.place(&element, 1000.0);
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker.clone());

        let report = scroll.apply(element.clone());
        assert_eq!(report.registered, 1);
        assert_eq!(element.variable("opacity"), Some(json!(0.0)));
        assert_eq!(element.translate_y(), Some(0.0));
    }

    #[test]
    fn test_malformed_variables_warn_and_fall_back() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("broken", 100.0).with_attribute(FROM_ATTRIBUTE, "{oops");
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker);

        let report = scroll.apply(element);
        // 速度默认 1 且变量无效：无事可做
        assert_eq!(report.registered, 0);
        assert_eq!(report.diagnostics.warn_count(), 1);
    }

    #[test]
    fn test_hooks_override_attributes() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("hooked", 200.0).with_attribute(SPEED_ATTRIBUTE, "1");
        tracker.place(&element, 2000.0);
        let options = Options::default()
            .with_speed(|_| Some("2".to_string()))
            .with_markers(|_| true);
        let mut scroll = DataScroll::new(options, FakeMatcher::new(1280.0), tracker.clone());

        let report = scroll.apply(element.clone());
        assert_eq!(report.registered, 1);
        let rule = tracker.rule(0);
        assert_eq!(rule.borrow().speed(), Speed::new(2.0));
        assert!(rule.borrow().trigger().markers);
        assert_eq!(rule.borrow().trigger().id, "2");
    }

    #[test]
    fn test_start_registers_matching_elements() {
        let tracker = FakeTracker::new(800.0);
        let a = FakeElement::new("a", 200.0).with_attribute(SPEED_ATTRIBUTE, "2");
        let b = FakeElement::new("b", 200.0).with_attribute(SPEED_ATTRIBUTE, "md:0.5");
        let c = FakeElement::new("c", 200.0);
        tracker.place(&a, 1000.0);
        tracker.place(&b, 2000.0);
        tracker.place(&c, 3000.0);
        let document = FakeDocument::new(vec![a.clone(), b.clone(), c.clone()]);

        let (scroll, report) = DataScroll::start(
            Options::default(),
            FakeMatcher::new(1280.0),
            tracker.clone(),
            &document,
        );
        assert_eq!(report.registered, 2);
        assert_eq!(scroll.registered(), 2);
        assert_eq!(tracker.observer_count(), 2);
    }

    #[test]
    fn test_start_without_auto_start() {
        let tracker = FakeTracker::new(800.0);
        let a = FakeElement::new("a", 200.0).with_attribute(SPEED_ATTRIBUTE, "2");
        let document = FakeDocument::new(vec![a]);
        let config = ScrollConfig {
            auto_start: false,
            ..ScrollConfig::default()
        };

        let (scroll, report) =
            DataScroll::start(Options::new(config), FakeMatcher::new(1280.0), tracker, &document);
        assert_eq!(report.registered, 0);
        assert_eq!(scroll.registered(), 0);
    }

    #[test]
    fn test_destroy_stops_all_mutation() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("hero", 200.0).with_attribute(SPEED_ATTRIBUTE, "2 md:3");
        tracker.place(&element, 2000.0);
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker.clone());

        scroll.apply(element.clone());
        assert_eq!(element.visibility(), Some(Visibility::Hidden));
        scroll.destroy();

        assert_eq!(tracker.observer_count(), 0);
        assert_eq!(element.visibility(), None);
        assert_eq!(element.translate_y(), None);

        let writes = element.write_count();
        tracker.scroll_to(1700.0);
        tracker.set_viewport_height(600.0);
        tracker.refresh();
        assert_eq!(element.write_count(), writes);

        // 重复调用安全
        scroll.destroy();
        assert_eq!(scroll.registered(), 0);
    }

    #[test]
    fn test_breakpoint_switch_swaps_rules() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("hero", 200.0).with_attribute(SPEED_ATTRIBUTE, "2 lg:0.5");
        tracker.place(&element, 2000.0);
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(800.0), tracker.clone());

        scroll.apply(element.clone());
        assert_eq!(scroll.matcher().active_count(), 1);
        assert_eq!(element.visibility(), Some(Visibility::Hidden));
        assert_eq!(element.translate_y(), Some(250.0));

        scroll.matcher_mut().set_width(1280.0);
        assert_eq!(scroll.matcher().active_count(), 1);
        assert_eq!(tracker.observer_count(), 1);
        assert_eq!(element.visibility(), None);
        assert_eq!(element.translate_y(), Some(-500.0));
        assert_eq!(tracker.rule(0).borrow().speed(), Speed::new(0.5));
    }

    #[test]
    fn test_destroy_without_registrations() {
        let tracker = FakeTracker::new(800.0);
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker);
        scroll.destroy();
        assert_eq!(scroll.registered(), 0);
    }

    #[test]
    fn test_independent_instances() {
        let tracker = FakeTracker::new(800.0);
        let a = FakeElement::new("a", 200.0).with_attribute(SPEED_ATTRIBUTE, "2");
        let b = FakeElement::new("b", 200.0).with_attribute(SPEED_ATTRIBUTE, "0.5");
        tracker.place(&a, 1000.0);
        tracker.place(&b, 2000.0);

        let mut first = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker.clone());
        let mut second = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker.clone());
        first.apply(a.clone());
        second.apply(b.clone());

        first.destroy();
        assert_eq!(a.translate_y(), None);
        assert!(b.translate_y().is_some());
        assert_eq!(tracker.observer_count(), 1);
    }

    #[test]
    fn test_end_to_end_offsets() {
        let tracker = FakeTracker::new(800.0);
        let element = FakeElement::new("hero", 200.0).with_attribute(SPEED_ATTRIBUTE, "2");
        tracker.place(&element, 2000.0);
        let mut scroll = DataScroll::new(Options::default(), FakeMatcher::new(1280.0), tracker.clone());
        scroll.apply(element);

        let rule = tracker.rule(0);
        let offsets = rule.borrow().offsets();
        assert_eq!(offsets.end, -250.0);
        assert_eq!(offsets.start, 250.0);
    }
}
