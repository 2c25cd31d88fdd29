//! # Tween 模块
//!
//! 由滚动进度驱动的补间。
//!
//! 与时间轴动画不同，这里没有时长与缓动：进度直接来自滚动追踪器，
//! 位移按进度线性插值。位移的起止值每帧从 [`SharedOffsets`] 读取，
//! 刷新后自动生效。

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::element::{Element, StyleProperty, StyleUpdate};
use crate::error::{ScrollError, ScrollResult};
use crate::offset::SharedOffsets;

/// from/to 变量（JSON 对象）
pub type TweenVars = Map<String, Value>;

/// 位移属性名，总是由计算结果接管
const DISPLACEMENT_KEY: &str = "y";

/// 解析 from/to 属性中的 JSON
pub fn parse_variables(attribute: &str, text: &str) -> ScrollResult<TweenVars> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(vars)) => Ok(vars),
        Ok(other) => Err(ScrollError::MalformedVariables {
            attribute: attribute.to_string(),
            message: format!("期望对象，实际为 {}", other),
        }),
        Err(e) => Err(ScrollError::MalformedVariables {
            attribute: attribute.to_string(),
            message: e.to_string(),
        }),
    }
}

/// 单个自定义变量的补间轨道
#[derive(Debug, Clone, PartialEq)]
struct VariableTrack {
    name: String,
    from: Option<Value>,
    to: Option<Value>,
    /// 只在 to 中声明时，从元素当前值开始
    captured: Option<f64>,
}

impl VariableTrack {
    fn value_at(&self, progress: f32) -> Option<Value> {
        let t = f64::from(progress.clamp(0.0, 1.0));
        let from = self
            .from
            .as_ref()
            .and_then(Value::as_f64)
            .or(self.captured);
        let to = self.to.as_ref().and_then(Value::as_f64);

        match (from, to) {
            (Some(a), Some(b)) => Some(Value::from(a + (b - a) * t)),
            _ => match (&self.from, &self.to) {
                (_, Some(to)) if t >= 1.0 => Some(to.clone()),
                (Some(from), _) => Some(from.clone()),
                _ => None,
            },
        }
    }
}

/// 已渲染的帧（用于跳过重复写入）
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    progress: f32,
    y: f32,
}

/// 滚动补间
///
/// 把进度映射为位移与自定义变量，并写入目标元素。
pub struct Tween {
    target: Rc<dyn Element>,
    offsets: SharedOffsets,
    tracks: Vec<VariableTrack>,
    last: Option<Frame>,
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("target", &self.target.label())
            .field("tracks", &self.tracks.len())
            .field("last", &self.last)
            .finish()
    }
}

impl Tween {
    /// 创建补间
    pub fn new(
        target: Rc<dyn Element>,
        offsets: SharedOffsets,
        from: Option<&TweenVars>,
        to: Option<&TweenVars>,
    ) -> Self {
        let mut names: Vec<&String> = from
            .into_iter()
            .chain(to)
            .flat_map(|vars| vars.keys())
            .filter(|name| name.as_str() != DISPLACEMENT_KEY)
            .collect();
        names.sort();
        names.dedup();

        let tracks = names
            .into_iter()
            .map(|name| {
                let from_value = from.and_then(|vars| vars.get(name)).cloned();
                let to_value = to.and_then(|vars| vars.get(name)).cloned();
                let captured = if from_value.is_none() {
                    target.numeric_style(name)
                } else {
                    None
                };
                VariableTrack {
                    name: name.clone(),
                    from: from_value,
                    to: to_value,
                    captured,
                }
            })
            .collect();

        Self {
            target,
            offsets,
            tracks,
            last: None,
        }
    }

    /// 自定义变量数量
    pub fn variable_count(&self) -> usize {
        self.tracks.len()
    }

    /// 按进度渲染
    ///
    /// 进度与位移都未变化时不写入任何样式。
    pub fn render(&mut self, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        let frame = Frame {
            progress,
            y: self.offsets.get().lerp(progress),
        };
        if self.last == Some(frame) {
            return;
        }

        self.target.set_style(StyleUpdate::TranslateY(frame.y));
        for track in &self.tracks {
            if let Some(value) = track.value_at(progress) {
                self.target.set_style(StyleUpdate::Variable {
                    name: track.name.clone(),
                    value,
                });
            }
        }
        self.last = Some(frame);
    }

    /// 丢弃缓存，下一次 render 必然写入
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// 清除补间写入的所有样式
    pub fn revert(&mut self) {
        self.target.clear_style(&StyleProperty::TranslateY);
        for track in &self.tracks {
            self.target
                .clear_style(&StyleProperty::Variable(track.name.clone()));
        }
        self.last = None;
    }
}
