//! # Offset 模块
//!
//! 根据视口高度、元素高度和速度计算起止位移。
//!
//! 只在布局刷新时重新计算，滚动帧内只读取结果。

use std::cell::Cell;
use std::rc::Rc;

use crate::speed::Speed;

/// 一次布局测量
///
/// 由滚动追踪器在刷新时提供，测量前元素上的位移已被清除。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// 视口高度
    pub viewport_height: f32,
    /// 元素渲染高度
    pub target_height: f32,
    /// 元素顶部在视口中的位置（0 = 视口顶部，1 = 视口底部）
    pub position_in_viewport: f32,
    /// 当前滚动距离
    pub scroll: f32,
}

impl Measurement {
    /// 元素顶部距视口顶部的像素距离
    pub fn from_viewport_top(&self) -> f32 {
        self.viewport_height * self.position_in_viewport
    }

    /// 元素顶部距页面顶部的像素距离
    pub fn from_page_top(&self) -> f32 {
        self.from_viewport_top() + self.scroll
    }
}

/// 起止位移
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OffsetPair {
    pub start: f32,
    pub end: f32,
}

impl OffsetPair {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// 计算起止位移
    ///
    /// 默认以元素中心穿过视口中线为对称点：
    /// `end = (vh/2 + h/2) * (1/speed - 1)`，`start = -end`。
    ///
    /// clamp 模式下，若元素位于页面第一屏内，起点固定为 0，
    /// 避免页面加载时已可见的元素在滚动前发生跳动：
    /// `end = (fromViewportTop + h) * (1/speed - 1)`。
    pub fn compute(measurement: &Measurement, speed: Speed) -> Self {
        let factor = speed.factor();

        if speed.clamp && measurement.from_page_top() < measurement.viewport_height {
            let end = (measurement.from_viewport_top() + measurement.target_height) * factor;
            return Self::new(0.0, end);
        }

        let end = (measurement.viewport_height / 2.0 + measurement.target_height / 2.0) * factor;
        Self::new(-end, end)
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// 按进度线性插值（无缓动）
    pub fn lerp(&self, progress: f32) -> f32 {
        let t = progress.clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }
}

/// 在规则、补间与触发器之间共享的位移
///
/// 刷新时写入，每帧读取，不做快照。
#[derive(Debug, Clone, Default)]
pub struct SharedOffsets(Rc<Cell<OffsetPair>>);

impl SharedOffsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> OffsetPair {
        self.0.get()
    }

    pub fn start(&self) -> f32 {
        self.0.get().start
    }

    pub fn end(&self) -> f32 {
        self.0.get().end
    }

    /// 写入新值，返回是否发生变化
    pub fn set(&self, offsets: OffsetPair) -> bool {
        self.0.replace(offsets) != offsets
    }
}
