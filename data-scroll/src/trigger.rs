//! # Trigger 模块
//!
//! 规则向滚动追踪器声明的触发区域。
//!
//! - 起点：元素顶部 + startOffset 到达视口底部；startOffset 为 0 时直接从页面顶部开始
//! - 终点：元素底部 + endOffset 到达视口顶部

use crate::offset::OffsetPair;

/// 触发起点
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerStart {
    /// 页面顶部（滚动距离 0）
    PageTop,
    /// `top+=<offset>px bottom`
    TopAtViewportBottom(f32),
}

impl std::fmt::Display for TriggerStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageTop => write!(f, "0"),
            Self::TopAtViewportBottom(offset) => write!(f, "top+={}px bottom", offset),
        }
    }
}

/// 触发终点：`bottom+=<offset>px top`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEnd(pub f32);

impl std::fmt::Display for TriggerEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bottom+={}px top", self.0)
    }
}

/// 触发器声明
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSpec {
    /// 标识（速度的字符串形式，仅用于调试标记）
    pub id: String,
    /// 是否显示调试标记
    pub markers: bool,
    /// 进度直接跟随滚动
    pub scrub: bool,
    /// 刷新时重新计算位移
    pub invalidate_on_refresh: bool,
    /// 刷新顺序（越小越晚）
    pub refresh_priority: i32,
}

impl TriggerSpec {
    pub fn new(id: impl Into<String>, markers: bool) -> Self {
        Self {
            id: id.into(),
            markers,
            scrub: true,
            invalidate_on_refresh: true,
            refresh_priority: -999,
        }
    }

    pub fn start(&self, offsets: &OffsetPair) -> TriggerStart {
        if offsets.start == 0.0 {
            TriggerStart::PageTop
        } else {
            TriggerStart::TopAtViewportBottom(offsets.start)
        }
    }

    pub fn end(&self, offsets: &OffsetPair) -> TriggerEnd {
        TriggerEnd(offsets.end)
    }

    /// 解析为绝对滚动距离
    ///
    /// `page_top` 为元素（未位移时）顶部距页面顶部的距离。
    pub fn range(
        &self,
        offsets: &OffsetPair,
        page_top: f32,
        target_height: f32,
        viewport_height: f32,
    ) -> ScrollRange {
        let start = match self.start(offsets) {
            TriggerStart::PageTop => 0.0,
            TriggerStart::TopAtViewportBottom(offset) => page_top + offset - viewport_height,
        };
        let end = page_top + target_height + self.end(offsets).0;
        ScrollRange { start, end }
    }
}

/// 触发区域在滚动轴上的范围
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollRange {
    pub start: f32,
    pub end: f32,
}

impl ScrollRange {
    /// 原始进度（未截断）
    ///
    /// 区域长度为 0 或负数时退化为阶跃：越过终点为 1，否则为 0。
    pub fn progress(&self, scroll: f32) -> f32 {
        let length = self.end - self.start;
        if length <= 0.0 {
            return if scroll >= self.end { 1.0 } else { 0.0 };
        }
        (scroll - self.start) / length
    }
}
