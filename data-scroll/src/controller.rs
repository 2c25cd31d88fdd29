//! # Controller 模块
//!
//! 单条规则的滚动状态机。
//!
//! ```text
//!            Enter              Leave
//!   Before ────────► Active ────────► After
//!          ◄────────        ◄────────
//!          LeaveBack        EnterBack
//! ```
//!
//! 状态由原始进度决定：`p <= 0` 为 Before，`0 < p < 1` 为 Active，`p >= 1` 为 After。
//! 一次跳过整个区域（Before → After）会依次经过两条边，两组副作用都会执行。
//!
//! 状态机本身不写样式，只返回需要应用的 [`StyleUpdate`]。

use crate::element::{StyleUpdate, Visibility, WillChange};
use crate::offset::SharedOffsets;
use crate::speed::Speed;

/// 相对触发区域的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollState {
    /// 尚未到达起点
    #[default]
    Before,
    /// 位于 [start, end] 之间
    Active,
    /// 已越过终点
    After,
}

impl ScrollState {
    /// 根据原始（未截断的）进度判定状态
    pub fn from_progress(progress: f32) -> Self {
        if progress <= 0.0 {
            Self::Before
        } else if progress >= 1.0 {
            Self::After
        } else {
            Self::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// 状态转移
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// 向下滚动越过起点
    Enter,
    /// 向下滚动越过终点
    Leave,
    /// 向上滚动回到区域内
    EnterBack,
    /// 向上滚动越过起点
    LeaveBack,
}

impl Transition {
    /// 从 `from` 到 `to` 需要经过的边
    pub fn path(from: ScrollState, to: ScrollState) -> &'static [Transition] {
        use ScrollState::*;
        match (from, to) {
            (Before, Active) => &[Transition::Enter],
            (Before, After) => &[Transition::Enter, Transition::Leave],
            (Active, After) => &[Transition::Leave],
            (After, Active) => &[Transition::EnterBack],
            (After, Before) => &[Transition::EnterBack, Transition::LeaveBack],
            (Active, Before) => &[Transition::LeaveBack],
            _ => &[],
        }
    }
}

/// 滚动状态机
#[derive(Debug, Clone)]
pub struct ScrollController {
    state: ScrollState,
    speed: Speed,
    offsets: SharedOffsets,
}

impl ScrollController {
    pub fn new(speed: Speed, offsets: SharedOffsets) -> Self {
        Self {
            state: ScrollState::Before,
            speed,
            offsets,
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// 首次测量后的初始样式
    ///
    /// 速度大于 1 且起点位移非 0 时先隐藏元素，首次进入 Active 时恢复。
    pub fn initial_styles(&self) -> Vec<StyleUpdate> {
        if self.speed.value > 1.0 && self.offsets.start() != 0.0 {
            vec![StyleUpdate::Visibility(Visibility::Hidden)]
        } else {
            Vec::new()
        }
    }

    /// 推进到新的进度，返回经过的边与对应的样式写入
    pub fn advance(&mut self, progress: f32) -> (Vec<Transition>, Vec<StyleUpdate>) {
        let next = ScrollState::from_progress(progress);
        let path = Transition::path(self.state, next);

        let mut updates = Vec::new();
        for &transition in path {
            updates.extend(self.handle(transition));
        }
        self.state = next;
        (path.to_vec(), updates)
    }

    /// 处理单条边
    pub fn handle(&mut self, transition: Transition) -> Vec<StyleUpdate> {
        match transition {
            Transition::Enter => self.on_enter(),
            Transition::Leave => self.on_leave(),
            Transition::EnterBack => self.on_enter_back(),
            Transition::LeaveBack => self.on_leave_back(),
        }
    }

    fn on_enter(&mut self) -> Vec<StyleUpdate> {
        self.state = ScrollState::Active;
        let mut updates = vec![StyleUpdate::TranslateY(self.offsets.start())];
        if self.speed.value > 1.0 {
            updates.push(StyleUpdate::Visibility(Visibility::Initial));
        }
        updates.push(self.on_toggle(true));
        updates
    }

    fn on_leave(&mut self) -> Vec<StyleUpdate> {
        self.state = ScrollState::After;
        vec![StyleUpdate::TranslateY(self.offsets.end()), self.on_toggle(false)]
    }

    fn on_enter_back(&mut self) -> Vec<StyleUpdate> {
        self.state = ScrollState::Active;
        vec![StyleUpdate::TranslateY(self.offsets.end()), self.on_toggle(true)]
    }

    fn on_leave_back(&mut self) -> Vec<StyleUpdate> {
        self.state = ScrollState::Before;
        vec![StyleUpdate::TranslateY(self.offsets.start()), self.on_toggle(false)]
    }

    fn on_toggle(&self, active: bool) -> StyleUpdate {
        StyleUpdate::WillChange(if active {
            WillChange::Transform
        } else {
            WillChange::Auto
        })
    }
}
