//! 模拟视口：宽高与滚动位置，由追踪器、断点匹配器和模拟器共享。

use std::cell::Cell;

#[derive(Debug)]
pub struct Viewport {
    width: Cell<f32>,
    height: Cell<f32>,
    scroll: Cell<f32>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Cell::new(width),
            height: Cell::new(height),
            scroll: Cell::new(0.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.width.get()
    }

    pub fn height(&self) -> f32 {
        self.height.get()
    }

    pub fn scroll(&self) -> f32 {
        self.scroll.get()
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.width.set(width);
        self.height.set(height);
    }

    /// 设置滚动位置（负值截断为 0）
    pub fn scroll_to(&self, scroll: f32) {
        self.scroll.set(scroll.max(0.0));
    }
}
