//! # Element 模块
//!
//! 被驱动元素的抽象接口。
//!
//! 核心库不假设宿主类型：宿主实现 [`Element`]，核心只通过它读取声明属性、
//! 查询高度、写入样式。写入通过 `&self` 完成，宿主使用 `RefCell` 等内部可变性实现，
//! 这样多条规则可以同时持有同一个元素。

use std::rc::Rc;

use serde_json::Value;

/// 速度表达式属性
pub const SPEED_ATTRIBUTE: &str = "data-scroll-speed";
/// 起始变量属性（JSON 对象）
pub const FROM_ATTRIBUTE: &str = "data-scroll-from";
/// 结束变量属性（JSON 对象）
pub const TO_ATTRIBUTE: &str = "data-scroll-to";
/// 调试标记属性（仅判断是否存在）
pub const MARKERS_ATTRIBUTE: &str = "data-scroll-markers";

/// 可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Hidden,
    /// 恢复自然状态
    Initial,
}

/// 渲染优化提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WillChange {
    Transform,
    Auto,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hidden => write!(f, "hidden"),
            Self::Initial => write!(f, "initial"),
        }
    }
}

impl std::fmt::Display for WillChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transform => write!(f, "transform"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// 单次样式写入
#[derive(Debug, Clone, PartialEq)]
pub enum StyleUpdate {
    /// 垂直位移（px）
    TranslateY(f32),
    Visibility(Visibility),
    WillChange(WillChange),
    /// 来自 from/to 的自定义变量
    Variable { name: String, value: Value },
}

impl StyleUpdate {
    /// 该写入对应的样式属性
    pub fn property(&self) -> StyleProperty {
        match self {
            Self::TranslateY(_) => StyleProperty::TranslateY,
            Self::Visibility(_) => StyleProperty::Visibility,
            Self::WillChange(_) => StyleProperty::WillChange,
            Self::Variable { name, .. } => StyleProperty::Variable(name.clone()),
        }
    }
}

/// 样式属性（用于清除）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    TranslateY,
    Visibility,
    WillChange,
    Variable(String),
}

/// 被驱动的元素
pub trait Element {
    /// 元素标识（仅用于日志）
    fn label(&self) -> String;

    /// 读取属性
    fn attribute(&self, name: &str) -> Option<String>;

    /// 是否存在属性
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// 渲染高度
    fn offset_height(&self) -> f32;

    /// 写入内联样式
    fn set_style(&self, update: StyleUpdate);

    /// 清除内联样式
    fn clear_style(&self, property: &StyleProperty);

    /// 当前数值样式（用于只在 to 中声明的变量的起点）
    fn numeric_style(&self, _name: &str) -> Option<f64> {
        None
    }
}

/// 元素查询接口（自动注册时使用）
pub trait Document {
    /// 返回所有匹配选择器的元素（文档顺序）
    fn query_all(&self, selector: &crate::options::Selector) -> Vec<Rc<dyn Element>>;
}
