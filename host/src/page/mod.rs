//! # Page 模块
//!
//! 模拟页面：从 JSON 描述加载一组绝对定位的元素。
//!
//! ```json
//! {
//!   "elements": [
//!     { "id": "hero", "top": 1200, "height": 200,
//!       "attributes": { "data-scroll-speed": "2 lg:1.5" },
//!       "styles": { "opacity": 0.5 } }
//!   ]
//! }
//! ```
//!
//! 元素的内联样式由 data-scroll 通过 [`Element`] 接口写入。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use data_scroll::{
    Document, Element, Selector, StyleProperty, StyleUpdate, Visibility, WillChange,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 页面加载错误
#[derive(Debug, Error)]
pub enum PageError {
    #[error("页面文件读取失败: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("页面描述解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("元素 id 重复: {0}")]
    DuplicateId(String),

    #[error("元素 {id} 的尺寸无效（top = {top}, height = {height}）")]
    InvalidGeometry { id: String, top: f32, height: f32 },
}

/// 页面描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

/// 元素描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    /// 顶部距页面顶部（px）
    pub top: f32,
    /// 高度（px）
    pub height: f32,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// 已有的数值样式（补间只有终值时作为起点）
    #[serde(default)]
    pub styles: BTreeMap<String, f64>,
}

impl ElementSpec {
    pub fn new(id: impl Into<String>, top: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            top,
            height,
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_style(mut self, name: &str, value: f64) -> Self {
        self.styles.insert(name.to_string(), value);
        self
    }
}

/// 内联样式
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub translate_y: Option<f32>,
    pub visibility: Option<Visibility>,
    pub will_change: Option<WillChange>,
    pub variables: BTreeMap<String, Value>,
}

impl InlineStyle {
    pub fn is_empty(&self) -> bool {
        self.translate_y.is_none()
            && self.visibility.is_none()
            && self.will_change.is_none()
            && self.variables.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(y) = self.translate_y {
            parts.push(format!("transform: translateY({}px)", y));
        }
        if let Some(visibility) = self.visibility {
            parts.push(format!("visibility: {}", visibility));
        }
        if let Some(will_change) = self.will_change {
            parts.push(format!("will-change: {}", will_change));
        }
        for (name, value) in &self.variables {
            parts.push(format!("{}: {}", name, value));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// 页面中的元素
#[derive(Debug)]
pub struct PageElement {
    spec: ElementSpec,
    style: RefCell<InlineStyle>,
}

impl PageElement {
    pub fn new(spec: ElementSpec) -> Self {
        Self {
            spec,
            style: RefCell::new(InlineStyle::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// 布局位置（不含位移）
    pub fn top(&self) -> f32 {
        self.spec.top
    }

    /// 渲染位置（含位移）
    pub fn rendered_top(&self) -> f32 {
        self.spec.top + self.style.borrow().translate_y.unwrap_or(0.0)
    }

    pub fn style(&self) -> InlineStyle {
        self.style.borrow().clone()
    }

    pub fn translate_y(&self) -> Option<f32> {
        self.style.borrow().translate_y
    }
}

impl Element for PageElement {
    fn label(&self) -> String {
        self.spec.id.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.spec.attributes.get(name).cloned()
    }

    fn offset_height(&self) -> f32 {
        self.spec.height
    }

    fn set_style(&self, update: StyleUpdate) {
        let mut style = self.style.borrow_mut();
        match update {
            StyleUpdate::TranslateY(y) => style.translate_y = Some(y),
            StyleUpdate::Visibility(v) => style.visibility = Some(v),
            StyleUpdate::WillChange(w) => style.will_change = Some(w),
            StyleUpdate::Variable { name, value } => {
                style.variables.insert(name, value);
            }
        }
    }

    fn clear_style(&self, property: &StyleProperty) {
        let mut style = self.style.borrow_mut();
        match property {
            StyleProperty::TranslateY => style.translate_y = None,
            StyleProperty::Visibility => style.visibility = None,
            StyleProperty::WillChange => style.will_change = None,
            StyleProperty::Variable(name) => {
                style.variables.remove(name);
            }
        }
    }

    fn numeric_style(&self, name: &str) -> Option<f64> {
        let written = self
            .style
            .borrow()
            .variables
            .get(name)
            .and_then(Value::as_f64);
        written.or_else(|| self.spec.styles.get(name).copied())
    }
}

/// 模拟页面
#[derive(Debug, Default)]
pub struct Page {
    elements: Vec<Rc<PageElement>>,
}

impl Page {
    /// 从描述构建页面
    pub fn new(spec: PageSpec) -> Result<Self, PageError> {
        let mut elements: Vec<Rc<PageElement>> = Vec::with_capacity(spec.elements.len());
        for element in spec.elements {
            if elements.iter().any(|e| e.id() == element.id) {
                return Err(PageError::DuplicateId(element.id));
            }
            if !element.top.is_finite() || !element.height.is_finite() || element.height < 0.0 {
                return Err(PageError::InvalidGeometry {
                    id: element.id,
                    top: element.top,
                    height: element.height,
                });
            }
            elements.push(Rc::new(PageElement::new(element)));
        }
        Ok(Self { elements })
    }

    pub fn from_json(json: &str) -> Result<Self, PageError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// 从文件加载页面描述
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn element(&self, id: &str) -> Option<&Rc<PageElement>> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn elements(&self) -> &[Rc<PageElement>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Document for Page {
    fn query_all(&self, selector: &Selector) -> Vec<Rc<dyn Element>> {
        self.elements
            .iter()
            .filter(|element| selector.matches(element.as_ref()))
            .map(|element| element.clone() as Rc<dyn Element>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_scroll::SPEED_ATTRIBUTE;

    #[test]
    fn test_from_json() {
        let page = Page::from_json(
            r#"{"elements": [
                {"id": "a", "top": 100, "height": 50, "attributes": {"data-scroll-speed": "2"}},
                {"id": "b", "top": 300, "height": 50, "styles": {"opacity": 0.25}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(page.len(), 2);
        let a = page.element("a").unwrap();
        assert_eq!(a.attribute(SPEED_ATTRIBUTE).as_deref(), Some("2"));
        assert_eq!(a.offset_height(), 50.0);
        assert_eq!(page.element("b").unwrap().numeric_style("opacity"), Some(0.25));
    }

    #[test]
    fn test_query_all_uses_selector() {
        let page = Page::new(PageSpec {
            elements: vec![
                ElementSpec::new("a", 0.0, 10.0).with_attribute(SPEED_ATTRIBUTE, "2"),
                ElementSpec::new("b", 0.0, 10.0),
                ElementSpec::new("c", 0.0, 10.0).with_attribute("data-scroll-to", "{}"),
            ],
        })
        .unwrap();

        let labels: Vec<String> = page
            .query_all(&Selector::default())
            .iter()
            .map(|e| e.label())
            .collect();
        assert_eq!(labels, ["a", "c"]);
    }

    #[test]
    fn test_rejects_invalid_pages() {
        let duplicate = PageSpec {
            elements: vec![
                ElementSpec::new("a", 0.0, 10.0),
                ElementSpec::new("a", 20.0, 10.0),
            ],
        };
        assert!(matches!(Page::new(duplicate), Err(PageError::DuplicateId(_))));

        let negative = PageSpec {
            elements: vec![ElementSpec::new("a", 0.0, -1.0)],
        };
        assert!(matches!(
            Page::new(negative),
            Err(PageError::InvalidGeometry { .. })
        ));

        assert!(matches!(Page::from_json("[]"), Err(PageError::Parse(_))));
        assert!(matches!(
            Page::load("/definitely/not/here.json"),
            Err(PageError::Io { .. })
        ));
    }

    #[test]
    fn test_inline_style_writes_and_display() {
        let element = PageElement::new(ElementSpec::new("a", 100.0, 10.0));
        assert!(element.style().is_empty());

        element.set_style(StyleUpdate::TranslateY(-12.5));
        element.set_style(StyleUpdate::Visibility(Visibility::Hidden));
        element.set_style(StyleUpdate::WillChange(WillChange::Transform));
        element.set_style(StyleUpdate::Variable {
            name: "opacity".to_string(),
            value: serde_json::json!(0.5),
        });

        assert_eq!(element.rendered_top(), 87.5);
        assert_eq!(element.numeric_style("opacity"), Some(0.5));
        assert_eq!(
            element.style().to_string(),
            "transform: translateY(-12.5px); visibility: hidden; will-change: transform; opacity: 0.5"
        );

        element.clear_style(&StyleProperty::TranslateY);
        element.clear_style(&StyleProperty::Visibility);
        element.clear_style(&StyleProperty::WillChange);
        element.clear_style(&StyleProperty::Variable("opacity".to_string()));
        assert!(element.style().is_empty());
        assert_eq!(element.rendered_top(), 100.0);
    }
}
