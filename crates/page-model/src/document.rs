use std::collections::BTreeMap;

use tracing::warn;

use crate::selector::{AttrCondition, Combinator, Selector, SelectorError, SelectorPart, SelectorStep};
use crate::surface::{Rect, Surface, Viewport};

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    rect: Rect,
}

impl Node {
    fn new(parent: Option<ElementId>, tag: &str) -> Self {
        Self {
            parent,
            children: Vec::new(),
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            rect: Rect::default(),
        }
    }
}

/// In-memory element tree implementing [`Surface`].
///
/// Elements are never removed; handles stay valid for the lifetime of the
/// document. The first node is an `html` root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    viewport: Viewport,
}

impl Document {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            nodes: vec![Node::new(None, "html")],
            viewport: Viewport {
                scroll_y: 0.0,
                height: viewport_height,
            },
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a new element under `parent` with the given classes.
    pub fn append(&mut self, parent: ElementId, tag: &str, classes: &[&str]) -> ElementId {
        let id = ElementId(self.nodes.len());
        let parent = self.nodes.get(parent.0).map(|_| parent);
        let mut node = Node::new(parent, tag);
        for class in classes {
            push_class(&mut node.classes, class);
        }
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.nodes.get(element.0).and_then(|node| node.parent)
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.nodes
            .get(element.0)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    pub fn classes(&self, element: ElementId) -> &[String] {
        self.nodes
            .get(element.0)
            .map_or(&[][..], |node| node.classes.as_slice())
    }

    pub fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(element.0) else {
            return;
        };
        match name {
            "class" => {
                node.classes.clear();
                for class in value.split_whitespace() {
                    push_class(&mut node.classes, class);
                }
            }
            "id" => node.id = Some(value.to_string()),
            _ => {
                node.attrs.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn set_rect(&mut self, element: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.rect = rect;
        }
    }

    /// Layout box in document coordinates.
    pub fn rect(&self, element: ElementId) -> Option<Rect> {
        self.nodes.get(element.0).map(|node| node.rect)
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y.max(0.0);
    }

    /// Strict variant of [`Surface::query_all`] that reports parse errors.
    pub fn select(
        &self,
        scope: Option<ElementId>,
        selector: &str,
    ) -> Result<Vec<ElementId>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        let mut candidates = Vec::new();
        match scope {
            Some(scope) => {
                for child in self.children(scope) {
                    self.collect_dfs(*child, &mut candidates);
                }
            }
            None => self.collect_dfs(self.root(), &mut candidates),
        }
        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                parsed
                    .groups
                    .iter()
                    .any(|chain| self.matches_chain(*candidate, chain))
            })
            .collect())
    }

    fn collect_dfs(&self, element: ElementId, out: &mut Vec<ElementId>) {
        out.push(element);
        for child in self.children(element) {
            self.collect_dfs(*child, out);
        }
    }

    fn matches_chain(&self, element: ElementId, chain: &[SelectorPart]) -> bool {
        let Some((last, rest)) = chain.split_last() else {
            return false;
        };
        if !self.matches_step(element, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match last.combinator {
            Some(Combinator::Child) => self
                .parent(element)
                .is_some_and(|parent| self.matches_chain(parent, rest)),
            Some(Combinator::Descendant) | None => {
                let mut cursor = self.parent(element);
                while let Some(ancestor) = cursor {
                    if self.matches_chain(ancestor, rest) {
                        return true;
                    }
                    cursor = self.parent(ancestor);
                }
                false
            }
        }
    }

    fn matches_step(&self, element: ElementId, step: &SelectorStep) -> bool {
        let Some(node) = self.nodes.get(element.0) else {
            return false;
        };
        if let Some(tag) = &step.tag {
            if &node.tag != tag {
                return false;
            }
        }
        if let Some(id) = &step.id {
            if node.id.as_ref() != Some(id) {
                return false;
            }
        }
        if !step
            .classes
            .iter()
            .all(|class| node.classes.iter().any(|have| have == class))
        {
            return false;
        }
        step.attrs.iter().all(|cond| match cond {
            AttrCondition::Exists { key } => self.attribute_value(node, key).is_some(),
            AttrCondition::Eq { key, value } => {
                self.attribute_value(node, key).as_deref() == Some(value.as_str())
            }
            AttrCondition::Prefix { key, value } => self
                .attribute_value(node, key)
                .is_some_and(|have| have.starts_with(value.as_str())),
        })
    }

    fn attribute_value(&self, node: &Node, name: &str) -> Option<String> {
        match name {
            "class" => (!node.classes.is_empty()).then(|| node.classes.join(" ")),
            "id" => node.id.clone(),
            _ => node.attrs.get(name).cloned(),
        }
    }
}

fn push_class(classes: &mut Vec<String>, class: &str) {
    if !class.is_empty() && !classes.iter().any(|have| have == class) {
        classes.push(class.to_string());
    }
}

impl Surface for Document {
    type Element = ElementId;

    fn query_all(&self, scope: Option<&ElementId>, selector: &str) -> Vec<ElementId> {
        match self.select(scope.copied(), selector) {
            Ok(found) => found,
            Err(err) => {
                warn!(selector, error = %err, "selector rejected; treating as no match");
                Vec::new()
            }
        }
    }

    fn has_class(&self, element: &ElementId, class: &str) -> bool {
        self.classes(*element).iter().any(|have| have == class)
    }

    fn add_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            push_class(&mut node.classes, class);
        }
    }

    fn remove_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.classes.retain(|have| have != class);
        }
    }

    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.nodes
            .get(element.0)
            .and_then(|node| self.attribute_value(node, name))
    }

    fn style(&self, element: &ElementId, property: &str) -> Option<String> {
        self.nodes
            .get(element.0)
            .and_then(|node| node.style.get(property).cloned())
    }

    fn set_style(&mut self, element: &ElementId, property: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.style.insert(property.to_string(), value.to_string());
        }
    }

    fn text(&self, element: &ElementId) -> Option<String> {
        self.nodes.get(element.0).map(|node| node.text.clone())
    }

    fn set_text(&mut self, element: &ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(element.0) {
            node.text = text.to_string();
        }
    }

    fn bounding_rect(&self, element: &ElementId) -> Rect {
        let rect = self.rect(*element).unwrap_or_default();
        Rect {
            top: rect.top - self.viewport.scroll_y,
            ..rect
        }
    }

    fn contains(&self, ancestor: &ElementId, node: &ElementId) -> bool {
        let mut cursor = Some(*node);
        while let Some(current) = cursor {
            if current == *ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to(&mut self, scroll_y: f64) {
        self.set_scroll_y(scroll_y);
    }
}
