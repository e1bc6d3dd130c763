//! Menu trees
//!
//! A menu is a tree of typed nodes. The host receives it as nested maps of
//! `type`, `name`, `callback` and `children`; a node's callback is called
//! with the host's menu arguments before its children are shown.
//!
//! ```
//! use bridge_engine::{Function, MenuItem, Signature, Value};
//!
//! let open = Function::new("open", Signature::any(), |_, _| Ok(Value::Null));
//! let tree = MenuItem::popup("beacon_top").with_child(
//!     MenuItem::menu("Thing").with_child(MenuItem::item("Stuff").with_callback(open)),
//! );
//! assert!(tree.validate().is_ok());
//! ```

use crate::function::Function;
use crate::value::Value;
use std::fmt;

/// Menu node types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Attaches children to a named host menu
    Popup,
    /// A submenu
    Menu,
    /// A clickable entry
    Item,
    /// Splices in another named menu
    InsertMenu,
    Separator,
}

impl MenuKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuKind::Popup => "popup",
            MenuKind::Menu => "menu",
            MenuKind::Item => "item",
            MenuKind::InsertMenu => "insert_menu",
            MenuKind::Separator => "separator",
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A menu tree node
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    kind: MenuKind,
    name: Option<String>,
    callback: Option<Function>,
    children: Vec<MenuItem>,
}

impl MenuItem {
    fn named(kind: MenuKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
            callback: None,
            children: Vec::new(),
        }
    }

    pub fn popup(name: impl Into<String>) -> Self {
        Self::named(MenuKind::Popup, name)
    }

    pub fn menu(name: impl Into<String>) -> Self {
        Self::named(MenuKind::Menu, name)
    }

    pub fn item(name: impl Into<String>) -> Self {
        Self::named(MenuKind::Item, name)
    }

    pub fn insert_menu(name: impl Into<String>) -> Self {
        Self::named(MenuKind::InsertMenu, name)
    }

    pub fn separator() -> Self {
        Self {
            kind: MenuKind::Separator,
            name: None,
            callback: None,
            children: Vec::new(),
        }
    }

    pub fn with_callback(mut self, callback: Function) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_child(mut self, child: MenuItem) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = MenuItem>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[MenuItem] {
        &self.children
    }

    /// Checks the tree's structure
    ///
    /// Every node except a separator needs a non-empty name. Insertions
    /// take no callback or children, items and separators take no
    /// children.
    pub fn validate(&self) -> Result<(), String> {
        for child in &self.children {
            child.validate()?;
        }

        if self.kind != MenuKind::Separator && self.name().map_or(true, str::is_empty) {
            return Err(format!("{} needs a name", self.kind));
        }

        let has_children = !self.children.is_empty();
        let has_callback = self.callback.is_some();
        match self.kind {
            MenuKind::InsertMenu if has_callback || has_children => Err(format!(
                "insert_menu '{}' cannot have a callback or children",
                self.name().unwrap_or_default()
            )),
            MenuKind::Item if has_children => Err(format!(
                "item '{}' cannot have children",
                self.name().unwrap_or_default()
            )),
            MenuKind::Separator if has_callback || has_children => {
                Err("separator cannot have a callback or children".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Converts the tree into the value sent to the host
    pub fn to_value(&self) -> Value {
        let mut entries = vec![("type", Value::from(self.kind.as_str()))];
        if let Some(name) = &self.name {
            entries.push(("name", Value::from(name.as_str())));
        }
        if let Some(callback) = &self.callback {
            entries.push(("callback", Value::from(callback.clone())));
        }
        if !self.children.is_empty() {
            entries.push((
                "children",
                Value::list(self.children.iter().map(MenuItem::to_value)),
            ));
        }
        Value::map(entries)
    }
}
