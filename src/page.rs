use std::path::Path;

use anyhow::Context as _;
use kuchiki::traits::TendrilSink as _;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

use crate::theme::Theme;

/// Rendering hint attribute on the root element, consumed by stylesheets.
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// Selector for the theme toggle control.
pub const TOGGLE_SELECTOR: &str = "button.theme-toggle";

/// One parsed documentation page.
pub struct Page {
    document: NodeRef,
}

impl Page {
    pub fn parse(html: &str) -> Page {
        Page {
            document: kuchiki::parse_html().one(html),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Page> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Ok(Page::parse(&html))
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    fn root(&self) -> Option<NodeDataRef<ElementData>> {
        self.document.select_first("html").ok()
    }

    pub fn theme_attribute(&self) -> Option<String> {
        let root = self.root()?;
        let attrs = root.attributes.borrow();
        attrs.get(THEME_ATTRIBUTE).map(|v| v.to_string())
    }

    pub fn set_theme_attribute(&self, theme: Theme) {
        if let Some(root) = self.root() {
            root.attributes
                .borrow_mut()
                .insert(THEME_ATTRIBUTE, theme.as_str().to_string());
        }
    }

    pub fn toggle_button(&self) -> Option<NodeDataRef<ElementData>> {
        self.document.select_first(TOGGLE_SELECTOR).ok()
    }

    /// Set `aria-label` and `title` on the toggle control. A page without a
    /// toggle is an expected condition; returns whether one was found.
    pub fn set_toggle_labels(&self, label: &str) -> bool {
        let Some(button) = self.toggle_button() else {
            return false;
        };
        let mut attrs = button.attributes.borrow_mut();
        attrs.insert("aria-label", label.to_string());
        attrs.insert("title", label.to_string());
        true
    }

    pub fn serialize(&self) -> anyhow::Result<String> {
        let mut out = Vec::new();
        self.document
            .serialize(&mut out)
            .context("serialize page")?;
        String::from_utf8(out).context("page html not utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_attribute_roundtrip() {
        let page = Page::parse("<html><body></body></html>");
        assert_eq!(page.theme_attribute(), None);
        page.set_theme_attribute(Theme::Dark);
        assert_eq!(page.theme_attribute().as_deref(), Some("dark"));
        page.set_theme_attribute(Theme::Light);
        assert_eq!(page.theme_attribute().as_deref(), Some("light"));
    }

    #[test]
    fn serialized_page_carries_attribute() {
        let page = Page::parse("<html><body><p>hi</p></body></html>");
        page.set_theme_attribute(Theme::Dark);
        let html = page.serialize().unwrap();
        assert!(html.contains("data-theme=\"dark\""));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn missing_toggle_is_not_an_error() {
        let page = Page::parse("<html><body></body></html>");
        assert!(page.toggle_button().is_none());
        assert!(!page.set_toggle_labels("whatever"));
    }

    #[test]
    fn toggle_labels_are_stamped() {
        let page = Page::parse(
            r#"<html><body><button class="theme-toggle" aria-label="old">t</button></body></html>"#,
        );
        assert!(page.set_toggle_labels("Switch to dark theme"));
        let html = page.serialize().unwrap();
        assert!(html.contains(r#"aria-label="Switch to dark theme""#));
        assert!(html.contains(r#"title="Switch to dark theme""#));
    }
}
