use kuchiki::traits::TendrilSink as _;

use crate::page::{THEME_ATTRIBUTE, TOGGLE_SELECTOR};
use crate::pseudocode::BLOCK_SELECTOR;
use crate::theme::{SWITCH_TO_DARK, SWITCH_TO_LIGHT};

/// Re-parse produced HTML and check the invariants hold: the theme attribute
/// is one of the two supported values, toggle labels match it, and (when
/// rendering ran clean) no pseudocode marker survived.
pub fn assert_consistent(html: &str, expect_no_blocks: bool) -> anyhow::Result<()> {
    let doc = kuchiki::parse_html().one(html);

    let root = doc
        .select_first("html")
        .map_err(|()| anyhow::anyhow!("consistency check failed: page has no root element"))?;
    let theme = {
        let attrs = root.attributes.borrow();
        attrs.get(THEME_ATTRIBUTE).unwrap_or("").to_string()
    };
    if theme != "light" && theme != "dark" {
        anyhow::bail!("consistency check failed: {THEME_ATTRIBUTE} is {theme:?}");
    }

    let expected_label = if theme == "dark" {
        SWITCH_TO_LIGHT
    } else {
        SWITCH_TO_DARK
    };
    if let Ok(button) = doc.select_first(TOGGLE_SELECTOR) {
        let attrs = button.attributes.borrow();
        for attr in ["aria-label", "title"] {
            if attrs.get(attr) != Some(expected_label) {
                anyhow::bail!(
                    "consistency check failed: toggle {} is {:?}, expected {:?} for {} theme",
                    attr,
                    attrs.get(attr),
                    expected_label,
                    theme
                );
            }
        }
    }

    if expect_no_blocks && doc.select_first(BLOCK_SELECTOR).is_ok() {
        anyhow::bail!("consistency check failed: unrendered pseudocode block remains");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_consistent_page() {
        let html = r#"<html data-theme="dark"><body>
            <button class="theme-toggle" aria-label="Switch to light theme" title="Switch to light theme">t</button>
        </body></html>"#;
        assert_consistent(html, true).unwrap();
    }

    #[test]
    fn rejects_missing_or_invalid_attribute() {
        assert!(assert_consistent("<html><body></body></html>", false).is_err());
        assert!(
            assert_consistent(r#"<html data-theme="auto"><body></body></html>"#, false).is_err()
        );
    }

    #[test]
    fn rejects_stale_labels() {
        let html = r#"<html data-theme="dark"><body>
            <button class="theme-toggle" aria-label="Switch to dark theme" title="Switch to dark theme">t</button>
        </body></html>"#;
        assert!(assert_consistent(html, false).is_err());
    }

    #[test]
    fn rejects_leftover_blocks_only_when_rendering_ran_clean() {
        let html = r#"<html data-theme="light"><body>
            <pre class="pseudocode">x</pre>
        </body></html>"#;
        assert!(assert_consistent(html, true).is_err());
        assert_consistent(html, false).unwrap();
    }
}
