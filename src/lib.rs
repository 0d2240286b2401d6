mod cli;
mod page;
mod progress;
mod pseudocode;
mod store;
mod theme;
mod verify;

use std::path::{Path, PathBuf};

use anyhow::Context as _;

pub use cli::{Args, Mode, ProgressMode};
pub use page::Page;
pub use pseudocode::{BuiltinRenderer, Render, RenderOptions, RenderReport};
pub use store::{FileStore, MemoryStore, PrefStore};
pub use theme::Theme;

pub fn run(args: Args) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = progress::Progress::new(progress_enabled);

    progress.set_stage("收集页面");
    let pages = collect_pages(&args.pages)?;
    if pages.is_empty() {
        anyhow::bail!("no .html pages found under the given paths");
    }
    progress.set_pages_total(pages.len());

    let store = store::FileStore::new(args.state.clone());

    let res = match args.mode {
        Mode::Apply => apply(&args, &pages, &store, &progress),
        Mode::Toggle => toggle(&args, &pages, &store, &progress),
    };
    progress.finish();
    res
}

fn apply(
    args: &Args,
    pages: &[PathBuf],
    store: &dyn PrefStore,
    progress: &progress::Progress,
) -> anyhow::Result<()> {
    progress.set_stage("规范化主题");
    let resolved = theme::normalize(store, args.default_theme);
    tracing::info!(theme = resolved.as_str(), "theme preference normalized");

    let renderer = (!args.skip_pseudocode).then(BuiltinRenderer::new);
    let options = RenderOptions {
        indent_size: args.indent_size.clone(),
    };

    progress.set_stage("修补页面");
    for path in pages {
        let page = Page::load(path)?;
        page.set_theme_attribute(resolved);
        theme::sync_toggle_labels(&page);
        let report = pseudocode::render_blocks(
            &page,
            renderer.as_ref().map(|r| r as &dyn Render),
            &options,
        );
        progress.add_blocks(report.rendered, report.failed);
        finish_page(path, &page, args, renderer.is_some() && report.failed == 0)?;
        progress.page_done(&page_name(path));
    }
    Ok(())
}

fn toggle(
    args: &Args,
    pages: &[PathBuf],
    store: &dyn PrefStore,
    progress: &progress::Progress,
) -> anyhow::Result<()> {
    progress.set_stage("切换主题");

    let first = Page::load(&pages[0])?;
    if first.theme_attribute().is_none() {
        // Page was never stamped: seed the attribute from the stored
        // preference so the flip starts from the persisted state.
        if let Some(saved) = store.get(theme::STORAGE_KEY).ok().flatten() {
            if let Some(current) = Theme::from_stored(&saved) {
                first.set_theme_attribute(current);
            }
        }
    }
    let next = theme::activate_toggle(&first, store);
    tracing::info!(theme = next.as_str(), "theme toggled");

    finish_page(&pages[0], &first, args, false)?;
    progress.page_done(&page_name(&pages[0]));

    for path in &pages[1..] {
        let page = Page::load(path)?;
        page.set_theme_attribute(next);
        page.set_toggle_labels(next.toggle_label());
        finish_page(path, &page, args, false)?;
        progress.page_done(&page_name(path));
    }
    Ok(())
}

fn finish_page(path: &Path, page: &Page, args: &Args, expect_no_blocks: bool) -> anyhow::Result<()> {
    let html = page.serialize()?;
    verify::assert_consistent(&html, expect_no_blocks)
        .with_context(|| format!("verify {}", path.display()))?;

    let target = match &args.out {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            dir.join(path.file_name().context("page path has no file name")?)
        }
        None => path.to_path_buf(),
    };
    std::fs::write(&target, html).with_context(|| format!("write {}", target.display()))
}

fn page_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn collect_pages(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_dir(input, &mut out)?;
        } else {
            // Explicitly named files are taken as-is.
            out.push(input.clone());
        }
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn collect_dir(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_dir(&path, out)?;
        } else if is_html(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}
