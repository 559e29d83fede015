//! services/reader/src/cli/render.rs
//!
//! Plain-text views for the terminal shell.

use std::fmt::Write;

use library_reader_core::catalog::{CatalogEntry, ProgressBadge};
use library_reader_core::domain::{Document, Novel, UserProfile};
use library_reader_core::pagination::Mode;

use crate::reader::ReadingSession;
use crate::session::AppContext;

const PAGER_RADIUS: usize = 3;
const BAR_WIDTH: usize = 24;

pub fn documents(docs: &[Document], ctx: &AppContext) -> String {
    if docs.is_empty() {
        return "No documents available. Make sure the backend is running.".to_string();
    }
    let mut out = String::from("Translation library\n");
    for (i, doc) in docs.iter().enumerate() {
        let badge = badge(doc, ctx);
        let _ = write!(out, "{:>3}. {}", i + 1, doc.display_title());
        if let Some(author) = doc.author.as_deref().filter(|a| !a.is_empty()) {
            let _ = write!(out, " by {author}");
        }
        if let Some(genre) = doc.genre.as_deref().filter(|g| !g.is_empty()) {
            let _ = write!(out, " [{genre}]");
        }
        let _ = writeln!(out, " ({badge})");
    }
    out
}

fn badge(doc: &Document, ctx: &AppContext) -> String {
    match ProgressBadge::for_document(doc, ctx.progress_for(&doc.id)) {
        ProgressBadge::NotStarted => "not started".to_string(),
        ProgressBadge::Reading { page, total } => format!("reading {page}/{total}"),
    }
}

/// Full card for entry `n` of the document list.
pub fn document_detail(doc: &Document, ctx: &AppContext, n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", doc.display_title());
    let filled = |field: &Option<String>| field.clone().filter(|value| !value.is_empty());
    if let Some(author) = filled(&doc.author) {
        let _ = writeln!(out, "by {author}");
    }
    let mut facts = Vec::new();
    if let Some(genre) = filled(&doc.genre) {
        facts.push(genre);
    }
    if let Some(year) = doc.published_year {
        facts.push(year.to_string());
    }
    if let Some(rating) = doc.rating {
        facts.push(stars(rating));
    }
    if !facts.is_empty() {
        let _ = writeln!(out, "{}", facts.join("  "));
    }
    let _ = writeln!(
        out,
        "Status: {}, {}/{} pages processed, {} translations",
        doc.status, doc.pages_processed, doc.page_count, doc.translation_count
    );
    let _ = writeln!(out, "Progress: {}", badge(doc, ctx));
    if let Some(description) = filled(&doc.description) {
        let _ = writeln!(out, "\n{description}");
    }
    let _ = write!(out, "\nType 'open {n}' to read.");
    out
}

/// Full card for entry `n` of the novel list.
pub fn novel_detail(novel: &Novel, readable: bool, n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", novel.title);
    let _ = writeln!(out, "by {} ({})", novel.author, novel.published_year);
    let _ = writeln!(out, "{}  {}", novel.genre, stars(novel.rating));
    let _ = writeln!(out, "\n{}\n", novel.description);
    if readable {
        let _ = write!(out, "Type 'open {n}' to read.");
    } else {
        out.push_str("Preview only: this novel has no readable content.");
    }
    out
}

pub fn novels(found: &[&Novel], genres: &[String]) -> String {
    let mut out = String::new();
    let noun = if found.len() == 1 { "novel" } else { "novels" };
    let _ = writeln!(out, "{} {} found (genres: {})", found.len(), noun, genres.join(", "));
    if found.is_empty() {
        out.push_str("No novels match your search.");
        return out;
    }
    for (i, novel) in found.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} by {} [{}] {}",
            i + 1,
            novel.title(),
            novel.author(),
            novel.category(),
            stars(novel.rating)
        );
    }
    out
}

pub fn users(profiles: &[UserProfile], current: Option<&str>) -> String {
    if profiles.is_empty() {
        return "No profiles available.".to_string();
    }
    let mut out = String::new();
    for profile in profiles {
        let marker = if Some(profile.id.as_str()) == current { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {} {} ({}), {} in progress",
            marker,
            profile.avatar,
            profile.name,
            profile.id,
            profile.reading_progress.len()
        );
    }
    out
}

pub fn page(session: &ReadingSession) -> String {
    match session.engine().mode() {
        Mode::Flat => translation_page(session),
        Mode::Hierarchical => novel_page(session),
    }
}

fn translation_page(session: &ReadingSession) -> String {
    let engine = session.engine();
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", session.title());
    if let Some(unit) = engine.current_unit() {
        let label = if unit.pages.len() > 1 { "Pages" } else { "Page" };
        let pages: Vec<String> = unit.pages.iter().map(u32::to_string).collect();
        let _ = writeln!(
            out,
            "{}: {}    {} / {}",
            label,
            pages.join(", "),
            engine.pages_read(),
            engine.total_pages()
        );
    }
    out.push('\n');
    for paragraph in engine.current_text().split('\n') {
        let _ = writeln!(out, "{paragraph}");
    }
    out.push('\n');

    let current = engine.ordinal();
    let dots: Vec<String> = engine
        .nearby(PAGER_RADIUS)
        .map(|i| {
            if i == current {
                format!("[{}]", i + 1)
            } else {
                (i + 1).to_string()
            }
        })
        .collect();
    let _ = write!(
        out,
        "{}  {}  {}",
        nav_hint(engine.has_previous(), "prev"),
        dots.join(" "),
        nav_hint(engine.has_next(), "next")
    );
    out
}

fn novel_page(session: &ReadingSession) -> String {
    let engine = session.engine();
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", session.title());
    if let Some(chapter) = engine.current_chapter() {
        let _ = writeln!(out, "Chapter {}: {}", chapter.number, chapter.title);
    }
    let _ = writeln!(
        out,
        "{} Page {} of {}  {}%",
        progress_bar(engine.progress_fraction()),
        engine.pages_read(),
        engine.total_pages(),
        engine.progress_percent()
    );
    out.push('\n');
    for paragraph in engine.current_text().split('\n') {
        let _ = writeln!(out, "{paragraph}");
    }
    out.push('\n');
    let _ = write!(
        out,
        "{}  {}",
        nav_hint(engine.has_previous(), "prev"),
        nav_hint(engine.has_next(), "next")
    );
    out
}

pub fn chapters(session: &ReadingSession) -> String {
    let mut out = String::from("Chapters\n");
    let current = session.engine().current_chapter().map(|c| c.id.as_str());
    for (i, chapter) in session.engine().chapters().iter().enumerate() {
        let marker = if Some(chapter.id.as_str()) == current { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{} {:>2}. Chapter {}: {} ({} pages)",
            marker,
            i + 1,
            chapter.number,
            chapter.title,
            chapter.pages.len()
        );
    }
    out
}

pub fn loading(title: &str) -> String {
    format!("Loading translations for {title}... (type 'close' to cancel)")
}

fn nav_hint(enabled: bool, label: &str) -> String {
    if enabled {
        format!("<{label}>")
    } else {
        " ".repeat(label.len() + 2)
    }
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn stars(rating: u8) -> String {
    let rating = rating.min(5) as usize;
    format!("{}{}", "*".repeat(rating), ".".repeat(5 - rating))
}
