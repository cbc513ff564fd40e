//! Text rendering for the tab strip

use crate::{TabElement, TabMode, TabStripView};

const ICON: &str = "🌙";
const CLOSE_GLYPH: &str = "×";
const ADD_GLYPH: &str = "+";

impl TabStripView {
    /// Renders the strip as one line
    ///
    /// The active tab is bracketed; a tab being renamed shows its input
    /// followed by a cursor bar.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self.elements.iter().map(format_tab).collect();
        parts.push(ADD_GLYPH.to_string());
        parts.join(" ")
    }
}

fn format_tab(element: &TabElement) -> String {
    let label = match &element.mode {
        TabMode::Display => element.title.clone(),
        TabMode::Editing { input } => format!("{}|", input),
    };
    let body = format!("{} {} {}", ICON, label, CLOSE_GLYPH);
    if element.active {
        format!("[{}]", body)
    } else {
        body
    }
}
