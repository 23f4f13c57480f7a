// TUI widget modules for each screen zone.

pub mod debug_panel;
pub mod help_bar;
pub mod match_list;
pub mod status_bar;

use ratatui::style::Color;

use pronostici_core::format::Tone;

/// Terminal color for a palette tone.
pub fn tone_color(tone: Tone) -> Color {
    let (r, g, b) = tone.rgb();
    Color::Rgb(r, g, b)
}
