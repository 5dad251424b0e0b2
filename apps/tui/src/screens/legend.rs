//! "Legend" screen: the eight categories with their highlight colors.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use transcoder_shared::Category;

pub(crate) struct LegendScreen {
    selected: usize,
}

impl LegendScreen {
    pub(crate) fn new() -> Self {
        Self { selected: 0 }
    }

    fn selected_category(&self) -> Category {
        Category::ALL[self.selected]
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(Category::ALL.len() as u16 + 2), // Categories
                Constraint::Min(1),                                  // Description
            ])
            .split(area);

        let items: Vec<ListItem> = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let (r, g, b) = category.rgb();
                let label_style = if i == self.selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected { "▸ " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::raw(prefix),
                    Span::styled("      ", Style::default().bg(Color::Rgb(r, g, b))),
                    Span::styled(format!("  {category}"), label_style),
                    Span::styled(
                        format!("  #{}", category.color()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Categories (↑/↓ to select) "),
        );
        f.render_widget(list, chunks[0]);

        let category = self.selected_category();
        let detail = Paragraph::new(category.description())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {category} ")),
            );
        f.render_widget(detail, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        let count = Category::ALL.len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = if self.selected == 0 {
                    count - 1
                } else {
                    self.selected - 1
                };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % count;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut screen = LegendScreen::new();
        screen.handle_key(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(screen.selected_category(), Category::H);
        screen.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(screen.selected_category(), Category::A);
    }
}
