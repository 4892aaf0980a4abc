//! Month calendar panel with a live clock header.
//!
//! Pure derived display: the state is just the displayed year/month, the grid
//! is recomputed from chrono every frame, and today's cell is highlighted when
//! the displayed month is the current one. Weeks start on Monday.

use chrono::{Datelike, Local, NaiveDate};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

const WEEKDAY_HEADER: &str = "Lu Ma Me Je Ve Sa Di";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarState {
    year: i32,
    month: u32,
}

impl CalendarState {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// Start on the current month.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self::new(today.year(), today.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Move the displayed month, rolling the year over at either end.
    pub fn change_month(&mut self, delta: i32) {
        let months = self.year * 12 + (self.month as i32 - 1) + delta;
        self.year = months.div_euclid(12);
        self.month = months.rem_euclid(12) as u32 + 1;
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize - 1], self.year)
    }

    fn first_of_month(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("displayed month is always a valid date")
    }

    /// Blank cells before day 1 in a Monday-first week.
    pub fn leading_blanks(&self) -> usize {
        self.first_of_month().weekday().num_days_from_monday() as usize
    }

    pub fn days_in_month(&self) -> u32 {
        let first = self.first_of_month();
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
        .expect("first of next month is always a valid date");
        next.signed_duration_since(first).num_days() as u32
    }

    /// The 7-column grid as a flat sequence: leading blanks, then the numbered
    /// days.
    pub fn grid(&self) -> Vec<Option<u32>> {
        let mut cells = vec![None; self.leading_blanks()];
        cells.extend((1..=self.days_in_month()).map(Some));
        cells
    }

    /// Render the panel body. `today` is injected so rendering stays
    /// deterministic under test.
    pub fn render_lines(&self, today: NaiveDate) -> Vec<Line<'static>> {
        let mark_today = today.year() == self.year && today.month() == self.month;

        let mut lines = vec![Line::from(Span::styled(
            WEEKDAY_HEADER,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ))];

        let mut row: Vec<Span<'static>> = Vec::new();
        for (index, cell) in self.grid().iter().enumerate() {
            if index > 0 && index % 7 == 0 {
                lines.push(Line::from(std::mem::take(&mut row)));
            }
            if !row.is_empty() {
                row.push(Span::raw(" "));
            }
            match cell {
                None => row.push(Span::raw("  ")),
                Some(day) => {
                    let text = format!("{day:>2}");
                    if mark_today && *day == today.day() {
                        row.push(Span::styled(
                            text,
                            Style::default()
                                .fg(Color::Black)
                                .bg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ));
                    } else {
                        row.push(Span::raw(text));
                    }
                }
            }
        }
        if !row.is_empty() {
            lines.push(Line::from(row));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_february_has_29_aligned_cells() {
        let calendar = CalendarState::new(2024, 2);
        assert_eq!(calendar.days_in_month(), 29);

        // 2024-02-01 is a Thursday: three blanks in a Monday-first week.
        assert_eq!(calendar.leading_blanks(), 3);

        let grid = calendar.grid();
        assert_eq!(&grid[..3], &[None, None, None]);
        assert_eq!(grid[3], Some(1));
        assert_eq!(grid.last(), Some(&Some(29)));
        assert_eq!(grid.iter().filter(|cell| cell.is_some()).count(), 29);
    }

    #[test]
    fn non_leap_february_has_28_days() {
        assert_eq!(CalendarState::new(2023, 2).days_in_month(), 28);
    }

    #[test]
    fn january_backward_rolls_to_previous_december() {
        let mut calendar = CalendarState::new(2024, 1);
        calendar.change_month(-1);
        assert_eq!((calendar.year(), calendar.month()), (2023, 12));
    }

    #[test]
    fn december_forward_rolls_to_next_january() {
        let mut calendar = CalendarState::new(2024, 12);
        calendar.change_month(1);
        assert_eq!((calendar.year(), calendar.month()), (2025, 1));
    }

    #[test]
    fn round_trip_navigation_returns_home() {
        let mut calendar = CalendarState::new(2024, 6);
        for _ in 0..18 {
            calendar.change_month(1);
        }
        for _ in 0..18 {
            calendar.change_month(-1);
        }
        assert_eq!((calendar.year(), calendar.month()), (2024, 6));
    }

    #[test]
    fn titles_use_french_month_names() {
        assert_eq!(CalendarState::new(2024, 2).title(), "Février 2024");
        assert_eq!(CalendarState::new(2025, 8).title(), "Août 2025");
    }

    #[test]
    fn today_is_marked_only_in_its_own_month() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();

        let shown = CalendarState::new(2024, 2).render_lines(today);
        let highlighted = shown
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.style.bg == Some(Color::Cyan))
            .count();
        assert_eq!(highlighted, 1);

        let other_month = CalendarState::new(2024, 3).render_lines(today);
        let highlighted = other_month
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter(|span| span.style.bg == Some(Color::Cyan))
            .count();
        assert_eq!(highlighted, 0);
    }

    #[test]
    fn rows_are_seven_columns_wide() {
        let calendar = CalendarState::new(2024, 2);
        let today = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let lines = calendar.render_lines(today);
        // Header plus five week rows for 3 blanks + 29 days.
        assert_eq!(lines.len(), 6);
    }
}
