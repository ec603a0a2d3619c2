use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::compare::SortDirection;
use crate::domain::CMDMode;
use crate::model::{HeaderView, Model, UIData};

pub const CMDLINE_HEIGH: u16 = 1;
pub const FOOTER_HEIGHT: u16 = 1;
pub const CHECKBOX_WIDTH: u16 = 3;
pub const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, footer_area, cmdline_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.name).bold()).centered())
            .title_bottom(Line::from(" ? help ").centered())
            .border_set(border::THICK);

        // No headers means no data yet, nothing to render but the frame
        if uidata.headers.is_empty() {
            frame.render_widget(block, table_area);
        } else {
            self.table_state.select(Some(uidata.cursor_row));
            frame.render_stateful_widget(
                Self::build_table(uidata).block(block),
                table_area,
                &mut self.table_state,
            );
        }

        frame.render_widget(Self::build_footer(uidata), footer_area);
        Self::draw_cmdline(uidata, frame, cmdline_area);

        if uidata.show_popup {
            Self::draw_popup(&uidata.popup_message, frame);
        }
    }

    fn header_cell(header: &HeaderView, is_cursor: bool) -> Cell<'_> {
        let marker = match header.sort {
            Some(SortDirection::Ascending) => " ▲",
            Some(SortDirection::Descending) => " ▼",
            None => "",
        };
        let style = if is_cursor {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(format!("{}{}", header.name, marker)).style(style)
    }

    fn checkbox(checked: bool) -> &'static str {
        if checked { "[x]" } else { "[ ]" }
    }

    fn build_table(uidata: &UIData) -> Table<'_> {
        let header = Row::new(
            std::iter::once(Cell::from(Self::checkbox(uidata.all_selected)))
                .chain(
                    uidata
                        .headers
                        .iter()
                        .enumerate()
                        .map(|(cidx, h)| Self::header_cell(h, cidx == uidata.cursor_column)),
                ),
        )
        .style(Style::new().yellow());

        let rows = uidata.rows.iter().enumerate().map(|(ridx, row)| {
            let checked = uidata.selected.get(ridx).copied().unwrap_or(false);
            Row::new(
                std::iter::once(Cell::from(Self::checkbox(checked)))
                    .chain(row.iter().map(|c| Cell::from(c.as_str()))),
            )
        });

        let widths = std::iter::once(Constraint::Length(CHECKBOX_WIDTH)).chain(
            uidata
                .headers
                .iter()
                .map(|h| Constraint::Length(h.width as u16)),
        );

        Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    }

    fn build_footer(uidata: &UIData) -> Paragraph<'_> {
        // Pages are shown 1-based, "0 of 0" for an empty result
        let current = if uidata.total_pages == 0 { 0 } else { uidata.page_index + 1 };
        let mut spans = vec![
            Span::from(" Page "),
            Span::from(format!("{current} of {}", uidata.total_pages)).bold(),
            Span::from(format!(
                " | {} of {} rows | {} rows per page",
                uidata.filtered_count, uidata.total_count, uidata.page_size
            )),
        ];
        if !uidata.search.is_empty() {
            spans.push(Span::from(" | search: "));
            spans.push(Span::from(uidata.search.as_str()).yellow());
        }
        Paragraph::new(Line::from(spans))
    }

    fn draw_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::Search) => "/",
                Some(CMDMode::JumpToPage) => "page: ",
                None => ">",
            };
            let line = Line::from(vec![
                Span::from(prompt).blue().bold(),
                Span::from(uidata.cmdinput.input.as_str()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
        } else {
            frame.render_widget(Paragraph::new(uidata.status_message.as_str()).dim(), area);
        }
    }

    fn draw_popup(message: &str, frame: &mut Frame) {
        let area = Self::centered(frame.area(), 60, 24);
        let popup = Paragraph::new(message)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Help ").border_set(border::THICK));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }

    fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        )
    }
}
