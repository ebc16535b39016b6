use crate::checklist::{Item, List};
use crate::store::{Store, StoreError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List as ListWidget, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One line-group of the rendered tree, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    ListHeader(usize),
    Item { list: usize, item: usize },
    NewItem(usize),
    NewList,
}

impl Row {
    fn selectable(self) -> bool {
        !matches!(self, Row::ListHeader(_))
    }

    fn list(self) -> Option<usize> {
        match self {
            Row::ListHeader(list) | Row::Item { list, .. } | Row::NewItem(list) => Some(list),
            Row::NewList => None,
        }
    }
}

/// Flattens every list, its items and its "New Item" control, then the trailing "New List" control.
pub fn rows(lists: &[List]) -> Vec<Row> {
    let mut rows = Vec::new();
    for (list, entry) in lists.iter().enumerate() {
        rows.push(Row::ListHeader(list));
        rows.extend((0..entry.items.len()).map(|item| Row::Item { list, item }));
        rows.push(Row::NewItem(list));
    }
    rows.push(Row::NewList);
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTarget {
    NewList,
    NewItem(usize),
}

/// A modal single-line text input. Finishes with `Some(text)` on Enter, `None` on Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub target: PromptTarget,
    pub input: String,
}

enum PromptStep {
    Editing,
    Done(Option<String>),
}

impl Prompt {
    fn new(target: PromptTarget) -> Self {
        Self {
            target,
            input: String::new(),
        }
    }

    fn title(&self) -> &'static str {
        match self.target {
            PromptTarget::NewList => "List Name",
            PromptTarget::NewItem(_) => "Item Name",
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> PromptStep {
        match key.code {
            KeyCode::Enter => PromptStep::Done(Some(std::mem::take(&mut self.input))),
            KeyCode::Esc => PromptStep::Done(None),
            KeyCode::Backspace => {
                self.input.pop();
                PromptStep::Editing
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                PromptStep::Editing
            }
            _ => PromptStep::Editing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Prompt(Prompt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub store: Store,
    pub cursor: usize, // index into `rows(store.lists())`
    pub mode: Mode,
}

impl App {
    pub fn new(store: Store) -> Self {
        let cursor = rows(store.lists())
            .iter()
            .position(|row| row.selectable())
            .unwrap_or(0);
        Self {
            store,
            cursor,
            mode: Mode::Browse,
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        rows(self.store.lists())
    }

    pub fn selected(&self) -> Row {
        let rows = self.rows();
        rows.get(self.cursor).copied().unwrap_or(Row::NewList)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Flow, UiError> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Flow::Quit);
        }

        if let Mode::Prompt(prompt) = &mut self.mode {
            if let PromptStep::Done(answer) = prompt.handle_key(key) {
                let target = prompt.target;
                self.mode = Mode::Browse;
                self.finish_prompt(target, answer)?;
            }
            return Ok(Flow::Continue);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Home => {
                self.cursor = 0;
                self.move_cursor(1);
            }
            KeyCode::End => self.cursor = self.rows().len() - 1,
            KeyCode::Enter | KeyCode::Char(' ') => self.activate()?,
            KeyCode::Char('i') => {
                if let Some(list) = self.selected().list() {
                    self.mode = Mode::Prompt(Prompt::new(PromptTarget::NewItem(list)));
                }
            }
            KeyCode::Char('n') => self.mode = Mode::Prompt(Prompt::new(PromptTarget::NewList)),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    fn move_cursor(&mut self, step: isize) {
        let rows = self.rows();
        let mut next = self.cursor as isize;
        loop {
            next += step;
            if next < 0 || next >= rows.len() as isize {
                return;
            }
            if rows[next as usize].selectable() {
                self.cursor = next as usize;
                return;
            }
        }
    }

    fn activate(&mut self) -> Result<(), UiError> {
        match self.selected() {
            Row::Item { list, item } => {
                self.store.toggle_item(list, item)?;
            }
            Row::NewItem(list) => {
                self.mode = Mode::Prompt(Prompt::new(PromptTarget::NewItem(list)));
            }
            Row::NewList => self.mode = Mode::Prompt(Prompt::new(PromptTarget::NewList)),
            Row::ListHeader(_) => {}
        }
        Ok(())
    }

    fn finish_prompt(&mut self, target: PromptTarget, answer: Option<String>) -> Result<(), UiError> {
        let Some(name) = answer else {
            return Ok(());
        };
        let focus = match target {
            PromptTarget::NewList => self.store.add_list(&name)?.map(Row::NewItem),
            PromptTarget::NewItem(list) => self
                .store
                .add_item(list, &name)?
                .map(|item| Row::Item { list, item }),
        };
        if let Some(focus) = focus {
            if let Some(position) = self.rows().iter().position(|row| *row == focus) {
                self.cursor = position;
            }
        }
        Ok(())
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), UiError> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key)? == Flow::Quit {
                return Ok(());
            }
        }
    }
}

/// Draws the whole tree from the current state; calling it twice without a change draws the same frame.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    let lists = app.store.lists();
    let rows = app.rows();
    let items: Vec<ListItem> = rows.iter().map(|row| render_row(lists, *row)).collect();
    let tree = ListWidget::new(items)
        .block(Block::default().title("Checklists").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(tree, chunks[0], &mut state);

    let hint = match app.mode {
        Mode::Browse => "↑/↓ move  enter toggle/open  i new item  n new list  q quit",
        Mode::Prompt(_) => "enter save  esc cancel",
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    if let Mode::Prompt(prompt) = &app.mode {
        let area = prompt_area(f.area());
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(format!("{}_", prompt.input)).block(
                Block::default()
                    .title(prompt.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            ),
            area,
        );
    }
}

fn render_row<'a>(lists: &'a [List], row: Row) -> ListItem<'a> {
    match row {
        Row::ListHeader(list) => {
            let title = Line::from(Span::styled(
                lists[list].name.as_str(),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
            if list == 0 {
                ListItem::new(title)
            } else {
                ListItem::new(vec![Line::default(), title])
            }
        }
        Row::Item { list, item } => render_item(&lists[list].items[item]),
        Row::NewItem(_) => ListItem::new(Line::from(Span::styled(
            "  + New Item",
            Style::default().fg(Color::DarkGray),
        ))),
        Row::NewList => ListItem::new(vec![
            Line::default(),
            Line::from(Span::styled("+ New List", Style::default().fg(Color::Yellow))),
        ]),
    }
}

/// Name line plus the created/completed status line for one item.
pub fn render_item(item: &Item) -> ListItem<'_> {
    let (marker, name_style) = if item.is_completed() {
        (
            "[x] ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ] ", Style::default().fg(Color::White))
    };
    ListItem::new(vec![
        Line::from(vec![
            Span::raw("  "),
            Span::raw(marker),
            Span::styled(item.name.as_str(), name_style),
        ]),
        Line::from(Span::styled(
            format!("      {}", item.status_line()),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

fn prompt_area(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(50);
    let height = area.height.min(3);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{self, tests::Shared, MemoryStorage};
    use ratatui::{backend::TestBackend, buffer::Buffer};

    fn app() -> App {
        App::new(Store::open(Box::new(MemoryStorage::default()), "db").unwrap())
    }

    fn press(app: &mut App, code: KeyCode) -> Flow {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn rows_follow_database_order() {
        let app = app();
        assert_eq!(
            app.rows(),
            vec![
                Row::ListHeader(0),
                Row::Item { list: 0, item: 0 },
                Row::Item { list: 0, item: 1 },
                Row::NewItem(0),
                Row::NewList,
            ]
        );
        assert_eq!(app.selected(), Row::Item { list: 0, item: 0 });
    }

    #[test]
    fn drawing_twice_gives_the_same_frame() {
        let app = app();
        let first = screen(&app);
        assert_eq!(first, screen(&app));
        let shown = text(&first);
        assert!(shown.contains("List One"));
        assert!(shown.contains("Item One"));
        assert!(shown.contains("Item Two"));
        assert!(shown.contains("+ New Item"));
        assert!(shown.contains("+ New List"));
    }

    #[test]
    fn enter_toggles_the_selected_item_and_its_status_line() {
        let mut app = app();
        assert!(text(&screen(&app)).contains("Created at"));
        assert!(!text(&screen(&app)).contains("Completed at"));

        press(&mut app, KeyCode::Enter);
        assert!(app.store.lists()[0].items[0].completed_at.is_some());
        assert!(text(&screen(&app)).contains("Completed at"));

        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.lists()[0].items[0].completed_at.is_none());
        assert!(!text(&screen(&app)).contains("Completed at"));
    }

    #[test]
    fn new_item_prompt_appends_and_selects_the_item() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected(), Row::NewItem(0));

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.mode,
            Mode::Prompt(Prompt::new(PromptTarget::NewItem(0)))
        );
        assert!(text(&screen(&app)).contains("Item Name"));
        type_text(&mut app, "Buy milkk");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Browse);
        let items = &app.store.lists()[0].items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].name, "Buy milk");
        assert!(items[2].completed_at.is_none());
        assert_eq!(app.selected(), Row::Item { list: 0, item: 2 });
    }

    #[test]
    fn typing_q_inside_a_prompt_does_not_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Continue);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.lists()[1].name, "q");
    }

    #[test]
    fn new_list_then_cancelled_item_prompt() {
        let mut app = app();
        press(&mut app, KeyCode::End);
        assert_eq!(app.selected(), Row::NewList);

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Groceries");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.lists().len(), 2);
        assert_eq!(app.selected(), Row::NewItem(1));

        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Eggs");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Browse);
        assert!(app.store.lists()[1].items.is_empty());
        assert!(text(&screen(&app)).contains("Groceries"));
    }

    #[test]
    fn empty_submission_changes_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.lists().len(), 1);
        assert_eq!(app.store.lists()[0].items.len(), 2);
    }

    #[test]
    fn cursor_skips_headers_and_stops_at_edges() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected(), Row::Item { list: 0, item: 0 });
        for _ in 0..10 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.selected(), Row::NewList);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.selected(), Row::Item { list: 0, item: 0 });
    }

    #[test]
    fn quits_on_q_esc_and_ctrl_c() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Flow::Quit);
        assert_eq!(press(&mut app, KeyCode::Esc), Flow::Quit);
        press(&mut app, KeyCode::Char('n'));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c).unwrap(), Flow::Quit);
    }

    #[test]
    fn every_change_is_written_through() {
        let shared = Shared::default();
        let mut app = App::new(Store::open(Box::new(shared.clone()), "db").unwrap());
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        let saved = storage::load(&shared, "db").unwrap().unwrap();
        assert_eq!(saved[0].items.len(), 3);
        assert!(saved[0].items[2].completed_at.is_some());
    }
}
