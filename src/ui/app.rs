use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::Config;
use crate::contact::Contact;
use crate::nav::Route;
use crate::view::ContactListView;

use super::draw;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Search,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    Navigate(Route),
}

pub struct App<'a> {
    view: ContactListView,
    config: &'a Config,
    search_input: Input,
    focus: Focus,
    selected: usize,
    confirm_delete: Option<Contact>,
    status: Option<String>,
    tick: usize,
}

impl<'a> App<'a> {
    pub fn new(view: ContactListView, config: &'a Config) -> Self {
        Self {
            view,
            config,
            search_input: Input::default(),
            focus: Focus::List,
            selected: 0,
            confirm_delete: None,
            status: None,
            tick: 0,
        }
    }

    /// Run the list view until the user quits or follows a link.
    pub fn run(mut self) -> Result<Option<Route>> {
        self.view.mount();

        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.view.unmount();
        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<Option<Route>>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            self.poll_view();
            self.tick = self.tick.wrapping_add(1);
            draw::render(terminal, self)?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key) {
                        Flow::Continue => {}
                        Flow::Quit => return Ok(None),
                        Flow::Navigate(route) => return Ok(Some(route)),
                    }
                }
            }
        }
    }

    fn poll_view(&mut self) {
        if self.view.pump() > 0 {
            self.clamp_selection();
            if !self.view.is_busy() {
                self.status = None;
            }
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Flow {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Flow::Quit;
        }

        if self.confirm_delete.is_some() {
            self.handle_confirm_key(key);
            return Flow::Continue;
        }

        match self.focus {
            Focus::Search => {
                self.handle_search_key(key);
                Flow::Continue
            }
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.focus = Focus::List;
            }
            KeyCode::Down => self.move_selection(1),
            KeyCode::Up => self.move_selection(-1),
            _ => {
                if let Some(change) = self.search_input.handle_event(&Event::Key(key)) {
                    if change.value {
                        self.view.search(self.search_input.value());
                        self.clamp_selection();
                    }
                }
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char('a') => return Flow::Navigate(Route::Add),
            KeyCode::Char('v') | KeyCode::Enter => {
                if let Some(contact) = self.selected_contact() {
                    return Flow::Navigate(Route::View(contact.id.clone()));
                }
            }
            KeyCode::Char('e') => {
                if let Some(contact) = self.selected_contact() {
                    return Flow::Navigate(Route::Edit(contact.id.clone()));
                }
            }
            KeyCode::Char('d') => {
                if let Some(contact) = self.selected_contact().cloned() {
                    self.confirm_delete = Some(contact);
                }
            }
            KeyCode::Char('r') => {
                self.view.reload();
                self.set_status("Reloading contacts");
            }
            _ => {}
        }
        Flow::Continue
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let Some(contact) = self.confirm_delete.take() else {
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.set_status(format!("Deleting {}", display_name(&contact)));
                self.view.delete(contact.id);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
            _ => self.confirm_delete = Some(contact),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view.filtered_contacts().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.view.filtered_contacts().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// The highlighted card, unless the list is hidden behind the loading indicator.
    pub fn selected_contact(&self) -> Option<&Contact> {
        if self.view.state().loading {
            return None;
        }
        self.view.filtered_contacts().get(self.selected)
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn view(&self) -> &ContactListView {
        &self.view
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn search_input(&self) -> &Input {
        &self.search_input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn confirm_delete(&self) -> Option<&Contact> {
        self.confirm_delete.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.tick % SPINNER_FRAMES.len()]
    }
}

pub fn display_name(contact: &Contact) -> &str {
    match contact.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => contact.id.as_str(),
    }
}
