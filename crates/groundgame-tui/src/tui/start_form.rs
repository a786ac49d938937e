// Start screen: the Simulation and Live Helper entry forms.
//
// The form keeps raw text for its numeric fields so partially typed values
// survive redraws. Submitting parses and validates locally; only a
// well-formed `StartConfig` is sent to the app loop.

use crossterm::event::{KeyCode, KeyEvent};
use groundgame_app::protocol::UserCommand;
use groundgame_core::config::SimulationDefaults;
use groundgame_core::draft::{DraftOrder, ScoringFormat, StartConfig};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Which kind of session the form starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    Simulation,
    LiveHelper,
}

impl StartMode {
    pub fn label(self) -> &'static str {
        match self {
            StartMode::Simulation => "Simulation",
            StartMode::LiveHelper => "Live Helper",
        }
    }

    fn toggle(self) -> Self {
        match self {
            StartMode::Simulation => StartMode::LiveHelper,
            StartMode::LiveHelper => StartMode::Simulation,
        }
    }
}

/// One editable row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Mode,
    PickSlot,
    Teams,
    Rounds,
    Format,
    Order,
    DraftId,
}

const SIMULATION_FIELDS: &[Field] = &[
    Field::Mode,
    Field::PickSlot,
    Field::Teams,
    Field::Rounds,
    Field::Format,
    Field::Order,
];

const HELPER_FIELDS: &[Field] = &[Field::Mode, Field::PickSlot, Field::DraftId];

/// Editable state of the start screen.
#[derive(Debug, Clone, PartialEq)]
pub struct StartForm {
    pub mode: StartMode,
    pub pick_slot: String,
    pub teams: String,
    pub rounds: String,
    pub format: ScoringFormat,
    pub order: DraftOrder,
    pub draft_id: String,
    /// Index into the visible fields of the current mode.
    pub focus: usize,
    /// Inline error from local validation or a failed start request.
    pub error: Option<String>,
    /// A start request is in flight; submission is disabled.
    pub pending: bool,
}

impl Default for StartForm {
    fn default() -> Self {
        StartForm::from_defaults(&SimulationDefaults {
            pick_slot: 1,
            teams: 12,
            rounds: 15,
            format: ScoringFormat::Std,
            order: DraftOrder::Snake,
        })
    }
}

impl StartForm {
    pub fn from_defaults(defaults: &SimulationDefaults) -> Self {
        StartForm {
            mode: StartMode::Simulation,
            pick_slot: defaults.pick_slot.to_string(),
            teams: defaults.teams.to_string(),
            rounds: defaults.rounds.to_string(),
            format: defaults.format,
            order: defaults.order,
            draft_id: String::new(),
            focus: 0,
            error: None,
            pending: false,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.mode {
            StartMode::Simulation => SIMULATION_FIELDS,
            StartMode::LiveHelper => HELPER_FIELDS,
        }
    }

    pub fn focused(&self) -> Field {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    /// True while the focused field accepts free text, so letter keys are
    /// typed rather than treated as shortcuts.
    pub fn is_typing(&self) -> bool {
        self.focused() == Field::DraftId
    }

    /// Parse the fields into a validated configuration.
    pub fn build(&self) -> Result<StartConfig, String> {
        let pick_slot = parse_number("pick slot", &self.pick_slot)?;
        let config = match self.mode {
            StartMode::Simulation => StartConfig::Simulation {
                pick_slot,
                teams: parse_number("teams", &self.teams)?,
                rounds: parse_number("rounds", &self.rounds)?,
                format: self.format,
                order: self.order,
            },
            StartMode::LiveHelper => StartConfig::LiveHelper {
                pick_slot,
                external_draft_id: self.draft_id.trim().to_string(),
            },
        };
        config.validate().map_err(|e| e.user_message())?;
        Ok(config)
    }

    /// Apply a key press. Returns a command when the form is submitted.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Option<UserCommand> {
        match key_event.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields().len();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                let len = self.fields().len();
                self.focus = (self.focus + len - 1) % len;
                None
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Left | KeyCode::Right => {
                self.cycle_focused();
                None
            }
            KeyCode::Char(' ') if !self.is_typing() => {
                self.cycle_focused();
                None
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                let numeric = matches!(
                    self.focused(),
                    Field::PickSlot | Field::Teams | Field::Rounds
                );
                if numeric && !c.is_ascii_digit() {
                    return None;
                }
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn submit(&mut self) -> Option<UserCommand> {
        if self.pending {
            return None;
        }
        match self.build() {
            Ok(config) => {
                self.error = None;
                Some(UserCommand::StartSession(config))
            }
            Err(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    fn cycle_focused(&mut self) {
        match self.focused() {
            Field::Mode => {
                self.mode = self.mode.toggle();
                self.focus = 0;
                self.error = None;
            }
            Field::Format => self.format = self.format.next(),
            Field::Order => self.order = self.order.next(),
            _ => {}
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focused() {
            Field::PickSlot => Some(&mut self.pick_slot),
            Field::Teams => Some(&mut self.teams),
            Field::Rounds => Some(&mut self.rounds),
            Field::DraftId => Some(&mut self.draft_id),
            Field::Mode | Field::Format | Field::Order => None,
        }
    }

    fn field_value(&self, field: Field) -> String {
        match field {
            Field::Mode => self.mode.label().to_string(),
            Field::PickSlot => self.pick_slot.clone(),
            Field::Teams => self.teams.clone(),
            Field::Rounds => self.rounds.clone(),
            Field::Format => self.format.label().to_string(),
            Field::Order => self.order.label().to_string(),
            Field::DraftId => self.draft_id.clone(),
        }
    }
}

fn parse_number(name: &str, text: &str) -> Result<u32, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("{name} must be a whole number"))
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::Mode => "Mode",
        Field::PickSlot => "Pick slot",
        Field::Teams => "Teams",
        Field::Rounds => "Rounds",
        Field::Format => "Scoring",
        Field::Order => "Order",
        Field::DraftId => "Draft id",
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the start form into the given area.
pub fn render(frame: &mut Frame, area: Rect, form: &StartForm) {
    let focused = form.focused();
    let mut lines = Vec::new();

    for &field in form.fields() {
        let is_focused = field == focused;
        let marker = if is_focused { "> " } else { "  " };
        let value = form.field_value(field);
        let value = match field {
            Field::Mode | Field::Format | Field::Order => format!("< {value} >"),
            _ if is_focused => format!("{value}_"),
            _ => value,
        };
        let style = if is_focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{:<10}", field_label(field)), style),
            Span::raw(" "),
            Span::styled(value, style),
        ]));
    }

    lines.push(Line::from(""));
    if form.pending {
        lines.push(Line::from(Span::styled(
            "Starting session...",
            Style::default().fg(Color::Cyan),
        )));
    } else if let Some(ref error) = form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let title = format!(" New Draft: {} ", form.mode.label());
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title),
    );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
