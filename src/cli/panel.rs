use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use eyre::Result;
use futures::StreamExt;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Clear, Paragraph,
        canvas::{Canvas, Circle, Line as Stroke},
    },
};
use tokio::{
    select,
    time::{Instant, MissedTickBehavior, interval},
};

use crate::{
    display::{
        Bell,
        animation::AnimationProfile,
        picker::{Field, TimerPicker},
        rotor::Rotor,
    },
    hardware::{
        ControlSurface,
        fan::defs::{SpeedLevel, TimerDuration},
    },
    sync::{Controller, StatusSync},
};

use super::common::Context;

pub async fn launch(context: Context, animation: Option<AnimationProfile>) -> Result<()> {
    let display = &context.config.display;
    let profile = animation.unwrap_or(display.animation);

    let controller = Controller::new(context.fan.clone(), profile).with_feedback(Bell);
    let panel = Panel::new(controller, display.decelerate, context.config.timer.default)
        .with_title(context.fan.to_string());

    tracing::info!("Opening panel for {}", context.fan);

    let mut terminal = ratatui::init();
    let result = panel.run(&mut terminal).await;
    ratatui::restore();

    result
}

struct Panel<S> {
    controller: Controller<S>,
    rotor: Rotor,
    decelerate: bool,
    default_timer: TimerDuration,
    picker: Option<TimerPicker>,
    title: String,
    exit: bool,
}

impl<S: ControlSurface> Panel<S> {
    const FRAME_INTERVAL: Duration = Duration::from_millis(33);

    const RUNNING_COLOUR: Color = Color::Cyan;
    const STOPPED_COLOUR: Color = Color::DarkGray;

    fn new(controller: Controller<S>, decelerate: bool, default_timer: TimerDuration) -> Self {
        Self {
            controller,
            rotor: Rotor::new(),
            decelerate,
            default_timer,
            picker: None,
            title: String::new(),
            exit: false,
        }
    }

    fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let (sync, mut outcomes) = StatusSync::spawn(self.controller.surface().clone());

        let mut events = EventStream::new();
        let mut frames = interval(Self::FRAME_INTERVAL);
        let mut last_frame = Instant::now();

        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.exit {
            select! {
                Some(outcome) = outcomes.recv() => {
                    self.controller.reconcile(outcome);
                    self.sync_rotor();
                }

                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(error)) => return Err(error.into()),
                    None => break,
                },

                _ = frames.tick() => {
                    let now = Instant::now();
                    self.rotor.advance(now - last_frame);
                    last_frame = now;

                    terminal.draw(|frame| self.render(frame))?;
                }
            }
        }

        sync.stop();

        Ok(())
    }

    fn sync_rotor(&mut self) {
        let animation = self.controller.view().animation();
        let level = self.controller.state().speed;

        self.rotor.apply(animation, level, self.decelerate);
    }

    /* == Input == */

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
                self.sync_rotor();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit = true;
            return;
        }

        if let Some(picker) = &mut self.picker {
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => picker.toggle_field(),
                KeyCode::Char('h') | KeyCode::Char('l') => picker.toggle_field(),
                KeyCode::Up | KeyCode::Char('k') => picker.step(1),
                KeyCode::Down | KeyCode::Char('j') => picker.step(-1),

                KeyCode::Enter => {
                    let duration = picker.value();
                    self.picker = None;
                    self.controller.set_timer(duration);
                }

                KeyCode::Esc => self.picker = None,
                _ => {}
            }

            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit = true,
            KeyCode::Char(' ') | KeyCode::Enter => self.controller.toggle_power(),

            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Err(error) = self.controller.select_level(c as u8 - b'0') {
                    tracing::debug!("{error}");
                }
            }

            KeyCode::Char('+') => {
                let level = self.controller.state().speed.next();
                self.controller.select_speed(level);
            }

            KeyCode::Char('-') => {
                let level = self.controller.state().speed.previous();
                self.controller.select_speed(level);
            }

            KeyCode::Char('t') => self.picker = Some(TimerPicker::new(self.default_timer)),

            KeyCode::Char('c') if self.controller.view().countdown().is_visible() => {
                self.controller.cancel_timer()
            }

            _ => {}
        }
    }

    /* == Rendering == */

    fn render(&self, frame: &mut Frame) {
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center);
        let inner = block.inner(frame.area());
        frame.render_widget(block, frame.area());

        let [fan, selector, countdown, help] = Layout::vertical([
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.render_fan(frame, fan);
        self.render_selector(frame, selector);
        self.render_countdown(frame, countdown);

        let legend = "space power · 1-3 speed · t timer · c cancel timer · q quit";
        let legend = Paragraph::new(legend)
            .dark_gray()
            .alignment(Alignment::Center);

        frame.render_widget(legend, help);

        if let Some(picker) = &self.picker {
            render_picker(frame, picker);
        }
    }

    fn render_fan(&self, frame: &mut Frame, area: Rect) {
        let colour = match self.controller.view().animation().greyscale {
            true => Self::STOPPED_COLOUR,
            false => Self::RUNNING_COLOUR,
        };

        // Terminal cells are about twice as tall as they are wide
        let aspect = area.width as f64 / (2. * area.height.max(1) as f64);
        let angle = self.rotor.angle() as f64;

        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-1.2 * aspect, 1.2 * aspect])
            .y_bounds([-1.2, 1.2])
            .paint(move |ctx| {
                ctx.draw(&Circle {
                    x: 0.,
                    y: 0.,
                    radius: 1.,
                    color: colour,
                });

                for blade in 0..3 {
                    // Clockwise on screen
                    let theta = (-angle - 120. * blade as f64).to_radians();

                    ctx.draw(&Stroke::new(
                        0.,
                        0.,
                        0.85 * theta.cos(),
                        0.85 * theta.sin(),
                        colour,
                    ));
                }

                ctx.draw(&Circle {
                    x: 0.,
                    y: 0.,
                    radius: 0.12,
                    color: colour,
                });
            });

        frame.render_widget(canvas, area);
    }

    fn render_selector(&self, frame: &mut Frame, area: Rect) {
        let view = self.controller.view();
        let running = view.animation().running;

        let spans = SpeedLevel::all().flat_map(|level| {
            let label = Span::raw(format!(" {level} "));

            let label = match (level == view.selected(), running) {
                (true, true) => label.style(Style::new().black().on_cyan().bold()),
                (true, false) => label.style(Style::new().black().on_dark_gray().bold()),
                (false, _) => label.dark_gray(),
            };

            [label, Span::raw("  ")]
        });

        let line = Line::from(spans.collect::<Vec<_>>());
        let block = Block::bordered()
            .title(" Speed ")
            .title_alignment(Alignment::Center);

        let [area] = Layout::horizontal([Constraint::Length(20)])
            .flex(Flex::Center)
            .areas(area);

        let selector = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block);

        frame.render_widget(selector, area);
    }

    fn render_countdown(&self, frame: &mut Frame, area: Rect) {
        let countdown = self.controller.view().countdown();

        if countdown.is_visible() {
            let text = Paragraph::new(countdown.to_string())
                .yellow()
                .alignment(Alignment::Center);
            frame.render_widget(text, area);
        }
    }
}

fn render_picker(frame: &mut Frame, picker: &TimerPicker) {
    let [area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Length(32)])
        .flex(Flex::Center)
        .areas(area);

    let value = picker.value();
    let focus = |field: Field, text: String| match picker.field() == field {
        true => Span::raw(text).black().on_yellow().bold(),
        false => Span::raw(text),
    };

    let lines = vec![
        Line::from(vec![
            focus(Field::Hours, format!("{:02} h", value.hours())),
            Span::raw("  :  "),
            focus(Field::Minutes, format!("{:02} min", value.minutes())),
        ])
        .centered(),
        Line::default(),
        Line::from("enter confirm · esc cancel").dark_gray().centered(),
    ];

    let block = Block::bordered()
        .title(" Power-off countdown ")
        .title_alignment(Alignment::Center);

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend};

    use crate::hardware::{Fan, fan::protocol::StatusReport};

    use super::*;

    fn panel() -> Panel<Fan> {
        let fan = Arc::new(Fan::connect("http://127.0.0.1:1").unwrap());
        let controller = Controller::new(fan, AnimationProfile::Linear);

        Panel::new(controller, true, TimerDuration::DEFAULT).with_title("fan".into())
    }

    fn screen(panel: &Panel<Fan>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 24)).unwrap();
        terminal.draw(|frame| panel.render(frame)).unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_countdown_rendered() {
        let mut panel = panel();

        assert!(!screen(&panel).contains("Cancel countdown"));

        let report = StatusReport::parse(r#"{"status":1,"timer_left":125}"#).unwrap();
        panel.controller.reconcile(Ok(report));

        assert!(screen(&panel).contains("Cancel countdown: 00:02:05"));
    }

    #[tokio::test]
    async fn test_keys_select_speed() {
        let mut panel = panel();

        panel.handle_event(key(KeyCode::Char('3')));
        assert_eq!(panel.controller.state().speed, SpeedLevel::High);
        assert!(panel.controller.state().is_on);
        assert!(panel.rotor.is_moving());

        // Not a level, ignored
        panel.handle_event(key(KeyCode::Char('7')));
        assert_eq!(panel.controller.state().speed, SpeedLevel::High);

        panel.handle_event(key(KeyCode::Char('-')));
        assert_eq!(panel.controller.state().speed, SpeedLevel::Medium);
    }

    #[tokio::test]
    async fn test_picker_flow() {
        let mut panel = panel();

        panel.handle_event(key(KeyCode::Char('t')));
        assert!(screen(&panel).contains("Power-off countdown"));

        panel.handle_event(key(KeyCode::Up));
        assert_eq!(
            panel.picker.as_ref().map(TimerPicker::value),
            TimerDuration::new(1, 30).ok()
        );

        // Keys go to the picker while it is open
        panel.handle_event(key(KeyCode::Char(' ')));
        assert!(!panel.controller.state().is_on);

        panel.handle_event(key(KeyCode::Enter));
        assert!(panel.picker.is_none());
        assert!(!panel.exit);
    }

    #[tokio::test]
    async fn test_toggle_and_quit() {
        let mut panel = panel();

        panel.handle_event(key(KeyCode::Char(' ')));
        assert!(panel.controller.view().animation().running);

        panel.handle_event(key(KeyCode::Char('q')));
        assert!(panel.exit);
    }
}
