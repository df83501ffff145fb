use std::cell::{Cell, RefCell};

use tracing::{debug, info, warn};

use crate::error::PlatformError;

/// Identifiers the controls report back in their command notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlId {
    NameInput,
    SayHello,
    Exit,
}

impl ControlId {
    pub const fn raw(self) -> u16 {
        match self {
            ControlId::NameInput => 101,
            ControlId::SayHello => 102,
            ControlId::Exit => 103,
        }
    }

    pub fn from_raw(id: u16) -> Option<Self> {
        match id {
            101 => Some(ControlId::NameInput),
            102 => Some(ControlId::SayHello),
            103 => Some(ControlId::Exit),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlKind {
    Edit,
    Button,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlSpec {
    pub id: ControlId,
    pub kind: ControlKind,
    pub label: &'static str,
    pub bounds: Bounds,
}

pub const CONTROLS: [ControlSpec; 3] = [
    ControlSpec {
        id: ControlId::NameInput,
        kind: ControlKind::Edit,
        label: "",
        bounds: Bounds {
            x: 20,
            y: 20,
            width: 240,
            height: 24,
        },
    },
    ControlSpec {
        id: ControlId::SayHello,
        kind: ControlKind::Button,
        label: "Say Hello",
        bounds: Bounds {
            x: 20,
            y: 60,
            width: 100,
            height: 30,
        },
    },
    ControlSpec {
        id: ControlId::Exit,
        kind: ControlKind::Button,
        label: "Exit",
        bounds: Bounds {
            x: 140,
            y: 60,
            width: 100,
            height: 30,
        },
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caption {
    pub text: &'static str,
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
}

pub const CAPTION: Caption = Caption {
    text: "This is a native Win32 UI rendered via GDI.",
    x: 20,
    y: 100,
    color: Rgb(0, 100, 180),
};

pub const GREETING_CAPTION: &str = "Greeting";

const DEFAULT_NAME: &str = "world";

/// Text of the acknowledgment shown by "Say Hello".
pub fn greeting(name: &str) -> String {
    let name = if name.is_empty() { DEFAULT_NAME } else { name };
    format!("Hello, {name}!")
}

/// The window messages the controller reacts to. Everything else goes to default handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Create,
    Command(u16),
    Paint,
    Destroy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageIcon {
    Information,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    Created,
    Visible,
    Closing,
    Destroyed,
}

/// A drawing surface that lives for one paint request. Dropping it ends the paint.
pub trait Surface {
    fn set_text_color(&mut self, color: Rgb);
    fn set_transparent_background(&mut self);
    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), PlatformError>;
}

/// What the controller needs from the window it is attached to.
pub trait Ui {
    type Control;
    type Surface<'a>: Surface
    where
        Self: 'a;

    fn create_control(&mut self, spec: &ControlSpec) -> Result<Self::Control, PlatformError>;
    fn control_text(&self, control: &Self::Control) -> String;
    fn show_message(&mut self, caption: &str, text: &str, icon: MessageIcon);
    fn request_close(&mut self) -> Result<(), PlatformError>;
    fn post_quit(&mut self, exit_code: i32);
    fn begin_paint(&mut self) -> Self::Surface<'_>;
}

/// Reacts to the events of one top-level window and owns its child controls.
///
/// Handlers take `&self`: a modal dialog opened from one handler pumps
/// messages of its own, so the window procedure can be re-entered while that
/// handler is still on the stack.
pub struct WindowController<U: Ui> {
    state: Cell<WindowState>,
    controls: RefCell<Vec<(ControlId, U::Control)>>,
}

impl<U: Ui> Default for WindowController<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Ui> WindowController<U> {
    pub fn new() -> Self {
        Self {
            state: Cell::new(WindowState::Created),
            controls: RefCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> WindowState {
        self.state.get()
    }

    pub fn control_count(&self) -> usize {
        self.controls.borrow().len()
    }

    /// Returns whether the event was consumed. Every `Event` is; messages that
    /// need default handling never decode into one.
    pub fn handle(&self, ui: &mut U, event: Event) -> bool {
        debug!(?event, "window event");
        match event {
            Event::Create => self.on_create(ui),
            Event::Command(id) => self.on_command(ui, id),
            Event::Paint => self.on_paint(ui),
            Event::Destroy => self.on_destroy(ui),
        }
        true
    }

    fn on_create(&self, ui: &mut U) {
        // Child creation sends notifications to this window, so no borrow is held across it.
        let mut created = Vec::with_capacity(CONTROLS.len());
        for spec in &CONTROLS {
            match ui.create_control(spec) {
                Ok(control) => created.push((spec.id, control)),
                Err(e) => warn!(id = ?spec.id, "failed to create control: {e}"),
            }
        }
        self.controls.borrow_mut().extend(created);
        self.state.set(WindowState::Visible);
    }

    fn on_command(&self, ui: &mut U, id: u16) {
        match ControlId::from_raw(id) {
            Some(ControlId::SayHello) => {
                let text = self.greeting_text(ui);
                info!("{text}");
                ui.show_message(GREETING_CAPTION, &text, MessageIcon::Information);
            }
            Some(ControlId::Exit) => {
                self.state.set(WindowState::Closing);
                if let Err(e) = ui.request_close() {
                    warn!("failed to post close request: {e}");
                }
            }
            _ => {}
        }
    }

    fn greeting_text(&self, ui: &U) -> String {
        let controls = self.controls.borrow();
        let name = controls
            .iter()
            .find(|(id, _)| *id == ControlId::NameInput)
            .map(|(_, control)| ui.control_text(control))
            .unwrap_or_default();
        greeting(&name)
    }

    fn on_paint(&self, ui: &mut U) {
        let mut surface = ui.begin_paint();
        surface.set_text_color(CAPTION.color);
        surface.set_transparent_background();
        if let Err(e) = surface.draw_text(CAPTION.x, CAPTION.y, CAPTION.text) {
            warn!("failed to draw caption: {e}");
        }
    }

    fn on_destroy(&self, ui: &mut U) {
        self.controls.borrow_mut().clear();
        self.state.set(WindowState::Destroyed);
        ui.post_quit(0);
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub(crate) enum Call {
        CreateControl(ControlId),
        Message(String, String, MessageIcon),
        RequestClose,
        PostQuit(i32),
        BeginPaint,
        TextColor(Rgb),
        Transparent,
        DrawText(i32, i32, String),
        EndPaint,
    }

    /// Records every call and keeps the edit control's text.
    #[derive(Default)]
    pub(crate) struct FakeUi {
        pub calls: Vec<Call>,
        pub input: String,
        pub fail_control: Option<ControlId>,
        pub fail_draw: bool,
    }

    pub(crate) struct FakeSurface<'a> {
        ui: &'a mut FakeUi,
    }

    impl Surface for FakeSurface<'_> {
        fn set_text_color(&mut self, color: Rgb) {
            self.ui.calls.push(Call::TextColor(color));
        }

        fn set_transparent_background(&mut self) {
            self.ui.calls.push(Call::Transparent);
        }

        fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), PlatformError> {
            if self.ui.fail_draw {
                return Err(PlatformError::new(-1, "TextOut failed"));
            }
            self.ui.calls.push(Call::DrawText(x, y, text.to_string()));
            Ok(())
        }
    }

    impl Drop for FakeSurface<'_> {
        fn drop(&mut self) {
            self.ui.calls.push(Call::EndPaint);
        }
    }

    impl Ui for FakeUi {
        type Control = ControlId;
        type Surface<'a> = FakeSurface<'a>;

        fn create_control(&mut self, spec: &ControlSpec) -> Result<ControlId, PlatformError> {
            if self.fail_control == Some(spec.id) {
                return Err(PlatformError::new(-1, "CreateWindowEx failed"));
            }
            self.calls.push(Call::CreateControl(spec.id));
            Ok(spec.id)
        }

        fn control_text(&self, control: &ControlId) -> String {
            match control {
                ControlId::NameInput => self.input.clone(),
                ControlId::SayHello => "Say Hello".to_string(),
                ControlId::Exit => "Exit".to_string(),
            }
        }

        fn show_message(&mut self, caption: &str, text: &str, icon: MessageIcon) {
            self.calls
                .push(Call::Message(caption.to_string(), text.to_string(), icon));
        }

        fn request_close(&mut self) -> Result<(), PlatformError> {
            self.calls.push(Call::RequestClose);
            Ok(())
        }

        fn post_quit(&mut self, exit_code: i32) {
            self.calls.push(Call::PostQuit(exit_code));
        }

        fn begin_paint(&mut self) -> FakeSurface<'_> {
            self.calls.push(Call::BeginPaint);
            FakeSurface { ui: self }
        }
    }
}
