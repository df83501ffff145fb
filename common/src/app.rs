use tracing::{debug, error, info};

use crate::error::{PlatformError, StartupError};

/// Exit status when startup fails before the event loop runs.
pub const STARTUP_FAILURE_EXIT_CODE: i32 = 0;

pub const ERROR_CAPTION: &str = "Error";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormConfig {
    pub class_name: &'static str,
    pub title: &'static str,
    pub window_size: (i32, i32),
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            class_name: "NativeWinFormsClass",
            title: "Native WinForms (GDI)",
            window_size: (320, 220),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Registered,
    WindowCreated,
    Running,
    Terminated,
}

/// Outcome of one turn of the message pump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pump {
    Dispatched,
    Quit(i32),
}

pub trait Platform {
    fn register_class(&mut self, config: &FormConfig) -> Result<(), PlatformError>;
    fn create_window(&mut self, config: &FormConfig) -> Result<(), PlatformError>;
    /// Blocks until a message arrives, then translates and dispatches it.
    fn next_message(&mut self) -> Pump;
    fn show_error(&mut self, caption: &str, text: &str);
}

pub struct App<'p, P: Platform> {
    platform: &'p mut P,
    state: Lifecycle,
}

impl<'p, P: Platform> App<'p, P> {
    pub fn new(platform: &'p mut P) -> Self {
        Self {
            platform,
            state: Lifecycle::Uninitialized,
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    fn transition(&mut self, next: Lifecycle) {
        debug!(from = ?self.state, to = ?next, "lifecycle");
        self.state = next;
    }

    pub fn init(&mut self, config: &FormConfig) -> Result<(), StartupError> {
        if let Err(e) = self.platform.register_class(config) {
            self.transition(Lifecycle::Terminated);
            return Err(StartupError::RegisterClass(e));
        }
        self.transition(Lifecycle::Registered);

        if let Err(e) = self.platform.create_window(config) {
            self.transition(Lifecycle::Terminated);
            return Err(StartupError::CreateWindow(e));
        }
        self.transition(Lifecycle::WindowCreated);

        Ok(())
    }

    /// Pumps messages until the quit signal and returns its payload.
    pub fn run(&mut self) -> i32 {
        self.transition(Lifecycle::Running);
        loop {
            if let Pump::Quit(exit_code) = self.platform.next_message() {
                self.transition(Lifecycle::Terminated);
                info!(exit_code, "event loop finished");
                return exit_code;
            }
        }
    }
}

/// Runs the whole program against `platform` and returns the process exit status.
pub fn launch<P: Platform>(platform: &mut P, config: &FormConfig) -> i32 {
    let mut app = App::new(platform);
    if let Err(e) = app.init(config) {
        error!(cause = %platform_error(&e), "startup failed: {e}");
        app.platform.show_error(ERROR_CAPTION, &e.to_string());
        return STARTUP_FAILURE_EXIT_CODE;
    }

    app.run()
}

fn platform_error(e: &StartupError) -> &PlatformError {
    match e {
        StartupError::RegisterClass(source) | StartupError::CreateWindow(source) => source,
    }
}
