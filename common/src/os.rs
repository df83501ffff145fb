use std::ffi::CString;

use tracing::{debug, error, warn};
use windows::{
    core::{s, PCSTR, PCWSTR},
    Win32::{
        Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, EndPaint, SetBkMode, SetTextColor, TextOutA, HDC, PAINTSTRUCT, TRANSPARENT,
        },
        System::LibraryLoader::GetModuleHandleA,
        UI::WindowsAndMessaging::{
            CreateWindowExA, DefWindowProcA, DestroyWindow, DispatchMessageA, GetMessageA,
            GetWindowLongPtrA, GetWindowTextLengthW, GetWindowTextW, IsWindow, LoadCursorA,
            MessageBoxW, PostMessageA, PostQuitMessage, RegisterClassExA, SetWindowLongPtrA,
            TranslateMessage, UnregisterClassA, CREATESTRUCTA, CS_HREDRAW, CS_VREDRAW,
            CW_USEDEFAULT, GWLP_USERDATA, HMENU, IDC_ARROW, MB_ICONERROR, MB_ICONINFORMATION,
            MB_OK, MESSAGEBOX_STYLE, MSG, WINDOW_EX_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE,
            WM_DESTROY, WM_NCDESTROY, WM_PAINT, WNDCLASSEXA, WS_BORDER, WS_CHILD,
            WS_OVERLAPPEDWINDOW, WS_VISIBLE,
        },
    },
};

use crate::{
    app::{FormConfig, Platform, Pump},
    error::PlatformError,
    form::{ControlKind, ControlSpec, Event, MessageIcon, Rgb, Surface, Ui, WindowController},
    util::{from_wide, low_word, to_wide, AsCString},
};

type Controller = WindowController<HwndUi>;

/// The window procedure's view of one window.
pub struct HwndUi {
    hwnd: HWND,
}

pub struct PaintSurface {
    hwnd: HWND,
    hdc: HDC,
    paint: PAINTSTRUCT,
}

impl Surface for PaintSurface {
    fn set_text_color(&mut self, color: Rgb) {
        let Rgb(r, g, b) = color;
        let color = COLORREF(u32::from(r) | u32::from(g) << 8 | u32::from(b) << 16);
        unsafe { SetTextColor(self.hdc, color) };
    }

    fn set_transparent_background(&mut self) {
        unsafe { SetBkMode(self.hdc, TRANSPARENT) };
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<(), PlatformError> {
        unsafe { TextOutA(self.hdc, x, y, text.as_bytes()) }.ok()?;
        Ok(())
    }
}

impl Drop for PaintSurface {
    fn drop(&mut self) {
        let _ = unsafe { EndPaint(self.hwnd, &self.paint) };
    }
}

impl Ui for HwndUi {
    type Control = HWND;
    type Surface<'a> = PaintSurface;

    fn create_control(&mut self, spec: &ControlSpec) -> Result<HWND, PlatformError> {
        let instance = unsafe { GetModuleHandleA(None) }?;
        let class = match spec.kind {
            ControlKind::Edit => s!("EDIT"),
            ControlKind::Button => s!("BUTTON"),
        };
        let label = spec.label.as_c_string();
        let bounds = spec.bounds;

        let hwnd = unsafe {
            CreateWindowExA(
                WINDOW_EX_STYLE::default(),
                class,
                PCSTR(label.as_ptr() as _),
                WS_CHILD | WS_VISIBLE | WS_BORDER,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                self.hwnd,
                // Child windows carry their id in the menu slot.
                HMENU(usize::from(spec.id.raw()) as _),
                instance,
                None,
            )
        }?;

        Ok(hwnd)
    }

    fn control_text(&self, control: &HWND) -> String {
        // Wide calls so non-ASCII input survives the trip into the greeting.
        let len = unsafe { GetWindowTextLengthW(*control) };
        let mut buffer = vec![0u16; len.max(0) as usize + 1];
        let copied = unsafe { GetWindowTextW(*control, &mut buffer) };
        buffer.truncate(copied.max(0) as usize);
        from_wide(&buffer)
    }

    fn show_message(&mut self, caption: &str, text: &str, icon: MessageIcon) {
        message_box(self.hwnd, caption, text, icon);
    }

    fn request_close(&mut self) -> Result<(), PlatformError> {
        unsafe { PostMessageA(self.hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)) }?;
        Ok(())
    }

    fn post_quit(&mut self, exit_code: i32) {
        unsafe { PostQuitMessage(exit_code) };
    }

    fn begin_paint(&mut self) -> PaintSurface {
        let mut paint = PAINTSTRUCT::default();
        let hdc = unsafe { BeginPaint(self.hwnd, &mut paint) };
        PaintSurface {
            hwnd: self.hwnd,
            hdc,
            paint,
        }
    }
}

fn message_box(owner: HWND, caption: &str, text: &str, icon: MessageIcon) {
    let style: MESSAGEBOX_STYLE = match icon {
        MessageIcon::Information => MB_OK | MB_ICONINFORMATION,
        MessageIcon::Error => MB_OK | MB_ICONERROR,
    };
    let caption = to_wide(caption);
    let text = to_wide(text);
    unsafe {
        MessageBoxW(
            owner,
            PCWSTR(text.as_ptr()),
            PCWSTR(caption.as_ptr()),
            style,
        );
    }
}

/// Owns the registered window class, the top-level window and its controller.
pub struct Win32Platform {
    instance: HINSTANCE,
    class_name: CString,
    registered: bool,
    hwnd: Option<HWND>,
    controller: Box<Controller>,
}

impl Default for Win32Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl Win32Platform {
    pub fn new() -> Self {
        Self {
            instance: HINSTANCE::default(),
            class_name: CString::default(),
            registered: false,
            hwnd: None,
            controller: Box::new(Controller::new()),
        }
    }
}

impl Platform for Win32Platform {
    fn register_class(&mut self, config: &FormConfig) -> Result<(), PlatformError> {
        self.instance = unsafe { GetModuleHandleA(None) }?.into();
        self.class_name = config.class_name.as_c_string();

        let wc = WNDCLASSEXA {
            cbSize: std::mem::size_of::<WNDCLASSEXA>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wndproc),
            hInstance: self.instance,
            hCursor: unsafe { LoadCursorA(None, PCSTR(IDC_ARROW.0 as _)) }?,
            lpszClassName: PCSTR(self.class_name.as_ptr() as _),
            ..Default::default()
        };

        if unsafe { RegisterClassExA(&wc) } == 0 {
            return Err(windows::core::Error::from_win32().into());
        }
        self.registered = true;
        debug!(class = config.class_name, "window class registered");

        Ok(())
    }

    fn create_window(&mut self, config: &FormConfig) -> Result<(), PlatformError> {
        let title = config.title.as_c_string();
        let (width, height) = config.window_size;
        let controller: *const Controller = &*self.controller;

        let hwnd = unsafe {
            CreateWindowExA(
                WINDOW_EX_STYLE::default(),
                PCSTR(self.class_name.as_ptr() as _),
                PCSTR(title.as_ptr() as _),
                WS_OVERLAPPEDWINDOW | WS_VISIBLE,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                width,
                height,
                None, // No parent window.
                None, // No menus.
                self.instance,
                Some(controller as _),
            )
        }?;

        self.hwnd = Some(hwnd);
        debug!(title = config.title, width, height, "window created");

        Ok(())
    }

    fn next_message(&mut self) -> Pump {
        let mut message = MSG::default();
        let result = unsafe { GetMessageA(&mut message, None, 0, 0) }.0;

        if result > 0 {
            unsafe {
                let _ = TranslateMessage(&message);
                DispatchMessageA(&message);
            }
            return Pump::Dispatched;
        }

        if result < 0 {
            error!(
                "failed to retrieve message: {}",
                windows::core::Error::from_win32()
            );
        }
        Pump::Quit(message.wParam.0 as i32)
    }

    fn show_error(&mut self, caption: &str, text: &str) {
        message_box(HWND::default(), caption, text, MessageIcon::Error);
    }
}

impl Drop for Win32Platform {
    fn drop(&mut self) {
        if let Some(hwnd) = self.hwnd.take() {
            if unsafe { IsWindow(hwnd) }.as_bool() {
                if let Err(e) = unsafe { DestroyWindow(hwnd) } {
                    warn!("failed to destroy window: {e}");
                }
            }
        }

        if self.registered {
            let class_name = PCSTR(self.class_name.as_ptr() as _);
            if let Err(e) = unsafe { UnregisterClassA(class_name, self.instance) } {
                warn!("failed to unregister window class: {e}");
            }
        }
    }
}

fn decode(message: u32, wparam: WPARAM) -> Option<Event> {
    match message {
        WM_CREATE => Some(Event::Create),
        WM_COMMAND => Some(Event::Command(low_word(wparam.0))),
        WM_PAINT => Some(Event::Paint),
        WM_DESTROY => Some(Event::Destroy),
        _ => None,
    }
}

fn controller<'a>(hwnd: HWND) -> Option<&'a Controller> {
    let user_data = unsafe { GetWindowLongPtrA(hwnd, GWLP_USERDATA) };
    // The pointee is boxed by `Win32Platform`, which outlives the window.
    std::ptr::NonNull::<Controller>::new(user_data as _).map(|c| unsafe { c.as_ref() })
}

extern "system" fn wndproc(hwnd: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match message {
        WM_CREATE => {
            let create_struct = unsafe { &*(lparam.0 as *const CREATESTRUCTA) };
            unsafe { SetWindowLongPtrA(hwnd, GWLP_USERDATA, create_struct.lpCreateParams as _) };
        }

        WM_NCDESTROY => {
            unsafe { SetWindowLongPtrA(hwnd, GWLP_USERDATA, 0) };
        }

        _ => {}
    }

    let handled = match (decode(message, wparam), controller(hwnd)) {
        (Some(event), Some(window)) => window.handle(&mut HwndUi { hwnd }, event),
        _ => false,
    };

    if handled {
        LRESULT::default()
    } else {
        unsafe { DefWindowProcA(hwnd, message, wparam, lparam) }
    }
}

#[cfg(test)]
mod tests {
    use windows::Win32::UI::WindowsAndMessaging::{WM_KEYDOWN, WM_SIZE};

    use super::*;

    #[test]
    fn decode_maps_handled_messages() {
        assert_eq!(decode(WM_CREATE, WPARAM(0)), Some(Event::Create));
        assert_eq!(decode(WM_PAINT, WPARAM(0)), Some(Event::Paint));
        assert_eq!(decode(WM_DESTROY, WPARAM(0)), Some(Event::Destroy));
    }

    #[test]
    fn decode_takes_command_id_from_low_word() {
        // BN_CLICKED (0) in the high word.
        assert_eq!(decode(WM_COMMAND, WPARAM(102)), Some(Event::Command(102)));
        // EN_CHANGE (0x0300) from the edit control.
        assert_eq!(
            decode(WM_COMMAND, WPARAM(0x0300_0065)),
            Some(Event::Command(101))
        );
    }

    #[test]
    fn other_messages_fall_through_to_default_handling() {
        for message in [WM_CLOSE, WM_SIZE, WM_KEYDOWN, WM_NCDESTROY] {
            assert_eq!(decode(message, WPARAM(0)), None);
        }
    }
}
