// ── Native window system ──────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Opt into Per-Monitor v2 DPI awareness and register the window class.
//   • Create resizable top-level windows sized in logical units.
//   • Pump the thread's message queue without blocking (`PeekMessageW`).
//   • Translate WM_SIZE / WM_DPICHANGED / WM_QUIT into `WindowEvent`s.
//   • Answer logical-size, drawable-size and per-monitor DPI queries.

#![allow(unsafe_code)]

use std::{cell::RefCell, collections::VecDeque};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{
            GetLastError, BOOL, ERROR_CLASS_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT,
            RECT, WPARAM,
        },
        Graphics::Gdi::{GetStockObject, BLACK_BRUSH, HBRUSH, HMONITOR},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            HiDpi::AdjustWindowRectExForDpi,
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
                IsWindow, LoadCursorW, PeekMessageW, PostQuitMessage, RegisterClassExW,
                SetWindowPos, TranslateMessage, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, HICON,
                HMENU, IDC_ARROW, MSG, PM_REMOVE, SWP_NOACTIVATE, SWP_NOZORDER, WINDOW_EX_STYLE,
                WM_CLOSE, WM_DESTROY, WM_DPICHANGED, WM_QUIT, WM_SIZE, WNDCLASSEXW,
                WS_OVERLAPPEDWINDOW, WS_VISIBLE,
            },
        },
    },
};

use crate::error::{Error, Result};
use crate::hresult::{describe_hresult, HResult};
use crate::platform::{
    DisplayDpi, DisplayId, WindowDesc, WindowEvent, WindowEventKind, WindowId, WindowSystem,
};

use super::dpi;

pub(crate) const CATEGORY: &str = "Win32";

/// Atom name used to register (and later find) the window class.
const CLASS_NAME: PCWSTR = w!("BlockforgeWindow");

// ── Event queue ───────────────────────────────────────────────────────────────

thread_local! {
    /// Events produced by `wnd_proc` on this thread, drained by `poll_event`.
    /// Window procedures run on the thread that created the window, so a
    /// thread-local queue sees every message for windows created here.
    static PENDING: RefCell<VecDeque<WindowEvent>> = const { RefCell::new(VecDeque::new()) };
}

fn push_event(hwnd: HWND, kind: WindowEventKind) {
    let event = WindowEvent::Window {
        window: window_id(hwnd),
        kind,
    };
    PENDING.with(|q| q.borrow_mut().push_back(event));
}

fn pop_event() -> Option<WindowEvent> {
    PENDING.with(|q| q.borrow_mut().pop_front())
}

fn window_id(hwnd: HWND) -> WindowId {
    WindowId(hwnd.0 as usize)
}

fn hwnd(window: WindowId) -> HWND {
    HWND(window.0 as _)
}

// ── Win32WindowSystem ─────────────────────────────────────────────────────────

/// Windowing system backed by Win32 top-level windows.
pub(crate) struct Win32WindowSystem {
    hinstance: HINSTANCE,
}

impl Win32WindowSystem {
    /// Opt into Per-Monitor v2 DPI awareness and register the window class.
    /// MUST be called before any window is created on the calling thread.
    pub(crate) fn new() -> Result<Self> {
        dpi::init();

        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which
        // is valid for the process lifetime.
        let hmodule = unsafe { GetModuleHandleW(None) }
            .map_err(|e| api_error("Init", "GetModuleHandleW", &e))?;
        let hinstance = HINSTANCE(hmodule.0);

        register_class(hinstance)?;
        Ok(Self { hinstance })
    }
}

impl WindowSystem for Win32WindowSystem {
    fn driver_name(&self) -> &str {
        "win32"
    }

    fn create_window(&mut self, desc: &WindowDesc) -> Result<WindowId> {
        let context = format!("CreateWindowExW({})", desc.title);
        let system_dpi = dpi::get_system_dpi();
        let style = WS_OVERLAPPEDWINDOW | WS_VISIBLE;

        // Grow the requested client rect to an outer window rect at the DPI
        // the window will be created on.
        let mut outer = RECT {
            left: 0,
            top: 0,
            right: dpi::scale(desc.width, system_dpi),
            bottom: dpi::scale(desc.height, system_dpi),
        };
        // SAFETY: `outer` is a valid writable RECT for the duration of the call.
        unsafe {
            AdjustWindowRectExForDpi(
                &mut outer,
                style,
                BOOL::from(false),
                WINDOW_EX_STYLE(0),
                system_dpi,
            )
        }
        .map_err(|e| api_error("CreateWindow", &context, &e))?;

        let title: Vec<u16> = desc.title.encode_utf16().chain(std::iter::once(0)).collect();

        // SAFETY: CLASS_NAME was registered in `new`; `title` is a valid
        // null-terminated UTF-16 string that outlives the call.  A null parent
        // creates a top-level window; no menu and no creation data.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                CLASS_NAME,
                PCWSTR(title.as_ptr()),
                style,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                outer.right - outer.left,
                outer.bottom - outer.top,
                HWND::default(),
                HMENU::default(),
                self.hinstance,
                None,
            )
        }
        .map_err(|e| api_error("CreateWindow", &context, &e))?;

        Ok(window_id(hwnd))
    }

    fn destroy_window(&mut self, window: WindowId) {
        if !self.is_window(window) {
            return;
        }
        // SAFETY: the handle refers to a live window created on this thread.
        // Failure leaves nothing for us to clean up.
        unsafe {
            let _ = DestroyWindow(hwnd(window));
        }
    }

    fn is_window(&self, window: WindowId) -> bool {
        if window.0 == 0 {
            return false;
        }
        // SAFETY: IsWindow accepts any handle value and only reports validity.
        unsafe { IsWindow(hwnd(window)) }.as_bool()
    }

    fn logical_size(&self, window: WindowId) -> (i32, i32) {
        let (w, h) = self.drawable_size(window);
        let dpi = dpi::get_for_window(hwnd(window));
        (dpi::unscale(w, dpi), dpi::unscale(h, dpi))
    }

    fn drawable_size(&self, window: WindowId) -> (i32, i32) {
        let mut rect = RECT::default();
        // SAFETY: `rect` is a valid writable RECT; an invalid handle makes
        // the call fail, which we map to a zero size.
        match unsafe { GetClientRect(hwnd(window), &mut rect) } {
            Ok(()) => (rect.right - rect.left, rect.bottom - rect.top),
            Err(_) => (0, 0),
        }
    }

    fn display_for_window(&self, window: WindowId) -> Option<DisplayId> {
        dpi::monitor_for_window(hwnd(window)).map(|m| DisplayId(m.0 as usize))
    }

    fn display_dpi(&self, display: DisplayId) -> Option<DisplayDpi> {
        let (x, y) = dpi::get_for_monitor(HMONITOR(display.0 as _))?;
        Some(DisplayDpi::from_axes(x as f32, y as f32))
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        loop {
            if let Some(event) = pop_event() {
                return Some(event);
            }

            let mut msg = MSG::default();
            // SAFETY: &mut msg is a valid MSG pointer; HWND::default()
            // retrieves messages for all windows on this thread; 0,0 filter
            // accepts all.  PM_REMOVE never blocks.
            let has_message = unsafe { PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE) };
            if !has_message.as_bool() {
                return None;
            }
            if msg.message == WM_QUIT {
                return Some(WindowEvent::Quit);
            }

            // SAFETY: msg was populated by a successful PeekMessageW call.
            // TranslateMessage's return value and DispatchMessageW's LRESULT
            // are intentionally unused.
            unsafe {
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            }
        }
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: LoadCursorW with IDC_ARROW loads a built-in resource that exists
    // on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }
        .map_err(|e| api_error("Init", "LoadCursorW(IDC_ARROW)", &e))?;

    // SAFETY: GetStockObject with BLACK_BRUSH always returns a valid HGDIOBJ.
    // Casting to HBRUSH is correct: stock brush objects are compatible types.
    let bg_brush = unsafe { HBRUSH(GetStockObject(BLACK_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: HICON::default(),
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: HICON::default(),
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        // SAFETY: GetLastError reads thread-local state set by RegisterClassExW.
        let code = unsafe { GetLastError() };
        if code != ERROR_CLASS_ALREADY_EXISTS {
            return Err(last_error("Init", "RegisterClassExW(BlockforgeWindow)", code.0));
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler
// other than as an opaque `WindowId`.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // ── Lifecycle ─────────────────────────────────────────────────────────
        WM_CLOSE => {
            // SAFETY: hwnd is the window being closed; DestroyWindow triggers
            // WM_DESTROY, which posts WM_QUIT via PostQuitMessage.
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            // SAFETY: PostQuitMessage is always safe to call from WM_DESTROY.
            PostQuitMessage(0);
            LRESULT(0)
        }

        // ── Layout ────────────────────────────────────────────────────────────
        WM_SIZE => {
            // lparam low word = new client width, high word = new client
            // height, both in device pixels.
            let px_width = (lparam.0 & 0xFFFF) as i32;
            let px_height = ((lparam.0 >> 16) & 0xFFFF) as i32;
            let window_dpi = dpi::get_for_window(hwnd);
            push_event(
                hwnd,
                WindowEventKind::Resized {
                    width: dpi::unscale(px_width, window_dpi),
                    height: dpi::unscale(px_height, window_dpi),
                },
            );
            push_event(hwnd, WindowEventKind::DrawableSizeChanged);
            LRESULT(0)
        }

        WM_DPICHANGED => {
            // lparam points to the window rect Windows suggests for the new DPI.
            // SAFETY: for WM_DPICHANGED, lparam is documented to be a valid
            // *const RECT for the duration of the message.
            let suggested = *(lparam.0 as *const RECT);
            // SAFETY: hwnd is valid for this call.  SetWindowPos may re-enter
            // wnd_proc with WM_SIZE; the event queue is not borrowed here.
            let _ = SetWindowPos(
                hwnd,
                HWND::default(),
                suggested.left,
                suggested.top,
                suggested.right - suggested.left,
                suggested.bottom - suggested.top,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
            push_event(hwnd, WindowEventKind::DpiChanged);
            LRESULT(0)
        }

        // Default processing for all unhandled messages.
        // SAFETY: hwnd and message parameters are valid — provided by Windows.
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Wrap a failed windows-crate call in a canonical `Error`.
fn api_error(code: &str, context: &str, e: &windows::core::Error) -> Error {
    Error::new(CATEGORY, code, describe_hresult(e.code().into()), context)
}

/// Wrap a `GetLastError()` value in a canonical `Error`.
///
/// Capture `win32_code` immediately after the failing call — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(code: &str, context: &str, win32_code: u32) -> Error {
    Error::new(
        CATEGORY,
        code,
        describe_hresult(HResult::from_win32(win32_code)),
        context,
    )
}
