//! Win32 [`Host`]: window class, message pump and GDI blit.
//!
//! Each window's [`WindowState`] is bound through `GWLP_USERDATA`: an
//! `Rc` is leaked into the slot right after `CreateWindowExW` and
//! reclaimed on `WM_NCDESTROY`. Messages arriving before the binding
//! (creation-time traffic on a hidden window) go straight to
//! `DefWindowProcW`.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::rc::Rc;

use tracing::{debug, warn};
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;
use windows::core::PCWSTR;

use crate::error::{Result, TinyError};
use crate::host::{
    BitmapInfo, Compression, Host, MessageAction, Rect, WindowClass, WindowMessage, WindowState, WindowStyle,
};

/// The Win32 windowing host.
pub struct Win32Host {
    instance: HINSTANCE,
}

impl Win32Host {
    /// Bind to the current module.
    pub fn new() -> Result<Self> {
        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|e| TinyError::platform("GetModuleHandleW", e))?;
        Ok(Self {
            instance: module.into(),
        })
    }
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Error for calls that only report failure through `GetLastError`.
fn last_error(call: &'static str) -> TinyError {
    TinyError::platform(call, windows::core::Error::from_win32())
}

fn window_style(style: WindowStyle) -> WINDOW_STYLE {
    [
        (style.caption, WS_CAPTION),
        (style.system_menu, WS_SYSMENU),
        (style.minimize_box, WS_MINIMIZEBOX),
    ]
    .into_iter()
    .filter(|(on, _)| *on)
    .fold(WINDOW_STYLE(0), |acc, (_, ws)| acc | ws)
}

fn compression(info: &BitmapInfo) -> u32 {
    match info.compression {
        Compression::Uncompressed => BI_RGB.0,
    }
}

/// Signed DIB extent, as `BITMAPINFOHEADER` and `StretchDIBits` expect.
fn dib_extent(info: &BitmapInfo) -> Result<(i32, i32)> {
    match (i32::try_from(info.width), i32::try_from(info.height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(TinyError::platform(
            "StretchDIBits",
            format!("bitmap too large: {}x{}", info.width, info.height),
        )),
    }
}

fn to_rect(rc: Rect) -> RECT {
    RECT {
        left: rc.left,
        top: rc.top,
        right: rc.right,
        bottom: rc.bottom,
    }
}

fn translate(msg: u32) -> WindowMessage {
    match msg {
        WM_CLOSE => WindowMessage::Close,
        WM_DESTROY => WindowMessage::Destroy,
        other => WindowMessage::Other(other),
    }
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let ptr = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const WindowState;

    if ptr.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    if msg == WM_NCDESTROY {
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            drop(Rc::from_raw(ptr));
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
    }

    // The owning Surface holds its own Rc for as long as the window
    // exists, so the pointer stays valid across the nested WM_NCDESTROY.
    let state = unsafe { &*ptr };

    match state.on_message(translate(msg)) {
        MessageAction::DestroyWindow => {
            if let Err(e) = unsafe { DestroyWindow(hwnd) } {
                warn!("DestroyWindow failed: {e}");
            }
            LRESULT(0)
        }
        MessageAction::Handled => {
            if msg == WM_DESTROY {
                unsafe { PostQuitMessage(0) };
            }
            LRESULT(0)
        }
        MessageAction::Default => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

impl Host for Win32Host {
    type Window = HWND;
    type Context = HDC;

    fn register_class(&self, class: &WindowClass) -> Result<()> {
        let class_name = wide(class.name);

        let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }
            .map_err(|e| TinyError::platform("LoadIconW", e))?;
        let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }
            .map_err(|e| TinyError::platform("LoadCursorW", e))?;
        let brush = unsafe { GetStockObject(BLACK_BRUSH) };
        if brush.is_invalid() {
            return Err(last_error("GetStockObject"));
        }

        let mut style = WNDCLASS_STYLES(0);
        if class.redraw_on_resize {
            style = style | CS_HREDRAW | CS_VREDRAW;
        }
        if class.own_context {
            style = style | CS_OWNDC;
        }

        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style,
            lpfnWndProc: Some(wndproc),
            hInstance: self.instance,
            hIcon: icon,
            hCursor: cursor,
            hbrBackground: HBRUSH(brush.0),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };

        let atom = unsafe { RegisterClassExW(&wc) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }
        Ok(())
    }

    fn screen_size(&self) -> (i32, i32) {
        unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
    }

    fn adjust_window_rect(&self, client: Rect, style: WindowStyle) -> Result<Rect> {
        let mut rc = to_rect(client);
        unsafe { AdjustWindowRect(&mut rc, window_style(style), FALSE) }
            .map_err(|e| TinyError::platform("AdjustWindowRect", e))?;
        Ok(Rect::new(rc.left, rc.top, rc.right, rc.bottom))
    }

    fn create_window(
        &self,
        class: &WindowClass,
        title: &str,
        frame: Rect,
        style: WindowStyle,
        state: Rc<WindowState>,
    ) -> Result<HWND> {
        let class_name = wide(class.name);
        let title_wide = wide(title);

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title_wide.as_ptr()),
                window_style(style),
                frame.left,
                frame.top,
                frame.width(),
                frame.height(),
                None,
                None,
                self.instance,
                None,
            )
        }
        .map_err(|e| TinyError::platform("CreateWindowExW", e))?;

        if hwnd.is_invalid() {
            return Err(last_error("CreateWindowExW"));
        }

        let ptr = Rc::into_raw(state);
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, ptr as isize);
        }
        debug!(?hwnd, "window created");
        Ok(hwnd)
    }

    fn show_window(&self, window: HWND, visible: bool) {
        let cmd = if visible { SW_SHOW } else { SW_HIDE };
        unsafe {
            let _ = ShowWindow(window, cmd);
        }
    }

    fn drain_messages(&self) {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                // Posted by WM_DESTROY; liveness is already tracked per window.
                if msg.message == WM_QUIT {
                    continue;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn destroy_window(&self, window: HWND) -> Result<()> {
        unsafe { DestroyWindow(window) }.map_err(|e| TinyError::platform("DestroyWindow", e))
    }

    fn acquire_context(&self, window: HWND) -> Result<HDC> {
        let hdc = unsafe { GetDC(window) };
        if hdc.is_invalid() {
            return Err(last_error("GetDC"));
        }
        Ok(hdc)
    }

    fn release_context(&self, window: HWND, context: HDC) {
        if unsafe { ReleaseDC(window, context) } == 0 {
            debug!(?window, "ReleaseDC reported the context was not released");
        }
    }

    fn stretch_blit(
        &self,
        context: HDC,
        dest: Rect,
        info: &BitmapInfo,
        pixels: &[u8],
    ) -> Result<()> {
        if pixels.len() < info.byte_len() {
            return Err(TinyError::platform(
                "StretchDIBits",
                format!("pixel buffer too small: {} < {}", pixels.len(), info.byte_len()),
            ));
        }

        let (width, height) = dib_extent(info)?;
        let bmi = BITMAPINFO {
            bmiHeader: BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height = top-down DIB (origin at top-left).
                biHeight: if info.top_down { -height } else { height },
                biPlanes: 1,
                biBitCount: info.bit_count,
                biCompression: compression(info),
                biSizeImage: 0,
                biXPelsPerMeter: 0,
                biYPelsPerMeter: 0,
                biClrUsed: 0,
                biClrImportant: 0,
            },
            bmiColors: [RGBQUAD::default(); 1],
        };

        let lines = unsafe {
            StretchDIBits(
                context,
                dest.left,
                dest.top,
                dest.width(),
                dest.height(),
                0,
                0,
                width,
                height,
                Some(pixels.as_ptr() as *const c_void),
                &bmi,
                DIB_RGB_COLORS,
                SRCCOPY,
            )
        };
        if lines == 0 {
            return Err(last_error("StretchDIBits"));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_style_has_no_resize_border() {
        let ws = window_style(WindowStyle::FIXED);
        assert_eq!(ws, WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX);
        assert_eq!(ws.0 & WS_THICKFRAME.0, 0);
    }

    #[test]
    fn messages_translate() {
        assert_eq!(translate(WM_CLOSE), WindowMessage::Close);
        assert_eq!(translate(WM_DESTROY), WindowMessage::Destroy);
        assert_eq!(translate(WM_PAINT), WindowMessage::Other(WM_PAINT));
    }

    #[test]
    fn bgra32_maps_to_bi_rgb() {
        let info = BitmapInfo::bgra32(320, 200);
        assert_eq!(compression(&info), BI_RGB.0);
        assert_eq!(dib_extent(&info).unwrap(), (320, 200));
    }

    #[test]
    fn oversized_bitmap_is_rejected() {
        let info = BitmapInfo::bgra32(3_000_000_000, 1);
        assert!(dib_extent(&info).unwrap_err().is_platform());
    }

    #[test]
    fn wide_strings_are_nul_terminated() {
        assert_eq!(wide("ab"), vec![b'a' as u16, b'b' as u16, 0]);
    }
}
