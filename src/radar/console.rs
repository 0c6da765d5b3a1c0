//! Browser console logging
//!
//! Messages go to `console.log` / `console.error` on wasm32 targets and are
//! dropped on native builds, where no console is attached.

macro_rules! console_log {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format_args!($($arg)*);
    }};
}

macro_rules! console_error {
    ($($arg:tt)*) => {{
        #[cfg(target_arch = "wasm32")]
        web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(&format!($($arg)*)));
        #[cfg(not(target_arch = "wasm32"))]
        let _ = format_args!($($arg)*);
    }};
}

pub(crate) use console_error;
pub(crate) use console_log;
