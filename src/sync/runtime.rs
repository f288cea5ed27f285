use std::future::Future;
use std::time::Duration;
use wasm_bindgen::JsCast;

/// Timers and task spawning the sync engine runs on.
///
/// Everything is single-threaded: callbacks and tasks run on the UI thread.
pub trait Runtime: Clone + 'static {
    type TimerHandle: Copy + Eq + std::fmt::Debug + 'static;

    /// Arms a one-shot timer. `None` when no timer could be armed.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>)
        -> Option<Self::TimerHandle>;

    fn clear_timeout(&self, handle: Self::TimerHandle);

    fn spawn_local<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static;
}

/// `window.setTimeout` + the Leptos local executor.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    type TimerHandle = i32;

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Option<i32> {
        let win = web_sys::window()?;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || callback());
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)
            .ok()
    }

    fn clear_timeout(&self, handle: i32) {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(handle);
        }
    }

    fn spawn_local<F>(&self, fut: F)
    where
        F: Future<Output = ()> + 'static,
    {
        leptos::task::spawn_local(fut);
    }
}
