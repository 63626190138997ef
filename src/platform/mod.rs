//! Platform glue
//!
//! The browser drives the engine from animation frames and DOM events. Native
//! builds have no window and run the game headless (see `main.rs`).

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Seed for the game RNG taken from the wall clock
pub fn clock_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}
