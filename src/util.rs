// Logging backend for the `log` facade: the browser console on wasm32,
// stderr (with `RUST_LOG` overrides) everywhere else.

use log::LevelFilter;

/// Install the logger once; later calls are ignored.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(level: LevelFilter) {
    if let Some(level) = level.to_level() {
        let _ = console_log::init_with_level(level);
    }
}

/// Install the logger once; later calls are ignored.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LevelFilter::Debug);
        init_logging(LevelFilter::Warn);
        log::debug!("logger installed");
    }
}
