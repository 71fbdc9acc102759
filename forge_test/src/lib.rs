use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

/// Initializes the logger for tests. Safe to call from every test; only the
/// first call has an effect.
pub fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        env_logger::builder().is_test(true).init();
        log::trace!("Logger initialized");
    });
}
