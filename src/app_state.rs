use once_cell::sync::OnceCell;

use crate::config::AppSettings;
use crate::services::event_bus::EventBus;

/// Process-wide singletons for state that `loco_rs::app::AppContext` has
/// no slot for: the in-memory Event Bus (section 4.G) and the parsed
/// `app_settings` block (section 6). Both are set exactly once during
/// `App::boot` and read thereafter from controllers and the socket
/// handler via `State<AppContext>` plus these accessors.
static EVENT_BUS: OnceCell<EventBus> = OnceCell::new();
static APP_SETTINGS: OnceCell<AppSettings> = OnceCell::new();

pub fn init(settings: AppSettings) {
    let _ = APP_SETTINGS.set(settings);
    let _ = EVENT_BUS.set(EventBus::new());
}

pub fn event_bus() -> &'static EventBus {
    EVENT_BUS.get().expect("event bus accessed before App::boot initialized it")
}

pub fn app_settings() -> &'static AppSettings {
    APP_SETTINGS.get().expect("app settings accessed before App::boot initialized them")
}
