/// User interface helpers
///
/// - Keyboard mapping from key events to intents (keys.rs)
/// - Selection overlay canvas and letterbox mapping (overlay.rs)
/// - Window title formatting (title.rs)

pub mod keys;
pub mod overlay;
pub mod title;
