//! Chat view state: the streaming reducer, event classification and the
//! per-room session that ties them to history bootstrap.

pub mod events;
pub mod reducer;
pub mod session;

pub use events::{apply_ai_event, parse_stream_event, AiStreamEvent, ChatEvent};
pub use reducer::{
    push_human_message, sort_history_asc, to_ui_message, upsert_ai_message, AiPatch, UiMessage,
};
pub use session::ChatSession;
