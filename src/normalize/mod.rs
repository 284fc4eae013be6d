//! Server response normalization.
//!
//! `adapt_in_*` turn an arbitrarily wrapped server row into a typed record;
//! `adapt_out_*` build the flat payloads the insert/update endpoints expect.

pub mod chat;
pub mod diary;
pub mod ledger;
pub mod patch;
pub mod probe;
pub mod reservation;
pub mod shop;
pub mod task;

pub use chat::{
    adapt_in_chat_message, adapt_in_chat_messages, adapt_in_chat_room, adapt_in_chat_rooms,
    adapt_out_chat_message,
};
pub use diary::{adapt_in_diary, adapt_out_diary};
pub use ledger::{adapt_in_ledger_row, adapt_out_ledger_row, ledger_balance};
pub use patch::{Patch, Payload};
pub use probe::{list_items, parse_lenient, unwrap_list, unwrap_record, Record};
pub use reservation::{adapt_in_reservation, adapt_out_reservation};
pub use shop::{adapt_in_product_detail, adapt_in_product_summary};
pub use task::{adapt_in_task, adapt_out_task};
