use serde_json::Value;

use crate::models::{LedgerRow, LedgerUpdate};
use crate::normalize::patch::Payload;
use crate::normalize::probe::unwrap_record;

const LEDGER_ID: &[&str] = &["ledgerId", "LEDGER_ID", "id", "ID"];
const OWNER_ID: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID"];
const IO_TYPE: &[&str] = &["ioType", "IO_TYPE", "ioTypeCd", "IO_TYPE_CD"];
const AMOUNT: &[&str] = &["amount", "AMOUNT", "amt", "AMT"];
const CATEGORY: &[&str] = &["categoryNm", "CATEGORY_NM", "category", "CATEGORY"];
const MEMO: &[&str] = &["memo", "MEMO"];
const USE_DT: &[&str] = &["useDt", "USE_DT", "ledgerDt", "LEDGER_DT"];
const CREATED_DT: &[&str] = &["createdDt", "CREATED_DT", "regDt", "REG_DT"];

pub fn adapt_in_ledger_row(raw: &Value) -> LedgerRow {
    let r = unwrap_record(raw);
    LedgerRow {
        ledger_id: r.int(LEDGER_ID),
        owner_id: r.int(OWNER_ID),
        io_type: r.code(IO_TYPE).unwrap_or_default(),
        amount: r.number(AMOUNT),
        category_nm: r.string(CATEGORY),
        memo: r.string(MEMO),
        use_dt: r.string(USE_DT),
        created_dt: r.string(CREATED_DT),
    }
}

pub fn adapt_out_ledger_row(update: &LedgerUpdate) -> Payload {
    Payload::new()
        .field("ledgerId", &update.ledger_id)
        .field("ioType", &update.io_type)
        .field("amount", &update.amount)
        .field("categoryNm", &update.category_nm)
        .field("memo", &update.memo)
        .field("useDt", &update.use_dt)
}

/// Net of all rows: income minus spending.
pub fn ledger_balance(rows: &[LedgerRow]) -> f64 {
    rows.iter().map(LedgerRow::signed_amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IoType;
    use crate::normalize::patch::Patch;
    use serde_json::json;

    #[test]
    fn io_type_is_case_insensitive_and_defaults_to_out() {
        assert_eq!(adapt_in_ledger_row(&json!({ "IO_TYPE": "in" })).io_type, IoType::In);
        assert_eq!(adapt_in_ledger_row(&json!({ "ioType": "transfer" })).io_type, IoType::Out);
        assert_eq!(adapt_in_ledger_row(&json!({})).io_type, IoType::Out);
    }

    #[test]
    fn amount_accepts_numeric_strings() {
        let row = adapt_in_ledger_row(&json!({ "AMT": "15000", "CATEGORY": "food" }));
        assert_eq!(row.amount, Some(15000.0));
        assert_eq!(row.category_nm.as_deref(), Some("food"));
        assert_eq!(adapt_in_ledger_row(&json!({ "amount": "lots" })).amount, None);
    }

    #[test]
    fn balance_nets_income_against_spending() {
        let rows: Vec<LedgerRow> = [
            json!({ "ioType": "IN", "amount": 3000 }),
            json!({ "ioType": "OUT", "amount": 1200 }),
            json!({ "ioType": "OUT" }),
        ]
        .iter()
        .map(adapt_in_ledger_row)
        .collect();
        assert_eq!(ledger_balance(&rows), 1800.0);
    }

    #[test]
    fn update_payload_omits_unset_fields() {
        let update = LedgerUpdate {
            io_type: Patch::Set(IoType::In),
            amount: Patch::Set(250.5),
            ..Default::default()
        };
        assert_eq!(
            adapt_out_ledger_row(&update).into_value(),
            json!({ "ioType": "IN", "amount": 250.5 })
        );
    }
}
