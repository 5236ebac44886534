//! The single-row credential record guarding the app.

use sea_orm::entity::prelude::*;

use crate::{LedgerError, ResultLedger};

/// PIN seeded on first initialization and restored by resets.
pub const DEFAULT_PIN: &str = "1234";

/// Primary key of the one credential row.
pub(crate) const CREDENTIAL_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub pin: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A PIN is exactly four ASCII digits.
pub fn validate_pin(pin: &str) -> ResultLedger<()> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidPin(
            "PIN must be exactly 4 digits".to_string(),
        ));
    }
    Ok(())
}
