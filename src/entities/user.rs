//! User entity - Represents a registered account.
//!
//! Each user owns zero or more budgets. The email is unique and the password
//! is stored as an Argon2 PHC string, never as plaintext.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier, assigned on insert
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
    /// Contact phone number (free text)
    pub phone: String,
    /// Preferred language code (e.g. `"en"`)
    pub language: String,
    /// Login email, stored trimmed and lower-cased
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
