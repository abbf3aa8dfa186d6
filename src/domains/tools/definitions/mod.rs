//! Tool definitions module.
//!
//! One file per administration area. Each exposes a `catalog()` returning
//! its tools in registration order; the registry composes them.

pub mod advanced;
pub mod devices;
pub mod dns;
pub mod keys;
pub mod users;

use serde::Deserialize;

use super::schema::ParamSpec;

/// Values accepted by the `fields` selector.
pub const FIELD_SETS: &[&str] = &["all", "default"];

/// Parameters of tools that take no arguments.
#[derive(Debug, Default, Deserialize)]
pub struct NoParams {}

/// The optional `fields` selector shared by the device listing tools.
pub(crate) fn fields_param() -> ParamSpec {
    ParamSpec::string("fields", "Fields to return. Can be 'all' or 'default'")
        .one_of(FIELD_SETS)
        .with_default("default")
}
