//! The `fann` module table
//!
//! Building the table is cheap and has no global side effects, so opening
//! the module again simply yields a fresh table bound to the same library.

use std::sync::Arc;

use mlua::{Lua, MultiValue, Table};

use crate::constants;
use crate::dispatch::{self, FACTORIES};
use crate::ffi::FannApi;

/// Name under which the module is registered
pub const MODULE_NAME: &str = "fann";

/// Build the module table: factories plus enum constants.
pub fn build(lua: &Lua, api: Arc<FannApi>) -> mlua::Result<Table> {
    let module = lua.create_table()?;

    for factory in FACTORIES {
        let api = Arc::clone(&api);
        let function = lua.create_function(move |lua, values: MultiValue| {
            Ok(dispatch::call_factory(factory, &api, lua, values)?)
        })?;
        module.set(factory.name, function)?;
    }

    constants::export(&module)?;
    module.set("_LIBRARY", api.origin())?;

    tracing::debug!(origin = api.origin(), "built fann module table");
    Ok(module)
}

/// Build the table and publish it as the global `fann` and as
/// `package.loaded.fann`, replacing any earlier registration.
pub fn register(lua: &Lua, api: Arc<FannApi>) -> mlua::Result<Table> {
    let module = build(lua, api)?;

    lua.globals().set(MODULE_NAME, module.clone())?;
    if let Ok(package) = lua.globals().get::<Table>("package") {
        let loaded: Table = package.get("loaded")?;
        loaded.set(MODULE_NAME, module.clone())?;
    }

    Ok(module)
}
