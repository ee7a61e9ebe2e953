//! Enum identifiers exported into the `fann` table

use mlua::Table;

use crate::ffi::{ActivationFunction, FannEnum, StopFunction, TrainingAlgorithm};

fn entries<E: FannEnum>() -> impl Iterator<Item = (&'static str, i64)> {
    E::ALL.iter().map(|id| (id.name(), i64::from(id.value())))
}

/// Every exported constant as `(name, value)`
pub fn all() -> Vec<(&'static str, i64)> {
    entries::<ActivationFunction>()
        .chain(entries::<TrainingAlgorithm>())
        .chain(entries::<StopFunction>())
        .collect()
}

/// Set every constant on `module`.
pub fn export(module: &Table) -> mlua::Result<()> {
    for (name, value) in all() {
        module.set(name, value)?;
    }
    Ok(())
}
