//! Operation tables
//!
//! Each Lua-visible operation is one [`Operation`] row: its name, its minimum
//! arity (receiver included) and a handler. The arity check happens here, so
//! a handler only ever sees at least `min_args` arguments.

use std::sync::Arc;

use mlua::{Lua, MultiValue, UserDataMethods};

use crate::error::BindingResult;
use crate::ffi::FannApi;
use crate::marshal::{Args, Scope};
use crate::network;
use crate::train_data;

/// Handler for a method on a handle
pub type MethodHandler = fn(&Lua, &Args) -> BindingResult<MultiValue>;

/// Handler for a module-level factory
pub type FactoryHandler = fn(&Lua, &Arc<FannApi>, &Args) -> BindingResult<MultiValue>;

/// A method or metamethod of a handle class
pub struct Operation {
    pub name: &'static str,
    pub min_args: usize,
    pub handler: MethodHandler,
}

/// A function in the `fann` table
pub struct Factory {
    pub name: &'static str,
    pub min_args: usize,
    pub handler: FactoryHandler,
}

const fn op(name: &'static str, min_args: usize, handler: MethodHandler) -> Operation {
    Operation {
        name,
        min_args,
        handler,
    }
}

pub static FACTORIES: &[Factory] = &[
    Factory {
        name: "create_standard",
        min_args: 1,
        handler: network::create_standard,
    },
    Factory {
        name: "create_sparse",
        min_args: 2,
        handler: network::create_sparse,
    },
    Factory {
        name: "create_from_file",
        min_args: 1,
        handler: network::create_from_file,
    },
    Factory {
        name: "read_train_from_file",
        min_args: 1,
        handler: train_data::read_train_from_file,
    },
];

pub static NETWORK_OPERATIONS: &[Operation] = &[
    op("__tostring", 1, network::tostring),
    #[cfg(feature = "lua54")]
    op("__close", 1, network::close),
    op("close", 1, network::close),
    op("print_connections", 1, network::print_connections),
    op("print_parameters", 1, network::print_parameters),
    op("set_training_algorithm", 2, network::set_training_algorithm),
    op("get_training_algorithm", 1, network::get_training_algorithm),
    op("set_learning_rate", 2, network::set_learning_rate),
    op("get_learning_rate", 1, network::get_learning_rate),
    op(
        "set_activation_function_hidden",
        2,
        network::set_activation_function_hidden,
    ),
    op(
        "set_activation_function_output",
        2,
        network::set_activation_function_output,
    ),
    op(
        "set_activation_steepness_hidden",
        2,
        network::set_activation_steepness_hidden,
    ),
    op(
        "set_activation_steepness_output",
        2,
        network::set_activation_steepness_output,
    ),
    op("set_train_stop_function", 2, network::set_train_stop_function),
    op("get_train_stop_function", 1, network::get_train_stop_function),
    op("set_bit_fail_limit", 2, network::set_bit_fail_limit),
    op("get_bit_fail_limit", 1, network::get_bit_fail_limit),
    op("get_num_input", 1, network::get_num_input),
    op("get_num_output", 1, network::get_num_output),
    op("get_total_neurons", 1, network::get_total_neurons),
    op("init_weights", 2, network::init_weights),
    op("test_data", 2, network::test_data),
    op("train_on_file", 5, network::train_on_file),
    op("train_on_data", 5, network::train_on_data),
    op("save", 2, network::save),
    op("run", 1, network::run),
];

pub static TRAINING_SET_OPERATIONS: &[Operation] = &[
    op("__tostring", 1, train_data::tostring),
    #[cfg(feature = "lua54")]
    op("__close", 1, train_data::close),
    op("close", 1, train_data::close),
    op("save", 2, train_data::save),
    op("scale_input", 3, train_data::scale_input),
    op("scale_output", 3, train_data::scale_output),
    op("scale", 3, train_data::scale),
];

fn is_metamethod(name: &str) -> bool {
    name.starts_with("__")
}

/// Run `operation` on the raw Lua arguments.
pub fn call(
    operation: &Operation,
    scope: Scope,
    lua: &Lua,
    values: MultiValue,
) -> BindingResult<MultiValue> {
    let args = Args::new(scope, operation.name, values);
    args.require(operation.min_args)?;
    (operation.handler)(lua, &args)
}

/// Run `factory` on the raw Lua arguments.
pub fn call_factory(
    factory: &Factory,
    api: &Arc<FannApi>,
    lua: &Lua,
    values: MultiValue,
) -> BindingResult<MultiValue> {
    let args = Args::new(Scope::Module, factory.name, values);
    args.require(factory.min_args)?;
    (factory.handler)(lua, api, &args)
}

/// Register every row of `table` on a userdata class.
pub fn install<T, M: UserDataMethods<T>>(methods: &mut M, scope: Scope, table: &'static [Operation]) {
    for operation in table {
        let function = move |lua: &Lua, values: MultiValue| -> mlua::Result<MultiValue> {
            Ok(call(operation, scope, lua, values)?)
        };
        if is_metamethod(operation.name) {
            methods.add_meta_function(operation.name, function);
        } else {
            methods.add_function(operation.name, function);
        }
    }
}
