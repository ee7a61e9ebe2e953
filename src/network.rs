//! Neural network handles
//!
//! `fann.net` userdata wraps one `struct fann *`. The factories here build
//! networks from a layer topology or a saved file; the rest are the methods
//! listed in [`NETWORK_OPERATIONS`](crate::dispatch::NETWORK_OPERATIONS).

use std::ffi::CString;
use std::os::raw::c_uint;
use std::sync::Arc;

use mlua::{Lua, MultiValue, UserData, UserDataMethods, UserDataRef, Value};
use tracing::{debug, warn};

use crate::dispatch;
use crate::error::{BindingError, BindingResult};
use crate::ffi::{
    ActivationFunction, Fann, FannApi, FannEnum, StopFunction, TrainingAlgorithm,
};
use crate::handle::{NativeHandle, NativeResource};
use crate::marshal::{Args, LuaClass, Scope};
use crate::train_data::TrainingSet;

/// A FANN network owned by Lua
#[derive(Debug)]
pub struct Network {
    handle: NativeHandle<Fann>,
}

impl Network {
    pub fn new(handle: NativeHandle<Fann>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &NativeHandle<Fann> {
        &self.handle
    }

    pub fn num_input(&self) -> BindingResult<c_uint> {
        let ann = self.handle.get()?;
        Ok(unsafe { (self.handle.api().get_num_input)(ann) })
    }

    pub fn num_output(&self) -> BindingResult<c_uint> {
        let ann = self.handle.get()?;
        Ok(unsafe { (self.handle.api().get_num_output)(ann) })
    }

    pub fn total_neurons(&self) -> BindingResult<c_uint> {
        let ann = self.handle.get()?;
        Ok(unsafe { (self.handle.api().get_total_neurons)(ann) })
    }

    /// Text shown by `tostring(net)`
    pub fn describe(&self) -> String {
        if self.handle.is_released() {
            return "[[FANN neural network: released]]".to_string();
        }
        match (self.num_input(), self.num_output(), self.total_neurons()) {
            (Ok(inputs), Ok(outputs), Ok(neurons)) => format!(
                "[[FANN neural network: {} {} {}]]",
                inputs, outputs, neurons
            ),
            _ => "[[FANN neural network: released]]".to_string(),
        }
    }
}

impl LuaClass for Network {
    const CLASS: &'static str = Fann::CLASS;
}

impl UserData for Network {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        dispatch::install(methods, Scope::Network, dispatch::NETWORK_OPERATIONS);
    }
}

fn none() -> MultiValue {
    MultiValue::new()
}

fn one(value: Value) -> MultiValue {
    MultiValue::from_iter([value])
}

fn push_network(
    lua: &Lua,
    api: &Arc<FannApi>,
    ann: *mut Fann,
    failure: impl FnOnce() -> String,
) -> BindingResult<MultiValue> {
    let handle = NativeHandle::new(Arc::clone(api), ann).ok_or_else(|| {
        let message = failure();
        warn!("{}", message);
        BindingError::Native(message)
    })?;
    let network = Network::new(handle);
    debug!(network = %network.describe(), "created network");
    let ud = lua.create_userdata(network)?;
    Ok(one(Value::UserData(ud)))
}

/// Check that a topology call has one argument per layer after `leading`
/// fixed arguments, and read the layer sizes.
fn topology(args: &Args, layers_position: usize, leading: usize) -> BindingResult<Vec<c_uint>> {
    let layers = args.integer(layers_position)?;
    if layers < 1 {
        return Err(BindingError::LayerCount { layers });
    }

    let got = args.len();
    let expected = i128::from(layers) + leading as i128;
    if got as i128 != expected {
        return Err(BindingError::TopologyArity {
            function: args.function(),
            layers: usize::try_from(layers).unwrap_or(usize::MAX),
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            got,
        });
    }

    // the arity check bounds `layers` by the argument count
    args.layer_sizes(leading + 1, got - leading)
}

/// `fann.create_standard(num_layers, n1, ..., nL)`
pub fn create_standard(lua: &Lua, api: &Arc<FannApi>, args: &Args) -> BindingResult<MultiValue> {
    let layers = topology(args, 1, 1)?;
    debug!(?layers, "creating standard network");
    let ann = unsafe { (api.create_standard_array)(layers.len() as c_uint, layers.as_ptr()) };
    push_network(lua, api, ann, || "unable to create neural network".to_string())
}

/// `fann.create_sparse(connection_rate, num_layers, n1, ..., nL)`
pub fn create_sparse(lua: &Lua, api: &Arc<FannApi>, args: &Args) -> BindingResult<MultiValue> {
    let connection_rate = args.number(1)? as f32;
    let layers = topology(args, 2, 2)?;
    debug!(connection_rate, ?layers, "creating sparse network");
    let ann = unsafe {
        (api.create_sparse_array)(connection_rate, layers.len() as c_uint, layers.as_ptr())
    };
    push_network(lua, api, ann, || "unable to create neural network".to_string())
}

/// `fann.create_from_file(path)`
pub fn create_from_file(lua: &Lua, api: &Arc<FannApi>, args: &Args) -> BindingResult<MultiValue> {
    let path = args.path(1)?;
    debug!(path = %path.to_string_lossy(), "loading network");
    let ann = unsafe { (api.create_from_file)(path.as_ptr()) };
    push_network(lua, api, ann, || {
        format!(
            "unable to create neural network from {}",
            path.to_string_lossy()
        )
    })
}

/// The receiver and its live pointer
fn receiver(args: &Args) -> BindingResult<(UserDataRef<Network>, *mut Fann)> {
    let net = args.handle::<Network>(1)?;
    let ann = net.handle.get()?;
    Ok((net, ann))
}

pub fn tostring(lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let net = args.handle::<Network>(1)?;
    let text = lua.create_string(net.describe())?;
    Ok(one(Value::String(text)))
}

pub fn close(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let net = args.handle::<Network>(1)?;
    net.handle.release();
    Ok(none())
}

pub fn print_connections(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    unsafe { (net.handle.api().print_connections)(ann) };
    Ok(none())
}

pub fn print_parameters(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    unsafe { (net.handle.api().print_parameters)(ann) };
    Ok(none())
}

pub fn set_training_algorithm(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let algorithm = args.enum_value::<TrainingAlgorithm>(2)?;
    unsafe { (net.handle.api().set_training_algorithm)(ann, algorithm.value()) };
    Ok(none())
}

pub fn get_training_algorithm(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let algorithm = unsafe { (net.handle.api().get_training_algorithm)(ann) };
    Ok(one(Value::Integer(i64::from(algorithm))))
}

pub fn set_learning_rate(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let rate = args.number(2)? as f32;
    unsafe { (net.handle.api().set_learning_rate)(ann, rate) };
    Ok(none())
}

pub fn get_learning_rate(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let rate = unsafe { (net.handle.api().get_learning_rate)(ann) };
    Ok(one(Value::Number(f64::from(rate))))
}

pub fn set_activation_function_hidden(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let function = args.enum_value::<ActivationFunction>(2)?;
    unsafe { (net.handle.api().set_activation_function_hidden)(ann, function.value()) };
    Ok(none())
}

pub fn set_activation_function_output(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let function = args.enum_value::<ActivationFunction>(2)?;
    unsafe { (net.handle.api().set_activation_function_output)(ann, function.value()) };
    Ok(none())
}

pub fn set_activation_steepness_hidden(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let steepness = args.fann_number(2)?;
    unsafe { (net.handle.api().set_activation_steepness_hidden)(ann, steepness) };
    Ok(none())
}

pub fn set_activation_steepness_output(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let steepness = args.fann_number(2)?;
    unsafe { (net.handle.api().set_activation_steepness_output)(ann, steepness) };
    Ok(none())
}

pub fn set_train_stop_function(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let stop = args.enum_value::<StopFunction>(2)?;
    unsafe { (net.handle.api().set_train_stop_function)(ann, stop.value()) };
    Ok(none())
}

pub fn get_train_stop_function(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let stop = unsafe { (net.handle.api().get_train_stop_function)(ann) };
    Ok(one(Value::Integer(i64::from(stop))))
}

pub fn set_bit_fail_limit(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let limit = args.fann_number(2)?;
    unsafe { (net.handle.api().set_bit_fail_limit)(ann, limit) };
    Ok(none())
}

pub fn get_bit_fail_limit(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let limit = unsafe { (net.handle.api().get_bit_fail_limit)(ann) };
    Ok(one(Value::Number(f64::from(limit))))
}

pub fn get_num_input(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let net = args.handle::<Network>(1)?;
    Ok(one(Value::Integer(i64::from(net.num_input()?))))
}

pub fn get_num_output(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let net = args.handle::<Network>(1)?;
    Ok(one(Value::Integer(i64::from(net.num_output()?))))
}

pub fn get_total_neurons(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let net = args.handle::<Network>(1)?;
    Ok(one(Value::Integer(i64::from(net.total_neurons()?))))
}

pub fn init_weights(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let train = args.handle::<TrainingSet>(2)?;
    let data = train.handle().get()?;
    unsafe { (net.handle.api().init_weights)(ann, data) };
    Ok(none())
}

pub fn test_data(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let train = args.handle::<TrainingSet>(2)?;
    let data = train.handle().get()?;
    let mse = unsafe { (net.handle.api().test_data)(ann, data) };
    Ok(one(Value::Number(f64::from(mse))))
}

pub fn train_on_file(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let path = args.path(2)?;
    let max_epochs = args.unsigned(3)?;
    let epochs_between_reports = args.unsigned(4)?;
    let desired_error = args.number(5)? as f32;
    debug!(
        path = %path.to_string_lossy(),
        max_epochs,
        epochs_between_reports,
        desired_error,
        "training on file"
    );
    unsafe {
        (net.handle.api().train_on_file)(
            ann,
            path.as_ptr(),
            max_epochs,
            epochs_between_reports,
            desired_error,
        )
    };
    Ok(none())
}

pub fn train_on_data(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let train = args.handle::<TrainingSet>(2)?;
    let data = train.handle().get()?;
    let max_epochs = args.unsigned(3)?;
    let epochs_between_reports = args.unsigned(4)?;
    let desired_error = args.number(5)? as f32;
    debug!(
        max_epochs,
        epochs_between_reports, desired_error, "training on data"
    );
    unsafe {
        (net.handle.api().train_on_data)(
            ann,
            data,
            max_epochs,
            epochs_between_reports,
            desired_error,
        )
    };
    Ok(none())
}

pub fn save(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let path = args.path(2)?;
    let status = unsafe { (net.handle.api().save)(ann, path.as_ptr()) };
    check_saved(status, &path, "neural network")?;
    Ok(none())
}

pub(crate) fn check_saved(status: i32, path: &CString, what: &str) -> BindingResult<()> {
    if status != 0 {
        let message = format!("unable to save {} to {}", what, path.to_string_lossy());
        warn!(status, "{}", message);
        return Err(BindingError::Native(message));
    }
    Ok(())
}

/// `net:run(x1, ..., xN)` returns the N_out outputs in order.
pub fn run(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (net, ann) = receiver(args)?;
    let api = net.handle.api();

    let expected = unsafe { (api.get_num_input)(ann) } as usize;
    let got = args.len().saturating_sub(1);
    if got != expected {
        return Err(BindingError::InputCount { expected, got });
    }

    let mut input = args.numbers_from(2)?;
    let output = unsafe { (api.run)(ann, input.as_mut_ptr()) };
    if output.is_null() {
        return Err(BindingError::Native(
            "neural network evaluation failed".to_string(),
        ));
    }

    let count = unsafe { (api.get_num_output)(ann) } as usize;
    // Safety: FANN's output buffer holds num_output values and stays valid
    // until the next call on this network.
    let outputs = unsafe { std::slice::from_raw_parts(output, count) };
    Ok(outputs
        .iter()
        .map(|&v| Value::Number(f64::from(v)))
        .collect())
}
