//! Argument marshaling
//!
//! Converts the Lua values of one call into the native types FANN expects.
//! Positions are Lua positions: the receiver of a method call is #1.

use std::ffi::CString;
use std::fmt;
use std::os::raw::c_uint;

use mlua::{AnyUserData, MultiValue, UserData, UserDataRef, Value};

use crate::error::{BindingError, BindingResult};
use crate::ffi::{FannEnum, FannType};
use crate::network::Network;
use crate::train_data::TrainingSet;

/// A userdata class exposed to Lua
pub trait LuaClass: UserData + 'static {
    /// Class tag used in type errors
    const CLASS: &'static str;
}

/// Where an operation lives, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `fann.create_standard(...)`
    Module,
    /// `net:run(...)`
    Network,
    /// `train:scale(...)`
    TrainingSet,
}

impl Scope {
    fn prefix(self) -> &'static str {
        match self {
            Scope::Module => "fann.",
            Scope::Network => "net:",
            Scope::TrainingSet => "train:",
        }
    }
}

/// Arguments of one Lua call
pub struct Args {
    scope: Scope,
    name: &'static str,
    values: Vec<Value>,
}

impl Args {
    pub fn new(scope: Scope, name: &'static str, values: MultiValue) -> Self {
        Self {
            scope,
            name,
            values: values.into_iter().collect(),
        }
    }

    /// Qualified operation name, e.g. `net:run`
    pub fn function(&self) -> String {
        format!("{}{}", self.scope.prefix(), self.name)
    }

    /// Number of arguments, receiver included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `position`, if one was passed
    pub fn get(&self, position: usize) -> Option<&Value> {
        position.checked_sub(1).and_then(|i| self.values.get(i))
    }

    /// Fail unless at least `min` arguments were passed
    pub fn require(&self, min: usize) -> BindingResult<()> {
        if self.values.len() < min {
            return Err(BindingError::InsufficientParameters {
                function: self.function(),
                expected: min,
                got: self.values.len(),
            });
        }
        Ok(())
    }

    /// A value of the Lua integer subtype; floats are rejected even when
    /// integral
    pub fn integer(&self, position: usize) -> BindingResult<i64> {
        match self.get(position) {
            Some(Value::Integer(i)) => Ok(*i),
            other => Err(self.type_error(position, "integer", describe(other))),
        }
    }

    /// An integer that fits a C `unsigned int`
    pub fn unsigned(&self, position: usize) -> BindingResult<c_uint> {
        let value = self.integer(position)?;
        c_uint::try_from(value).map_err(|_| {
            self.range_error(
                position,
                format!("{} is outside 0..={}", value, c_uint::MAX),
            )
        })
    }

    /// Any Lua number
    pub fn number(&self, position: usize) -> BindingResult<f64> {
        match self.get(position) {
            Some(Value::Integer(i)) => Ok(*i as f64),
            Some(Value::Number(n)) => Ok(*n),
            other => Err(self.type_error(position, "number", describe(other))),
        }
    }

    /// A Lua number narrowed to `fann_type`
    pub fn fann_number(&self, position: usize) -> BindingResult<FannType> {
        self.number(position).map(|n| n as FannType)
    }

    /// A file path: a Lua string without NUL bytes
    pub fn path(&self, position: usize) -> BindingResult<CString> {
        match self.get(position) {
            Some(Value::String(s)) => CString::new(s.as_bytes().to_vec())
                .map_err(|_| self.range_error(position, "path contains a NUL byte".to_string())),
            other => Err(self.type_error(position, "string", describe(other))),
        }
    }

    /// An enum identifier, validated against the exported constants
    pub fn enum_value<E: FannEnum>(&self, position: usize) -> BindingResult<E> {
        let value = self.integer(position)?;
        E::from_value(value).ok_or(BindingError::InvalidEnum {
            kind: E::KIND,
            value,
        })
    }

    /// A handle of class `T`
    pub fn handle<T: LuaClass>(&self, position: usize) -> BindingResult<UserDataRef<T>> {
        match self.get(position) {
            Some(Value::UserData(ud)) => ud
                .borrow::<T>()
                .map_err(|_| self.type_error(position, T::CLASS, class_of(ud).to_string())),
            other => Err(self.type_error(position, T::CLASS, describe(other))),
        }
    }

    /// `count` per-layer neuron counts starting at `first`
    pub fn layer_sizes(&self, first: usize, count: usize) -> BindingResult<Vec<c_uint>> {
        let mut layers = Vec::new();
        layers
            .try_reserve_exact(count)
            .map_err(|_| BindingError::OutOfMemory)?;

        for index in 0..count {
            let position = first + index;
            let neurons = self.integer(position)?;
            if neurons < 1 {
                return Err(BindingError::LayerSize { index, neurons });
            }
            let neurons = c_uint::try_from(neurons).map_err(|_| {
                self.range_error(
                    position,
                    format!("layer {} has more than {} neurons", index, c_uint::MAX),
                )
            })?;
            layers.push(neurons);
        }

        Ok(layers)
    }

    /// Every argument from `first` on, as `fann_type`
    pub fn numbers_from(&self, first: usize) -> BindingResult<Vec<FannType>> {
        let count = (self.values.len() + 1).saturating_sub(first);
        let mut numbers = Vec::new();
        numbers
            .try_reserve_exact(count)
            .map_err(|_| BindingError::OutOfMemory)?;

        for position in first..first + count {
            numbers.push(self.fann_number(position)?);
        }

        Ok(numbers)
    }

    fn type_error(&self, position: usize, expected: &str, got: String) -> BindingError {
        BindingError::ArgType {
            function: self.function(),
            position,
            expected: expected.to_string(),
            got,
        }
    }

    fn range_error(&self, position: usize, message: String) -> BindingError {
        BindingError::ArgRange {
            function: self.function(),
            position,
            message,
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("function", &self.function())
            .field("len", &self.values.len())
            .finish()
    }
}

/// Lua-style type name, with handle classes spelled out
fn describe(value: Option<&Value>) -> String {
    match value {
        None => "no value".to_string(),
        Some(Value::UserData(ud)) => class_of(ud).to_string(),
        Some(other) => other.type_name().to_string(),
    }
}

fn class_of(ud: &AnyUserData) -> &'static str {
    if ud.is::<Network>() {
        Network::CLASS
    } else if ud.is::<TrainingSet>() {
        TrainingSet::CLASS
    } else {
        "userdata"
    }
}
