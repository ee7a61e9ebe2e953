//! Training data handles
//!
//! `fann.train` userdata wraps one `struct fann_train_data *`.

use std::sync::Arc;

use mlua::{Lua, MultiValue, UserData, UserDataMethods, UserDataRef, Value};
use tracing::{debug, warn};

use crate::dispatch;
use crate::error::{BindingError, BindingResult};
use crate::ffi::{FannApi, FannTrainData};
use crate::handle::{NativeHandle, NativeResource};
use crate::marshal::{Args, LuaClass, Scope};
use crate::network::check_saved;

const LABEL: &str = "[[FANN training data]]";

/// A FANN training set owned by Lua
#[derive(Debug)]
pub struct TrainingSet {
    handle: NativeHandle<FannTrainData>,
}

impl TrainingSet {
    pub fn new(handle: NativeHandle<FannTrainData>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &NativeHandle<FannTrainData> {
        &self.handle
    }
}

impl LuaClass for TrainingSet {
    const CLASS: &'static str = FannTrainData::CLASS;
}

impl UserData for TrainingSet {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        dispatch::install(methods, Scope::TrainingSet, dispatch::TRAINING_SET_OPERATIONS);
    }
}

/// `fann.read_train_from_file(path)`
pub fn read_train_from_file(
    lua: &Lua,
    api: &Arc<FannApi>,
    args: &Args,
) -> BindingResult<MultiValue> {
    let path = args.path(1)?;
    debug!(path = %path.to_string_lossy(), "reading training data");
    let data = unsafe { (api.read_train_from_file)(path.as_ptr()) };
    let handle = NativeHandle::new(Arc::clone(api), data).ok_or_else(|| {
        let message = format!("unable to read training data from {}", path.to_string_lossy());
        warn!("{}", message);
        BindingError::Native(message)
    })?;
    let ud = lua.create_userdata(TrainingSet::new(handle))?;
    Ok(MultiValue::from_iter([Value::UserData(ud)]))
}

fn receiver(args: &Args) -> BindingResult<(UserDataRef<TrainingSet>, *mut FannTrainData)> {
    let train = args.handle::<TrainingSet>(1)?;
    let data = train.handle.get()?;
    Ok((train, data))
}

pub fn tostring(lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    args.handle::<TrainingSet>(1)?;
    Ok(MultiValue::from_iter([Value::String(lua.create_string(LABEL)?)]))
}

pub fn close(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let train = args.handle::<TrainingSet>(1)?;
    train.handle.release();
    Ok(MultiValue::new())
}

pub fn save(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    let (train, data) = receiver(args)?;
    let path = args.path(2)?;
    let status = unsafe { (train.handle.api().save_train)(data, path.as_ptr()) };
    check_saved(status, &path, "training data")?;
    Ok(MultiValue::new())
}

type ScaleFn = unsafe extern "C" fn(*mut FannTrainData, f32, f32);

fn rescale(args: &Args, select: fn(&FannApi) -> ScaleFn) -> BindingResult<MultiValue> {
    let (train, data) = receiver(args)?;
    let min = args.fann_number(2)?;
    let max = args.fann_number(3)?;
    debug!(min, max, function = %args.function(), "scaling training data");
    unsafe { select(train.handle.api())(data, min, max) };
    Ok(MultiValue::new())
}

pub fn scale_input(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    rescale(args, |api| api.scale_input_train_data)
}

pub fn scale_output(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    rescale(args, |api| api.scale_output_train_data)
}

pub fn scale(_lua: &Lua, args: &Args) -> BindingResult<MultiValue> {
    rescale(args, |api| api.scale_train_data)
}
