//! Minimal in-process FANN for unit tests
//!
//! Objects are opaque heap cells; only construction and destruction do
//! anything. Destructions are counted per thread so parallel tests don't see
//! each other.

use std::cell::Cell;
use std::os::raw::{c_char, c_float, c_int, c_uint};
use std::ptr;
use std::sync::Arc;

use crate::ffi::{Fann, FannApi, FannFunctions, FannTrainData, FannType};

thread_local! {
    static DESTROYED_NETWORKS: Cell<usize> = const { Cell::new(0) };
    static DESTROYED_TRAIN: Cell<usize> = const { Cell::new(0) };
}

pub fn destroyed_networks() -> usize {
    DESTROYED_NETWORKS.with(Cell::get)
}

pub fn destroyed_train() -> usize {
    DESTROYED_TRAIN.with(Cell::get)
}

pub fn stub_network() -> *mut Fann {
    Box::into_raw(Box::new(0u64)) as *mut Fann
}

pub fn stub_train() -> *mut FannTrainData {
    Box::into_raw(Box::new(0u64)) as *mut FannTrainData
}

extern "C" fn create_standard_array(_n: c_uint, _layers: *const c_uint) -> *mut Fann {
    stub_network()
}

extern "C" fn create_sparse_array(_r: c_float, _n: c_uint, _layers: *const c_uint) -> *mut Fann {
    stub_network()
}

extern "C" fn create_from_file(_path: *const c_char) -> *mut Fann {
    ptr::null_mut()
}

extern "C" fn destroy(ann: *mut Fann) {
    // Safety: every network handed out here is a boxed u64
    unsafe { drop(Box::from_raw(ann as *mut u64)) };
    DESTROYED_NETWORKS.with(|c| c.set(c.get() + 1));
}

extern "C" fn get_uint(_ann: *mut Fann) -> c_uint {
    0
}

extern "C" fn get_float(_ann: *mut Fann) -> c_float {
    0.0
}

extern "C" fn set_uint(_ann: *mut Fann, _value: c_uint) {}

extern "C" fn set_float(_ann: *mut Fann, _value: c_float) {}

extern "C" fn with_ann(_ann: *mut Fann) {}

extern "C" fn with_train(_ann: *mut Fann, _train: *mut FannTrainData) {}

extern "C" fn test_data(_ann: *mut Fann, _train: *mut FannTrainData) -> c_float {
    0.0
}

extern "C" fn run(_ann: *mut Fann, _input: *mut FannType) -> *mut FannType {
    ptr::null_mut()
}

extern "C" fn save(_ann: *mut Fann, _path: *const c_char) -> c_int {
    -1
}

extern "C" fn train_on_file(_a: *mut Fann, _p: *const c_char, _m: c_uint, _r: c_uint, _e: c_float) {}

extern "C" fn train_on_data(
    _a: *mut Fann,
    _t: *mut FannTrainData,
    _m: c_uint,
    _r: c_uint,
    _e: c_float,
) {
}

extern "C" fn read_train_from_file(_path: *const c_char) -> *mut FannTrainData {
    stub_train()
}

extern "C" fn destroy_train(train: *mut FannTrainData) {
    // Safety: every training set handed out here is a boxed u64
    unsafe { drop(Box::from_raw(train as *mut u64)) };
    DESTROYED_TRAIN.with(|c| c.set(c.get() + 1));
}

extern "C" fn save_train(_train: *mut FannTrainData, _path: *const c_char) -> c_int {
    -1
}

extern "C" fn scale(_train: *mut FannTrainData, _min: FannType, _max: FannType) {}

pub fn stub_functions() -> FannFunctions {
    FannFunctions {
        create_standard_array,
        create_sparse_array,
        create_from_file,
        destroy,
        get_num_input: get_uint,
        get_num_output: get_uint,
        get_total_neurons: get_uint,
        print_connections: with_ann,
        print_parameters: with_ann,
        set_training_algorithm: set_uint,
        get_training_algorithm: get_uint,
        set_learning_rate: set_float,
        get_learning_rate: get_float,
        set_activation_function_hidden: set_uint,
        set_activation_function_output: set_uint,
        set_activation_steepness_hidden: set_float,
        set_activation_steepness_output: set_float,
        set_train_stop_function: set_uint,
        get_train_stop_function: get_uint,
        set_bit_fail_limit: set_float,
        get_bit_fail_limit: get_float,
        init_weights: with_train,
        test_data,
        run,
        save,
        train_on_file,
        train_on_data,
        read_train_from_file,
        destroy_train,
        save_train,
        scale_input_train_data: scale,
        scale_output_train_data: scale,
        scale_train_data: scale,
    }
}

pub fn stub_api() -> Arc<FannApi> {
    Arc::new(FannApi::from_functions("unit-test stub", stub_functions()))
}
