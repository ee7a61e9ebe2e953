//! In-process fake of libfann for integration tests
//!
//! Implements the C entry points the binding resolves, with enough behavior
//! to observe marshaling: networks remember every setting and the last input
//! they were run on, training files use FANN's text layout, and scaling is
//! FANN's linear min/max mapping.

#![allow(dead_code)]

use std::cell::Cell;
use std::ffi::CStr;
use std::fs;
use std::os::raw::{c_char, c_float, c_int, c_uint};
use std::ptr;
use std::sync::Arc;

use luafann::ffi::{Fann, FannTrainData, FannType};
use luafann::{FannApi, FannFunctions, Network, TrainingSet};
use mlua::{AnyUserData, Lua};

/// Header of saved fake networks
const NET_MAGIC: &str = "FAKEFANN 1";

thread_local! {
    static CREATED_NETWORKS: Cell<usize> = const { Cell::new(0) };
    static DESTROYED_NETWORKS: Cell<usize> = const { Cell::new(0) };
    static CREATED_TRAIN: Cell<usize> = const { Cell::new(0) };
    static DESTROYED_TRAIN: Cell<usize> = const { Cell::new(0) };
    static PRINTS: Cell<usize> = const { Cell::new(0) };
}

fn bump(counter: &'static std::thread::LocalKey<Cell<usize>>) {
    counter.with(|c| c.set(c.get() + 1));
}

/// Networks created on this thread and not yet destroyed
pub fn live_networks() -> usize {
    CREATED_NETWORKS.with(Cell::get) - DESTROYED_NETWORKS.with(Cell::get)
}

/// Training sets created on this thread and not yet destroyed
pub fn live_train() -> usize {
    CREATED_TRAIN.with(Cell::get) - DESTROYED_TRAIN.with(Cell::get)
}

pub fn destroyed_networks() -> usize {
    DESTROYED_NETWORKS.with(Cell::get)
}

pub fn destroyed_train() -> usize {
    DESTROYED_TRAIN.with(Cell::get)
}

pub fn print_calls() -> usize {
    PRINTS.with(Cell::get)
}

/// State behind a fake `struct fann *`
#[derive(Debug, Clone, PartialEq)]
pub struct FakeNet {
    pub layers: Vec<u32>,
    pub connection_rate: f32,
    pub training_algorithm: u32,
    pub learning_rate: f32,
    pub activation_hidden: u32,
    pub activation_output: u32,
    pub steepness_hidden: f32,
    pub steepness_output: f32,
    pub stop_function: u32,
    pub bit_fail_limit: f32,
    pub weights_initialized: bool,
    pub epochs_trained: u32,
    pub last_training: Option<(u32, u32, f32)>,
    pub last_input: Vec<f32>,
    output: Vec<f32>,
}

impl FakeNet {
    fn new(layers: Vec<u32>, connection_rate: f32) -> Self {
        // FANN's defaults
        Self {
            layers,
            connection_rate,
            training_algorithm: 2,
            learning_rate: 0.7,
            activation_hidden: 5,
            activation_output: 5,
            steepness_hidden: 0.5,
            steepness_output: 0.5,
            stop_function: 0,
            bit_fail_limit: 0.35,
            weights_initialized: false,
            epochs_trained: 0,
            last_training: None,
            last_input: Vec::new(),
            output: Vec::new(),
        }
    }

    fn num_input(&self) -> u32 {
        self.layers.first().copied().unwrap_or(0)
    }

    fn num_output(&self) -> u32 {
        self.layers.last().copied().unwrap_or(0)
    }

    /// Deterministic stand-in for a forward pass: output j is
    /// tanh(learning_rate * sum(inputs) + j).
    fn evaluate(&self, input: &[f32]) -> Vec<f32> {
        let sum: f32 = input.iter().sum();
        (0..self.num_output())
            .map(|j| (self.learning_rate * sum + j as f32).tanh())
            .collect()
    }

    fn to_text(&self) -> String {
        let layers: Vec<String> = self.layers.iter().map(u32::to_string).collect();
        format!(
            "{}\nlayers={}\nconnection_rate={}\ntraining_algorithm={}\nlearning_rate={}\n\
             activation_hidden={}\nactivation_output={}\nsteepness_hidden={}\n\
             steepness_output={}\nstop_function={}\nbit_fail_limit={}\n",
            NET_MAGIC,
            layers.join(" "),
            self.connection_rate,
            self.training_algorithm,
            self.learning_rate,
            self.activation_hidden,
            self.activation_output,
            self.steepness_hidden,
            self.steepness_output,
            self.stop_function,
            self.bit_fail_limit,
        )
    }

    fn from_text(text: &str) -> Option<Self> {
        let mut lines = text.lines();
        if lines.next()? != NET_MAGIC {
            return None;
        }
        let mut net = FakeNet::new(Vec::new(), 1.0);
        for line in lines {
            let (key, value) = line.split_once('=')?;
            match key {
                "layers" => {
                    net.layers = value
                        .split_whitespace()
                        .map(str::parse)
                        .collect::<Result<_, _>>()
                        .ok()?
                }
                "connection_rate" => net.connection_rate = value.parse().ok()?,
                "training_algorithm" => net.training_algorithm = value.parse().ok()?,
                "learning_rate" => net.learning_rate = value.parse().ok()?,
                "activation_hidden" => net.activation_hidden = value.parse().ok()?,
                "activation_output" => net.activation_output = value.parse().ok()?,
                "steepness_hidden" => net.steepness_hidden = value.parse().ok()?,
                "steepness_output" => net.steepness_output = value.parse().ok()?,
                "stop_function" => net.stop_function = value.parse().ok()?,
                "bit_fail_limit" => net.bit_fail_limit = value.parse().ok()?,
                _ => return None,
            }
        }
        if net.layers.len() < 2 {
            return None;
        }
        Some(net)
    }
}

/// State behind a fake `struct fann_train_data *`
#[derive(Debug, Clone, PartialEq)]
pub struct FakeTrain {
    pub inputs: Vec<Vec<f32>>,
    pub outputs: Vec<Vec<f32>>,
}

impl FakeTrain {
    /// Parse FANN's training file layout:
    /// `num_data num_input num_output`, then one input line and one output
    /// line per pair.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let mut next_usize = || tokens.next()?.parse::<usize>().ok();
        let pairs = next_usize()?;
        let num_input = next_usize()?;
        let num_output = next_usize()?;

        let mut values = text.split_whitespace().skip(3).map(str::parse::<f32>);
        let mut take = |n: usize| -> Option<Vec<f32>> {
            (0..n).map(|_| values.next()?.ok()).collect()
        };

        let mut data = FakeTrain {
            inputs: Vec::with_capacity(pairs),
            outputs: Vec::with_capacity(pairs),
        };
        for _ in 0..pairs {
            data.inputs.push(take(num_input)?);
            data.outputs.push(take(num_output)?);
        }
        Some(data)
    }

    pub fn to_text(&self) -> String {
        let num_input = self.inputs.first().map_or(0, Vec::len);
        let num_output = self.outputs.first().map_or(0, Vec::len);
        let mut text = format!("{} {} {}\n", self.inputs.len(), num_input, num_output);
        for (input, output) in self.inputs.iter().zip(&self.outputs) {
            text.push_str(&join(input));
            text.push('\n');
            text.push_str(&join(output));
            text.push('\n');
        }
        text
    }
}

fn join(values: &[f32]) -> String {
    values
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// FANN's linear rescale of every value in `rows` to [new_min, new_max]
fn rescale(rows: &mut [Vec<f32>], new_min: f32, new_max: f32) {
    let (old_min, old_max) = rows
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !old_min.is_finite() || old_max <= old_min {
        return;
    }
    let factor = (new_max - new_min) / (old_max - old_min);
    for v in rows.iter_mut().flatten() {
        *v = (*v - old_min) * factor + new_min;
    }
}

// ============================================================================
// Pointer plumbing
// ============================================================================

fn into_fann(net: FakeNet) -> *mut Fann {
    bump(&CREATED_NETWORKS);
    Box::into_raw(Box::new(net)) as *mut Fann
}

fn into_train(data: FakeTrain) -> *mut FannTrainData {
    bump(&CREATED_TRAIN);
    Box::into_raw(Box::new(data)) as *mut FannTrainData
}

/// Safety: `ann` must come from `into_fann` and still be live.
unsafe fn net<'a>(ann: *mut Fann) -> &'a mut FakeNet {
    &mut *(ann as *mut FakeNet)
}

/// Safety: `data` must come from `into_train` and still be live.
unsafe fn train<'a>(data: *mut FannTrainData) -> &'a mut FakeTrain {
    &mut *(data as *mut FakeTrain)
}

unsafe fn path_of(path: *const c_char) -> Option<String> {
    CStr::from_ptr(path).to_str().ok().map(str::to_string)
}

// ============================================================================
// Entry points
// ============================================================================

unsafe extern "C" fn create_standard_array(num_layers: c_uint, layers: *const c_uint) -> *mut Fann {
    create_sparse_array(1.0, num_layers, layers)
}

unsafe extern "C" fn create_sparse_array(
    connection_rate: c_float,
    num_layers: c_uint,
    layers: *const c_uint,
) -> *mut Fann {
    // FANN needs at least an input and an output layer
    if num_layers < 2 {
        return ptr::null_mut();
    }
    let layers = std::slice::from_raw_parts(layers, num_layers as usize).to_vec();
    into_fann(FakeNet::new(layers, connection_rate))
}

unsafe extern "C" fn create_from_file(path: *const c_char) -> *mut Fann {
    path_of(path)
        .and_then(|p| fs::read_to_string(p).ok())
        .and_then(|text| FakeNet::from_text(&text))
        .map_or(ptr::null_mut(), into_fann)
}

unsafe extern "C" fn destroy(ann: *mut Fann) {
    drop(Box::from_raw(ann as *mut FakeNet));
    bump(&DESTROYED_NETWORKS);
}

unsafe extern "C" fn get_num_input(ann: *mut Fann) -> c_uint {
    net(ann).num_input()
}

unsafe extern "C" fn get_num_output(ann: *mut Fann) -> c_uint {
    net(ann).num_output()
}

unsafe extern "C" fn get_total_neurons(ann: *mut Fann) -> c_uint {
    // one bias neuron per layer except the output layer
    let layers = &net(ann).layers;
    layers.iter().sum::<u32>() + layers.len() as u32 - 1
}

unsafe extern "C" fn print_connections(_ann: *mut Fann) {
    bump(&PRINTS);
}

unsafe extern "C" fn print_parameters(_ann: *mut Fann) {
    bump(&PRINTS);
}

unsafe extern "C" fn set_training_algorithm(ann: *mut Fann, value: c_uint) {
    net(ann).training_algorithm = value;
}

unsafe extern "C" fn get_training_algorithm(ann: *mut Fann) -> c_uint {
    net(ann).training_algorithm
}

unsafe extern "C" fn set_learning_rate(ann: *mut Fann, value: c_float) {
    net(ann).learning_rate = value;
}

unsafe extern "C" fn get_learning_rate(ann: *mut Fann) -> c_float {
    net(ann).learning_rate
}

unsafe extern "C" fn set_activation_function_hidden(ann: *mut Fann, value: c_uint) {
    net(ann).activation_hidden = value;
}

unsafe extern "C" fn set_activation_function_output(ann: *mut Fann, value: c_uint) {
    net(ann).activation_output = value;
}

unsafe extern "C" fn set_activation_steepness_hidden(ann: *mut Fann, value: FannType) {
    net(ann).steepness_hidden = value;
}

unsafe extern "C" fn set_activation_steepness_output(ann: *mut Fann, value: FannType) {
    net(ann).steepness_output = value;
}

unsafe extern "C" fn set_train_stop_function(ann: *mut Fann, value: c_uint) {
    net(ann).stop_function = value;
}

unsafe extern "C" fn get_train_stop_function(ann: *mut Fann) -> c_uint {
    net(ann).stop_function
}

unsafe extern "C" fn set_bit_fail_limit(ann: *mut Fann, value: FannType) {
    net(ann).bit_fail_limit = value;
}

unsafe extern "C" fn get_bit_fail_limit(ann: *mut Fann) -> FannType {
    net(ann).bit_fail_limit
}

unsafe extern "C" fn init_weights(ann: *mut Fann, _data: *mut FannTrainData) {
    net(ann).weights_initialized = true;
}

unsafe extern "C" fn test_data(ann: *mut Fann, data: *mut FannTrainData) -> c_float {
    let net = net(ann);
    let data = train(data);
    let mut total = 0.0f32;
    let mut count = 0usize;
    for (input, expected) in data.inputs.iter().zip(&data.outputs) {
        for (actual, wanted) in net.evaluate(input).iter().zip(expected) {
            total += (actual - wanted) * (actual - wanted);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

unsafe extern "C" fn run(ann: *mut Fann, input: *mut FannType) -> *mut FannType {
    let net = net(ann);
    net.last_input = std::slice::from_raw_parts(input, net.num_input() as usize).to_vec();
    net.output = net.evaluate(&net.last_input);
    net.output.as_mut_ptr()
}

unsafe extern "C" fn save(ann: *mut Fann, path: *const c_char) -> c_int {
    match path_of(path).map(|p| fs::write(p, net(ann).to_text())) {
        Some(Ok(())) => 0,
        _ => -1,
    }
}

unsafe extern "C" fn train_on_file(
    ann: *mut Fann,
    path: *const c_char,
    max_epochs: c_uint,
    epochs_between_reports: c_uint,
    desired_error: c_float,
) {
    // FANN reports an unreadable file and returns without training
    let readable = path_of(path)
        .and_then(|p| fs::read_to_string(p).ok())
        .and_then(|text| FakeTrain::parse(&text))
        .is_some();
    if readable {
        let net = net(ann);
        net.epochs_trained += max_epochs;
        net.last_training = Some((max_epochs, epochs_between_reports, desired_error));
    }
}

unsafe extern "C" fn train_on_data(
    ann: *mut Fann,
    _data: *mut FannTrainData,
    max_epochs: c_uint,
    epochs_between_reports: c_uint,
    desired_error: c_float,
) {
    let net = net(ann);
    net.epochs_trained += max_epochs;
    net.last_training = Some((max_epochs, epochs_between_reports, desired_error));
}

unsafe extern "C" fn read_train_from_file(path: *const c_char) -> *mut FannTrainData {
    path_of(path)
        .and_then(|p| fs::read_to_string(p).ok())
        .and_then(|text| FakeTrain::parse(&text))
        .map_or(ptr::null_mut(), into_train)
}

unsafe extern "C" fn destroy_train(data: *mut FannTrainData) {
    drop(Box::from_raw(data as *mut FakeTrain));
    bump(&DESTROYED_TRAIN);
}

unsafe extern "C" fn save_train(data: *mut FannTrainData, path: *const c_char) -> c_int {
    match path_of(path).map(|p| fs::write(p, train(data).to_text())) {
        Some(Ok(())) => 0,
        _ => -1,
    }
}

unsafe extern "C" fn scale_input_train_data(data: *mut FannTrainData, min: FannType, max: FannType) {
    rescale(&mut train(data).inputs, min, max);
}

unsafe extern "C" fn scale_output_train_data(data: *mut FannTrainData, min: FannType, max: FannType) {
    rescale(&mut train(data).outputs, min, max);
}

unsafe extern "C" fn scale_train_data(data: *mut FannTrainData, min: FannType, max: FannType) {
    let data = train(data);
    rescale(&mut data.inputs, min, max);
    rescale(&mut data.outputs, min, max);
}

pub fn fake_functions() -> FannFunctions {
    FannFunctions {
        create_standard_array,
        create_sparse_array,
        create_from_file,
        destroy,
        get_num_input,
        get_num_output,
        get_total_neurons,
        print_connections,
        print_parameters,
        set_training_algorithm,
        get_training_algorithm,
        set_learning_rate,
        get_learning_rate,
        set_activation_function_hidden,
        set_activation_function_output,
        set_activation_steepness_hidden,
        set_activation_steepness_output,
        set_train_stop_function,
        get_train_stop_function,
        set_bit_fail_limit,
        get_bit_fail_limit,
        init_weights,
        test_data,
        run,
        save,
        train_on_file,
        train_on_data,
        read_train_from_file,
        destroy_train,
        save_train,
        scale_input_train_data,
        scale_output_train_data,
        scale_train_data,
    }
}

pub fn fake_api() -> Arc<FannApi> {
    Arc::new(FannApi::from_functions("fake libfann", fake_functions()))
}

/// A Lua state with `fann` registered against the fake library
pub fn lua_with_fann() -> Lua {
    let lua = Lua::new();
    luafann::register_with(&lua, fake_api()).expect("register fann");
    lua
}

// ============================================================================
// Inspection helpers
// ============================================================================

/// Snapshot of the fake network behind global `name`
pub fn network_state(lua: &Lua, name: &str) -> FakeNet {
    let ud: AnyUserData = lua.globals().get(name).expect("global network");
    let net = ud.borrow::<Network>().expect("fann.net userdata");
    let ann = net.handle().get().expect("live network");
    unsafe { (*(ann as *mut FakeNet)).clone() }
}

/// Snapshot of the fake training set behind global `name`
pub fn train_state(lua: &Lua, name: &str) -> FakeTrain {
    let ud: AnyUserData = lua.globals().get(name).expect("global training set");
    let set = ud.borrow::<TrainingSet>().expect("fann.train userdata");
    let data = set.handle().get().expect("live training set");
    unsafe { (*(data as *mut FakeTrain)).clone() }
}

/// XOR in FANN's training file layout
pub const XOR_DATA: &str = "4 2 1\n-1 -1\n-1\n-1 1\n1\n1 -1\n1\n1 1\n-1\n";

/// Write XOR training data into `dir` and return its path as a Lua-safe string
pub fn write_xor(dir: &std::path::Path) -> String {
    let path = dir.join("xor.data");
    fs::write(&path, XOR_DATA).expect("write xor.data");
    lua_path(&path)
}

/// Path with forward slashes so it can be embedded in a Lua string literal
pub fn lua_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Compare two float slices with a tolerance
pub fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "{:?} vs {:?}", actual, expected);
    }
}
