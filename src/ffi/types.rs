//! FANN Type System
//!
//! Opaque native types and the enum identifiers shared between FANN and Lua.

use std::fmt;
use std::os::raw::c_uint;

/// Element type of FANN input/output buffers (`fann_type` in the float build)
pub type FannType = f32;

/// Opaque `struct fann`
#[repr(C)]
pub struct Fann {
    _private: [u8; 0],
}

/// Opaque `struct fann_train_data`
#[repr(C)]
pub struct FannTrainData {
    _private: [u8; 0],
}

/// A FANN enum exposed to Lua as a named integer constant
pub trait FannEnum: Sized + Copy + 'static {
    /// Human-readable kind used in error messages
    const KIND: &'static str;

    /// Every identifier exported to Lua, in declaration order
    const ALL: &'static [Self];

    /// Constant name as exported to Lua (e.g. `FANN_SIGMOID`)
    fn name(self) -> &'static str;

    /// Native value passed to the C API
    fn value(self) -> c_uint;

    /// Look up the identifier for a Lua integer
    fn from_value(value: i64) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| i64::from(id.value()) == value)
    }
}

/// Activation functions (`enum fann_activationfunc_enum`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ActivationFunction {
    Linear = 0,
    Threshold = 1,
    ThresholdSymmetric = 2,
    Sigmoid = 3,
    SigmoidStepwise = 4,
    SigmoidSymmetric = 5,
    SigmoidSymmetricStepwise = 6,
    Gaussian = 7,
    GaussianSymmetric = 8,
    // 9 is FANN_GAUSSIAN_STEPWISE, which FANN never implemented
    Elliot = 10,
    ElliotSymmetric = 11,
    LinearPiece = 12,
    LinearPieceSymmetric = 13,
}

impl FannEnum for ActivationFunction {
    const KIND: &'static str = "activation function";

    const ALL: &'static [Self] = &[
        ActivationFunction::Linear,
        ActivationFunction::Threshold,
        ActivationFunction::ThresholdSymmetric,
        ActivationFunction::Sigmoid,
        ActivationFunction::SigmoidStepwise,
        ActivationFunction::SigmoidSymmetric,
        ActivationFunction::SigmoidSymmetricStepwise,
        ActivationFunction::Gaussian,
        ActivationFunction::GaussianSymmetric,
        ActivationFunction::Elliot,
        ActivationFunction::ElliotSymmetric,
        ActivationFunction::LinearPiece,
        ActivationFunction::LinearPieceSymmetric,
    ];

    fn name(self) -> &'static str {
        match self {
            ActivationFunction::Linear => "FANN_LINEAR",
            ActivationFunction::Threshold => "FANN_THRESHOLD",
            ActivationFunction::ThresholdSymmetric => "FANN_THRESHOLD_SYMMETRIC",
            ActivationFunction::Sigmoid => "FANN_SIGMOID",
            ActivationFunction::SigmoidStepwise => "FANN_SIGMOID_STEPWISE",
            ActivationFunction::SigmoidSymmetric => "FANN_SIGMOID_SYMMETRIC",
            ActivationFunction::SigmoidSymmetricStepwise => "FANN_SIGMOID_SYMMETRIC_STEPWISE",
            ActivationFunction::Gaussian => "FANN_GAUSSIAN",
            ActivationFunction::GaussianSymmetric => "FANN_GAUSSIAN_SYMMETRIC",
            ActivationFunction::Elliot => "FANN_ELLIOT",
            ActivationFunction::ElliotSymmetric => "FANN_ELLIOT_SYMMETRIC",
            ActivationFunction::LinearPiece => "FANN_LINEAR_PIECE",
            ActivationFunction::LinearPieceSymmetric => "FANN_LINEAR_PIECE_SYMMETRIC",
        }
    }

    fn value(self) -> c_uint {
        self as c_uint
    }
}

/// Training algorithms (`enum fann_train_enum`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TrainingAlgorithm {
    Incremental = 0,
    Batch = 1,
    Rprop = 2,
    Quickprop = 3,
}

impl FannEnum for TrainingAlgorithm {
    const KIND: &'static str = "training algorithm";

    const ALL: &'static [Self] = &[
        TrainingAlgorithm::Incremental,
        TrainingAlgorithm::Batch,
        TrainingAlgorithm::Rprop,
        TrainingAlgorithm::Quickprop,
    ];

    fn name(self) -> &'static str {
        match self {
            TrainingAlgorithm::Incremental => "FANN_TRAIN_INCREMENTAL",
            TrainingAlgorithm::Batch => "FANN_TRAIN_BATCH",
            TrainingAlgorithm::Rprop => "FANN_TRAIN_RPROP",
            TrainingAlgorithm::Quickprop => "FANN_TRAIN_QUICKPROP",
        }
    }

    fn value(self) -> c_uint {
        self as c_uint
    }
}

/// Training stop criteria (`enum fann_stopfunc_enum`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StopFunction {
    Mse = 0,
    Bit = 1,
}

impl FannEnum for StopFunction {
    const KIND: &'static str = "stop function";

    const ALL: &'static [Self] = &[StopFunction::Mse, StopFunction::Bit];

    fn name(self) -> &'static str {
        match self {
            StopFunction::Mse => "FANN_STOPFUNC_MSE",
            StopFunction::Bit => "FANN_STOPFUNC_BIT",
        }
    }

    fn value(self) -> c_uint {
        self as c_uint
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for TrainingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for StopFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
