//! Error types returned by the tension, game, selection and IO routines.
//!
//! Configuration problems surface before any simulation work is done while
//! calculation errors are propagated upwards through the calling methods.

use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone)]
            pub struct $err_name(
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub String,
            );

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl Error for $err_name {}
        )+
    }
}

define_errors!(
    (
        SetupError,
        "Occurs when constructing a population or reading parameter resources"
    ),
    (CalcError, "General calculation error"),
    (
        IndexError,
        "A cell index did not refer to an existing cell of the population"
    ),
    (
        TopologyError,
        "The incidence information of a mesh edge was inconsistent"
    ),
    (DivisionError, "Errors related to cell division"),
    (
        TimeError,
        "Error related to advancing the simulation time or displaying its progress"
    ),
    (ReportError, "Occurs while writing the parameter report")
);

impl From<CalcError> for SetupError {
    fn from(value: CalcError) -> Self {
        SetupError(value.0)
    }
}

impl From<TopologyError> for CalcError {
    fn from(value: TopologyError) -> Self {
        CalcError(value.0)
    }
}

impl From<IndexError> for CalcError {
    fn from(value: IndexError) -> Self {
        CalcError(value.0)
    }
}

impl From<String> for TimeError {
    fn from(value: String) -> Self {
        TimeError(value)
    }
}

impl From<std::io::Error> for ReportError {
    fn from(value: std::io::Error) -> Self {
        ReportError(format!("{value}"))
    }
}

macro_rules! impl_error_variant {
    ($name: ident, $($err_var: ident),+) => {
        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$err_var(message) => write!(f, "{}", message),
                    )+
                }
            }
        }
    }
}

macro_rules! impl_from_error {
    ($name: ident, $(($err_var: ident, $err_type: ty)),+) => {
        $(
            impl From<$err_type> for $name {
                fn from(err: $err_type) -> Self {
                    $name::$err_var(err)
                }
            }
        )+
    }
}

/// Covers all errors that can occur when running a simulation.
///
/// The variants are listed from very likely to be a user error to almost
/// certainly an internal error.
#[derive(Debug)]
pub enum SimulationError {
    // Very likely to be user errors
    /// See [SetupError]
    SetupError(SetupError),
    /// See [TimeError]
    TimeError(TimeError),
    /// See [ReportError]
    ReportError(ReportError),

    // Less likely but possible to be user errors
    /// See [CalcError]
    CalcError(CalcError),
    /// See [DivisionError]
    DivisionError(DivisionError),

    // Highly unlikely to be user errors
    /// See [TopologyError]
    TopologyError(TopologyError),
    /// See [IndexError]
    IndexError(IndexError),
    /// Generic IO error
    IoError(std::io::Error),
}

impl_from_error! {SimulationError,
    (SetupError, SetupError),
    (TimeError, TimeError),
    (ReportError, ReportError),
    (CalcError, CalcError),
    (DivisionError, DivisionError),
    (TopologyError, TopologyError),
    (IndexError, IndexError),
    (IoError, std::io::Error)
}

impl_error_variant! {SimulationError,
    SetupError,
    TimeError,
    ReportError,
    CalcError,
    DivisionError,
    TopologyError,
    IndexError,
    IoError
}

impl std::error::Error for SimulationError {}
