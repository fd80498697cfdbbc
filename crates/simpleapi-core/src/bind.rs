//! Typed binding of handler arguments from request data
//!
//! A handler argument type implements [`Bind`]: it declares the request
//! values it reads once, as a list of [`ParamDescriptor`]s, and builds
//! itself from a [`Binder`] on every request.
//!
//! ```
//! use simpleapi_core::bind::{field, Bind, Binder, Location, ParamDescriptor};
//! use simpleapi_core::Result;
//!
//! struct GetUser {
//!     id: u64,
//!     verbose: Option<bool>,
//! }
//!
//! impl Bind for GetUser {
//!     fn descriptors() -> Vec<ParamDescriptor> {
//!         vec![
//!             field::<u64>(Location::Path, "id"),
//!             field::<Option<bool>>(Location::Query, "verbose"),
//!         ]
//!     }
//!
//!     fn bind(binder: &Binder<'_>) -> Result<Self> {
//!         Ok(Self {
//!             id: binder.path("id")?,
//!             verbose: binder.query("verbose")?,
//!         })
//!     }
//! }
//! ```

use crate::{Error, Request, Result};
use serde::Serialize;
use simpleapi_router::Params;
use std::collections::HashMap;

/// Where a bound value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path,
    Query,
    Header,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
        })
    }
}

/// Scalar shape of a bound value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// A request value a handler reads, declared at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub location: Location,
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

/// Descriptor for a value of type `T` read from `location`
///
/// Path values are always required.
pub fn field<T: FromParam>(location: Location, name: impl Into<String>) -> ParamDescriptor {
    ParamDescriptor {
        location,
        name: name.into(),
        kind: T::KIND,
        required: location == Location::Path || T::REQUIRED,
    }
}

/// Conversion from a raw request string
pub trait FromParam: Sized {
    const KIND: ParamKind;
    const REQUIRED: bool = true;

    fn from_param(raw: &str) -> std::result::Result<Self, String>;
}

impl FromParam for String {
    const KIND: ParamKind = ParamKind::String;

    fn from_param(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromParam for bool {
    const KIND: ParamKind = ParamKind::Boolean;

    fn from_param(raw: &str) -> std::result::Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(format!("invalid boolean {raw:?}")),
        }
    }
}

macro_rules! from_param_parse {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl FromParam for $ty {
                const KIND: ParamKind = $kind;

                fn from_param(raw: &str) -> std::result::Result<Self, String> {
                    raw.parse().map_err(|e| format!("{e}"))
                }
            }
        )+
    };
}

from_param_parse!(ParamKind::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
from_param_parse!(ParamKind::Number => f32, f64);

impl<T: FromParam> FromParam for Option<T> {
    const KIND: ParamKind = T::KIND;
    const REQUIRED: bool = false;

    fn from_param(raw: &str) -> std::result::Result<Self, String> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::from_param(raw).map(Some)
        }
    }
}

/// Read-only view over the values a handler argument can bind from
pub struct Binder<'a> {
    request: &'a Request,
    params: &'a Params,
    query: HashMap<String, String>,
}

impl<'a> Binder<'a> {
    pub fn new(request: &'a Request, params: &'a Params) -> Self {
        Self {
            request,
            params,
            query: request.query_params(),
        }
    }

    /// Path parameter `name`; absent parameters read as `""`
    pub fn path<T: FromParam>(&self, name: &str) -> Result<T> {
        convert(Location::Path, name, self.params.by_name(name))
    }

    /// Query parameter `name`; absent parameters read as `""`
    pub fn query<T: FromParam>(&self, name: &str) -> Result<T> {
        let raw = self.query.get(name).map(String::as_str).unwrap_or("");
        convert(Location::Query, name, raw)
    }

    /// Header `name` (case-insensitive); absent headers read as `""`
    pub fn header<T: FromParam>(&self, name: &str) -> Result<T> {
        convert(Location::Header, name, self.request.header(name).unwrap_or(""))
    }

    pub fn request(&self) -> &Request {
        self.request
    }

    pub fn params(&self) -> &Params {
        self.params
    }
}

fn convert<T: FromParam>(location: Location, name: &str, raw: &str) -> Result<T> {
    T::from_param(raw).map_err(|message| Error::Bind {
        location,
        name: name.to_string(),
        message,
    })
}

/// A handler argument populated from request data
pub trait Bind: Sized {
    /// Values this type reads, used for documentation
    fn descriptors() -> Vec<ParamDescriptor>;

    fn bind(binder: &Binder<'_>) -> Result<Self>;
}

impl Bind for () {
    fn descriptors() -> Vec<ParamDescriptor> {
        Vec::new()
    }

    fn bind(_: &Binder<'_>) -> Result<Self> {
        Ok(())
    }
}

macro_rules! bind_tuple {
    ($($name:ident),+) => {
        impl<$($name: Bind),+> Bind for ($($name,)+) {
            fn descriptors() -> Vec<ParamDescriptor> {
                let mut descriptors = Vec::new();
                $(descriptors.extend($name::descriptors());)+
                descriptors
            }

            fn bind(binder: &Binder<'_>) -> Result<Self> {
                Ok(($($name::bind(binder)?,)+))
            }
        }
    };
}

bind_tuple!(A, B);
bind_tuple!(A, B, C);
