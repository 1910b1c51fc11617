//! Canonical signatures of plain values.

use std::fmt::Debug;

use serde::Serialize;

use crate::{MemoError, MemoResult};

/// Values with an explicit canonical signature.
///
/// Equal values must produce equal signatures, and the signature must not
/// depend on anything outside the value (addresses, iteration order of hashed
/// collections, time).
pub trait Signable {
    /// Canonical string for this value.
    fn signature(&self) -> String;
}

macro_rules! display_signable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Signable for $t {
                fn signature(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_signable!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

// Debug keeps the fractional part, so 1.0 and 1 sign differently.
impl Signable for f32 {
    fn signature(&self) -> String {
        format!("{:?}", self)
    }
}

impl Signable for f64 {
    fn signature(&self) -> String {
        format!("{:?}", self)
    }
}

impl Signable for char {
    fn signature(&self) -> String {
        format!("{:?}", self)
    }
}

impl Signable for str {
    fn signature(&self) -> String {
        format!("{:?}", self)
    }
}

impl Signable for String {
    fn signature(&self) -> String {
        self.as_str().signature()
    }
}

impl Signable for () {
    fn signature(&self) -> String {
        "()".to_string()
    }
}

impl<T: Signable> Signable for Option<T> {
    fn signature(&self) -> String {
        match self {
            Some(value) => format!("Some({})", value.signature()),
            None => "None".to_string(),
        }
    }
}

impl<T: Signable> Signable for [T] {
    fn signature(&self) -> String {
        let items: Vec<String> = self.iter().map(Signable::signature).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: Signable> Signable for Vec<T> {
    fn signature(&self) -> String {
        self.as_slice().signature()
    }
}

impl Signable for serde_json::Value {
    fn signature(&self) -> String {
        self.to_string()
    }
}

impl<T: Signable + ?Sized> Signable for &T {
    fn signature(&self) -> String {
        (**self).signature()
    }
}

/// Signs a value by its `Debug` representation.
///
/// Only suitable for types whose `Debug` output is deterministic.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Textual<T>(pub T);

impl<T: Debug> Textual<T> {
    /// Textual representation of the wrapped value.
    pub fn repr(&self) -> String {
        format!("{:?}", self.0)
    }
}

/// Signs a value by its canonical JSON form (object keys sorted).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct Structural<T>(pub T);

impl<T: Serialize> Structural<T> {
    /// Canonical JSON of the wrapped value.
    pub fn repr(&self) -> MemoResult<String> {
        let value = serde_json::to_value(&self.0)
            .map_err(|e| MemoError::SignatureResolution(e.to_string()))?;
        Ok(value.to_string())
    }
}
