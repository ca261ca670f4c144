use std::cell::RefCell;
use std::num::IntErrorKind;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

/// A conversion or check failure for a single value.
#[derive(Debug, Error)]
pub enum ValueError {
    /// The raw text is not valid syntax for the target kind.
    #[error("parse error")]
    Syntax,
    /// The raw text is valid syntax but outside the representable range.
    #[error("value out of range")]
    Range,
    /// The converted value was rejected by a check.
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// A value rejection produced by a check function.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CheckError {
    message: String,
}

impl CheckError {
    /// Create a check error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A function that inspects a converted value, rejecting it with a [`CheckError`].
pub type CheckFn<T> = Box<dyn Fn(&T) -> Result<(), CheckError>>;

/// Behaviour for a parseable value binding.
///
/// Flags and positional parameters are registered through this trait, so any
/// implementation can participate in parsing. [`Checked`] covers the built-in
/// scalar kinds.
pub trait Value {
    /// Convert the raw text, write the result to the destination, and then run
    /// any checks in declaration order.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Render the current destination value for display.
    fn render(&self) -> String;

    /// Whether a value must be supplied (no default was given).
    fn required(&self) -> bool;
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar kind supported by [`Checked`] bindings.
///
/// This is a closed set: `i32`, `i64`, `u32`, `u64`, `f64`, `String`, and
/// [`Duration`].
pub trait Scalar: sealed::Sealed + Default + PartialEq {
    /// Convert raw text using the kind's standard parsing rules.
    fn parse_scalar(raw: &str) -> Result<Self, ValueError>;

    /// Render a value of this kind for display.
    fn render_scalar(&self) -> String;
}

macro_rules! integer_scalar {
    ($($kind:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $kind {}

            impl Scalar for $kind {
                fn parse_scalar(raw: &str) -> Result<Self, ValueError> {
                    raw.parse::<$kind>().map_err(|error| match error.kind() {
                        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ValueError::Range,
                        _ => ValueError::Syntax,
                    })
                }

                fn render_scalar(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_scalar!(i32, i64, u32, u64);

impl sealed::Sealed for f64 {}

impl Scalar for f64 {
    fn parse_scalar(raw: &str) -> Result<Self, ValueError> {
        raw.parse::<f64>().map_err(|_| ValueError::Syntax)
    }

    fn render_scalar(&self) -> String {
        self.to_string()
    }
}

impl sealed::Sealed for String {}

impl Scalar for String {
    fn parse_scalar(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn render_scalar(&self) -> String {
        format!("{self:?}")
    }
}

impl sealed::Sealed for Duration {}

impl Scalar for Duration {
    fn parse_scalar(raw: &str) -> Result<Self, ValueError> {
        parse_duration(raw).ok_or(ValueError::Syntax)
    }

    fn render_scalar(&self) -> String {
        format_duration(*self)
    }
}

/// A shared handle to a declared value's destination.
///
/// Returned by the declaration methods that allocate their own destination
/// instead of borrowing one from the caller.
pub struct ValueRef<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> ValueRef<T> {
    fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(initial)),
        }
    }
}

impl<T> Clone for ValueRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> ValueRef<T> {
    /// Read a copy of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

enum Slot<'a, T> {
    Borrowed(&'a mut T),
    Shared(Rc<RefCell<T>>),
}

impl<'a, T> Slot<'a, T> {
    fn write(&mut self, value: T) {
        match self {
            Slot::Borrowed(destination) => **destination = value,
            Slot::Shared(cell) => *cell.borrow_mut() = value,
        }
    }

    fn read<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        match self {
            Slot::Borrowed(destination) => read(destination),
            Slot::Shared(cell) => read(&cell.borrow()),
        }
    }
}

/// A scalar destination paired with an optional default and ordered checks.
///
/// `set` converts first and checks second, as separate steps: the destination
/// receives the converted value (or the kind's zero value, on conversion
/// failure) before any check runs, and a check rejection does not roll that
/// write back. Error messages rely on this, so the behaviour is part of the
/// contract rather than something to extend.
pub struct Checked<'a, T: Scalar> {
    slot: Slot<'a, T>,
    required: bool,
    checks: Vec<CheckFn<T>>,
}

impl<'a, T: Scalar> Checked<'a, T> {
    /// Bind a caller-owned destination.
    ///
    /// When `default` is `None` the value is required; otherwise the
    /// destination is pre-populated with the default before first use.
    pub fn new(destination: &'a mut T, default: Option<T>, checks: Vec<CheckFn<T>>) -> Self {
        Self::with_slot(Slot::Borrowed(destination), default, checks)
    }

    pub(crate) fn shared(default: Option<T>, checks: Vec<CheckFn<T>>) -> (Self, ValueRef<T>) {
        let handle = ValueRef::new(T::default());
        let checked = Self::with_slot(Slot::Shared(Rc::clone(&handle.inner)), default, checks);
        (checked, handle)
    }

    fn with_slot(mut slot: Slot<'a, T>, default: Option<T>, checks: Vec<CheckFn<T>>) -> Self {
        let required = match default {
            Some(value) => {
                slot.write(value);
                false
            }
            None => true,
        };

        Self {
            slot,
            required,
            checks,
        }
    }
}

impl<'a, T: Scalar> Value for Checked<'a, T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        match T::parse_scalar(raw) {
            Ok(value) => {
                let rejection = self.checks.iter().find_map(|check| check(&value).err());
                self.slot.write(value);

                match rejection {
                    Some(error) => Err(ValueError::Check(error)),
                    None => Ok(()),
                }
            }
            Err(error) => {
                self.slot.write(T::default());
                Err(error)
            }
        }
    }

    fn render(&self) -> String {
        self.slot.read(T::render_scalar)
    }

    fn required(&self) -> bool {
        self.required
    }
}

// Durations use the `1h30m0s` syntax: a sequence of decimal numbers, each with
// a unit suffix from {ns, us, µs, ms, s, m, h}. Fractions are allowed.
fn parse_duration(raw: &str) -> Option<Duration> {
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, after_number) = rest.split_at(number_end);
        let unit_end = after_number
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_number.len());
        let (unit, after_unit) = after_number.split_at(unit_end);
        rest = after_unit;

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return None,
        };

        let (integer, fraction) = match number.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (number, ""),
        };
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }

        if !integer.is_empty() {
            let integer: u128 = integer.parse().ok()?;
            total = total.checked_add(integer.checked_mul(scale)?)?;
        }
        if !fraction.is_empty() {
            if !fraction.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            let fraction: f64 = format!("0.{fraction}").parse().ok()?;
            total = total.checked_add((fraction * scale as f64) as u128)?;
        }
    }

    u64::try_from(total).ok().map(Duration::from_nanos)
}

fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos == 0 {
        return "0s".to_string();
    }

    if nanos < 1_000 {
        format!("{nanos}ns")
    } else if nanos < 1_000_000 {
        fraction_unit(nanos, 1_000, "µs")
    } else if nanos < 1_000_000_000 {
        fraction_unit(nanos, 1_000_000, "ms")
    } else {
        let hours = nanos / (3_600 * 1_000_000_000);
        let minutes = (nanos / (60 * 1_000_000_000)) % 60;
        let mut rendered = String::new();

        if hours > 0 {
            rendered.push_str(&format!("{hours}h"));
        }
        if hours > 0 || minutes > 0 {
            rendered.push_str(&format!("{minutes}m"));
        }
        rendered.push_str(&fraction_unit(
            nanos % (60 * 1_000_000_000),
            1_000_000_000,
            "s",
        ));

        rendered
    }
}

fn fraction_unit(nanos: u128, scale: u128, unit: &str) -> String {
    let integer = nanos / scale;
    let remainder = nanos % scale;

    if remainder == 0 {
        format!("{integer}{unit}")
    } else {
        let width = scale.ilog10() as usize;
        let mut fraction = format!("{remainder:0width$}");
        while fraction.ends_with('0') {
            fraction.pop();
        }
        format!("{integer}.{fraction}{unit}")
    }
}
