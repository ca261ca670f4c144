use std::time::Duration;

use crate::command::Command;
use crate::value::{CheckFn, Checked, Scalar, ValueRef};

impl<'a> Command<'a> {
    /// Declare a flag of any scalar kind, writing the parsed value to
    /// `destination`.
    ///
    /// Forwards to [`FlagSet::checked_var`](crate::FlagSet::checked_var) on
    /// this command's registry.
    pub fn checked_var<T: Scalar>(
        &mut self,
        destination: &'a mut T,
        name: impl Into<String>,
        default: T,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) {
        self.flags.checked_var(destination, name, default, usage, checks);
    }

    /// Declare a flag of any scalar kind, returning a handle to the parsed
    /// value.
    ///
    /// Forwards to [`FlagSet::checked`](crate::FlagSet::checked) on this
    /// command's registry.
    pub fn checked<T: Scalar + 'a>(
        &mut self,
        name: impl Into<String>,
        default: T,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) -> ValueRef<T> {
        self.flags.checked(name, default, usage, checks)
    }

    /// Declare a positional parameter of any scalar kind, writing the parsed
    /// value to `destination`.
    ///
    /// A `None` default makes the parameter required; otherwise the
    /// destination is pre-populated with the default, which is displayed in
    /// usage text. Checks run in declaration order after conversion.
    ///
    /// # Panics
    ///
    /// As [`Command::positional_var`].
    pub fn positional_checked_var<T: Scalar>(
        &mut self,
        destination: &'a mut T,
        name: impl Into<String>,
        default: Option<T>,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) {
        self.positional_var(Box::new(Checked::new(destination, default, checks)), name, usage);
    }

    /// Declare a positional parameter of any scalar kind, returning a handle
    /// to the parsed value.
    ///
    /// Behaves as [`Command::positional_checked_var`] with an allocated
    /// destination.
    pub fn positional_checked<T: Scalar + 'a>(
        &mut self,
        name: impl Into<String>,
        default: Option<T>,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) -> ValueRef<T> {
        let (checked, handle) = Checked::shared(default, checks);
        self.positional_var(Box::new(checked), name, usage);
        handle
    }
}

macro_rules! command_vars {
    ($({$kind:ty, $flag_var:ident, $flag:ident, $positional_var:ident, $positional:ident}),* $(,)?) => {
        impl<'a> Command<'a> {
            $(
                #[doc = concat!("Declare a `", stringify!($kind), "` flag, writing the parsed value to `destination`.")]
                ///
                /// Behaves as [`Command::checked_var`].
                pub fn $flag_var(
                    &mut self,
                    destination: &'a mut $kind,
                    name: impl Into<String>,
                    default: impl Into<$kind>,
                    usage: impl Into<String>,
                    checks: Vec<CheckFn<$kind>>,
                ) {
                    self.checked_var(destination, name, default.into(), usage, checks);
                }

                #[doc = concat!("Declare a `", stringify!($kind), "` flag, returning a handle to the parsed value.")]
                ///
                /// Behaves as [`Command::checked`].
                pub fn $flag(
                    &mut self,
                    name: impl Into<String>,
                    default: impl Into<$kind>,
                    usage: impl Into<String>,
                    checks: Vec<CheckFn<$kind>>,
                ) -> ValueRef<$kind> {
                    self.checked(name, default.into(), usage, checks)
                }

                #[doc = concat!("Declare a `", stringify!($kind), "` positional parameter, writing the parsed value to `destination`.")]
                ///
                /// A `None` default makes the parameter required.
                /// Behaves as [`Command::positional_checked_var`].
                pub fn $positional_var(
                    &mut self,
                    destination: &'a mut $kind,
                    name: impl Into<String>,
                    default: Option<$kind>,
                    usage: impl Into<String>,
                    checks: Vec<CheckFn<$kind>>,
                ) {
                    self.positional_checked_var(destination, name, default, usage, checks);
                }

                #[doc = concat!("Declare a `", stringify!($kind), "` positional parameter, returning a handle to the parsed value.")]
                ///
                /// A `None` default makes the parameter required.
                /// Behaves as [`Command::positional_checked`].
                pub fn $positional(
                    &mut self,
                    name: impl Into<String>,
                    default: Option<$kind>,
                    usage: impl Into<String>,
                    checks: Vec<CheckFn<$kind>>,
                ) -> ValueRef<$kind> {
                    self.positional_checked(name, default, usage, checks)
                }
            )*
        }
    };
}

command_vars!(
    {i32, int32_var, int32, positional_int32_var, positional_int32},
    {i64, int64_var, int64, positional_int64_var, positional_int64},
    {u32, uint32_var, uint32, positional_uint32_var, positional_uint32},
    {u64, uint64_var, uint64, positional_uint64_var, positional_uint64},
    {f64, float64_var, float64, positional_float64_var, positional_float64},
    {String, string_var, string, positional_string_var, positional_string},
    {Duration, duration_var, duration, positional_duration_var, positional_duration},
);
