use std::time::Duration;

use crate::flag::FlagSet;
use crate::value::{CheckFn, Checked, Scalar, ValueRef};

impl<'a> FlagSet<'a> {
    /// Declare a flag of any scalar kind, writing the parsed value to
    /// `destination`.
    ///
    /// The destination is pre-populated with `default`, which is displayed by
    /// defaults printing unless it is the kind's zero value. Checks run in
    /// declaration order after conversion.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared on this flag set.
    pub fn checked_var<T: Scalar>(
        &mut self,
        destination: &'a mut T,
        name: impl Into<String>,
        default: T,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) {
        let show_default = default != T::default();
        self.register(
            Box::new(Checked::new(destination, Some(default), checks)),
            name,
            usage,
            show_default,
        );
    }

    /// Declare a flag of any scalar kind, returning a handle to the parsed
    /// value.
    ///
    /// Behaves as [`FlagSet::checked_var`] with an allocated destination.
    pub fn checked<T: Scalar + 'a>(
        &mut self,
        name: impl Into<String>,
        default: T,
        usage: impl Into<String>,
        checks: Vec<CheckFn<T>>,
    ) -> ValueRef<T> {
        let show_default = default != T::default();
        let (checked, handle) = Checked::shared(Some(default), checks);
        self.register(Box::new(checked), name, usage, show_default);
        handle
    }
}

macro_rules! flag_vars {
    ($({$kind:ty, $var_fn:ident, $fn:ident}),* $(,)?) => {
        impl<'a> FlagSet<'a> {
            $(
                #[doc = concat!("Declare a `", stringify!($kind), "` flag, writing the parsed value to `destination`.")]
                ///
                /// Behaves as [`FlagSet::checked_var`].
                pub fn $var_fn(
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
                /// Behaves as [`FlagSet::checked`].
                pub fn $fn(
                    &mut self,
                    name: impl Into<String>,
                    default: impl Into<$kind>,
                    usage: impl Into<String>,
                    checks: Vec<CheckFn<$kind>>,
                ) -> ValueRef<$kind> {
                    self.checked(name, default.into(), usage, checks)
                }
            )*
        }
    };
}

flag_vars!(
    {i32, int32_var, int32},
    {i64, int64_var, int64},
    {u32, uint32_var, uint32},
    {u64, uint64_var, uint64},
    {f64, float64_var, float64},
    {String, string_var, string},
    {Duration, duration_var, duration},
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ErrorHandling;

    #[test]
    fn typed_declarations() {
        // Setup
        let mut count: i32 = 0;
        let mut flags = FlagSet::new("program", ErrorHandling::Continue);
        flags.int32_var(&mut count, "count", 1, "repeat count", vec![]);
        let size = flags.uint64("size", 1024_u64, "buffer size", vec![]);
        let rate = flags.float64("rate", 0.5, "sample rate", vec![]);
        let wait = flags.duration("wait", Duration::from_secs(2), "startup delay", vec![]);

        // Execute
        flags
            .parse(
                ["-count", "3", "-size", "4096", "-rate", "0.25", "-wait", "1h30m"]
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            )
            .unwrap();

        // Verify
        assert_eq!(size.get(), 4096);
        assert_eq!(rate.get(), 0.25);
        assert_eq!(wait.get(), Duration::from_secs(5_400));
        drop(flags);
        assert_eq!(count, 3);
    }

    #[test]
    fn typed_defaults_text() {
        // Setup
        let mut flags = FlagSet::new("program", ErrorHandling::Continue);
        flags.duration("wait", Duration::from_secs(2), "startup delay", vec![]);
        flags.duration("grace", Duration::ZERO, "shutdown grace", vec![]);

        // Execute
        let rendered = flags.defaults_text();

        // Verify
        assert_eq!(
            rendered,
            "  -grace value\n    \tshutdown grace\n  -wait value\n    \tstartup delay (default 2s)\n"
        );
    }
}
