//! Common checks for flag and positional parameter values.
//!
//! Each function produces a [`CheckFn`] to be passed at declaration time.
//! Checks run in declaration order after a successful conversion, and the
//! first rejection wins.

use std::fmt::Display;

use crate::value::{CheckError, CheckFn};

/// Check that a value is greater than a given minimum.
pub fn greater_than<T>(min: T) -> CheckFn<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |value| {
        if *value > min {
            Ok(())
        } else {
            Err(CheckError::new(format!("must be greater than {min}")))
        }
    })
}

/// Check that a value is less than a given maximum.
pub fn less_than<T>(max: T) -> CheckFn<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |value| {
        if *value < max {
            Ok(())
        } else {
            Err(CheckError::new(format!("must be less than {max}")))
        }
    })
}

/// Check that a value is greater than or equal to a given minimum.
pub fn at_least<T>(min: T) -> CheckFn<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |value| {
        if *value >= min {
            Ok(())
        } else {
            Err(CheckError::new(format!("must be at least {min}")))
        }
    })
}

/// Check that a value is less than or equal to a given maximum.
pub fn at_most<T>(max: T) -> CheckFn<T>
where
    T: PartialOrd + Display + 'static,
{
    Box::new(move |value| {
        if *value <= max {
            Ok(())
        } else {
            Err(CheckError::new(format!("must be at most {max}")))
        }
    })
}

/// Check that a value is present in a given list of allowed options.
pub fn one_of<T, O>(options: Vec<O>) -> CheckFn<T>
where
    T: PartialEq + Display + 'static,
    O: Into<T>,
{
    let options: Vec<T> = options.into_iter().map(Into::into).collect();

    Box::new(move |value| {
        if options.contains(value) {
            Ok(())
        } else {
            let allowed = options
                .iter()
                .map(T::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            Err(CheckError::new(format!("must be one of [{allowed}]")))
        }
    })
}

/// Check that a string contains at least one non-white-space character.
pub fn not_blank() -> CheckFn<String> {
    Box::new(|value| {
        if value.trim().is_empty() {
            Err(CheckError::new("cannot be blank"))
        } else {
            Ok(())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(151, None)]
    #[case(150, Some("must be greater than 150"))]
    #[case(149, Some("must be greater than 150"))]
    fn greater_than_check(#[case] value: i64, #[case] expected: Option<&str>) {
        let check = greater_than(150);
        assert_eq!(
            check(&value).err().map(|error| error.to_string()),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case(149, None)]
    #[case(150, Some("must be less than 150"))]
    #[case(151, Some("must be less than 150"))]
    fn less_than_check(#[case] value: i64, #[case] expected: Option<&str>) {
        let check = less_than(150);
        assert_eq!(
            check(&value).err().map(|error| error.to_string()),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case(151, None)]
    #[case(150, None)]
    #[case(149, Some("must be at least 150"))]
    fn at_least_check(#[case] value: i64, #[case] expected: Option<&str>) {
        let check = at_least(150);
        assert_eq!(
            check(&value).err().map(|error| error.to_string()),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case(149, None)]
    #[case(150, None)]
    #[case(151, Some("must be at most 150"))]
    fn at_most_check(#[case] value: i64, #[case] expected: Option<&str>) {
        let check = at_most(150);
        assert_eq!(
            check(&value).err().map(|error| error.to_string()),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn one_of_check() {
        let check: CheckFn<String> = one_of(vec!["extended", "super"]);

        assert_eq!(check(&"super".to_string()), Ok(()));
        assert_eq!(
            check(&"brown".to_string()).unwrap_err().to_string(),
            "must be one of [extended super]"
        );
    }

    #[test]
    fn one_of_numeric_check() {
        let check = one_of(vec![150, 250]);

        assert_eq!(check(&250), Ok(()));
        assert_eq!(
            check(&350).unwrap_err().to_string(),
            "must be one of [150 250]"
        );
    }

    #[test]
    fn not_blank_check() {
        let check = not_blank();

        assert_eq!(check(&"super".to_string()), Ok(()));
        assert_eq!(
            check(&"  \t ".to_string()).unwrap_err().to_string(),
            "cannot be blank"
        );
    }
}
