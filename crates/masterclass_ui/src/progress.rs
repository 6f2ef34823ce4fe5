//! Progress
//!
//! Purely derived display of a value within a range. `None` means
//! indeterminate, in which case `aria-valuenow` is omitted rather than
//! reported as zero.

use masterclass_core::{Attributes, NumericRange, PrimitiveError};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressProps {
    pub value: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl Default for ProgressProps {
    fn default() -> Self {
        Self {
            value: None,
            min: 0.0,
            max: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    value: Option<f64>,
    range: NumericRange,
}

impl Progress {
    pub fn new(props: ProgressProps) -> Result<Self, PrimitiveError> {
        Ok(Self {
            value: props.value,
            range: NumericRange::new(props.min, props.max, 1.0)?,
        })
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: Option<f64>) {
        self.value = value;
    }

    pub fn is_indeterminate(&self) -> bool {
        self.value.is_none()
    }

    /// Whole-number percentage, `None` while indeterminate
    pub fn percentage(&self) -> Option<f64> {
        self.value.map(|v| self.range.percent(v).round())
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("progressbar")
            .set("aria-valuemin", self.range.min())
            .set("aria-valuemax", self.range.max())
            .set_opt("aria-valuenow", self.value)
            .set(
                "data-state",
                if self.is_indeterminate() {
                    "indeterminate"
                } else {
                    "determinate"
                },
            )
    }

    /// Fill element; its width tracks the percentage
    pub fn indicator_attrs(&self) -> Attributes {
        Attributes::new()
            .set_opt("style", self.percentage().map(|p| format!("width: {p}%")))
            .set(
                "data-state",
                if self.is_indeterminate() {
                    "indeterminate"
                } else {
                    "determinate"
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds() {
        let progress = Progress::new(ProgressProps {
            value: Some(1.0),
            min: 0.0,
            max: 3.0,
        })
        .unwrap();
        assert_eq!(progress.percentage(), Some(33.0));

        let progress = Progress::new(ProgressProps {
            value: Some(15.0),
            min: 10.0,
            max: 20.0,
        })
        .unwrap();
        assert_eq!(progress.percentage(), Some(50.0));
        assert_eq!(progress.indicator_attrs().get("style"), Some("width: 50%"));
    }

    #[test]
    fn test_indeterminate_omits_valuenow() {
        let progress = Progress::new(ProgressProps::default()).unwrap();
        let attrs = progress.attrs();
        assert!(!attrs.has("aria-valuenow"));
        assert_eq!(attrs.get("data-state"), Some("indeterminate"));
        assert!(!progress.indicator_attrs().has("style"));
    }

    #[test]
    fn test_zero_is_reported() {
        let progress = Progress::new(ProgressProps {
            value: Some(0.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(progress.attrs().get("aria-valuenow"), Some("0"));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = Progress::new(ProgressProps {
            value: None,
            min: 10.0,
            max: 0.0,
        })
        .unwrap_err();
        assert!(matches!(err, PrimitiveError::InvalidRange { .. }));
    }
}
