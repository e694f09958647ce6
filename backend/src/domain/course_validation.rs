//! Write-side course validation.
//!
//! Every field is checked independently and all failures are reported
//! together; a field stops at its first failure. The `(title, price)`
//! uniqueness rule spans two fields, so it runs once both are individually
//! well formed. Nothing is persisted unless the whole payload passes.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::course::{CourseTitle, MAX_TEXT_LEN, MIN_COURSE_PRICE, MIN_TITLE_LEN, NewCourse, Price};
use super::category::CategoryId;
use super::error::{Error, FieldErrors};
use super::ports::Sanitizer;

/// Message returned with every rejected write.
pub const REJECTED_WRITE_MESSAGE: &str = "data cannot be saved";
/// Key used for violations that span several fields.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Raw value of one payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput<T> {
    /// The field was absent or null.
    Missing,
    /// The field was present but could not be read as `T`.
    Malformed,
    /// The field held a usable value.
    Present(T),
}

impl<T> FieldInput<T> {
    /// Wrap an optional value that needed no parsing.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

/// Course write payload after transport decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    /// Raw title before trimming and sanitisation.
    pub title: FieldInput<String>,
    /// Submitted instructor, blank when absent.
    pub instructor: Option<String>,
    /// Base price.
    pub price: FieldInput<Decimal>,
    /// Referenced category.
    pub category_id: FieldInput<i64>,
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// Absent or null.
    Required,
    /// Wrong type or shape.
    Invalid,
    /// Numeric value below its floor.
    OutOfRange,
    /// Shorter than the minimum length.
    TooShort,
    /// Longer than the maximum length.
    TooLong,
    /// Another record already holds the value.
    DuplicateValue,
    /// Another record already holds the field combination.
    DuplicateCombination,
    /// Referenced record does not exist.
    UnknownReference,
}

/// One rejected field with its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    field: &'static str,
    reason: ViolationReason,
    message: String,
}

impl FieldViolation {
    /// Violation of `field` with a custom message.
    pub fn new(field: &'static str, reason: ViolationReason, message: impl Into<String>) -> Self {
        Self {
            field,
            reason,
            message: message.into(),
        }
    }

    /// `field` was missing.
    pub fn required(field: &'static str) -> Self {
        Self::new(field, ViolationReason::Required, "This field is required.")
    }

    /// The title is already taken.
    pub fn duplicate_title() -> Self {
        Self::new(
            "title",
            ViolationReason::DuplicateValue,
            "course with this title already exists.",
        )
    }

    /// The title and price pair is already taken.
    pub fn duplicate_combination() -> Self {
        Self::new(
            NON_FIELD_ERRORS,
            ViolationReason::DuplicateCombination,
            "The fields title, price must make a unique set.",
        )
    }

    /// Category `id` does not exist.
    pub fn unknown_category(id: i64) -> Self {
        Self::new(
            "category_id",
            ViolationReason::UnknownReference,
            format!("Category with id {id} does not exist."),
        )
    }

    /// Rejected field, or [`NON_FIELD_ERRORS`].
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Category of failure.
    pub fn reason(&self) -> ViolationReason {
        self.reason
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Rejected write carrying every violation found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("data cannot be saved")]
pub struct ValidationFailure {
    violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    /// Failure carrying `violations`.
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Violations in discovery order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Reasons recorded against `field`.
    pub fn reasons_for(&self, field: &str) -> Vec<ViolationReason> {
        self.violations
            .iter()
            .filter(|violation| violation.field == field)
            .map(FieldViolation::reason)
            .collect()
    }

    /// Messages grouped by field.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors: FieldErrors = BTreeMap::new();
        for violation in &self.violations {
            errors
                .entry(violation.field.to_owned())
                .or_default()
                .push(violation.message.clone());
        }
        errors
    }
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::invalid_request(REJECTED_WRITE_MESSAGE).with_field_errors(failure.field_errors())
    }
}

/// Fields that passed local checks, waiting on store lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedCourse {
    /// Sanitised title, if valid.
    pub title: Option<CourseTitle>,
    /// Instructor, possibly empty.
    pub instructor: String,
    /// Price, if valid.
    pub price: Option<Price>,
    /// Category reference, if well formed.
    pub category_id: Option<CategoryId>,
}

impl CheckedCourse {
    /// Finished course when every field is present.
    pub fn complete(self) -> Option<NewCourse> {
        Some(NewCourse {
            title: self.title?,
            instructor: self.instructor,
            price: self.price?,
            category_id: self.category_id?,
        })
    }
}

/// Local course checks plus the title normalisation shared by writes.
pub struct CourseValidator<'a> {
    sanitizer: &'a dyn Sanitizer,
}

impl<'a> CourseValidator<'a> {
    /// Validator cleaning titles with `sanitizer`.
    pub fn new(sanitizer: &'a dyn Sanitizer) -> Self {
        Self { sanitizer }
    }

    /// Check every field that needs no store lookup.
    ///
    /// Returns the fields that passed alongside the violations found, so
    /// callers can continue with store checks on the valid subset.
    pub fn check_local(&self, draft: &CourseDraft) -> (CheckedCourse, Vec<FieldViolation>) {
        let mut violations = Vec::new();

        let title = match self.validate_title(&draft.title) {
            Ok(title) => Some(title),
            Err(violation) => {
                violations.push(violation);
                None
            }
        };
        let instructor = match validate_instructor(draft.instructor.as_deref()) {
            Ok(instructor) => instructor,
            Err(violation) => {
                violations.push(violation);
                String::new()
            }
        };
        let price = match validate_price(&draft.price) {
            Ok(price) => Some(price),
            Err(violation) => {
                violations.push(violation);
                None
            }
        };
        let category_id = match validate_category_id(&draft.category_id) {
            Ok(id) => Some(id),
            Err(violation) => {
                violations.push(violation);
                None
            }
        };

        (
            CheckedCourse {
                title,
                instructor,
                price,
                category_id,
            },
            violations,
        )
    }

    /// Length rules on the raw title, then sanitisation.
    ///
    /// # Examples
    /// ```
    /// use course_catalogue::domain::{CourseValidator, FieldInput};
    /// use course_catalogue::outbound::markup::MarkupCleaner;
    ///
    /// let cleaner = MarkupCleaner::new();
    /// let validator = CourseValidator::new(&cleaner);
    /// let title = validator
    ///     .validate_title(&FieldInput::Present("<b>Rust</b> <blink>in depth</blink>".into()))
    ///     .unwrap();
    /// assert_eq!(title.as_str(), "<b>Rust</b> in depth");
    /// ```
    pub fn validate_title(&self, input: &FieldInput<String>) -> Result<CourseTitle, FieldViolation> {
        let raw = match input {
            FieldInput::Present(raw) => raw.trim(),
            FieldInput::Missing => return Err(FieldViolation::required("title")),
            FieldInput::Malformed => {
                return Err(FieldViolation::new(
                    "title",
                    ViolationReason::Invalid,
                    "Not a valid string.",
                ));
            }
        };
        if raw.is_empty() {
            return Err(FieldViolation::new(
                "title",
                ViolationReason::Required,
                "This field may not be blank.",
            ));
        }
        let length = raw.chars().count();
        if length < MIN_TITLE_LEN {
            return Err(FieldViolation::new(
                "title",
                ViolationReason::TooShort,
                format!("Title must be at least {MIN_TITLE_LEN} characters"),
            ));
        }
        if length > MAX_TEXT_LEN {
            return Err(too_long("title"));
        }
        Ok(CourseTitle::from_sanitised(self.sanitizer.clean(raw)))
    }
}

fn too_long(field: &'static str) -> FieldViolation {
    FieldViolation::new(
        field,
        ViolationReason::TooLong,
        format!("Ensure this field has no more than {MAX_TEXT_LEN} characters."),
    )
}

fn validate_instructor(input: Option<&str>) -> Result<String, FieldViolation> {
    let instructor = input.map(str::trim).unwrap_or_default();
    if instructor.chars().count() > MAX_TEXT_LEN {
        return Err(too_long("instructor"));
    }
    Ok(instructor.to_owned())
}

fn validate_price(input: &FieldInput<Decimal>) -> Result<Price, FieldViolation> {
    let amount = match input {
        FieldInput::Present(amount) => *amount,
        FieldInput::Missing => return Err(FieldViolation::required("price")),
        FieldInput::Malformed => {
            return Err(FieldViolation::new(
                "price",
                ViolationReason::Invalid,
                "A valid number is required.",
            ));
        }
    };
    if amount < MIN_COURSE_PRICE {
        return Err(FieldViolation::new(
            "price",
            ViolationReason::OutOfRange,
            format!("Price cannot be less than {MIN_COURSE_PRICE}"),
        ));
    }
    Ok(Price::new(amount.normalize()))
}

fn validate_category_id(input: &FieldInput<i64>) -> Result<CategoryId, FieldViolation> {
    match input {
        FieldInput::Present(id) if *id > 0 => Ok(CategoryId::new(*id)),
        FieldInput::Present(id) => Err(FieldViolation::unknown_category(*id)),
        FieldInput::Missing => Err(FieldViolation::required("category_id")),
        FieldInput::Malformed => Err(FieldViolation::new(
            "category_id",
            ViolationReason::Invalid,
            "Incorrect type. Expected pk value.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureSanitizer, MockSanitizer};
    use rstest::rstest;
    use std::str::FromStr;

    fn draft(title: &str, price: &str, category: i64) -> CourseDraft {
        CourseDraft {
            title: FieldInput::Present(title.to_owned()),
            instructor: Some("Mario".to_owned()),
            price: FieldInput::Present(Decimal::from_str(price).expect("decimal")),
            category_id: FieldInput::Present(category),
        }
    }

    #[rstest]
    fn accepts_a_complete_payload() {
        let validator = CourseValidator::new(&FixtureSanitizer);
        let (checked, violations) = validator.check_local(&draft("Intro to Rust", "10", 1));
        assert!(violations.is_empty());
        let course = checked.complete().expect("complete");
        assert_eq!(course.title.as_str(), "Intro to Rust");
        assert_eq!(course.price.amount(), Decimal::TEN);
        assert_eq!(course.instructor, "Mario");
    }

    #[rstest]
    #[case("9", ViolationReason::OutOfRange)]
    #[case("9.99", ViolationReason::OutOfRange)]
    #[case("-1", ViolationReason::OutOfRange)]
    fn rejects_prices_below_the_floor(#[case] price: &str, #[case] reason: ViolationReason) {
        let validator = CourseValidator::new(&FixtureSanitizer);
        let (_, violations) = validator.check_local(&draft("Intro to Rust", price, 1));
        let failure = ValidationFailure::new(violations);
        assert_eq!(failure.reasons_for("price"), vec![reason]);
    }

    #[rstest]
    #[case("10")]
    #[case("2000000000")]
    #[case("79228162514264337593543950335")]
    fn accepts_any_price_from_the_floor_up(#[case] price: &str) {
        let validator = CourseValidator::new(&FixtureSanitizer);
        let (checked, violations) = validator.check_local(&draft("Intro to Rust", price, 1));
        assert!(violations.is_empty(), "{price} rejected: {violations:?}");
        let course = checked.complete().expect("complete");
        assert_eq!(course.price.amount(), Decimal::from_str(price).expect("decimal"));
    }

    #[rstest]
    fn collects_every_failing_field() {
        let validator = CourseValidator::new(&FixtureSanitizer);
        let (checked, violations) = validator.check_local(&CourseDraft {
            title: FieldInput::Present("short".to_owned()),
            instructor: None,
            price: FieldInput::Malformed,
            category_id: FieldInput::Missing,
        });
        let failure = ValidationFailure::new(violations);
        assert_eq!(failure.reasons_for("title"), vec![ViolationReason::TooShort]);
        assert_eq!(failure.reasons_for("price"), vec![ViolationReason::Invalid]);
        assert_eq!(
            failure.reasons_for("category_id"),
            vec![ViolationReason::Required]
        );
        assert!(checked.complete().is_none());

        let errors = failure.field_errors();
        assert_eq!(
            errors.get("title").map(Vec::as_slice),
            Some(["Title must be at least 10 characters".to_owned()].as_slice())
        );
    }

    #[rstest]
    #[case(FieldInput::Missing, ViolationReason::Required)]
    #[case(FieldInput::Present("          ".to_owned()), ViolationReason::Required)]
    #[case(FieldInput::Present("x".repeat(121)), ViolationReason::TooLong)]
    #[case(FieldInput::Malformed, ViolationReason::Invalid)]
    fn title_rules(#[case] input: FieldInput<String>, #[case] reason: ViolationReason) {
        let validator = CourseValidator::new(&FixtureSanitizer);
        let violation = validator.validate_title(&input).expect_err("invalid title");
        assert_eq!(violation.reason(), reason);
    }

    #[rstest]
    fn title_is_sanitised_after_length_checks() {
        let mut sanitizer = MockSanitizer::new();
        sanitizer
            .expect_clean()
            .withf(|raw: &str| raw == "Rust <script>x</script>")
            .times(1)
            .returning(|_| "Rust x".to_owned());
        let validator = CourseValidator::new(&sanitizer);
        let title = validator
            .validate_title(&FieldInput::Present("  Rust <script>x</script>  ".to_owned()))
            .expect("valid title");
        assert_eq!(title.as_str(), "Rust x");
    }

    #[rstest]
    fn rejected_writes_map_to_invalid_request() {
        let failure = ValidationFailure::new(vec![
            FieldViolation::duplicate_combination(),
            FieldViolation::unknown_category(4),
        ]);
        let err: Error = failure.into();
        assert_eq!(err.message(), REJECTED_WRITE_MESSAGE);
        let errors = err.field_errors().expect("field errors");
        assert!(errors.contains_key(NON_FIELD_ERRORS));
        assert_eq!(
            errors.get("category_id"),
            Some(&vec!["Category with id 4 does not exist.".to_owned()])
        );
    }
}
