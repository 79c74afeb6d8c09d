use super::*;

fn complete() -> StudentFields {
    StudentFields::default()
        .with(FieldName::Name, "Ann")
        .with(FieldName::DateOfBirth, "2010-01-01")
        .with(FieldName::Sex, "F")
        .with(FieldName::Languages, "English")
        .with(FieldName::Country, "Ireland")
        .with(FieldName::Hobbies, "Chess")
}

#[test]
fn complete_fields_are_valid_for_both_passes() {
    assert_eq!(validate(&complete()), ValidationResult::Valid);
    assert_eq!(validate_submission(&complete()), ValidationResult::Valid);
}

#[test]
fn minimal_create_fields_pass_without_optional_attributes() {
    let fields = StudentFields::default()
        .with(FieldName::Name, "Ann")
        .with(FieldName::DateOfBirth, "2010-01-01")
        .with(FieldName::Hobbies, "Chess");
    assert!(validate(&fields).is_valid());
}

#[test]
fn hobbies_outranks_name_and_date_of_birth() {
    let result = validate(&StudentFields::default());
    let primary = result.primary().expect("primary error");
    assert_eq!(primary.field, FieldName::Hobbies);
    assert_eq!(primary.message, HOBBIES_REQUIRED);

    let fields: Vec<_> = result.errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, REQUIRED_FIELDS.to_vec());
}

#[test]
fn reports_first_missing_field_in_priority_order() {
    let missing_name = complete().with(FieldName::Name, "");
    assert_eq!(
        validate(&missing_name).primary().map(|e| e.message.as_str()),
        Some(NAME_REQUIRED)
    );

    let missing_dob = complete().with(FieldName::DateOfBirth, "");
    assert_eq!(
        validate(&missing_dob).primary().map(|e| e.message.as_str()),
        Some(DOB_REQUIRED)
    );

    let missing_name_and_dob = missing_name.with(FieldName::DateOfBirth, "");
    assert_eq!(
        validate(&missing_name_and_dob).primary().map(|e| e.field),
        Some(FieldName::Name)
    );
}

#[test]
fn rejects_malformed_dates() {
    let fields = complete().with(FieldName::DateOfBirth, "01/02/2010");
    assert_eq!(
        validate(&fields).message_for(FieldName::DateOfBirth),
        Some(DOB_INVALID)
    );
    let fields = complete().with(FieldName::DateOfBirth, "2010-02-30");
    assert!(!validate(&fields).is_valid());
}

#[test]
fn rejects_dates_with_surrounding_whitespace() {
    let fields = complete().with(FieldName::DateOfBirth, " 2010-01-01 ");
    assert_eq!(
        validate(&fields).message_for(FieldName::DateOfBirth),
        Some(DOB_INVALID)
    );
}

#[test]
fn create_pass_ignores_optional_fields() {
    let fields = complete()
        .with(FieldName::Sex, "")
        .with(FieldName::Country, "   ");
    assert!(validate(&fields).is_valid());
}

#[test]
fn submission_pass_visits_every_field_without_short_circuit() {
    let fields = complete()
        .with(FieldName::Hobbies, "")
        .with(FieldName::Sex, "  ")
        .with(FieldName::Country, "");
    let result = validate_submission(&fields);
    let flagged: Vec<_> = result.errors().iter().map(|e| e.field).collect();
    assert_eq!(
        flagged,
        vec![FieldName::Hobbies, FieldName::Sex, FieldName::Country]
    );
    assert_eq!(result.message_for(FieldName::Sex), Some(FIELD_EMPTY));
    assert_eq!(result.message_for(FieldName::Languages), None);
}

#[test]
fn state_flags_failures_and_clears_fixed_fields() {
    let mut state = ValidationState::default();
    let broken = complete().with(FieldName::Name, "").with(FieldName::Sex, "");
    state.record(&validate_submission(&broken), &FieldName::ALL);
    assert!(state.is_flagged(FieldName::Name));
    assert!(state.is_flagged(FieldName::Sex));
    assert_eq!(state.status(FieldName::Country), Some(&FieldStatus::Valid));

    state.record(&validate_submission(&complete()), &FieldName::ALL);
    assert_eq!(state.flagged().count(), 0);
    assert_eq!(state.status(FieldName::Name), Some(&FieldStatus::Valid));
}

#[test]
fn state_only_touches_visited_fields() {
    let mut state = ValidationState::default();
    state.record(
        &validate_submission(&complete().with(FieldName::Sex, "")),
        &FieldName::ALL,
    );
    state.record(&validate(&complete()), &REQUIRED_FIELDS);
    assert!(state.is_flagged(FieldName::Sex));
}
