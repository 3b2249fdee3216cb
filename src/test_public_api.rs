use chrono::NaiveDate;

#[derive(Debug, PartialEq, crate::form::FormModel)]
struct Signup {
    email: String,
    age: Option<f64>,
    starts: NaiveDate,
}

#[test]
fn prelude_covers_a_whole_form() {
    use crate::prelude::*;

    let today = NaiveDate::from_ymd_opt(2024, 4, 26).expect("valid date");
    let email = ValueController::new(None, Format::string().trim().email().required());
    let age = ValueController::new(None, Format::number().positive());
    let starts = ValueController::new(
        None,
        Format::date_with(DateOptions::default().clock(FixedClock(today)))
            .min_today()
            .required(),
    );
    let form = Form::builder()
        .field("email", email.clone())
        .field("age", age.clone())
        .field("starts", starts.clone())
        .build()
        .expect("form builds");

    let mut email_input = TextBinding::new(email).expect("email binding");
    email_input.input(" a@b.io ");
    email_input.blur().expect("email blur");
    assert_eq!(email_input.text(), "a@b.io");

    let mut starts_input = TextBinding::new(starts).expect("starts binding");
    starts_input.input("25");
    starts_input.blur().expect("starts blur");
    assert_eq!(starts_input.text(), "25/05/2024");

    assert_eq!(
        form.values::<Signup>().expect("values"),
        Signup {
            email: "a@b.io".to_string(),
            age: None,
            starts: NaiveDate::from_ymd_opt(2024, 5, 25).expect("valid date"),
        }
    );
}

#[test]
fn root_reexports_resolve() {
    let today = NaiveDate::from_ymd_opt(2024, 4, 26).expect("valid date");
    assert_eq!(
        crate::smart_date_parse("t", today, None, None),
        Some(today)
    );
    let parsed: crate::ParseResult<f64, String> = crate::Format::number().parse("1".into());
    assert_eq!(parsed.parsed, Some(1.0));
}
