use super::*;

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("test date must exist")
}

fn iso(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format("%Y-%m-%d").to_string())
}

fn down(today: NaiveDate, input: &str) -> Option<String> {
    iso(SmartDateParser::new(today).parse(input))
}

fn up(today: NaiveDate, input: &str) -> Option<String> {
    let yesterday = today.pred_opt().expect("yesterday exists");
    iso(SmartDateParser::new(today).min(yesterday).parse(input))
}

fn biased(today: NaiveDate, input: &str, bias: PeriodBias) -> Option<String> {
    iso(SmartDateParser::new(today).bias(bias).parse(input))
}

fn some(text: &str) -> Option<String> {
    Some(text.to_string())
}

#[test]
fn rejects_garbage_and_empty_input() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, ""), None);
    assert_eq!(down(today, "   "), None);
    assert_eq!(down(today, "asdf"), None);
    assert_eq!(down(today, "0"), None);
    assert_eq!(down(today, "7a7"), None);
    assert_eq!(down(today, "+7"), None);
    assert_eq!(down(today, "26424"), None);
}

#[test]
fn full_dates_in_every_accepted_shape() {
    let today = ymd(2024, 4, 26);
    for input in ["26/04/2024", "26/4/2024", "26/04/24", "26/4/24", "260424"] {
        assert_eq!(down(today, input), some("2024-04-26"), "input {input}");
    }
    for input in [
        "03/06/2024",
        "03/6/2024",
        "3/06/2024",
        "3/6/2024",
        "03/06/24",
        "3/6/24",
        "030624",
    ] {
        assert_eq!(down(today, input), some("2024-06-03"), "input {input}");
    }
    for input in ["2024-04-09", "2024-4-09", "2024-04-9", "2024-4-9", "24-04-09", "24-4-9"] {
        assert_eq!(down(today, input), some("2024-04-09"), "input {input}");
    }
}

#[test]
fn full_dates_that_do_not_exist_fail() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "31/04/2024"), None);
    assert_eq!(down(today, "31/04/24"), None);
    assert_eq!(down(today, "310424"), None);
}

#[test]
fn two_digit_years_pivot_after_sixty() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "01/01/60"), some("2060-01-01"));
    assert_eq!(down(today, "01/01/61"), some("1961-01-01"));
}

#[test]
fn day_only_guesses_down_into_the_previous_month() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "32"), None);
    assert_eq!(down(today, "31"), some("2024-03-31"));
    assert_eq!(down(today, "30"), some("2024-03-30"));
    assert_eq!(down(today, "27"), some("2024-03-27"));
    assert_eq!(down(today, "26"), some("2024-04-26"));
    assert_eq!(down(today, "25"), some("2024-04-25"));
    assert_eq!(down(today, "2"), some("2024-04-02"));
    assert_eq!(down(today, "01"), some("2024-04-01"));
}

#[test]
fn day_only_does_not_cascade_past_short_months() {
    let today = ymd(2024, 3, 1);
    assert_eq!(down(today, "31"), None);
    assert_eq!(down(today, "30"), None);
    assert_eq!(down(today, "29"), some("2024-02-29"));
    assert_eq!(down(today, "1"), some("2024-03-01"));

    let today = ymd(2023, 2, 28);
    assert_eq!(down(today, "31"), some("2023-01-31"));
    assert_eq!(down(today, "29"), some("2023-01-29"));
    assert_eq!(down(today, "28"), some("2023-02-28"));
}

#[test]
fn day_only_wraps_across_the_year_boundary() {
    let today = ymd(2024, 1, 5);
    assert_eq!(down(today, "20"), some("2023-12-20"));
    let today = ymd(2024, 12, 20);
    assert_eq!(up(today, "5"), some("2025-01-05"));
}

#[test]
fn day_only_guesses_up_when_min_is_yesterday_or_later() {
    let today = ymd(2024, 4, 26);
    assert_eq!(up(today, "32"), None);
    assert_eq!(up(today, "31"), None);
    assert_eq!(up(today, "30"), some("2024-04-30"));
    assert_eq!(up(today, "27"), some("2024-04-27"));
    assert_eq!(up(today, "26"), some("2024-04-26"));
    assert_eq!(up(today, "25"), some("2024-05-25"));
    assert_eq!(up(today, "1"), some("2024-05-01"));
}

#[test]
fn older_min_keeps_guessing_down() {
    let today = ymd(2024, 4, 26);
    let parser = SmartDateParser::new(today).min(ymd(2024, 4, 24));
    assert_eq!(parser.direction(), GuessDirection::Down);
    assert_eq!(iso(parser.parse("27")), some("2024-03-27"));
    assert_eq!(
        SmartDateParser::new(today).min(ymd(2024, 4, 25)).direction(),
        GuessDirection::Up
    );
}

#[test]
fn min_hint_never_rejects_a_result() {
    let today = ymd(2024, 4, 26);
    let parser = SmartDateParser::new(today).min(ymd(2030, 1, 1));
    assert_eq!(iso(parser.parse("01/01/2020")), some("2020-01-01"));
}

#[test]
fn day_month_guesses_down_into_the_previous_year() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "31/04"), None);
    assert_eq!(down(today, "30/04"), some("2023-04-30"));
    assert_eq!(down(today, "27/04"), some("2023-04-27"));
    assert_eq!(down(today, "26/04"), some("2024-04-26"));
    assert_eq!(down(today, "25/04"), some("2024-04-25"));
    assert_eq!(down(today, "30/02"), None);
    assert_eq!(down(today, "29/02"), some("2024-02-29"));
    for input in ["01/02", "01/2", "1/02", "1/2", "0102"] {
        assert_eq!(down(today, input), some("2024-02-01"), "input {input}");
    }
    for input in ["012", "102", "10/15", "1015"] {
        assert_eq!(down(today, input), None, "input {input}");
    }

    let today = ymd(2023, 4, 26);
    assert_eq!(down(today, "29/02"), None);
    assert_eq!(down(today, "15/10"), some("2022-10-15"));
}

#[test]
fn day_month_guesses_up_into_the_next_year() {
    let today = ymd(2024, 4, 26);
    assert_eq!(up(today, "31/04"), None);
    assert_eq!(up(today, "30/04"), some("2024-04-30"));
    assert_eq!(up(today, "26/04"), some("2024-04-26"));
    assert_eq!(up(today, "25/04"), some("2025-04-25"));
    assert_eq!(up(today, "29/02"), None);
    assert_eq!(up(today, "28/02"), some("2025-02-28"));
    assert_eq!(up(today, "15/10"), some("2024-10-15"));
}

#[test]
fn today_and_yesterday_tokens() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "t"), some("2024-04-26"));
    assert_eq!(down(today, "T"), some("2024-04-26"));
    assert_eq!(down(today, "y"), some("2024-04-25"));
    let today = ymd(2024, 4, 1);
    assert_eq!(down(today, "Y"), some("2024-03-31"));
}

#[test]
fn partial_periods_need_a_bias() {
    let today = ymd(2024, 4, 26);
    assert_eq!(down(today, "2023-"), None);
    assert_eq!(down(today, "23-2"), None);

    for input in ["2023-", "23-"] {
        assert_eq!(biased(today, input, PeriodBias::Start), some("2023-01-01"));
        assert_eq!(biased(today, input, PeriodBias::End), some("2023-12-31"));
    }
    for input in ["2023-02", "23-02", "2023-2", "23-2"] {
        assert_eq!(biased(today, input, PeriodBias::Start), some("2023-02-01"));
        assert_eq!(biased(today, input, PeriodBias::End), some("2023-02-28"));
    }
    assert_eq!(biased(today, "2024-02", PeriodBias::End), some("2024-02-29"));
    assert_eq!(biased(today, "2024-12", PeriodBias::End), some("2024-12-31"));
    assert_eq!(biased(today, "223-", PeriodBias::End), None);
    assert_eq!(biased(today, "2023-13", PeriodBias::Start), None);
}

#[test]
fn month_first_order_swaps_day_and_month() {
    let today = ymd(2024, 4, 26);
    let parser = SmartDateParser::new(today).order(DateOrder::MonthFirst);
    assert_eq!(iso(parser.parse("06/03/2024")), some("2024-06-03"));
    assert_eq!(iso(parser.parse("060324")), some("2024-06-03"));
    assert_eq!(iso(parser.parse("4/25")), some("2024-04-25"));
    assert_eq!(iso(parser.parse("0425")), some("2024-04-25"));
    assert_eq!(iso(parser.parse("2024-06-03")), some("2024-06-03"));
    assert_eq!(iso(parser.parse("25/04")), None);
}

#[test]
fn free_function_matches_builder() {
    let today = ymd(2024, 4, 26);
    let min = Some(ymd(2024, 4, 25));
    assert_eq!(iso(smart_date_parse("25", today, min, None)), some("2024-05-25"));
    assert_eq!(iso(smart_date_parse("27", today, min, None)), some("2024-04-27"));
    assert_eq!(iso(smart_date_parse("31/04", today, None, None)), None);
}
