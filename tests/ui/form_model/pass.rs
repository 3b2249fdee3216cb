use entryform::form::{Form, FormModel, ValueController};
use entryform::format::Format;

#[derive(Debug, PartialEq, entryform::form::FormModel)]
struct Contact {
    name: String,
    #[form(key = "phone_number")]
    phone: Option<String>,
}

fn main() {
    let name = ValueController::new(Some("Ada".to_string()), Format::string().required());
    let phone = ValueController::new(None, Format::string().trim().absent_when_empty());
    let form = Form::builder()
        .field("name", name)
        .field("phone_number", phone)
        .build()
        .expect("form builds");

    let contact: Contact = form.values().expect("values extract");
    assert_eq!(
        contact,
        Contact {
            name: "Ada".to_string(),
            phone: None,
        }
    );

    let patch = Contact {
        name: "Grace".to_string(),
        phone: Some("555".to_string()),
    }
    .into_patch();
    assert!(patch.contains("phone_number"));
    form.reset(patch).expect("reset applies");
    assert_eq!(form.optional_value::<String>("phone_number"), Ok(Some("555".to_string())));
}
