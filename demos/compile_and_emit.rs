use formflow::{compile, emit, Action, ApplicationMeta, Row, TableRow};

fn main() {
    // Lookup table with one gated entry
    let tables = vec![
        TableRow::table(1, "cover"),
        TableRow::entry(2, "basic").label("Basic cover"),
        TableRow::entry(3, "full").label("Full cover"),
        TableRow::entry(4, "gold")
            .label("Gold cover")
            .condition("loyal", "answer", None, Some("true")),
    ];

    // The questionnaire rows, as they would arrive from a spreadsheet
    let rows = vec![
        Row::element(10, 1, "start", "Page").pre_label("About you"),
        Row::element(11, 1, "loyal", "Question")
            .field_type("boolean")
            .pre_label("Are you an existing customer?"),
        Row::element(12, 1, "cover", "MultipleChoiceQuestion")
            .required("Yes")
            .pre_label("Choose your cover")
            .lookup_table("cover"),
        Row::element(20, 1, "payment", "Page")
            .condition("cover", "answer", Some("is not"), None),
        Row::element(21, 1, "card", "Question").pre_label("Card number"),
        Row::element(22, 2, "cardCheck", "Validation")
            .pre_label("That does not look like a card number")
            .condition("card", "length", Some("<"), Some("12")),
    ];

    let meta = ApplicationMeta::new("quote", "Quick Quote").completion_action("#finish");
    let mut app = compile(meta, &tables, &rows).expect("failed to compile questionnaire");

    println!(
        "{} pages, initial item list {:?}\n",
        app.pages().len(),
        app.page_item_list().expect("no visible pages")
    );

    let directives = emit(&mut app).expect("failed to emit directives");
    for directive in &directives {
        match &directive.action {
            Action::CreateElement { runtime_type, spec } => {
                let guard = match &directive.trigger {
                    Some(t) if t.condition.is_some() => " (conditional)",
                    Some(_) => " (grouped)",
                    None => "",
                };
                println!("create {runtime_type} \"{}\"{guard}", spec.id);
            }
            Action::IncludeOption {
                question, option, ..
            } => {
                println!(
                    "include option {:?} on \"{question}\"",
                    option.value.as_deref().unwrap_or("null")
                );
            }
            Action::ExcludeOption { question, value } => {
                println!("exclude option {value:?} on \"{question}\"");
            }
            Action::FlagInvalid { question, message } => {
                println!("flag \"{question}\": {message}");
            }
            other => println!("{other:?}"),
        }
    }
}
