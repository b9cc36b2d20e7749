use formflow::Questionnaire;

fn main() {
    let mut q = Questionnaire::new("tour");
    q.set_master_list(["welcome", "household", "vehicles", "review"]);
    // only the unconditionally visible pages are shown at first
    q.set_items(["welcome", "review"]);
    q.set_active_item(Some("welcome")).expect("unknown page");
    println!("start:    {}", q.items_encoded());

    // answers make the middle pages relevant, in the wrong order
    q.append_item("vehicles", "household");
    q.append_item("household", "welcome");
    println!("expanded: {}", q.items_encoded());

    // a branch page opens a side conversation
    q.navigation_branch(vec!["claim".into(), "claimDetail".into()], "claim")
        .expect("empty branch");
    println!("branched: {} (depth {})", q.items_encoded(), q.branch_depth());

    q.navigation_return().expect("no open branch");
    println!("returned: {} (active {:?})", q.items_encoded(), q.active_item());

    // the household answers turn out not to matter after all
    q.remove_item("household");
    println!("trimmed:  {}", q.items_encoded());
}
