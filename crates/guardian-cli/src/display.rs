//! Plain-text rendering of views.

use guardian_core::models::{Carrier, Client, Policy};
use guardian_core::renewals::{RenewalWindow, StatusTag};
use guardian_core::utils::{format_date, truncate};
use guardian_core::views::{ClientDetails, Dashboard, DashboardTab, PolicyFormOptions, PolicyRow};

fn tag_marker(tag: StatusTag) -> &'static str {
    match tag {
        StatusTag::Positive => "+",
        StatusTag::Warning => "!",
        StatusTag::Negative => "x",
        StatusTag::Neutral => " ",
    }
}

fn policy_table(rows: &[PolicyRow]) {
    if rows.is_empty() {
        println!("  No policies found.");
        return;
    }
    println!(
        "  {:<5} {:<14} {:<22} {:<18} {:>12}  {:<13} {}",
        "ID", "Policy #", "Client", "Type", "Premium", "Renewal", "Status"
    );
    for row in rows {
        let flag = if row.highlight { "*" } else { " " };
        println!(
            "{} {:<5} {:<14} {:<22} {:<18} {:>12}  {:<13} {} {}",
            flag,
            row.id,
            truncate(&row.policy_number, 14),
            truncate(&row.client_name, 22),
            truncate(&row.policy_type, 18),
            row.premium,
            row.renewal_date,
            tag_marker(row.tag),
            row.status,
        );
    }
}

pub fn dashboard(greeting: &str, view: &Dashboard, tab: DashboardTab) {
    println!("{}\n", greeting);
    let upcoming = view.upcoming().len();
    println!(
        "Policies: {}   Renewals in the next 30 days: {}   Renewal alerts today: {}\n",
        view.policies().len(),
        upcoming,
        view.alert_count()
    );
    match tab {
        DashboardTab::All => println!("All policies (* renews within 30 days)"),
        DashboardTab::Upcoming => println!("Upcoming renewals (next 30 days)"),
    }
    policy_table(&view.rows(tab));
}

pub fn alerts(windows: &[RenewalWindow<'_>]) {
    if windows.is_empty() {
        println!("No renewal alerts today.");
        return;
    }
    for window in windows {
        let policy = window.policy;
        println!(
            "{} days: {} ({}) for {}, renews {}",
            window.days_until_renewal,
            policy.policy_number,
            policy.policy_type_display(),
            policy.client_name(),
            policy.renewal_date.as_deref().map(format_date).unwrap_or_default(),
        );
    }
}

pub fn clients(clients: &[&Client]) {
    if clients.is_empty() {
        println!("No clients found.");
        return;
    }
    println!("  {:<5} {:<24} {:<28} {:<16} {}", "ID", "Name", "Email", "Phone", "Policies");
    for client in clients {
        println!(
            "  {:<5} {:<24} {:<28} {:<16} {}",
            client.id,
            truncate(client.display_name(), 24),
            truncate(&client.email, 28),
            client.phone_display(),
            client.total_policies,
        );
    }
}

fn client_card(client: &Client) {
    println!("{} (#{})", client.display_name(), client.id);
    println!("  Email:   {}", if client.email.is_empty() { "-" } else { client.email.as_str() });
    println!("  Phone:   {}", client.phone_display());
    println!(
        "  Age:     {}",
        client.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
    );
    println!("  Gender:  {}", client.gender_display());
    if !client.address.is_empty() {
        println!("  Address: {}", client.address);
    }
}

pub fn client_details(details: &ClientDetails) {
    client_card(&details.client);
    println!(
        "\nPolicies ({}), total premium {}",
        details.policies.len(),
        details.total_premium()
    );
    for policy in &details.policies {
        println!(
            "  {} {:<14} {:<18} {:>12}  renews {}  {}",
            tag_marker(policy.status_tag()),
            policy.policy_number,
            policy.policy_type_display(),
            policy.premium_display(),
            policy.renewal_date.as_deref().map(format_date).unwrap_or_else(|| "-".to_string()),
            policy.status.label(),
        );
    }
}

pub fn policy(policy: &Policy) {
    let date = |d: &Option<String>| d.as_deref().map(format_date).unwrap_or_else(|| "-".to_string());
    println!("Policy {} (#{})", policy.policy_number, policy.id);
    println!("  Client:      {}", policy.client_name());
    println!("  Carrier:     {}", policy.carrier_name());
    println!("  Type:        {}", policy.policy_type_display());
    println!("  Status:      {} {}", tag_marker(policy.status_tag()), policy.status.label());
    println!("  Premium:     {}", policy.premium_display());
    println!("  Sum insured: {}", policy.sum_insured_display());
    println!("  Start:       {}", date(&policy.start_date));
    println!("  End:         {}", date(&policy.end_date));
    println!("  Renewal:     {}", date(&policy.renewal_date));
    if let Some(ref file) = policy.policy_file {
        println!("  Document:    {}", file);
    }
}

pub fn carriers(carriers: &[Carrier]) {
    if carriers.is_empty() {
        println!("No carriers found.");
        return;
    }
    for carrier in carriers {
        println!(
            "  {:<5} {:<28} {}",
            carrier.id,
            carrier.display_name(),
            carrier.support_email.as_deref().unwrap_or("-")
        );
    }
}

pub fn policy_form(options: &PolicyFormOptions) {
    println!("Clients:");
    for client in &options.clients {
        println!("  {:<5} {}", client.id, client.display_name());
    }
    println!("\nCarriers:");
    carriers(&options.carriers);
    println!("\nPolicy types: LIFE, HEALTH, AUTO, HOME");
}
