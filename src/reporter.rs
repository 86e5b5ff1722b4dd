use crate::models::SizeAvailability;

/// Render the newly-available records as a human-readable block, or
/// `None` when there is nothing to report.
pub fn render(newly_available: &[SizeAvailability]) -> Option<String> {
    if newly_available.is_empty() {
        return None;
    }

    let mut out = String::from("Newly available:\n");
    for record in newly_available {
        out.push_str(&format!("  {} ({})\n", record.name, record.size));
    }
    Some(out)
}

/// Print the report to stdout. Silent when there is nothing new.
pub fn report(newly_available: &[SizeAvailability]) {
    if let Some(block) = render(newly_available) {
        print!("{block}");
    }
}
