use crate::records::VisitRecord;

/// Tooltip for the visit at zero-based `index` in its sequence.
pub fn hover_text(record: &VisitRecord, index: usize) -> String {
    [
        format!("Visit #{}", index + 1),
        format!("Agent: {}", record.agent_id()),
        format!("Client: {}", record.client_id()),
        format!("Time: {}", record.time().format("%H:%M:%S")),
        format!("Channel: {}", record.channel().label()),
        format!("Result: {}", record.result()),
        format!(
            "Effective: {}",
            if record.is_effective() { "Yes" } else { "No" }
        ),
    ]
    .join("\n")
}
