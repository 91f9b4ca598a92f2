use uuid::Uuid;

/// Issues ticket numbers and seat labels at confirmation.
pub struct TicketIssuer;

#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket_number: String,
    pub seat_labels: Vec<String>,
}

impl TicketIssuer {
    /// One ticket per booking: a unique human-presentable number plus a
    /// seat label per passenger index.
    pub fn issue(&self, train_number: &str, passenger_count: u32) -> IssuedTicket {
        let seat_labels = (0..passenger_count as usize)
            .map(|index| Self::seat_label(train_number, index))
            .collect();
        IssuedTicket { ticket_number: Self::ticket_number(), seat_labels }
    }

    /// Format: RB-{unix seconds}-{8 uppercase hex}.
    fn ticket_number() -> String {
        let timestamp = chrono::Utc::now().timestamp();
        let discriminator = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        format!("RB-{}-{}", timestamp, discriminator)
    }

    /// Fixed 4-seats-per-row layout: the row letter advances every four
    /// passengers, prefixed with the last two characters of the train
    /// number. Stable for any booking of the same size on the same
    /// train. These are presentation labels, not physical seat
    /// assignments; two bookings on the same departure can repeat them.
    pub fn seat_label(train_number: &str, passenger_index: usize) -> String {
        let chars: Vec<char> = train_number.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(2)..].iter().collect();
        let row = (b'A' + (passenger_index / 4) as u8) as char;
        let seat = passenger_index % 4 + 1;
        format!("{tail}{row}{seat}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seat_labels_follow_row_layout() {
        let labels: Vec<String> = (0..6).map(|i| TicketIssuer::seat_label("1015", i)).collect();
        assert_eq!(labels, ["15A1", "15A2", "15A3", "15A4", "15B1", "15B2"]);
    }

    #[test]
    fn labels_are_deterministic_per_train() {
        assert_eq!(TicketIssuer::seat_label("8050", 0), TicketIssuer::seat_label("8050", 0));
        assert_eq!(TicketIssuer::seat_label("7", 0), "7A1");
    }

    #[test]
    fn issued_labels_are_distinct_within_a_booking() {
        let ticket = TicketIssuer.issue("1015", 10);
        let unique: HashSet<&String> = ticket.seat_labels.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn ticket_numbers_look_right_and_do_not_repeat() {
        let numbers: HashSet<String> =
            (0..100).map(|_| TicketIssuer.issue("1015", 1).ticket_number).collect();
        assert_eq!(numbers.len(), 100);
        assert!(numbers.iter().all(|n| n.starts_with("RB-")));
    }
}
