//! Renders extracted bookings as notification text.

use crate::model::ExtractedBooking;

const SEPARATOR: &str = "\n----------\n";

fn plural(count: &str, singular: &str, plural: &str) -> String {
    if count == "1" {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Multi-line notification for one booking.
pub fn format_booking(booking: &ExtractedBooking) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Booking: {}", or_dash(&booking.booking_number)));
    if let Some(order) = &booking.order_number {
        lines.push(format!("Order: {order}"));
    }
    lines.push(format!("Tour date: {}", booking.tour_date));
    match &booking.sku {
        Some(sku) => lines.push(format!("Program: {} ({sku})", or_dash(&booking.program))),
        None => lines.push(format!("Program: {}", or_dash(&booking.program))),
    }
    lines.push(format!("Customer: {}", or_dash(&booking.customer_name)));
    lines.push(format!("Hotel: {}", or_dash(&booking.hotel)));
    lines.push(format!("Phone: {}", or_dash(&booking.phone_number)));
    lines.push(format!(
        "PAX: {}, {}, {}",
        plural(&booking.adult_count, "adult", "adults"),
        plural(&booking.child_count, "child", "children"),
        plural(&booking.infant_count, "infant", "infants"),
    ));
    if let Some(amount) = booking.paid_amount {
        lines.push(format!("Paid: {amount:.2}"));
    }

    lines.join("\n")
}

/// All bookings of one email, separated by a rule line.
pub fn format_bookings(bookings: &[ExtractedBooking]) -> String {
    bookings
        .iter()
        .map(format_booking)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
