//! Who may do what to a booking.
//!
//! ADMIN and the event's organizer may drive a booking through any legal
//! lifecycle step. The booking owner may only cancel.

use crate::domain::models::{
    booking::{Booking, BookingStatus},
    event::Event,
    user::Caller,
};

fn manages_event(caller: &Caller, event: &Event) -> bool {
    caller.is_admin() || event.is_organized_by(&caller.id)
}

pub fn can_transition(caller: &Caller, booking: &Booking, event: &Event, next: BookingStatus) -> bool {
    if !booking.status.can_become(next) {
        return false;
    }
    if manages_event(caller, event) {
        return true;
    }
    booking.user_id == caller.id && next == BookingStatus::Cancelled
}

pub fn can_delete(caller: &Caller, booking: &Booking, event: &Event) -> bool {
    booking.user_id == caller.id || manages_event(caller, event)
}

pub fn can_view_event_bookings(caller: &Caller, event: &Event) -> bool {
    manages_event(caller, event)
}
